//! Signal-terminated exit code table
//!
//! Maps the negative return codes used for signal termination (`-N` for
//! signal `N`) to the symbolic signal name. Built once per process from the
//! platform's signal definitions; the zero-signal entry never appears.

use log::info;
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set once SIGINT reached the harness itself (async-safe atomic)
static INTERRUPT_REQUESTED: AtomicBool = AtomicBool::new(false);

static EXIT_CODES: Lazy<HashMap<i32, &'static str>> = Lazy::new(build_exit_codes);

fn build_exit_codes() -> HashMap<i32, &'static str> {
    let mut codes: HashMap<i32, &'static str> = Signal::iterator()
        .map(|sig| (-(sig as i32), sig.as_str()))
        .collect();

    #[cfg(target_os = "linux")]
    {
        codes.insert(-libc::SIGRTMIN(), "SIGRTMIN");
        codes.insert(-libc::SIGRTMAX(), "SIGRTMAX");
    }

    codes.remove(&0);
    codes
}

/// Symbolic name for a "terminated by signal" return code, if it is one.
pub fn exit_code_name(returncode: i32) -> Option<&'static str> {
    EXIT_CODES.get(&returncode).copied()
}

/// Return code a child reports after being stopped by SIGINT.
pub fn interrupted_code() -> i32 {
    -(Signal::SIGINT as i32)
}

extern "C" fn interrupt_handler(_signal: libc::c_int) {
    // Only atomic operations are allowed here
    INTERRUPT_REQUESTED.store(true, Ordering::SeqCst);
}

/// Keep the harness alive on Ctrl-C.
///
/// SIGINT still reaches the toolchain children in the foreground process
/// group; they die from it, the runner sees the interrupted return code and
/// unwinds the batch. A caught (not ignored) signal is reset to its default
/// action across exec, so children are not affected by this handler.
pub fn install_interrupt_handler() -> Result<(), String> {
    let action = SigAction::new(
        SigHandler::Handler(interrupt_handler),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );

    // SAFETY: the handler only stores to an atomic.
    unsafe {
        signal::sigaction(Signal::SIGINT, &action)
            .map_err(|e| format!("Failed to install SIGINT handler: {}", e))?;
    }

    info!("SIGINT handler installed");
    Ok(())
}

/// True once the harness itself received SIGINT.
pub fn interrupt_requested() -> bool {
    INTERRUPT_REQUESTED.load(Ordering::SeqCst)
}
