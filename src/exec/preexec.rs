//! Child-side setup between fork and exec
//!
//! The hook lowers the harness resource limits in the child so that the
//! toolchain (and everything it spawns) inherits them. The parent's own
//! limits are never touched.

use crate::kernel::rlimit::apply_harness_limits;
use std::process::Command;

/// Install the limit-lowering hook on a command.
#[cfg(unix)]
pub fn install_limits(cmd: &mut Command, cpu_seconds: u64) {
    use std::os::unix::process::CommandExt;

    // SAFETY: the closure only issues getrlimit/setrlimit syscalls and builds
    // an io::Error from an errno value; nothing in it allocates or locks.
    unsafe {
        cmd.pre_exec(move || {
            apply_harness_limits(cpu_seconds).map_err(std::io::Error::from)
        });
    }
}

#[cfg(not(unix))]
pub fn install_limits(_cmd: &mut Command, _cpu_seconds: u64) {
    log::warn!("resource limits are not supported on this platform");
}
