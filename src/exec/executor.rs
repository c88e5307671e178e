//! Process runner for toolchain invocations
//!
//! Every toolchain call goes through [`execute`]: the command is spawned with
//! lowered resource limits, its output is captured in full, and the return
//! code is normalized. A child killed by a known signal comes back as
//! [`Termination::Signaled`] rather than as an ordinary return code.

use crate::config::types::{HarnessError, Result};
use crate::exec::preexec::install_limits;
use crate::kernel::signal::{exit_code_name, interrupted_code};
use log::{debug, warn};
use std::process::{Command, ExitStatus, Stdio};

#[cfg(unix)]
use std::os::unix::process::ExitStatusExt;

/// Captured output of a child that exited on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub returncode: i32,
}

/// A child terminated by a signal with a known name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigKill {
    /// Negative return code (`-N` for signal `N`)
    pub retcode: i32,
    pub name: &'static str,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// How a toolchain invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Exited(ProcessOutput),
    Signaled(SigKill),
}

/// Return code after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitClass {
    Normal(i32),
    Signal { retcode: i32, name: &'static str },
}

/// Normalize a raw return code.
///
/// The interrupt check looks at the raw code. Codes above 127 are folded to
/// `128 - code`, which recovers the signal encoding of runtimes (and shells)
/// that report `128 + N` instead of dying from the signal themselves.
pub fn classify_returncode(raw: i32, propagate_interrupt: bool) -> Result<ExitClass> {
    if propagate_interrupt && raw == interrupted_code() {
        return Err(HarnessError::Interrupted);
    }

    let returncode = if raw > 127 { 128 - raw } else { raw };
    if returncode != raw {
        debug!("return code {} reinterpreted as {}", raw, returncode);
    }

    Ok(match exit_code_name(returncode) {
        Some(name) => ExitClass::Signal {
            retcode: returncode,
            name,
        },
        None => ExitClass::Normal(returncode),
    })
}

/// Raw return code: the exit code, or `-N` when the child died from signal `N`.
fn raw_returncode(status: &ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

fn build_command(command: &str, use_shell: bool) -> Result<Command> {
    if use_shell {
        let mut cmd = Command::new("/bin/sh");
        cmd.arg("-c").arg(command);
        return Ok(cmd);
    }

    // Plain split on spaces: quoted arguments containing spaces are not supported.
    let mut parts = command.split(' ').filter(|part| !part.is_empty());
    let program = parts
        .next()
        .ok_or_else(|| HarnessError::Config("Empty command provided".to_string()))?;
    let mut cmd = Command::new(program);
    cmd.args(parts);
    Ok(cmd)
}

/// Execute a command and capture its output.
///
/// * `env_vars` replaces the child environment when given, otherwise ours is inherited.
/// * `timeout_secs` becomes the child's CPU-time limit when non-zero.
/// * With `propagate_interrupt`, a child stopped by SIGINT yields
///   [`HarnessError::Interrupted`] so a Ctrl-C aborts the run instead of failing one test.
pub fn execute(
    command: &str,
    env_vars: Option<&[(String, String)]>,
    timeout_secs: u64,
    use_shell: bool,
    propagate_interrupt: bool,
) -> Result<Termination> {
    let mut cmd = build_command(command, use_shell)?;

    if let Some(vars) = env_vars {
        cmd.env_clear();
        cmd.envs(vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    install_limits(&mut cmd, timeout_secs);

    debug!("executing: {} (cpu limit {}s)", command, timeout_secs);
    let output = cmd
        .output()
        .map_err(|e| HarnessError::Process(format!("Failed to start '{}': {}", command, e)))?;

    let raw = raw_returncode(&output.status);
    match classify_returncode(raw, propagate_interrupt)? {
        ExitClass::Normal(returncode) => Ok(Termination::Exited(ProcessOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            returncode,
        })),
        ExitClass::Signal { retcode, name } => {
            warn!("'{}' terminated by {}", command, name);
            Ok(Termination::Signaled(SigKill {
                retcode,
                name,
                stdout: output.stdout,
                stderr: output.stderr,
            }))
        }
    }
}

/// Run a shell command for its side effects, discarding output.
///
/// With `verbose` the command is echoed and its output goes to our own
/// stdout/stderr. Returns the raw return code.
pub fn silent_shell(
    command: &str,
    env_vars: Option<&[(String, String)]>,
    verbose: bool,
) -> Result<i32> {
    let mut cmd = build_command(command, true)?;
    if let Some(vars) = env_vars {
        cmd.env_clear();
        cmd.envs(vars.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    }

    if verbose {
        eprintln!("silent_shell: {}", command);
    } else {
        cmd.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let status = cmd
        .status()
        .map_err(|e| HarnessError::Process(format!("Execution failed: {}", e)))?;
    Ok(raw_returncode(&status))
}
