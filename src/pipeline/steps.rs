//! Standard steps for C toolchains
//!
//! Command lines are built from environment fields and split on spaces by
//! the process runner, so paths containing spaces are not supported.

use crate::checks::StepResult;
use crate::config::environment::Environment;
use crate::config::types::Result;
use crate::exec::{execute, Termination};
use crate::pipeline::step::StepRun;
use log::warn;
use std::fs;

/// Memcheck slows compilation down by roughly this factor.
pub const VALGRIND_MEMCHECK_FACTOR: u64 = 30;

/// CPU seconds allowed for syntax-only compilation.
pub const SYNTAX_ONLY_TIMEOUT: u64 = 20;

const VALGRIND_PREFIX: &str = "valgrind --tool=memcheck ";

/// Run a command for a step and wrap its result.
pub fn run_step_command(environment: &Environment, command: &str, timeout: u64) -> Result<StepRun> {
    let termination = execute(command, environment.env_vars.as_deref(), timeout, false, true)?;
    Ok(match termination {
        Termination::Exited(output) => StepRun::Completed(StepResult::from_output(
            output,
            environment.diagnostic_markers.clone(),
        )),
        Termination::Signaled(sigkill) => StepRun::Killed(sigkill),
    })
}

/// Prefix a compiler command with valgrind when memcheck is enabled.
pub fn with_memcheck(environment: &Environment, command: String, timeout: u64) -> (String, u64) {
    if environment.memcheck {
        (
            format!("{}{}", VALGRIND_PREFIX, command),
            timeout * VALGRIND_MEMCHECK_FACTOR,
        )
    } else {
        (command, timeout)
    }
}

pub fn compile_command(environment: &Environment) -> Result<String> {
    Ok(format!(
        "{} {} {} {} -o {}",
        environment.cc,
        environment.filename,
        environment.cflags,
        environment.ldflags,
        environment.executable_path()?.display()
    ))
}

pub fn syntax_only_command(environment: &Environment) -> String {
    format!(
        "{} {} {} -fsyntax-only",
        environment.cc, environment.filename, environment.cflags
    )
}

pub fn asm_command(environment: &Environment) -> Result<String> {
    Ok(format!(
        "{} {} {} -S -o {}",
        environment.cc,
        environment.filename,
        environment.cflags,
        environment.asm_path()?.display()
    ))
}

pub fn execute_command(environment: &Environment) -> Result<String> {
    let executable = environment.executable_path()?.display().to_string();
    if environment.runexe.trim().is_empty() {
        Ok(executable)
    } else {
        Ok(format!("{} {}", environment.runexe, executable))
    }
}

/// Compile the target to an executable.
pub fn step_compile_c(environment: &Environment) -> Result<StepRun> {
    let (command, timeout) = with_memcheck(
        environment,
        compile_command(environment)?,
        environment.compile_timeout,
    );
    run_step_command(environment, &command, timeout)
}

/// Only parse and check the target.
pub fn step_compile_c_syntax_only(environment: &Environment) -> Result<StepRun> {
    let (command, timeout) = with_memcheck(
        environment,
        syntax_only_command(environment),
        SYNTAX_ONLY_TIMEOUT,
    );
    run_step_command(environment, &command, timeout)
}

/// Compile the target to assembly and capture the assembly text.
pub fn step_compile_c_asm(environment: &Environment) -> Result<StepRun> {
    let (command, timeout) = with_memcheck(
        environment,
        asm_command(environment)?,
        environment.compile_timeout,
    );
    let run = run_step_command(environment, &command, timeout)?;

    let mut result = match run {
        StepRun::Completed(result) if result.returncode == 0 => result,
        other => return Ok(other),
    };
    match fs::read(environment.asm_path()?) {
        Ok(asm) => result.asm = Some(asm),
        Err(e) => {
            warn!("reading assembler output for {}: {}", environment.filename, e);
            result.set_error("couldn't read assembler output");
        }
    }
    Ok(StepRun::Completed(result))
}

/// Run the compiled executable.
pub fn step_execute(environment: &Environment) -> Result<StepRun> {
    run_step_command(
        environment,
        &execute_command(environment)?,
        environment.execute_timeout,
    )
}
