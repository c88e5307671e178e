//! Execution control
//!
//! Spawns toolchain processes under lowered resource limits and classifies
//! how they terminated.

pub mod executor;
pub mod preexec;

pub use executor::{
    classify_returncode, execute, silent_shell, ExitClass, ProcessOutput, SigKill, Termination,
};
