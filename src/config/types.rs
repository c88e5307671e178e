//! Core error types for the harness

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised to the caller rather than recorded on a step result.
///
/// Check failures never show up here: they are written into
/// [`StepResult`](crate::checks::StepResult) and reported through the test outcome.
#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Process error: {0}")]
    Process(String),

    /// A check variant that requires a reference file could not find it.
    /// Raised while the pipeline is built, before any toolchain invocation.
    #[error("reference output '{}' missing", .0.display())]
    MissingReference(PathBuf),

    /// The child was stopped by SIGINT; the whole batch should unwind.
    #[error("interrupted")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, HarnessError>;

impl HarnessError {
    /// True when the error must abort the remaining batch instead of failing one test.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, HarnessError::Interrupted)
    }
}
