//! Mutable record of one step invocation

use crate::checks::diagnostics::{byte_lines, DiagnosticMarkers, Diagnostics};
use crate::exec::ProcessOutput;
use log::debug;
use std::borrow::Cow;

/// Captured output of one step plus everything its checks derived from it.
#[derive(Debug, Clone, Default)]
pub struct StepResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub returncode: i32,
    /// Top-line failure; the first check to set it wins
    pub error: Option<String>,
    /// Failures reported after `error` was already set
    pub secondary_errors: Vec<String>,
    /// Passing, but the expected output could not be verified
    pub unverified: Option<String>,
    pub diff: Option<String>,
    /// Captured assembly output of an asm step
    pub asm: Option<Vec<u8>>,
    /// Scan cache, filled on first use
    pub diagnostics: Option<Diagnostics>,
    pub markers: DiagnosticMarkers,
}

impl StepResult {
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, returncode: i32) -> Self {
        Self {
            stdout,
            stderr,
            returncode,
            ..Self::default()
        }
    }

    pub fn from_output(output: ProcessOutput, markers: DiagnosticMarkers) -> Self {
        Self {
            markers,
            ..Self::new(output.stdout, output.stderr, output.returncode)
        }
    }

    /// Record a failure. An existing error is kept; the new message is
    /// appended to `secondary_errors`.
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.error {
            None => self.error = Some(message),
            Some(ref first) => {
                debug!("keeping error '{}', also saw '{}'", first, message);
                self.secondary_errors.push(message);
            }
        }
    }

    /// Replace the current error with a more specific diagnosis.
    pub fn replace_error(&mut self, message: impl Into<String>) {
        if let Some(previous) = self.error.replace(message.into()) {
            self.secondary_errors.push(previous);
        }
    }

    pub fn mark_unverified(&mut self, reason: impl Into<String>) {
        self.unverified = Some(reason.into());
    }

    /// A step fails as soon as any check recorded an error.
    pub fn fail(&self) -> bool {
        self.error.is_some()
    }

    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    /// Raw stderr lines followed by stdout lines, the order every scanner uses.
    pub fn output_byte_lines(&self) -> impl Iterator<Item = &[u8]> + '_ {
        byte_lines(&self.stderr).chain(byte_lines(&self.stdout))
    }
}
