//! Scanners for fatal toolchain messages
//!
//! Some toolchain failures do not show up as ordinary diagnostics (or even
//! as a non-zero exit): verifier complaints, backend panics, linker and
//! assembler failures reported by the driver. These scanners look for the
//! fixed marker phrases independently of the warning/error scanner.

use crate::checks::diagnostics::contains_bytes;
use crate::checks::result::StepResult;
use crate::checks::Check;

/// How a marker is matched against a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Prefix,
    Substring,
}

/// One marker phrase and the error it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemPattern {
    pub marker: &'static str,
    pub kind: MatchKind,
    pub error: &'static str,
}

impl ProblemPattern {
    pub const fn prefix(marker: &'static str, error: &'static str) -> Self {
        Self {
            marker,
            kind: MatchKind::Prefix,
            error,
        }
    }

    pub const fn substring(marker: &'static str, error: &'static str) -> Self {
        Self {
            marker,
            kind: MatchKind::Substring,
            error,
        }
    }

    fn matches(&self, line: &[u8]) -> bool {
        match self.kind {
            MatchKind::Prefix => line.starts_with(self.marker.as_bytes()),
            MatchKind::Substring => contains_bytes(line, self.marker.as_bytes()),
        }
    }
}

const BACKEND_PATTERNS: &[ProblemPattern] = &[
    ProblemPattern::prefix("Verify warning:", "verify warning"),
    ProblemPattern::substring("libFirm panic", "libFirm panic"),
];

const FRONTEND_PATTERNS: &[ProblemPattern] = &[
    ProblemPattern::substring("linker reported an error", "linker error"),
    ProblemPattern::substring("assembler reported an error", "assembler error"),
];

/// Fails on the first output line matching one of its patterns.
#[derive(Debug, Clone)]
pub struct ProblemScanner {
    patterns: &'static [ProblemPattern],
}

impl ProblemScanner {
    pub const fn new(patterns: &'static [ProblemPattern]) -> Self {
        Self { patterns }
    }

    /// Backend verifier warnings and panics.
    pub const fn backend() -> Self {
        Self::new(BACKEND_PATTERNS)
    }

    /// Linker and assembler failures reported by the compiler driver.
    pub const fn frontend() -> Self {
        Self::new(FRONTEND_PATTERNS)
    }

    /// Error for the first problematic line, if any.
    pub fn scan(&self, result: &StepResult) -> Option<&'static str> {
        result.output_byte_lines().find_map(|line| {
            self.patterns
                .iter()
                .find(|pattern| pattern.matches(line))
                .map(|pattern| pattern.error)
        })
    }
}

impl Check for ProblemScanner {
    fn apply(&self, result: &mut StepResult) {
        if let Some(error) = self.scan(result) {
            result.set_error(error);
        }
    }
}
