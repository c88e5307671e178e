//! Output checks applied to step results
//!
//! A check inspects a [`StepResult`] and records an error on it when the
//! property it guards is violated. Checks never abort each other: every
//! check of a step runs, and the first recorded error becomes the summary.
//!
//! Plain functions with the right signature are checks. Parameterized checks
//! (reference comparisons, problem scanners) are values built once when the
//! pipeline is assembled.

pub mod basic;
pub mod diagnostics;
pub mod memcheck;
pub mod reference;
pub mod result;
pub mod toolchain;

pub use basic::{
    check_missing_errors, check_missing_warnings, check_no_errors, check_no_warnings,
    check_retcode_zero,
};
pub use diagnostics::{search_warnings_errors, DiagnosticMarkers, Diagnostics};
pub use memcheck::check_memcheck_output;
pub use reference::{
    create_check_errors_reference, create_check_reference_output,
    create_check_warnings_reference, DiagnosticReference, ReferenceOutput,
};
pub use result::StepResult;
pub use toolchain::ProblemScanner;

/// A validation applied to one step result.
pub trait Check: Send + Sync {
    fn apply(&self, result: &mut StepResult);
}

impl<F> Check for F
where
    F: Fn(&mut StepResult) + Send + Sync,
{
    fn apply(&self, result: &mut StepResult) {
        self(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_output_passes_every_check() {
        let checks: Vec<Box<dyn Check>> = vec![
            Box::new(check_retcode_zero),
            Box::new(check_no_errors),
            Box::new(check_no_warnings),
            Box::new(check_memcheck_output),
            Box::new(ProblemScanner::backend()),
            Box::new(ProblemScanner::frontend()),
        ];
        let mut result = StepResult::new(b"all good\n".to_vec(), Vec::new(), 0);
        for check in &checks {
            check.apply(&mut result);
        }
        assert!(!result.fail());
        assert!(result.unverified.is_none());
    }

    #[test]
    fn test_closure_is_a_check() {
        let limit = 3usize;
        let check = move |result: &mut StepResult| {
            if result.stdout.len() > limit {
                result.set_error("too much output");
            }
        };
        let mut result = StepResult::new(b"abcdef".to_vec(), Vec::new(), 0);
        check.apply(&mut result);
        assert_eq!(result.error.as_deref(), Some("too much output"));
    }
}
