//! Return code and diagnostic count checks

use crate::checks::diagnostics::search_warnings_errors;
use crate::checks::result::StepResult;

pub const NO_REFERENCE: &str = "ok (but no reference file)";

/// The step command must exit with status zero.
pub fn check_retcode_zero(result: &mut StepResult) {
    if result.returncode != 0 {
        let message = format!("returncode not zero but {}", result.returncode);
        result.set_error(message);
    }
}

/// The compiler must not report any error.
pub fn check_no_errors(result: &mut StepResult) {
    let n_errors = search_warnings_errors(result).errors.len();
    if n_errors > 0 {
        result.set_error(format!("{} compile errors", n_errors));
    }
}

/// At least one compiler error is expected, but there is nothing to compare it with.
pub fn check_missing_errors(result: &mut StepResult) {
    let n_errors = search_warnings_errors(result).errors.len();
    if n_errors == 0 {
        result.set_error("missed error");
    } else {
        result.mark_unverified(NO_REFERENCE);
    }
}

/// The compiler must not report any warning.
pub fn check_no_warnings(result: &mut StepResult) {
    let n_warnings = search_warnings_errors(result).warnings.len();
    if n_warnings > 0 {
        result.set_error("produced invalid warning");
    }
}

/// At least one compiler warning is expected, but there is nothing to compare it with.
pub fn check_missing_warnings(result: &mut StepResult) {
    let n_warnings = search_warnings_errors(result).warnings.len();
    if n_warnings == 0 {
        result.set_error("missed warnings");
    } else {
        result.mark_unverified(NO_REFERENCE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_stderr(stderr: &str, returncode: i32) -> StepResult {
        StepResult::new(Vec::new(), stderr.as_bytes().to_vec(), returncode)
    }

    #[test]
    fn test_retcode() {
        let mut ok = result_with_stderr("", 0);
        check_retcode_zero(&mut ok);
        assert!(!ok.fail());

        let mut bad = result_with_stderr("", -6);
        check_retcode_zero(&mut bad);
        assert_eq!(bad.error.as_deref(), Some("returncode not zero but -6"));
    }

    #[test]
    fn test_no_errors_counts() {
        let mut result = result_with_stderr("a.c:1: error: x\na.c:2: error: y\n", 1);
        check_no_errors(&mut result);
        assert_eq!(result.error.as_deref(), Some("2 compile errors"));
    }

    #[test]
    fn test_no_warnings() {
        let mut result = result_with_stderr("a.c:1: warning: x\n", 0);
        check_no_warnings(&mut result);
        assert_eq!(result.error.as_deref(), Some("produced invalid warning"));
    }

    #[test]
    fn test_missing_errors_without_reference() {
        let mut result = result_with_stderr("a.c:1: error: x\na.c:2: error: y\n", 1);
        check_missing_errors(&mut result);
        assert!(!result.fail());
        assert_eq!(result.unverified.as_deref(), Some(NO_REFERENCE));

        let mut silent = result_with_stderr("", 0);
        check_missing_errors(&mut silent);
        assert_eq!(silent.error.as_deref(), Some("missed error"));
    }

    #[test]
    fn test_missing_warnings_without_reference() {
        let mut result = result_with_stderr("a.c:1: warning: x\n", 0);
        check_missing_warnings(&mut result);
        assert_eq!(result.unverified.as_deref(), Some(NO_REFERENCE));

        let mut silent = result_with_stderr("", 0);
        check_missing_warnings(&mut silent);
        assert_eq!(silent.error.as_deref(), Some("missed warnings"));
    }
}
