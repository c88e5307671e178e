//! Valgrind memcheck summary check

use crate::checks::result::StepResult;

const SUMMARY_MARKER: &str = "== ERROR SUMMARY:";

/// Error count of a summary line such as
/// `==123== ERROR SUMMARY: 3 errors from 2 contexts (suppressed: 0 from 0)`.
pub fn parse_error_summary(line: &str) -> Option<u64> {
    let colon = line.find(':')?;
    let rest = line.get(colon + 2..)?;
    let count = rest.split(' ').next()?;
    count.parse().ok()
}

/// Fails when memcheck reported errors in stderr.
pub fn check_memcheck_output(result: &mut StepResult) {
    let stderr = result.stderr_text().into_owned();
    for line in stderr.lines().filter(|line| line.contains(SUMMARY_MARKER)) {
        match parse_error_summary(line) {
            Some(0) => {}
            Some(count) => result.set_error(format!("memcheck errors: {}", count)),
            None => result.set_error(format!("malformed memcheck summary: {}", line)),
        }
    }
}
