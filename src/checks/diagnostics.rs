//! Compiler diagnostic scanner
//!
//! Splits a step's output into warning and error messages. A note line right
//! after a warning or error belongs to that message; a note naming the
//! enclosing context of the *next* message is noise and is skipped.

use crate::checks::result::StepResult;
use serde::{Deserialize, Serialize};

/// Marker substrings that classify diagnostic lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticMarkers {
    pub warning: String,
    pub error: String,
    pub note: String,
    /// Note variant announcing the context of the following message
    pub note_context: String,
}

impl Default for DiagnosticMarkers {
    fn default() -> Self {
        Self {
            warning: "warning: ".to_string(),
            error: "error: ".to_string(),
            note: " note: ".to_string(),
            note_context: " note: in ".to_string(),
        }
    }
}

/// Warning and error lines of one step, notes included.
///
/// Lines keep the raw bytes the toolchain printed so they can be compared
/// with reference files byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    pub warnings: Vec<Vec<u8>>,
    pub errors: Vec<Vec<u8>>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum LastMessage {
    Warning,
    Error,
}

/// Lines of a byte buffer: split on `\n`, a trailing `\r` dropped, no
/// empty line after a final newline.
pub fn byte_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> + '_ {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    body.split(|&b| b == b'\n')
        .filter(move |_| !bytes.is_empty())
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// Byte substring test; an empty needle matches everything.
pub fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|window| window == needle)
}

/// Classify lines with the given markers.
pub fn scan_lines<I, S>(lines: I, markers: &DiagnosticMarkers) -> Diagnostics
where
    I: IntoIterator<Item = S>,
    S: AsRef<[u8]>,
{
    let warning = markers.warning.as_bytes();
    let error = markers.error.as_bytes();
    let note = markers.note.as_bytes();
    let note_context = markers.note_context.as_bytes();

    let mut diagnostics = Diagnostics::default();
    let mut last: Option<LastMessage> = None;

    for line in lines {
        let line = line.as_ref();
        if contains_bytes(line, warning) {
            last = Some(LastMessage::Warning);
            diagnostics.warnings.push(line.to_vec());
        } else if contains_bytes(line, error) {
            last = Some(LastMessage::Error);
            diagnostics.errors.push(line.to_vec());
        } else if contains_bytes(line, note) && !contains_bytes(line, note_context) {
            match last.take() {
                Some(LastMessage::Warning) => diagnostics.warnings.push(line.to_vec()),
                Some(LastMessage::Error) => diagnostics.errors.push(line.to_vec()),
                None => {}
            }
        }
    }

    diagnostics
}

/// Scan a result once and cache the outcome on it.
pub fn search_warnings_errors(result: &mut StepResult) -> &Diagnostics {
    if result.diagnostics.is_none() {
        let scanned = scan_lines(result.output_byte_lines(), &result.markers);
        result.diagnostics = Some(scanned);
    }
    result.diagnostics.get_or_insert_with(Diagnostics::default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(lines: &[&str]) -> Diagnostics {
        scan_lines(lines, &DiagnosticMarkers::default())
    }

    fn text(lines: &[Vec<u8>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| String::from_utf8_lossy(line).into_owned())
            .collect()
    }

    #[test]
    fn test_classifies_warnings_and_errors() {
        let d = scan(&[
            "a.c:1:1: warning: unused variable 'x'",
            "a.c:2:1: error: expected ';'",
            "some unrelated line",
        ]);
        assert_eq!(text(&d.warnings), vec!["a.c:1:1: warning: unused variable 'x'"]);
        assert_eq!(text(&d.errors), vec!["a.c:2:1: error: expected ';'"]);
    }

    #[test]
    fn test_note_attaches_to_previous_message() {
        let d = scan(&[
            "a.c:2:1: error: redefinition of 'f'",
            "a.c:1:1: note: previous definition was here",
            "a.c:1:1: note: a second note is not attached",
        ]);
        assert_eq!(
            text(&d.errors),
            vec![
                "a.c:2:1: error: redefinition of 'f'",
                "a.c:1:1: note: previous definition was here",
            ]
        );
    }

    #[test]
    fn test_context_note_is_noise() {
        let d = scan(&[
            "a.c:5:1: warning: shadowing",
            "a.c: note: in function 'main'",
            "a.c:6:1: note: declared here",
        ]);
        // The context note neither attaches nor resets the pending warning
        assert_eq!(
            text(&d.warnings),
            vec!["a.c:5:1: warning: shadowing", "a.c:6:1: note: declared here"]
        );
        assert!(d.errors.is_empty());
    }

    #[test]
    fn test_orphan_note_dropped() {
        let d = scan(&["a.c:1:1: note: nothing before me"]);
        assert_eq!(d, Diagnostics::default());
    }

    #[test]
    fn test_custom_markers() {
        let markers = DiagnosticMarkers {
            warning: "W: ".to_string(),
            error: "E: ".to_string(),
            note: "N: ".to_string(),
            note_context: "N: within ".to_string(),
        };
        let d = scan_lines(&["W: odd", "N: here", "E: bad"], &markers);
        assert_eq!(text(&d.warnings), vec!["W: odd", "N: here"]);
        assert_eq!(text(&d.errors), vec!["E: bad"]);
    }

    #[test]
    fn test_scan_is_memoized() {
        let mut result = StepResult::new(
            Vec::new(),
            b"a.c:1:1: error: boom\n".to_vec(),
            1,
        );
        let first = search_warnings_errors(&mut result).clone();
        // Later output changes are not rescanned
        result.stderr.clear();
        let second = search_warnings_errors(&mut result).clone();
        assert_eq!(first, second);
        assert_eq!(first.errors.len(), 1);
    }

    #[test]
    fn test_non_utf8_lines_kept_verbatim() {
        let stderr = b"a.c:1:1: error: unknown identifier '\xe4'\r\n".to_vec();
        let mut result = StepResult::new(Vec::new(), stderr, 1);
        let d = search_warnings_errors(&mut result);
        assert_eq!(d.errors, vec![b"a.c:1:1: error: unknown identifier '\xe4'".to_vec()]);
    }

    #[test]
    fn test_byte_lines() {
        fn split(bytes: &[u8]) -> Vec<&[u8]> {
            byte_lines(bytes).collect()
        }
        assert!(split(b"").is_empty());
        assert_eq!(split(b"\n"), vec![&b""[..]]);
        assert_eq!(split(b"a\r\n\nb"), vec![&b"a"[..], &b""[..], &b"b"[..]]);
        assert_eq!(split(b"a\nb\n"), vec![&b"a"[..], &b"b"[..]]);
    }

    #[test]
    fn test_contains_bytes() {
        assert!(contains_bytes(b"x error: y", b"error: "));
        assert!(!contains_bytes(b"error", b"error: "));
        assert!(contains_bytes(b"", b""));
    }
}
