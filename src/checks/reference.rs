//! Comparisons against `<target>.ref` sidecar files
//!
//! Reference files are read once, when the check is built. Diagnostic
//! references fall back to the "missing" checks when the file is absent;
//! the plain output reference is mandatory.

use crate::checks::basic::{check_missing_errors, check_missing_warnings};
use crate::checks::diagnostics::{byte_lines, search_warnings_errors};
use crate::checks::result::StepResult;
use crate::checks::Check;
use crate::config::environment::Environment;
use crate::config::types::{HarnessError, Result};
use difference::{Changeset, Difference};
use log::debug;
use std::fs;
use std::path::Path;

/// Which diagnostic list a reference file describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Errors,
    Warnings,
}

impl DiagnosticKind {
    fn plural(self) -> &'static str {
        match self {
            DiagnosticKind::Errors => "errors",
            DiagnosticKind::Warnings => "warnings",
        }
    }
}

/// Compares the scanned errors or warnings with the reference text.
#[derive(Debug, Clone)]
pub struct DiagnosticReference {
    kind: DiagnosticKind,
    reference: Vec<u8>,
}

impl DiagnosticReference {
    pub fn new(kind: DiagnosticKind, reference: Vec<u8>) -> Self {
        Self { kind, reference }
    }
}

impl Check for DiagnosticReference {
    fn apply(&self, result: &mut StepResult) {
        let diagnostics = search_warnings_errors(result);
        let lines = match self.kind {
            DiagnosticKind::Errors => &diagnostics.errors,
            DiagnosticKind::Warnings => &diagnostics.warnings,
        };

        let n_reported = lines.len();
        let n_expected = byte_lines(&self.reference).count();
        let mut text = lines.join(&b'\n');
        text.push(b'\n');

        if n_reported != n_expected {
            let message = format!(
                "reported {} {} instead of {}",
                n_reported,
                self.kind.plural(),
                n_expected
            );
            result.set_error(message);
        } else if text != self.reference {
            result.set_error(format!("reported different {}", self.kind.plural()));
        }
    }
}

fn read_optional_reference(path: &Path) -> Result<Option<Vec<u8>>> {
    if !path.is_file() {
        debug!("no reference file {}", path.display());
        return Ok(None);
    }
    Ok(Some(fs::read(path)?))
}

fn create_diagnostic_reference(
    environment: &Environment,
    kind: DiagnosticKind,
) -> Result<Box<dyn Check>> {
    let path = environment.reference_path();
    let check: Box<dyn Check> = match (read_optional_reference(&path)?, kind) {
        (Some(reference), kind) => Box::new(DiagnosticReference::new(kind, reference)),
        (None, DiagnosticKind::Errors) => Box::new(check_missing_errors),
        (None, DiagnosticKind::Warnings) => Box::new(check_missing_warnings),
    };
    Ok(check)
}

/// Compare reported errors with `<filename>.ref`; without a reference file,
/// only require that some error was reported.
pub fn create_check_errors_reference(environment: &Environment) -> Result<Box<dyn Check>> {
    create_diagnostic_reference(environment, DiagnosticKind::Errors)
}

/// Compare reported warnings with `<filename>.ref`; without a reference file,
/// only require that some warning was reported.
pub fn create_check_warnings_reference(environment: &Environment) -> Result<Box<dyn Check>> {
    create_diagnostic_reference(environment, DiagnosticKind::Warnings)
}

/// Compares stdout byte-for-byte with the expected program output.
#[derive(Debug, Clone)]
pub struct ReferenceOutput {
    reference: Vec<u8>,
}

impl ReferenceOutput {
    pub fn new(reference: Vec<u8>) -> Self {
        Self { reference }
    }

    /// Load a mandatory reference file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(HarnessError::MissingReference(path.to_path_buf()));
        }
        Ok(Self::new(fs::read(path)?))
    }
}

impl Check for ReferenceOutput {
    fn apply(&self, result: &mut StepResult) {
        if result.stdout == self.reference {
            return;
        }

        result.set_error("output mismatch");
        let diff = match (
            std::str::from_utf8(&result.stdout),
            std::str::from_utf8(&self.reference),
        ) {
            (Ok(output), Ok(reference)) => unified_diff(output, reference),
            _ => "unable to compare output/reference (non utf-8 encoding?)".to_string(),
        };
        // Outputs differing only in line endings have no line diff
        if !diff.is_empty() {
            result.diff = Some(diff);
        }
    }
}

/// Compare stdout with `<filename>.ref`, which must exist.
pub fn create_check_reference_output(environment: &Environment) -> Result<Box<dyn Check>> {
    Ok(Box::new(ReferenceOutput::load(&environment.reference_path())?))
}

/// Context lines around each change, as in `diff -u`.
const DIFF_CONTEXT: usize = 3;

/// Per-line edit script from `output` to `reference`.
fn line_ops(output: &[&str], reference: &[&str]) -> Vec<(char, String)> {
    if output.is_empty() || reference.is_empty() {
        let removed = output.iter().map(|line| ('-', line.to_string()));
        let added = reference.iter().map(|line| ('+', line.to_string()));
        return removed.chain(added).collect();
    }

    let changeset = Changeset::new(&output.join("\n"), &reference.join("\n"), "\n");
    let mut ops = Vec::new();
    for change in &changeset.diffs {
        let (tag, text) = match change {
            Difference::Same(text) => (' ', text),
            Difference::Rem(text) => ('-', text),
            Difference::Add(text) => ('+', text),
        };
        ops.extend(text.split('\n').map(|line| (tag, line.to_string())));
    }
    ops
}

/// Hunk range in unified notation: 1-based start, length omitted when 1.
fn hunk_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, len),
    }
}

/// Line diff from the actual output to the reference, in unified notation.
///
/// Changes closer than twice the context share a hunk. Returns an empty
/// string when the lines are equal.
pub fn unified_diff(output: &str, reference: &str) -> String {
    let output_lines: Vec<&str> = output.lines().collect();
    let reference_lines: Vec<&str> = reference.lines().collect();
    let ops = line_ops(&output_lines, &reference_lines);

    // (output line, reference line) before each op, plus the end position
    let mut positions = Vec::with_capacity(ops.len() + 1);
    let (mut old, mut new) = (0usize, 0usize);
    for (tag, _) in &ops {
        positions.push((old, new));
        match tag {
            '-' => old += 1,
            '+' => new += 1,
            _ => {
                old += 1;
                new += 1;
            }
        }
    }
    positions.push((old, new));

    let mut groups: Vec<(usize, usize)> = Vec::new();
    for (index, _) in ops.iter().enumerate().filter(|(_, (tag, _))| *tag != ' ') {
        match groups.last_mut() {
            Some((_, last)) if index - *last - 1 <= 2 * DIFF_CONTEXT => *last = index,
            _ => groups.push((index, index)),
        }
    }
    if groups.is_empty() {
        return String::new();
    }

    let mut diff = String::from("--- output\n+++ reference");
    for (first, last) in groups {
        let start = first.saturating_sub(DIFF_CONTEXT);
        let end = (last + DIFF_CONTEXT + 1).min(ops.len());
        let (old_start, new_start) = positions[start];
        let (old_end, new_end) = positions[end];
        diff.push_str(&format!(
            "\n@@ -{} +{} @@",
            hunk_range(old_start, old_end - old_start),
            hunk_range(new_start, new_end - new_start)
        ));
        for (tag, line) in &ops[start..end] {
            diff.push('\n');
            diff.push(*tag);
            diff.push_str(line);
        }
    }
    diff
}
