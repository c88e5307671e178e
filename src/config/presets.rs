//! Architecture presets
//!
//! Each preset fixes the target-specific compiler and linker flags that are
//! appended to every test of a run. Presets are immutable and looked up by name.

use crate::config::types::{HarnessError, Result};

pub const X86_64_TRIPLE: &str = "x86_64-linux-gnu";

/// Target architecture flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchPreset {
    /// Canonical name (target triple)
    pub name: &'static str,
    pub cflags: &'static str,
    pub ldflags: &'static str,
    /// Extra test directories only meaningful for this architecture
    pub arch_dirs: &'static [&'static str],
}

const X86_64: ArchPreset = ArchPreset {
    name: X86_64_TRIPLE,
    cflags: "-integrated-cpp -target x86_64-linux-gnu",
    ldflags: "",
    arch_dirs: &["x86_64code"],
};

/// Resolve a preset by its short alias or target triple.
pub fn arch_preset(name: &str) -> Result<ArchPreset> {
    match name {
        "amd64" | X86_64_TRIPLE => Ok(X86_64),
        _ => Err(HarnessError::Config(format!(
            "unknown architecture preset: {name}"
        ))),
    }
}

/// Names accepted by [`arch_preset`].
pub fn known_presets() -> &'static [&'static str] {
    &["amd64", X86_64_TRIPLE]
}
