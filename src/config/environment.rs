//! Per-target configuration consumed by pipeline steps

use crate::checks::diagnostics::DiagnosticMarkers;
use crate::config::presets::ArchPreset;
use crate::config::types::{HarnessError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved configuration for one test target.
///
/// Setup code only ever appends to the flag strings; once the first step
/// runs the environment is treated as read-only.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Compiler binary under test
    pub cc: String,
    pub cflags: String,
    pub ldflags: String,
    pub arch_cflags: String,
    pub arch_ldflags: String,
    /// CPU seconds for compile steps (0 disables the limit)
    pub compile_timeout: u64,
    /// CPU seconds for running the compiled program (0 disables the limit)
    pub execute_timeout: u64,
    /// Optional launcher placed in front of the executable (emulator, wrapper)
    pub runexe: String,
    pub builddir: PathBuf,
    /// Target source file
    pub filename: String,
    pub executable: Option<PathBuf>,
    pub asmfile: Option<PathBuf>,
    /// Run compile steps under valgrind memcheck
    pub memcheck: bool,
    /// Replacement child environment; `None` inherits ours
    pub env_vars: Option<Vec<(String, String)>>,
    pub diagnostic_markers: DiagnosticMarkers,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            cc: "cparser".to_string(),
            cflags: String::new(),
            ldflags: String::new(),
            arch_cflags: String::new(),
            arch_ldflags: String::new(),
            compile_timeout: 60,
            execute_timeout: 30,
            runexe: String::new(),
            builddir: PathBuf::from("build"),
            filename: String::new(),
            executable: None,
            asmfile: None,
            memcheck: false,
            env_vars: None,
            diagnostic_markers: DiagnosticMarkers::default(),
        }
    }
}

impl Environment {
    /// Load a base environment from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            HarnessError::Config(format!("invalid config {}: {}", path.display(), e))
        })
    }

    pub fn append_cflags(&mut self, flags: &str) {
        self.cflags.push_str(flags);
    }

    pub fn append_ldflags(&mut self, flags: &str) {
        self.ldflags.push_str(flags);
    }

    pub fn apply_arch(&mut self, preset: &ArchPreset) {
        self.arch_cflags = preset.cflags.to_string();
        self.arch_ldflags = preset.ldflags.to_string();
    }

    /// Bind the environment to a C source target: architecture flags and the
    /// target's directory as an include path are appended.
    pub fn setup_c(&mut self, filename: &str) {
        self.filename = filename.to_string();
        let arch_cflags = format!(" {}", self.arch_cflags);
        self.append_cflags(&arch_cflags);

        let dir = Path::new(filename)
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.append_cflags(&format!(" -I{} ", dir));

        let arch_ldflags = format!(" {}", self.arch_ldflags);
        self.append_ldflags(&arch_ldflags);
    }

    /// Sidecar reference file of the current target (`<filename>.ref`).
    pub fn reference_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.ref", self.filename))
    }

    /// Artifact path below the build directory. The target name is appended
    /// verbatim, so absolute targets still land inside `builddir`.
    fn build_artifact(&self, suffix: &str) -> PathBuf {
        PathBuf::from(format!(
            "{}/{}{}",
            self.builddir.display(),
            self.filename,
            suffix
        ))
    }

    /// `<builddir>/<filename>.exe`, remembered on the environment.
    pub fn derive_executable(&mut self) -> PathBuf {
        let path = self.build_artifact(".exe");
        self.executable = Some(path.clone());
        path
    }

    /// `<builddir>/<filename>.s`, remembered on the environment.
    pub fn derive_asmfile(&mut self) -> PathBuf {
        let path = self.build_artifact(".s");
        self.asmfile = Some(path.clone());
        path
    }

    pub fn executable_path(&self) -> Result<&Path> {
        self.executable
            .as_deref()
            .ok_or_else(|| {
                HarnessError::Config(format!("no executable path for {}", self.filename))
            })
    }

    pub fn asm_path(&self) -> Result<&Path> {
        self.asmfile
            .as_deref()
            .ok_or_else(|| {
                HarnessError::Config(format!("no assembly path for {}", self.filename))
            })
    }
}

/// Create the parent directory of an artifact path.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_appends_flags() {
        let mut env = Environment {
            cflags: "-O2".to_string(),
            arch_cflags: "-m32".to_string(),
            arch_ldflags: "-static".to_string(),
            ..Environment::default()
        };
        env.setup_c("C/tests/hello.c");
        env.append_cflags(" -std=c99");

        assert_eq!(env.filename, "C/tests/hello.c");
        assert_eq!(env.cflags, "-O2 -m32 -IC/tests  -std=c99");
        assert_eq!(env.ldflags, " -static");
    }

    #[test]
    fn test_derived_paths() {
        let mut env = Environment {
            builddir: PathBuf::from("/tmp/build"),
            filename: "C/hello.c".to_string(),
            ..Environment::default()
        };
        assert!(env.executable_path().is_err());

        let exe = env.derive_executable();
        assert_eq!(exe, PathBuf::from("/tmp/build/C/hello.c.exe"));
        assert_eq!(env.executable_path().unwrap(), exe.as_path());

        let asm = env.derive_asmfile();
        assert_eq!(asm, PathBuf::from("/tmp/build/C/hello.c.s"));

        env.filename = "/abs/t.c".to_string();
        assert!(env.derive_executable().starts_with("/tmp/build"));
        assert_eq!(env.reference_path(), PathBuf::from("C/hello.c.ref"));
    }

    #[test]
    fn test_json_defaults() {
        let dir = std::env::temp_dir().join(format!("harness_test_env_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        fs::write(&path, r#"{"cc": "gcc", "memcheck": true}"#).unwrap();

        let env = Environment::from_json_file(&path).unwrap();
        assert_eq!(env.cc, "gcc");
        assert!(env.memcheck);
        assert_eq!(env.compile_timeout, 60);

        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Environment::from_json_file(&path),
            Err(HarnessError::Config(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = std::env::temp_dir().join(format!("harness_test_dirs_{}", std::process::id()));
        let artifact = dir.join("a/b/c.exe");
        ensure_parent_dir(&artifact).unwrap();
        assert!(dir.join("a/b").is_dir());
        let _ = fs::remove_dir_all(&dir);
    }
}
