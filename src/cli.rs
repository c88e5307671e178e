//! Command-line front end shared by the `harness` binary.

use crate::config::environment::Environment;
use crate::config::presets::{arch_preset, known_presets};
use crate::config::types::HarnessError;
use crate::kernel::signal::install_interrupt_handler;
use crate::pipeline::TestOutcome;
use crate::runner::{discover_targets, run_batch, BatchReport};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

/// Exit status after a Ctrl-C, as a shell would report it.
const EXIT_INTERRUPTED: i32 = 130;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Test files or directories to run
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// JSON file with the base environment
    #[arg(long)]
    config: Option<PathBuf>,
    /// Compiler under test
    #[arg(long)]
    cc: Option<String>,
    /// Extra compiler flags
    #[arg(long, allow_hyphen_values = true)]
    cflags: Option<String>,
    /// Extra linker flags
    #[arg(long, allow_hyphen_values = true)]
    ldflags: Option<String>,
    /// Architecture preset (amd64, x86_64-linux-gnu)
    #[arg(long)]
    arch: Option<String>,
    /// Directory for executables and assembly output
    #[arg(long)]
    builddir: Option<PathBuf>,
    /// CPU seconds per compile step
    #[arg(long)]
    compile_timeout: Option<u64>,
    /// CPU seconds per executed test program
    #[arg(long)]
    timeout: Option<u64>,
    /// Launcher for compiled programs (emulator, wrapper)
    #[arg(long)]
    runexe: Option<String>,
    /// Run the compiler under valgrind memcheck
    #[arg(long)]
    memcheck: bool,
    /// Number of tests run in parallel
    #[arg(short, long, default_value_t = 1)]
    jobs: usize,
    /// Print the batch report as JSON
    #[arg(long)]
    json: bool,
    /// Debug logging (when RUST_LOG is not set)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn environment(&self) -> Result<Environment> {
        let mut env = match &self.config {
            Some(path) => Environment::from_json_file(path)?,
            None => Environment::default(),
        };

        if let Some(cc) = &self.cc {
            env.cc = cc.clone();
        }
        if let Some(cflags) = &self.cflags {
            env.append_cflags(&format!(" {}", cflags));
        }
        if let Some(ldflags) = &self.ldflags {
            env.append_ldflags(&format!(" {}", ldflags));
        }
        if let Some(arch) = &self.arch {
            let preset = arch_preset(arch)
                .with_context(|| format!("known presets: {}", known_presets().join(", ")))?;
            env.apply_arch(&preset);
        }
        if let Some(builddir) = &self.builddir {
            env.builddir = builddir.clone();
        }
        if let Some(timeout) = self.compile_timeout {
            env.compile_timeout = timeout;
        }
        if let Some(timeout) = self.timeout {
            env.execute_timeout = timeout;
        }
        if let Some(runexe) = &self.runexe {
            env.runexe = runexe.clone();
        }
        env.memcheck |= self.memcheck;
        Ok(env)
    }
}

fn print_summary(batch: &BatchReport) {
    for report in &batch.reports {
        match &report.outcome {
            TestOutcome::Passed => println!("{}: ok", report.target),
            TestOutcome::Unverified { reason } => println!("{}: {}", report.target, reason),
            TestOutcome::Failed { step, error, diff } => {
                println!("{}: FAIL [{}] {}", report.target, step, error);
                if let Some(diff) = diff {
                    println!("{}", diff);
                }
            }
        }
    }
    println!(
        "{} tests: {} passed, {} unverified, {} failed",
        batch.total(),
        batch.passed,
        batch.unverified,
        batch.failed
    );
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose && std::env::var_os("RUST_LOG").is_none() {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    if let Err(e) = install_interrupt_handler() {
        log::warn!("{}", e);
    }

    let environment = cli.environment()?;
    let targets = discover_targets(&cli.paths);
    if targets.is_empty() {
        anyhow::bail!("no tests found");
    }

    let batch = match run_batch(&targets, &environment, cli.jobs) {
        Ok(batch) => batch,
        Err(HarnessError::Interrupted) => {
            eprintln!("interrupted");
            std::process::exit(EXIT_INTERRUPTED);
        }
        Err(e) => return Err(e.into()),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        print_summary(&batch);
    }

    if batch.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply_additively() {
        let cli = Cli::parse_from([
            "harness",
            "--cc",
            "gcc",
            "--cflags",
            "-O2",
            "--arch",
            "amd64",
            "--timeout",
            "7",
            "--memcheck",
            "tests/C",
        ]);
        let env = cli.environment().unwrap();
        assert_eq!(env.cc, "gcc");
        assert_eq!(env.cflags, " -O2");
        assert_eq!(env.arch_cflags, "-integrated-cpp -target x86_64-linux-gnu");
        assert_eq!(env.execute_timeout, 7);
        assert!(env.memcheck);
        assert_eq!(cli.paths, vec![PathBuf::from("tests/C")]);
    }

    #[test]
    fn test_unknown_arch_rejected() {
        let cli = Cli::parse_from(["harness", "--arch", "vax", "x.c"]);
        assert!(cli.environment().is_err());
    }
}
