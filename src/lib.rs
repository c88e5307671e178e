//! toolchain-harness: a conformance test harness for compiler toolchains
//!
//! Each test target (a small source file) is turned into a pipeline of
//! steps. A step invokes the toolchain under test in a resource-limited
//! child process; checks then inspect the captured output, usually against a
//! `<target>.ref` sidecar file. The harness never compiles anything itself.
//!
//! # Architecture
//!
//! ## Configuration ([`config`])
//! - [`config::types`]: Error taxonomy
//! - [`config::environment`]: Per-target environment and derived artifact paths
//! - [`config::presets`]: Architecture flag presets
//!
//! ## Kernel Primitives ([`kernel`])
//! - [`kernel::signal`]: Signal-name table and Ctrl-C handling
//! - [`kernel::rlimit`]: Resource limit lowering
//!
//! ## Execution Control ([`exec`])
//! - [`exec::executor`]: Process runner and return-code normalization
//! - [`exec::preexec`]: Child-side limit setup
//!
//! ## Checks ([`checks`])
//! - [`checks::result`]: Step result record
//! - [`checks::diagnostics`]: Warning/error scanner
//! - [`checks::basic`], [`checks::reference`], [`checks::toolchain`],
//!   [`checks::memcheck`]: Check library
//!
//! ## Pipeline ([`pipeline`], [`factory`], [`runner`])
//! - [`pipeline::step`], [`pipeline::test`]: Step/Test state machine
//! - [`pipeline::steps`]: Standard compile/asm/execute steps
//! - [`factory`]: Path rules selecting the pipeline for a target
//! - [`runner`]: Parallel batch execution
//!
//! # Failure model
//!
//! Check failures are recorded on the step result and fail the test.
//! A signal-terminated child fails its test immediately. Only two conditions
//! are raised to the caller: a missing mandatory reference file while a
//! pipeline is built, and an interrupt that should stop the whole batch.

// Configuration
pub mod config;

// Kernel Primitives
pub mod kernel;

// Execution Control
pub mod exec;

// Checks
pub mod checks;

// Pipeline
pub mod factory;
pub mod pipeline;
pub mod runner;

// CLI entrypoint for the harness binary.
pub mod cli;

pub use config::environment::Environment;
pub use config::types::{HarnessError, Result};
