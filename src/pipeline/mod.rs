//! Step/Test pipeline
//!
//! A [`Test`] owns its environment and an ordered list of [`Step`]s; each
//! step runs one process invocation and applies its checks to the result.

pub mod step;
pub mod steps;

pub use step::{Step, StepAction, StepRun};
pub use test::{Test, TestOutcome, TestReport, TestState};
