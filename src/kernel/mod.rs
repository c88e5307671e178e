//! Thin wrappers around kernel primitives used by the process runner.
//!
//! Dependency direction: signal -> rlimit

pub mod rlimit;
pub mod signal;
