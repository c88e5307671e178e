//! Configuration
//!
//! Environment, presets, and the error taxonomy.

pub mod environment;
pub mod presets;
pub mod types;
