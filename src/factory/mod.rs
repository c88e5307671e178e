//! Test factories
//!
//! The pipeline stays toolchain-agnostic. Factories decide, from a target
//! path, which steps and checks make up its test.

pub mod c;
pub mod registry;

use crate::config::environment::Environment;
use crate::config::types::Result;
use crate::pipeline::Test;

/// Builds the test for one target. The environment is the factory's own copy.
pub type TestFactory = fn(Environment, &str) -> Result<Test>;

pub use registry::{build_test, factory_for, FactoryRule};
