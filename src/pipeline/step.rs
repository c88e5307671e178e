//! One named unit of work and its checks

use crate::checks::{Check, StepResult};
use crate::config::environment::Environment;
use crate::config::types::Result;
use crate::exec::SigKill;
use log::debug;

/// What a step action produced.
#[derive(Debug, Clone)]
pub enum StepRun {
    /// The process ran to completion; checks decide whether it passed
    Completed(StepResult),
    /// The process was terminated by a signal
    Killed(SigKill),
}

/// Runs the step's process invocation against an environment.
pub type StepAction = Box<dyn Fn(&Environment) -> Result<StepRun> + Send + Sync>;

/// A process invocation plus the checks applied to its result.
pub struct Step {
    name: String,
    action: StepAction,
    checks: Vec<Box<dyn Check>>,
}

impl Step {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Environment) -> Result<StepRun> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            action: Box::new(action),
            checks: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Append a check; checks run in the order they were added.
    pub fn add_check<C: Check + 'static>(&mut self, check: C) -> &mut Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Append an already boxed check, as returned by the check factories.
    pub fn add_boxed_check(&mut self, check: Box<dyn Check>) -> &mut Self {
        self.checks.push(check);
        self
    }

    pub fn add_checks<I>(&mut self, checks: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn Check>>,
    {
        self.checks.extend(checks);
        self
    }

    /// Run the action, then every check in order.
    ///
    /// All checks run even after one of them recorded an error, so later
    /// checks can still add supplementary details such as a diff.
    pub fn execute(&self, environment: &Environment) -> Result<StepRun> {
        debug!("step '{}': running", self.name);
        let mut result = match (self.action)(environment)? {
            StepRun::Completed(result) => result,
            killed @ StepRun::Killed(_) => return Ok(killed),
        };

        for check in &self.checks {
            check.apply(&mut result);
        }

        if let Some(error) = &result.error {
            debug!("step '{}': failed: {}", self.name, error);
        }
        Ok(StepRun::Completed(result))
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("checks", &self.checks.len())
            .finish()
    }
}
