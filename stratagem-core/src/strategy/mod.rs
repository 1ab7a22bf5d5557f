//! Training strategies: hooks that observe and steer a session between
//! iterations without knowing which optimizer it runs.

pub mod end;
pub mod reset;

pub use end::{EndIterationsStrategy, EndMaxErrorStrategy, StopTrainingStrategy};
pub use reset::ResetStrategy;

use crate::config::TrainingConfig;
use crate::error::TrainError;
use crate::session::SessionView;
use uuid::Uuid;

/// Trait for training strategies.
///
/// The session calls `attach` exactly once, then `before_iteration` and
/// `after_iteration` around every optimizer step, always in that order.
pub trait Strategy: Send {
    fn name(&self) -> &str;

    /// Bind to a session. Strategies that need a model capability must
    /// check for it here and fail instead of at first use.
    fn attach(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError>;

    /// Called just before an optimizer step.
    fn before_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError>;

    /// Called just after an optimizer step.
    fn after_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError>;

    /// End condition. Checked by the session between iterations.
    fn should_stop(&self, _session: &dyn SessionView) -> bool {
        false
    }
}

/// Single-attachment lifecycle shared by the built-in strategies.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    session: Option<Uuid>,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_bound(&self) -> bool {
        self.session.is_some()
    }

    /// Record the session. Re-attachment is rejected.
    pub fn bind(&mut self, strategy: &str, session: &dyn SessionView) -> Result<(), TrainError> {
        if self.session.is_some() {
            return Err(TrainError::AlreadyAttached {
                strategy: strategy.to_string(),
            });
        }
        self.session = Some(session.id());
        Ok(())
    }

    /// Ensure a hook is running against the bound session.
    pub fn check(&self, strategy: &str, session: &dyn SessionView) -> Result<(), TrainError> {
        match self.session {
            None => Err(TrainError::NotAttached {
                strategy: strategy.to_string(),
            }),
            Some(id) if id != session.id() => Err(TrainError::SessionMismatch {
                strategy: strategy.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }
}

/// Build the strategy list described by a config, in dispatch order:
/// adaptive restart first, then end conditions.
pub fn from_config(config: &TrainingConfig) -> Result<Vec<Box<dyn Strategy>>, TrainError> {
    let mut strategies: Vec<Box<dyn Strategy>> = Vec::new();

    if let Some(stagnation) = &config.stagnation {
        strategies.push(Box::new(ResetStrategy::new(
            stagnation.required_error,
            stagnation.cycles,
        )?));
    }

    strategies.push(Box::new(EndIterationsStrategy::new(
        config.end.max_iterations,
    )?));

    if let Some(target) = config.end.target_error {
        strategies.push(Box::new(EndMaxErrorStrategy::new(target)?));
    }

    if let Some(min_improvement) = config.end.min_improvement {
        strategies.push(Box::new(StopTrainingStrategy::new(
            min_improvement,
            config.end.improvement_cycles,
        )?));
    }

    Ok(strategies)
}
