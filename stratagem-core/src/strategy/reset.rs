//! Adaptive restart. Reinitializes the model when training stagnates.
//!
//! Before every iteration the latest error is compared with the required
//! level. Each unacceptable measurement adds a bad cycle; an acceptable one
//! forgives all of them at once. When the count exceeds the patience window
//! (strictly: `cycles + 1` consecutive bad measurements) the model is reset
//! and the count starts over.
//!
//! A single good measurement masks any amount of prior stagnation, so a
//! noisy error signal that dips below the threshold now and then will
//! postpone resets indefinitely.

use crate::config::validate_error_level;
use crate::error::TrainError;
use crate::session::{SessionEvent, SessionView};
use crate::strategy::{Binding, Strategy};

const NAME: &str = "reset";

/// Resets the model after too many consecutive iterations above the
/// required error.
#[derive(Debug, Clone)]
pub struct ResetStrategy {
    required_error: f64,
    cycles: usize,
    bad_cycles: usize,
    resets: usize,
    binding: Binding,
}

impl ResetStrategy {
    /// `required_error` must be finite and non-negative. `cycles == 0`
    /// resets on every bad measurement.
    pub fn new(required_error: f64, cycles: usize) -> Result<Self, TrainError> {
        validate_error_level("required_error", required_error)?;
        Ok(Self {
            required_error,
            cycles,
            bad_cycles: 0,
            resets: 0,
            binding: Binding::new(),
        })
    }

    pub fn required_error(&self) -> f64 {
        self.required_error
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Consecutive unacceptable measurements since the last reset or
    /// acceptable measurement.
    pub fn bad_cycles(&self) -> usize {
        self.bad_cycles
    }

    /// Resets triggered so far.
    pub fn resets(&self) -> usize {
        self.resets
    }

    fn reset_model(
        &mut self,
        session: &mut dyn SessionView,
        error: f64,
    ) -> Result<(), TrainError> {
        let iteration = session.iteration();
        let model = session.model_mut();
        let model_name = model.name().to_string();

        tracing::info!(
            strategy = NAME,
            model = %model_name,
            iteration,
            error,
            required = self.required_error,
            bad_cycles = self.bad_cycles,
            "stagnation detected, resetting"
        );

        // The window is spent whether or not the reset succeeds.
        self.bad_cycles = 0;

        let Some(resettable) = model.as_resettable() else {
            return Err(TrainError::reset_failed(
                model_name,
                "model no longer exposes the reset capability",
            ));
        };
        resettable.reset().map_err(|e| match e {
            TrainError::ResetFailed { .. } => e,
            other => TrainError::reset_failed(model_name, other.to_string()),
        })?;

        self.resets += 1;
        session.record_event(SessionEvent::ModelReset {
            strategy: NAME.to_string(),
            iteration,
            error,
        });
        Ok(())
    }
}

impl Strategy for ResetStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn attach(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        if self.binding.is_bound() {
            return Err(TrainError::AlreadyAttached {
                strategy: NAME.to_string(),
            });
        }
        let model = session.model_mut();
        if model.as_resettable().is_none() {
            return Err(TrainError::capability_mismatch(NAME, model.name(), "reset"));
        }
        self.binding.bind(NAME, session)
    }

    fn before_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.check(NAME, session)?;

        // Nothing has been measured before the first step.
        let Some(error) = session.error() else {
            return Ok(());
        };

        if error <= self.required_error {
            self.bad_cycles = 0;
            return Ok(());
        }

        self.bad_cycles += 1;
        if self.bad_cycles > self.cycles {
            self.reset_model(session, error)?;
        }
        Ok(())
    }

    fn after_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.check(NAME, session)
    }
}
