//! End-condition strategies, deciding when a session has trained enough.

use crate::config::validate_error_level;
use crate::error::TrainError;
use crate::session::SessionView;
use crate::strategy::{Binding, Strategy};

/// Stops after a fixed number of completed iterations.
#[derive(Debug, Clone)]
pub struct EndIterationsStrategy {
    max_iterations: usize,
    binding: Binding,
}

impl EndIterationsStrategy {
    pub fn new(max_iterations: usize) -> Result<Self, TrainError> {
        if max_iterations == 0 {
            return Err(TrainError::invalid_config("max_iterations must be > 0"));
        }
        Ok(Self {
            max_iterations,
            binding: Binding::new(),
        })
    }
}

impl Strategy for EndIterationsStrategy {
    fn name(&self) -> &str {
        "end_iterations"
    }

    fn attach(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.bind("end_iterations", session)
    }

    fn before_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.check("end_iterations", session)
    }

    fn after_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.check("end_iterations", session)
    }

    fn should_stop(&self, session: &dyn SessionView) -> bool {
        self.binding.is_bound() && session.iteration() >= self.max_iterations
    }
}

/// Stops once the error falls below a target.
#[derive(Debug, Clone)]
pub struct EndMaxErrorStrategy {
    target_error: f64,
    binding: Binding,
}

impl EndMaxErrorStrategy {
    pub fn new(target_error: f64) -> Result<Self, TrainError> {
        validate_error_level("target_error", target_error)?;
        Ok(Self {
            target_error,
            binding: Binding::new(),
        })
    }
}

impl Strategy for EndMaxErrorStrategy {
    fn name(&self) -> &str {
        "end_max_error"
    }

    fn attach(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.bind("end_max_error", session)
    }

    fn before_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.check("end_max_error", session)
    }

    fn after_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.check("end_max_error", session)
    }

    fn should_stop(&self, session: &dyn SessionView) -> bool {
        self.binding.is_bound() && session.error().is_some_and(|e| e < self.target_error)
    }
}

/// Stops when the best error has not improved by at least `min_improvement`
/// for `cycles` consecutive iterations.
#[derive(Debug, Clone)]
pub struct StopTrainingStrategy {
    min_improvement: f64,
    cycles: usize,
    counter: usize,
    best_error: Option<f64>,
    binding: Binding,
}

impl StopTrainingStrategy {
    pub fn new(min_improvement: f64, cycles: usize) -> Result<Self, TrainError> {
        validate_error_level("min_improvement", min_improvement)?;
        if cycles == 0 {
            return Err(TrainError::invalid_config("improvement cycles must be > 0"));
        }
        Ok(Self {
            min_improvement,
            cycles,
            counter: 0,
            best_error: None,
            binding: Binding::new(),
        })
    }

    /// Iterations since the last sufficient improvement.
    pub fn stalled_for(&self) -> usize {
        self.counter
    }

    fn observe(&mut self, error: f64) {
        match self.best_error {
            None => self.best_error = Some(error),
            Some(best) if error < best - self.min_improvement => {
                self.best_error = Some(error);
                self.counter = 0;
            }
            Some(_) => self.counter += 1,
        }
    }
}

impl Strategy for StopTrainingStrategy {
    fn name(&self) -> &str {
        "stop_training"
    }

    fn attach(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.bind("stop_training", session)
    }

    fn before_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.check("stop_training", session)
    }

    fn after_iteration(&mut self, session: &mut dyn SessionView) -> Result<(), TrainError> {
        self.binding.check("stop_training", session)?;
        if let Some(error) = session.error() {
            self.observe(error);
        }
        Ok(())
    }

    fn should_stop(&self, _session: &dyn SessionView) -> bool {
        self.binding.is_bound() && self.counter >= self.cycles
    }
}
