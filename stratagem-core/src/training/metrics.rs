//! Training metrics tracking.

use serde::{Deserialize, Serialize};

/// A model reset performed by a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetEvent {
    pub strategy: String,
    /// Iterations completed when the reset happened.
    pub iteration: usize,
    /// Error measurement that tipped the strategy over its patience window.
    pub error: f64,
}

/// Training metrics for a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub iterations_completed: usize,
    pub error_history: Vec<f64>,
    pub best_iteration: Option<usize>,
    pub best_error: Option<f64>,
    pub resets: Vec<ResetEvent>,
}

impl TrainingMetrics {
    pub fn record_iteration(&mut self, error: f64) {
        self.error_history.push(error);
        self.iterations_completed += 1;

        if self.best_error.is_none_or(|best| error < best) {
            self.best_error = Some(error);
            self.best_iteration = Some(self.iterations_completed);
        }
    }

    pub fn record_reset(&mut self, event: ResetEvent) {
        self.resets.push(event);
    }

    pub fn last_error(&self) -> Option<f64> {
        self.error_history.last().copied()
    }
}
