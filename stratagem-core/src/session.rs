//! Training session: owns the optimization loop and drives strategy hooks.
//!
//! Per iteration the session calls every strategy's `before_iteration` in
//! insertion order, performs exactly one optimizer step, records the new
//! error, then calls every `after_iteration` in insertion order. Hooks never
//! overlap each other or the step.

use crate::error::TrainError;
use crate::model::Model;
use crate::strategy::Strategy;
use crate::training::metrics::{ResetEvent, TrainingMetrics};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Performs one optimization step on a model.
pub trait Optimizer: Send {
    fn name(&self) -> &str;

    /// Update the model's parameters once and return the resulting error.
    fn step(&mut self, model: &mut dyn Model) -> Result<f64, TrainError>;
}

/// Something a strategy did to the session that should show up in metrics.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ModelReset {
        strategy: String,
        iteration: usize,
        error: f64,
    },
}

/// The session as seen from inside a strategy hook.
pub trait SessionView {
    /// Identity of the session, used to bind strategies.
    fn id(&self) -> Uuid;

    /// Number of completed iterations.
    fn iteration(&self) -> usize;

    /// Latest error measurement, `None` until the first step completes.
    fn error(&self) -> Option<f64>;

    fn model(&self) -> &dyn Model;

    fn model_mut(&mut self) -> &mut dyn Model;

    fn record_event(&mut self, event: SessionEvent);
}

/// Mutable state of a session, handed to strategies through [`SessionView`].
pub struct SessionState {
    id: Uuid,
    model: Box<dyn Model>,
    error: Option<f64>,
    metrics: TrainingMetrics,
}

impl SessionState {
    pub fn new(model: Box<dyn Model>) -> Self {
        Self {
            id: Uuid::new_v4(),
            model,
            error: None,
            metrics: TrainingMetrics::default(),
        }
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }

    fn record_error(&mut self, error: f64) {
        self.error = Some(error);
        self.metrics.record_iteration(error);
    }
}

impl SessionView for SessionState {
    fn id(&self) -> Uuid {
        self.id
    }

    fn iteration(&self) -> usize {
        self.metrics.iterations_completed
    }

    fn error(&self) -> Option<f64> {
        self.error
    }

    fn model(&self) -> &dyn Model {
        self.model.as_ref()
    }

    fn model_mut(&mut self) -> &mut dyn Model {
        self.model.as_mut()
    }

    fn record_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::ModelReset {
                strategy,
                iteration,
                error,
            } => self.metrics.record_reset(ResetEvent {
                strategy,
                iteration,
                error,
            }),
        }
    }
}

/// Why a call to [`TrainingSession::train`] returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// A strategy's end condition was met.
    Strategy(String),
    /// The caller's iteration cap was reached.
    IterationCap,
}

/// Summary of a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub session_id: Uuid,
    pub model: String,
    pub optimizer: String,
    pub iterations: usize,
    pub final_error: Option<f64>,
    pub best_error: Option<f64>,
    pub resets: Vec<ResetEvent>,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// A training session: one model, one optimizer, an ordered list of strategies.
pub struct TrainingSession {
    state: SessionState,
    optimizer: Box<dyn Optimizer>,
    strategies: Vec<Box<dyn Strategy>>,
}

impl TrainingSession {
    pub fn new(model: Box<dyn Model>, optimizer: Box<dyn Optimizer>) -> Self {
        Self {
            state: SessionState::new(model),
            optimizer,
            strategies: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn error(&self) -> Option<f64> {
        self.state.error
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        self.state.metrics()
    }

    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Attach a strategy and append it to the dispatch order.
    ///
    /// A strategy that fails to attach is dropped; the session itself stays
    /// usable.
    pub fn add_strategy(&mut self, mut strategy: Box<dyn Strategy>) -> Result<(), TrainError> {
        if let Err(e) = strategy.attach(&mut self.state) {
            tracing::warn!(strategy = strategy.name(), error = %e, "Strategy attachment failed");
            return Err(e);
        }
        tracing::debug!(
            session = %self.state.id,
            strategy = strategy.name(),
            "Strategy attached"
        );
        self.strategies.push(strategy);
        Ok(())
    }

    /// Run one iteration: pre-hooks, one optimizer step, post-hooks.
    pub fn iteration(&mut self) -> Result<f64, TrainError> {
        for strategy in &mut self.strategies {
            strategy.before_iteration(&mut self.state)?;
        }

        let error = self.optimizer.step(self.state.model.as_mut())?;
        self.state.record_error(error);
        tracing::trace!(
            iteration = self.state.iteration(),
            error,
            "Iteration complete"
        );

        for strategy in &mut self.strategies {
            strategy.after_iteration(&mut self.state)?;
        }
        Ok(error)
    }

    /// Name of the first strategy whose end condition is met, if any.
    pub fn should_stop(&self) -> Option<&str> {
        self.strategies
            .iter()
            .find(|s| s.should_stop(&self.state))
            .map(|s| s.name())
    }

    /// Iterate until a strategy ends training or `max_iterations` more
    /// iterations have run.
    pub fn train(&mut self, max_iterations: usize) -> Result<TrainingReport, TrainError> {
        let started_at = Utc::now();
        tracing::info!(
            session = %self.state.id,
            model = self.state.model.name(),
            optimizer = self.optimizer.name(),
            strategies = ?self.strategy_names(),
            max_iterations,
            "Training started"
        );

        let mut stop_reason = StopReason::IterationCap;
        for _ in 0..max_iterations {
            if let Some(name) = self.should_stop() {
                stop_reason = StopReason::Strategy(name.to_string());
                break;
            }
            self.iteration()?;
        }
        if stop_reason == StopReason::IterationCap {
            if let Some(name) = self.should_stop() {
                stop_reason = StopReason::Strategy(name.to_string());
            }
        }

        let metrics = self.state.metrics();
        let report = TrainingReport {
            session_id: self.state.id,
            model: self.state.model.name().to_string(),
            optimizer: self.optimizer.name().to_string(),
            iterations: metrics.iterations_completed,
            final_error: metrics.last_error(),
            best_error: metrics.best_error,
            resets: metrics.resets.clone(),
            stop_reason,
            started_at,
            finished_at: Utc::now(),
        };
        tracing::info!(
            session = %report.session_id,
            iterations = report.iterations,
            final_error = ?report.final_error,
            resets = report.resets.len(),
            stop_reason = ?report.stop_reason,
            "Training finished"
        );
        Ok(report)
    }
}
