//! # stratagem-core: Training Strategies & Adaptive Restarts
//!
//! A [`TrainingSession`] drives an opaque optimizer over a model and invokes
//! pluggable [`Strategy`] hooks around every iteration. Strategies observe the
//! session's error and may steer it, e.g. [`ResetStrategy`] reinitializes the
//! model after it has stagnated above a required error for too long.
//!
//! ```no_run
//! use stratagem_core::{LinearModel, ResetStrategy, TrainingSession};
//! use stratagem_core::training::{Dataset, GradientDescent};
//! use stratagem_core::config::{DatasetConfig, OptimizerConfig};
//!
//! let data = Dataset::linear(&DatasetConfig::default(), 1, Some(7));
//! let mut session = TrainingSession::new(
//!     Box::new(LinearModel::seeded(1, 7)),
//!     Box::new(GradientDescent::new(data, &OptimizerConfig::default())),
//! );
//! session.add_strategy(Box::new(ResetStrategy::new(0.01, 5)?))?;
//! let report = session.train(500)?;
//! println!("{} resets", report.resets.len());
//! # Ok::<(), stratagem_core::TrainError>(())
//! ```

pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod strategy;
pub mod training;

// Re-exports
pub use config::TrainingConfig;
pub use error::TrainError;
pub use model::{LinearModel, Model, Resettable};
pub use session::{Optimizer, SessionView, StopReason, TrainingReport, TrainingSession};
pub use strategy::{ResetStrategy, Strategy};

use training::{Dataset, GradientDescent};

/// Assemble a session from configuration: a [`LinearModel`] trained by
/// [`GradientDescent`] on a synthetic dataset, with the configured
/// strategies attached in dispatch order.
pub fn build_session(config: &TrainingConfig) -> Result<TrainingSession, TrainError> {
    config.validate()?;

    let model = match config.model.seed {
        Some(seed) => LinearModel::seeded(config.model.inputs, seed),
        None => LinearModel::new(config.model.inputs),
    };
    let dataset = Dataset::linear(&config.dataset, config.model.inputs, config.model.seed);
    let optimizer = GradientDescent::new(dataset, &config.optimizer);

    let mut session = TrainingSession::new(Box::new(model), Box::new(optimizer));
    for strategy in strategy::from_config(config)? {
        session.add_strategy(strategy)?;
    }

    tracing::debug!(
        session = %session.id(),
        strategies = ?session.strategy_names(),
        "Session assembled"
    );
    Ok(session)
}
