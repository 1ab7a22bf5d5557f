//! Training infrastructure: reference optimizer, datasets and metrics.

pub mod gradient;
pub mod metrics;

pub use gradient::{Dataset, GradientDescent, Sample};
pub use metrics::{ResetEvent, TrainingMetrics};
