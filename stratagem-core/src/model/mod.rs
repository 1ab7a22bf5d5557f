//! Trainable models and their optional capabilities.

pub mod linear;

pub use linear::LinearModel;

use crate::error::TrainError;

/// A trainable entity driven by a [`crate::session::TrainingSession`].
pub trait Model: Send {
    /// Human-readable model name, used in logs and errors.
    fn name(&self) -> &str;

    /// Current trainable parameters.
    fn parameters(&self) -> &[f64];

    /// Mutable access for optimizers.
    fn parameters_mut(&mut self) -> &mut [f64];

    /// Evaluate the model on one input row.
    fn forward(&self, input: &[f64]) -> Result<f64, TrainError>;

    /// Capability query: models that can reinitialize their trainable
    /// state return a handle to do so.
    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        None
    }
}

/// Capability of reinitializing all trainable state.
///
/// Implementations must be atomic: on `Err` the model is left exactly as it
/// was before the call.
pub trait Resettable {
    /// Reinitialize trainable state from the model's own entropy source.
    fn reset(&mut self) -> Result<(), TrainError>;

    /// Reinitialize trainable state deterministically.
    fn reset_with_seed(&mut self, seed: u64) -> Result<(), TrainError>;
}
