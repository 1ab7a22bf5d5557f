//! Linear regression model: `bias + Σ wᵢ·xᵢ`.

use crate::error::TrainError;
use crate::model::{Model, Resettable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Initial parameters are drawn uniformly from `[-INIT_RANGE, INIT_RANGE)`.
const INIT_RANGE: f64 = 0.5;

/// Dense linear model. `params[0]` is the bias, the rest are input weights.
#[derive(Debug, Clone)]
pub struct LinearModel {
    name: String,
    inputs: usize,
    params: Vec<f64>,
    rng: StdRng,
}

impl LinearModel {
    /// Create a randomly initialized model.
    pub fn new(inputs: usize) -> Self {
        Self::with_rng(inputs, StdRng::from_entropy())
    }

    /// Create a deterministically initialized model.
    pub fn seeded(inputs: usize, seed: u64) -> Self {
        Self::with_rng(inputs, StdRng::seed_from_u64(seed))
    }

    /// Create a model with explicit parameters (bias first).
    pub fn from_parameters(params: Vec<f64>) -> Result<Self, TrainError> {
        if params.is_empty() {
            return Err(TrainError::model("linear model needs at least a bias term"));
        }
        Ok(Self {
            name: "linear".to_string(),
            inputs: params.len() - 1,
            params,
            rng: StdRng::from_entropy(),
        })
    }

    fn with_rng(inputs: usize, mut rng: StdRng) -> Self {
        let params = Self::draw(&mut rng, inputs);
        Self {
            name: "linear".to_string(),
            inputs,
            params,
            rng,
        }
    }

    fn draw(rng: &mut StdRng, inputs: usize) -> Vec<f64> {
        (0..=inputs)
            .map(|_| rng.gen_range(-INIT_RANGE..INIT_RANGE))
            .collect()
    }

    pub fn inputs(&self) -> usize {
        self.inputs
    }
}

impl Model for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> &[f64] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.params
    }

    fn forward(&self, input: &[f64]) -> Result<f64, TrainError> {
        if input.len() != self.inputs {
            return Err(TrainError::model(format!(
                "expected {} inputs, got {}",
                self.inputs,
                input.len()
            )));
        }
        let weighted: f64 = self.params[1..]
            .iter()
            .zip(input)
            .map(|(w, x)| w * x)
            .sum();
        Ok(self.params[0] + weighted)
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        Some(self)
    }
}

impl Resettable for LinearModel {
    fn reset(&mut self) -> Result<(), TrainError> {
        // Draw into a fresh buffer so the swap is all-or-nothing.
        let fresh = Self::draw(&mut self.rng, self.inputs);
        self.params = fresh;
        Ok(())
    }

    fn reset_with_seed(&mut self, seed: u64) -> Result<(), TrainError> {
        self.rng = StdRng::seed_from_u64(seed);
        self.reset()
    }
}
