//! Full-batch gradient descent on mean squared error.
//!
//! Gradients are estimated with central finite differences over
//! [`Model::parameters_mut`], so any [`Model`] can be trained without
//! exposing its structure.

use crate::config::{DatasetConfig, OptimizerConfig};
use crate::error::TrainError;
use crate::model::Model;
use crate::session::Optimizer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// One training example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub inputs: Vec<f64>,
    pub target: f64,
}

/// In-memory training set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub samples: Vec<Sample>,
}

impl Dataset {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Generate `y = slope · Σx + intercept` plus uniform noise, with inputs
    /// drawn from `[-1, 1)`.
    pub fn linear(config: &DatasetConfig, inputs: usize, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let samples = (0..config.samples)
            .map(|_| {
                let xs: Vec<f64> = (0..inputs).map(|_| rng.gen_range(-1.0..1.0)).collect();
                let noise = if config.noise > 0.0 {
                    rng.gen_range(-config.noise..config.noise)
                } else {
                    0.0
                };
                let target = config.slope * xs.iter().sum::<f64>() + config.intercept + noise;
                Sample { inputs: xs, target }
            })
            .collect();
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Mean squared error of `model` over the whole set.
    pub fn mse(&self, model: &dyn Model) -> Result<f64, TrainError> {
        if self.samples.is_empty() {
            return Err(TrainError::model("cannot evaluate on an empty dataset"));
        }
        let mut total = 0.0;
        for sample in &self.samples {
            let diff = model.forward(&sample.inputs)? - sample.target;
            total += diff * diff;
        }
        Ok(total / self.samples.len() as f64)
    }
}

/// Gradient descent optimizer.
#[derive(Debug, Clone)]
pub struct GradientDescent {
    dataset: Dataset,
    pub learning_rate: f64,
    pub epsilon: f64,
}

impl GradientDescent {
    pub fn new(dataset: Dataset, config: &OptimizerConfig) -> Self {
        Self {
            dataset,
            learning_rate: config.learning_rate,
            epsilon: config.epsilon,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    fn gradient(&self, model: &mut dyn Model) -> Result<Vec<f64>, TrainError> {
        let count = model.parameters().len();
        let mut grad = Vec::with_capacity(count);
        for i in 0..count {
            let original = model.parameters()[i];

            model.parameters_mut()[i] = original + self.epsilon;
            let plus = self.dataset.mse(model);
            model.parameters_mut()[i] = original - self.epsilon;
            let minus = self.dataset.mse(model);
            model.parameters_mut()[i] = original;

            grad.push((plus? - minus?) / (2.0 * self.epsilon));
        }
        Ok(grad)
    }
}

impl Optimizer for GradientDescent {
    fn name(&self) -> &str {
        "gradient_descent"
    }

    fn step(&mut self, model: &mut dyn Model) -> Result<f64, TrainError> {
        let grad = self.gradient(model)?;
        for (param, g) in model.parameters_mut().iter_mut().zip(&grad) {
            *param -= self.learning_rate * g;
        }
        self.dataset.mse(model)
    }
}
