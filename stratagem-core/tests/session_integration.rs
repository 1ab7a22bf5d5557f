//! End-to-end tests: real sessions with the adaptive restart attached.

use pretty_assertions::assert_eq;
use stratagem_core::config::{DatasetConfig, OptimizerConfig, StagnationConfig};
use stratagem_core::strategy::{EndMaxErrorStrategy, ResetStrategy};
use stratagem_core::training::{Dataset, GradientDescent};
use stratagem_core::{
    LinearModel, Model, Optimizer, SessionView, StopReason, TrainError, TrainingConfig,
    TrainingSession, build_session,
};

/// An optimizer that never makes progress.
struct Stuck(f64);

impl Optimizer for Stuck {
    fn name(&self) -> &str {
        "stuck"
    }

    fn step(&mut self, _model: &mut dyn Model) -> Result<f64, TrainError> {
        Ok(self.0)
    }
}

/// A model without the reset capability.
struct Frozen(Vec<f64>);

impl Model for Frozen {
    fn name(&self) -> &str {
        "frozen"
    }

    fn parameters(&self) -> &[f64] {
        &self.0
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.0
    }

    fn forward(&self, _input: &[f64]) -> Result<f64, TrainError> {
        Ok(self.0[0])
    }
}

#[test]
fn stagnating_session_resets_every_patience_plus_one() {
    let mut session = TrainingSession::new(
        Box::new(LinearModel::from_parameters(vec![100.0, 100.0]).unwrap()),
        Box::new(Stuck(0.5)),
    );
    session
        .add_strategy(Box::new(ResetStrategy::new(0.01, 5).unwrap()))
        .unwrap();

    let report = session.train(19).unwrap();

    // The first step produces the first measurement; pre-hooks 2..=19 see
    // 18 bad measurements, resetting on every sixth.
    let iterations: Vec<usize> = report.resets.iter().map(|r| r.iteration).collect();
    assert_eq!(iterations, vec![6, 12, 18]);
    assert!(report.resets.iter().all(|r| r.strategy == "reset"));
    assert_eq!(report.stop_reason, StopReason::IterationCap);

    assert_eq!(session.metrics().resets.len(), 3);
}

#[test]
fn reset_reinitializes_model_parameters() {
    let mut session = TrainingSession::new(
        Box::new(LinearModel::from_parameters(vec![100.0, 100.0]).unwrap()),
        Box::new(Stuck(1.0)),
    );
    session
        .add_strategy(Box::new(ResetStrategy::new(0.01, 0).unwrap()))
        .unwrap();

    session.iteration().unwrap(); // first measurement
    session.iteration().unwrap(); // 1 > 0: reset before the step

    let params = session.state().model().parameters();
    assert!(params.iter().all(|p| p.abs() <= 0.5), "params: {params:?}");
}

#[test]
fn attaching_to_frozen_model_is_a_capability_mismatch() {
    let mut session = TrainingSession::new(Box::new(Frozen(vec![0.0])), Box::new(Stuck(0.5)));
    let err = session
        .add_strategy(Box::new(ResetStrategy::new(0.01, 5).unwrap()))
        .unwrap_err();

    match err {
        TrainError::CapabilityMismatch {
            strategy,
            model,
            capability,
        } => {
            assert_eq!(strategy, "reset");
            assert_eq!(model, "frozen");
            assert_eq!(capability, "reset");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Other strategies still attach and the session still trains.
    session
        .add_strategy(Box::new(EndMaxErrorStrategy::new(1.0).unwrap()))
        .unwrap();
    let report = session.train(10).unwrap();
    assert_eq!(report.iterations, 1);
    assert!(report.resets.is_empty());
}

#[test]
fn converging_session_never_resets() {
    let data = Dataset::linear(&DatasetConfig::default(), 1, Some(3));
    let mut session = TrainingSession::new(
        Box::new(LinearModel::seeded(1, 3)),
        Box::new(GradientDescent::new(data, &OptimizerConfig::default())),
    );
    session
        .add_strategy(Box::new(ResetStrategy::new(10.0, 5).unwrap()))
        .unwrap();
    session
        .add_strategy(Box::new(EndMaxErrorStrategy::new(1e-6).unwrap()))
        .unwrap();

    let report = session.train(5000).unwrap();
    assert!(report.resets.is_empty());
    assert_eq!(
        report.stop_reason,
        StopReason::Strategy("end_max_error".to_string())
    );
    assert!(report.final_error.unwrap() < 1e-6);
}

#[test]
fn unreachable_threshold_triggers_resets_from_config() {
    let mut config = TrainingConfig {
        stagnation: Some(StagnationConfig {
            required_error: 0.0,
            cycles: 9,
        }),
        ..Default::default()
    };
    config.model.seed = Some(5);
    config.dataset.noise = 0.5;
    config.end.max_iterations = 51;

    let mut session = build_session(&config).unwrap();
    let report = session.train(usize::MAX).unwrap();

    assert_eq!(report.iterations, 51);
    assert_eq!(report.resets.len(), 5); // pre-hooks 2..=51 see 50 bad cycles
    assert_eq!(
        report.stop_reason,
        StopReason::Strategy("end_iterations".to_string())
    );
}
