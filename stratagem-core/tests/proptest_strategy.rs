//! Property-based tests for the adaptive restart using proptest.

use proptest::prelude::*;

use stratagem_core::session::SessionEvent;
use stratagem_core::Strategy as TrainingStrategy;
use stratagem_core::{Model, ResetStrategy, Resettable, SessionView, TrainError};
use uuid::Uuid;

struct Counting {
    params: Vec<f64>,
    resettable: bool,
    resets: usize,
}

impl Model for Counting {
    fn name(&self) -> &str {
        "counting"
    }

    fn parameters(&self) -> &[f64] {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut [f64] {
        &mut self.params
    }

    fn forward(&self, _input: &[f64]) -> Result<f64, TrainError> {
        Ok(0.0)
    }

    fn as_resettable(&mut self) -> Option<&mut dyn Resettable> {
        if self.resettable { Some(self) } else { None }
    }
}

impl Resettable for Counting {
    fn reset(&mut self) -> Result<(), TrainError> {
        self.resets += 1;
        Ok(())
    }

    fn reset_with_seed(&mut self, _seed: u64) -> Result<(), TrainError> {
        self.reset()
    }
}

struct Feed {
    id: Uuid,
    model: Counting,
    error: Option<f64>,
    iteration: usize,
}

impl Feed {
    fn new(resettable: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            model: Counting {
                params: vec![0.0],
                resettable,
                resets: 0,
            },
            error: None,
            iteration: 0,
        }
    }
}

impl SessionView for Feed {
    fn id(&self) -> Uuid {
        self.id
    }

    fn iteration(&self) -> usize {
        self.iteration
    }

    fn error(&self) -> Option<f64> {
        self.error
    }

    fn model(&self) -> &dyn Model {
        &self.model
    }

    fn model_mut(&mut self) -> &mut dyn Model {
        &mut self.model
    }

    fn record_event(&mut self, _event: SessionEvent) {}
}

/// Drive `before_iteration` over `errors`; returns (counter after each call,
/// whether that call reset).
fn drive(required: f64, cycles: usize, errors: &[f64]) -> Vec<(usize, bool)> {
    let mut feed = Feed::new(true);
    let mut strategy = ResetStrategy::new(required, cycles).unwrap();
    strategy.attach(&mut feed).unwrap();

    errors
        .iter()
        .map(|&e| {
            feed.error = Some(e);
            feed.iteration += 1;
            let before = feed.model.resets;
            strategy.before_iteration(&mut feed).unwrap();
            (strategy.bad_cycles(), feed.model.resets > before)
        })
        .collect()
}

const REQUIRED: f64 = 0.01;

fn error_value() -> impl Strategy<Value = f64> {
    prop_oneof![0.0f64..=REQUIRED, (REQUIRED + 1e-9)..10.0]
}

proptest! {
    #[test]
    fn all_bad_resets_every_window_plus_one(
        cycles in 0usize..20,
        len in 1usize..200,
    ) {
        let steps = drive(REQUIRED, cycles, &vec![0.5; len]);
        for (i, (count, reset)) in steps.iter().enumerate() {
            let call = i + 1;
            let expect_reset = call % (cycles + 1) == 0;
            prop_assert_eq!(*reset, expect_reset, "call {}", call);
            if expect_reset {
                prop_assert_eq!(*count, 0);
            } else {
                prop_assert_eq!(*count, call % (cycles + 1));
            }
        }
    }

    #[test]
    fn counter_stays_within_window(
        cycles in 0usize..10,
        errors in prop::collection::vec(error_value(), 1..200),
    ) {
        for (count, _) in drive(REQUIRED, cycles, &errors) {
            prop_assert!(count <= cycles);
        }
    }

    #[test]
    fn acceptable_measurement_clears_counter(
        cycles in 0usize..10,
        errors in prop::collection::vec(error_value(), 1..200),
    ) {
        let steps = drive(REQUIRED, cycles, &errors);
        for (error, (count, reset)) in errors.iter().zip(&steps) {
            if *error <= REQUIRED {
                prop_assert_eq!(*count, 0);
                prop_assert!(!*reset);
            }
        }
    }

    #[test]
    fn matches_reference_counter(
        cycles in 0usize..10,
        errors in prop::collection::vec(error_value(), 1..200),
    ) {
        let mut expected = 0usize;
        for (error, (count, reset)) in errors.iter().zip(drive(REQUIRED, cycles, &errors)) {
            let mut expected_reset = false;
            if *error > REQUIRED {
                expected += 1;
                if expected > cycles {
                    expected = 0;
                    expected_reset = true;
                }
            } else {
                expected = 0;
            }
            prop_assert_eq!(count, expected);
            prop_assert_eq!(reset, expected_reset);
        }
    }

    #[test]
    fn exactly_window_bad_cycles_never_reset(
        cycles in 0usize..50,
        prefix_bad in 0usize..50,
    ) {
        // Arbitrary history, then a good measurement, then `cycles` bad ones.
        let mut errors = vec![0.5; prefix_bad];
        errors.push(0.0);
        errors.extend(std::iter::repeat_n(0.5, cycles));
        let steps = drive(REQUIRED, cycles, &errors);
        prop_assert!(steps[prefix_bad..].iter().all(|(_, reset)| !reset));

        errors.push(0.5);
        let steps = drive(REQUIRED, cycles, &errors);
        prop_assert!(steps.last().unwrap().1);
    }

    #[test]
    fn attach_without_capability_always_fails(
        required in 0.0f64..1.0,
        cycles in 0usize..100,
    ) {
        let mut feed = Feed::new(false);
        let mut strategy = ResetStrategy::new(required, cycles).unwrap();
        let is_mismatch = matches!(
            strategy.attach(&mut feed),
            Err(TrainError::CapabilityMismatch { .. })
        );
        prop_assert!(is_mismatch);
    }

    #[test]
    fn negative_threshold_is_invalid(required in -1000.0f64..-1e-12, cycles in 0usize..10) {
        let is_invalid = matches!(
            ResetStrategy::new(required, cycles),
            Err(TrainError::InvalidConfig(_))
        );
        prop_assert!(is_invalid);
    }
}
