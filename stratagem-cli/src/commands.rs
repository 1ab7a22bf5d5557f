//! Subcommand handlers.

use crate::{Commands, ConfigAction};
use anyhow::Context;
use stratagem_core::config::{ConfigOverrides, StagnationConfig, TrainingConfig, load_config};
use stratagem_core::{TrainingReport, build_session};
use std::path::{Path, PathBuf};

/// Arguments for `stratagem train`.
#[derive(clap::Args, Debug)]
pub(crate) struct TrainArgs {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum number of iterations
    #[arg(long)]
    pub max_iterations: Option<usize>,

    /// Error level considered acceptable; enables adaptive restarts
    #[arg(long)]
    pub required_error: Option<f64>,

    /// Consecutive bad iterations tolerated before a restart
    #[arg(long)]
    pub cycles: Option<usize>,

    /// Seed for model initialization and data generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

pub(crate) fn handle_command(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Train(args) => train(&args),
        Commands::Config {
            action: ConfigAction::Show { config },
        } => show_config(config.as_deref()),
    }
}

impl TrainArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            max_iterations: self.max_iterations,
            required_error: self.required_error,
            cycles: self.cycles,
            seed: self.seed,
        }
    }
}

fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> anyhow::Result<TrainingConfig> {
    tracing::debug!(path = ?path, ?overrides, "Resolving configuration");
    load_config(path, overrides).with_context(|| match path {
        Some(p) => format!("Failed to load configuration from {}", p.display()),
        None => "Failed to load configuration".to_string(),
    })
}

fn train(args: &TrainArgs) -> anyhow::Result<()> {
    let config = resolve_config(args.config.as_deref(), &args.overrides())?;
    let mut session = build_session(&config).context("Failed to assemble training session")?;
    let report = session
        .train(config.end.max_iterations)
        .context("Training aborted")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, config.stagnation.as_ref());
    }
    Ok(())
}

fn print_report(report: &TrainingReport, stagnation: Option<&StagnationConfig>) {
    println!("Session      {}", report.session_id);
    println!("Model        {} ({})", report.model, report.optimizer);
    println!("Iterations   {}", report.iterations);
    if let Some(error) = report.final_error {
        println!("Final error  {error:.6}");
    }
    if let Some(best) = report.best_error {
        println!("Best error   {best:.6}");
    }
    match stagnation {
        Some(s) => println!(
            "Restarts     {} (required error {}, patience {})",
            report.resets.len(),
            s.required_error,
            s.cycles
        ),
        None => println!("Restarts     disabled"),
    }
    for reset in &report.resets {
        println!(
            "  - iteration {:>6}  error {:.6}",
            reset.iteration, reset.error
        );
    }
    println!("Stopped by   {:?}", report.stop_reason);
    println!(
        "Elapsed      {} ms",
        (report.finished_at - report.started_at).num_milliseconds()
    );
}

fn show_config(path: Option<&Path>) -> anyhow::Result<()> {
    let config = resolve_config(path, &ConfigOverrides::default())?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn args() -> TrainArgs {
        TrainArgs {
            config: None,
            max_iterations: None,
            required_error: None,
            cycles: None,
            seed: None,
            json: false,
        }
    }

    #[test]
    fn test_no_flags_keep_config() {
        let config = resolve_config(None, &args().overrides()).unwrap();
        assert_eq!(config, TrainingConfig::default());
    }

    #[test]
    fn test_cycles_flag_enables_restarts_with_default_threshold() {
        let overrides = TrainArgs {
            cycles: Some(2),
            ..args()
        }
        .overrides();
        let stagnation = resolve_config(None, &overrides)
            .unwrap()
            .stagnation
            .unwrap();
        assert_eq!(stagnation.cycles, 2);
        assert_eq!(stagnation.required_error, 0.01);
    }

    #[test]
    fn test_flags_override_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[stagnation]\nrequired_error = 0.5\ncycles = 9").unwrap();

        let overrides = TrainArgs {
            required_error: Some(0.1),
            max_iterations: Some(42),
            seed: Some(7),
            ..args()
        }
        .overrides();
        let config = resolve_config(Some(file.path()), &overrides).unwrap();
        assert_eq!(
            config.stagnation,
            Some(StagnationConfig {
                required_error: 0.1,
                cycles: 9,
            })
        );
        assert_eq!(config.end.max_iterations, 42);
        assert_eq!(config.model.seed, Some(7));
    }

    #[test]
    fn test_invalid_flag_value_is_reported() {
        let overrides = TrainArgs {
            required_error: Some(-1.0),
            ..args()
        }
        .overrides();
        let err = resolve_config(None, &overrides).unwrap_err();
        assert_eq!(err.to_string(), "Failed to load configuration");
    }
}
