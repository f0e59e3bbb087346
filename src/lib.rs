//! detcfg - object-detector training configuration tool.
//!
//! This crate loads, validates and re-encodes detector training configurations
//! and derives the training session plan a trainer would follow from them.

#![warn(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod output;
pub mod training;

use clap::Parser;
use cli::{Cli, Command, PlanArgs};
use config::{
    ConfigFormat, DetectorConfig, config_base_dir, config_to_string, load_and_validate,
    load_config_file, resolve_path, save_config, validate_dataset_paths,
};
use constants::{APP_NAME, DEFAULT_LR_TABLE_EVERY};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub use error::{Error, Result};

/// Main entry point for detcfg CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.global.verbose, cli.global.quiet);

    let show_progress = !cli.global.quiet && !cli.global.no_progress;
    handle_command(cli.command, show_progress)
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(command: Command, show_progress: bool) -> Result<()> {
    match command {
        Command::Check { configs, paths } => check_configs(&configs, paths),
        Command::Show { config, json } => show_config(&config, json),
        Command::Convert {
            input,
            output,
            force,
        } => convert_config(&input, &output, force),
        Command::Init { path, force } => init_config(&path, force),
        Command::Dataset { config } => inspect_dataset(&config, show_progress),
        Command::Plan(args) => plan_training(&args, show_progress),
        Command::Replay { config, history } => replay(&config, &history),
    }
}

/// Validate each config; report every file before failing.
fn check_configs(configs: &[PathBuf], check_paths: bool) -> Result<()> {
    let mut failed = 0;

    for path in configs {
        let result = load_and_validate(path).and_then(|config| {
            if check_paths {
                validate_dataset_paths(&config, &config_base_dir(path))
            } else {
                Ok(())
            }
        });

        match result {
            Ok(()) => println!("{}: OK", path.display()),
            Err(e) => {
                error!("{}: {}", path.display(), e);
                println!("{}: FAILED", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(Error::ConfigValidation {
            message: format!("{failed} of {} config file(s) failed", configs.len()),
        });
    }
    Ok(())
}

fn show_config(path: &Path, json: bool) -> Result<()> {
    let config = load_config_file(path)?;
    if let Err(e) = config::validate_config(&config) {
        warn!("{e}");
    }

    if json {
        println!("{}", config_to_string(&config, ConfigFormat::Json)?);
    } else {
        print!("{}", output::config_summary(&config));
    }
    Ok(())
}

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(Error::OutputExists {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn convert_config(input: &Path, output: &Path, force: bool) -> Result<()> {
    let target_format = ConfigFormat::from_path(output)?;
    ensure_writable(output, force)?;

    let config = load_and_validate(input)?;
    save_config(&config, output)?;

    println!(
        "Converted {} to {} ({target_format})",
        input.display(),
        output.display()
    );
    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    ConfigFormat::from_path(path)?;
    ensure_writable(path, force)?;

    save_config(&DetectorConfig::default(), path)?;

    println!("Created configuration file: {}", path.display());
    println!("\nNext steps:");
    println!("  edit the dataset folders under \"train\", then run");
    println!("  {APP_NAME} dataset {}", path.display());
    Ok(())
}

fn inspect_dataset(path: &Path, show_progress: bool) -> Result<()> {
    let config = load_and_validate(path)?;
    let inventory = dataset::scan_dataset(&config, &config_base_dir(path), show_progress)?;

    let steps = match dataset::steps_per_epoch(
        &inventory.train,
        config.train.train_times,
        config.train.batch_size,
    ) {
        Ok(steps) => Some(steps),
        Err(e) => {
            warn!("{e}");
            None
        }
    };

    for split in std::iter::once(&inventory.train).chain(inventory.valid.as_ref()) {
        if !split.unmatched_images.is_empty() || !split.unmatched_annotations.is_empty() {
            warn!(
                "{} file(s) in {} are unpaired",
                split.unmatched_images.len() + split.unmatched_annotations.len(),
                split.image_folder.display()
            );
        }
    }

    print!("{}", output::inventory_summary(&inventory, steps));
    Ok(())
}

/// Apply command-line overrides on top of the loaded config.
fn apply_plan_overrides(config: &mut DetectorConfig, args: &PlanArgs) {
    if let Some(epochs) = args.epochs {
        config.train.actual_epoch = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.train.batch_size = batch_size;
    }
    if let Some(learning_rate) = args.learning_rate {
        config.train.learning_rate = learning_rate;
    }
    if let Some(targets) = &args.targets {
        config.converter.targets.clone_from(targets);
    }
}

fn plan_training(args: &PlanArgs, show_progress: bool) -> Result<()> {
    let mut config = load_config_file(&args.config)?;
    apply_plan_overrides(&mut config, args);
    config::validate_config(&config)?;

    let base_dir = config_base_dir(&args.config);

    let steps_per_epoch = if let Some(steps) = args.steps_per_epoch {
        steps
    } else {
        info!("Deriving steps per epoch from the training annotations");
        let split = dataset::scan_split(
            dataset::Split::Train,
            &resolve_path(&base_dir, &config.train.train_image_folder),
            &resolve_path(&base_dir, &config.train.train_annot_folder),
            show_progress,
        )?;
        dataset::steps_per_epoch(&split, config.train.train_times, config.train.batch_size)?
    };

    let layers = args
        .layers
        .as_deref()
        .map(training::read_layer_names)
        .transpose()?;

    let saved_folder = resolve_path(&base_dir, &config.train.saved_folder);
    let plan = training::TrainingPlan::build(
        &config,
        &saved_folder,
        steps_per_epoch,
        layers.as_deref(),
        &chrono::Local::now(),
    )?;

    if let Some(freeze) = &plan.freeze
        && freeze.is_partial()
    {
        info!("The following layers do not update weights: {:?}", freeze.frozen);
    }

    print!("{}", output::plan_summary(&plan, config.train.actual_epoch));

    if let Some(table_path) = &args.lr_table {
        let every = args.every.unwrap_or(DEFAULT_LR_TABLE_EVERY);
        output::write_lr_table(table_path, &plan.schedule.table(every)?)?;
        println!("Learning rate table written to: {}", table_path.display());
    }

    if args.create {
        plan.session.create()?;
    }

    Ok(())
}

fn replay(config_path: &Path, history: &Path) -> Result<()> {
    let config = load_and_validate(config_path)?;
    let metric = config.train.valid_metric;

    let report = training::replay_history(
        history,
        metric.monitor_key(),
        metric.mode(),
        config.train.actual_epoch,
    )?;

    print!("{}", output::replay_summary(&report));
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_plan_overrides() {
        let mut config = DetectorConfig::default();
        let args = PlanArgs {
            config: PathBuf::from("cfg.json"),
            steps_per_epoch: None,
            layers: None,
            lr_table: None,
            every: None,
            epochs: Some(5),
            batch_size: None,
            learning_rate: Some(0.01),
            targets: Some(vec![config::ConverterTarget::Onnx]),
            create: false,
        };

        apply_plan_overrides(&mut config, &args);
        assert_eq!(config.train.actual_epoch, 5);
        assert_eq!(config.train.batch_size, 32);
        assert_eq!(config.train.learning_rate, 0.01);
        assert_eq!(
            config.converter.targets,
            vec![config::ConverterTarget::Onnx]
        );
    }

    #[test]
    fn test_ensure_writable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            ensure_writable(file.path(), false),
            Err(Error::OutputExists { .. })
        ));
        assert!(ensure_writable(file.path(), true).is_ok());
        assert!(ensure_writable(Path::new("/nonexistent/out.json"), false).is_ok());
    }
}
