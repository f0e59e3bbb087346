//! CLI argument definitions.

use crate::cli::validators::{parse_learning_rate, parse_positive_u32, parse_positive_u64};
use crate::config::ConverterTarget;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Validate and plan object-detector training configurations.
#[derive(Debug, Parser)]
#[command(name = "detcfg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Logging and progress options.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every subcommand.
#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Only print warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable progress bars.
    #[arg(long, global = true)]
    pub no_progress: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load and validate configuration files.
    Check {
        /// Configuration files (.json or .toml).
        #[arg(required = true)]
        configs: Vec<PathBuf>,
        /// Also check that dataset folders exist.
        #[arg(long)]
        paths: bool,
    },
    /// Print a configuration.
    Show {
        /// Configuration file.
        #[arg(env = "DETCFG_CONFIG")]
        config: PathBuf,
        /// Print the normalized document as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// Re-encode a configuration between JSON and TOML.
    Convert {
        /// Source file (.json or .toml).
        input: PathBuf,
        /// Destination file (.json or .toml).
        output: PathBuf,
        /// Overwrite the destination if it exists.
        #[arg(long)]
        force: bool,
    },
    /// Write the default person detector configuration.
    Init {
        /// Destination file (.json or .toml).
        path: PathBuf,
        /// Overwrite the destination if it exists.
        #[arg(long)]
        force: bool,
    },
    /// Scan the dataset folders a configuration points at.
    Dataset {
        /// Configuration file.
        #[arg(env = "DETCFG_CONFIG")]
        config: PathBuf,
    },
    /// Derive the training session plan.
    Plan(PlanArgs),
    /// Replay a recorded metric history through early stopping and checkpointing.
    Replay {
        /// Configuration file.
        #[arg(env = "DETCFG_CONFIG")]
        config: PathBuf,
        /// Per-epoch history CSV with a header row.
        history: PathBuf,
    },
}

/// Arguments for the plan command.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Configuration file.
    #[arg(env = "DETCFG_CONFIG")]
    pub config: PathBuf,

    /// Batches per epoch (default: derived from the training annotations).
    #[arg(long, value_parser = parse_positive_u64)]
    pub steps_per_epoch: Option<u64>,

    /// File listing the model's layer names in order, one per line.
    #[arg(long)]
    pub layers: Option<PathBuf>,

    /// Write the sampled learning-rate schedule to this CSV file.
    #[arg(long)]
    pub lr_table: Option<PathBuf>,

    /// Sample the learning-rate table every N steps.
    #[arg(long, value_parser = parse_positive_u64)]
    pub every: Option<u64>,

    /// Override the number of epochs.
    #[arg(long, value_parser = parse_positive_u32, env = "DETCFG_EPOCHS")]
    pub epochs: Option<u32>,

    /// Override the batch size.
    #[arg(short, long, value_parser = parse_positive_u32, env = "DETCFG_BATCH_SIZE")]
    pub batch_size: Option<u32>,

    /// Override the base learning rate.
    #[arg(long, value_parser = parse_learning_rate, env = "DETCFG_LEARNING_RATE")]
    pub learning_rate: Option<f64>,

    /// Override the converter targets (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub targets: Option<Vec<ConverterTarget>>,

    /// Create the session folder.
    #[arg(long)]
    pub create: bool,
}
