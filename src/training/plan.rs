//! Everything a training run derives from its configuration.

use crate::config::DetectorConfig;
use crate::constants::callbacks::{EARLY_STOP_MIN_DELTA, EARLY_STOP_PATIENCE};
use crate::error::Result;
use crate::training::{
    FreezePlan, MetricMode, SessionLayout, WarmupCosineSchedule, plan_frozen_layers,
};
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};

/// Early-stopping and checkpoint settings for the run.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    /// Metric key the callbacks watch.
    pub monitor: &'static str,
    /// Improvement direction.
    pub mode: MetricMode,
    /// Early stopping patience in epochs.
    pub patience: u32,
    /// Early stopping minimum delta.
    pub min_delta: f64,
}

/// Derived training plan.
#[derive(Debug, Clone)]
pub struct TrainingPlan {
    /// Session folder layout.
    pub session: SessionLayout,
    /// Batches per epoch.
    pub steps_per_epoch: u64,
    /// Learning-rate schedule.
    pub schedule: WarmupCosineSchedule,
    /// Frozen layers, when a layer list was supplied.
    pub freeze: Option<FreezePlan>,
    /// Epoch-end monitors.
    pub monitors: MonitorSettings,
    /// Checkpoint the run resumes from.
    pub resume_from: Option<PathBuf>,
    /// Exported artifacts, in converter order.
    pub exports: Vec<PathBuf>,
}

impl TrainingPlan {
    /// Build the plan for `config`.
    ///
    /// `saved_folder` is the resolved session root. `layers` is the model's
    /// layer list, needed only to resolve the first trainable layer.
    pub fn build<Tz>(
        config: &DetectorConfig,
        saved_folder: &Path,
        steps_per_epoch: u64,
        layers: Option<&[String]>,
        started: &DateTime<Tz>,
    ) -> Result<Self>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let train = &config.train;
        let schedule =
            WarmupCosineSchedule::for_training(train.learning_rate, steps_per_epoch, train.actual_epoch)?;

        let freeze = layers
            .map(|layers| plan_frozen_layers(layers, train.first_trainable()))
            .transpose()?;

        let session = SessionLayout::new(config, saved_folder, started);
        let exports = config
            .converter
            .targets
            .iter()
            .map(|target| session.export_path(*target))
            .collect();

        Ok(Self {
            monitors: MonitorSettings {
                monitor: train.valid_metric.monitor_key(),
                mode: train.valid_metric.mode(),
                patience: EARLY_STOP_PATIENCE,
                min_delta: EARLY_STOP_MIN_DELTA,
            },
            resume_from: config.weights.full_checkpoint().map(Path::to_path_buf),
            session,
            steps_per_epoch,
            schedule,
            freeze,
            exports,
        })
    }
}
