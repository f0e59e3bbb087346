//! Human-readable reports printed to stdout.

use crate::config::DetectorConfig;
use crate::dataset::{DatasetInventory, SplitInventory};
use crate::training::{ReplayReport, TrainingPlan};
use std::fmt::Write;

/// Maximum number of unmatched file stems listed per folder.
const MAX_LISTED_STEMS: usize = 10;

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Render a configuration summary.
pub fn config_summary(config: &DetectorConfig) -> String {
    let model = &config.model;
    let train = &config.train;
    let mut out = String::new();

    let _ = writeln!(out, "Model: {} ({})", model.architecture, model.model_type);
    let _ = writeln!(
        out,
        "  Input: {}x{} (height x width)",
        model.input_height(),
        model.input_width()
    );
    let _ = writeln!(
        out,
        "  Labels ({}): {}",
        model.labels.len(),
        model.labels.join(", ")
    );
    let _ = writeln!(
        out,
        "  Anchors: {} boxes over {} scales",
        model.anchor_count(),
        model.anchors.len()
    );
    for (scale, group) in model.anchors.iter().enumerate() {
        let pairs: Vec<String> = group
            .iter()
            .map(|[w, h]| format!("{w:.4}x{h:.4}"))
            .collect();
        let _ = writeln!(out, "  Anchors[{scale}]: {}", pairs.join(" "));
    }
    let _ = writeln!(
        out,
        "  Thresholds: objectness {}, IoU {}",
        model.obj_thresh, model.iou_thresh
    );
    let _ = writeln!(
        out,
        "  Loss scales: coord {}, class {}, object {}, no-object {}",
        model.coord_scale, model.class_scale, model.object_scale, model.no_object_scale
    );

    let _ = writeln!(out, "Weights:");
    let _ = writeln!(
        out,
        "  Full: {}",
        config
            .weights
            .full_checkpoint()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string())
    );
    let _ = writeln!(out, "  Backend: {}", config.weights.backend);

    let _ = writeln!(out, "Train:");
    let _ = writeln!(
        out,
        "  Epochs: {}, batch size: {}, learning rate: {}",
        train.actual_epoch, train.batch_size, train.learning_rate
    );
    let _ = writeln!(
        out,
        "  Train data: {} / {} (x{})",
        train.train_image_folder.display(),
        train.train_annot_folder.display(),
        train.train_times
    );
    if train.has_validation() {
        let _ = writeln!(
            out,
            "  Valid data: {} / {} (x{})",
            train.valid_image_folder.display(),
            train.valid_annot_folder.display(),
            train.valid_times
        );
    } else {
        let _ = writeln!(out, "  Valid data: (none)");
    }
    let _ = writeln!(out, "  Metric: {}", train.valid_metric);
    let _ = writeln!(out, "  Saved folder: {}", train.saved_folder.display());
    let _ = writeln!(
        out,
        "  First trainable layer: {}",
        train.first_trainable().unwrap_or("(all layers)")
    );
    let _ = writeln!(
        out,
        "  Augmentation: {}, detect only: {}",
        yes_no(train.augmentation),
        yes_no(train.is_only_detect)
    );

    let targets: Vec<String> = config
        .converter
        .targets
        .iter()
        .map(ToString::to_string)
        .collect();
    let _ = writeln!(out, "Converter: {}", targets.join(", "));

    out
}

fn split_summary(out: &mut String, name: &str, split: &SplitInventory) {
    let _ = writeln!(out, "{name}:");
    let _ = writeln!(out, "  Images: {} ({})", split.images, split.image_folder.display());
    let _ = writeln!(
        out,
        "  Annotations: {} ({})",
        split.annotations,
        split.annot_folder.display()
    );
    let _ = writeln!(out, "  Matched pairs: {}", split.matched());

    for (what, stems) in [
        ("Images without annotation", &split.unmatched_images),
        ("Annotations without image", &split.unmatched_annotations),
    ] {
        if stems.is_empty() {
            continue;
        }
        let listed: Vec<&str> = stems
            .iter()
            .take(MAX_LISTED_STEMS)
            .map(String::as_str)
            .collect();
        let more = stems.len().saturating_sub(MAX_LISTED_STEMS);
        let _ = write!(out, "  {what} ({}): {}", stems.len(), listed.join(", "));
        if more > 0 {
            let _ = write!(out, ", ... {more} more");
        }
        out.push('\n');
    }
}

/// Render a dataset inventory.
pub fn inventory_summary(inventory: &DatasetInventory, steps_per_epoch: Option<u64>) -> String {
    let mut out = String::new();
    split_summary(&mut out, "Train", &inventory.train);
    if let Some(valid) = &inventory.valid {
        split_summary(&mut out, "Validation", valid);
    }
    if let Some(steps) = steps_per_epoch {
        let _ = writeln!(out, "Steps per epoch: {steps}");
    }
    out
}

/// Render a training plan.
pub fn plan_summary(plan: &TrainingPlan, epochs: u32) -> String {
    let mut out = String::new();
    let schedule = &plan.schedule;

    let _ = writeln!(out, "Session folder: {}", plan.session.folder.display());
    let _ = writeln!(out, "  Best checkpoint: {}", plan.session.best_checkpoint().display());
    let _ = writeln!(
        out,
        "  Interrupt checkpoint: {}",
        plan.session.interrupt_checkpoint().display()
    );
    let _ = writeln!(out, "  Logs: {}", plan.session.logs_dir().display());
    for export in &plan.exports {
        let _ = writeln!(out, "  Export: {}", export.display());
    }
    if let Some(resume) = &plan.resume_from {
        let _ = writeln!(out, "Resume from: {}", resume.display());
    }

    let _ = writeln!(out, "Schedule:");
    let _ = writeln!(
        out,
        "  {epochs} epochs x {} steps = {} steps",
        plan.steps_per_epoch, schedule.total_steps
    );
    let _ = writeln!(
        out,
        "  Warm-up: {} steps from {} to {}",
        schedule.warmup_steps, schedule.warmup_lr, schedule.base_lr
    );
    let _ = writeln!(
        out,
        "  Cosine decay to 0 over {} steps",
        schedule
            .total_steps
            .saturating_sub(schedule.warmup_steps + schedule.hold_steps)
    );

    let monitors = &plan.monitors;
    let _ = writeln!(out, "Monitors:");
    let _ = writeln!(
        out,
        "  Best checkpoint on '{}' ({})",
        monitors.monitor, monitors.mode
    );
    let _ = writeln!(
        out,
        "  Early stopping: patience {}, min delta {}, restores best weights",
        monitors.patience, monitors.min_delta
    );

    match &plan.freeze {
        Some(freeze) if freeze.is_partial() => {
            let _ = writeln!(
                out,
                "Frozen layers ({}): {}",
                freeze.frozen.len(),
                freeze.frozen.join(", ")
            );
            let _ = writeln!(out, "Trainable layers: {}", freeze.trainable.len());
        }
        Some(freeze) => {
            let _ = writeln!(out, "All {} layers trainable", freeze.trainable.len());
        }
        None => {}
    }

    out
}

/// Render a replay report.
pub fn replay_summary(report: &ReplayReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Monitored: {}", report.monitor);
    let _ = writeln!(out, "Epochs run: {}", report.epochs_run);
    match report.stopped_at {
        Some(epoch) => {
            let _ = writeln!(out, "Early stopping at epoch {epoch}");
        }
        None if report.budget_exhausted => {
            let _ = writeln!(out, "Ran the full epoch budget");
        }
        None => {
            let _ = writeln!(out, "History ended before the epoch budget");
        }
    }
    if let Some((epoch, value)) = report.best {
        let _ = writeln!(out, "Best: {value} at epoch {epoch} (weights restored)");
    }
    let _ = writeln!(
        out,
        "Epochs since last improvement: {}",
        report.epochs_since_best
    );
    let saves: Vec<String> = report
        .checkpoint_epochs
        .iter()
        .map(ToString::to_string)
        .collect();
    let _ = writeln!(out, "Checkpoints written at epochs: {}", saves.join(", "));
    if report.ignored_rows > 0 {
        let _ = writeln!(
            out,
            "Ignored {} history rows past the end of training",
            report.ignored_rows
        );
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::training::{EarlyStopping, MetricMode, replay_values};

    #[test]
    fn test_config_summary_mentions_key_fields() {
        let summary = config_summary(&DetectorConfig::default());
        assert!(summary.contains("MobileNet5_0 (Detector)"));
        assert!(summary.contains("Input: 224x320"));
        assert!(summary.contains("Labels (1): person"));
        assert!(summary.contains("Anchors: 6 boxes over 2 scales"));
        assert!(summary.contains("Full: (none)"));
        assert!(summary.contains("Converter: k210, tflite"));
    }

    #[test]
    fn test_inventory_summary_truncates_unmatched() {
        let train = SplitInventory {
            images: 12,
            annotations: 0,
            unmatched_images: (0..12).map(|i| format!("img{i:02}")).collect(),
            ..SplitInventory::default()
        };
        let inventory = DatasetInventory { train, valid: None };
        let summary = inventory_summary(&inventory, None);
        assert!(summary.contains("Images without annotation (12)"));
        assert!(summary.contains("... 2 more"));
        assert!(!summary.contains("Validation"));
    }

    #[test]
    fn test_replay_summary() {
        let report = replay_values(
            &[0.1, 0.2],
            "recall",
            MetricMode::Max,
            2,
            EarlyStopping::new(MetricMode::Max),
        );
        let summary = replay_summary(&report);
        assert!(summary.contains("Ran the full epoch budget"));
        assert!(summary.contains("Best: 0.2 at epoch 2"));
        assert!(summary.contains("epochs: 1, 2"));
        assert!(summary.contains("Epochs since last improvement: 0"));
    }
}
