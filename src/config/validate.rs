//! Configuration validation.

use crate::config::{DetectorConfig, ModelSection, TrainSection};
use crate::constants::{ANCHOR_SCALES, ANCHORS_PER_SCALE, KNOWN_ARCHITECTURES, threshold};
use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::warn;

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}

/// Validate the entire configuration.
pub fn validate_config(config: &DetectorConfig) -> Result<()> {
    validate_model(&config.model)?;
    validate_train(&config.train)?;
    validate_converter(config)?;
    Ok(())
}

/// Validate model parameters.
fn validate_model(model: &ModelSection) -> Result<()> {
    if !KNOWN_ARCHITECTURES.contains(&model.architecture.as_str()) {
        warn!(
            "Unknown architecture '{}', the trainer may not support it",
            model.architecture
        );
    }

    if model.input_size.contains(&0) {
        return Err(invalid(format!(
            "model.input_size must be two positive integers, got {:?}",
            model.input_size
        )));
    }

    validate_anchors(&model.anchors)?;
    validate_labels(&model.labels)?;

    for (name, value) in [
        ("model.obj_thresh", model.obj_thresh),
        ("model.iou_thresh", model.iou_thresh),
    ] {
        if !value.is_finite() || !(threshold::MIN..=threshold::MAX).contains(&value) {
            return Err(invalid(format!(
                "{name} must be between {} and {}, got {value}",
                threshold::MIN,
                threshold::MAX
            )));
        }
    }

    for (name, value) in [
        ("model.coord_scale", model.coord_scale),
        ("model.class_scale", model.class_scale),
        ("model.object_scale", model.object_scale),
        ("model.no_object_scale", model.no_object_scale),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(format!("{name} must be non-negative, got {value}")));
        }
    }

    Ok(())
}

fn validate_anchors(anchors: &[Vec<[f32; 2]>]) -> Result<()> {
    if anchors.len() != ANCHOR_SCALES {
        return Err(invalid(format!(
            "model.anchors must have {ANCHOR_SCALES} scale groups, got {}",
            anchors.len()
        )));
    }

    for (scale, group) in anchors.iter().enumerate() {
        if group.len() != ANCHORS_PER_SCALE {
            return Err(invalid(format!(
                "model.anchors[{scale}] must have {ANCHORS_PER_SCALE} [width, height] pairs, got {}",
                group.len()
            )));
        }

        for (idx, [width, height]) in group.iter().enumerate() {
            if !(width.is_finite() && height.is_finite() && *width > 0.0 && *height > 0.0) {
                return Err(invalid(format!(
                    "model.anchors[{scale}][{idx}] must be positive, got [{width}, {height}]"
                )));
            }
        }
    }

    Ok(())
}

fn validate_labels(labels: &[String]) -> Result<()> {
    if labels.is_empty() {
        return Err(invalid("model.labels must contain at least one label".to_string()));
    }

    let mut seen = HashSet::new();
    for (idx, label) in labels.iter().enumerate() {
        if label.trim().is_empty() {
            return Err(invalid(format!("model.labels[{idx}] is empty")));
        }
        if !seen.insert(label.trim()) {
            return Err(invalid(format!("model.labels has duplicate label '{label}'")));
        }
    }

    Ok(())
}

/// Validate training parameters.
fn validate_train(train: &TrainSection) -> Result<()> {
    for (name, value) in [
        ("train.actual_epoch", train.actual_epoch),
        ("train.batch_size", train.batch_size),
        ("train.train_times", train.train_times),
        ("train.valid_times", train.valid_times),
    ] {
        if value == 0 {
            return Err(invalid(format!("{name} must be at least 1")));
        }
    }

    if !train.learning_rate.is_finite() || train.learning_rate <= 0.0 {
        return Err(invalid(format!(
            "train.learning_rate must be positive, got {}",
            train.learning_rate
        )));
    }

    for (name, path) in [
        ("train.train_image_folder", &train.train_image_folder),
        ("train.train_annot_folder", &train.train_annot_folder),
        ("train.saved_folder", &train.saved_folder),
    ] {
        if path.as_os_str().is_empty() {
            return Err(invalid(format!("{name} must not be empty")));
        }
    }

    if train.valid_image_folder.as_os_str().is_empty()
        != train.valid_annot_folder.as_os_str().is_empty()
    {
        return Err(invalid(
            "train.valid_image_folder and train.valid_annot_folder must be set together"
                .to_string(),
        ));
    }

    Ok(())
}

/// Validate converter targets.
fn validate_converter(config: &DetectorConfig) -> Result<()> {
    let targets = &config.converter.targets;
    if targets.is_empty() {
        return Err(invalid(
            "converter.type must name at least one target".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for target in targets {
        if !seen.insert(*target) {
            return Err(invalid(format!(
                "converter.type lists '{target}' more than once"
            )));
        }
    }

    Ok(())
}

/// Resolve a config-relative path against the config file's directory.
pub fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Check that the dataset folders named by the config exist.
///
/// Relative folders are resolved against `base_dir`, normally the directory
/// holding the config file.
pub fn validate_dataset_paths(config: &DetectorConfig, base_dir: &Path) -> Result<()> {
    let train = &config.train;

    let mut folders = vec![
        ("train.train_image_folder", &train.train_image_folder),
        ("train.train_annot_folder", &train.train_annot_folder),
    ];
    if train.has_validation() {
        folders.push(("train.valid_image_folder", &train.valid_image_folder));
        folders.push(("train.valid_annot_folder", &train.valid_annot_folder));
    }

    for (field, folder) in folders {
        let resolved = resolve_path(base_dir, folder);
        if !resolved.is_dir() {
            return Err(Error::DatasetFolderNotFound {
                field,
                path: resolved,
            });
        }
    }

    Ok(())
}
