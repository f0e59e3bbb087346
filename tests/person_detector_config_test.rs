//! Integration tests for the bundled person detector configuration.

use detcfg::config::{
    ConfigFormat, ConverterTarget, DetectorConfig, ValidMetric, load_and_validate,
    load_config_file, parse_config,
};
use std::path::{Path, PathBuf};

fn person_detector_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/person_detector.json")
}

#[test]
fn test_person_detector_loads_expected_values() {
    let config = load_config_file(&person_detector_path()).unwrap();

    assert_eq!(config.model.labels, vec!["person".to_string()]);
    assert_eq!(config.model.input_size, [224, 320]);
    assert_eq!(config.train.batch_size, 32);
    assert_eq!(
        config.converter.targets,
        vec![ConverterTarget::K210, ConverterTarget::Tflite]
    );
    assert_eq!(config.model.architecture, "MobileNet5_0");
    assert_eq!(config.train.valid_metric, ValidMetric::Recall);
    assert!(config.weights.full_checkpoint().is_none());
}

#[test]
fn test_person_detector_is_structurally_valid() {
    let config = load_and_validate(&person_detector_path()).unwrap();

    assert_eq!(config.model.anchors.len(), 2);
    for group in &config.model.anchors {
        assert_eq!(group.len(), 3);
        assert!(group.iter().flatten().all(|v| *v > 0.0));
    }
    for threshold in [config.model.obj_thresh, config.model.iou_thresh] {
        assert!((0.0..=1.0).contains(&threshold));
    }
}

#[test]
fn test_person_detector_is_plain_json() {
    let contents = std::fs::read_to_string(person_detector_path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(value["converter"]["type"][1], "tflite");
}

#[test]
fn test_person_detector_matches_default_template() {
    let loaded = load_config_file(&person_detector_path()).unwrap();
    let default = DetectorConfig::default();

    assert_eq!(loaded.weights, default.weights);
    assert_eq!(loaded.train, default.train);
    assert_eq!(loaded.converter, default.converter);
    assert_eq!(loaded.model.labels, default.model.labels);
    for (a, b) in loaded
        .model
        .anchors
        .iter()
        .flatten()
        .zip(default.model.anchors.iter().flatten())
    {
        assert!((a[0] - b[0]).abs() < 1e-6 && (a[1] - b[1]).abs() < 1e-6);
    }
}

#[test]
fn test_person_detector_reencodes_as_toml() {
    let config = load_config_file(&person_detector_path()).unwrap();
    let toml_text = detcfg::config::config_to_string(&config, ConfigFormat::Toml).unwrap();
    assert!(toml_text.contains("[converter]"));

    let back = parse_config(&toml_text, ConfigFormat::Toml, Path::new("inline.toml")).unwrap();
    assert_eq!(back, config);
}
