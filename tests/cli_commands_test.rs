//! Integration tests for the detcfg subcommands.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn person_detector_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("configs/person_detector.json")
}

/// Config plus a small dataset laid out next to it.
fn workspace_with_dataset(images: usize) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let imgs = dir.path().join("data/imgs");
    let anns = dir.path().join("data/anns");
    std::fs::create_dir_all(&imgs).unwrap();
    std::fs::create_dir_all(&anns).unwrap();
    for i in 0..images {
        std::fs::write(imgs.join(format!("img_{i:03}.jpg")), b"").unwrap();
        std::fs::write(anns.join(format!("img_{i:03}.xml")), b"").unwrap();
    }
    std::fs::write(imgs.join("stray.png"), b"").unwrap();

    let mut config: Value =
        serde_json::from_str(&std::fs::read_to_string(person_detector_path()).unwrap()).unwrap();
    config["train"]["train_image_folder"] = "data/imgs".into();
    config["train"]["train_annot_folder"] = "data/anns".into();
    config["train"]["valid_image_folder"] = "".into();
    config["train"]["valid_annot_folder"] = "".into();
    config["train"]["saved_folder"] = "runs".into();
    config["train"]["batch_size"] = 8.into();
    config["train"]["actual_epoch"] = 4.into();

    let config_path = dir.path().join("detector.json");
    std::fs::write(&config_path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    (dir, config_path)
}

#[test]
fn test_check_person_detector() {
    let mut cmd = cargo_bin_cmd!("detcfg");
    cmd.arg("check").arg(person_detector_path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("person_detector.json: OK"));
}

#[test]
fn test_check_reports_invalid_file() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.json");
    let mut config: Value =
        serde_json::from_str(&std::fs::read_to_string(person_detector_path()).unwrap()).unwrap();
    config["model"]["labels"] = Value::Array(Vec::new());
    std::fs::write(&broken, config.to_string()).unwrap();

    let mut cmd = cargo_bin_cmd!("detcfg");
    cmd.arg("check").arg(person_detector_path()).arg(&broken);

    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("person_detector.json: OK"))
        .stdout(predicate::str::contains("broken.json: FAILED"))
        .stderr(predicate::str::contains("model.labels"));
}

#[test]
fn test_check_paths_flags_missing_dataset() {
    let mut cmd = cargo_bin_cmd!("detcfg");
    cmd.arg("check").arg("--paths").arg(person_detector_path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("dataset folder does not exist"));
}

#[test]
fn test_show_json_output() {
    let mut cmd = cargo_bin_cmd!("detcfg");
    cmd.arg("show").arg(person_detector_path()).arg("--json");

    let output = cmd.assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let json: Value = serde_json::from_str(&stdout).expect("Valid JSON output");

    assert_eq!(json["model"]["labels"][0], "person");
    assert_eq!(json["model"]["input_size"][1], 320);
    assert_eq!(json["train"]["batch_size"], 32);
    assert_eq!(json["converter"]["type"][0], "k210");
}

#[test]
fn test_show_summary_from_env() {
    let mut cmd = cargo_bin_cmd!("detcfg");
    cmd.arg("show").env("DETCFG_CONFIG", person_detector_path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Model: MobileNet5_0 (Detector)"))
        .stdout(predicate::str::contains("Converter: k210, tflite"));
}

#[test]
fn test_convert_to_toml_and_back() {
    let dir = TempDir::new().unwrap();
    let toml_path = dir.path().join("person.toml");
    let json_path = dir.path().join("person.json");

    cargo_bin_cmd!("detcfg")
        .arg("convert")
        .arg(person_detector_path())
        .arg(&toml_path)
        .assert()
        .success();
    let toml_text = std::fs::read_to_string(&toml_path).unwrap();
    assert!(toml_text.contains("[model]"));

    cargo_bin_cmd!("detcfg")
        .arg("convert")
        .arg(&toml_path)
        .arg(&json_path)
        .assert()
        .success();

    let original = detcfg::config::load_config_file(&person_detector_path()).unwrap();
    let round_trip = detcfg::config::load_config_file(&json_path).unwrap();
    assert_eq!(original, round_trip);
}

#[test]
fn test_convert_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("person.toml");
    std::fs::write(&output, "").unwrap();

    cargo_bin_cmd!("detcfg")
        .arg("convert")
        .arg(person_detector_path())
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn test_convert_rejects_unknown_extension() {
    let dir = TempDir::new().unwrap();

    cargo_bin_cmd!("detcfg")
        .arg("convert")
        .arg(person_detector_path())
        .arg(dir.path().join("person.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported config format"));
}

#[test]
fn test_init_writes_valid_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("new/detector.json");

    cargo_bin_cmd!("detcfg")
        .arg("init")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    let config = detcfg::config::load_and_validate(&path).unwrap();
    assert_eq!(config.model.labels, vec!["person".to_string()]);

    cargo_bin_cmd!("detcfg")
        .arg("init")
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn test_dataset_inventory() {
    let (_dir, config_path) = workspace_with_dataset(20);

    cargo_bin_cmd!("detcfg")
        .arg("--no-progress")
        .arg("dataset")
        .arg(&config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Images: 21"))
        .stdout(predicate::str::contains("Annotations: 20"))
        .stdout(predicate::str::contains("Images without annotation (1): stray"))
        .stdout(predicate::str::contains("Steps per epoch: 3"));
}

#[test]
fn test_plan_derives_steps_and_writes_table() {
    let (dir, config_path) = workspace_with_dataset(20);
    let table = dir.path().join("lr.csv");

    cargo_bin_cmd!("detcfg")
        .arg("-q")
        .arg("plan")
        .arg(&config_path)
        .arg("--lr-table")
        .arg(&table)
        .arg("--every")
        .arg("1")
        .arg("--create")
        .assert()
        .success()
        .stdout(predicate::str::contains("4 epochs x 3 steps = 12 steps"))
        .stdout(predicate::str::contains("Warm-up: 9 steps"))
        .stdout(predicate::str::contains("YOLO_best_recall.h5"))
        .stdout(predicate::str::contains("YOLO_best_recall.kmodel"));

    let rows = std::fs::read_to_string(&table).unwrap();
    assert_eq!(rows.lines().count(), 1 + 13);

    let sessions: Vec<_> = std::fs::read_dir(dir.path().join("runs"))
        .unwrap()
        .collect();
    assert_eq!(sessions.len(), 1);
}

#[test]
fn test_plan_with_layers_and_overrides() {
    let (dir, config_path) = workspace_with_dataset(4);
    let layers = dir.path().join("layers.txt");
    std::fs::write(&layers, "input_1\nconv1\nconv_pw_1\ndetection_layer\n").unwrap();

    let mut config: Value =
        serde_json::from_str(&std::fs::read_to_string(&config_path).unwrap()).unwrap();
    config["train"]["first_trainable_layer"] = "conv_pw_1".into();
    std::fs::write(&config_path, config.to_string()).unwrap();

    cargo_bin_cmd!("detcfg")
        .arg("plan")
        .arg(&config_path)
        .arg("--steps-per-epoch")
        .arg("10")
        .arg("--epochs")
        .arg("2")
        .arg("--layers")
        .arg(&layers)
        .arg("--targets")
        .arg("onnx")
        .assert()
        .success()
        .stdout(predicate::str::contains("2 epochs x 10 steps = 20 steps"))
        .stdout(predicate::str::contains("Frozen layers (2): input_1, conv1"))
        .stdout(predicate::str::contains("YOLO_best_recall.onnx"))
        .stdout(predicate::str::contains(".kmodel").not());
}

#[test]
fn test_plan_unknown_first_trainable_layer() {
    let (dir, config_path) = workspace_with_dataset(4);
    let layers = dir.path().join("layers.txt");
    std::fs::write(&layers, "input_1\nconv1\n").unwrap();

    let mut config: Value =
        serde_json::from_str(&std::fs::read_to_string(&config_path).unwrap()).unwrap();
    config["train"]["first_trainable_layer"] = "conv_pw_13".into();
    std::fs::write(&config_path, config.to_string()).unwrap();

    cargo_bin_cmd!("detcfg")
        .arg("plan")
        .arg(&config_path)
        .arg("--steps-per-epoch")
        .arg("10")
        .arg("--layers")
        .arg(&layers)
        .assert()
        .failure()
        .stderr(predicate::str::contains("0 input_1, 1 conv1"));
}

#[test]
fn test_replay_history() {
    let (dir, config_path) = workspace_with_dataset(4);
    let history = dir.path().join("history.csv");
    std::fs::write(
        &history,
        "epoch,loss,recall,val_loss\n0,9.1,0.10,8.0\n1,7.2,0.25,6.5\n2,6.0,0.40,6.1\n3,5.5,0.38,6.2\n",
    )
    .unwrap();

    cargo_bin_cmd!("detcfg")
        .arg("replay")
        .arg(&config_path)
        .arg(&history)
        .assert()
        .success()
        .stdout(predicate::str::contains("Monitored: recall"))
        .stdout(predicate::str::contains("Ran the full epoch budget"))
        .stdout(predicate::str::contains("Best: 0.4 at epoch 3"))
        .stdout(predicate::str::contains("epochs: 1, 2, 3"));
}

#[test]
fn test_plan_rejects_overflowing_steps() {
    let (_dir, config_path) = workspace_with_dataset(4);

    cargo_bin_cmd!("detcfg")
        .arg("plan")
        .arg(&config_path)
        .arg("--steps-per-epoch")
        .arg(u64::MAX.to_string())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid learning rate schedule"));
}
