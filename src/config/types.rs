//! Configuration type definitions.

use crate::constants::{DETECTOR_NETWORK_NAME, person_detector};
use crate::training::MetricMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete detector training configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Network description.
    pub model: ModelSection,

    /// Weight sources.
    pub weights: WeightsSection,

    /// Training schedule and dataset locations.
    pub train: TrainSection,

    /// Export targets.
    pub converter: ConverterSection,
}

/// Model parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSection {
    /// Model category.
    #[serde(rename = "type")]
    pub model_type: ModelType,

    /// Backbone architecture name.
    pub architecture: String,

    /// Network input height and width.
    pub input_size: [u32; 2],

    /// Anchor priors as `[width, height]`, grouped per detection scale.
    pub anchors: Vec<Vec<[f32; 2]>>,

    /// Ordered class label names.
    pub labels: Vec<String>,

    /// Objectness confidence threshold.
    pub obj_thresh: f32,

    /// IoU threshold for suppression and matching.
    pub iou_thresh: f32,

    /// Weight of the box coordinate loss.
    pub coord_scale: f32,

    /// Weight of the classification loss.
    pub class_scale: f32,

    /// Weight of the objectness loss for cells holding an object.
    pub object_scale: f32,

    /// Weight of the objectness loss for empty cells.
    pub no_object_scale: f32,
}

impl ModelSection {
    /// Network input height in pixels.
    pub fn input_height(&self) -> u32 {
        self.input_size[0]
    }

    /// Network input width in pixels.
    pub fn input_width(&self) -> u32 {
        self.input_size[1]
    }

    /// Total number of anchor boxes across all scales.
    pub fn anchor_count(&self) -> usize {
        self.anchors.iter().map(Vec::len).sum()
    }

    /// Name the trainer gives the network; used in checkpoint file names.
    pub fn network_name(&self) -> &'static str {
        match self.model_type {
            ModelType::Detector => DETECTOR_NETWORK_NAME,
        }
    }
}

impl Default for ModelSection {
    fn default() -> Self {
        Self {
            model_type: ModelType::Detector,
            architecture: person_detector::ARCHITECTURE.to_string(),
            input_size: person_detector::INPUT_SIZE,
            anchors: person_detector::ANCHORS
                .iter()
                .map(|scale| scale.to_vec())
                .collect(),
            labels: vec![person_detector::LABEL.to_string()],
            obj_thresh: person_detector::OBJ_THRESH,
            iou_thresh: person_detector::IOU_THRESH,
            coord_scale: 1.0,
            class_scale: 1.0,
            object_scale: person_detector::OBJECT_SCALE,
            no_object_scale: 1.0,
        }
    }
}

/// Model category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelType {
    /// Anchor-based object detector.
    #[default]
    Detector,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detector => write!(f, "Detector"),
        }
    }
}

/// Weight sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightsSection {
    /// Full checkpoint to resume from; empty when training from the backend.
    pub full: String,

    /// Pretrained backbone weights identifier or path.
    pub backend: String,
}

impl WeightsSection {
    /// Full checkpoint path, if one is configured.
    pub fn full_checkpoint(&self) -> Option<&Path> {
        if self.full.trim().is_empty() {
            None
        } else {
            Some(Path::new(&self.full))
        }
    }
}

impl Default for WeightsSection {
    fn default() -> Self {
        Self {
            full: String::new(),
            backend: person_detector::BACKEND_WEIGHTS.to_string(),
        }
    }
}

/// Training parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSection {
    /// Number of training epochs.
    pub actual_epoch: u32,

    /// Training images folder.
    pub train_image_folder: PathBuf,

    /// Training annotations folder.
    pub train_annot_folder: PathBuf,

    /// How many times the training set is repeated per epoch.
    pub train_times: u32,

    /// Validation images folder; empty to skip validation data.
    pub valid_image_folder: PathBuf,

    /// Validation annotations folder; empty to skip validation data.
    pub valid_annot_folder: PathBuf,

    /// How many times the validation set is repeated per epoch.
    pub valid_times: u32,

    /// Metric that selects the best checkpoint.
    pub valid_metric: ValidMetric,

    /// Training batch size.
    pub batch_size: u32,

    /// Base learning rate.
    pub learning_rate: f64,

    /// Folder that receives training sessions.
    pub saved_folder: PathBuf,

    /// First layer to train; earlier layers are frozen. Empty trains all.
    #[serde(default)]
    pub first_trainable_layer: String,

    /// Enable data augmentation.
    #[serde(default)]
    pub augmentation: bool,

    /// Train objectness only, ignoring class scores.
    #[serde(default)]
    pub is_only_detect: bool,
}

impl TrainSection {
    /// First trainable layer, if one is configured.
    pub fn first_trainable(&self) -> Option<&str> {
        let name = self.first_trainable_layer.trim();
        (!name.is_empty()).then_some(name)
    }

    /// Whether validation folders are configured.
    pub fn has_validation(&self) -> bool {
        !self.valid_image_folder.as_os_str().is_empty()
            && !self.valid_annot_folder.as_os_str().is_empty()
    }
}

impl Default for TrainSection {
    fn default() -> Self {
        let root = PathBuf::from(person_detector::DATASET_ROOT);
        Self {
            actual_epoch: person_detector::EPOCHS,
            train_image_folder: root.join("imgs"),
            train_annot_folder: root.join("anns"),
            train_times: 1,
            valid_image_folder: root.join("imgs_validation"),
            valid_annot_folder: root.join("anns_validation"),
            valid_times: 1,
            valid_metric: ValidMetric::Recall,
            batch_size: person_detector::BATCH_SIZE,
            learning_rate: person_detector::LEARNING_RATE,
            saved_folder: PathBuf::from(person_detector::SAVED_FOLDER),
            first_trainable_layer: String::new(),
            augmentation: true,
            is_only_detect: false,
        }
    }
}

/// Validation metric used to pick the best checkpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidMetric {
    /// Detection recall on the validation set.
    #[default]
    #[serde(rename = "recall")]
    Recall,
    /// Mean average precision on the validation set.
    #[serde(rename = "mAP", alias = "map")]
    MeanAveragePrecision,
    /// Validation loss.
    #[serde(rename = "loss", alias = "val_loss")]
    Loss,
}

impl ValidMetric {
    /// Key the trainer logs this metric under.
    pub fn monitor_key(self) -> &'static str {
        match self {
            Self::Recall => "recall",
            Self::MeanAveragePrecision => "mAP",
            Self::Loss => "val_loss",
        }
    }

    /// Direction in which the metric improves.
    pub fn mode(self) -> MetricMode {
        match self {
            Self::Recall | Self::MeanAveragePrecision => MetricMode::Max,
            Self::Loss => MetricMode::Min,
        }
    }
}

impl std::fmt::Display for ValidMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recall => write!(f, "recall"),
            Self::MeanAveragePrecision => write!(f, "mAP"),
            Self::Loss => write!(f, "loss"),
        }
    }
}

/// Export targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterSection {
    /// Ordered export formats.
    #[serde(rename = "type")]
    pub targets: Vec<ConverterTarget>,
}

impl Default for ConverterSection {
    fn default() -> Self {
        Self {
            targets: vec![ConverterTarget::K210, ConverterTarget::Tflite],
        }
    }
}

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConverterTarget {
    /// Kendryte K210 `.kmodel`.
    K210,
    /// Float TensorFlow Lite.
    Tflite,
    /// Fully integer-quantized TensorFlow Lite.
    TfliteFullint,
    /// Dynamic-range quantized TensorFlow Lite.
    TfliteDynamic,
    /// Edge TPU compiled TensorFlow Lite.
    #[serde(rename = "edgetpu")]
    EdgeTpu,
    /// ONNX.
    Onnx,
    /// OpenVINO IR.
    #[serde(rename = "openvino")]
    OpenVino,
}

impl ConverterTarget {
    /// Every supported target, in documentation order.
    pub const ALL: [Self; 7] = [
        Self::K210,
        Self::Tflite,
        Self::TfliteFullint,
        Self::TfliteDynamic,
        Self::EdgeTpu,
        Self::Onnx,
        Self::OpenVino,
    ];

    /// Suffix appended to the checkpoint basename for the exported file.
    pub fn artifact_suffix(self) -> &'static str {
        match self {
            Self::K210 => ".kmodel",
            Self::Tflite => ".tflite",
            Self::TfliteFullint => "_fullint.tflite",
            Self::TfliteDynamic => "_dynamic.tflite",
            Self::EdgeTpu => "_edgetpu.tflite",
            Self::Onnx => ".onnx",
            Self::OpenVino => ".xml",
        }
    }
}

impl std::fmt::Display for ConverterTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::K210 => write!(f, "k210"),
            Self::Tflite => write!(f, "tflite"),
            Self::TfliteFullint => write!(f, "tflite_fullint"),
            Self::TfliteDynamic => write!(f, "tflite_dynamic"),
            Self::EdgeTpu => write!(f, "edgetpu"),
            Self::Onnx => write!(f, "onnx"),
            Self::OpenVino => write!(f, "openvino"),
        }
    }
}

impl std::str::FromStr for ConverterTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "k210" | "kmodel" => Ok(Self::K210),
            "tflite" => Ok(Self::Tflite),
            "tflite_fullint" => Ok(Self::TfliteFullint),
            "tflite_dynamic" => Ok(Self::TfliteDynamic),
            "edgetpu" | "edge_tpu" => Ok(Self::EdgeTpu),
            "onnx" => Ok(Self::Onnx),
            "openvino" => Ok(Self::OpenVino),
            other => {
                let accepted: Vec<String> = Self::ALL.iter().map(ToString::to_string).collect();
                Err(format!(
                    "unknown converter target: {other} (expected one of: {})",
                    accepted.join(", ")
                ))
            }
        }
    }
}
