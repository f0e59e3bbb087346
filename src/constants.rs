//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for user-facing messages.
pub const APP_NAME: &str = "detcfg";

/// Network name used in checkpoint file names for detector models.
pub const DETECTOR_NETWORK_NAME: &str = "YOLO";

/// Number of detection scales a detector config must describe.
pub const ANCHOR_SCALES: usize = 2;

/// Number of anchor boxes per detection scale.
pub const ANCHORS_PER_SCALE: usize = 3;

/// Backbones the downstream trainer knows how to build.
///
/// Unknown names only produce a warning; the trainer has the final say.
pub const KNOWN_ARCHITECTURES: &[&str] = &[
    "Full Yolo",
    "Tiny Yolo",
    "MobileNet1_0",
    "MobileNet7_5",
    "MobileNet5_0",
    "MobileNet2_5",
    "SqueezeNet",
    "NASNetMobile",
    "DenseNet121",
    "ResNet50",
];

/// Threshold value bounds.
pub mod threshold {
    /// Minimum valid threshold.
    pub const MIN: f32 = 0.0;
    /// Maximum valid threshold.
    pub const MAX: f32 = 1.0;
}

/// Defaults of the person detector template written by `detcfg init`.
pub mod person_detector {
    /// Backbone architecture.
    pub const ARCHITECTURE: &str = "MobileNet5_0";
    /// Network input height and width.
    pub const INPUT_SIZE: [u32; 2] = [224, 320];
    /// Anchor priors per scale, as [width, height].
    pub const ANCHORS: [[[f32; 2]; 3]; 2] = [
        [
            [0.761_200_4, 0.571_559_9],
            [0.692_334_8, 0.885_355_5],
            [0.471_630_4, 0.341_633_1],
        ],
        [
            [0.333_407_9, 0.700_658_6],
            [0.181_249_6, 0.389_867_5],
            [0.084_973_49, 0.152_705_7],
        ],
    ];
    /// Class label.
    pub const LABEL: &str = "person";
    /// Objectness threshold.
    pub const OBJ_THRESH: f32 = 0.7;
    /// IoU threshold.
    pub const IOU_THRESH: f32 = 0.5;
    /// Weight of the object term in the loss.
    pub const OBJECT_SCALE: f32 = 3.0;
    /// Pretrained backbone weights.
    pub const BACKEND_WEIGHTS: &str = "imagenet";
    /// Number of training epochs.
    pub const EPOCHS: u32 = 100;
    /// Training batch size.
    pub const BATCH_SIZE: u32 = 32;
    /// Base learning rate.
    pub const LEARNING_RATE: f64 = 1e-3;
    /// Dataset root used for the template folder paths.
    pub const DATASET_ROOT: &str = "../datasets/person_detection";
    /// Output folder for training sessions.
    pub const SAVED_FOLDER: &str = "person_detector";
}

/// Training callback settings applied by the downstream trainer.
pub mod callbacks {
    /// Epochs without improvement before early stopping fires.
    pub const EARLY_STOP_PATIENCE: u32 = 20;
    /// Minimum change that counts as an improvement for early stopping.
    pub const EARLY_STOP_MIN_DELTA: f64 = 0.001;
    /// Upper bound on warm-up length, in epochs.
    pub const WARMUP_EPOCHS: u32 = 3;
    /// Learning rate at the start of warm-up.
    pub const WARMUP_START_LR: f64 = 0.0;
    /// Steps the base rate is held after warm-up.
    pub const HOLD_BASE_RATE_STEPS: u64 = 0;
}

/// Session folder naming.
pub mod session {
    /// `chrono` format of the session folder name.
    pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
    /// Extension of saved Keras checkpoints.
    pub const CHECKPOINT_EXTENSION: &str = ".h5";
    /// Suffix of the checkpoint saved on interrupt.
    pub const INTERRUPT_SUFFIX: &str = "_ctrlc";
    /// Folder the trainer copies its logs into.
    pub const LOGS_DIR: &str = "logs";
}

/// Dataset file extensions.
pub mod dataset {
    /// Image file extensions.
    pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];
    /// PASCAL VOC annotation extension.
    pub const ANNOTATION_EXTENSION: &str = "xml";
}

/// Default sampling interval (in steps) for printed learning-rate tables.
pub const DEFAULT_LR_TABLE_EVERY: u64 = 100;

/// Upper bound on rows in a learning-rate table.
pub const MAX_LR_TABLE_ROWS: u64 = 1_000_000;
