//! Error types for detcfg.

/// Result type alias for detcfg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for detcfg.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a JSON configuration file.
    #[error("failed to parse JSON config file '{path}'")]
    ConfigParseJson {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse a TOML configuration file.
    #[error("failed to parse TOML config file '{path}'")]
    ConfigParseToml {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration file extension is neither `.json` nor `.toml`.
    #[error("unsupported config format for '{path}' (expected .json or .toml)")]
    UnsupportedConfigFormat {
        /// Path with the unsupported extension.
        path: std::path::PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration as JSON.
    #[error("failed to serialize config as JSON")]
    ConfigSerializeJson {
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to serialize configuration as TOML.
    #[error("failed to serialize config as TOML")]
    ConfigSerializeToml {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Refused to overwrite an existing file.
    #[error("file already exists: {path} (use --force to overwrite)")]
    OutputExists {
        /// Path to the existing file.
        path: std::path::PathBuf,
    },

    /// Dataset folder referenced by the config does not exist.
    #[error("dataset folder does not exist: {path} ({field})")]
    DatasetFolderNotFound {
        /// Config field that names the folder.
        field: &'static str,
        /// Resolved folder path.
        path: std::path::PathBuf,
    },

    /// Failed to list a dataset folder.
    #[error("failed to read dataset folder '{path}'")]
    DatasetRead {
        /// Path to the folder.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Annotation folder holds no annotations.
    #[error("no annotations found in '{path}'")]
    EmptyDataset {
        /// Path to the annotation folder.
        path: std::path::PathBuf,
    },

    /// First trainable layer is not a layer of the model.
    #[error(
        "first trainable layer '{name}' is not in the model (candidates: {})",
        .candidates.join(", ")
    )]
    FirstTrainableLayerNotFound {
        /// Configured layer name.
        name: String,
        /// Layer names the model actually has, in order.
        candidates: Vec<String>,
    },

    /// Failed to read a layer-name list.
    #[error("failed to read layer list '{path}'")]
    LayersRead {
        /// Path to the layer list.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Learning-rate schedule parameters are inconsistent.
    #[error("invalid learning rate schedule: {message}")]
    InvalidSchedule {
        /// Description of the inconsistency.
        message: String,
    },

    /// Session folder already exists.
    #[error("session folder already exists: {path}")]
    SessionExists {
        /// Path to the session folder.
        path: std::path::PathBuf,
    },

    /// Failed to create session folder.
    #[error("failed to create session folder '{path}'")]
    SessionCreate {
        /// Path to the session folder.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a metric history file.
    #[error("failed to parse history file '{path}'")]
    HistoryParse {
        /// Path to the history file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid metric history contents.
    #[error("invalid history file format: {message}")]
    InvalidHistoryFormat {
        /// Description of the format error.
        message: String,
    },

    /// Monitored metric column missing from a history file.
    #[error("history file '{path}' has no '{column}' column")]
    MetricColumnMissing {
        /// Path to the history file.
        path: std::path::PathBuf,
        /// Missing column name.
        column: String,
    },

    /// Failed to write the learning-rate table.
    #[error("failed to write learning rate table '{path}'")]
    LrTableWrite {
        /// Path to the CSV file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },
}
