//! Configuration loading, saving and validation.

mod file;
mod types;
mod validate;

pub use file::{
    ConfigFormat, config_to_string, load_and_validate, load_config_file, parse_config,
    save_config,
};
pub use types::{
    ConverterSection, ConverterTarget, DetectorConfig, ModelSection, ModelType, TrainSection,
    ValidMetric, WeightsSection,
};
pub use validate::{resolve_path, validate_config, validate_dataset_paths};

/// Directory that relative paths inside `config_path` are resolved against.
pub fn config_base_dir(config_path: &std::path::Path) -> std::path::PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| std::path::PathBuf::from("."), std::path::Path::to_path_buf)
}
