//! Configuration file loading and saving.

use crate::config::{DetectorConfig, validate_config};
use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// On-disk encoding of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON document.
    Json,
    /// TOML document with the same schema.
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        use std::ffi::OsStr;

        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case(OsStr::new("json")) => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case(OsStr::new("toml")) => Ok(Self::Toml),
            _ => Err(Error::UnsupportedConfigFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Toml => write!(f, "toml"),
        }
    }
}

/// Parse a configuration document from a string.
pub fn parse_config(contents: &str, format: ConfigFormat, path: &Path) -> Result<DetectorConfig> {
    match format {
        ConfigFormat::Json => serde_json::from_str(contents).map_err(|e| Error::ConfigParseJson {
            path: path.to_path_buf(),
            source: e,
        }),
        ConfigFormat::Toml => toml::from_str(contents).map_err(|e| Error::ConfigParseToml {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Load a configuration document; the format follows the file extension.
pub fn load_config_file(path: &Path) -> Result<DetectorConfig> {
    let format = ConfigFormat::from_path(path)?;

    let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = parse_config(&contents, format, path)?;
    debug!("Loaded {} config from {}", format, path.display());
    Ok(config)
}

/// Load a configuration document and validate it.
pub fn load_and_validate(path: &Path) -> Result<DetectorConfig> {
    let config = load_config_file(path)?;
    validate_config(&config)?;
    Ok(config)
}

/// Serialize a configuration document.
pub fn config_to_string(config: &DetectorConfig, format: ConfigFormat) -> Result<String> {
    match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| Error::ConfigSerializeJson { source: e }),
        ConfigFormat::Toml => {
            toml::to_string_pretty(config).map_err(|e| Error::ConfigSerializeToml { source: e })
        }
    }
}

/// Save a configuration document; the format follows the file extension.
pub fn save_config(config: &DetectorConfig, path: &Path) -> Result<()> {
    let format = ConfigFormat::from_path(path)?;
    let mut contents = config_to_string(config, format)?;
    if !contents.ends_with('\n') {
        contents.push('\n');
    }

    // Create parent directories if they don't exist
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| Error::ConfigWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, contents).map_err(|e| Error::ConfigWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("Saved {} config to {}", format, path.display());
    Ok(())
}
