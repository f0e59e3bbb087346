//! Training session folder layout.

use crate::config::{ConverterTarget, DetectorConfig};
use crate::constants::session::{
    CHECKPOINT_EXTENSION, INTERRUPT_SUFFIX, LOGS_DIR, TIMESTAMP_FORMAT,
};
use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};
use tracing::info;

/// Where a training run writes its checkpoints, logs and exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLayout {
    /// Timestamped folder for this run.
    pub folder: PathBuf,
    /// Checkpoint basename, e.g. `YOLO_best_recall`.
    pub basename: String,
}

impl SessionLayout {
    /// Layout for a run of `config` started at `started`.
    pub fn new<Tz>(config: &DetectorConfig, saved_folder: &Path, started: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let folder = saved_folder.join(started.format(TIMESTAMP_FORMAT).to_string());
        let basename = format!(
            "{}_best_{}",
            config.model.network_name(),
            config.train.valid_metric.monitor_key()
        );
        Self { folder, basename }
    }

    /// Checkpoint saved whenever the monitored metric improves.
    pub fn best_checkpoint(&self) -> PathBuf {
        self.folder
            .join(format!("{}{CHECKPOINT_EXTENSION}", self.basename))
    }

    /// Checkpoint saved when the run is interrupted.
    pub fn interrupt_checkpoint(&self) -> PathBuf {
        self.folder.join(format!(
            "{}{INTERRUPT_SUFFIX}{CHECKPOINT_EXTENSION}",
            self.basename
        ))
    }

    /// Folder the trainer's logs are copied into.
    pub fn logs_dir(&self) -> PathBuf {
        self.folder.join(LOGS_DIR)
    }

    /// Exported model file for a converter target.
    pub fn export_path(&self, target: ConverterTarget) -> PathBuf {
        self.folder
            .join(format!("{}{}", self.basename, target.artifact_suffix()))
    }

    /// Create the session folder; an existing folder is an error.
    pub fn create(&self) -> Result<()> {
        if self.folder.exists() {
            return Err(Error::SessionExists {
                path: self.folder.clone(),
            });
        }

        std::fs::create_dir_all(&self.folder).map_err(|e| Error::SessionCreate {
            path: self.folder.clone(),
            source: e,
        })?;

        info!("Current training session folder is {}", self.folder.display());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn started() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_layout_names() {
        let config = DetectorConfig::default();
        let layout = SessionLayout::new(&config, Path::new("person_detector"), &started());

        assert_eq!(
            layout.folder,
            PathBuf::from("person_detector/2024-03-09_14-05-07")
        );
        assert_eq!(layout.basename, "YOLO_best_recall");
        assert_eq!(
            layout.best_checkpoint(),
            PathBuf::from("person_detector/2024-03-09_14-05-07/YOLO_best_recall.h5")
        );
        assert_eq!(
            layout.interrupt_checkpoint(),
            PathBuf::from("person_detector/2024-03-09_14-05-07/YOLO_best_recall_ctrlc.h5")
        );
        assert!(layout.logs_dir().ends_with("logs"));
        assert_eq!(
            layout.export_path(ConverterTarget::K210),
            PathBuf::from("person_detector/2024-03-09_14-05-07/YOLO_best_recall.kmodel")
        );
    }

    #[test]
    fn test_layout_uses_monitor_key() {
        let mut config = DetectorConfig::default();
        config.train.valid_metric = crate::config::ValidMetric::Loss;
        let layout = SessionLayout::new(&config, Path::new("out"), &started());
        assert_eq!(layout.basename, "YOLO_best_val_loss");
    }

    #[test]
    fn test_create_refuses_existing_folder() {
        let dir = TempDir::new().unwrap();
        let config = DetectorConfig::default();
        let layout = SessionLayout::new(&config, dir.path(), &started());

        layout.create().unwrap();
        assert!(layout.folder.is_dir());
        assert!(matches!(
            layout.create(),
            Err(Error::SessionExists { .. })
        ));
    }
}
