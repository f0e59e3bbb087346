//! Replay a recorded metric history through the epoch-end monitors.
//!
//! The history is a CSV file with a header row, such as the one a Keras
//! `CSVLogger` writes. Rows are epochs in order; the monitored column is
//! looked up by name and every other column is ignored.

use crate::error::{Error, Result};
use crate::training::{BestCheckpoint, EarlyStopping, EarlyStoppingDecision, MetricMode};
use std::path::Path;
use tracing::debug;

/// What the monitors would have done over a recorded run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayReport {
    /// Monitored column.
    pub monitor: String,
    /// Epochs that would have run.
    pub epochs_run: u32,
    /// Epoch at which early stopping fired, if it did.
    pub stopped_at: Option<u32>,
    /// Best `(epoch, value)` seen.
    pub best: Option<(u32, f64)>,
    /// Epochs at which the best checkpoint was written.
    pub checkpoint_epochs: Vec<u32>,
    /// Epochs after the best one without an improvement.
    pub epochs_since_best: u32,
    /// Whether the run used its whole epoch budget.
    pub budget_exhausted: bool,
    /// History rows beyond the point where training would have ended.
    pub ignored_rows: usize,
}

/// Read the monitored column of a history file.
pub fn read_metric_column(path: &Path, column: &str) -> Result<Vec<f64>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::HistoryParse {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let headers = reader.headers().map_err(|e| Error::HistoryParse {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    let index = headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| Error::MetricColumnMissing {
            path: path.to_path_buf(),
            column: column.to_string(),
        })?;

    let mut values = Vec::new();
    for (line_num, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::InvalidHistoryFormat {
            message: format!("line {}: {e}", line_num + 2),
        })?;
        let field = record.get(index).unwrap_or_default();
        let value: f64 = field.parse().map_err(|_| Error::InvalidHistoryFormat {
            message: format!(
                "line {}: '{field}' in column '{column}' is not a number",
                line_num + 2
            ),
        })?;
        values.push(value);
    }

    debug!("Read {} epochs of '{}' from {}", values.len(), column, path.display());
    Ok(values)
}

/// Feed per-epoch values through early stopping and the best checkpoint.
///
/// Epochs are numbered from 1 in row order. At most `max_epochs` rows are
/// used.
pub fn replay_values(
    values: &[f64],
    monitor: &str,
    mode: MetricMode,
    max_epochs: u32,
    mut early_stopping: EarlyStopping,
) -> ReplayReport {
    let mut checkpoint = BestCheckpoint::new(mode);
    let mut epochs_run = 0;
    let mut stopped_at = None;

    for (epoch, &value) in (1..=max_epochs).zip(values) {
        epochs_run = epoch;
        checkpoint.observe(epoch, value);
        if let EarlyStoppingDecision::Stop { .. } = early_stopping.observe(epoch, value) {
            stopped_at = Some(epoch);
            break;
        }
    }

    ReplayReport {
        monitor: monitor.to_string(),
        epochs_run,
        stopped_at,
        best: early_stopping.best(),
        epochs_since_best: early_stopping.wait(),
        checkpoint_epochs: checkpoint.saved_epochs().to_vec(),
        budget_exhausted: stopped_at.is_none() && epochs_run == max_epochs,
        ignored_rows: values.len().saturating_sub(epochs_run as usize),
    }
}

/// Replay the `monitor` column of a history file.
pub fn replay_history(
    path: &Path,
    monitor: &str,
    mode: MetricMode,
    max_epochs: u32,
) -> Result<ReplayReport> {
    let values = read_metric_column(path, monitor)?;
    if values.is_empty() {
        return Err(Error::InvalidHistoryFormat {
            message: format!("'{}' has no epochs", path.display()),
        });
    }

    Ok(replay_values(
        &values,
        monitor,
        mode,
        max_epochs,
        EarlyStopping::new(mode),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn history(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{contents}").unwrap();
        file
    }

    #[test]
    fn test_read_metric_column() {
        let file = history("epoch,loss,recall\n0,5.1,0.20\n1,4.0, 0.35\n");
        let values = read_metric_column(file.path(), "recall").unwrap();
        assert_eq!(values, vec![0.20, 0.35]);
    }

    #[test]
    fn test_missing_column() {
        let file = history("epoch,loss\n0,5.1\n");
        let result = read_metric_column(file.path(), "recall");
        assert!(matches!(result, Err(Error::MetricColumnMissing { .. })));
    }

    #[test]
    fn test_non_numeric_value() {
        let file = history("epoch,recall\n0,0.2\n1,oops\n");
        let err = read_metric_column(file.path(), "recall").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_replay_stops_early() {
        let values = [0.1, 0.3, 0.29, 0.28, 0.3, 0.5];
        let stopper = EarlyStopping::with_settings(MetricMode::Max, 3, 0.001);
        let report = replay_values(&values, "recall", MetricMode::Max, 100, stopper);

        assert_eq!(report.stopped_at, Some(5));
        assert_eq!(report.epochs_run, 5);
        assert_eq!(report.best, Some((2, 0.3)));
        assert_eq!(report.epochs_since_best, 3);
        assert_eq!(report.checkpoint_epochs, vec![1, 2]);
        assert!(!report.budget_exhausted);
        assert_eq!(report.ignored_rows, 1);
    }

    #[test]
    fn test_replay_respects_epoch_budget() {
        let values = [2.0, 1.5, 1.2, 1.0];
        let report = replay_values(
            &values,
            "val_loss",
            MetricMode::Min,
            3,
            EarlyStopping::new(MetricMode::Min),
        );

        assert_eq!(report.epochs_run, 3);
        assert!(report.budget_exhausted);
        assert_eq!(report.stopped_at, None);
        assert_eq!(report.best, Some((3, 1.2)));
        assert_eq!(report.epochs_since_best, 0);
        assert_eq!(report.checkpoint_epochs, vec![1, 2, 3]);
    }

    #[test]
    fn test_replay_history_empty_file() {
        let file = history("epoch,recall\n");
        let result = replay_history(file.path(), "recall", MetricMode::Max, 10);
        assert!(matches!(result, Err(Error::InvalidHistoryFormat { .. })));
    }
}
