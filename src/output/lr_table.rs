//! Learning-rate table CSV writer.

use crate::error::{Error, Result};
use crate::training::LrPoint;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct LrRow {
    step: u64,
    epoch: u64,
    learning_rate: f64,
}

/// Write sampled schedule points as `step,epoch,learning_rate`.
pub fn write_lr_table(path: &Path, points: &[LrPoint]) -> Result<()> {
    let to_error = |e: csv::Error| Error::LrTableWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = csv::Writer::from_path(path).map_err(to_error)?;
    for point in points {
        writer
            .serialize(LrRow {
                step: point.step,
                epoch: point.epoch,
                learning_rate: point.learning_rate,
            })
            .map_err(to_error)?;
    }
    writer.flush().map_err(|e| to_error(e.into()))?;
    Ok(())
}
