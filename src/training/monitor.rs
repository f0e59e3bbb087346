//! Validation-metric monitors applied at the end of every epoch.
//!
//! These mirror the callbacks the trainer attaches: early stopping that
//! restores the best weights and a save-best-only checkpoint.

use crate::constants::callbacks::{EARLY_STOP_MIN_DELTA, EARLY_STOP_PATIENCE};

/// Direction in which a monitored metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricMode {
    /// Lower is better.
    Min,
    /// Higher is better.
    Max,
}

impl MetricMode {
    /// Whether `current` beats `best` by more than `min_delta`.
    ///
    /// Non-finite values never count as improvements. With no previous best
    /// any finite value improves.
    pub fn is_improvement(self, current: f64, best: Option<f64>, min_delta: f64) -> bool {
        if !current.is_finite() {
            return false;
        }
        let Some(best) = best else {
            return true;
        };
        match self {
            Self::Min => current + min_delta < best,
            Self::Max => current - min_delta > best,
        }
    }
}

impl std::fmt::Display for MetricMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Min => write!(f, "min"),
            Self::Max => write!(f, "max"),
        }
    }
}

/// Outcome of feeding one epoch to [`EarlyStopping`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EarlyStoppingDecision {
    /// Keep training.
    Continue,
    /// Stop after this epoch; weights roll back to `best_epoch`.
    Stop {
        /// Epoch whose weights are restored.
        best_epoch: u32,
    },
}

/// Stops training once the monitored metric stalls for `patience` epochs.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    /// Improvement direction.
    pub mode: MetricMode,
    /// Epochs without improvement tolerated before stopping.
    pub patience: u32,
    /// Minimum change that counts as an improvement.
    pub min_delta: f64,
    /// Roll back to the best epoch when stopping.
    pub restore_best_weights: bool,
    best: Option<(u32, f64)>,
    wait: u32,
}

impl EarlyStopping {
    /// Early stopping with the trainer's patience and delta.
    pub fn new(mode: MetricMode) -> Self {
        Self::with_settings(mode, EARLY_STOP_PATIENCE, EARLY_STOP_MIN_DELTA)
    }

    /// Early stopping with explicit settings.
    pub fn with_settings(mode: MetricMode, patience: u32, min_delta: f64) -> Self {
        Self {
            mode,
            patience,
            min_delta: min_delta.abs(),
            restore_best_weights: true,
            best: None,
            wait: 0,
        }
    }

    /// Record the metric for `epoch` and decide whether to continue.
    pub fn observe(&mut self, epoch: u32, value: f64) -> EarlyStoppingDecision {
        if self
            .mode
            .is_improvement(value, self.best.map(|(_, v)| v), self.min_delta)
        {
            self.best = Some((epoch, value));
            self.wait = 0;
            return EarlyStoppingDecision::Continue;
        }

        self.wait += 1;
        if self.wait >= self.patience {
            EarlyStoppingDecision::Stop {
                best_epoch: self.best.map_or(epoch, |(e, _)| e),
            }
        } else {
            EarlyStoppingDecision::Continue
        }
    }

    /// Best `(epoch, value)` seen so far.
    pub fn best(&self) -> Option<(u32, f64)> {
        self.best
    }

    /// Epochs since the last improvement.
    pub fn wait(&self) -> u32 {
        self.wait
    }
}

/// Save-best-only checkpoint policy.
#[derive(Debug, Clone)]
pub struct BestCheckpoint {
    /// Improvement direction.
    pub mode: MetricMode,
    best: Option<f64>,
    saved_epochs: Vec<u32>,
}

impl BestCheckpoint {
    /// Create a policy for the given direction.
    pub fn new(mode: MetricMode) -> Self {
        Self {
            mode,
            best: None,
            saved_epochs: Vec::new(),
        }
    }

    /// Record the metric for `epoch`; returns true when a checkpoint is written.
    pub fn observe(&mut self, epoch: u32, value: f64) -> bool {
        if self.mode.is_improvement(value, self.best, 0.0) {
            self.best = Some(value);
            self.saved_epochs.push(epoch);
            true
        } else {
            false
        }
    }

    /// Epochs at which a checkpoint was written.
    pub fn saved_epochs(&self) -> &[u32] {
        &self.saved_epochs
    }
}
