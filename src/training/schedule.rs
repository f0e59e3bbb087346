//! Warm-up cosine decay learning-rate schedule.
//!
//! The rate climbs linearly from `warmup_lr` to `base_lr` over the warm-up
//! steps, optionally holds `base_lr`, then follows a half cosine down to zero
//! at `total_steps`.

use crate::constants::MAX_LR_TABLE_ROWS;
use crate::constants::callbacks::{HOLD_BASE_RATE_STEPS, WARMUP_EPOCHS, WARMUP_START_LR};
use crate::error::{Error, Result};
use std::f64::consts::PI;

/// One sampled point of a schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LrPoint {
    /// Global step (batch index across all epochs).
    pub step: u64,
    /// 1-based epoch the step belongs to.
    pub epoch: u64,
    /// Learning rate at this step.
    pub learning_rate: f64,
}

/// Warm-up followed by cosine decay.
#[derive(Debug, Clone, PartialEq)]
pub struct WarmupCosineSchedule {
    /// Rate reached at the end of warm-up.
    pub base_lr: f64,
    /// Rate at step zero.
    pub warmup_lr: f64,
    /// Steps in the whole run.
    pub total_steps: u64,
    /// Steps spent warming up.
    pub warmup_steps: u64,
    /// Steps `base_lr` is held after warm-up.
    pub hold_steps: u64,
    /// Steps per epoch, used to label sampled points.
    pub steps_per_epoch: u64,
}

impl WarmupCosineSchedule {
    /// Build a schedule, rejecting inconsistent parameters.
    pub fn new(
        base_lr: f64,
        warmup_lr: f64,
        total_steps: u64,
        warmup_steps: u64,
        hold_steps: u64,
        steps_per_epoch: u64,
    ) -> Result<Self> {
        if total_steps < warmup_steps {
            return Err(Error::InvalidSchedule {
                message: format!(
                    "total steps ({total_steps}) must be at least the warm-up steps ({warmup_steps})"
                ),
            });
        }
        if base_lr < warmup_lr {
            return Err(Error::InvalidSchedule {
                message: format!(
                    "base learning rate ({base_lr}) must be at least the warm-up rate ({warmup_lr})"
                ),
            });
        }
        if steps_per_epoch == 0 {
            return Err(Error::InvalidSchedule {
                message: "steps per epoch must be at least 1".to_string(),
            });
        }

        Ok(Self {
            base_lr,
            warmup_lr,
            total_steps,
            warmup_steps,
            hold_steps,
            steps_per_epoch,
        })
    }

    /// Schedule the trainer derives from the config: up to three warm-up
    /// epochs (never the whole run) and no hold.
    pub fn for_training(base_lr: f64, steps_per_epoch: u64, epochs: u32) -> Result<Self> {
        let epochs = u64::from(epochs);
        let warmup_epochs = u64::from(WARMUP_EPOCHS).min(epochs.saturating_sub(1));
        let steps_for = |n: u64| {
            steps_per_epoch
                .checked_mul(n)
                .ok_or_else(|| Error::InvalidSchedule {
                    message: format!(
                        "{steps_per_epoch} steps per epoch over {n} epochs overflows the step counter"
                    ),
                })
        };
        Self::new(
            base_lr,
            WARMUP_START_LR,
            steps_for(epochs)?,
            steps_for(warmup_epochs)?,
            HOLD_BASE_RATE_STEPS,
            steps_per_epoch,
        )
    }

    /// Learning rate at a global step.
    #[allow(clippy::cast_precision_loss)]
    pub fn lr_at(&self, step: u64) -> f64 {
        if step > self.total_steps {
            return 0.0;
        }

        if self.warmup_steps > 0 && step < self.warmup_steps {
            let slope = (self.base_lr - self.warmup_lr) / self.warmup_steps as f64;
            return slope.mul_add(step as f64, self.warmup_lr);
        }

        let decay_start = self.warmup_steps + self.hold_steps;
        if self.hold_steps > 0 && step <= decay_start {
            return self.base_lr;
        }

        let decay_steps = self.total_steps.saturating_sub(decay_start);
        if decay_steps == 0 {
            return self.base_lr;
        }

        let progress = step.saturating_sub(decay_start) as f64 / decay_steps as f64;
        0.5 * self.base_lr * (1.0 + (PI * progress).cos())
    }

    /// 1-based epoch of a global step.
    pub fn epoch_of(&self, step: u64) -> u64 {
        (step / self.steps_per_epoch + 1).min(self.total_steps.div_ceil(self.steps_per_epoch).max(1))
    }

    /// Sample the schedule every `every` steps, always including the last step.
    ///
    /// Fails when the table would exceed `MAX_LR_TABLE_ROWS` rows.
    pub fn table(&self, every: u64) -> Result<Vec<LrPoint>> {
        let every = every.max(1);
        let rows = self.total_steps / every + 2;
        if rows > MAX_LR_TABLE_ROWS {
            return Err(Error::InvalidSchedule {
                message: format!(
                    "sampling {} steps every {every} exceeds the {MAX_LR_TABLE_ROWS} row limit; raise --every",
                    self.total_steps
                ),
            });
        }

        let mut points: Vec<LrPoint> = (0..=self.total_steps)
            .step_by(usize::try_from(every).unwrap_or(usize::MAX))
            .map(|step| self.point(step))
            .collect();

        if points.last().is_none_or(|p| p.step != self.total_steps) {
            points.push(self.point(self.total_steps));
        }
        Ok(points)
    }

    fn point(&self, step: u64) -> LrPoint {
        LrPoint {
            step,
            epoch: self.epoch_of(step),
            learning_rate: self.lr_at(step),
        }
    }
}
