//! Training session planning.
//!
//! Nothing here trains a model. These are the decisions a trainer makes from
//! the configuration: where the run writes, which layers stay frozen, how the
//! learning rate moves and when the run stops.

mod freeze;
mod monitor;
mod plan;
mod replay;
mod schedule;
mod session;

pub use freeze::{FreezePlan, plan_frozen_layers, read_layer_names};
pub use monitor::{BestCheckpoint, EarlyStopping, EarlyStoppingDecision, MetricMode};
pub use plan::{MonitorSettings, TrainingPlan};
pub use replay::{ReplayReport, read_metric_column, replay_history, replay_values};
pub use schedule::{LrPoint, WarmupCosineSchedule};
pub use session::SessionLayout;
