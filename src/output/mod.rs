//! Report rendering and file outputs.

mod lr_table;
pub mod progress;
mod summary;

pub use lr_table::write_lr_table;
pub use summary::{config_summary, inventory_summary, plan_summary, replay_summary};
