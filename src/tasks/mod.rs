//! Background Tasks Module
//!
//! # Tasks
//! - Sweep: removes stale entries from both cache tiers at a fixed interval

mod sweep;

pub use sweep::{spawn_sweep_task, SweepHandle};
