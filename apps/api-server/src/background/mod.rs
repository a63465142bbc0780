//! Background processing.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig, register_purge_jobs};
