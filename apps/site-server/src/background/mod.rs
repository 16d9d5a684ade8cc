//! Background maintenance jobs.

mod scheduler;
mod sweep;

pub use scheduler::{Scheduler, SchedulerConfig};
pub use sweep::register_sweeps;
