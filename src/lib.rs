//! PERT estimation and critical-path scheduling for project task graphs.

pub mod cache;
pub mod error;
pub mod output;
pub mod schedule;
pub mod task;
pub mod util;

pub use error::{CritpathError, InvalidEstimate, Result};
pub use schedule::{CalendarEntry, Schedule, ScheduledTask, compute_critical_path};
pub use task::{Priority, Status, Task, expected_duration};
