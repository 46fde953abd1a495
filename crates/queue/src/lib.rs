//! Background jobs for plaza.
//!
//! - **Scheduler**: periodic tasks driven by tokio intervals
//! - **Executor**: the event lifecycle sweep (finalization, status refresh)

pub mod executor;
pub mod scheduler;

pub use executor::LifecycleExecutor;
pub use scheduler::{JobExecutor, ScheduledJob, SchedulerConfig, SchedulerState, run_scheduler};
