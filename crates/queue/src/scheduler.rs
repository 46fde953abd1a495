//! Scheduled jobs for periodic event maintenance.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use plaza_common::{AppResult, config::EventsConfig};
use plaza_core::SweepReport;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};

/// Scheduled job types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledJob {
    /// Finalize voting events past their deadline and refresh cached statuses.
    SweepEvents,
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval between lifecycle sweeps (default: 5 minutes).
    pub sweep_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(300),
        }
    }
}

impl From<&EventsConfig> for SchedulerConfig {
    fn from(config: &EventsConfig) -> Self {
        Self {
            // A zero period would make `interval` panic.
            sweep_interval: Duration::from_secs(config.sweep_interval_secs.max(1)),
        }
    }
}

/// Outcome of the most recent runs, shared with whoever spawned the scheduler.
#[derive(Debug, Clone, Default)]
pub struct SchedulerState {
    pub last_sweep: Option<DateTime<Utc>>,
    pub last_report: Option<SweepReport>,
    pub consecutive_failures: u32,
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Run one lifecycle sweep.
    async fn sweep_events(&self) -> AppResult<SweepReport>;
}

/// Run the scheduler with the given configuration and executor.
///
/// The first sweep runs immediately so events that closed while the server
/// was down are settled on startup.
pub fn run_scheduler<E: JobExecutor + 'static>(
    config: &SchedulerConfig,
    executor: Arc<E>,
    state: Arc<RwLock<SchedulerState>>,
) -> JoinHandle<()> {
    let sweep_interval = config.sweep_interval;

    tokio::spawn(async move {
        let mut interval = interval(sweep_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let result = executor.sweep_events().await;

            let mut state = state.write().await;
            state.last_sweep = Some(Utc::now());
            match result {
                Ok(report) => {
                    state.last_report = Some(report);
                    state.consecutive_failures = 0;
                }
                Err(e) => {
                    state.consecutive_failures += 1;
                    tracing::error!(
                        error = %e,
                        failures = state.consecutive_failures,
                        "Event sweep failed"
                    );
                }
            }
        }
    })
}
