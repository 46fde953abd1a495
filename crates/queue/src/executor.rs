//! Job executor backed by the core services.

use plaza_common::{AppResult, LocalClock};
use plaza_core::{LifecycleService, SweepReport};

use crate::scheduler::JobExecutor;

/// Runs scheduled jobs against the lifecycle service, reading "now" from
/// the event timezone clock.
#[derive(Clone)]
pub struct LifecycleExecutor {
    lifecycle: LifecycleService,
    clock: LocalClock,
}

impl LifecycleExecutor {
    #[must_use]
    pub const fn new(lifecycle: LifecycleService, clock: LocalClock) -> Self {
        Self { lifecycle, clock }
    }
}

#[async_trait::async_trait]
impl JobExecutor for LifecycleExecutor {
    async fn sweep_events(&self) -> AppResult<SweepReport> {
        self.lifecycle.sweep(self.clock.now()).await
    }
}
