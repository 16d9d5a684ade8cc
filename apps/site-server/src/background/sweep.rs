//! Periodic eviction of expired limiter entries, idle throttle keys and
//! stale cache entries.

use tokio_cron_scheduler::JobSchedulerError;

use super::Scheduler;
use crate::state::AppState;

/// Every five minutes, on the minute.
pub const SWEEP_SCHEDULE: &str = "0 */5 * * * *";

/// Counts of what one sweep removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub rate_limit_entries: usize,
    pub throttle_keys: usize,
    pub cache_entries: usize,
}

pub async fn run_sweep(state: &AppState) -> SweepReport {
    let report = SweepReport {
        rate_limit_entries: state.rate_limiter.sweep(),
        throttle_keys: state.revalidate.throttle.evict_idle(),
        cache_entries: state.content_cache.purge_expired().await,
    };

    if report != SweepReport::default() {
        tracing::debug!(
            rate_limit_entries = report.rate_limit_entries,
            throttle_keys = report.throttle_keys,
            cache_entries = report.cache_entries,
            "Sweep removed expired state"
        );
    }

    report
}

pub async fn register_sweeps(
    scheduler: &Scheduler,
    state: AppState,
) -> Result<uuid::Uuid, JobSchedulerError> {
    scheduler
        .add_cron(SWEEP_SCHEDULE, move || {
            let state = state.clone();
            async move {
                run_sweep(&state).await;
            }
        })
        .await
}
