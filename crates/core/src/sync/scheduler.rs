//! Time-of-day sync scheduler.
//!
//! A recurring timer checks the local wall-clock hour against the persisted
//! [`SyncSettings`] and fires `run_sync` at most once per day per provider
//! slot. Settings are re-read on every tick so changes apply without a
//! restart. Runs execute on their own task, so a slow sync never delays the
//! next tick; an overlapping run is rejected by the orchestrator's
//! single-flight guard and counts as that day's trigger.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use log::{info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::errors::Error;
use crate::sync::{SyncOrchestrator, SyncProvider, SyncSettingsRepositoryTrait};

/// Tick cadence for the scheduler timer.
pub const SCHEDULER_TICK_INTERVAL_SECS: u64 = 60;

/// Wall-clock source, injectable for tests.
pub trait Clock: Send + Sync {
    fn now_local(&self) -> NaiveDateTime;
}

/// Production clock reading the host's local time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_local(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

pub struct SyncScheduler {
    orchestrator: Arc<SyncOrchestrator>,
    settings: Arc<dyn SyncSettingsRepositoryTrait>,
    clock: Arc<dyn Clock>,
    last_triggered: Mutex<HashMap<SyncProvider, NaiveDate>>,
}

impl SyncScheduler {
    pub fn new(
        orchestrator: Arc<SyncOrchestrator>,
        settings: Arc<dyn SyncSettingsRepositoryTrait>,
    ) -> Self {
        Self::with_clock(orchestrator, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        orchestrator: Arc<SyncOrchestrator>,
        settings: Arc<dyn SyncSettingsRepositoryTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orchestrator,
            settings,
            clock,
            last_triggered: Mutex::new(HashMap::new()),
        }
    }

    /// One scheduling decision: read fresh settings and the clock, return the
    /// provider slots due right now. Returned slots are marked as triggered
    /// for today before this returns, so re-crossing the same hour on the
    /// same day never fires twice.
    pub async fn tick(&self) -> Vec<SyncProvider> {
        let settings = match self.settings.get_settings().await {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Scheduler tick skipped, settings unavailable: {}", err);
                return Vec::new();
            }
        };

        let now = self.clock.now_local();
        let today = now.date();
        let hour = now.hour() as i32;

        let mut last = self.last_triggered.lock().await;
        let mut due = Vec::new();
        for provider in SyncProvider::ALL {
            if !settings.enabled(provider) {
                continue;
            }
            if settings.hour(provider) != hour {
                continue;
            }
            if last.get(&provider) == Some(&today) {
                continue;
            }
            last.insert(provider, today);
            due.push(provider);
        }
        due
    }

    /// Run one scheduled trigger to completion, logging the outcome. Errors
    /// never propagate: each tick is independent of previous failures.
    pub async fn fire(&self, provider: SyncProvider) {
        info!("Scheduled sync trigger for {}", provider.as_str());
        match self.orchestrator.run_sync().await {
            Ok(result) if result.success => {
                info!(
                    "Scheduled sync for {} completed: {} rows in {} ms",
                    provider.as_str(),
                    result.total_records,
                    result.duration_ms
                );
            }
            Ok(result) => {
                warn!(
                    "Scheduled sync for {} failed: {}",
                    provider.as_str(),
                    result.error.unwrap_or_else(|| "unknown error".to_string())
                );
            }
            Err(Error::SyncInProgress) => {
                // Manual trigger collided with the scheduled one; the day is
                // already marked, so this slot will not re-fire this hour.
                info!(
                    "Scheduled sync for {} skipped: a run is already in progress",
                    provider.as_str()
                );
            }
            Err(err) => {
                warn!("Scheduled sync for {} errored: {}", provider.as_str(), err);
            }
        }
    }

    /// Start the timer loop on a background task. In-flight runs are not
    /// cancelled when the handle is stopped.
    pub fn spawn(self: Arc<Self>) -> SchedulerHandle {
        let scheduler = self;
        let task = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SCHEDULER_TICK_INTERVAL_SECS));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                for provider in scheduler.tick().await {
                    let scheduler = Arc::clone(&scheduler);
                    tokio::spawn(async move {
                        scheduler.fire(provider).await;
                    });
                }
            }
        });
        SchedulerHandle { task }
    }
}

/// Handle to the running scheduler timer.
pub struct SchedulerHandle {
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Stop the timer loop. Does not cancel a sync run already executing.
    pub fn stop(&self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}
