//! Single-flight sync orchestrator.
//!
//! One orchestrator instance exists per process, constructed at startup and
//! shared (via `Arc`) between the HTTP layer and the scheduler. It owns the
//! process-wide [`SyncStatus`] behind a mutex; the same lock implements the
//! single-flight check-and-set, so two near-simultaneous callers can never
//! both observe the idle state and both proceed.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use log::{error, info};

use crate::errors::{Error, Result};
use crate::stats::{DateWindow, StatsSource, StatsStore, SyncDomain};
use crate::sync::{SyncRunResult, SyncStatus};

/// Default number of days (ending today) fetched per run.
pub const DEFAULT_SYNC_WINDOW_DAYS: u32 = 7;

pub struct SyncOrchestrator {
    source: Arc<dyn StatsSource>,
    store: Arc<dyn StatsStore>,
    window_days: u32,
    status: Mutex<SyncStatus>,
}

impl SyncOrchestrator {
    pub fn new(source: Arc<dyn StatsSource>, store: Arc<dyn StatsStore>, window_days: u32) -> Self {
        Self {
            source,
            store,
            window_days: window_days.max(1),
            status: Mutex::new(SyncStatus::default()),
        }
    }

    /// Execute one full sync run: for each domain in fixed order, fetch the
    /// window from the remote source and upsert into the local store.
    ///
    /// Returns `Err(Error::SyncInProgress)` without doing any work when a run
    /// is already executing (no queuing, no waiting). Domain failures abort
    /// the remaining domains and come back as `Ok` with `success=false`;
    /// rows committed by earlier domains stay committed.
    ///
    /// The in-progress flag is released on every exit, including the run
    /// future being dropped at an await point (the manual HTTP caller
    /// disconnecting cancels the handler future mid-run).
    pub async fn run_sync(&self) -> Result<SyncRunResult> {
        let started_at = Utc::now();

        let _guard = {
            let mut status = self.lock_status();
            if status.sync_in_progress {
                return Err(Error::SyncInProgress);
            }
            status.sync_in_progress = true;
            InProgressGuard { orchestrator: self }
        };

        let window = DateWindow::ending_at(started_at.date_naive(), self.window_days);
        info!(
            "Sync run started: window {} .. {}",
            window.from, window.to
        );

        let mut domain_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut run_error: Option<Error> = None;

        for domain in SyncDomain::ALL {
            match self.sync_domain(domain, &window).await {
                Ok(count) => {
                    info!("Sync domain {}: {} rows written", domain.as_str(), count);
                    domain_counts.insert(domain.as_str().to_string(), count);
                }
                Err(err) => {
                    error!(
                        "Sync domain {} failed, aborting remaining domains: {}",
                        domain.as_str(),
                        err
                    );
                    run_error = Some(err);
                    break;
                }
            }
        }

        let total_records: usize = domain_counts.values().sum();
        let duration_ms = (Utc::now() - started_at).num_milliseconds();
        let result = SyncRunResult {
            success: run_error.is_none(),
            total_records,
            domain_counts: domain_counts.clone(),
            error: run_error.as_ref().map(|e| e.to_string()),
            error_kind: run_error.as_ref().map(|e| e.kind().to_string()),
            duration_ms,
        };

        {
            let mut status = self.lock_status();
            status.sync_in_progress = false;
            status.last_run_at = Some(started_at);
            status.last_success = result.success;
            status.last_error = result.error.clone();
            status.last_record_counts = domain_counts;
        }

        if result.success {
            info!(
                "Sync run finished: {} rows in {} ms",
                result.total_records, result.duration_ms
            );
        }

        Ok(result)
    }

    /// Snapshot of the current sync status. Safe to call while a run is in
    /// progress; the returned value is a copy, never a live reference.
    pub fn sync_status(&self) -> SyncStatus {
        self.lock_status().clone()
    }

    fn lock_status(&self) -> MutexGuard<'_, SyncStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn sync_domain(&self, domain: SyncDomain, window: &DateWindow) -> Result<usize> {
        match domain {
            SyncDomain::CampaignDaily => {
                let rows = self.source.fetch_campaign_days(window).await?;
                self.store.upsert_campaign_days(rows).await
            }
            SyncDomain::SearchQueries => {
                let rows = self.source.fetch_search_queries(window).await?;
                self.store.upsert_search_queries(rows).await
            }
            SyncDomain::DisplayData => {
                let rows = self.source.fetch_display_rows(window).await?;
                self.store.upsert_display_rows(rows).await
            }
        }
    }
}

/// Releases the single-flight flag when the owning run is dropped, whether it
/// ran to completion or was cancelled at an await point.
struct InProgressGuard<'a> {
    orchestrator: &'a SyncOrchestrator,
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.orchestrator.lock_status().sync_in_progress = false;
    }
}
