//! Sync status and run-result models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Process-wide sync state snapshot. Exactly one live instance exists, owned
/// by the orchestrator; callers only ever see clones of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub sync_in_progress: bool,
    pub last_run_at: Option<DateTime<Utc>>,
    pub last_success: bool,
    pub last_error: Option<String>,
    /// Rows written per domain in the last run (domains that completed only).
    pub last_record_counts: BTreeMap<String, usize>,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            sync_in_progress: false,
            last_run_at: None,
            last_success: false,
            last_error: None,
            last_record_counts: BTreeMap::new(),
        }
    }
}

/// Aggregate outcome of one `run_sync` call.
///
/// A failed domain yields `success=false` with `error`/`error_kind` set and
/// counts covering only the domains that committed before the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRunResult {
    pub success: bool,
    pub total_records: usize,
    pub domain_counts: BTreeMap<String, usize>,
    pub error: Option<String>,
    pub error_kind: Option<String>,
    pub duration_ms: i64,
}
