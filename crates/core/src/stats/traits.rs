//! Contracts between the sync orchestrator and its collaborators.

use async_trait::async_trait;

use crate::errors::Result;
use crate::stats::{CampaignDayStat, DateWindow, DisplayStat, SearchQueryStat};

/// Remote source of already-transformed statistic rows for one date window.
///
/// Implementations own the provider wire format and credentials; a missing
/// credential must fail before any network call is attempted.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_campaign_days(&self, window: &DateWindow) -> Result<Vec<CampaignDayStat>>;
    async fn fetch_search_queries(&self, window: &DateWindow) -> Result<Vec<SearchQueryStat>>;
    async fn fetch_display_rows(&self, window: &DateWindow) -> Result<Vec<DisplayStat>>;
}

/// Local persistence for ingested rows, upsert-by-natural-key per domain.
///
/// Upserts must be idempotent: re-writing the same key overwrites prior
/// values and never produces duplicate rows. Each call returns the number of
/// rows written.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn upsert_campaign_days(&self, rows: Vec<CampaignDayStat>) -> Result<usize>;
    async fn upsert_search_queries(&self, rows: Vec<SearchQueryStat>) -> Result<usize>;
    async fn upsert_display_rows(&self, rows: Vec<DisplayStat>) -> Result<usize>;
}
