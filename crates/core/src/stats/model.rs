//! Domain models for ingested ad-platform statistics.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One category of ingested data. Domains are processed sequentially in this
/// order within a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDomain {
    CampaignDaily,
    SearchQueries,
    DisplayData,
}

impl SyncDomain {
    pub const ALL: [SyncDomain; 3] = [
        SyncDomain::CampaignDaily,
        SyncDomain::SearchQueries,
        SyncDomain::DisplayData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncDomain::CampaignDaily => "campaign_daily",
            SyncDomain::SearchQueries => "search_queries",
            SyncDomain::DisplayData => "display_data",
        }
    }
}

/// Inclusive date range fetched from the remote provider in one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// Window of `days` days ending at `to` (inclusive).
    pub fn ending_at(to: NaiveDate, days: u32) -> Self {
        let span = i64::from(days.max(1)) - 1;
        Self {
            from: to - chrono::Duration::days(span),
            to,
        }
    }
}

/// Daily campaign performance row, keyed by (campaign_id, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDayStat {
    pub campaign_id: i64,
    pub campaign_name: String,
    pub date: NaiveDate,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: Decimal,
}

/// Search-query performance row, keyed by (query, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryStat {
    pub query: String,
    pub campaign_id: i64,
    pub date: NaiveDate,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: Decimal,
}

/// Display-network performance row, keyed by (campaign_id, date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayStat {
    pub campaign_id: i64,
    pub date: NaiveDate,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: Decimal,
    pub avg_cpm: Option<Decimal>,
}
