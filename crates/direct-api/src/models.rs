//! Wire models for the provider reports API and their conversion into the
//! local domain schema.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use adboard_core::stats::{CampaignDayStat, DisplayStat, SearchQueryStat};

use crate::errors::DirectApiError;

/// Report kinds requested from the provider, one per sync domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    CampaignPerformance,
    SearchQueryPerformance,
    DisplayPerformance,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::CampaignPerformance => "campaign_performance",
            ReportKind::SearchQueryPerformance => "search_query_performance",
            ReportKind::DisplayPerformance => "display_performance",
        }
    }
}

/// One paginated report request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportRequest<'a> {
    pub report: &'a str,
    pub date_from: String,
    pub date_to: String,
    pub limit: usize,
    pub offset: usize,
}

/// One page of report rows.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReportResponse<T> {
    pub data: Vec<T>,
    #[allow(dead_code)]
    pub total: Option<u64>,
}

/// Raw campaign performance row as returned by the provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawCampaignRow {
    pub campaign_id: i64,
    #[serde(default)]
    pub campaign_name: Option<String>,
    pub date: String,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: Decimal,
}

/// Raw search-query performance row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawSearchQueryRow {
    pub query: String,
    pub campaign_id: i64,
    pub date: String,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: Decimal,
}

/// Raw display-network performance row.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawDisplayRow {
    pub campaign_id: i64,
    pub date: String,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: Decimal,
    #[serde(default)]
    pub avg_cpm: Option<Decimal>,
}

pub(crate) fn parse_report_date(raw: &str) -> Result<NaiveDate, DirectApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|e| DirectApiError::format(format!("Invalid report date '{}': {}", raw, e)))
}

impl TryFrom<RawCampaignRow> for CampaignDayStat {
    type Error = DirectApiError;

    fn try_from(raw: RawCampaignRow) -> Result<Self, Self::Error> {
        Ok(CampaignDayStat {
            campaign_id: raw.campaign_id,
            campaign_name: raw.campaign_name.unwrap_or_default(),
            date: parse_report_date(&raw.date)?,
            impressions: raw.impressions,
            clicks: raw.clicks,
            cost: raw.cost,
        })
    }
}

impl TryFrom<RawSearchQueryRow> for SearchQueryStat {
    type Error = DirectApiError;

    fn try_from(raw: RawSearchQueryRow) -> Result<Self, Self::Error> {
        if raw.query.is_empty() {
            return Err(DirectApiError::format(
                "Search query row with empty query".to_string(),
            ));
        }
        Ok(SearchQueryStat {
            query: raw.query,
            campaign_id: raw.campaign_id,
            date: parse_report_date(&raw.date)?,
            impressions: raw.impressions,
            clicks: raw.clicks,
            cost: raw.cost,
        })
    }
}

impl TryFrom<RawDisplayRow> for DisplayStat {
    type Error = DirectApiError;

    fn try_from(raw: RawDisplayRow) -> Result<Self, Self::Error> {
        Ok(DisplayStat {
            campaign_id: raw.campaign_id,
            date: parse_report_date(&raw.date)?,
            impressions: raw.impressions,
            clicks: raw.clicks,
            cost: raw.cost,
            avg_cpm: raw.avg_cpm,
        })
    }
}
