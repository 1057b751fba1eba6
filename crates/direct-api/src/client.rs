//! HTTP client for the provider reports endpoint.
//!
//! Large windows are fetched as pages of `PAGE_LIMIT` rows, transparently
//! concatenated. Transient failures are retried in-client a small bounded
//! number of times with exponential backoff; auth and format failures are
//! surfaced immediately.

use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use reqwest::Client;
use serde::de::DeserializeOwned;

use adboard_core::stats::{CampaignDayStat, DateWindow, DisplayStat, SearchQueryStat, StatsSource};

use crate::errors::{ApiRetryClass, DirectApiError, Result};
use crate::models::{
    RawCampaignRow, RawDisplayRow, RawSearchQueryRow, ReportKind, ReportRequest, ReportResponse,
};

/// Default reports API base.
pub const DEFAULT_BASE_URL: &str = "https://api.direct.yandex.com/json/v5";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_LIMIT: usize = 1000;
const MAX_RETRIES: u32 = 3;
const RETRY_BASE_DELAY_MS: u64 = 500;
const RETRY_MAX_EXPONENT: u32 = 4;

/// Provider credentials: OAuth access token plus the client login the token
/// was issued for. Both are required.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub client_login: String,
}

impl Credentials {
    /// Read both values from the environment; `None` when either is absent
    /// or blank.
    pub fn from_env() -> Option<Self> {
        let access_token = non_empty_env("DIRECT_OAUTH_TOKEN")?;
        let client_login = non_empty_env("DIRECT_CLIENT_LOGIN")?;
        Some(Self {
            access_token,
            client_login,
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Backoff delay before retry `attempt` (1-based), exponential with cap.
fn backoff_delay(attempt: u32) -> Duration {
    let exponent = attempt.min(RETRY_MAX_EXPONENT);
    Duration::from_millis(RETRY_BASE_DELAY_MS * 2_u64.pow(exponent))
}

/// Drive the paging loop: request pages at increasing offsets, concatenating
/// rows until a short page signals the end of the report.
async fn collect_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: std::future::Future<Output = Result<ReportResponse<T>>>,
{
    let mut rows: Vec<T> = Vec::new();
    let mut offset = 0usize;
    loop {
        let page = fetch_page(offset).await?;
        let fetched = page.data.len();
        rows.extend(page.data);
        if fetched < PAGE_LIMIT {
            break;
        }
        offset += fetched;
    }
    Ok(rows)
}

pub struct DirectStatsClient {
    http: Client,
    base_url: String,
    credentials: Option<Credentials>,
}

impl DirectStatsClient {
    pub fn new(base_url: impl Into<String>, credentials: Option<Credentials>) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Client configured from `DIRECT_API_URL`, `DIRECT_OAUTH_TOKEN` and
    /// `DIRECT_CLIENT_LOGIN`. Missing credentials are not an error here;
    /// they fail the first fetch instead, before any network call.
    pub fn from_env() -> Self {
        let base_url =
            non_empty_env("DIRECT_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, Credentials::from_env())
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    fn credentials(&self) -> Result<&Credentials> {
        self.credentials.as_ref().ok_or_else(|| {
            DirectApiError::MissingCredentials(
                "DIRECT_OAUTH_TOKEN and DIRECT_CLIENT_LOGIN must both be set".to_string(),
            )
        })
    }

    /// Fetch every page of one report for the window.
    async fn fetch_report<T: DeserializeOwned>(
        &self,
        report: ReportKind,
        window: &DateWindow,
    ) -> Result<Vec<T>> {
        // Fail fast on configuration before touching the network.
        let credentials = self.credentials()?;

        collect_pages(move |offset| self.request_with_retry::<T>(report, window, offset, credentials))
            .await
    }

    async fn request_with_retry<T: DeserializeOwned>(
        &self,
        report: ReportKind,
        window: &DateWindow,
        offset: usize,
        credentials: &Credentials,
    ) -> Result<ReportResponse<T>> {
        let mut attempt = 0u32;
        loop {
            match self.request_once(report, window, offset, credentials).await {
                Ok(page) => return Ok(page),
                Err(err)
                    if err.retry_class() == ApiRetryClass::Retryable && attempt < MAX_RETRIES =>
                {
                    attempt += 1;
                    let delay = backoff_delay(attempt);
                    warn!(
                        "Report {} attempt {} failed ({}), retrying in {:?}",
                        report.as_str(),
                        attempt,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn request_once<T: DeserializeOwned>(
        &self,
        report: ReportKind,
        window: &DateWindow,
        offset: usize,
        credentials: &Credentials,
    ) -> Result<ReportResponse<T>> {
        let url = format!("{}/reports", self.base_url);
        let body = ReportRequest {
            report: report.as_str(),
            date_from: window.from.format("%Y-%m-%d").to_string(),
            date_to: window.to.format("%Y-%m-%d").to_string(),
            limit: PAGE_LIMIT,
            offset,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&credentials.access_token)
            .header("Client-Login", &credentials.client_login)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DirectApiError::from_status(status.as_u16(), message));
        }

        response
            .json::<ReportResponse<T>>()
            .await
            .map_err(|e| DirectApiError::format(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl StatsSource for DirectStatsClient {
    async fn fetch_campaign_days(
        &self,
        window: &DateWindow,
    ) -> adboard_core::Result<Vec<CampaignDayStat>> {
        let raw = self
            .fetch_report::<RawCampaignRow>(ReportKind::CampaignPerformance, window)
            .await?;
        let rows = raw
            .into_iter()
            .map(CampaignDayStat::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn fetch_search_queries(
        &self,
        window: &DateWindow,
    ) -> adboard_core::Result<Vec<SearchQueryStat>> {
        let raw = self
            .fetch_report::<RawSearchQueryRow>(ReportKind::SearchQueryPerformance, window)
            .await?;
        let rows = raw
            .into_iter()
            .map(SearchQueryStat::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }

    async fn fetch_display_rows(
        &self,
        window: &DateWindow,
    ) -> adboard_core::Result<Vec<DisplayStat>> {
        let raw = self
            .fetch_report::<RawDisplayRow>(ReportKind::DisplayPerformance, window)
            .await?;
        let rows = raw
            .into_iter()
            .map(DisplayStat::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }
}
