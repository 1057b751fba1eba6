//! Remote ad-platform reports client.
//!
//! Fetches campaign, search-query and display statistics for a date window
//! from the provider's reports API and converts them into the local domain
//! models. Implements [`adboard_core::stats::StatsSource`] for the sync
//! orchestrator.

mod client;
mod errors;
mod models;

pub use client::{Credentials, DirectStatsClient, DEFAULT_BASE_URL};
pub use errors::{ApiRetryClass, DirectApiError};
pub use models::ReportKind;
