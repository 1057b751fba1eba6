//! Database models for the statistics tables. Dates are stored as
//! `YYYY-MM-DD` text and money values as decimal strings.

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use adboard_core::stats::{CampaignDayStat, DisplayStat, SearchQueryStat};

use crate::errors::StorageError;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) fn date_to_db(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn date_from_db(value: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| StorageError::conversion(format!("Invalid stored date '{}': {}", value, e)))
}

pub(crate) fn decimal_from_db(value: &str) -> Result<Decimal, StorageError> {
    Decimal::from_str(value)
        .map_err(|e| StorageError::conversion(format!("Invalid stored decimal '{}': {}", value, e)))
}

pub(crate) fn now_db_timestamp() -> String {
    Utc::now().to_rfc3339()
}

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(primary_key(campaign_id, date))]
#[diesel(table_name = crate::schema::campaign_daily_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CampaignDayStatDB {
    pub campaign_id: i64,
    pub campaign_name: String,
    pub date: String,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: String,
    pub updated_at: String,
}

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(primary_key(query, date))]
#[diesel(table_name = crate::schema::search_query_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SearchQueryStatDB {
    pub query: String,
    pub campaign_id: i64,
    pub date: String,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: String,
    pub updated_at: String,
}

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(primary_key(campaign_id, date))]
#[diesel(table_name = crate::schema::display_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DisplayStatDB {
    pub campaign_id: i64,
    pub date: String,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: String,
    pub avg_cpm: Option<String>,
    pub updated_at: String,
}

impl From<CampaignDayStat> for CampaignDayStatDB {
    fn from(stat: CampaignDayStat) -> Self {
        Self {
            campaign_id: stat.campaign_id,
            campaign_name: stat.campaign_name,
            date: date_to_db(stat.date),
            impressions: stat.impressions,
            clicks: stat.clicks,
            cost: stat.cost.to_string(),
            updated_at: now_db_timestamp(),
        }
    }
}

impl TryFrom<CampaignDayStatDB> for CampaignDayStat {
    type Error = StorageError;

    fn try_from(row: CampaignDayStatDB) -> Result<Self, Self::Error> {
        Ok(Self {
            campaign_id: row.campaign_id,
            campaign_name: row.campaign_name,
            date: date_from_db(&row.date)?,
            impressions: row.impressions,
            clicks: row.clicks,
            cost: decimal_from_db(&row.cost)?,
        })
    }
}

impl From<SearchQueryStat> for SearchQueryStatDB {
    fn from(stat: SearchQueryStat) -> Self {
        Self {
            query: stat.query,
            campaign_id: stat.campaign_id,
            date: date_to_db(stat.date),
            impressions: stat.impressions,
            clicks: stat.clicks,
            cost: stat.cost.to_string(),
            updated_at: now_db_timestamp(),
        }
    }
}

impl TryFrom<SearchQueryStatDB> for SearchQueryStat {
    type Error = StorageError;

    fn try_from(row: SearchQueryStatDB) -> Result<Self, Self::Error> {
        Ok(Self {
            query: row.query,
            campaign_id: row.campaign_id,
            date: date_from_db(&row.date)?,
            impressions: row.impressions,
            clicks: row.clicks,
            cost: decimal_from_db(&row.cost)?,
        })
    }
}

impl From<DisplayStat> for DisplayStatDB {
    fn from(stat: DisplayStat) -> Self {
        Self {
            campaign_id: stat.campaign_id,
            date: date_to_db(stat.date),
            impressions: stat.impressions,
            clicks: stat.clicks,
            cost: stat.cost.to_string(),
            avg_cpm: stat.avg_cpm.map(|v| v.to_string()),
            updated_at: now_db_timestamp(),
        }
    }
}

impl TryFrom<DisplayStatDB> for DisplayStat {
    type Error = StorageError;

    fn try_from(row: DisplayStatDB) -> Result<Self, Self::Error> {
        let avg_cpm = row
            .avg_cpm
            .as_deref()
            .map(decimal_from_db)
            .transpose()?;
        Ok(Self {
            campaign_id: row.campaign_id,
            date: date_from_db(&row.date)?,
            impressions: row.impressions,
            clicks: row.clicks,
            cost: decimal_from_db(&row.cost)?,
            avg_cpm,
        })
    }
}
