use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;

use adboard_core::stats::{
    CampaignDayStat, DateWindow, DisplayStat, SearchQueryStat, StatsStore,
};
use adboard_core::Result;

use super::model::{date_to_db, CampaignDayStatDB, DisplayStatDB, SearchQueryStatDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{campaign_daily_stats, display_stats, search_query_stats};

pub struct StatsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl StatsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        StatsRepository { pool, writer }
    }

    /// Campaign-daily rows within the window, ordered by date then campaign.
    pub fn load_campaign_days(&self, window: &DateWindow) -> Result<Vec<CampaignDayStat>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = campaign_daily_stats::table
            .filter(campaign_daily_stats::date.ge(date_to_db(window.from)))
            .filter(campaign_daily_stats::date.le(date_to_db(window.to)))
            .order((campaign_daily_stats::date, campaign_daily_stats::campaign_id))
            .load::<CampaignDayStatDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|row| Ok(CampaignDayStat::try_from(row)?))
            .collect()
    }

    pub fn count_campaign_days(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(campaign_daily_stats::table
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?)
    }

    pub fn count_search_queries(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(search_query_stats::table
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?)
    }

    pub fn count_display_rows(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        Ok(display_stats::table
            .count()
            .get_result(&mut conn)
            .map_err(StorageError::from)?)
    }
}

#[async_trait]
impl StatsStore for StatsRepository {
    async fn upsert_campaign_days(&self, rows: Vec<CampaignDayStat>) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut written = 0;
                for row in rows {
                    let row_db = CampaignDayStatDB::from(row);
                    diesel::insert_into(campaign_daily_stats::table)
                        .values(&row_db)
                        .on_conflict((
                            campaign_daily_stats::campaign_id,
                            campaign_daily_stats::date,
                        ))
                        .do_update()
                        .set(&row_db)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    written += 1;
                }
                Ok(written)
            })
            .await
    }

    async fn upsert_search_queries(&self, rows: Vec<SearchQueryStat>) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut written = 0;
                for row in rows {
                    let row_db = SearchQueryStatDB::from(row);
                    diesel::insert_into(search_query_stats::table)
                        .values(&row_db)
                        .on_conflict((search_query_stats::query, search_query_stats::date))
                        .do_update()
                        .set(&row_db)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    written += 1;
                }
                Ok(written)
            })
            .await
    }

    async fn upsert_display_rows(&self, rows: Vec<DisplayStat>) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut written = 0;
                for row in rows {
                    let row_db = DisplayStatDB::from(row);
                    diesel::insert_into(display_stats::table)
                        .values(&row_db)
                        .on_conflict((display_stats::campaign_id, display_stats::date))
                        .do_update()
                        .set(&row_db)
                        .execute(conn)
                        .map_err(StorageError::from)?;
                    written += 1;
                }
                Ok(written)
            })
            .await
    }
}
