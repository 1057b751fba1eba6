use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;

use adboard_core::sync::{SyncSettings, SyncSettingsRepositoryTrait, SyncSettingsUpdate};
use adboard_core::Result;

use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::sync_settings;

/// The settings table holds exactly one row.
const SETTINGS_ROW_ID: i32 = 1;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::sync_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
struct SyncSettingsDB {
    id: i32,
    yandex_enabled: bool,
    yandex_hour: i32,
    moysklad_enabled: bool,
    moysklad_hour: i32,
    updated_at: String,
}

impl From<SyncSettingsDB> for SyncSettings {
    fn from(row: SyncSettingsDB) -> Self {
        SyncSettings {
            yandex_enabled: row.yandex_enabled,
            yandex_hour: row.yandex_hour,
            moysklad_enabled: row.moysklad_enabled,
            moysklad_hour: row.moysklad_hour,
            updated_at: Some(row.updated_at),
        }
    }
}

pub struct SyncSettingsRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SyncSettingsRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        SyncSettingsRepository { pool, writer }
    }
}

#[async_trait]
impl SyncSettingsRepositoryTrait for SyncSettingsRepository {
    /// Current settings; the documented defaults when the row was never
    /// written (reading does not create the row).
    async fn get_settings(&self) -> Result<SyncSettings> {
        let mut conn = get_connection(&self.pool)?;
        let row = sync_settings::table
            .find(SETTINGS_ROW_ID)
            .first::<SyncSettingsDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(SyncSettings::from).unwrap_or_default())
    }

    async fn update_settings(&self, update: SyncSettingsUpdate) -> Result<SyncSettings> {
        update.validate()?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<SyncSettings> {
                let row = SyncSettingsDB {
                    id: SETTINGS_ROW_ID,
                    yandex_enabled: update.yandex_enabled,
                    yandex_hour: update.yandex_hour,
                    moysklad_enabled: update.moysklad_enabled,
                    moysklad_hour: update.moysklad_hour,
                    updated_at: Utc::now().to_rfc3339(),
                };
                let stored = diesel::insert_into(sync_settings::table)
                    .values(&row)
                    .on_conflict(sync_settings::id)
                    .do_update()
                    .set(&row)
                    .returning(SyncSettingsDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(SyncSettings::from(stored))
            })
            .await
    }
}
