//! Persisted scheduler settings and the provider trigger slots.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Default trigger hour for the Yandex slot.
pub const DEFAULT_YANDEX_HOUR: i32 = 6;
/// Default trigger hour for the MoySklad slot.
pub const DEFAULT_MOYSKLAD_HOUR: i32 = 7;

/// Scheduled trigger slots. Each slot fires `run_sync` at most once per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncProvider {
    Yandex,
    Moysklad,
}

impl SyncProvider {
    pub const ALL: [SyncProvider; 2] = [SyncProvider::Yandex, SyncProvider::Moysklad];

    pub fn as_str(&self) -> &'static str {
        match self {
            SyncProvider::Yandex => "yandex",
            SyncProvider::Moysklad => "moysklad",
        }
    }
}

/// Scheduler settings, persisted as a single row. Reads before any write see
/// these defaults (both slots disabled, hours 6 and 7).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettings {
    pub yandex_enabled: bool,
    pub yandex_hour: i32,
    pub moysklad_enabled: bool,
    pub moysklad_hour: i32,
    pub updated_at: Option<String>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            yandex_enabled: false,
            yandex_hour: DEFAULT_YANDEX_HOUR,
            moysklad_enabled: false,
            moysklad_hour: DEFAULT_MOYSKLAD_HOUR,
            updated_at: None,
        }
    }
}

impl SyncSettings {
    /// Whether the given provider slot is enabled.
    pub fn enabled(&self, provider: SyncProvider) -> bool {
        match provider {
            SyncProvider::Yandex => self.yandex_enabled,
            SyncProvider::Moysklad => self.moysklad_enabled,
        }
    }

    /// Configured trigger hour (0-23) for the given provider slot.
    pub fn hour(&self, provider: SyncProvider) -> i32 {
        match provider {
            SyncProvider::Yandex => self.yandex_hour,
            SyncProvider::Moysklad => self.moysklad_hour,
        }
    }
}

/// Settings-update payload accepted by the API and the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSettingsUpdate {
    pub yandex_enabled: bool,
    pub yandex_hour: i32,
    pub moysklad_enabled: bool,
    pub moysklad_hour: i32,
}

impl SyncSettingsUpdate {
    /// Reject trigger hours outside the 0-23 wall-clock range.
    pub fn validate(&self) -> Result<()> {
        for (name, hour) in [
            ("yandexHour", self.yandex_hour),
            ("moyskladHour", self.moysklad_hour),
        ] {
            if !(0..=23).contains(&hour) {
                return Err(Error::validation(format!(
                    "{} must be between 0 and 23, got {}",
                    name, hour
                )));
            }
        }
        Ok(())
    }
}

/// Persistence contract for the settings singleton row.
#[async_trait]
pub trait SyncSettingsRepositoryTrait: Send + Sync {
    /// Current settings, or the documented defaults when never written.
    async fn get_settings(&self) -> Result<SyncSettings>;
    /// Validate and persist new settings, returning the stored row.
    async fn update_settings(&self, update: SyncSettingsUpdate) -> Result<SyncSettings>;
}
