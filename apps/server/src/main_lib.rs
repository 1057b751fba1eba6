//! Application state construction and process-level wiring.

use std::sync::Arc;

use tracing::warn;

use adboard_core::payments::PaymentRepositoryTrait;
use adboard_core::stats::StatsStore;
use adboard_core::sync::{SyncOrchestrator, SyncSettingsRepositoryTrait};
use adboard_direct_api::DirectStatsClient;
use adboard_storage_sqlite::payments::PaymentRepository;
use adboard_storage_sqlite::settings::SyncSettingsRepository;
use adboard_storage_sqlite::stats::StatsRepository;
use adboard_storage_sqlite::{create_pool, get_connection, run_migrations, spawn_writer};

use crate::auth::SessionStore;
use crate::config::Config;

const READ_POOL_SIZE: u32 = 8;

pub struct AppState {
    pub orchestrator: Arc<SyncOrchestrator>,
    pub settings_repository: Arc<dyn SyncSettingsRepositoryTrait>,
    pub payment_repository: Arc<dyn PaymentRepositoryTrait>,
    pub stats_repository: Arc<StatsRepository>,
    pub sessions: SessionStore,
    pub admin_password: Option<String>,
    /// Date-window length shared by sync runs and the default stats view.
    pub sync_window_days: u32,
}

/// Build the shared application state: database, repositories, remote client
/// and the orchestrator. Everything is constructed here once and injected;
/// teardown happens at process exit.
pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let pool = create_pool(&config.database_path, READ_POOL_SIZE)?;
    {
        let mut conn = get_connection(&pool)?;
        run_migrations(&mut conn)?;
    }
    let writer = spawn_writer(&config.database_path)?;

    let stats_repository = Arc::new(StatsRepository::new(Arc::clone(&pool), writer.clone()));
    let settings_repository = Arc::new(SyncSettingsRepository::new(
        Arc::clone(&pool),
        writer.clone(),
    ));
    let payment_repository = Arc::new(PaymentRepository::new(Arc::clone(&pool), writer));

    let source = Arc::new(DirectStatsClient::from_env());
    if !source.has_credentials() {
        warn!("DIRECT_OAUTH_TOKEN/DIRECT_CLIENT_LOGIN not set; sync runs will fail until configured");
    }
    if config.admin_password.is_none() {
        warn!("ADMIN_PASSWORD not set; session login is disabled");
    }

    let orchestrator = Arc::new(SyncOrchestrator::new(
        source,
        Arc::clone(&stats_repository) as Arc<dyn StatsStore>,
        config.sync_window_days,
    ));

    Ok(Arc::new(AppState {
        orchestrator,
        settings_repository,
        payment_repository,
        stats_repository,
        sessions: SessionStore::default(),
        admin_password: config.admin_password.clone(),
        sync_window_days: config.sync_window_days,
    }))
}

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
