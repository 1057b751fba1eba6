//! Behavior tests for the sync orchestrator and scheduler, using in-memory
//! collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal_macros::dec;
use tokio::sync::Mutex;

use crate::errors::{Error, Result};
use crate::stats::{
    CampaignDayStat, DateWindow, DisplayStat, SearchQueryStat, StatsSource, StatsStore, SyncDomain,
};
use crate::sync::{
    Clock, SyncOrchestrator, SyncProvider, SyncScheduler, SyncSettings,
    SyncSettingsRepositoryTrait, SyncSettingsUpdate,
};

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
}

fn campaign_row(campaign_id: i64, day: u32) -> CampaignDayStat {
    CampaignDayStat {
        campaign_id,
        campaign_name: format!("Campaign {}", campaign_id),
        date: date(day),
        impressions: 1000,
        clicks: 40,
        cost: dec!(123.45),
    }
}

fn query_row(query: &str, day: u32) -> SearchQueryStat {
    SearchQueryStat {
        query: query.to_string(),
        campaign_id: 1,
        date: date(day),
        impressions: 50,
        clicks: 5,
        cost: dec!(9.90),
    }
}

fn display_row(campaign_id: i64, day: u32) -> DisplayStat {
    DisplayStat {
        campaign_id,
        date: date(day),
        impressions: 20000,
        clicks: 12,
        cost: dec!(44.00),
        avg_cpm: Some(dec!(2.20)),
    }
}

/// Remote source stub: fixed datasets, an optional failure injected per
/// domain, and an optional gate that blocks the first fetch until released.
#[derive(Default)]
struct MockSource {
    campaign_rows: Vec<CampaignDayStat>,
    query_rows: Vec<SearchQueryStat>,
    display_rows: Vec<DisplayStat>,
    fail_domain: Option<SyncDomain>,
    gate: Option<Arc<Mutex<()>>>,
    fetch_calls: AtomicUsize,
}

impl MockSource {
    fn with_dataset() -> Self {
        Self {
            campaign_rows: vec![campaign_row(1, 1), campaign_row(2, 1)],
            query_rows: vec![query_row("buy widgets", 1), query_row("widget price", 1)],
            display_rows: vec![display_row(1, 1)],
            ..Default::default()
        }
    }

    async fn checkpoint(&self, domain: SyncDomain) -> Result<()> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _held = gate.lock().await;
        }
        if self.fail_domain == Some(domain) {
            return Err(Error::RemoteTransient("simulated HTTP 503".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StatsSource for MockSource {
    async fn fetch_campaign_days(&self, _window: &DateWindow) -> Result<Vec<CampaignDayStat>> {
        self.checkpoint(SyncDomain::CampaignDaily).await?;
        Ok(self.campaign_rows.clone())
    }

    async fn fetch_search_queries(&self, _window: &DateWindow) -> Result<Vec<SearchQueryStat>> {
        self.checkpoint(SyncDomain::SearchQueries).await?;
        Ok(self.query_rows.clone())
    }

    async fn fetch_display_rows(&self, _window: &DateWindow) -> Result<Vec<DisplayStat>> {
        self.checkpoint(SyncDomain::DisplayData).await?;
        Ok(self.display_rows.clone())
    }
}

/// In-memory store keyed by the natural composite keys, mirroring the sqlite
/// upsert semantics.
#[derive(Default)]
struct MockStore {
    campaign: Mutex<HashMap<(i64, NaiveDate), CampaignDayStat>>,
    queries: Mutex<HashMap<(String, NaiveDate), SearchQueryStat>>,
    display: Mutex<HashMap<(i64, NaiveDate), DisplayStat>>,
}

impl MockStore {
    async fn campaign_count(&self) -> usize {
        self.campaign.lock().await.len()
    }

    async fn query_count(&self) -> usize {
        self.queries.lock().await.len()
    }

    async fn display_count(&self) -> usize {
        self.display.lock().await.len()
    }
}

#[async_trait]
impl StatsStore for MockStore {
    async fn upsert_campaign_days(&self, rows: Vec<CampaignDayStat>) -> Result<usize> {
        let written = rows.len();
        let mut map = self.campaign.lock().await;
        for row in rows {
            map.insert((row.campaign_id, row.date), row);
        }
        Ok(written)
    }

    async fn upsert_search_queries(&self, rows: Vec<SearchQueryStat>) -> Result<usize> {
        let written = rows.len();
        let mut map = self.queries.lock().await;
        for row in rows {
            map.insert((row.query.clone(), row.date), row);
        }
        Ok(written)
    }

    async fn upsert_display_rows(&self, rows: Vec<DisplayStat>) -> Result<usize> {
        let written = rows.len();
        let mut map = self.display.lock().await;
        for row in rows {
            map.insert((row.campaign_id, row.date), row);
        }
        Ok(written)
    }
}

fn orchestrator_with(source: MockSource) -> (Arc<SyncOrchestrator>, Arc<MockStore>) {
    let store = Arc::new(MockStore::default());
    let orchestrator = Arc::new(SyncOrchestrator::new(
        Arc::new(source),
        Arc::clone(&store) as Arc<dyn StatsStore>,
        7,
    ));
    (orchestrator, store)
}

async fn wait_until_in_progress(orchestrator: &SyncOrchestrator) {
    for _ in 0..200 {
        if orchestrator.sync_status().sync_in_progress {
            return;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("sync run never reached in-progress state");
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_run_reports_counts_and_updates_status() {
    let before = Utc::now();
    let (orchestrator, store) = orchestrator_with(MockSource::with_dataset());

    let result = orchestrator.run_sync().await.unwrap();
    assert!(result.success);
    assert_eq!(result.total_records, 5);
    assert_eq!(result.domain_counts.get("campaign_daily"), Some(&2));
    assert_eq!(result.domain_counts.get("search_queries"), Some(&2));
    assert_eq!(result.domain_counts.get("display_data"), Some(&1));
    assert!(result.error.is_none());

    let status = orchestrator.sync_status();
    assert!(!status.sync_in_progress);
    assert!(status.last_success);
    assert!(status.last_error.is_none());
    assert!(status.last_run_at.unwrap() >= before);
    assert_eq!(status.last_record_counts.get("display_data"), Some(&1));

    assert_eq!(store.campaign_count().await, 2);
    assert_eq!(store.query_count().await, 2);
    assert_eq!(store.display_count().await, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn repeated_run_with_unchanged_dataset_does_not_duplicate() {
    let (orchestrator, store) = orchestrator_with(MockSource::with_dataset());

    let first = orchestrator.run_sync().await.unwrap();
    let count_after_first = (
        store.campaign_count().await,
        store.query_count().await,
        store.display_count().await,
    );

    let second = orchestrator.run_sync().await.unwrap();
    assert!(first.success && second.success);
    assert_eq!(first.total_records, second.total_records);
    assert_eq!(
        count_after_first,
        (
            store.campaign_count().await,
            store.query_count().await,
            store.display_count().await,
        )
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_runs_are_single_flight() {
    let gate = Arc::new(Mutex::new(()));
    let mut source = MockSource::with_dataset();
    source.gate = Some(Arc::clone(&gate));
    let (orchestrator, _store) = orchestrator_with(source);

    let held = gate.lock().await;
    let first = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.run_sync().await })
    };
    wait_until_in_progress(&orchestrator).await;

    // Second caller is rejected immediately, without queuing.
    let second = orchestrator.run_sync().await;
    assert!(matches!(second, Err(Error::SyncInProgress)));

    drop(held);
    let first = first.await.unwrap().unwrap();
    assert!(first.success);

    // Guard released; a new run may proceed.
    assert!(!orchestrator.sync_status().sync_in_progress);
    assert!(orchestrator.run_sync().await.unwrap().success);
}

#[tokio::test(flavor = "multi_thread")]
async fn cancelled_run_releases_the_single_flight_guard() {
    let gate = Arc::new(Mutex::new(()));
    let mut source = MockSource::with_dataset();
    source.gate = Some(Arc::clone(&gate));
    let (orchestrator, _store) = orchestrator_with(source);

    let held = gate.lock().await;
    let run = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.run_sync().await })
    };
    wait_until_in_progress(&orchestrator).await;

    // The caller goes away mid-run (e.g. the HTTP client disconnected and
    // axum dropped the handler future at an await point).
    run.abort();
    let joined = run.await;
    assert!(joined.is_err());
    drop(held);

    // The flag must not leak: later triggers still work.
    assert!(!orchestrator.sync_status().sync_in_progress);
    assert!(orchestrator.run_sync().await.unwrap().success);
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_domain_aborts_rest_and_keeps_prior_domains() {
    let mut source = MockSource::with_dataset();
    source.fail_domain = Some(SyncDomain::SearchQueries);
    let (orchestrator, store) = orchestrator_with(source);

    let result = orchestrator.run_sync().await.unwrap();
    assert!(!result.success);
    assert_eq!(result.error_kind.as_deref(), Some("remote_transient"));
    assert!(result.error.as_deref().unwrap().contains("503"));

    // Only the first domain committed and is counted.
    assert_eq!(result.total_records, 2);
    assert_eq!(result.domain_counts.len(), 1);
    assert_eq!(result.domain_counts.get("campaign_daily"), Some(&2));
    assert_eq!(store.campaign_count().await, 2);
    assert_eq!(store.query_count().await, 0);
    assert_eq!(store.display_count().await, 0);

    let status = orchestrator.sync_status();
    assert!(!status.sync_in_progress);
    assert!(!status.last_success);
    assert!(status.last_error.is_some());
    assert!(status.last_run_at.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn status_snapshot_is_a_copy() {
    let (orchestrator, _store) = orchestrator_with(MockSource::with_dataset());
    orchestrator.run_sync().await.unwrap();

    let mut snapshot = orchestrator.sync_status();
    snapshot.sync_in_progress = true;
    snapshot.last_record_counts.clear();

    let fresh = orchestrator.sync_status();
    assert!(!fresh.sync_in_progress);
    assert_eq!(fresh.last_record_counts.len(), 3);
}

// ── Scheduler ────────────────────────────────────────────────────────────────

struct MockSettingsRepository {
    settings: Mutex<SyncSettings>,
}

impl MockSettingsRepository {
    fn new(settings: SyncSettings) -> Self {
        Self {
            settings: Mutex::new(settings),
        }
    }
}

#[async_trait]
impl SyncSettingsRepositoryTrait for MockSettingsRepository {
    async fn get_settings(&self) -> Result<SyncSettings> {
        Ok(self.settings.lock().await.clone())
    }

    async fn update_settings(&self, update: SyncSettingsUpdate) -> Result<SyncSettings> {
        update.validate()?;
        let mut settings = self.settings.lock().await;
        settings.yandex_enabled = update.yandex_enabled;
        settings.yandex_hour = update.yandex_hour;
        settings.moysklad_enabled = update.moysklad_enabled;
        settings.moysklad_hour = update.moysklad_hour;
        Ok(settings.clone())
    }
}

struct ManualClock {
    now: std::sync::Mutex<NaiveDateTime>,
}

impl ManualClock {
    fn at(datetime: &str) -> Arc<Self> {
        Arc::new(Self {
            now: std::sync::Mutex::new(
                NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M").unwrap(),
            ),
        })
    }

    fn set(&self, datetime: &str) {
        *self.now.lock().unwrap() =
            NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M").unwrap();
    }
}

impl Clock for ManualClock {
    fn now_local(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}

fn scheduler_with_clock(
    clock: Arc<ManualClock>,
    settings: SyncSettings,
) -> (SyncScheduler, Arc<SyncOrchestrator>) {
    let (orchestrator, _store) = orchestrator_with(MockSource::with_dataset());
    let scheduler = SyncScheduler::with_clock(
        Arc::clone(&orchestrator),
        Arc::new(MockSettingsRepository::new(settings)),
        clock,
    );
    (scheduler, orchestrator)
}

fn yandex_at_six() -> SyncSettings {
    SyncSettings {
        yandex_enabled: true,
        yandex_hour: 6,
        moysklad_enabled: false,
        moysklad_hour: 7,
        updated_at: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduler_fires_once_per_day_per_provider() {
    let clock = ManualClock::at("2026-03-01 05:59");
    let (scheduler, orchestrator) = scheduler_with_clock(Arc::clone(&clock), yandex_at_six());

    assert!(scheduler.tick().await.is_empty());

    clock.set("2026-03-01 06:00");
    let due = scheduler.tick().await;
    assert_eq!(due, vec![SyncProvider::Yandex]);
    scheduler.fire(SyncProvider::Yandex).await;
    assert!(orchestrator.sync_status().last_success);

    // Re-crossing the same hour on the same day never re-fires.
    clock.set("2026-03-01 06:30");
    assert!(scheduler.tick().await.is_empty());
    clock.set("2026-03-01 06:59");
    assert!(scheduler.tick().await.is_empty());

    // Other hours do not fire; the disabled provider slot never fires.
    clock.set("2026-03-01 07:00");
    assert!(scheduler.tick().await.is_empty());

    // A new day re-arms the trigger.
    clock.set("2026-03-02 06:00");
    assert_eq!(scheduler.tick().await, vec![SyncProvider::Yandex]);
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduler_reads_settings_fresh_each_tick() {
    let clock = ManualClock::at("2026-03-01 09:00");
    let settings_repo = Arc::new(MockSettingsRepository::new(SyncSettings::default()));
    let (orchestrator, _store) = orchestrator_with(MockSource::with_dataset());
    let scheduler = SyncScheduler::with_clock(
        orchestrator,
        Arc::clone(&settings_repo) as Arc<dyn SyncSettingsRepositoryTrait>,
        clock,
    );

    // Disabled by default: nothing fires.
    assert!(scheduler.tick().await.is_empty());

    settings_repo
        .update_settings(SyncSettingsUpdate {
            yandex_enabled: true,
            yandex_hour: 9,
            moysklad_enabled: true,
            moysklad_hour: 9,
        })
        .await
        .unwrap();

    let due = scheduler.tick().await;
    assert_eq!(due, vec![SyncProvider::Yandex, SyncProvider::Moysklad]);
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduled_fire_treats_in_progress_collision_as_done() {
    let gate = Arc::new(Mutex::new(()));
    let mut source = MockSource::with_dataset();
    source.gate = Some(Arc::clone(&gate));
    let store = Arc::new(MockStore::default());
    let orchestrator = Arc::new(SyncOrchestrator::new(
        Arc::new(source),
        Arc::clone(&store) as Arc<dyn StatsStore>,
        7,
    ));
    let clock = ManualClock::at("2026-03-01 06:00");
    let scheduler = SyncScheduler::with_clock(
        Arc::clone(&orchestrator),
        Arc::new(MockSettingsRepository::new(yandex_at_six())),
        clock,
    );

    // A manual run holds the single-flight guard.
    let held = gate.lock().await;
    let manual = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.run_sync().await })
    };
    wait_until_in_progress(&orchestrator).await;

    // The scheduled trigger collides and returns without retrying; its day
    // marker is already set by tick().
    assert_eq!(scheduler.tick().await, vec![SyncProvider::Yandex]);
    scheduler.fire(SyncProvider::Yandex).await;
    assert!(scheduler.tick().await.is_empty());

    drop(held);
    assert!(manual.await.unwrap().unwrap().success);
}
