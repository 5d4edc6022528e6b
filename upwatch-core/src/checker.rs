use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use upwatch_store::{EntityState, LeaderboardDoc, MentionRef, PopularDoc, Store, StoreError};

use crate::fetch::{FetchError, SnapshotFetcher};
use crate::notify::{MentionResolver, Notifier};
use crate::snapshot::Snapshot;
use crate::track::{TargetRegistry, TrackError};
use crate::{classify, helpers, leaderboard, notify, popular, schedule, stats};

#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, thiserror::Error)]
pub enum TrackOpError {
    #[error(transparent)]
    Track(#[from] TrackError),

    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}

/// Owns the poll/diff/notify pipeline: one fetch per tick, classification
/// per tracked server, notification per target, and both derived caches.
///
/// Cheap to clone; all clones share the same state. Published views
/// (`latest_snapshot`, `leaderboards`, `popular`) are replaced wholesale
/// behind a lock, so readers always see either the previous or the next
/// complete value.
#[derive(Clone)]
pub struct Checker {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Arc<dyn SnapshotFetcher>,
    notifier: Arc<dyn Notifier>,
    resolver: Arc<dyn MentionResolver>,
    store: Store,
    registry: TargetRegistry,
    current: RwLock<Arc<Snapshot>>,
    leaderboards: RwLock<Arc<LeaderboardDoc>>,
    popular: RwLock<Arc<PopularDoc>>,
    loop_task: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl Checker {
    /// Build a checker from the last persisted documents.
    pub async fn new(
        store: Store,
        fetcher: Arc<dyn SnapshotFetcher>,
        notifier: Arc<dyn Notifier>,
        resolver: Arc<dyn MentionResolver>,
    ) -> Result<Self, StoreError> {
        let targets = store.load_targets().await?;
        let leaderboards = store.load_leaderboards().await?;
        let popular = store.load_popular().await?;

        let registry = TargetRegistry::new();
        registry.replace_all(targets).await;

        Ok(Self {
            inner: Arc::new(Inner {
                fetcher,
                notifier,
                resolver,
                store,
                registry,
                current: RwLock::new(Arc::new(Vec::new())),
                leaderboards: RwLock::new(Arc::new(leaderboards)),
                popular: RwLock::new(Arc::new(popular)),
                loop_task: Mutex::new(None),
            }),
        })
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start the periodic tick loop. No-op if already running.
    pub fn start(&self, interval: Duration) {
        let mut guard = self.inner.loop_task.lock();
        if guard.is_some() {
            warn!("checker loop already running");
            return;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let checker = self.clone();
        let task = tokio::spawn(async move {
            schedule::repeat(
                move || {
                    let checker = checker.clone();
                    async move { checker.tick().await }
                },
                interval,
                token,
            )
            .await;
        });

        *guard = Some((cancel, task));
        info!(interval_secs = interval.as_secs(), "checker started");
    }

    /// Stop the tick loop, cancelling any in-flight fetch. A tick that was
    /// interrupted before persisting leaves the last persisted documents
    /// untouched; the next start resumes from them.
    pub async fn stop(&self) {
        let running = self.inner.loop_task.lock().take();
        if let Some((cancel, task)) = running {
            cancel.cancel();
            let _ = task.await;
            info!("checker stopped");
        }
    }

    /// Run a single tick outside the schedule.
    pub async fn tick_now(&self) -> Result<(), TickError> {
        self.tick().await
    }

    async fn tick(&self) -> Result<(), TickError> {
        let inner = &*self.inner;
        let snapshot = inner.fetcher.fetch_snapshot().await?;
        let now = helpers::now();

        let summary = stats::summarize(&snapshot);
        debug!(
            servers = summary.servers,
            players = summary.players,
            versions = summary.versions,
            passworded = summary.passworded,
            modded = summary.modded,
            "checked games list"
        );

        for mut target in inner.registry.snapshot_targets().await {
            notify::check_target(
                &mut target,
                &snapshot,
                inner.notifier.as_ref(),
                inner.resolver.as_ref(),
            )
            .await;
            inner.registry.apply_states(&target).await;
        }
        let targets = inner.registry.snapshot_targets().await;
        inner.store.save_targets(&targets).await?;

        let prev_boards = self.leaderboards();
        let next_boards = leaderboard::update(&prev_boards, &snapshot, now);
        inner.store.save_leaderboards(&next_boards).await?;
        *inner.leaderboards.write() = Arc::new(next_boards);

        let prev_popular = self.popular();
        let next_popular = popular::update(&prev_popular, &snapshot, now);
        inner.store.save_popular(&next_popular).await?;
        *inner.popular.write() = Arc::new(next_popular);

        *inner.current.write() = Arc::new(snapshot);
        Ok(())
    }

    // ========================================================================
    // Tracked-list operations
    // ========================================================================

    /// Add a server to check for, seeded from the latest snapshot when one
    /// has been observed, and persist the tracked list.
    pub async fn add_server(&self, target_id: &str, name: &str) -> Result<(), TrackOpError> {
        let snapshot = self.latest_snapshot();
        let seed = match classify::find_entry(name, &snapshot) {
            Some(entry) => EntityState {
                listed: Some(true),
                passworded: Some(entry.has_password),
            },
            // No tick has run yet: nothing observed either way.
            None if snapshot.is_empty() => EntityState::default(),
            None => EntityState {
                listed: Some(false),
                passworded: None,
            },
        };

        self.inner.registry.add_server(target_id, name, seed).await?;
        self.persist_targets().await?;
        info!(target_id, name, "added tracked server");
        Ok(())
    }

    /// Remove a server from being checked for and persist the tracked list.
    pub async fn remove_server(&self, target_id: &str, name: &str) -> Result<(), TrackOpError> {
        self.inner.registry.remove_server(target_id, name).await?;
        self.persist_targets().await?;
        info!(target_id, name, "removed tracked server");
        Ok(())
    }

    /// Configure the mentions for a target and persist the tracked list.
    pub async fn set_mentions(
        &self,
        target_id: &str,
        mentions: Vec<MentionRef>,
    ) -> Result<(), TrackOpError> {
        self.inner.registry.set_mentions(target_id, mentions).await;
        self.persist_targets().await?;
        Ok(())
    }

    async fn persist_targets(&self) -> Result<(), StoreError> {
        let targets = self.inner.registry.snapshot_targets().await;
        self.inner.store.save_targets(&targets).await
    }

    // ========================================================================
    // Published views
    // ========================================================================

    /// The snapshot observed by the most recent successful tick.
    pub fn latest_snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.current.read())
    }

    pub fn leaderboards(&self) -> Arc<LeaderboardDoc> {
        Arc::clone(&self.inner.leaderboards.read())
    }

    pub fn popular(&self) -> Arc<PopularDoc> {
        Arc::clone(&self.inner.popular.read())
    }
}
