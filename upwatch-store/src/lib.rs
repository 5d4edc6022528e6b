mod error;
mod models;

pub use error::{Result, StoreError};
pub use models::{
  EntityState, LeaderboardDoc, LeaderboardEntry, MentionRef, PopularDoc,
  TrackedServer, WatchTarget, Window,
};

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

const TARGETS_FILE: &str = "targets.json";
const TOP_LISTS_FILE: &str = "top-lists.json";
const POPULAR_FILE: &str = "popular.json";

/// JSON-document store for tracked-target state and the two tick caches.
///
/// Every document is rewritten wholesale: serialized to a sibling `.tmp`
/// file and renamed over the old one, so readers of the files (and a
/// restarting process) only ever see a complete document.
#[derive(Clone)]
pub struct Store {
  dir: PathBuf,
}

impl Store {
  /// Open a store rooted at `dir`, creating the directory if needed.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&dir).await?;
    info!(dir = %dir.display(), "store opened");
    Ok(Self { dir })
  }

  // ========================================================================
  // Watch targets
  // ========================================================================

  /// Load all watch targets, or an empty list if none were persisted yet.
  pub async fn load_targets(&self) -> Result<Vec<WatchTarget>> {
    self.load_or_default(TARGETS_FILE).await
  }

  /// Persist all watch targets as one document.
  pub async fn save_targets(&self, targets: &[WatchTarget]) -> Result<()> {
    self.save(TARGETS_FILE, &targets).await?;
    debug!(count = targets.len(), "saved watch targets");
    Ok(())
  }

  // ========================================================================
  // Leaderboards
  // ========================================================================

  /// Load the leaderboard document, or an empty one if missing.
  pub async fn load_leaderboards(&self) -> Result<LeaderboardDoc> {
    self.load_or_default(TOP_LISTS_FILE).await
  }

  /// Persist all five window lists atomically as one document.
  pub async fn save_leaderboards(&self, doc: &LeaderboardDoc) -> Result<()> {
    self.save(TOP_LISTS_FILE, doc).await?;
    debug!("saved leaderboard document");
    Ok(())
  }

  // ========================================================================
  // Popularity
  // ========================================================================

  /// Load the popularity mapping, or an empty one if missing.
  pub async fn load_popular(&self) -> Result<PopularDoc> {
    self.load_or_default(POPULAR_FILE).await
  }

  /// Persist the popularity mapping.
  pub async fn save_popular(&self, doc: &PopularDoc) -> Result<()> {
    self.save(POPULAR_FILE, doc).await?;
    debug!(count = doc.len(), "saved popularity document");
    Ok(())
  }

  // ========================================================================
  // Document io
  // ========================================================================

  async fn load_or_default<T>(&self, file: &str) -> Result<T>
  where
    T: DeserializeOwned + Default,
  {
    let path = self.dir.join(file);
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
        debug!(file, "document missing, using default");
        Ok(T::default())
      }
      Err(err) => Err(err.into()),
    }
  }

  async fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
    let path = self.dir.join(file);
    let tmp = self.dir.join(format!("{file}.tmp"));
    let bytes = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, &path).await?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  async fn temp_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Store::open(dir.path()).await.expect("open store");
    (dir, store)
  }

  #[tokio::test]
  async fn missing_documents_load_as_defaults() {
    let (_dir, store) = temp_store().await;

    assert!(store.load_targets().await.unwrap().is_empty());
    assert!(store.load_leaderboards().await.unwrap().servers.is_empty());
    assert!(store.load_popular().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn targets_round_trip() {
    let (_dir, store) = temp_store().await;

    let mut target = WatchTarget::new("guild-1");
    target.mentions.push(MentionRef::Role(42));
    target.servers.push(TrackedServer {
      name: "Foo".into(),
      state: EntityState {
        listed: Some(true),
        passworded: Some(false),
      },
    });

    store.save_targets(&[target.clone()]).await.unwrap();
    let loaded = store.load_targets().await.unwrap();
    assert_eq!(loaded, vec![target]);
  }

  #[tokio::test]
  async fn leaderboard_document_has_stable_key_order() {
    let (dir, store) = temp_store().await;

    let mut doc = LeaderboardDoc::default();
    for window in Window::ALL {
      doc.servers.insert(
        window,
        vec![LeaderboardEntry {
          name: "Foo".into(),
          player_count: 3,
          observed_at: 1_000,
        }],
      );
    }
    store.save_leaderboards(&doc).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("top-lists.json")).unwrap();
    let day = raw.find("\"day\"").unwrap();
    let week = raw.find("\"week\"").unwrap();
    let month = raw.find("\"month\"").unwrap();
    let year = raw.find("\"year\"").unwrap();
    let all = raw.find("\"all\"").unwrap();
    assert!(day < week && week < month && month < year && year < all);

    assert_eq!(store.load_leaderboards().await.unwrap(), doc);
  }

  #[tokio::test]
  async fn save_replaces_whole_document() {
    let (dir, store) = temp_store().await;

    let mut doc = PopularDoc::new();
    doc.insert("Foo".into(), 100);
    doc.insert("Bar".into(), 200);
    store.save_popular(&doc).await.unwrap();

    doc.remove("Foo");
    store.save_popular(&doc).await.unwrap();

    let loaded = store.load_popular().await.unwrap();
    assert_eq!(loaded, doc);
    // No leftover temp file after the rename.
    assert!(!dir.path().join("popular.json.tmp").exists());
  }
}
