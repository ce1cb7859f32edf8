//! Persisted key-value store: the repository behind the progression engine.
//!
//! This module owns:
//!   - the `StorageBackend` trait (named string records, get/set/remove)
//!   - an in-memory backend and a JSON-file backend
//!   - the typed `Store` wrapper exposing the logical records (stats,
//!     histories, per-day flags) and the startup schema check
//!
//! The store has no transactional guarantees. Aggregate counters that other
//! writers may touch (boxes opened) are recomputed from the full history log
//! on every read instead of trusted as cached integers.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::domain::{BoxOpenEntry, PracticeMeta, UserRating, UserStats};

/// Bumped whenever a stored record changes shape. An older stored version
/// triggers a hard reset of `RESET_KEYS`; no field-by-field migration.
pub const SCHEMA_VERSION: u32 = 2;

const SCHEMA_VERSION_KEY: &str = "app_storage_version";

const RESET_KEYS: [&str; 6] = [
  "user_stats",
  "box_history",
  "rating_history",
  "practice_meta",
  "practice_lock_date",
  "last_play_date",
];

pub trait StorageBackend: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&mut self, key: &str, value: String);
  fn remove(&mut self, key: &str);
  fn len(&self) -> usize;
}

#[derive(Default)]
pub struct MemoryBackend {
  map: HashMap<String, String>,
}

impl StorageBackend for MemoryBackend {
  fn get(&self, key: &str) -> Option<String> {
    self.map.get(key).cloned()
  }

  fn set(&mut self, key: &str, value: String) {
    self.map.insert(key.to_string(), value);
  }

  fn remove(&mut self, key: &str) {
    self.map.remove(key);
  }

  fn len(&self) -> usize {
    self.map.len()
  }
}

/// Single-file JSON backend (the localStorage analogue for a headless
/// deployment). The whole record map is rewritten on every mutation; records
/// are tiny and writes are rare, so this stays simple on purpose.
pub struct FileBackend {
  path: PathBuf,
  map: HashMap<String, String>,
}

impl FileBackend {
  pub fn open(path: PathBuf) -> Self {
    let map = match std::fs::read_to_string(&path) {
      Ok(s) => match serde_json::from_str::<HashMap<String, String>>(&s) {
        Ok(map) => map,
        Err(e) => {
          warn!(target: "wonderbox_backend", path = %path.display(), error = %e, "State file unreadable as JSON; starting empty");
          HashMap::new()
        }
      },
      Err(_) => HashMap::new(),
    };
    Self { path, map }
  }

  fn persist(&self) {
    match serde_json::to_string_pretty(&self.map) {
      Ok(s) => {
        if let Err(e) = std::fs::write(&self.path, s) {
          error!(target: "wonderbox_backend", path = %self.path.display(), error = %e, "Failed to persist state file");
        }
      }
      Err(e) => {
        error!(target: "wonderbox_backend", error = %e, "Failed to serialize state map");
      }
    }
  }
}

impl StorageBackend for FileBackend {
  fn get(&self, key: &str) -> Option<String> {
    self.map.get(key).cloned()
  }

  fn set(&mut self, key: &str, value: String) {
    self.map.insert(key.to_string(), value);
    self.persist();
  }

  fn remove(&mut self, key: &str) {
    if self.map.remove(key).is_some() {
      self.persist();
    }
  }

  fn len(&self) -> usize {
    self.map.len()
  }
}

/// Typed access to the logical records. Injected everywhere so tests can run
/// against `MemoryBackend` deterministically.
pub struct Store {
  backend: RwLock<Box<dyn StorageBackend>>,
}

impl Store {
  pub fn new(backend: Box<dyn StorageBackend>) -> Self {
    Self { backend: RwLock::new(backend) }
  }

  /// Pick the backend from WONDERBOX_STATE_PATH (file) or fall back to
  /// memory-only state.
  pub fn from_env() -> Self {
    match std::env::var("WONDERBOX_STATE_PATH") {
      Ok(path) => {
        let backend = FileBackend::open(PathBuf::from(&path));
        info!(target: "wonderbox_backend", %path, records = backend.len(), "File-backed state store");
        Self::new(Box::new(backend))
      }
      Err(_) => {
        info!(target: "wonderbox_backend", "WONDERBOX_STATE_PATH not set; state is memory-only");
        Self::new(Box::new(MemoryBackend::default()))
      }
    }
  }

  // ---- raw record access ----

  pub async fn get_raw(&self, key: &str) -> Option<String> {
    self.backend.read().await.get(key)
  }

  pub async fn set_raw(&self, key: &str, value: String) {
    self.backend.write().await.set(key, value);
  }

  pub async fn remove(&self, key: &str) {
    self.backend.write().await.remove(key);
  }

  /// Read a JSON record; a missing or malformed value reads as None.
  /// Parse failures are a local-recovery case, logged and never surfaced.
  pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
    let raw = self.get_raw(key).await?;
    match serde_json::from_str::<T>(&raw) {
      Ok(v) => Some(v),
      Err(e) => {
        debug!(target: "wonderbox_backend", %key, error = %e, "Malformed stored record treated as absent");
        None
      }
    }
  }

  pub async fn put_json<T: Serialize>(&self, key: &str, value: &T) {
    match serde_json::to_string(value) {
      Ok(s) => self.set_raw(key, s).await,
      Err(e) => error!(target: "wonderbox_backend", %key, error = %e, "Failed to serialize record"),
    }
  }

  pub async fn get_flag(&self, key: &str) -> bool {
    self.get_raw(key).await.is_some()
  }

  pub async fn set_flag(&self, key: &str) {
    self.set_raw(key, "true".into()).await;
  }

  // ---- schema ----

  /// Startup schema check: stored version older than the code's version
  /// deletes the fixed reset-key list and rewrites the marker.
  /// Returns true when a reset occurred.
  pub async fn check_and_upgrade_schema(&self) -> bool {
    let existing: u32 = self
      .get_raw(SCHEMA_VERSION_KEY)
      .await
      .and_then(|s| s.parse().ok())
      .unwrap_or(0);

    if existing < SCHEMA_VERSION {
      if existing > 0 {
        warn!(target: "wonderbox_backend", from = existing, to = SCHEMA_VERSION, "Storage schema bump: resetting persisted records");
      }
      for key in RESET_KEYS {
        self.remove(key).await;
      }
      self.set_raw(SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_string()).await;
      return existing > 0;
    }
    false
  }

  // ---- logical records ----

  pub async fn user_stats(&self) -> UserStats {
    self.get_json("user_stats").await.unwrap_or_default()
  }

  pub async fn save_user_stats(&self, stats: &UserStats) {
    self.put_json("user_stats", stats).await;
  }

  pub async fn box_history(&self) -> Vec<BoxOpenEntry> {
    self.get_json("box_history").await.unwrap_or_default()
  }

  /// Append an opened-box record and return the new history length, which is
  /// the authoritative boxes-opened count.
  pub async fn append_box_open(&self, entry: BoxOpenEntry) -> usize {
    let mut history = self.box_history().await;
    history.push(entry);
    self.put_json("box_history", &history).await;
    history.len()
  }

  pub async fn rating_history(&self) -> Vec<UserRating> {
    self.get_json("rating_history").await.unwrap_or_default()
  }

  pub async fn append_rating(&self, rating: UserRating) {
    let mut history = self.rating_history().await;
    history.push(rating);
    self.put_json("rating_history", &history).await;
  }

  /// Practice count for the given day; a stored record from another date
  /// reads as zero.
  pub async fn practice_count(&self, today_key: &str) -> u32 {
    match self.get_json::<PracticeMeta>("practice_meta").await {
      Some(meta) if meta.date == today_key => meta.count,
      _ => 0,
    }
  }

  pub async fn set_practice_count(&self, today_key: &str, count: u32) {
    let meta = PracticeMeta { date: today_key.to_string(), count };
    self.put_json("practice_meta", &meta).await;
  }

  pub async fn practice_locked(&self, today_key: &str) -> bool {
    match self.get_raw("practice_lock_date").await {
      Some(date) if date == today_key => true,
      Some(_) => {
        // Stale lock from a previous day; clear it like the original did.
        self.remove("practice_lock_date").await;
        false
      }
      None => false,
    }
  }

  pub async fn lock_practice(&self, today_key: &str) {
    self.set_raw("practice_lock_date", today_key.to_string()).await;
  }

  pub async fn last_play_date(&self) -> Option<String> {
    self.get_raw("last_play_date").await
  }

  pub async fn set_last_play_date(&self, date_key: &str) {
    self.set_raw("last_play_date", date_key.to_string()).await;
  }

  pub async fn completed_on(&self, date_key: &str) -> bool {
    self.get_flag(&format!("completed_{}", date_key)).await
  }

  pub async fn mark_completed(&self, date_key: &str) {
    self.set_flag(&format!("completed_{}", date_key)).await;
  }

  pub async fn box_opened_on(&self, date_key: &str) -> bool {
    self.get_flag(&format!("box_opened_{}", date_key)).await
  }

  pub async fn mark_box_opened(&self, date_key: &str) {
    self.set_flag(&format!("box_opened_{}", date_key)).await;
  }

  pub async fn fact_rated_on(&self, date_key: &str) -> bool {
    self.get_flag(&format!("fact_rated_{}", date_key)).await
  }

  pub async fn mark_fact_rated(&self, date_key: &str) {
    self.set_flag(&format!("fact_rated_{}", date_key)).await;
  }

  /// Puzzle ids already served in practice today (anti-repeat set).
  pub async fn practice_used(&self, date_key: &str) -> Vec<String> {
    self.get_json(&format!("practice_used_{}", date_key)).await.unwrap_or_default()
  }

  pub async fn add_practice_used(&self, date_key: &str, puzzle_id: &str) {
    let key = format!("practice_used_{}", date_key);
    let mut used: Vec<String> = self.get_json(&key).await.unwrap_or_default();
    if !used.iter().any(|id| id == puzzle_id) {
      used.push(puzzle_id.to_string());
      self.put_json(&key, &used).await;
    }
  }

  /// The fact revealed today, pinned at box-open time so a same-day rating
  /// cannot change what the user already saw.
  pub async fn fact_of_day(&self, date_key: &str) -> Option<String> {
    self.get_raw(&format!("fact_of_{}", date_key)).await
  }

  pub async fn pin_fact_of_day(&self, date_key: &str, fact_id: &str) {
    self.set_raw(&format!("fact_of_{}", date_key), fact_id.to_string()).await;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn mem_store() -> Store {
    Store::new(Box::new(MemoryBackend::default()))
  }

  #[tokio::test]
  async fn schema_bump_resets_fixed_keys_only() {
    let store = mem_store();
    store.set_raw(SCHEMA_VERSION_KEY, "1".into()).await;
    store.save_user_stats(&UserStats { points: 500, ..UserStats::default() }).await;
    store.set_raw("completed_2025-06-09", "true".into()).await;

    assert!(store.check_and_upgrade_schema().await);
    assert_eq!(store.user_stats().await.points, 0);
    // Per-day flags are not on the reset list.
    assert!(store.completed_on("2025-06-09").await);
    assert_eq!(store.get_raw(SCHEMA_VERSION_KEY).await.as_deref(), Some("2"));
  }

  #[tokio::test]
  async fn first_run_writes_marker_without_reporting_reset() {
    let store = mem_store();
    assert!(!store.check_and_upgrade_schema().await);
    assert_eq!(store.get_raw(SCHEMA_VERSION_KEY).await.as_deref(), Some("2"));
  }

  #[tokio::test]
  async fn malformed_record_reads_as_default() {
    let store = mem_store();
    store.set_raw("user_stats", "{not json".into()).await;
    let stats = store.user_stats().await;
    assert_eq!(stats.level, 1);
    assert_eq!(stats.points, 0);
  }

  #[tokio::test]
  async fn practice_meta_resets_on_date_change() {
    let store = mem_store();
    store.set_practice_count("2025-06-09", 3).await;
    assert_eq!(store.practice_count("2025-06-09").await, 3);
    assert_eq!(store.practice_count("2025-06-10").await, 0);
  }

  #[tokio::test]
  async fn box_history_length_is_the_count() {
    let store = mem_store();
    for i in 0..3 {
      let len = store
        .append_box_open(BoxOpenEntry { date: "2025-06-09".into(), timestamp: i })
        .await;
      assert_eq!(len, (i + 1) as usize);
    }
    assert_eq!(store.box_history().await.len(), 3);
  }

  #[tokio::test]
  async fn stale_practice_lock_clears_itself() {
    let store = mem_store();
    store.lock_practice("2025-06-09").await;
    assert!(store.practice_locked("2025-06-09").await);
    assert!(!store.practice_locked("2025-06-10").await);
    assert!(store.get_raw("practice_lock_date").await.is_none());
  }

  #[tokio::test]
  async fn practice_used_set_dedupes() {
    let store = mem_store();
    store.add_practice_used("2025-06-09", "7").await;
    store.add_practice_used("2025-06-09", "7").await;
    store.add_practice_used("2025-06-09", "9").await;
    assert_eq!(store.practice_used("2025-06-09").await, vec!["7", "9"]);
  }
}
