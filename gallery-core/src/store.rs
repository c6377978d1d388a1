//! Durable key/value persistence for gate outcomes
//!
//! The gate remembers two things per collection across restarts: whether access
//! was granted, and how many wrong answers have accumulated. Both live behind the
//! [`AccessStore`] capability trait so the gate is testable with an in-memory
//! fake and portable to any durable backend. Storage is trusted but not
//! tamper-proof by design; there is no encryption or integrity layer.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

const ACCESS_PREFIX: &str = "gallery_access_";
const ATTEMPTS_PREFIX: &str = "gallery_attempts_";
const GRANTED_AT_PREFIX: &str = "gallery_granted_at_";
const LAST_FAILURE_PREFIX: &str = "gallery_last_failure_";

const GRANTED_VALUE: &str = "granted";

/// Key/value storage capability surviving across process restarts
///
/// Writes are best-effort: a backend that cannot flush logs the failure and
/// keeps serving its in-memory view, since no gate outcome is ever fatal.
pub trait AccessStore: Send + Sync {
    /// Read a value, `None` when absent
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    fn set(&self, key: &str, value: &str);

    /// Delete a value if present
    fn remove(&self, key: &str);
}

/// In-memory store, the unit-test fake
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl AccessStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.inner.write().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.inner.write().remove(key);
    }
}

/// File-backed store persisting a flat JSON object write-through
///
/// A missing backing file starts empty. A corrupt one is abandoned with a
/// logged warning rather than refusing to start, since the worst outcome is
/// re-challenging the user.
#[derive(Clone)]
pub struct FileStore {
    inner: Arc<RwLock<FileInner>>,
}

struct FileInner {
    entries: HashMap<String, String>,
    path: PathBuf,
}

impl FileStore {
    /// Open or create the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<HashMap<String, Value>>(&contents) {
                Ok(map) => map
                    .into_iter()
                    .filter_map(|(k, v)| match v {
                        Value::String(s) => Some((k, s)),
                        other => Some((k, other.to_string())),
                    })
                    .collect(),
                Err(e) => {
                    warn!(path = %path.display(), "corrupt state file, starting empty: {}", e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), "unreadable state file, starting empty: {}", e);
                HashMap::new()
            }
        };

        Self {
            inner: Arc::new(RwLock::new(FileInner { entries, path })),
        }
    }

    fn flush(inner: &FileInner) {
        let serialized = match serde_json::to_string_pretty(&inner.entries) {
            Ok(s) => s,
            Err(e) => {
                error!("failed to serialize state: {}", e);
                return;
            }
        };

        if let Some(parent) = inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    error!(path = %inner.path.display(), "failed to create state dir: {}", e);
                    return;
                }
            }
        }

        if let Err(e) = std::fs::write(&inner.path, serialized) {
            error!(path = %inner.path.display(), "failed to write state file: {}", e);
        }
    }
}

impl AccessStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.read().entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut inner = self.inner.write();
        inner.entries.insert(key.to_string(), value.to_string());
        Self::flush(&inner);
    }

    fn remove(&self, key: &str) {
        let mut inner = self.inner.write();
        if inner.entries.remove(key).is_some() {
            Self::flush(&inner);
        }
    }
}

/// Key-derivation adapter mapping `(collection id, field)` to store entries
///
/// Absent keys read as not-granted / zero attempts; a non-numeric counter
/// reads as zero.
pub struct GateRecords {
    store: Box<dyn AccessStore>,
}

impl GateRecords {
    pub fn new(store: impl AccessStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    /// Check the persisted grant flag
    pub fn is_granted(&self, id: &str) -> bool {
        self.store
            .get(&format!("{}{}", ACCESS_PREFIX, id))
            .is_some_and(|v| v == GRANTED_VALUE)
    }

    /// Read the cumulative wrong-answer count
    pub fn failed_attempts(&self, id: &str) -> u32 {
        self.store
            .get(&format!("{}{}", ATTEMPTS_PREFIX, id))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Record one more wrong answer and return the new count
    pub fn record_failure(&self, id: &str) -> u32 {
        let count = self.failed_attempts(id).saturating_add(1);
        self.store
            .set(&format!("{}{}", ATTEMPTS_PREFIX, id), &count.to_string());
        self.store.set(
            &format!("{}{}", LAST_FAILURE_PREFIX, id),
            &Utc::now().to_rfc3339(),
        );
        debug!(collection = %id, attempts = count, "recorded failed attempt");
        count
    }

    /// Persist the grant and clear the attempt counter in one step
    ///
    /// The counter reset happens exactly here, upholding the invariant that
    /// `failed_attempts` returns to zero when `granted` becomes true.
    pub fn grant(&self, id: &str) {
        self.store
            .set(&format!("{}{}", ACCESS_PREFIX, id), GRANTED_VALUE);
        self.store.remove(&format!("{}{}", ATTEMPTS_PREFIX, id));
        self.store.remove(&format!("{}{}", LAST_FAILURE_PREFIX, id));
        self.store.set(
            &format!("{}{}", GRANTED_AT_PREFIX, id),
            &Utc::now().to_rfc3339(),
        );
    }

    /// External reset: clear every persisted field for the collection
    pub fn reset(&self, id: &str) {
        self.store.remove(&format!("{}{}", ACCESS_PREFIX, id));
        self.store.remove(&format!("{}{}", ATTEMPTS_PREFIX, id));
        self.store.remove(&format!("{}{}", GRANTED_AT_PREFIX, id));
        self.store.remove(&format!("{}{}", LAST_FAILURE_PREFIX, id));
    }

    /// When the grant was persisted, if recorded and parseable
    pub fn granted_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.parse_timestamp(&format!("{}{}", GRANTED_AT_PREFIX, id))
    }

    /// When the last wrong answer was recorded, if any
    pub fn last_failure_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.parse_timestamp(&format!("{}{}", LAST_FAILURE_PREFIX, id))
    }

    fn parse_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        self.store
            .get(key)?
            .parse::<DateTime<Utc>>()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("k").is_none());

        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));

        store.remove("k");
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_absent_fields_read_as_defaults() {
        let records = GateRecords::new(MemoryStore::new());
        assert!(!records.is_granted("family"));
        assert_eq!(records.failed_attempts("family"), 0);
        assert!(records.granted_at("family").is_none());
    }

    #[test]
    fn test_garbage_counter_reads_as_zero() {
        let store = MemoryStore::new();
        store.set("gallery_attempts_family", "not-a-number");
        let records = GateRecords::new(store);
        assert_eq!(records.failed_attempts("family"), 0);
    }

    #[test]
    fn test_failure_counter_accumulates() {
        let records = GateRecords::new(MemoryStore::new());
        assert_eq!(records.record_failure("family"), 1);
        assert_eq!(records.record_failure("family"), 2);
        assert_eq!(records.failed_attempts("family"), 2);
        assert!(records.last_failure_at("family").is_some());
    }

    #[test]
    fn test_grant_clears_counter() {
        let records = GateRecords::new(MemoryStore::new());
        records.record_failure("family");
        records.grant("family");

        assert!(records.is_granted("family"));
        assert_eq!(records.failed_attempts("family"), 0);
        assert!(records.granted_at("family").is_some());
        assert!(records.last_failure_at("family").is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let store = MemoryStore::new();
        let records = GateRecords::new(store.clone());
        records.record_failure("family");
        records.grant("family");
        records.reset("family");

        assert!(!records.is_granted("family"));
        assert_eq!(records.failed_attempts("family"), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_collections_are_partitioned() {
        let records = GateRecords::new(MemoryStore::new());
        records.record_failure("family");
        records.grant("travel");

        assert_eq!(records.failed_attempts("family"), 1);
        assert_eq!(records.failed_attempts("travel"), 0);
        assert!(!records.is_granted("family"));
        assert!(records.is_granted("travel"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        {
            let store = FileStore::open(&path);
            store.set("gallery_access_family", "granted");
            store.set("gallery_attempts_travel", "2");
        }

        let store = FileStore::open(&path);
        assert_eq!(
            store.get("gallery_access_family").as_deref(),
            Some("granted")
        );
        assert_eq!(store.get("gallery_attempts_travel").as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_tolerates_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{{{ not json").unwrap();

        let store = FileStore::open(&path);
        assert!(store.get("anything").is_none());

        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_file_store_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nope.json"));
        assert!(store.get("k").is_none());
    }
}
