//! Flat-file store of when each user last ran a rate-limited command.
//!
//! Every scope key lives in its own `<scope>.json` file whose top-level keys
//! are user ids and whose values look like `{ "lastTime": <epoch millis> }`.
//! Files are read once at startup and rewritten whole after every change.

use crate::error::BotError;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    #[serde(rename = "lastTime")]
    pub last_time: i64,
}

type ScopeTable = HashMap<String, UsageRecord>;

pub struct UsageStore {
    dir: PathBuf,
    scopes: DashMap<String, Arc<Mutex<ScopeTable>>>,
}

impl UsageStore {
    /// An empty store that will write under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            scopes: DashMap::new(),
        }
    }

    /// Load every scope file under `dir`. Missing or unreadable files leave
    /// their scope empty.
    pub async fn load(dir: impl Into<PathBuf>) -> Self {
        let store = Self::new(dir);

        let mut entries = match tokio::fs::read_dir(&store.dir).await {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Usage store: no directory at {:?} yet ({})", store.dir, e);
                return store;
            }
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    warn!("Usage store: failed to list {:?}: {}", store.dir, e);
                    break;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(scope) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let table = read_scope_file(&path).await;
            debug!("Usage store: loaded {} records for scope '{}'", table.len(), scope);
            store
                .scopes
                .insert(scope_file_key(scope), Arc::new(Mutex::new(table)));
        }

        info!(
            "Usage store: loaded {} scopes from {:?}",
            store.scopes.len(),
            store.dir
        );
        store
    }

    /// Lock one scope for a read-modify-write. The lock is held until the
    /// returned guard is dropped, including across [`ScopeGuard::persist`].
    pub async fn lock_scope(&self, scope: &str) -> ScopeGuard {
        let key = scope_file_key(scope);
        let table = self.scopes.entry(key.clone()).or_default().clone();
        ScopeGuard {
            path: self.dir.join(format!("{}.json", key)),
            table: table.lock_owned().await,
        }
    }

    pub async fn get(&self, scope: &str, user_id: &str) -> Option<UsageRecord> {
        self.lock_scope(scope).await.get(user_id)
    }

    /// Number of users with a record under `scope`.
    pub async fn len(&self, scope: &str) -> usize {
        self.lock_scope(scope).await.table.len()
    }
}

pub struct ScopeGuard {
    path: PathBuf,
    table: OwnedMutexGuard<ScopeTable>,
}

impl ScopeGuard {
    pub fn get(&self, user_id: &str) -> Option<UsageRecord> {
        self.table.get(user_id).copied()
    }

    pub fn set(&mut self, user_id: &str, last_time: i64) {
        self.table
            .insert(user_id.to_string(), UsageRecord { last_time });
    }

    /// Rewrite this scope's file. Goes through a temp file and a rename so a
    /// crash mid-write never leaves half a document behind.
    pub async fn persist(&self) -> Result<(), BotError> {
        let sorted: BTreeMap<&String, &UsageRecord> = self.table.iter().collect();
        let json = serde_json::to_vec_pretty(&sorted)
            .map_err(|e| BotError::Persistence(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BotError::Persistence(format!("{:?}: {}", parent, e)))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| BotError::Persistence(format!("{:?}: {}", tmp, e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| BotError::Persistence(format!("{:?}: {}", self.path, e)))?;
        Ok(())
    }
}

async fn read_scope_file(path: &Path) -> ScopeTable {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Usage store: could not read {:?}, starting empty: {}", path, e);
            return ScopeTable::new();
        }
    };
    let entries: serde_json::Map<String, serde_json::Value> = match serde_json::from_slice(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Usage store: {:?} is not valid usage JSON, starting empty: {}", path, e);
            return ScopeTable::new();
        }
    };

    // Entries that are not usage records are skipped one at a time so the
    // rest of the scope keeps its cooldowns.
    entries
        .into_iter()
        .filter_map(|(user_id, value)| match serde_json::from_value::<UsageRecord>(value) {
            Ok(record) => Some((user_id, record)),
            Err(e) => {
                warn!("Usage store: skipping entry '{}' in {:?}: {}", user_id, path, e);
                None
            }
        })
        .collect()
}

/// Scope keys double as file names.
fn scope_file_key(scope: &str) -> String {
    scope
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = UsageStore::new(dir.path());

        {
            let mut guard = store.lock_scope("daily.42").await;
            guard.set("100", 1_000);
            guard.set("200", 2_000);
            guard.persist().await.unwrap();
        }

        let reloaded = UsageStore::load(dir.path()).await;
        assert_eq!(
            reloaded.get("daily.42", "100").await,
            Some(UsageRecord { last_time: 1_000 })
        );
        assert_eq!(reloaded.len("daily.42").await, 2);
        assert_eq!(reloaded.get("daily.43", "100").await, None);
    }

    #[tokio::test]
    async fn test_file_format() {
        let dir = tempfile::tempdir().unwrap();
        let store = UsageStore::new(dir.path());
        let mut guard = store.lock_scope("luck.7").await;
        guard.set("555", 1_700_000_000_000);
        guard.persist().await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("luck.7.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["555"]["lastTime"], 1_700_000_000_000i64);
        assert!(!dir.path().join("luck.7.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_unknown_keys_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("daily.1.json"),
            r#"{ "9": { "lastTime": 5, "streak": 3 } }"#,
        )
        .unwrap();

        let store = UsageStore::load(dir.path()).await;
        assert_eq!(store.get("daily.1", "9").await, Some(UsageRecord { last_time: 5 }));
    }

    #[tokio::test]
    async fn test_foreign_entries_do_not_drop_valid_records() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("daily.1.json"),
            r#"{ "1": { "lastTime": 5 }, "schemaVersion": 2, "2": { "last": 9 }, "3": { "lastTime": 7 } }"#,
        )
        .unwrap();

        let store = UsageStore::load(dir.path()).await;
        assert_eq!(store.get("daily.1", "1").await, Some(UsageRecord { last_time: 5 }));
        assert_eq!(store.get("daily.1", "3").await, Some(UsageRecord { last_time: 7 }));
        assert_eq!(store.get("daily.1", "2").await, None);
        assert_eq!(store.len("daily.1").await, 2);
    }

    #[tokio::test]
    async fn test_malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("daily.1.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("luck.1.json"), r#"{ "1": { "lastTime": 10 } }"#).unwrap();

        let store = UsageStore::load(dir.path()).await;
        assert_eq!(store.len("daily.1").await, 0);
        assert_eq!(store.len("luck.1").await, 1);
    }

    #[tokio::test]
    async fn test_missing_directory_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = UsageStore::load(dir.path().join("does-not-exist")).await;
        assert_eq!(store.len("daily.1").await, 0);

        // First write creates the directory
        let mut guard = store.lock_scope("daily.1").await;
        guard.set("1", 1);
        guard.persist().await.unwrap();
        assert!(dir.path().join("does-not-exist/daily.1.json").exists());
    }

    #[tokio::test]
    async fn test_records_are_overwritten_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let store = UsageStore::new(dir.path());
        for t in 0..5 {
            let mut guard = store.lock_scope("daily.1").await;
            guard.set("1", t);
        }
        assert_eq!(store.len("daily.1").await, 1);
        assert_eq!(store.get("daily.1", "1").await.unwrap().last_time, 4);
    }

    #[test]
    fn test_scope_file_key() {
        assert_eq!(scope_file_key("Daily.123"), "daily.123");
        assert_eq!(scope_file_key("../etc/passwd"), ".._etc_passwd");
        assert_eq!(scope_file_key("booba?"), "booba_");
    }
}
