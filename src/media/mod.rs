//! Random media selection that avoids serving the same file twice in a row.
//!
//! Each `(guild, path)` pair remembers the last few files it was given. A
//! pick skips those files unless nothing else is left, in which case the
//! whole pool is eligible again. Histories are kept in an LRU so a bot in
//! many guilds does not grow without bound; they are lost on restart.

pub mod attachment;
pub mod source;

use crate::error::BotError;
use lru::LruCache;
use rand::seq::IndexedRandom;
use source::MediaSource;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Debug, Clone)]
pub struct PickOptions {
    pub extensions: Vec<String>,
    pub track_last: usize,
}

impl PickOptions {
    pub fn new<S: AsRef<str>>(extensions: &[S], track_last: usize) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
                .collect(),
            track_last,
        }
    }

    fn accepts(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.extensions.iter().any(|ext| {
            lower.len() > ext.len()
                && lower.ends_with(ext.as_str())
                && lower[..lower.len() - ext.len()].ends_with('.')
        })
    }
}

type HistoryKey = (String, String);

pub struct MediaPicker {
    source: Arc<dyn MediaSource>,
    history: Mutex<LruCache<HistoryKey, VecDeque<String>>>,
}

impl MediaPicker {
    pub fn new(source: Arc<dyn MediaSource>, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            source,
            history: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Pick a random file under `path` for `guild_id` and return its URL.
    pub async fn pick_random(
        &self,
        path: &str,
        guild_id: &str,
        options: &PickOptions,
    ) -> Result<String, BotError> {
        let candidates: Vec<String> = self
            .source
            .list(path)
            .await?
            .into_iter()
            .filter(|name| options.accepts(name))
            .collect();

        if candidates.is_empty() {
            return Err(BotError::EmptyMediaPool {
                path: path.to_string(),
            });
        }

        let name = self.choose_and_record(path, guild_id, candidates, options.track_last)?;
        debug!("Media picker: serving {}/{} to guild {}", path, name, guild_id);
        Ok(self.source.resolve(path, &name))
    }

    fn choose_and_record(
        &self,
        path: &str,
        guild_id: &str,
        candidates: Vec<String>,
        track_last: usize,
    ) -> Result<String, BotError> {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        let key = (guild_id.to_string(), path.to_string());
        let recent = history.get_or_insert_mut(key, VecDeque::new);

        let fresh: Vec<&String> = candidates.iter().filter(|c| !recent.contains(*c)).collect();
        let pool: Vec<&String> = if fresh.is_empty() {
            candidates.iter().collect()
        } else {
            fresh
        };

        let Some(pick) = pool.choose(&mut rand::rng()).map(|s| s.to_string()) else {
            return Err(BotError::EmptyMediaPool {
                path: path.to_string(),
            });
        };

        recent.retain(|name| name != &pick);
        recent.push_back(pick.clone());
        while recent.len() > track_last {
            recent.pop_front();
        }
        Ok(pick)
    }

    /// Recently served names for a guild/path, oldest first.
    pub fn recent(&self, path: &str, guild_id: &str) -> Vec<String> {
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        history
            .get(&(guild_id.to_string(), path.to_string()))
            .map(|recent| recent.iter().cloned().collect())
            .unwrap_or_default()
    }
}
