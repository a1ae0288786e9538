use crate::error::BotError;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Deserialize)]
pub struct GuideEntry {
    pub game: String,
    pub title: Option<String>,
    pub url: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Guide links indexed by lowercased game name and alias.
pub struct GuideBook {
    entries: Vec<GuideEntry>,
    index: HashMap<String, usize>,
}

impl GuideBook {
    pub fn new(entries: Vec<GuideEntry>) -> Self {
        let mut index = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            index.insert(entry.game.trim().to_lowercase(), i);
            for alias in &entry.aliases {
                index.entry(alias.trim().to_lowercase()).or_insert(i);
            }
        }
        Self { entries, index }
    }

    pub fn find(&self, game: &str) -> Result<&GuideEntry, BotError> {
        self.index
            .get(&game.trim().to_lowercase())
            .map(|&i| &self.entries[i])
            .ok_or_else(|| BotError::not_found("game", game.trim()))
    }

    pub fn games(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.game.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
