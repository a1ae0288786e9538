//! Chat commands triggered by plain messages rather than slash interactions.

use crate::error::BotError;
use crate::reply::Reply;
use crate::Data;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub mod builtin;
pub mod dispatch;

/// Everything a chat command gets to know about the message that ran it.
pub struct Invocation<'a> {
    pub data: &'a Data,
    pub user_id: u64,
    pub user_name: String,
    pub guild_id: Option<u64>,
    pub args: Vec<String>,
    /// Gateway heartbeat latency of the receiving shard, zero if unknown.
    pub latency: Duration,
}

#[async_trait]
pub trait ChatCommand: Send + Sync {
    /// Lookup key. Lowercase, no punctuation.
    fn name(&self) -> &str;
    /// How users actually type it, e.g. `Booba?`.
    fn display_name(&self) -> &str {
        self.name()
    }
    fn description(&self) -> &str;
    /// Whether a message consisting only of the display name runs it.
    fn keyword_trigger(&self) -> bool {
        false
    }
    async fn execute(&self, invocation: &Invocation<'_>) -> Result<Reply, BotError>;
}

pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn ChatCommand>>,
    display_index: HashMap<String, String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            display_index: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    pub fn register(&mut self, command: Arc<dyn ChatCommand>) {
        let key = command.name().to_lowercase();
        self.display_index
            .insert(command.display_name().to_lowercase(), key.clone());
        self.commands.insert(key, command);
    }

    /// Case-insensitive lookup by key, then by display name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ChatCommand>, BotError> {
        let lower = name.trim().to_lowercase();
        self.commands
            .get(&lower)
            .or_else(|| {
                self.display_index
                    .get(&lower)
                    .and_then(|key| self.commands.get(key))
            })
            .cloned()
            .ok_or_else(|| BotError::not_found("command", name.trim()))
    }

    /// Case-insensitive lookup by display name only. Bare chat messages go
    /// through this so that typing `luck` does not fire `Luck?`.
    pub fn resolve_display(&self, text: &str) -> Option<Arc<dyn ChatCommand>> {
        self.display_index
            .get(&text.trim().to_lowercase())
            .and_then(|key| self.commands.get(key))
            .cloned()
    }

    /// Commands sorted by key, for help output.
    pub fn list(&self) -> Vec<Arc<dyn ChatCommand>> {
        let mut commands: Vec<_> = self.commands.values().cloned().collect();
        commands.sort_by(|a, b| a.name().cmp(b.name()));
        commands
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
