use crate::config::Config;
use crate::error::BotError;
use crate::services::usage_store::UsageStore;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Scope shared by every command listed in `RATE_LIMITED_COMMANDS`.
pub const DAILY_SCOPE: &str = "daily";
pub const LUCK_SCOPE: &str = "luck";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Denied { remaining_millis: u64 },
}

#[derive(Debug, Clone)]
pub struct CooldownRule {
    pub scope: String,
    pub cooldown: Duration,
}

pub struct RateLimiter {
    store: Arc<UsageStore>,
    rules: HashMap<String, CooldownRule>,
}

impl RateLimiter {
    pub fn new(store: Arc<UsageStore>) -> Self {
        Self {
            store,
            rules: HashMap::new(),
        }
    }

    pub fn from_config(store: Arc<UsageStore>, config: &Config) -> Self {
        let mut limiter = Self::new(store);
        for command in &config.rate_limited_commands {
            limiter = limiter.with_rule(command, DAILY_SCOPE, config.daily_cooldown);
        }
        // Luck keeps its own scope even if it is also listed above
        limiter.with_rule(LUCK_SCOPE, LUCK_SCOPE, config.luck_cooldown)
    }

    pub fn with_rule(mut self, command: &str, scope: &str, cooldown: Duration) -> Self {
        self.rules.insert(
            command.to_lowercase(),
            CooldownRule {
                scope: scope.to_string(),
                cooldown,
            },
        );
        self
    }

    pub fn rule(&self, command: &str) -> Option<&CooldownRule> {
        self.rules.get(&command.to_lowercase())
    }

    /// Bucket key for a scope inside one guild. DMs share one bucket.
    pub fn scope_key(scope: &str, guild_id: Option<u64>) -> String {
        match guild_id {
            Some(id) => format!("{}.{}", scope, id),
            None => format!("{}.dm", scope),
        }
    }

    /// Gate a command invocation. Commands without a rule always pass and
    /// never touch the store.
    pub async fn check_command(
        &self,
        command: &str,
        user_id: u64,
        guild_id: Option<u64>,
    ) -> Result<(), BotError> {
        let Some(rule) = self.rule(command) else {
            return Ok(());
        };
        let key = Self::scope_key(&rule.scope, guild_id);
        let cooldown_millis = rule.cooldown.as_millis() as u64;
        match self
            .check_and_record(&key, &user_id.to_string(), cooldown_millis)
            .await
        {
            RateDecision::Allowed => Ok(()),
            RateDecision::Denied { remaining_millis } => {
                debug!(
                    "Rate limited {} for user {} in '{}' ({}ms left)",
                    command, user_id, key, remaining_millis
                );
                Err(BotError::RateLimited { remaining_millis })
            }
        }
    }

    pub async fn check_and_record(
        &self,
        scope: &str,
        user_id: &str,
        cooldown_millis: u64,
    ) -> RateDecision {
        self.check_and_record_at(scope, user_id, cooldown_millis, Utc::now().timestamp_millis())
            .await
    }

    /// Same as [`check_and_record`](Self::check_and_record) against an
    /// explicit clock reading.
    pub async fn check_and_record_at(
        &self,
        scope: &str,
        user_id: &str,
        cooldown_millis: u64,
        now_millis: i64,
    ) -> RateDecision {
        let mut guard = self.store.lock_scope(scope).await;

        if let Some(record) = guard.get(user_id) {
            // A clock that stepped backwards counts as zero elapsed.
            let elapsed = now_millis.saturating_sub(record.last_time).max(0) as u64;
            if elapsed < cooldown_millis {
                return RateDecision::Denied {
                    remaining_millis: cooldown_millis - elapsed,
                };
            }
        }

        guard.set(user_id, now_millis);
        if let Err(e) = guard.persist().await {
            warn!("Rate limiter: failed to persist scope '{}': {}", scope, e);
        }
        RateDecision::Allowed
    }
}
