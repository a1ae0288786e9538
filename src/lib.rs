pub mod checks;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod guides;
pub mod health;
pub mod media;
pub mod reply;
pub mod services;
pub mod triggers;

use media::source::MediaSource;
use media::{MediaPicker, PickOptions};
use services::rate_limiter::RateLimiter;
use services::usage_store::UsageStore;
use std::sync::Arc;
use std::time::Instant;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub http_client: reqwest::Client,
    pub limiter: RateLimiter,
    pub media: MediaPicker,
    pub commands: triggers::CommandRegistry,
    pub guides: guides::GuideBook,
    pub started_at: Instant,
}

impl Data {
    pub fn new(
        config: config::Config,
        http_client: reqwest::Client,
        usage: Arc<UsageStore>,
        media_source: Arc<dyn MediaSource>,
    ) -> Self {
        Self {
            limiter: RateLimiter::from_config(usage, &config),
            media: MediaPicker::new(media_source, config.media_history_capacity),
            commands: triggers::CommandRegistry::with_builtins(),
            guides: guides::GuideBook::new(config.guides.clone()),
            started_at: Instant::now(),
            http_client,
            config,
        }
    }

    /// Picker options using the configured history length.
    pub fn pick_options<S: AsRef<str>>(&self, extensions: &[S]) -> PickOptions {
        PickOptions::new(extensions, self.config.media_track_last)
    }
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[cfg(test)]
pub(crate) fn test_data(pools: &[(&str, &[&str])]) -> (Data, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let data = Data::new(
        config::test_config(),
        reqwest::Client::new(),
        Arc::new(UsageStore::new(dir.path())),
        Arc::new(media::tests::FakeSource::new(pools)),
    );
    (data, dir)
}
