use crate::guides::GuideEntry;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;
use std::fs;
use std::time::Duration;
use tracing::warn;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub owner_id: Option<u64>,
    pub dev_guild_id: Option<u64>,
    pub register_commands: bool,
    pub status_message: String,
    pub command_prefix: String,

    // Rate limiting
    pub usage_dir: String,
    pub rate_limited_commands: Vec<String>,
    pub daily_cooldown: Duration,
    pub luck_cooldown: Duration,

    // CDN media
    pub cdn_list_url: String,
    pub cdn_public_url: String,
    pub cdn_access_key: Option<String>,
    pub media_extensions: Vec<String>,
    pub media_track_last: usize,
    pub media_history_capacity: usize,
    pub max_attachment_bytes: u64,

    pub allowed_channel_ids: Vec<u64>,
    pub http_bind_addr: Option<String>,
    pub guides: Vec<GuideEntry>,
}

const DEFAULT_MEDIA_EXTENSIONS: &str = "png,jpg,jpeg,gif,webp,mp4,webm,mov";

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            owner_id: env::var("OWNER_ID").ok().and_then(|id| id.parse().ok()),
            dev_guild_id: env::var("DEV_GUILD_ID").ok().and_then(|id| id.parse().ok()),
            register_commands: env::var("REGISTER_COMMANDS")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Booba?".to_string()),
            command_prefix: env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string()),

            usage_dir: env::var("USAGE_DIR").unwrap_or_else(|_| "data/usage".to_string()),
            rate_limited_commands: parse_list(
                &env::var("RATE_LIMITED_COMMANDS").unwrap_or_else(|_| "booba".to_string()),
            )
            .into_iter()
            .map(|c| c.to_lowercase())
            .collect(),
            daily_cooldown: parse_duration_var("DAILY_COOLDOWN", "24h")?,
            luck_cooldown: parse_duration_var("LUCK_COOLDOWN", "24h")?,

            cdn_list_url: env::var("CDN_LIST_URL")
                .unwrap_or_else(|_| "https://storage.bunnycdn.com/lobbybot".to_string()),
            cdn_public_url: env::var("CDN_PUBLIC_URL")
                .unwrap_or_else(|_| "https://lobbybot.b-cdn.net".to_string()),
            cdn_access_key: env::var("CDN_ACCESS_KEY").ok().filter(|k| !k.is_empty()),
            media_extensions: parse_list(
                &env::var("MEDIA_EXTENSIONS")
                    .unwrap_or_else(|_| DEFAULT_MEDIA_EXTENSIONS.to_string()),
            ),
            media_track_last: env::var("MEDIA_TRACK_LAST")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            media_history_capacity: env::var("MEDIA_HISTORY_CAPACITY")
                .unwrap_or_else(|_| "1024".to_string())
                .parse()
                .unwrap_or(1024),
            max_attachment_bytes: env::var("MAX_ATTACHMENT_BYTES")
                .unwrap_or_else(|_| DISCORD_ATTACHMENT_LIMIT.to_string())
                .parse()
                .unwrap_or(DISCORD_ATTACHMENT_LIMIT),

            allowed_channel_ids: parse_list(
                &env::var("ALLOWED_CHANNEL_IDS").unwrap_or_default(),
            )
            .iter()
            .filter_map(|id| match id.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!("Ignoring invalid channel id in ALLOWED_CHANNEL_IDS: {}", id);
                    None
                }
            })
            .collect(),
            http_bind_addr: Some(
                env::var("HTTP_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            )
            .filter(|addr| !addr.trim().is_empty()),
            guides: Self::load_guides(
                &env::var("GUIDES_FILE").unwrap_or_else(|_| "guides.toml".to_string()),
            )?,
        })
    }

    /// Read the guide table. A missing file just means no guides.
    pub fn load_guides(path: &str) -> anyhow::Result<Vec<GuideEntry>> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Ok(Vec::new()),
        };

        #[derive(Deserialize)]
        struct GuidesWrapper {
            #[serde(default)]
            guides: Vec<GuideEntry>,
        }
        let wrapper: GuidesWrapper = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
        Ok(wrapper.guides)
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_duration_var(name: &str, default: &str) -> anyhow::Result<Duration> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    humantime::parse_duration(raw.trim())
        .map_err(|e| anyhow::anyhow!("{} must be a duration like '24h' or '90m': {}", name, e))
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("owner_id", &self.owner_id)
            .field("dev_guild_id", &self.dev_guild_id)
            .field("register_commands", &self.register_commands)
            .field("status_message", &self.status_message)
            .field("command_prefix", &self.command_prefix)
            .field("usage_dir", &self.usage_dir)
            .field("rate_limited_commands", &self.rate_limited_commands)
            .field("daily_cooldown", &self.daily_cooldown)
            .field("luck_cooldown", &self.luck_cooldown)
            .field("cdn_list_url", &self.cdn_list_url)
            .field("cdn_public_url", &self.cdn_public_url)
            .field(
                "cdn_access_key",
                &self.cdn_access_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("media_extensions", &self.media_extensions)
            .field("media_track_last", &self.media_track_last)
            .field("media_history_capacity", &self.media_history_capacity)
            .field("max_attachment_bytes", &self.max_attachment_bytes)
            .field("allowed_channel_ids", &self.allowed_channel_ids)
            .field("http_bind_addr", &self.http_bind_addr)
            .field("guides", &self.guides.len())
            .finish()
    }
}

/// Discord message limit is 2000 characters
pub const DISCORD_MESSAGE_LIMIT: usize = 2000;
/// Embed description limit is 4096 characters
pub const DISCORD_EMBED_LIMIT: usize = 4096;
/// Default upload ceiling for bots without boosted guilds
pub const DISCORD_ATTACHMENT_LIMIT: u64 = 10 * 1024 * 1024;

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        discord_token: "test".to_string(),
        owner_id: Some(1),
        dev_guild_id: None,
        register_commands: false,
        status_message: "test".to_string(),
        command_prefix: "!".to_string(),
        usage_dir: "data/usage".to_string(),
        rate_limited_commands: vec!["booba".to_string()],
        daily_cooldown: Duration::from_secs(86_400),
        luck_cooldown: Duration::from_secs(86_400),
        cdn_list_url: "https://storage.example".to_string(),
        cdn_public_url: "https://cdn.example".to_string(),
        cdn_access_key: None,
        media_extensions: parse_list(DEFAULT_MEDIA_EXTENSIONS),
        media_track_last: 3,
        media_history_capacity: 16,
        max_attachment_bytes: DISCORD_ATTACHMENT_LIMIT,
        allowed_channel_ids: Vec::new(),
        http_bind_addr: None,
        guides: Vec::new(),
    }
}
