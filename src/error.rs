use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors a command handler can hand back to the dispatch boundary.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("rate limited for another {remaining_millis}ms")]
    RateLimited { remaining_millis: u64 },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("no media available under '{path}'")]
    EmptyMediaPool { path: String },

    #[error("attachment is {size} bytes, host limit is {limit}")]
    UpstreamTooLarge { size: u64, limit: u64, url: String },

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("{0}")]
    Unknown(String),
}

impl BotError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// A single line that is safe to show in the channel.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { kind, name } => format!("❌ I don't know any {} called `{}`.", kind, name),
            Self::RateLimited { remaining_millis } => format!(
                "⏳ Slow down! You can use this again in {}.",
                format_remaining(*remaining_millis)
            ),
            Self::EmptyMediaPool { .. } => "📭 No media available right now.".to_string(),
            Self::UpstreamTooLarge { url, limit, .. } => format!(
                "📦 That file is bigger than Discord's {} MB upload limit, here's a link instead: {}",
                limit / (1024 * 1024),
                url
            ),
            Self::Persistence(_) | Self::Upstream(_) | Self::Unknown(_) => {
                "😵 Sorry, something went wrong while running that command.".to_string()
            }
        }
    }

    /// Log a failed command at a level matching how surprising it is.
    pub fn log(&self, command: &str) {
        match self {
            Self::NotFound { .. } | Self::RateLimited { .. } | Self::UpstreamTooLarge { .. } => {
                debug!("Command '{}' declined: {}", command, self)
            }
            Self::EmptyMediaPool { .. } | Self::Upstream(_) => {
                warn!("Command '{}' failed: {}", command, self)
            }
            Self::Persistence(_) | Self::Unknown(_) => {
                error!("Command '{}' failed: {}", command, self)
            }
        }
    }
}

/// Log any handler error and return the line to show the user.
pub fn describe_failure(err: &(dyn std::error::Error + Send + Sync + 'static), command: &str) -> String {
    match err.downcast_ref::<BotError>() {
        Some(bot) => {
            bot.log(command);
            bot.user_message()
        }
        None => {
            error!("Command '{}' failed with unexpected error: {:?}", command, err);
            BotError::Unknown(err.to_string()).user_message()
        }
    }
}

impl From<reqwest::Error> for BotError {
    fn from(e: reqwest::Error) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Split a wait time into whole hours and minutes, rounding seconds down.
pub fn split_hours_minutes(millis: u64) -> (u64, u64) {
    let total_minutes = millis / 60_000;
    (total_minutes / 60, total_minutes % 60)
}

pub fn format_remaining(millis: u64) -> String {
    let (hours, minutes) = split_hours_minutes(millis);
    let plural = |n: u64, unit: &str| {
        if n == 1 {
            format!("1 {}", unit)
        } else {
            format!("{} {}s", n, unit)
        }
    };
    match (hours, minutes) {
        (0, 0) => "less than a minute".to_string(),
        (0, m) => plural(m, "minute"),
        (h, 0) => plural(h, "hour"),
        (h, m) => format!("{} and {}", plural(h, "hour"), plural(m, "minute")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_hours_minutes() {
        // 400_000ms is 6m40s
        assert_eq!(split_hours_minutes(400_000), (0, 6));
        assert_eq!(split_hours_minutes(86_400_000), (24, 0));
        assert_eq!(split_hours_minutes(3_660_000), (1, 1));
        assert_eq!(split_hours_minutes(59_999), (0, 0));
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(400_000), "6 minutes");
        assert_eq!(format_remaining(3_660_000), "1 hour and 1 minute");
        assert_eq!(format_remaining(7_200_000), "2 hours");
        assert_eq!(format_remaining(1_000), "less than a minute");
    }

    #[test]
    fn test_user_message_hides_internal_details() {
        let err = BotError::Persistence("disk full at /var/lib/secret".to_string());
        assert!(!err.user_message().contains("/var/lib"));

        let err = BotError::Unknown("stack trace".to_string());
        assert!(err.user_message().contains("Sorry"));

        let err = BotError::not_found("game", "tetris");
        assert!(err.user_message().contains("`tetris`"));
    }

    #[test]
    fn test_describe_failure_downcasts() {
        let boxed: Box<dyn std::error::Error + Send + Sync> =
            Box::new(BotError::RateLimited { remaining_millis: 400_000 });
        assert!(describe_failure(boxed.as_ref(), "booba").contains("6 minutes"));

        let boxed: Box<dyn std::error::Error + Send + Sync> = "serenity exploded".into();
        let msg = describe_failure(boxed.as_ref(), "ping");
        assert!(msg.contains("Sorry"));
        assert!(!msg.contains("exploded"));
    }

    #[test]
    fn test_too_large_links_file() {
        let err = BotError::UpstreamTooLarge {
            size: 20 * 1024 * 1024,
            limit: 10 * 1024 * 1024,
            url: "https://cdn.example/clips/big.mp4".to_string(),
        };
        let msg = err.user_message();
        assert!(msg.contains("10 MB"));
        assert!(msg.contains("https://cdn.example/clips/big.mp4"));
    }
}
