use crate::commands::send;
use crate::reply::{EmbedReply, Reply};
use crate::triggers::CommandRegistry;
use crate::{Context, Error};
use std::time::Duration;

/// Check that the bot is alive
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let latency = ctx.ping().await;
    send(ctx, ping_reply(latency)).await
}

/// Show how long the bot has been running
#[poise::command(slash_command)]
pub async fn uptime(ctx: Context<'_>) -> Result<(), Error> {
    send(ctx, uptime_reply(ctx.data().started_at.elapsed())).await
}

/// List the chat triggers the bot answers to
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    send(ctx, help_reply(&data.commands, &data.config.command_prefix)).await
}

pub fn ping_reply(latency: Duration) -> Reply {
    if latency.is_zero() {
        Reply::text("🏓 Pong!")
    } else {
        Reply::text(format!("🏓 Pong! ({}ms)", latency.as_millis()))
    }
}

pub fn uptime_reply(elapsed: Duration) -> Reply {
    // Whole seconds only; humantime would otherwise print nanoseconds
    let elapsed = Duration::from_secs(elapsed.as_secs());
    Reply::text(format!("⏱️ Up for {}", humantime::format_duration(elapsed)))
}

pub fn help_reply(registry: &CommandRegistry, prefix: &str) -> Reply {
    let lines: Vec<String> = registry
        .list()
        .iter()
        .map(|command| {
            if command.keyword_trigger() {
                format!("`{}` - {}", command.display_name(), command.description())
            } else {
                format!("`{}{}` - {}", prefix, command.name(), command.description())
            }
        })
        .collect();

    Reply::Embed(EmbedReply {
        title: Some("📖 Chat commands".to_string()),
        description: Some(lines.join("\n")),
        footer: Some("Slash versions are under /".to_string()),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ping_reply() {
        assert_eq!(ping_reply(Duration::ZERO), Reply::text("🏓 Pong!"));
        assert_eq!(ping_reply(Duration::from_millis(42)), Reply::text("🏓 Pong! (42ms)"));
    }

    #[test]
    fn test_uptime_reply() {
        assert_eq!(
            uptime_reply(Duration::from_millis(3_723_999)),
            Reply::text("⏱️ Up for 1h 2m 3s")
        );
        assert_eq!(
            uptime_reply(Duration::from_secs(90_000)),
            Reply::text("⏱️ Up for 1day 1h")
        );
    }

    #[test]
    fn test_help_lists_triggers() {
        let registry = CommandRegistry::with_builtins();
        let Reply::Embed(embed) = help_reply(&registry, "!") else {
            panic!("help should be an embed");
        };
        let description = embed.description.unwrap();
        assert!(description.contains("`Booba?`"));
        assert!(description.contains("`!ping`"));
        assert_eq!(description.lines().count(), registry.list().len());
    }
}
