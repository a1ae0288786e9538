use crate::checks::channel_allowed;
use crate::error::BotError;
use crate::reply::{prepare, Reply};
use crate::triggers::{ChatCommand, CommandRegistry, Invocation};
use crate::{Data, Error};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub enum Resolution {
    Matched {
        command: Arc<dyn ChatCommand>,
        args: Vec<String>,
    },
    /// Addressed to the bot with the prefix, but no such command.
    Unknown(String),
    Ignored,
}

/// Work out which chat command, if any, a message is asking for.
///
/// A message that is exactly a keyword trigger (`Booba?`) wins; otherwise
/// `<prefix><name> [args...]` is looked up by name.
pub fn resolve_message(registry: &CommandRegistry, content: &str, prefix: &str) -> Resolution {
    let content = content.trim();
    if content.is_empty() {
        return Resolution::Ignored;
    }

    if let Some(command) = registry.resolve_display(content) {
        if command.keyword_trigger() {
            return Resolution::Matched {
                command,
                args: Vec::new(),
            };
        }
    }

    if prefix.is_empty() {
        return Resolution::Ignored;
    }
    let Some(rest) = content.strip_prefix(prefix) else {
        return Resolution::Ignored;
    };

    let mut words = rest.split_whitespace();
    let Some(name) = words.next() else {
        return Resolution::Ignored;
    };
    // "!!!" or "!?" is punctuation, not a command attempt
    if !name.chars().any(|c| c.is_alphanumeric()) || rest.starts_with(char::is_whitespace) {
        return Resolution::Ignored;
    }

    match registry.resolve(name) {
        Ok(command) => Resolution::Matched {
            command,
            args: words.map(str::to_string).collect(),
        },
        Err(_) => Resolution::Unknown(name.to_string()),
    }
}

/// Apply the command's cooldown, then run it.
pub async fn run_chat_command(
    command: &dyn ChatCommand,
    invocation: &Invocation<'_>,
) -> Result<Reply, BotError> {
    invocation
        .data
        .limiter
        .check_command(command.name(), invocation.user_id, invocation.guild_id)
        .await?;
    command.execute(invocation).await
}

/// Entry point for every non-bot message the gateway delivers.
pub async fn handle_message(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
    latency: Duration,
) -> Result<(), Error> {
    if message.author.bot {
        return Ok(());
    }
    let guild_id = message.guild_id.map(|id| id.get());
    if !channel_allowed(&data.config, message.channel_id.get(), guild_id.is_none()) {
        return Ok(());
    }

    let (command, args) =
        match resolve_message(&data.commands, &message.content, &data.config.command_prefix) {
            Resolution::Ignored => return Ok(()),
            Resolution::Unknown(name) => {
                debug!("Unknown chat command '{}' from {}", name, message.author.name);
                let reply = BotError::not_found("command", name).user_message();
                message.reply(ctx, reply).await?;
                return Ok(());
            }
            Resolution::Matched { command, args } => (command, args),
        };

    info!(
        "Chat command '{}' from {} in channel {}",
        command.name(),
        message.author.name,
        message.channel_id
    );

    let invocation = Invocation {
        data,
        user_id: message.author.id.get(),
        user_name: message.author.display_name().to_string(),
        guild_id,
        args,
        latency,
    };

    let typing = message.channel_id.start_typing(&ctx.http);
    let outcome = match run_chat_command(command.as_ref(), &invocation).await {
        Ok(reply) => prepare(reply, &data.http_client, data.config.max_attachment_bytes).await,
        Err(e) => Err(e),
    };
    drop(typing);

    let builder = match outcome {
        Ok(prepared) => prepared.into_create_message(),
        Err(e) => {
            e.log(command.name());
            serenity::CreateMessage::new().content(e.user_message())
        }
    };
    message
        .channel_id
        .send_message(&ctx.http, builder.reference_message(message))
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(resolution: Resolution) -> (String, Vec<String>) {
        match resolution {
            Resolution::Matched { command, args } => (command.name().to_string(), args),
            Resolution::Unknown(name) => panic!("unexpected unknown '{}'", name),
            Resolution::Ignored => panic!("unexpected ignore"),
        }
    }

    #[test]
    fn test_keyword_trigger() {
        let registry = CommandRegistry::with_builtins();
        assert_eq!(matched(resolve_message(&registry, "Booba?", "!")).0, "booba");
        assert_eq!(matched(resolve_message(&registry, "  booba?  ", "!")).0, "booba");
        assert_eq!(matched(resolve_message(&registry, "LUCK?", "!")).0, "luck");
    }

    #[test]
    fn test_plain_words_do_not_trigger() {
        let registry = CommandRegistry::with_builtins();
        // Only keyword commands fire on a bare message
        assert!(matches!(resolve_message(&registry, "ping", "!"), Resolution::Ignored));
        assert!(matches!(resolve_message(&registry, "luck", "!"), Resolution::Ignored));
        assert!(matches!(resolve_message(&registry, "Booba", "!"), Resolution::Ignored));
        assert!(matches!(resolve_message(&registry, "booba? please", "!"), Resolution::Ignored));
        assert!(matches!(resolve_message(&registry, "", "!"), Resolution::Ignored));
    }

    #[test]
    fn test_prefixed_commands() {
        let registry = CommandRegistry::with_builtins();
        assert_eq!(
            matched(resolve_message(&registry, "!ping", "!")),
            ("ping".to_string(), vec![])
        );
        assert_eq!(
            matched(resolve_message(&registry, "!guide deep rock", "!")),
            ("guide".to_string(), vec!["deep".to_string(), "rock".to_string()])
        );
        assert_eq!(
            matched(resolve_message(&registry, "!Booba?", "!")).0,
            "booba"
        );
        assert_eq!(
            matched(resolve_message(&registry, "?CLIP memes", "?")).0,
            "clip"
        );
    }

    #[test]
    fn test_unknown_and_noise() {
        let registry = CommandRegistry::with_builtins();
        assert!(matches!(
            resolve_message(&registry, "!dance", "!"),
            Resolution::Unknown(ref name) if name == "dance"
        ));
        assert!(matches!(resolve_message(&registry, "!!!", "!"), Resolution::Ignored));
        assert!(matches!(resolve_message(&registry, "! ping", "!"), Resolution::Ignored));
        assert!(matches!(resolve_message(&registry, "!ping", ""), Resolution::Ignored));
    }

    #[tokio::test]
    async fn test_run_chat_command_applies_cooldown() {
        let (data, _dir) = crate::test_data(&[("booba", &["a.png", "b.png"])]);
        let command = data.commands.resolve("Booba?").unwrap();
        let invocation = Invocation {
            data: &data,
            user_id: 5,
            user_name: "kit".to_string(),
            guild_id: Some(1),
            args: Vec::new(),
            latency: Duration::ZERO,
        };

        assert!(run_chat_command(command.as_ref(), &invocation).await.is_ok());
        match run_chat_command(command.as_ref(), &invocation).await {
            Err(BotError::RateLimited { remaining_millis }) => {
                assert!(remaining_millis > 86_000_000);
            }
            other => panic!("expected RateLimited, got {:?}", other),
        }

        // Unlimited commands keep working
        let ping = data.commands.resolve("ping").unwrap();
        for _ in 0..3 {
            assert!(run_chat_command(ping.as_ref(), &invocation).await.is_ok());
        }
    }
}
