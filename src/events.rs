use crate::error::describe_failure;
use crate::triggers::dispatch;
use crate::{Context, Data, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::{error, info};

pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "Logged in as {} ({} guilds)",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
        }
        serenity::FullEvent::Message { new_message } => {
            if new_message.author.bot {
                return Ok(());
            }
            let latency = shard_latency(ctx, framework).await;
            dispatch::handle_message(ctx, new_message, data, latency).await?;
        }
        _ => {}
    }
    Ok(())
}

/// Heartbeat latency of the shard that delivered the event, the same reading
/// poise uses for `ctx.ping()` on slash commands.
async fn shard_latency(
    ctx: &serenity::Context,
    framework: poise::FrameworkContext<'_, Data, Error>,
) -> Duration {
    let shard_manager = framework.shard_manager();
    let runners = shard_manager.runners.lock().await;
    runners
        .get(&ctx.shard_id)
        .and_then(|runner| runner.latency)
        .unwrap_or(Duration::ZERO)
}

async fn reply_ephemeral(ctx: Context<'_>, content: String) {
    let reply = poise::CreateReply::default().content(content).ephemeral(true);
    if let Err(e) = ctx.send(reply).await {
        error!("Failed to send error reply: {:?}", e);
    }
}

/// Global error handler for the framework
pub async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            let message = describe_failure(error.as_ref(), &ctx.command().name);
            reply_ephemeral(ctx, message).await;
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            let message = match error {
                Some(error) => describe_failure(error.as_ref(), &ctx.command().name),
                None => "🚫 Commands are disabled in this channel.".to_string(),
            };
            reply_ephemeral(ctx, message).await;
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!("Error in event handler for {:?}: {:?}", event.snake_case_name(), error);
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {:?}", e);
            }
        }
    }
}
