use lobbybot::media::source::CdnSource;
use lobbybot::services::usage_store::UsageStore;
use lobbybot::{checks, commands, config::Config, events, health, Data};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config);
    let discord_token = config.discord_token.clone();

    if let Some(addr) = config.http_bind_addr.clone() {
        let started_at = Instant::now();
        tokio::spawn(async move {
            if let Err(e) = health::serve(&addr, started_at).await {
                error!("Health server stopped: {:?}", e);
            }
        });
    }

    let owners = config
        .owner_id
        .map(serenity::UserId::new)
        .into_iter()
        .collect();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            owners,
            command_check: Some(|ctx| Box::pin(checks::command_check(ctx))),
            on_error: |error| Box::pin(events::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready!");
                if config.register_commands {
                    let commands = &framework.options().commands;
                    match config.dev_guild_id {
                        Some(guild_id) => {
                            poise::builtins::register_in_guild(
                                ctx,
                                commands,
                                serenity::GuildId::new(guild_id),
                            )
                            .await?;
                            info!("Registered {} commands in guild {}", commands.len(), guild_id);
                        }
                        None => {
                            poise::builtins::register_globally(ctx, commands).await?;
                            info!("Registered {} commands globally", commands.len());
                        }
                    }
                }

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let http_client = reqwest::Client::new();
                let usage = Arc::new(UsageStore::load(&config.usage_dir).await);
                let media_source = Arc::new(CdnSource::new(http_client.clone(), &config));

                Ok(Data::new(config, http_client, usage, media_source))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {:?}", e);
            return;
        }
        info!("Received shutdown signal, disconnecting");
        shard_manager.shutdown_all().await;
    });

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
