use crate::commands::{general, guide, luck, media};
use crate::error::BotError;
use crate::reply::Reply;
use crate::triggers::{ChatCommand, CommandRegistry, Invocation};
use async_trait::async_trait;
use std::sync::Arc;

pub fn register_all(registry: &mut CommandRegistry) {
    registry.register(Arc::new(PingCommand));
    registry.register(Arc::new(UptimeCommand));
    registry.register(Arc::new(HelpCommand));
    registry.register(Arc::new(LuckCommand));
    registry.register(Arc::new(BoobaCommand));
    registry.register(Arc::new(ClipCommand));
    registry.register(Arc::new(GuideCommand));
}

pub struct PingCommand;

#[async_trait]
impl ChatCommand for PingCommand {
    fn name(&self) -> &str {
        "ping"
    }
    fn description(&self) -> &str {
        "Check that the bot is alive"
    }
    async fn execute(&self, invocation: &Invocation<'_>) -> Result<Reply, BotError> {
        Ok(general::ping_reply(invocation.latency))
    }
}

pub struct UptimeCommand;

#[async_trait]
impl ChatCommand for UptimeCommand {
    fn name(&self) -> &str {
        "uptime"
    }
    fn description(&self) -> &str {
        "How long the bot has been running"
    }
    async fn execute(&self, invocation: &Invocation<'_>) -> Result<Reply, BotError> {
        Ok(general::uptime_reply(invocation.data.started_at.elapsed()))
    }
}

pub struct HelpCommand;

#[async_trait]
impl ChatCommand for HelpCommand {
    fn name(&self) -> &str {
        "help"
    }
    fn description(&self) -> &str {
        "This list"
    }
    async fn execute(&self, invocation: &Invocation<'_>) -> Result<Reply, BotError> {
        let data = invocation.data;
        Ok(general::help_reply(&data.commands, &data.config.command_prefix))
    }
}

pub struct LuckCommand;

#[async_trait]
impl ChatCommand for LuckCommand {
    fn name(&self) -> &str {
        "luck"
    }
    fn display_name(&self) -> &str {
        "Luck?"
    }
    fn description(&self) -> &str {
        "Your luck for today, once per day"
    }
    fn keyword_trigger(&self) -> bool {
        true
    }
    async fn execute(&self, invocation: &Invocation<'_>) -> Result<Reply, BotError> {
        Ok(luck::roll_luck(&invocation.user_name))
    }
}

pub struct BoobaCommand;

#[async_trait]
impl ChatCommand for BoobaCommand {
    fn name(&self) -> &str {
        "booba"
    }
    fn display_name(&self) -> &str {
        "Booba?"
    }
    fn description(&self) -> &str {
        "A random Booba from the CDN"
    }
    fn keyword_trigger(&self) -> bool {
        true
    }
    async fn execute(&self, invocation: &Invocation<'_>) -> Result<Reply, BotError> {
        media::random_image(invocation.data, media::BOOBA_PATH, invocation.guild_id).await
    }
}

pub struct ClipCommand;

#[async_trait]
impl ChatCommand for ClipCommand {
    fn name(&self) -> &str {
        "clip"
    }
    fn description(&self) -> &str {
        "A random clip, optionally from a folder"
    }
    async fn execute(&self, invocation: &Invocation<'_>) -> Result<Reply, BotError> {
        let folder = invocation
            .args
            .first()
            .map(String::as_str)
            .unwrap_or(media::DEFAULT_CLIP_FOLDER);
        media::random_clip(invocation.data, folder, invocation.guild_id).await
    }
}

pub struct GuideCommand;

#[async_trait]
impl ChatCommand for GuideCommand {
    fn name(&self) -> &str {
        "guide"
    }
    fn description(&self) -> &str {
        "Community guide link for a game"
    }
    async fn execute(&self, invocation: &Invocation<'_>) -> Result<Reply, BotError> {
        guide::guide_reply(&invocation.data.guides, &invocation.args.join(" "))
    }
}
