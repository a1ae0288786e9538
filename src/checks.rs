use crate::config::Config;
use crate::{Context, Error};

/// Whether commands may run in this channel. DMs are always allowed; an
/// empty allow-list allows everything.
pub fn channel_allowed(config: &Config, channel_id: u64, is_dm: bool) -> bool {
    is_dm
        || config.allowed_channel_ids.is_empty()
        || config.allowed_channel_ids.contains(&channel_id)
}

/// Runs before every slash command: channel restriction, then cooldown.
pub async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    let data = ctx.data();
    let guild_id = ctx.guild_id().map(|id| id.get());
    if !channel_allowed(&data.config, ctx.channel_id().get(), guild_id.is_none()) {
        return Ok(false);
    }

    data.limiter
        .check_command(&ctx.command().name, ctx.author().id.get(), guild_id)
        .await?;
    Ok(true)
}
