pub mod general;
pub mod guide;
pub mod luck;
pub mod media;

use crate::reply::{prepare, Reply};
use crate::{Context, Data, Error};

/// Every slash command the bot registers.
pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![
        general::ping(),
        general::uptime(),
        general::help(),
        luck::luck(),
        media::clip(),
        guide::guide(),
    ]
}

/// Render and send a [`Reply`] as the response to a slash command.
pub async fn send(ctx: Context<'_>, reply: Reply) -> Result<(), Error> {
    let data = ctx.data();
    let prepared = prepare(reply, &data.http_client, data.config.max_attachment_bytes).await?;
    ctx.send(prepared.into_create_reply()).await?;
    Ok(())
}
