use crate::commands::send;
use crate::error::BotError;
use crate::media::IMAGE_EXTENSIONS;
use crate::reply::{EmbedReply, Reply};
use crate::{Context, Data, Error};

pub const BOOBA_PATH: &str = "booba";
pub const DEFAULT_CLIP_FOLDER: &str = "clips";

/// Post a random clip from the community CDN
#[poise::command(slash_command)]
pub async fn clip(
    ctx: Context<'_>,
    #[description = "CDN folder to pick from (default: clips)"] folder: Option<String>,
) -> Result<(), Error> {
    ctx.defer().await?;
    let folder = folder.as_deref().unwrap_or(DEFAULT_CLIP_FOLDER);
    let reply = random_clip(ctx.data(), folder, ctx.guild_id().map(|id| id.get())).await?;
    send(ctx, reply).await
}

/// Media history is tracked per guild; DMs share one bucket.
pub fn guild_key(guild_id: Option<u64>) -> String {
    guild_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "dm".to_string())
}

/// Normalise a user-supplied CDN folder. Anything that could escape the
/// media root is treated as an unknown pool.
pub fn media_path(folder: &str) -> Result<String, BotError> {
    let folder = folder.trim().trim_matches('/').to_lowercase();
    let valid = !folder.is_empty()
        && folder.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        });
    if valid {
        Ok(folder)
    } else {
        Err(BotError::not_found("media pool", folder))
    }
}

pub async fn random_image(
    data: &Data,
    path: &str,
    guild_id: Option<u64>,
) -> Result<Reply, BotError> {
    let url = data
        .media
        .pick_random(path, &guild_key(guild_id), &data.pick_options(IMAGE_EXTENSIONS))
        .await?;
    Ok(Reply::Embed(EmbedReply {
        image_url: Some(url),
        ..Default::default()
    }))
}

pub async fn random_clip(
    data: &Data,
    folder: &str,
    guild_id: Option<u64>,
) -> Result<Reply, BotError> {
    let path = media_path(folder)?;
    let options = data.pick_options(data.config.media_extensions.as_slice());
    let url = data
        .media
        .pick_random(&path, &guild_key(guild_id), &options)
        .await?;
    Ok(Reply::File { url })
}
