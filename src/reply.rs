use crate::config::{DISCORD_EMBED_LIMIT, DISCORD_MESSAGE_LIMIT};
use crate::error::BotError;
use crate::media::attachment::fetch_attachment;
use poise::serenity_prelude::{CreateAttachment, CreateEmbed, CreateMessage};
use tracing::info;

pub const EMBED_COLOR: u32 = 0x5865F2;

/// What a command wants to say, independent of how it was triggered.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Embed(EmbedReply),
    /// A remote file to upload as an attachment.
    File { url: String },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbedReply {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub footer: Option<String>,
}

impl Reply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }
}

/// A reply with any remote file already downloaded.
pub enum Prepared {
    Text(String),
    Embed(CreateEmbed),
    File(CreateAttachment),
}

impl Prepared {
    pub fn into_create_reply(self) -> poise::CreateReply {
        let reply = poise::CreateReply::default();
        match self {
            Prepared::Text(content) => reply.content(content),
            Prepared::Embed(embed) => reply.embed(embed),
            Prepared::File(file) => reply.attachment(file),
        }
    }

    pub fn into_create_message(self) -> CreateMessage {
        let message = CreateMessage::new();
        match self {
            Prepared::Text(content) => message.content(content),
            Prepared::Embed(embed) => message.embed(embed),
            Prepared::File(file) => message.add_file(file),
        }
    }
}

/// Turn a [`Reply`] into something Discord accepts. Files over
/// `attachment_limit` become a text message linking the file instead.
pub async fn prepare(
    reply: Reply,
    http: &reqwest::Client,
    attachment_limit: u64,
) -> Result<Prepared, BotError> {
    match reply {
        Reply::Text(content) if content.chars().count() <= DISCORD_MESSAGE_LIMIT => {
            Ok(Prepared::Text(content))
        }
        Reply::Text(content) => {
            // Long text goes into an embed description (up to 4096 chars)
            let description: String = content.chars().take(DISCORD_EMBED_LIMIT).collect();
            Ok(Prepared::Embed(
                CreateEmbed::new().description(description).color(EMBED_COLOR),
            ))
        }
        Reply::Embed(embed) => Ok(Prepared::Embed(build_embed(embed))),
        Reply::File { url } => match fetch_attachment(http, &url, attachment_limit).await {
            Ok(file) => Ok(Prepared::File(CreateAttachment::bytes(file.bytes, file.filename))),
            Err(e @ BotError::UpstreamTooLarge { .. }) => {
                info!("Attachment too large, sending link instead: {}", e);
                Ok(Prepared::Text(e.user_message()))
            }
            Err(e) => Err(e),
        },
    }
}

fn build_embed(embed: EmbedReply) -> CreateEmbed {
    let mut out = CreateEmbed::new().color(EMBED_COLOR);
    if let Some(title) = embed.title {
        out = out.title(title);
    }
    if let Some(description) = embed.description {
        out = out.description(truncate(&description, DISCORD_EMBED_LIMIT));
    }
    if let Some(url) = embed.url {
        out = out.url(url);
    }
    if let Some(image) = embed.image_url {
        out = out.image(image);
    }
    if let Some(footer) = embed.footer {
        out = out.footer(poise::serenity_prelude::CreateEmbedFooter::new(footer));
    }
    out
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.pop();
        out.push('…');
    }
    out
}
