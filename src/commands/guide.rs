use crate::commands::send;
use crate::error::BotError;
use crate::guides::GuideBook;
use crate::reply::{EmbedReply, Reply};
use crate::{Context, Error};

/// Max choices Discord shows in an autocomplete list
const AUTOCOMPLETE_LIMIT: usize = 25;

async fn autocomplete_game(ctx: Context<'_>, partial: &str) -> impl Iterator<Item = String> {
    let partial = partial.to_lowercase();
    let games: Vec<String> = ctx
        .data()
        .guides
        .games()
        .filter(|game| game.to_lowercase().contains(&partial))
        .take(AUTOCOMPLETE_LIMIT)
        .map(str::to_string)
        .collect();
    games.into_iter()
}

/// Get the community guide for a game
#[poise::command(slash_command)]
pub async fn guide(
    ctx: Context<'_>,
    #[description = "Game name"]
    #[autocomplete = "autocomplete_game"]
    game: String,
) -> Result<(), Error> {
    let reply = guide_reply(&ctx.data().guides, &game)?;
    send(ctx, reply).await
}

pub fn guide_reply(book: &GuideBook, game: &str) -> Result<Reply, BotError> {
    if game.trim().is_empty() {
        return Ok(Reply::text(list_games(book)));
    }
    let entry = book.find(game)?;
    Ok(Reply::Embed(EmbedReply {
        title: Some(
            entry
                .title
                .clone()
                .unwrap_or_else(|| format!("{} guide", entry.game)),
        ),
        description: Some(entry.url.clone()),
        url: Some(entry.url.clone()),
        footer: Some(entry.game.clone()),
        ..Default::default()
    }))
}

fn list_games(book: &GuideBook) -> String {
    if book.is_empty() {
        return "📚 No guides have been added yet.".to_string();
    }
    let games: Vec<&str> = book.games().collect();
    format!("📚 Guides available for: {}", games.join(", "))
}
