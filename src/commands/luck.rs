use crate::commands::send;
use crate::reply::{EmbedReply, Reply};
use crate::{Context, Error};
use rand::Rng;

/// Roll your luck for today (once per day)
#[poise::command(slash_command)]
pub async fn luck(ctx: Context<'_>) -> Result<(), Error> {
    let reply = roll_luck(ctx.author().display_name());
    send(ctx, reply).await
}

pub fn roll_luck(user_name: &str) -> Reply {
    let roll = rand::rng().random_range(0..=100u8);
    luck_reply(user_name, roll)
}

pub fn luck_reply(user_name: &str, roll: u8) -> Reply {
    Reply::Embed(EmbedReply {
        title: Some(format!("🍀 {}'s luck today: {}/100", user_name, roll)),
        description: Some(luck_line(roll).to_string()),
        footer: Some("Come back tomorrow for another roll".to_string()),
        ..Default::default()
    })
}

pub fn luck_line(roll: u8) -> &'static str {
    match roll {
        0 => "Cursed. Uninstall everything and go outside.",
        1..=20 => "Rough one. Maybe stick to the tutorial today.",
        21..=50 => "Coin-flip energy. Queue at your own risk.",
        51..=80 => "Solid. The RNG gods are paying attention.",
        81..=99 => "Hot streak! Go roll for that legendary.",
        _ => "JACKPOT. Whatever you do today, it drops.",
    }
}
