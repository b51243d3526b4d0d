use crate::{Command, Context, Error};
use lv_core::LevelError;
use lv_core::leveling::MemberKey;
use poise::serenity_prelude::User;

mod admin;
mod card;
mod leaderboard;
mod settings;

/// Replies with the error if it's something the user can act on, otherwise hands it to the
/// framework's error handler.
async fn reply_or_raise(ctx: Context<'_>, error: LevelError) -> Result<(), Error> {
    match error.user_message() {
        Some(message) => {
            ctx.say(message).await?;
            Ok(())
        }
        None => Err(error.into()),
    }
}

fn member_key(ctx: Context<'_>, user: &User) -> Result<MemberKey, Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command can only be used in a server.")?;
    Ok(MemberKey::new(guild_id, user.id))
}

pub fn commands() -> Vec<Command> {
    [card::level(), settings::card(), leaderboard::leaderboard(), leaderboard::stats()]
        .into_iter()
        .chain(admin::commands())
        .collect()
}
