use super::{member_key, reply_or_raise};
use crate::{Command, Context, Error};
use lv_core::leveling::XpRecord;
use poise::serenity_prelude::{self as serenity, User};

/// Sets how much xp a member earns per message.
#[poise::command(
    aliases("multi"),
    prefix_command,
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD"
)]
pub async fn multiplier(ctx: Context<'_>, user: User, multiplier: i64) -> Result<(), Error> {
    let key = member_key(ctx, &user)?;

    match ctx.data().ledger.set_multiplier(key, multiplier).await {
        Ok(()) => {
            tracing::info!(
                by = %ctx.author().id,
                user = %user.id,
                multiplier,
                "multiplier changed"
            );
            ctx.say("Multiplier updated.").await?;
            Ok(())
        }
        Err(e) => reply_or_raise(ctx, e).await,
    }
}

/// Deletes your level and xp in this server, this can't be undone.
#[poise::command(rename = "level-reset", prefix_command, slash_command, guild_only)]
pub async fn level_reset(ctx: Context<'_>) -> Result<(), Error> {
    let key = member_key(ctx, ctx.author())?;

    match ctx.data().ledger.delete(key).await {
        Ok(()) => {
            ctx.say("Your level has been reset.").await?;
            Ok(())
        }
        Err(e) => reply_or_raise(ctx, e).await,
    }
}

/// Uploads every xp record of this server as json.
#[poise::command(
    rename = "level-dump",
    prefix_command,
    guild_only,
    owners_only,
    hide_in_help
)]
pub async fn level_dump(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command can only be used in a server.")?;

    let records = ctx.data().ledger.export(guild_id).await?;
    let dump = dump_json(&records)?;

    let attachment = serenity::CreateAttachment::bytes(dump, "levels.json");
    ctx.send(poise::CreateReply::new().attachment(attachment))
        .await?;

    Ok(())
}

fn dump_json(records: &[XpRecord]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(records)
}

pub fn commands() -> [Command; 3] {
    [multiplier(), level_reset(), level_dump()]
}
