use super::{member_key, reply_or_raise};
use crate::{Context, Error};
use itertools::Itertools;
use lv_core::LevelError;
use lv_core::leveling::LeaderboardEntry;
use poise::serenity_prelude::{self as serenity, CreateEmbed, User};

/// Shows the highest levels in this server.
#[poise::command(prefix_command, slash_command, guild_only, aliases("lb"))]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx
        .guild_id()
        .ok_or("This command can only be used in a server.")?;

    let entries = match ctx.data().ledger.leaderboard(guild_id).await {
        Ok(entries) => entries,
        Err(LevelError::NotFound(_)) => {
            ctx.say("Nobody has earned any xp here yet.").await?;
            return Ok(());
        }
        Err(e) => return reply_or_raise(ctx, e).await,
    };

    let embed = CreateEmbed::new()
        .title("Leaderboard")
        .color(serenity::Colour::BLUE)
        .description(format_leaderboard(&entries));

    ctx.send(
        poise::CreateReply::new()
            .embed(embed)
            .allowed_mentions(serenity::CreateAllowedMentions::new()),
    )
    .await?;

    Ok(())
}

/// Shows a member's level and xp without drawing a card.
#[poise::command(prefix_command, slash_command, guild_only)]
pub async fn stats(ctx: Context<'_>, user: Option<User>) -> Result<(), Error> {
    let user = user.as_ref().unwrap_or_else(|| ctx.author());
    let key = member_key(ctx, user)?;

    let data = ctx.data();
    let (record, rank) = match data.ledger.fetch(key).await {
        Ok(record) => match data.ledger.rank(key).await {
            Ok(rank) => (record, rank),
            Err(e) => return reply_or_raise(ctx, e).await,
        },
        Err(e) => return reply_or_raise(ctx, e).await,
    };

    let mut embed = CreateEmbed::new()
        .author(serenity::CreateEmbedAuthor::new(user.display_name().to_owned()))
        .thumbnail(user.face())
        .color(serenity::Colour::BLUE)
        .field("Rank", format!("#{rank}"), true)
        .field("Level", record.level.to_string(), true)
        .field("XP", format!("{}/{}", record.xp, record.xp_max), true)
        .field("Multiplier", format!("x{}", record.multiplier), true);

    if let Some(created) = record.created() {
        embed = embed.field(
            "Tracked since",
            format!("<t:{}:R>", created.timestamp()),
            true,
        );
    }

    ctx.send(poise::CreateReply::new().embed(embed)).await?;

    Ok(())
}

fn format_leaderboard(entries: &[LeaderboardEntry]) -> String {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "{}. <@{}> - Level {} ({} xp)",
                i + 1,
                entry.user_id,
                entry.level,
                entry.xp
            )
        })
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_lines_are_numbered_in_order() {
        let entries = [
            LeaderboardEntry {
                user_id: 10,
                level: 5,
                xp: 40,
            },
            LeaderboardEntry {
                user_id: 12,
                level: 5,
                xp: 3,
            },
        ];

        assert_eq!(
            format_leaderboard(&entries),
            "1. <@10> - Level 5 (40 xp)\n2. <@12> - Level 5 (3 xp)"
        );
    }
}
