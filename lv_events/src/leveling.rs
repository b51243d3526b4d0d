use crate::{Error, FrameworkContext};
use chrono::Utc;
use lv_core::LevelError;
use lv_core::leveling::MemberKey;
use rand::Rng;
use serenity::all::{Member, Message};
use std::ops::RangeInclusive;

/// Points a single message can earn, before the multiplier.
const MESSAGE_POINTS: RangeInclusive<i64> = 1..=20;

/// Gives the author a small random amount of xp, at most once per cooldown.
pub async fn message(framework: FrameworkContext<'_>, message: &Message) -> Result<(), Error> {
    if message.author.bot() {
        return Ok(());
    }
    let Some(guild_id) = message.guild_id else {
        return Ok(());
    };

    let data = framework.user_data();
    let command_names = framework
        .options
        .commands
        .iter()
        .flat_map(|c| std::iter::once(&*c.name).chain(c.aliases.iter().map(|a| &**a)));
    if is_command(&message.content, &data.prefix, command_names) {
        return Ok(());
    }

    let key = MemberKey::new(guild_id, message.author.id);
    let now = Utc::now();
    data.ensure_member(key, now).await?;

    let points = roll_points();
    match data.ledger.add_xp(key, points, now).await {
        Ok(gain) => {
            tracing::trace!(user = %key.user_id, points, xp = gain.after.xp, "xp gained");
            Ok(())
        }
        Err(LevelError::Cooldown { remaining }) => {
            tracing::trace!(user = %key.user_id, ?remaining, "xp gain on cooldown");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn member_join(framework: FrameworkContext<'_>, member: &Member) -> Result<(), Error> {
    if member.user.bot() {
        return Ok(());
    }

    let key = MemberKey::new(member.guild_id, member.user.id);
    if framework.user_data().ensure_member(key, Utc::now()).await? {
        tracing::debug!(guild = %key.guild_id, user = %key.user_id, "registered new member");
    }
    Ok(())
}

fn roll_points() -> i64 {
    rand::thread_rng().gen_range(MESSAGE_POINTS)
}

/// Whether the message invokes one of the bot's commands, plain chat that happens to start
/// with the prefix still earns xp.
fn is_command<'a>(content: &str, prefix: &str, mut names: impl Iterator<Item = &'a str>) -> bool {
    let Some(invocation) = content.trim_start().strip_prefix(prefix) else {
        return false;
    };
    let Some(word) = invocation.split_whitespace().next() else {
        return false;
    };
    // a name glued to the prefix only, "> level" is chat
    if !invocation.starts_with(word) {
        return false;
    }

    names.any(|name| name.eq_ignore_ascii_case(word))
}
