use super::{member_key, reply_or_raise};
use crate::{Context, Error};
use aformat::aformat;
use lv_card::CardInput;
use lv_core::LevelError;
use lv_core::card::CardStanding;
use lv_core::fetch::fetch_bytes;
use lv_core::leveling::MemberKey;
use poise::serenity_prelude::{CreateAttachment, User};
use std::sync::Arc;

/// Shows a member's rank card.
#[poise::command(prefix_command, slash_command, guild_only, aliases("lvl", "rank"))]
pub async fn level(ctx: Context<'_>, user: Option<User>) -> Result<(), Error> {
    let user = user.as_ref().unwrap_or_else(|| ctx.author());
    let key = member_key(ctx, user)?;

    ctx.defer_or_broadcast().await?;

    let input = match card_input(ctx, key, user).await {
        Ok(input) => input,
        Err(e) => return reply_or_raise(ctx, e).await,
    };

    let assets = Arc::clone(&ctx.data().assets);
    let jpeg = match tokio::task::spawn_blocking(move || lv_card::render_card(&assets, &input)).await? {
        Ok(jpeg) => jpeg,
        Err(e) => return reply_or_raise(ctx, e.into()).await,
    };

    let id = user.id.get();
    let filename = aformat!("rank_card_{id}.jpg");
    ctx.send(
        poise::CreateReply::new()
            .attachment(CreateAttachment::bytes(jpeg, filename.as_str().to_owned())),
    )
    .await?;

    Ok(())
}

/// Reads everything the card shows, nothing is drawn if any of it is missing.
async fn card_input(ctx: Context<'_>, key: MemberKey, user: &User) -> Result<CardInput, LevelError> {
    let data = ctx.data();
    let CardStanding {
        record,
        settings,
        rank,
    } = data.card_standing(key).await?;

    let avatar = fetch_bytes(&data.http, &user.face()).await?;
    let background = match &settings.background_url {
        Some(url) => Some(fetch_bytes(&data.http, url).await?),
        None => None,
    };

    Ok(CardInput {
        display_name: user.display_name().to_owned(),
        rank,
        level: record.level,
        xp: record.xp,
        xp_max: record.xp_max,
        avatar,
        background,
        bar_color: settings.bar_color(),
        font_color: settings.text_color(),
    })
}
