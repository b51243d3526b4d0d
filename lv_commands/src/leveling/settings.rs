use super::{member_key, reply_or_raise};
use crate::{Context, Error};
use lv_core::appearance::CardSettings;
use poise::serenity_prelude::{self as serenity, CreateEmbed};

/// Customise your rank card!
#[allow(clippy::unused_async)]
#[poise::command(
    slash_command,
    prefix_command,
    guild_only,
    subcommands("font_color", "bar_color", "background", "show"),
    subcommand_required
)]
pub async fn card(_: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Sets the colour of your card's text, leave it out to go back to the default.
#[poise::command(
    rename = "font-color",
    aliases("fontcolor", "fc"),
    slash_command,
    prefix_command,
    guild_only
)]
pub async fn font_color(ctx: Context<'_>, color: Option<String>) -> Result<(), Error> {
    let key = member_key(ctx, ctx.author())?;

    match ctx
        .data()
        .appearance
        .set_font_color(key, color.as_deref())
        .await
    {
        Ok(()) => {
            ctx.say("Font color updated.").await?;
            Ok(())
        }
        Err(e) => reply_or_raise(ctx, e).await,
    }
}

/// Sets the colour of your progress bar, leave it out to go back to the default.
#[poise::command(
    rename = "bar-color",
    aliases("progressbarcolor", "pbc"),
    slash_command,
    prefix_command,
    guild_only
)]
pub async fn bar_color(ctx: Context<'_>, color: Option<String>) -> Result<(), Error> {
    let key = member_key(ctx, ctx.author())?;

    match ctx
        .data()
        .appearance
        .set_progress_bar_color(key, color.as_deref())
        .await
    {
        Ok(()) => {
            ctx.say("Progress bar color updated.").await?;
            Ok(())
        }
        Err(e) => reply_or_raise(ctx, e).await,
    }
}

/// Sets an image link as your card's background, leave it out to use the default.
#[poise::command(aliases("bg"), slash_command, prefix_command, guild_only)]
pub async fn background(ctx: Context<'_>, url: Option<String>) -> Result<(), Error> {
    let key = member_key(ctx, ctx.author())?;

    match ctx
        .data()
        .appearance
        .set_background(key, url.as_deref())
        .await
    {
        Ok(()) if url.is_some() => {
            ctx.say("Background updated.").await?;
            Ok(())
        }
        Ok(()) => {
            ctx.say("Background reset to the default.").await?;
            Ok(())
        }
        Err(e) => reply_or_raise(ctx, e).await,
    }
}

/// Shows your current card settings.
#[poise::command(slash_command, prefix_command, guild_only)]
pub async fn show(ctx: Context<'_>) -> Result<(), Error> {
    let key = member_key(ctx, ctx.author())?;

    let settings = match ctx.data().appearance.get(key).await {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            ctx.say("User doesn't exist").await?;
            return Ok(());
        }
        Err(e) => return reply_or_raise(ctx, e).await,
    };

    ctx.send(poise::CreateReply::new().embed(settings_embed(&settings)))
        .await?;

    Ok(())
}

fn settings_embed(settings: &CardSettings) -> CreateEmbed<'_> {
    let [r, g, b, _] = settings.bar_color().rgba().0;

    CreateEmbed::new()
        .title("Rank card settings")
        .colour(serenity::Colour::from_rgb(r, g, b))
        .field(
            "Background",
            settings.background_url.as_deref().unwrap_or("Default"),
            false,
        )
        .field("Progress bar", settings.progress_bar_color.as_str(), true)
        .field("Font", settings.font_color.as_str(), true)
}
