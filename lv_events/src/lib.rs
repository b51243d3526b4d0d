#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

use poise::serenity_prelude as serenity;

pub(crate) use lv_core::structs::{Error, FrameworkContext};
mod leveling;

pub async fn handler(
    event: &serenity::FullEvent,
    framework: FrameworkContext<'_>,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot, .. } => {
            tracing::info!("Logged in as {}", data_about_bot.user.tag());
        }
        serenity::FullEvent::Message { new_message, .. } => {
            leveling::message(framework, new_message).await?;
        }
        serenity::FullEvent::GuildMemberAddition { new_member, .. } => {
            leveling::member_join(framework, new_member).await?;
        }
        _ => {}
    }
    Ok(())
}
