use lv_core::structs::{Data, Error};
use poise::serenity_prelude as serenity;
use std::{sync::Arc, time::Duration};
use tracing_subscriber::EnvFilter;

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            tracing::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            let _ = ctx.say("Something went wrong, please try again later.").await;
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            let error_msg = error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "You cannot execute this command.".to_owned());
            let _ = ctx.say(error_msg).await;
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = lv_core::config::Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,levels_bot=debug,lv_core=debug,lv_events=debug,lv_commands=debug")
        }))
        .init();
    tracing::info!(?config, "starting levels-bot v{}", env!("CARGO_PKG_VERSION"));

    let pool = lv_core::db::connect(&config.database_url).await?;
    let assets = lv_card::CardAssets::load(&config.assets_dir)?;
    let data = Data::new(&pool, assets, &config)?;

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let options = poise::FrameworkOptions {
        commands: lv_commands::commands(),
        prefix_options: poise::PrefixFrameworkOptions {
            prefix: Some(config.prefix.clone().into()),
            edit_tracker: Some(Arc::new(poise::EditTracker::for_timespan(
                Duration::from_secs(300),
            ))),
            ..Default::default()
        },
        on_error: |error| Box::pin(on_error(error)),
        event_handler: |framework, event| Box::pin(lv_events::handler(event, framework)),
        ..Default::default()
    };

    let framework = poise::Framework::new(options);

    let token: serenity::Token = config.discord_token.parse()?;
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .data(Arc::new(data) as _)
        .await?;

    client.start().await?;
    Ok(())
}
