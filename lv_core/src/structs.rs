pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
pub type FrameworkContext<'a> = poise::FrameworkContext<'a, Data, Error>;
pub type Command = poise::Command<Data, Error>;

use crate::appearance::Appearance;
use crate::card::{CardStanding, card_standing};
use crate::config::Config;
use crate::fetch;
use crate::leveling::{MemberKey, XpLedger};
use crate::LevelError;
use chrono::{DateTime, Utc};
use lv_card::CardAssets;
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct Data {
    pub db: SqlitePool,
    pub ledger: XpLedger,
    pub appearance: Appearance,
    /// Shared by every avatar and background download.
    pub http: reqwest::Client,
    /// Default background and fonts, handed to the render workers.
    pub assets: Arc<CardAssets>,
    /// Messages starting with this are commands and earn nothing.
    pub prefix: String,
}

impl Data {
    pub fn new(pool: &SqlitePool, assets: CardAssets, config: &Config) -> Result<Self, LevelError> {
        Ok(Data {
            db: pool.clone(),
            ledger: XpLedger::new(pool),
            appearance: Appearance::new(pool),
            http: fetch::http_client(config.http_timeout)?,
            assets: Arc::new(assets),
            prefix: config.prefix.clone(),
        })
    }

    /// Makes sure the member has both an xp record and card settings.
    ///
    /// Returns true if either had to be created.
    pub async fn ensure_member(&self, key: MemberKey, now: DateTime<Utc>) -> Result<bool, LevelError> {
        let record = self.ledger.create_if_absent(key, now).await?;
        let settings = self.appearance.create_if_absent(key).await?;
        Ok(record || settings)
    }

    /// Everything the rank card needs from the database, `NotFound` if the member has no rows.
    pub async fn card_standing(&self, key: MemberKey) -> Result<CardStanding, LevelError> {
        card_standing(&self.ledger, &self.appearance, key).await
    }
}
