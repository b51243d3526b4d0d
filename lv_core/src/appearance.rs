use crate::LevelError;
use crate::leveling::MemberKey;
use lv_card::CardColor;
use lv_card::color::{DEFAULT_BAR_COLOR, DEFAULT_FONT_COLOR};
use sqlx::{SqlitePool, query, query_as};

/// A row of `card_settings`.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CardSettings {
    pub guild_id: i64,
    pub user_id: i64,
    pub background_url: Option<String>,
    pub progress_bar_color: String,
    pub font_color: String,
}

impl CardSettings {
    /// The stored bar colour, or the default if it no longer parses.
    #[must_use]
    pub fn bar_color(&self) -> CardColor {
        CardColor::parse_or(&self.progress_bar_color, DEFAULT_BAR_COLOR)
    }

    #[must_use]
    pub fn text_color(&self) -> CardColor {
        CardColor::parse_or(&self.font_color, DEFAULT_FONT_COLOR)
    }
}

/// Per member rank card customisation.
///
/// Setters never create a row, members get one when they join or first chat.
pub struct Appearance {
    db: SqlitePool,
}

impl Appearance {
    #[must_use]
    pub fn new(pool: &SqlitePool) -> Self {
        Appearance { db: pool.clone() }
    }

    /// Returns whether a row was created.
    pub async fn create_if_absent(&self, key: MemberKey) -> Result<bool, LevelError> {
        let created = query(
            r#"
            INSERT INTO card_settings (guild_id, user_id, background_url, progress_bar_color, font_color)
            VALUES (?, ?, NULL, ?, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(key.guild())
        .bind(key.user())
        .bind(DEFAULT_BAR_COLOR)
        .bind(DEFAULT_FONT_COLOR)
        .execute(&self.db)
        .await?
        .rows_affected()
            == 1;

        Ok(created)
    }

    pub async fn get(&self, key: MemberKey) -> Result<Option<CardSettings>, LevelError> {
        Ok(query_as::<_, CardSettings>(
            r#"
            SELECT guild_id, user_id, background_url, progress_bar_color, font_color
            FROM card_settings
            WHERE guild_id = ? AND user_id = ?
            "#,
        )
        .bind(key.guild())
        .bind(key.user())
        .fetch_optional(&self.db)
        .await?)
    }

    /// Sets a custom background, `None` goes back to the bundled one.
    pub async fn set_background(
        &self,
        key: MemberKey,
        url: Option<&str>,
    ) -> Result<(), LevelError> {
        let url = url.map(str::trim).filter(|u| !u.is_empty());
        if let Some(url) = url {
            validate_url(url)?;
        }

        self.update(
            key,
            "UPDATE card_settings SET background_url = ? WHERE guild_id = ? AND user_id = ?",
            url,
        )
        .await
    }

    /// Sets the bar colour, `None` restores the default.
    pub async fn set_progress_bar_color(
        &self,
        key: MemberKey,
        color: Option<&str>,
    ) -> Result<(), LevelError> {
        let color = validate_color(color, DEFAULT_BAR_COLOR)?;
        self.update(
            key,
            "UPDATE card_settings SET progress_bar_color = ? WHERE guild_id = ? AND user_id = ?",
            Some(color),
        )
        .await
    }

    /// Sets the text colour, `None` restores the default.
    pub async fn set_font_color(
        &self,
        key: MemberKey,
        color: Option<&str>,
    ) -> Result<(), LevelError> {
        let color = validate_color(color, DEFAULT_FONT_COLOR)?;
        self.update(
            key,
            "UPDATE card_settings SET font_color = ? WHERE guild_id = ? AND user_id = ?",
            Some(color),
        )
        .await
    }

    async fn update(
        &self,
        key: MemberKey,
        sql: &'static str,
        value: Option<&str>,
    ) -> Result<(), LevelError> {
        let updated = query(sql)
            .bind(value)
            .bind(key.guild())
            .bind(key.user())
            .execute(&self.db)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(LevelError::NotFound("User"));
        }
        Ok(())
    }
}

fn validate_color<'a>(color: Option<&'a str>, default: &'a str) -> Result<&'a str, LevelError> {
    let Some(color) = color.map(str::trim).filter(|c| !c.is_empty()) else {
        return Ok(default);
    };

    color
        .parse::<CardColor>()
        .map_err(|e| LevelError::Validation(e.to_string()))?;
    Ok(color)
}

fn validate_url(url: &str) -> Result<(), LevelError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|_| LevelError::Validation(format!("`{url}` is not a link.")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(LevelError::Validation(
            "Backgrounds must be http or https links.".into(),
        ));
    }
    Ok(())
}
