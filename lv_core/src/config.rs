//! Runtime configuration read from the environment (and `.env`, if present).

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing {0}")]
    Missing(&'static str),
    #[error("{name} is not valid: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("could not read .env: {0}")]
    Dotenv(#[from] dotenvy::Error),
}

#[derive(Clone)]
pub struct Config {
    /// Env: `DISCORD_TOKEN`, required.
    pub discord_token: String,
    /// Env: `DATABASE_URL`, defaults to `sqlite://levels.db`.
    pub database_url: String,
    /// Env: `BOT_PREFIX`, defaults to `>`.
    pub prefix: String,
    /// Directory holding `images/` and `fonts/`.
    /// Env: `ASSETS_DIR`, defaults to `./assets`.
    pub assets_dir: PathBuf,
    /// Timeout for avatar and background downloads.
    /// Env: `HTTP_TIMEOUT_SECS`, defaults to 10.
    pub http_timeout: Duration,
}

// the token must never end up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url)
            .field("prefix", &self.prefix)
            .field("assets_dir", &self.assets_dir)
            .field("http_timeout", &self.http_timeout)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv_loaded(dotenvy::dotenv().map(drop))?;
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let discord_token = get("DISCORD_TOKEN")
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let http_timeout = match get("HTTP_TIMEOUT_SECS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::Invalid {
                    name: "HTTP_TIMEOUT_SECS",
                    value,
                })?,
            None => Duration::from_secs(10),
        };

        Ok(Config {
            discord_token,
            database_url: get("DATABASE_URL").unwrap_or_else(|| "sqlite://levels.db".to_owned()),
            prefix: get("BOT_PREFIX")
                .filter(|p| !p.trim().is_empty())
                .unwrap_or_else(|| ">".to_owned()),
            assets_dir: get("ASSETS_DIR").map_or_else(|| PathBuf::from("./assets"), PathBuf::from),
            http_timeout,
        })
    }
}

/// No `.env` at all is fine, one that can't be parsed is not.
fn dotenv_loaded(result: Result<(), dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Err(e) if e.not_found() => Ok(()),
        other => other.map_err(ConfigError::from),
    }
}
