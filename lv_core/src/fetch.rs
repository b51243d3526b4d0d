use crate::LevelError;
use std::time::Duration;

/// Builds the client shared by every download the bot makes.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client, LevelError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("levels-bot/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Downloads the raw bytes behind `url`, treating non-success statuses as failures.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, LevelError> {
    tracing::debug!(url, "fetching image");
    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    Ok(bytes.to_vec())
}
