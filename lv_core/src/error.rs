use std::time::Duration;

/// Failures of the leveling subsystem.
///
/// `NotFound`, `Cooldown` and `Validation` are expected outcomes that commands turn into
/// replies (or ignore), the rest are real failures and bubble up to the framework.
#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("{0} doesn't exist")]
    NotFound(&'static str),
    #[error("on cooldown for another {}s", remaining.as_secs_f32().ceil())]
    Cooldown { remaining: Duration },
    #[error("{0}")]
    Validation(String),
    #[error("could not fetch image: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("could not render card: {0}")]
    Card(#[from] lv_card::CardError),
    /// A stored record broke `0 <= xp < xp_max`, this is a bug and not the user's fault.
    #[error("invariant violated: {0}")]
    Invariant(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl LevelError {
    /// Message suitable for showing the invoking user, `None` if the error isn't theirs to fix.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            LevelError::NotFound(_) | LevelError::Validation(_) | LevelError::Cooldown { .. } => {
                Some(self.to_string())
            }
            LevelError::Card(lv_card::CardError::Background(_)) => Some(
                "Your card background could not be read, reset it with `card background`.".into(),
            ),
            _ => None,
        }
    }
}
