use crate::LevelError;
use crate::appearance::{Appearance, CardSettings};
use crate::leveling::{MemberKey, XpLedger, XpRecord};

/// What the rank card shows about a member, minus the images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardStanding {
    pub record: XpRecord,
    pub settings: CardSettings,
    pub rank: i64,
}

/// Reads the member's record, card settings and rank.
///
/// Both rows have to exist, nothing is created here.
pub async fn card_standing(
    ledger: &XpLedger,
    appearance: &Appearance,
    key: MemberKey,
) -> Result<CardStanding, LevelError> {
    let record = ledger.fetch(key).await?;
    let settings = appearance
        .get(key)
        .await?
        .ok_or(LevelError::NotFound("User"))?;
    let rank = ledger.rank(key).await?;

    Ok(CardStanding {
        record,
        settings,
        rank,
    })
}
