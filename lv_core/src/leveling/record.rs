use super::progression::Standing;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{GuildId, UserId};
use serde::Serialize;

/// Identifies one member of one guild, the key of every leveling table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberKey {
    pub guild_id: GuildId,
    pub user_id: UserId,
}

impl MemberKey {
    #[must_use]
    pub fn new(guild_id: GuildId, user_id: UserId) -> Self {
        MemberKey { guild_id, user_id }
    }

    // sqlite has no unsigned integers, snowflakes fit in an i64 anyway.
    pub(crate) fn guild(&self) -> i64 {
        self.guild_id.get() as i64
    }

    pub(crate) fn user(&self) -> i64 {
        self.user_id.get() as i64
    }
}

/// A row of `xp_records`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct XpRecord {
    pub guild_id: i64,
    pub user_id: i64,
    pub xp: i64,
    pub xp_max: i64,
    pub level: i64,
    pub multiplier: i64,
    /// Unix millis of the last accepted gain.
    pub cooldown: Option<i64>,
    /// Unix seconds.
    pub created_at: i64,
}

impl XpRecord {
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::new(self.user_id as u64)
    }

    #[must_use]
    pub fn standing(&self) -> Standing {
        Standing {
            xp: self.xp,
            xp_max: self.xp_max,
            level: self.level,
        }
    }

    #[must_use]
    pub fn last_gain(&self) -> Option<DateTime<Utc>> {
        self.cooldown.and_then(DateTime::from_timestamp_millis)
    }

    #[must_use]
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

/// One line of a guild leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub user_id: i64,
    pub level: i64,
    pub xp: i64,
}

impl LeaderboardEntry {
    #[must_use]
    pub fn user_id(&self) -> UserId {
        UserId::new(self.user_id as u64)
    }
}
