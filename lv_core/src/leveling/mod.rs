pub mod progression;
pub mod record;

use crate::LevelError;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::GuildId;
use progression::{BASE_XP_MAX, GAIN_COOLDOWN, Gain, apply_gain, cooldown_remaining};
pub use record::{LeaderboardEntry, MemberKey, XpRecord};
use sqlx::{SqlitePool, query, query_as, query_scalar};

/// How many members the leaderboard shows.
pub const LEADERBOARD_SIZE: i64 = 10;
pub const MAX_MULTIPLIER: i64 = 1000;

/// Storage of every member's experience.
///
/// Nothing is cached, every call is a round trip to the database.
pub struct XpLedger {
    db: SqlitePool,
}

impl XpLedger {
    #[must_use]
    pub fn new(pool: &SqlitePool) -> Self {
        XpLedger { db: pool.clone() }
    }

    pub async fn get(&self, key: MemberKey) -> Result<Option<XpRecord>, LevelError> {
        Ok(query_as::<_, XpRecord>(
            r#"
            SELECT guild_id, user_id, xp, xp_max, level, multiplier, cooldown, created_at
            FROM xp_records
            WHERE guild_id = ? AND user_id = ?
            "#,
        )
        .bind(key.guild())
        .bind(key.user())
        .fetch_optional(&self.db)
        .await?)
    }

    /// Like [`XpLedger::get`], but absence is an error.
    pub async fn fetch(&self, key: MemberKey) -> Result<XpRecord, LevelError> {
        self.get(key).await?.ok_or(LevelError::NotFound("User"))
    }

    /// Creates a record with the starting values unless one exists.
    ///
    /// The new record has never gained, so its first gain isn't held back by the cooldown.
    /// Returns whether a record was created.
    pub async fn create_if_absent(
        &self,
        key: MemberKey,
        now: DateTime<Utc>,
    ) -> Result<bool, LevelError> {
        let created = query(
            r#"
            INSERT INTO xp_records (guild_id, user_id, xp, xp_max, level, multiplier, cooldown, created_at)
            VALUES (?, ?, 0, ?, 1, 1, NULL, ?)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(key.guild())
        .bind(key.user())
        .bind(BASE_XP_MAX)
        .bind(now.timestamp())
        .execute(&self.db)
        .await?
        .rows_affected()
            == 1;

        if created {
            tracing::debug!(guild = %key.guild_id, user = %key.user_id, "created xp record");
        }
        Ok(created)
    }

    pub async fn delete(&self, key: MemberKey) -> Result<(), LevelError> {
        let deleted = query("DELETE FROM xp_records WHERE guild_id = ? AND user_id = ?")
            .bind(key.guild())
            .bind(key.user())
            .execute(&self.db)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(LevelError::NotFound("User"));
        }
        tracing::info!(guild = %key.guild_id, user = %key.user_id, "deleted xp record");
        Ok(())
    }

    pub async fn set_multiplier(&self, key: MemberKey, multiplier: i64) -> Result<(), LevelError> {
        if !(1..=MAX_MULTIPLIER).contains(&multiplier) {
            return Err(LevelError::Validation(format!(
                "The multiplier must be between 1 and {MAX_MULTIPLIER}."
            )));
        }

        let updated = query("UPDATE xp_records SET multiplier = ? WHERE guild_id = ? AND user_id = ?")
            .bind(multiplier)
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

    /// Applies a gain of `points` (scaled by the record's multiplier) at `now`.
    ///
    /// The record must exist, see [`XpLedger::create_if_absent`]. Gains within
    /// [`GAIN_COOLDOWN`] of the last accepted one are refused with [`LevelError::Cooldown`].
    pub async fn add_xp(
        &self,
        key: MemberKey,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<Gain, LevelError> {
        let record = self.fetch(key).await?;

        if let Some(remaining) = cooldown_remaining(record.last_gain(), now) {
            return Err(LevelError::Cooldown { remaining });
        }

        let gain = apply_gain(record.standing(), points, record.multiplier)?;
        self.commit_gain(key, &gain, record.cooldown, now).await?;

        if gain.leveled_up() {
            tracing::info!(
                guild = %key.guild_id,
                user = %key.user_id,
                level = gain.after.level,
                "member leveled up"
            );
        }
        Ok(gain)
    }

    /// Writes `gain` unless another gain landed since `read_cooldown` was read.
    ///
    /// A record that vanished in between is `NotFound`, a stale cooldown is `Cooldown`.
    async fn commit_gain(
        &self,
        key: MemberKey,
        gain: &Gain,
        read_cooldown: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<(), LevelError> {
        let updated = query(
            r#"
            UPDATE xp_records
            SET xp = ?, xp_max = ?, level = ?, cooldown = ?
            WHERE guild_id = ? AND user_id = ? AND cooldown IS ?
            "#,
        )
        .bind(gain.after.xp)
        .bind(gain.after.xp_max)
        .bind(gain.after.level)
        .bind(now.timestamp_millis())
        .bind(key.guild())
        .bind(key.user())
        .bind(read_cooldown)
        .execute(&self.db)
        .await?
        .rows_affected();

        if updated == 0 {
            let current = self.fetch(key).await?;
            let remaining = cooldown_remaining(current.last_gain(), now).unwrap_or(GAIN_COOLDOWN);
            return Err(LevelError::Cooldown { remaining });
        }
        Ok(())
    }

    /// 1-based position of the member among everyone in their guild.
    ///
    /// Ordered by level, then xp, both descending, with the lower user id first on a tie.
    pub async fn rank(&self, key: MemberKey) -> Result<i64, LevelError> {
        let position = query_scalar::<_, i64>(
            r#"
            SELECT position FROM (
                SELECT
                    user_id,
                    ROW_NUMBER() OVER (ORDER BY level DESC, xp DESC, user_id ASC) AS position
                FROM xp_records
                WHERE guild_id = ?
            )
            WHERE user_id = ?
            "#,
        )
        .bind(key.guild())
        .bind(key.user())
        .fetch_optional(&self.db)
        .await?;

        match position {
            Some(position) => Ok(position),
            None if self.guild_is_empty(key.guild_id).await? => Err(LevelError::NotFound("Guild")),
            None => Err(LevelError::NotFound("User")),
        }
    }

    /// The top [`LEADERBOARD_SIZE`] members of a guild, same order as [`XpLedger::rank`].
    pub async fn leaderboard(&self, guild_id: GuildId) -> Result<Vec<LeaderboardEntry>, LevelError> {
        let entries = query_as::<_, LeaderboardEntry>(
            r#"
            SELECT user_id, level, xp
            FROM xp_records
            WHERE guild_id = ?
            ORDER BY level DESC, xp DESC, user_id ASC
            LIMIT ?
            "#,
        )
        .bind(guild_id.get() as i64)
        .bind(LEADERBOARD_SIZE)
        .fetch_all(&self.db)
        .await?;

        if entries.is_empty() {
            return Err(LevelError::NotFound("Guild"));
        }
        Ok(entries)
    }

    /// Every record of a guild, ranked.
    pub async fn export(&self, guild_id: GuildId) -> Result<Vec<XpRecord>, LevelError> {
        Ok(query_as::<_, XpRecord>(
            r#"
            SELECT guild_id, user_id, xp, xp_max, level, multiplier, cooldown, created_at
            FROM xp_records
            WHERE guild_id = ?
            ORDER BY level DESC, xp DESC, user_id ASC
            "#,
        )
        .bind(guild_id.get() as i64)
        .fetch_all(&self.db)
        .await?)
    }

    async fn guild_is_empty(&self, guild_id: GuildId) -> Result<bool, LevelError> {
        let count = query_scalar::<_, i64>("SELECT COUNT(*) FROM xp_records WHERE guild_id = ?")
            .bind(guild_id.get() as i64)
            .fetch_one(&self.db)
            .await?;
        Ok(count == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::TimeDelta;
    use poise::serenity_prelude::UserId;

    fn key(guild: u64, user: u64) -> MemberKey {
        MemberKey::new(GuildId::new(guild), UserId::new(user))
    }

    async fn ledger() -> XpLedger {
        XpLedger::new(&db::in_memory().await.unwrap())
    }

    /// Pushes a member straight to `level` without going through gains.
    async fn force_level(ledger: &XpLedger, key: MemberKey, level: i64) {
        ledger.create_if_absent(key, Utc::now()).await.unwrap();
        query("UPDATE xp_records SET level = ? WHERE guild_id = ? AND user_id = ?")
            .bind(level)
            .bind(key.guild())
            .bind(key.user())
            .execute(&ledger.db)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_is_idempotent_and_uses_defaults() {
        let ledger = ledger().await;
        let now = Utc::now();

        assert!(ledger.create_if_absent(key(1, 2), now).await.unwrap());
        assert!(!ledger.create_if_absent(key(1, 2), now).await.unwrap());

        let record = ledger.fetch(key(1, 2)).await.unwrap();
        assert_eq!((record.xp, record.xp_max, record.level, record.multiplier), (0, 100, 1, 1));
        assert_eq!(record.cooldown, None);
        assert_eq!(record.created_at, now.timestamp());
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let ledger = ledger().await;
        assert!(matches!(
            ledger.add_xp(key(1, 2), 5, Utc::now()).await,
            Err(LevelError::NotFound(_))
        ));
        assert!(ledger.get(key(1, 2)).await.unwrap().is_none());
        assert!(matches!(ledger.delete(key(1, 2)).await, Err(LevelError::NotFound(_))));
    }

    #[tokio::test]
    async fn first_gain_applies_immediately() {
        let ledger = ledger().await;
        let now = Utc::now();
        ledger.create_if_absent(key(1, 2), now).await.unwrap();

        let gain = ledger.add_xp(key(1, 2), 12, now).await.unwrap();
        assert_eq!(gain.after.xp, 12);

        let record = ledger.fetch(key(1, 2)).await.unwrap();
        assert_eq!(record.xp, 12);
        assert_eq!(record.cooldown, Some(now.timestamp_millis()));
    }

    #[tokio::test]
    async fn second_gain_inside_cooldown_changes_nothing() {
        let ledger = ledger().await;
        let now = Utc::now();
        ledger.create_if_absent(key(1, 2), now).await.unwrap();
        ledger.add_xp(key(1, 2), 10, now).await.unwrap();
        let after_first = ledger.fetch(key(1, 2)).await.unwrap();

        let second = ledger
            .add_xp(key(1, 2), 10, now + TimeDelta::seconds(14))
            .await;
        assert!(matches!(second, Err(LevelError::Cooldown { .. })));
        assert_eq!(ledger.fetch(key(1, 2)).await.unwrap(), after_first);

        let third = ledger
            .add_xp(key(1, 2), 10, now + TimeDelta::seconds(15))
            .await
            .unwrap();
        assert_eq!(third.after.xp, 20);
    }

    #[tokio::test]
    async fn racing_gains_only_count_once() {
        let ledger = ledger().await;
        let now = Utc::now();
        ledger.create_if_absent(key(1, 2), now).await.unwrap();

        let (a, b) = tokio::join!(
            ledger.add_xp(key(1, 2), 10, now),
            ledger.add_xp(key(1, 2), 10, now)
        );

        let applied = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(applied, 1);
        assert!(
            [a, b]
                .into_iter()
                .any(|r| matches!(r, Err(LevelError::Cooldown { .. })))
        );
        assert_eq!(ledger.fetch(key(1, 2)).await.unwrap().xp, 10);
    }

    #[tokio::test]
    async fn stale_gain_is_refused() {
        let ledger = ledger().await;
        let now = Utc::now();
        ledger.create_if_absent(key(1, 2), now).await.unwrap();
        let stale = ledger.fetch(key(1, 2)).await.unwrap();
        ledger.add_xp(key(1, 2), 10, now).await.unwrap();

        let gain = apply_gain(stale.standing(), 10, 1).unwrap();
        assert!(matches!(
            ledger.commit_gain(key(1, 2), &gain, stale.cooldown, now).await,
            Err(LevelError::Cooldown { .. })
        ));
        assert_eq!(ledger.fetch(key(1, 2)).await.unwrap().xp, 10);
    }

    #[tokio::test]
    async fn gain_for_a_reset_member_is_not_found() {
        let ledger = ledger().await;
        let now = Utc::now();
        ledger.create_if_absent(key(1, 2), now).await.unwrap();
        let read = ledger.fetch(key(1, 2)).await.unwrap();
        ledger.delete(key(1, 2)).await.unwrap();

        let gain = apply_gain(read.standing(), 10, 1).unwrap();
        assert!(matches!(
            ledger.commit_gain(key(1, 2), &gain, read.cooldown, now).await,
            Err(LevelError::NotFound(_))
        ));
        assert!(ledger.get(key(1, 2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn gains_respect_multiplier_and_level_up() {
        let ledger = ledger().await;
        let now = Utc::now();
        ledger.create_if_absent(key(1, 2), now).await.unwrap();
        ledger.set_multiplier(key(1, 2), 10).await.unwrap();

        let gain = ledger.add_xp(key(1, 2), 25, now).await.unwrap();
        assert_eq!(gain.levels_gained, 2);

        let record = ledger.fetch(key(1, 2)).await.unwrap();
        assert_eq!((record.xp, record.xp_max, record.level), (50, 300, 3));
    }

    #[tokio::test]
    async fn multiplier_is_validated() {
        let ledger = ledger().await;
        ledger.create_if_absent(key(1, 2), Utc::now()).await.unwrap();

        for bad in [0, -4, MAX_MULTIPLIER + 1] {
            assert!(matches!(
                ledger.set_multiplier(key(1, 2), bad).await,
                Err(LevelError::Validation(_))
            ));
        }
        assert_eq!(ledger.fetch(key(1, 2)).await.unwrap().multiplier, 1);
        assert!(matches!(
            ledger.set_multiplier(key(1, 3), 2).await,
            Err(LevelError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn leaderboard_orders_by_level_with_stable_ties() {
        let ledger = ledger().await;
        for (user, level) in [(10, 5), (11, 3), (12, 5), (13, 1)] {
            force_level(&ledger, key(1, user), level).await;
        }
        // another guild never leaks in
        force_level(&ledger, key(2, 99), 50).await;

        let board = ledger.leaderboard(GuildId::new(1)).await.unwrap();
        let order: Vec<(i64, i64)> = board.iter().map(|e| (e.user_id, e.level)).collect();
        assert_eq!(order, vec![(10, 5), (12, 5), (11, 3), (13, 1)]);
    }

    #[tokio::test]
    async fn leaderboard_is_capped() {
        let ledger = ledger().await;
        for user in 1..=15 {
            force_level(&ledger, key(1, user), user as i64).await;
        }

        let board = ledger.leaderboard(GuildId::new(1)).await.unwrap();
        assert_eq!(board.len(), LEADERBOARD_SIZE as usize);
        assert_eq!(board[0].user_id, 15);
    }

    #[tokio::test]
    async fn empty_guild_has_no_leaderboard() {
        let ledger = ledger().await;
        assert!(matches!(
            ledger.leaderboard(GuildId::new(1)).await,
            Err(LevelError::NotFound("Guild"))
        ));
        assert!(matches!(
            ledger.rank(key(1, 2)).await,
            Err(LevelError::NotFound("Guild"))
        ));
    }

    #[tokio::test]
    async fn rank_covers_the_whole_guild() {
        let ledger = ledger().await;
        for user in 1..=12 {
            force_level(&ledger, key(1, user), 100 - user as i64).await;
        }

        assert_eq!(ledger.rank(key(1, 1)).await.unwrap(), 1);
        // outside the top ten, still ranked
        assert_eq!(ledger.rank(key(1, 12)).await.unwrap(), 12);
        assert!(matches!(
            ledger.rank(key(1, 500)).await,
            Err(LevelError::NotFound("User"))
        ));
    }

    #[tokio::test]
    async fn rank_is_stable_when_a_lower_member_joins() {
        let ledger = ledger().await;
        force_level(&ledger, key(1, 1), 9).await;
        force_level(&ledger, key(1, 2), 4).await;
        assert_eq!(ledger.rank(key(1, 1)).await.unwrap(), 1);
        assert_eq!(ledger.rank(key(1, 2)).await.unwrap(), 2);

        force_level(&ledger, key(1, 3), 1).await;
        assert_eq!(ledger.rank(key(1, 1)).await.unwrap(), 1);
        assert_eq!(ledger.rank(key(1, 2)).await.unwrap(), 2);
        assert_eq!(ledger.rank(key(1, 3)).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn xp_breaks_level_ties() {
        let ledger = ledger().await;
        let now = Utc::now();
        force_level(&ledger, key(1, 1), 2).await;
        force_level(&ledger, key(1, 2), 2).await;
        ledger.add_xp(key(1, 2), 5, now).await.unwrap();

        assert_eq!(ledger.rank(key(1, 2)).await.unwrap(), 1);
        assert_eq!(ledger.rank(key(1, 1)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_then_recreate_starts_over() {
        let ledger = ledger().await;
        let now = Utc::now();
        ledger.create_if_absent(key(1, 2), now).await.unwrap();
        ledger.add_xp(key(1, 2), 20, now).await.unwrap();

        ledger.delete(key(1, 2)).await.unwrap();
        assert!(ledger.get(key(1, 2)).await.unwrap().is_none());

        ledger.create_if_absent(key(1, 2), now).await.unwrap();
        assert_eq!(ledger.fetch(key(1, 2)).await.unwrap().xp, 0);
    }

    #[tokio::test]
    async fn export_returns_ranked_guild_records() {
        let ledger = ledger().await;
        force_level(&ledger, key(1, 1), 2).await;
        force_level(&ledger, key(1, 2), 7).await;
        force_level(&ledger, key(3, 3), 1).await;

        let records = ledger.export(GuildId::new(1)).await.unwrap();
        let users: Vec<i64> = records.iter().map(|r| r.user_id).collect();
        assert_eq!(users, vec![2, 1]);
    }
}
