use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_FINISHED: &str = "finished";

/// One running Last Man Standing game, scoped to a chat.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Competition {
    pub id: String,
    pub chat_id: i64,
    pub season: i64,
    pub current_round: i64,
    pub status: String,
    pub winner_id: Option<String>,
    pub no_winner: bool,
    pub created_at: String,
    pub ended_at: Option<String>,
}

impl Competition {
    pub fn is_active(&self) -> bool {
        self.status == STATUS_ACTIVE
    }

    pub async fn create(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        season: i64,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO competitions (id, chat_id, season, current_round, status, no_winner, created_at)
            VALUES (?, ?, ?, 1, 'active', FALSE, ?)
            "#,
        )
        .bind(&id)
        .bind(chat_id)
        .bind(season)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, &id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        competition_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Competition>(
            "SELECT id, chat_id, season, current_round, status, winner_id, no_winner, created_at, ended_at
             FROM competitions WHERE id = ?",
        )
        .bind(competition_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_active_by_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Competition>(
            "SELECT id, chat_id, season, current_round, status, winner_id, no_winner, created_at, ended_at
             FROM competitions WHERE chat_id = ? AND status = 'active'
             ORDER BY created_at DESC LIMIT 1",
        )
        .bind(chat_id)
        .fetch_optional(pool)
        .await
    }

    /// Finished competitions for a chat, newest first. Used for /winners and
    /// the rollover count.
    pub async fn find_finished_by_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Competition>(
            "SELECT id, chat_id, season, current_round, status, winner_id, no_winner, created_at, ended_at
             FROM competitions WHERE chat_id = ? AND status = 'finished'
             ORDER BY ended_at DESC",
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await
    }

    /// Consecutive no-winner finishes since the last competition that
    /// produced a winner. Derived rather than stored, so it cannot drift.
    pub async fn rollover_count(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<i64, sqlx::Error> {
        let finished = Self::find_finished_by_chat(pool, chat_id).await?;
        let mut count = 0;
        for competition in finished {
            if competition.no_winner {
                count += 1;
            } else {
                break;
            }
        }
        Ok(count)
    }
}
