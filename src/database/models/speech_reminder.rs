use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_DONE: &str = "done";

/// The speech owed by a gameweek winner. At most one per
/// (chat, league, gameweek); `done` is terminal.
///
/// `created_at` is a real timestamp rather than a string because the
/// escalation engine does arithmetic on it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SpeechReminder {
    pub id: String,
    pub chat_id: i64,
    pub league_id: String,
    pub gameweek: i64,
    pub winner_name: String,
    pub winner_entry_id: i64,
    pub score: i64,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub escalation_level: i64,
}

impl SpeechReminder {
    pub fn is_pending(&self) -> bool {
        self.status == STATUS_PENDING
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        league_id: &str,
        gameweek: i64,
        winner_name: &str,
        winner_entry_id: i64,
        score: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO speech_reminders
                (id, chat_id, league_id, gameweek, winner_name, winner_entry_id, score, created_at, status, escalation_level)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending', 0)
            "#,
        )
        .bind(&id)
        .bind(chat_id)
        .bind(league_id)
        .bind(gameweek)
        .bind(winner_name)
        .bind(winner_entry_id)
        .bind(score)
        .bind(created_at)
        .execute(pool)
        .await?;

        Ok(SpeechReminder {
            id,
            chat_id,
            league_id: league_id.to_string(),
            gameweek,
            winner_name: winner_name.to_string(),
            winner_entry_id,
            score,
            created_at,
            status: STATUS_PENDING.to_string(),
            escalation_level: 0,
        })
    }

    pub async fn find(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        league_id: &str,
        gameweek: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SpeechReminder>(
            "SELECT id, chat_id, league_id, gameweek, winner_name, winner_entry_id, score, created_at, status, escalation_level
             FROM speech_reminders WHERE chat_id = ? AND league_id = ? AND gameweek = ?",
        )
        .bind(chat_id)
        .bind(league_id)
        .bind(gameweek)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_pending_by_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SpeechReminder>(
            "SELECT id, chat_id, league_id, gameweek, winner_name, winner_entry_id, score, created_at, status, escalation_level
             FROM speech_reminders WHERE chat_id = ? AND status = 'pending' ORDER BY created_at",
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_all_pending(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, SpeechReminder>(
            "SELECT id, chat_id, league_id, gameweek, winner_name, winner_entry_id, score, created_at, status, escalation_level
             FROM speech_reminders WHERE status = 'pending' ORDER BY created_at",
        )
        .fetch_all(pool)
        .await
    }
}
