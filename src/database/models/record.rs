use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const RECORD_HIGHEST: &str = "highest";
pub const RECORD_LOWEST: &str = "lowest";

/// Running extremum of gameweek scores per (chat, league). Two rows at most:
/// one `highest`, one `lowest`, replaced in place when beaten.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub chat_id: i64,
    pub league_id: String,
    pub player_name: String,
    pub entry_id: i64,
    pub gameweek: i64,
    pub score: i64,
    pub record_type: String,
    pub recorded_at: String,
}

impl Record {
    /// Compare-and-swap a record row. A new score replaces the stored one
    /// only when it is strictly better for the given record type.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        league_id: &str,
        player_name: &str,
        entry_id: i64,
        gameweek: i64,
        score: i64,
        record_type: &str,
    ) -> Result<bool, sqlx::Error> {
        let existing = sqlx::query_as::<_, Record>(
            "SELECT id, chat_id, league_id, player_name, entry_id, gameweek, score, record_type, recorded_at
             FROM records WHERE chat_id = ? AND league_id = ? AND record_type = ? LIMIT 1",
        )
        .bind(chat_id)
        .bind(league_id)
        .bind(record_type)
        .fetch_optional(pool)
        .await?;

        let now = Utc::now().to_rfc3339();

        match existing {
            Some(record) => {
                let beats = match record_type {
                    RECORD_HIGHEST => score > record.score,
                    RECORD_LOWEST => score < record.score,
                    _ => false,
                };
                if !beats {
                    return Ok(false);
                }
                sqlx::query(
                    "UPDATE records SET player_name = ?, entry_id = ?, gameweek = ?, score = ?, recorded_at = ?
                     WHERE id = ?",
                )
                .bind(player_name)
                .bind(entry_id)
                .bind(gameweek)
                .bind(score)
                .bind(&now)
                .bind(&record.id)
                .execute(pool)
                .await?;
                Ok(true)
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO records (id, chat_id, league_id, player_name, entry_id, gameweek, score, record_type, recorded_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(chat_id)
                .bind(league_id)
                .bind(player_name)
                .bind(entry_id)
                .bind(gameweek)
                .bind(score)
                .bind(record_type)
                .bind(&now)
                .execute(pool)
                .await?;
                Ok(true)
            }
        }
    }

    pub async fn find_by_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        league_id: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match league_id {
            Some(league_id) => {
                sqlx::query_as::<_, Record>(
                    "SELECT id, chat_id, league_id, player_name, entry_id, gameweek, score, record_type, recorded_at
                     FROM records WHERE chat_id = ? AND league_id = ?",
                )
                .bind(chat_id)
                .bind(league_id)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Record>(
                    "SELECT id, chat_id, league_id, player_name, entry_id, gameweek, score, record_type, recorded_at
                     FROM records WHERE chat_id = ?",
                )
                .bind(chat_id)
                .fetch_all(pool)
                .await
            }
        }
    }
}
