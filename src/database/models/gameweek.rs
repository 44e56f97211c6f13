use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Idempotence guard for FPL gameweek ingestion: a (chat, league, gameweek)
/// is ingested at most once.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ProcessedGameweek {
    pub id: String,
    pub chat_id: i64,
    pub league_id: String,
    pub gameweek: i64,
    pub processed_at: String,
}

impl ProcessedGameweek {
    pub async fn is_processed(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        league_id: &str,
        gameweek: i64,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM processed_gameweeks WHERE chat_id = ? AND league_id = ? AND gameweek = ?",
        )
        .bind(chat_id)
        .bind(league_id)
        .bind(gameweek)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn mark_processed(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        league_id: &str,
        gameweek: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO processed_gameweeks (id, chat_id, league_id, gameweek, processed_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(chat_id)
        .bind(league_id)
        .bind(gameweek)
        .bind(Utc::now().to_rfc3339())
        .execute(pool)
        .await?;

        Ok(())
    }
}
