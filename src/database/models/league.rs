use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An FPL classic league tracked by a chat.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct League {
    pub id: String,
    pub chat_id: i64,
    pub league_id: String,
    pub league_name: String,
    pub added_at: String,
}

impl League {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        league_id: &str,
        league_name: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO leagues (id, chat_id, league_id, league_name, added_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(chat_id)
        .bind(league_id)
        .bind(league_name)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(League {
            id,
            chat_id,
            league_id: league_id.to_string(),
            league_name: league_name.to_string(),
            added_at: now,
        })
    }

    pub async fn find_by_chat(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, League>(
            "SELECT id, chat_id, league_id, league_name, added_at
             FROM leagues WHERE chat_id = ? ORDER BY added_at",
        )
        .bind(chat_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find(
        pool: &sqlx::SqlitePool,
        chat_id: i64,
        league_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, League>(
            "SELECT id, chat_id, league_id, league_name, added_at
             FROM leagues WHERE chat_id = ? AND league_id = ?",
        )
        .bind(chat_id)
        .bind(league_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, League>(
            "SELECT id, chat_id, league_id, league_name, added_at FROM leagues ORDER BY chat_id",
        )
        .fetch_all(pool)
        .await
    }
}
