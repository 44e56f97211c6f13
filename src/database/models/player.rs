use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_ALIVE: &str = "alive";
pub const STATUS_ELIMINATED: &str = "eliminated";

/// A participant in one competition. Rows are never deleted; eliminated
/// players stay for history.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub competition_id: String,
    pub telegram_user_id: i64,
    pub display_name: String,
    pub status: String,
    pub eliminated_round: Option<i64>,
    pub created_at: String,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.status == STATUS_ALIVE
    }

    pub async fn create(
        pool: &sqlx::SqlitePool,
        competition_id: &str,
        telegram_user_id: i64,
        display_name: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO players (id, competition_id, telegram_user_id, display_name, status, created_at)
            VALUES (?, ?, ?, ?, 'alive', ?)
            "#,
        )
        .bind(&id)
        .bind(competition_id)
        .bind(telegram_user_id)
        .bind(display_name)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(Player {
            id,
            competition_id: competition_id.to_string(),
            telegram_user_id,
            display_name: display_name.to_string(),
            status: STATUS_ALIVE.to_string(),
            eliminated_round: None,
            created_at: now,
        })
    }

    pub async fn find(
        pool: &sqlx::SqlitePool,
        competition_id: &str,
        telegram_user_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Player>(
            "SELECT id, competition_id, telegram_user_id, display_name, status, eliminated_round, created_at
             FROM players WHERE competition_id = ? AND telegram_user_id = ?",
        )
        .bind(competition_id)
        .bind(telegram_user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_competition(
        pool: &sqlx::SqlitePool,
        competition_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Player>(
            "SELECT id, competition_id, telegram_user_id, display_name, status, eliminated_round, created_at
             FROM players WHERE competition_id = ? ORDER BY created_at",
        )
        .bind(competition_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        player_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Player>(
            "SELECT id, competition_id, telegram_user_id, display_name, status, eliminated_round, created_at
             FROM players WHERE id = ?",
        )
        .bind(player_id)
        .fetch_optional(pool)
        .await
    }
}
