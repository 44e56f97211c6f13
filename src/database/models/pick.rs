use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const OUTCOME_PENDING: &str = "pending";
pub const OUTCOME_WIN: &str = "win";
pub const OUTCOME_LOSS_OR_DRAW: &str = "loss_or_draw";

/// One player's team selection for one round. The outcome column is written
/// exactly once, when the round resolves.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Pick {
    pub id: String,
    pub competition_id: String,
    pub player_id: String,
    pub round_number: i64,
    pub team_id: String,
    pub team_name: String,
    pub outcome: String,
    pub created_at: String,
}

impl Pick {
    pub fn is_pending(&self) -> bool {
        self.outcome == OUTCOME_PENDING
    }

    pub async fn create(
        pool: &sqlx::SqlitePool,
        competition_id: &str,
        player_id: &str,
        round_number: i64,
        team_id: &str,
        team_name: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO picks (id, competition_id, player_id, round_number, team_id, team_name, outcome, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(&id)
        .bind(competition_id)
        .bind(player_id)
        .bind(round_number)
        .bind(team_id)
        .bind(team_name)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(Pick {
            id,
            competition_id: competition_id.to_string(),
            player_id: player_id.to_string(),
            round_number,
            team_id: team_id.to_string(),
            team_name: team_name.to_string(),
            outcome: OUTCOME_PENDING.to_string(),
            created_at: now,
        })
    }

    pub async fn find_by_competition(
        pool: &sqlx::SqlitePool,
        competition_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Pick>(
            "SELECT id, competition_id, player_id, round_number, team_id, team_name, outcome, created_at
             FROM picks WHERE competition_id = ? ORDER BY round_number, created_at",
        )
        .bind(competition_id)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_player(
        pool: &sqlx::SqlitePool,
        competition_id: &str,
        player_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Pick>(
            "SELECT id, competition_id, player_id, round_number, team_id, team_name, outcome, created_at
             FROM picks WHERE competition_id = ? AND player_id = ? ORDER BY round_number",
        )
        .bind(competition_id)
        .bind(player_id)
        .fetch_all(pool)
        .await
    }
}
