use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A team a player gave up via /changepick. Burned teams count against the
/// once-per-competition uniqueness rule exactly like picked teams.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct BurnedTeam {
    pub id: String,
    pub competition_id: String,
    pub player_id: String,
    pub team_id: String,
    pub team_name: String,
    pub created_at: String,
}

impl BurnedTeam {
    pub async fn find_by_competition(
        pool: &sqlx::SqlitePool,
        competition_id: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, BurnedTeam>(
            "SELECT id, competition_id, player_id, team_id, team_name, created_at
             FROM burned_teams WHERE competition_id = ?",
        )
        .bind(competition_id)
        .fetch_all(pool)
        .await
    }

    pub(crate) fn new_row(competition_id: &str, player_id: &str, team_id: &str, team_name: &str) -> Self {
        BurnedTeam {
            id: Uuid::new_v4().to_string(),
            competition_id: competition_id.to_string(),
            player_id: player_id.to_string(),
            team_id: team_id.to_string(),
            team_name: team_name.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
