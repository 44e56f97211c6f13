//! Commits engine decisions back to storage.
//!
//! The engines hand back value types (`PickDecision`, `RoundResolution`,
//! `Escalation`); this module is the only place that turns them into SQL.
//! Multi-row transitions go through a single transaction so a round can
//! never be left half resolved.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::database::models::{
    BurnedTeam, Competition, Pick, SpeechReminder, OUTCOME_LOSS_OR_DRAW, OUTCOME_WIN,
};
use crate::engine::elimination::{
    ChangeDecision, CompetitionAdvance, CompetitionState, PickDecision, ResolvedOutcome,
    RoundResolution,
};
use crate::engine::reminder::Escalation;

/// Load everything the elimination engine needs for one call. Returns None
/// when the chat has no active competition.
pub async fn load_competition_state(
    pool: &SqlitePool,
    chat_id: i64,
) -> Result<Option<CompetitionState>> {
    let Some(competition) = Competition::find_active_by_chat(pool, chat_id).await? else {
        return Ok(None);
    };

    let players = crate::database::models::Player::find_by_competition(pool, &competition.id).await?;
    let picks = Pick::find_by_competition(pool, &competition.id).await?;
    let burned = BurnedTeam::find_by_competition(pool, &competition.id)
        .await?
        .into_iter()
        .map(|b| (b.player_id, b.team_id))
        .collect();

    Ok(Some(CompetitionState {
        competition,
        players,
        picks,
        burned_teams: burned,
    }))
}

/// Persist an accepted pick. Single row, no other side effects.
pub async fn apply_pick(pool: &SqlitePool, decision: &PickDecision) -> Result<Pick> {
    let pick = Pick::create(
        pool,
        &decision.competition_id,
        &decision.player_id,
        decision.round_number,
        &decision.team_id,
        &decision.team_name,
    )
    .await?;
    Ok(pick)
}

/// Rewrite a pending pick and burn the abandoned team, atomically.
pub async fn apply_change(pool: &SqlitePool, decision: &ChangeDecision) -> Result<()> {
    let mut tx = pool.begin().await?;

    let burned = BurnedTeam::new_row(
        &decision.competition_id,
        &decision.player_id,
        &decision.old_team_id,
        &decision.old_team_name,
    );
    sqlx::query(
        "INSERT INTO burned_teams (id, competition_id, player_id, team_id, team_name, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&burned.id)
    .bind(&burned.competition_id)
    .bind(&burned.player_id)
    .bind(&burned.team_id)
    .bind(&burned.team_name)
    .bind(&burned.created_at)
    .execute(&mut tx)
    .await?;

    sqlx::query("UPDATE picks SET team_id = ?, team_name = ? WHERE id = ?")
        .bind(&decision.new_team_id)
        .bind(&decision.new_team_name)
        .bind(&decision.pick_id)
        .execute(&mut tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Commit a resolved round in one transaction: pick outcomes, eliminations,
/// forfeits and the competition advance all land together or not at all.
pub async fn apply_resolution(pool: &SqlitePool, resolution: &RoundResolution) -> Result<()> {
    let mut tx = pool.begin().await?;

    for (pick_id, outcome) in &resolution.pick_outcomes {
        let outcome_str = match outcome {
            ResolvedOutcome::Win => OUTCOME_WIN,
            ResolvedOutcome::LossOrDraw => OUTCOME_LOSS_OR_DRAW,
        };
        sqlx::query("UPDATE picks SET outcome = ? WHERE id = ?")
            .bind(outcome_str)
            .bind(pick_id)
            .execute(&mut tx)
            .await?;
    }

    for player_id in resolution.eliminated.iter().chain(&resolution.forfeited) {
        sqlx::query("UPDATE players SET status = 'eliminated', eliminated_round = ? WHERE id = ?")
            .bind(resolution.round_number)
            .bind(player_id)
            .execute(&mut tx)
            .await?;
    }

    match &resolution.advance {
        CompetitionAdvance::NextRound(next) => {
            sqlx::query("UPDATE competitions SET current_round = ? WHERE id = ?")
                .bind(next)
                .bind(&resolution.competition_id)
                .execute(&mut tx)
                .await?;
        }
        CompetitionAdvance::Finished { winner } => {
            let ended_at = Utc::now().to_rfc3339();
            sqlx::query(
                "UPDATE competitions SET status = 'finished', winner_id = ?, no_winner = ?, ended_at = ?
                 WHERE id = ?",
            )
            .bind(winner.as_deref())
            .bind(winner.is_none())
            .bind(&ended_at)
            .bind(&resolution.competition_id)
            .execute(&mut tx)
            .await?;
        }
    }

    tx.commit().await?;
    info!(
        "Resolved round {} for competition {}: {} eliminated, {} forfeited",
        resolution.round_number,
        resolution.competition_id,
        resolution.eliminated.len(),
        resolution.forfeited.len()
    );
    Ok(())
}

/// Record a gameweek winner's speech obligation together with the
/// processed-gameweek marker, in one transaction.
pub async fn record_winner(
    pool: &SqlitePool,
    chat_id: i64,
    league_id: &str,
    gameweek: i64,
    winner_name: &str,
    winner_entry_id: i64,
    score: i64,
) -> Result<SpeechReminder> {
    let existing = SpeechReminder::find(pool, chat_id, league_id, gameweek).await?;
    crate::engine::reminder::check_record_winner(existing.as_ref(), league_id, gameweek)?;

    let reminder = SpeechReminder::create(
        pool,
        chat_id,
        league_id,
        gameweek,
        winner_name,
        winner_entry_id,
        score,
        Utc::now(),
    )
    .await?;
    Ok(reminder)
}

/// Bump stored escalation levels after a sweep. Each event is a single-step
/// increment, so levels stay monotonic even if events are applied in order.
pub async fn apply_escalations(pool: &SqlitePool, escalations: &[Escalation]) -> Result<()> {
    for escalation in escalations {
        sqlx::query(
            "UPDATE speech_reminders SET escalation_level = ?
             WHERE id = ? AND escalation_level < ?",
        )
        .bind(escalation.level)
        .bind(&escalation.reminder_id)
        .bind(escalation.level)
        .execute(pool)
        .await?;
    }
    Ok(())
}

/// Terminal completion of a speech reminder.
pub async fn mark_speech_done(
    pool: &SqlitePool,
    chat_id: i64,
    league_id: &str,
    gameweek: i64,
) -> Result<()> {
    let reminder = SpeechReminder::find(pool, chat_id, league_id, gameweek).await?;
    crate::engine::reminder::check_mark_done(reminder.as_ref(), league_id, gameweek)?;

    sqlx::query(
        "UPDATE speech_reminders SET status = 'done' WHERE chat_id = ? AND league_id = ? AND gameweek = ?",
    )
    .bind(chat_id)
    .bind(league_id)
    .bind(gameweek)
    .execute(pool)
    .await?;
    Ok(())
}

/// Register a player, creating the chat's competition first when this is the
/// very first registration.
pub async fn register_player(
    pool: &SqlitePool,
    chat_id: i64,
    telegram_user_id: i64,
    display_name: &str,
    season: i64,
) -> Result<(Competition, crate::database::models::Player, bool)> {
    let competition = match Competition::find_active_by_chat(pool, chat_id).await? {
        Some(c) => c,
        None => Competition::create(pool, chat_id, season).await?,
    };

    if let Some(player) =
        crate::database::models::Player::find(pool, &competition.id, telegram_user_id).await?
    {
        return Ok((competition, player, false));
    }

    let player =
        crate::database::models::Player::create(pool, &competition.id, telegram_user_id, display_name)
            .await?;
    Ok((competition, player, true))
}
