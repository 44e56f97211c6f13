//! Speech-reminder escalation engine.
//!
//! Escalation is a pure function of (creation time, now, threshold); the
//! stored `escalation_level` is only a high-water mark used to work out
//! which thresholds were crossed since the last sweep.

use chrono::{DateTime, Duration, Utc};

use crate::database::models::SpeechReminder;
use crate::engine::error::{EngineError, StateConflict, ValidationError};

/// One threshold crossing for one reminder. A sweep that finds a reminder
/// two thresholds overdue emits two of these, so every crossed level is
/// individually observable for notification.
#[derive(Debug, Clone, PartialEq)]
pub struct Escalation {
    pub reminder_id: String,
    pub chat_id: i64,
    pub league_id: String,
    pub gameweek: i64,
    pub winner_name: String,
    pub level: i64,
}

/// How overdue a reminder is, in whole threshold periods.
pub fn escalation_level(created_at: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> i64 {
    let elapsed = now - created_at;
    if elapsed < Duration::zero() || threshold <= Duration::zero() {
        return 0;
    }
    elapsed.num_seconds() / threshold.num_seconds()
}

/// Compute the escalations due across all pending reminders, one event per
/// newly crossed threshold. Every reminder is compared against the same
/// `now`, so the decisions within a sweep are deterministic. Levels never
/// decrease and never skip silently.
pub fn sweep(reminders: &[SpeechReminder], now: DateTime<Utc>, threshold: Duration) -> Vec<Escalation> {
    let mut escalations = Vec::new();
    for reminder in reminders.iter().filter(|r| r.is_pending()) {
        let due = escalation_level(reminder.created_at, now, threshold);
        for level in (reminder.escalation_level + 1)..=due {
            escalations.push(Escalation {
                reminder_id: reminder.id.clone(),
                chat_id: reminder.chat_id,
                league_id: reminder.league_id.clone(),
                gameweek: reminder.gameweek,
                winner_name: reminder.winner_name.clone(),
                level,
            });
        }
    }
    escalations
}

/// Precondition check for recording a gameweek winner: at most one reminder
/// per (league, gameweek). The unique index backs this up at commit time.
pub fn check_record_winner(
    existing: Option<&SpeechReminder>,
    league_id: &str,
    gameweek: i64,
) -> Result<(), EngineError> {
    if existing.is_some() {
        return Err(StateConflict::WinnerAlreadyRecorded {
            league_id: league_id.to_string(),
            gameweek,
        }
        .into());
    }
    Ok(())
}

/// Validate a completion request. `done` is terminal: marking twice fails
/// with an explicit "already done".
pub fn check_mark_done(
    reminder: Option<&SpeechReminder>,
    league_id: &str,
    gameweek: i64,
) -> Result<(), EngineError> {
    match reminder {
        None => Err(ValidationError::ReminderNotFound {
            league_id: league_id.to_string(),
            gameweek,
        }
        .into()),
        Some(r) if !r.is_pending() => Err(ValidationError::ReminderAlreadyDone {
            league_id: league_id.to_string(),
            gameweek,
        }
        .into()),
        Some(_) => Ok(()),
    }
}
