//! Last Man Standing rules engine.
//!
//! Pure functions over an explicitly loaded [`CompetitionState`]: the caller
//! fetches state from the store, invokes an operation here, and commits the
//! returned decision back in a single transaction. No I/O, no clocks.

use std::collections::HashMap;

use crate::database::models::{Competition, Pick, Player};
use crate::engine::error::{EngineError, StateConflict, ValidationError};

/// Full state of one competition, loaded for a single engine call.
#[derive(Debug, Clone)]
pub struct CompetitionState {
    pub competition: Competition,
    pub players: Vec<Player>,
    pub picks: Vec<Pick>,
    /// Teams given up via /changepick; they stay burned for the rest of the
    /// competition.
    pub burned_teams: Vec<(String, String)>, // (player_id, team_id)
}

/// Match result as reported by the results provider, after strict tagging
/// at the boundary. A draw eliminates just like a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Win,
    Loss,
    Draw,
}

/// What happens to alive players who never submitted a pick for the round.
/// The original game treats a missed deadline as elimination; `Skip` keeps
/// them alive for the next round instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForfeitPolicy {
    Eliminate,
    Skip,
}

/// An accepted pick, ready to be persisted as a pending Pick row.
#[derive(Debug, Clone, PartialEq)]
pub struct PickDecision {
    pub competition_id: String,
    pub player_id: String,
    pub round_number: i64,
    pub team_id: String,
    pub team_name: String,
}

/// An accepted pick change: the existing pending pick is rewritten and the
/// old team is burned.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeDecision {
    pub competition_id: String,
    pub player_id: String,
    pub pick_id: String,
    pub old_team_id: String,
    pub old_team_name: String,
    pub new_team_id: String,
    pub new_team_name: String,
}

/// Pick outcome to write when a round resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedOutcome {
    Win,
    LossOrDraw,
}

/// Where the competition goes after a resolved round.
#[derive(Debug, Clone, PartialEq)]
pub enum CompetitionAdvance {
    NextRound(i64),
    /// `winner: None` is the explicit no-winner (rollover) outcome when the
    /// last contenders all went down together.
    Finished { winner: Option<String> },
}

/// The complete, atomic result of resolving one round. Either all of it is
/// committed or none of it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResolution {
    pub competition_id: String,
    pub round_number: i64,
    pub pick_outcomes: Vec<(String, ResolvedOutcome)>, // (pick_id, outcome)
    /// Eliminated because their team lost or drew.
    pub eliminated: Vec<String>,
    /// Eliminated for submitting no pick at all (distinct code path from a
    /// losing pick, per ForfeitPolicy::Eliminate).
    pub forfeited: Vec<String>,
    pub advance: CompetitionAdvance,
}

/// Validate a candidate pick against the player's history and the current
/// round. Returns the row to insert; the only side effect the caller should
/// apply is that single Pick row.
pub fn submit_pick(
    state: &CompetitionState,
    telegram_user_id: i64,
    round_number: i64,
    team_id: &str,
    team_name: &str,
) -> Result<PickDecision, EngineError> {
    let player = alive_player(state, telegram_user_id)?;
    check_round(state, round_number)?;

    if state
        .picks
        .iter()
        .any(|p| p.player_id == player.id && p.round_number == round_number)
    {
        return Err(ValidationError::PickAlreadyMade {
            round: round_number,
        }
        .into());
    }

    check_team_unused(state, &player.id, team_id, team_name)?;

    Ok(PickDecision {
        competition_id: state.competition.id.clone(),
        player_id: player.id.clone(),
        round_number,
        team_id: team_id.to_string(),
        team_name: team_name.to_string(),
    })
}

/// Swap a still-pending pick for a new team. The abandoned team is burned,
/// so the uniqueness rule keeps covering it.
pub fn change_pick(
    state: &CompetitionState,
    telegram_user_id: i64,
    round_number: i64,
    new_team_id: &str,
    new_team_name: &str,
) -> Result<ChangeDecision, EngineError> {
    let player = alive_player(state, telegram_user_id)?;
    check_round(state, round_number)?;

    let current = state
        .picks
        .iter()
        .find(|p| p.player_id == player.id && p.round_number == round_number)
        .ok_or(ValidationError::NoPickToChange {
            round: round_number,
        })?;

    if !current.is_pending() {
        return Err(StateConflict::RoundAlreadyResolved {
            round: round_number,
        }
        .into());
    }

    check_team_unused(state, &player.id, new_team_id, new_team_name)?;

    Ok(ChangeDecision {
        competition_id: state.competition.id.clone(),
        player_id: player.id.clone(),
        pick_id: current.id.clone(),
        old_team_id: current.team_id.clone(),
        old_team_name: current.team_name.clone(),
        new_team_id: new_team_id.to_string(),
        new_team_name: new_team_name.to_string(),
    })
}

/// Apply a round's results to every pick and produce the full state
/// transition for the round: pick outcomes, eliminations, forfeits and the
/// competition advance.
///
/// Fails without partial effect when results are incomplete, and rejects a
/// second resolution of the same round as a state conflict.
pub fn resolve_round(
    state: &CompetitionState,
    round_number: i64,
    results: &HashMap<String, MatchOutcome>,
    forfeit: ForfeitPolicy,
) -> Result<RoundResolution, EngineError> {
    if !state.competition.is_active() {
        return Err(ValidationError::CompetitionFinished.into());
    }
    // A future round has not happened; only a past round is "already
    // resolved".
    if round_number > state.competition.current_round {
        return Err(ValidationError::RoundMismatch {
            submitted: round_number,
            current: state.competition.current_round,
        }
        .into());
    }
    if round_number < state.competition.current_round {
        return Err(StateConflict::RoundAlreadyResolved {
            round: round_number,
        }
        .into());
    }

    let round_picks: Vec<&Pick> = state
        .picks
        .iter()
        .filter(|p| p.round_number == round_number)
        .collect();

    // A non-pending pick means a previous resolution already got through.
    if round_picks.iter().any(|p| !p.is_pending()) {
        return Err(StateConflict::RoundAlreadyResolved {
            round: round_number,
        }
        .into());
    }

    // Validate the result set before touching anything, so the resolution
    // is all-or-nothing.
    for pick in &round_picks {
        if !results.contains_key(&pick.team_id) {
            return Err(EngineError::MissingResult {
                team: pick.team_name.clone(),
            });
        }
    }

    let mut pick_outcomes = Vec::with_capacity(round_picks.len());
    let mut eliminated = Vec::new();

    for pick in &round_picks {
        match results[&pick.team_id] {
            MatchOutcome::Win => pick_outcomes.push((pick.id.clone(), ResolvedOutcome::Win)),
            MatchOutcome::Loss | MatchOutcome::Draw => {
                pick_outcomes.push((pick.id.clone(), ResolvedOutcome::LossOrDraw));
                eliminated.push(pick.player_id.clone());
            }
        }
    }

    let mut forfeited = Vec::new();
    if forfeit == ForfeitPolicy::Eliminate {
        for player in state.players.iter().filter(|p| p.is_alive()) {
            let picked = round_picks.iter().any(|p| p.player_id == player.id);
            if !picked {
                forfeited.push(player.id.clone());
            }
        }
    }

    let survivors: Vec<&Player> = state
        .players
        .iter()
        .filter(|p| {
            p.is_alive() && !eliminated.contains(&p.id) && !forfeited.contains(&p.id)
        })
        .collect();

    let advance = match survivors.len() {
        0 => CompetitionAdvance::Finished { winner: None },
        1 => CompetitionAdvance::Finished {
            winner: Some(survivors[0].id.clone()),
        },
        _ => CompetitionAdvance::NextRound(round_number + 1),
    };

    Ok(RoundResolution {
        competition_id: state.competition.id.clone(),
        round_number,
        pick_outcomes,
        eliminated,
        forfeited,
        advance,
    })
}

fn alive_player<'a>(
    state: &'a CompetitionState,
    telegram_user_id: i64,
) -> Result<&'a Player, EngineError> {
    if !state.competition.is_active() {
        return Err(ValidationError::CompetitionFinished.into());
    }
    let player = state
        .players
        .iter()
        .find(|p| p.telegram_user_id == telegram_user_id)
        .ok_or(ValidationError::PlayerNotFound)?;
    if !player.is_alive() {
        return Err(ValidationError::PlayerEliminated.into());
    }
    Ok(player)
}

fn check_round(state: &CompetitionState, round_number: i64) -> Result<(), EngineError> {
    if round_number != state.competition.current_round {
        return Err(ValidationError::RoundMismatch {
            submitted: round_number,
            current: state.competition.current_round,
        }
        .into());
    }
    Ok(())
}

fn check_team_unused(
    state: &CompetitionState,
    player_id: &str,
    team_id: &str,
    team_name: &str,
) -> Result<(), EngineError> {
    let picked = state
        .picks
        .iter()
        .any(|p| p.player_id == player_id && p.team_id == team_id);
    let burned = state
        .burned_teams
        .iter()
        .any(|(pid, tid)| pid == player_id && tid == team_id);
    if picked || burned {
        return Err(ValidationError::TeamAlreadyUsed {
            team: team_name.to_string(),
        }
        .into());
    }
    Ok(())
}
