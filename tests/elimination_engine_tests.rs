use std::collections::HashMap;

use chrono::Utc;
use footy_bots::database::models::{Competition, Pick, Player};
use footy_bots::engine::elimination::{
    change_pick, resolve_round, submit_pick, CompetitionAdvance, CompetitionState, ForfeitPolicy,
    MatchOutcome, ResolvedOutcome,
};
use footy_bots::engine::{EngineError, StateConflict, ValidationError};

fn competition(current_round: i64) -> Competition {
    Competition {
        id: "comp-1".to_string(),
        chat_id: -100123,
        season: 2025,
        current_round,
        status: "active".to_string(),
        winner_id: None,
        no_winner: false,
        created_at: Utc::now().to_rfc3339(),
        ended_at: None,
    }
}

fn player(id: &str, name: &str) -> Player {
    Player {
        id: id.to_string(),
        competition_id: "comp-1".to_string(),
        telegram_user_id: id.bytes().map(|b| b as i64).sum(),
        display_name: name.to_string(),
        status: "alive".to_string(),
        eliminated_round: None,
        created_at: Utc::now().to_rfc3339(),
    }
}

fn pick(id: &str, player_id: &str, round: i64, team_id: &str) -> Pick {
    Pick {
        id: id.to_string(),
        competition_id: "comp-1".to_string(),
        player_id: player_id.to_string(),
        round_number: round,
        team_id: team_id.to_string(),
        team_name: format!("Team {}", team_id),
        outcome: "pending".to_string(),
        created_at: Utc::now().to_rfc3339(),
    }
}

fn state_with(players: Vec<Player>, picks: Vec<Pick>, round: i64) -> CompetitionState {
    CompetitionState {
        competition: competition(round),
        players,
        picks,
        burned_teams: Vec::new(),
    }
}

#[test]
fn accepts_a_valid_pick() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let state = state_with(vec![alice], vec![], 1);

    let decision = submit_pick(&state, user_id, 1, "42", "Arsenal").unwrap();
    assert_eq!(decision.player_id, "alice");
    assert_eq!(decision.round_number, 1);
    assert_eq!(decision.team_id, "42");
}

#[test]
fn rejects_pick_for_wrong_round() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let state = state_with(vec![alice], vec![], 2);

    let err = submit_pick(&state, user_id, 1, "42", "Arsenal").unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::RoundMismatch {
            submitted: 1,
            current: 2
        })
    );

    // Future rounds are just as invalid as past ones.
    let err = submit_pick(&state, user_id, 3, "42", "Arsenal").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::RoundMismatch { .. })
    ));
}

#[test]
fn rejects_duplicate_pick_for_round() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let state = state_with(vec![alice], vec![pick("p1", "alice", 1, "42")], 1);

    let err = submit_pick(&state, user_id, 1, "49", "Chelsea").unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::PickAlreadyMade { round: 1 })
    );
}

// Scenario: a team used in round 1 stays unusable in every later round.
#[test]
fn rejects_reused_team_in_later_round() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let mut used = pick("p1", "alice", 1, "42");
    used.outcome = "win".to_string();
    let state = state_with(vec![alice], vec![used], 3);

    let err = submit_pick(&state, user_id, 3, "42", "Arsenal").unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::TeamAlreadyUsed {
            team: "Arsenal".to_string()
        })
    );
}

#[test]
fn burned_team_counts_as_used() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let mut state = state_with(vec![alice], vec![], 1);
    state
        .burned_teams
        .push(("alice".to_string(), "42".to_string()));

    let err = submit_pick(&state, user_id, 1, "42", "Arsenal").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::TeamAlreadyUsed { .. })
    ));
}

#[test]
fn eliminated_player_cannot_pick() {
    let mut bob = player("bob", "Bob");
    bob.status = "eliminated".to_string();
    bob.eliminated_round = Some(1);
    let user_id = bob.telegram_user_id;
    let state = state_with(vec![bob], vec![], 2);

    let err = submit_pick(&state, user_id, 2, "42", "Arsenal").unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::PlayerEliminated)
    );
}

#[test]
fn unregistered_user_cannot_pick() {
    let state = state_with(vec![player("alice", "Alice")], vec![], 1);
    let err = submit_pick(&state, 999_999, 1, "42", "Arsenal").unwrap_err();
    assert_eq!(err, EngineError::Validation(ValidationError::PlayerNotFound));
}

#[test]
fn finished_competition_rejects_picks() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let mut state = state_with(vec![alice], vec![], 1);
    state.competition.status = "finished".to_string();

    let err = submit_pick(&state, user_id, 1, "42", "Arsenal").unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::CompetitionFinished)
    );
}

// Alice picks a winner, Bob's team loses, Carol's team draws. Loss and draw
// both eliminate; with one survivor left the competition ends with Alice as
// winner.
#[test]
fn resolves_round_with_mixed_outcomes() {
    let players = vec![
        player("alice", "Alice"),
        player("bob", "Bob"),
        player("carol", "Carol"),
    ];
    let picks = vec![
        pick("p1", "alice", 1, "X"),
        pick("p2", "bob", 1, "Y"),
        pick("p3", "carol", 1, "Z"),
    ];
    let state = state_with(players, picks, 1);

    let results = HashMap::from([
        ("X".to_string(), MatchOutcome::Win),
        ("Y".to_string(), MatchOutcome::Loss),
        ("Z".to_string(), MatchOutcome::Draw),
    ]);

    let resolution = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate).unwrap();

    assert_eq!(resolution.eliminated, vec!["bob".to_string(), "carol".to_string()]);
    assert!(resolution.forfeited.is_empty());
    assert_eq!(
        resolution.advance,
        CompetitionAdvance::Finished {
            winner: Some("alice".to_string())
        }
    );
    assert!(resolution
        .pick_outcomes
        .contains(&("p1".to_string(), ResolvedOutcome::Win)));
    assert!(resolution
        .pick_outcomes
        .contains(&("p2".to_string(), ResolvedOutcome::LossOrDraw)));
    assert!(resolution
        .pick_outcomes
        .contains(&("p3".to_string(), ResolvedOutcome::LossOrDraw)));
}

#[test]
fn round_advances_by_one_with_two_or_more_survivors() {
    let players = vec![
        player("alice", "Alice"),
        player("bob", "Bob"),
        player("carol", "Carol"),
    ];
    let picks = vec![
        pick("p1", "alice", 1, "X"),
        pick("p2", "bob", 1, "Y"),
        pick("p3", "carol", 1, "Z"),
    ];
    let state = state_with(players, picks, 1);

    let results = HashMap::from([
        ("X".to_string(), MatchOutcome::Win),
        ("Y".to_string(), MatchOutcome::Win),
        ("Z".to_string(), MatchOutcome::Loss),
    ]);

    let resolution = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate).unwrap();
    assert_eq!(resolution.advance, CompetitionAdvance::NextRound(2));
}

#[test]
fn simultaneous_elimination_finishes_with_no_winner() {
    let players = vec![player("alice", "Alice"), player("bob", "Bob")];
    let picks = vec![pick("p1", "alice", 1, "X"), pick("p2", "bob", 1, "Y")];
    let state = state_with(players, picks, 1);

    let results = HashMap::from([
        ("X".to_string(), MatchOutcome::Draw),
        ("Y".to_string(), MatchOutcome::Loss),
    ]);

    let resolution = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate).unwrap();
    assert_eq!(
        resolution.advance,
        CompetitionAdvance::Finished { winner: None }
    );
}

#[test]
fn missing_pick_is_a_forfeit_under_eliminate_policy() {
    let players = vec![player("alice", "Alice"), player("bob", "Bob")];
    let picks = vec![pick("p1", "alice", 1, "X")];
    let state = state_with(players, picks, 1);

    let results = HashMap::from([("X".to_string(), MatchOutcome::Win)]);

    let resolution = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate).unwrap();
    assert!(resolution.eliminated.is_empty());
    assert_eq!(resolution.forfeited, vec!["bob".to_string()]);
    assert_eq!(
        resolution.advance,
        CompetitionAdvance::Finished {
            winner: Some("alice".to_string())
        }
    );
}

#[test]
fn missing_pick_is_skipped_under_skip_policy() {
    let players = vec![player("alice", "Alice"), player("bob", "Bob")];
    let picks = vec![pick("p1", "alice", 1, "X")];
    let state = state_with(players, picks, 1);

    let results = HashMap::from([("X".to_string(), MatchOutcome::Win)]);

    let resolution = resolve_round(&state, 1, &results, ForfeitPolicy::Skip).unwrap();
    assert!(resolution.forfeited.is_empty());
    // Bob sat the round out but stays in, so the game goes on.
    assert_eq!(resolution.advance, CompetitionAdvance::NextRound(2));
}

#[test]
fn incomplete_results_fail_without_any_effect() {
    let players = vec![player("alice", "Alice"), player("bob", "Bob")];
    let picks = vec![pick("p1", "alice", 1, "X"), pick("p2", "bob", 1, "Y")];
    let state = state_with(players, picks, 1);

    // No result for Y.
    let results = HashMap::from([("X".to_string(), MatchOutcome::Win)]);

    let err = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate).unwrap_err();
    assert_eq!(
        err,
        EngineError::MissingResult {
            team: "Team Y".to_string()
        }
    );
}

// Scenario: a second resolution of the same round is rejected, so nobody can
// be eliminated twice or the round advanced twice.
#[test]
fn second_resolution_of_same_round_is_a_conflict() {
    let players = vec![player("alice", "Alice"), player("bob", "Bob")];
    let mut resolved = pick("p1", "alice", 1, "X");
    resolved.outcome = "win".to_string();
    let picks = vec![resolved, pick("p2", "bob", 1, "Y")];
    let state = state_with(players, picks, 1);

    let results = HashMap::from([
        ("X".to_string(), MatchOutcome::Win),
        ("Y".to_string(), MatchOutcome::Loss),
    ]);

    let err = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate).unwrap_err();
    assert_eq!(
        err,
        EngineError::StateConflict(StateConflict::RoundAlreadyResolved { round: 1 })
    );
}

#[test]
fn resolving_a_past_round_is_a_conflict() {
    let players = vec![player("alice", "Alice")];
    let state = state_with(players, vec![], 3);

    let results = HashMap::new();
    let err = resolve_round(&state, 2, &results, ForfeitPolicy::Skip).unwrap_err();
    assert_eq!(
        err,
        EngineError::StateConflict(StateConflict::RoundAlreadyResolved { round: 2 })
    );
}

// A round that has not happened yet is a bad request, not a conflict.
#[test]
fn resolving_a_future_round_is_a_round_mismatch() {
    let players = vec![player("alice", "Alice")];
    let state = state_with(players, vec![], 3);

    let results = HashMap::new();
    let err = resolve_round(&state, 5, &results, ForfeitPolicy::Skip).unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::RoundMismatch {
            submitted: 5,
            current: 3
        })
    );
}

#[test]
fn change_pick_swaps_and_reports_old_team() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let state = state_with(vec![alice], vec![pick("p1", "alice", 1, "42")], 1);

    let decision = change_pick(&state, user_id, 1, "49", "Chelsea").unwrap();
    assert_eq!(decision.pick_id, "p1");
    assert_eq!(decision.old_team_id, "42");
    assert_eq!(decision.new_team_id, "49");
}

#[test]
fn change_pick_requires_an_existing_pick() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let state = state_with(vec![alice], vec![], 1);

    let err = change_pick(&state, user_id, 1, "49", "Chelsea").unwrap_err();
    assert_eq!(
        err,
        EngineError::Validation(ValidationError::NoPickToChange { round: 1 })
    );
}

#[test]
fn change_pick_rejects_resolved_pick() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let mut resolved = pick("p1", "alice", 1, "42");
    resolved.outcome = "win".to_string();
    let state = state_with(vec![alice], vec![resolved], 1);

    let err = change_pick(&state, user_id, 1, "49", "Chelsea").unwrap_err();
    assert!(matches!(err, EngineError::StateConflict(_)));
}

#[test]
fn change_pick_cannot_target_a_used_team() {
    let alice = player("alice", "Alice");
    let user_id = alice.telegram_user_id;
    let mut old = pick("p0", "alice", 1, "42");
    old.outcome = "win".to_string();
    let picks = vec![old, pick("p1", "alice", 2, "49")];
    let state = state_with(vec![alice], picks, 2);

    let err = change_pick(&state, user_id, 2, "42", "Arsenal").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Validation(ValidationError::TeamAlreadyUsed { .. })
    ));
}
