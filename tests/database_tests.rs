use std::collections::HashMap;

use anyhow::Result;
use tempfile::{tempdir, TempDir};

use footy_bots::database::connection::DatabaseManager;
use footy_bots::database::models::{
    Competition, Pick, Player, ProcessedGameweek, Record, SpeechReminder, RECORD_HIGHEST,
    RECORD_LOWEST,
};
use footy_bots::database::store;
use footy_bots::engine::elimination::{resolve_round, submit_pick, ForfeitPolicy, MatchOutcome};
use footy_bots::engine::reminder::Escalation;
use footy_bots::engine::{EngineError, StateConflict};

const CHAT_ID: i64 = -100987654;
const SEASON: i64 = 2025;

async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db_manager = DatabaseManager::new(&database_url).await?;
    db_manager.run_migrations().await?;

    Ok((db_manager, temp_dir))
}

#[tokio::test]
async fn test_register_player_creates_competition() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    let (competition, player, created) =
        store::register_player(&db.pool, CHAT_ID, 1001, "Alice", SEASON).await?;
    assert!(created);
    assert_eq!(competition.chat_id, CHAT_ID);
    assert_eq!(competition.current_round, 1);
    assert!(competition.is_active());
    assert_eq!(player.display_name, "Alice");
    assert!(player.is_alive());

    // Second registration for the same user is a no-op.
    let (same_comp, same_player, created) =
        store::register_player(&db.pool, CHAT_ID, 1001, "Alice", SEASON).await?;
    assert!(!created);
    assert_eq!(same_comp.id, competition.id);
    assert_eq!(same_player.id, player.id);

    // A different user joins the same competition.
    let (comp2, _, created) =
        store::register_player(&db.pool, CHAT_ID, 1002, "Bob", SEASON).await?;
    assert!(created);
    assert_eq!(comp2.id, competition.id);

    Ok(())
}

#[tokio::test]
async fn test_pick_roundtrip_through_store() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;
    store::register_player(&db.pool, CHAT_ID, 1001, "Alice", SEASON).await?;

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    let decision = submit_pick(&state, 1001, 1, "42", "Arsenal")?;
    let pick = store::apply_pick(&db.pool, &decision).await?;

    assert_eq!(pick.team_id, "42");
    assert!(pick.is_pending());

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    assert_eq!(state.picks.len(), 1);

    // The duplicate is now visible to the engine.
    let err = submit_pick(&state, 1001, 1, "49", "Chelsea").unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_pick_row_hits_unique_constraint() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;
    let (competition, player, _) =
        store::register_player(&db.pool, CHAT_ID, 1001, "Alice", SEASON).await?;

    Pick::create(&db.pool, &competition.id, &player.id, 1, "42", "Arsenal").await?;
    let dup = Pick::create(&db.pool, &competition.id, &player.id, 1, "49", "Chelsea").await;
    assert!(dup.is_err());

    Ok(())
}

#[tokio::test]
async fn test_resolution_commits_atomically() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;
    store::register_player(&db.pool, CHAT_ID, 1001, "Alice", SEASON).await?;
    store::register_player(&db.pool, CHAT_ID, 1002, "Bob", SEASON).await?;
    store::register_player(&db.pool, CHAT_ID, 1003, "Carol", SEASON).await?;

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    for (user, team, name) in [(1001, "X", "Xtown"), (1002, "Y", "Yville"), (1003, "Z", "Zburgh")] {
        let decision = submit_pick(&state, user, 1, team, name)?;
        store::apply_pick(&db.pool, &decision).await?;
    }

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    let results = HashMap::from([
        ("X".to_string(), MatchOutcome::Win),
        ("Y".to_string(), MatchOutcome::Win),
        ("Z".to_string(), MatchOutcome::Loss),
    ]);
    let resolution = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate)?;
    store::apply_resolution(&db.pool, &resolution).await?;

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    assert_eq!(state.competition.current_round, 2);
    assert!(state.picks.iter().all(|p| !p.is_pending()));

    let alive: Vec<&Player> = state.players.iter().filter(|p| p.is_alive()).collect();
    assert_eq!(alive.len(), 2);
    let carol = state
        .players
        .iter()
        .find(|p| p.display_name == "Carol")
        .unwrap();
    assert!(!carol.is_alive());
    assert_eq!(carol.eliminated_round, Some(1));

    // A replayed resolution of round 1 is rejected by the freshly loaded
    // state before anything touches the database.
    let err = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate).unwrap_err();
    assert_eq!(
        err,
        EngineError::StateConflict(StateConflict::RoundAlreadyResolved { round: 1 })
    );

    Ok(())
}

#[tokio::test]
async fn test_final_round_records_winner() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;
    store::register_player(&db.pool, CHAT_ID, 1001, "Alice", SEASON).await?;
    store::register_player(&db.pool, CHAT_ID, 1002, "Bob", SEASON).await?;

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    for (user, team) in [(1001, "X"), (1002, "Y")] {
        let decision = submit_pick(&state, user, 1, team, team)?;
        store::apply_pick(&db.pool, &decision).await?;
    }

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    let results = HashMap::from([
        ("X".to_string(), MatchOutcome::Win),
        ("Y".to_string(), MatchOutcome::Draw),
    ]);
    let resolution = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate)?;
    store::apply_resolution(&db.pool, &resolution).await?;

    // No active competition remains.
    assert!(store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .is_none());

    let finished = Competition::find_finished_by_chat(&db.pool, CHAT_ID).await?;
    assert_eq!(finished.len(), 1);
    assert!(!finished[0].no_winner);
    assert!(finished[0].winner_id.is_some());
    assert!(finished[0].ended_at.is_some());

    assert_eq!(Competition::rollover_count(&db.pool, CHAT_ID).await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_no_winner_finish_counts_as_rollover() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;
    store::register_player(&db.pool, CHAT_ID, 1001, "Alice", SEASON).await?;

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    let decision = submit_pick(&state, 1001, 1, "X", "Xtown")?;
    store::apply_pick(&db.pool, &decision).await?;

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    let results = HashMap::from([("X".to_string(), MatchOutcome::Loss)]);
    let resolution = resolve_round(&state, 1, &results, ForfeitPolicy::Eliminate)?;
    store::apply_resolution(&db.pool, &resolution).await?;

    let finished = Competition::find_finished_by_chat(&db.pool, CHAT_ID).await?;
    assert!(finished[0].no_winner);
    assert!(finished[0].winner_id.is_none());
    assert_eq!(Competition::rollover_count(&db.pool, CHAT_ID).await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_change_pick_burns_old_team() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;
    store::register_player(&db.pool, CHAT_ID, 1001, "Alice", SEASON).await?;

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    let decision = submit_pick(&state, 1001, 1, "42", "Arsenal")?;
    store::apply_pick(&db.pool, &decision).await?;

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    let change = footy_bots::engine::elimination::change_pick(&state, 1001, 1, "49", "Chelsea")?;
    store::apply_change(&db.pool, &change).await?;

    let state = store::load_competition_state(&db.pool, CHAT_ID)
        .await?
        .unwrap();
    assert_eq!(state.picks.len(), 1);
    assert_eq!(state.picks[0].team_id, "49");
    assert_eq!(state.burned_teams.len(), 1);
    assert_eq!(state.burned_teams[0].1, "42");

    // The burned team is off limits from now on, even for another change.
    let err = footy_bots::engine::elimination::change_pick(&state, 1001, 1, "42", "Arsenal")
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));

    Ok(())
}

#[tokio::test]
async fn test_record_winner_is_unique_per_gameweek() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    let reminder = store::record_winner(&db.pool, CHAT_ID, "314159", 4, "Dave", 7777, 81).await?;
    assert!(reminder.is_pending());
    assert_eq!(reminder.escalation_level, 0);

    let err = store::record_winner(&db.pool, CHAT_ID, "314159", 4, "Eve", 8888, 90)
        .await
        .unwrap_err();
    let engine_err = err.downcast_ref::<EngineError>().unwrap();
    assert_eq!(
        *engine_err,
        EngineError::StateConflict(StateConflict::WinnerAlreadyRecorded {
            league_id: "314159".to_string(),
            gameweek: 4
        })
    );

    // A different gameweek is fine.
    store::record_winner(&db.pool, CHAT_ID, "314159", 5, "Eve", 8888, 90).await?;

    Ok(())
}

#[tokio::test]
async fn test_escalation_levels_are_monotonic() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    let reminder = store::record_winner(&db.pool, CHAT_ID, "314159", 4, "Dave", 7777, 81).await?;

    let escalation = |level| Escalation {
        reminder_id: reminder.id.clone(),
        chat_id: CHAT_ID,
        league_id: "314159".to_string(),
        gameweek: 4,
        winner_name: "Dave".to_string(),
        level,
    };

    store::apply_escalations(&db.pool, &[escalation(1), escalation(2)]).await?;
    let stored = SpeechReminder::find(&db.pool, CHAT_ID, "314159", 4)
        .await?
        .unwrap();
    assert_eq!(stored.escalation_level, 2);

    // A stale sweep cannot lower the stored level.
    store::apply_escalations(&db.pool, &[escalation(1)]).await?;
    let stored = SpeechReminder::find(&db.pool, CHAT_ID, "314159", 4)
        .await?
        .unwrap();
    assert_eq!(stored.escalation_level, 2);

    Ok(())
}

#[tokio::test]
async fn test_mark_speech_done_is_terminal() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;
    store::record_winner(&db.pool, CHAT_ID, "314159", 4, "Dave", 7777, 81).await?;

    store::mark_speech_done(&db.pool, CHAT_ID, "314159", 4).await?;
    let stored = SpeechReminder::find(&db.pool, CHAT_ID, "314159", 4)
        .await?
        .unwrap();
    assert!(!stored.is_pending());
    assert!(SpeechReminder::find_pending_by_chat(&db.pool, CHAT_ID)
        .await?
        .is_empty());

    let err = store::mark_speech_done(&db.pool, CHAT_ID, "314159", 4)
        .await
        .unwrap_err();
    assert!(err.downcast_ref::<EngineError>().is_some());

    Ok(())
}

#[tokio::test]
async fn test_record_update_keeps_the_extremum() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    assert!(Record::update(&db.pool, CHAT_ID, "314159", "Dave", 7777, 1, 70, RECORD_HIGHEST).await?);
    assert!(Record::update(&db.pool, CHAT_ID, "314159", "Eve", 8888, 2, 95, RECORD_HIGHEST).await?);
    // 80 does not beat 95.
    assert!(!Record::update(&db.pool, CHAT_ID, "314159", "Mallory", 9999, 3, 80, RECORD_HIGHEST).await?);

    assert!(Record::update(&db.pool, CHAT_ID, "314159", "Dave", 7777, 1, 70, RECORD_LOWEST).await?);
    assert!(Record::update(&db.pool, CHAT_ID, "314159", "Mallory", 9999, 3, 21, RECORD_LOWEST).await?);
    assert!(!Record::update(&db.pool, CHAT_ID, "314159", "Eve", 8888, 2, 50, RECORD_LOWEST).await?);

    let records = Record::find_by_chat(&db.pool, CHAT_ID, Some("314159")).await?;
    assert_eq!(records.len(), 2);
    let highest = records.iter().find(|r| r.record_type == RECORD_HIGHEST).unwrap();
    assert_eq!(highest.player_name, "Eve");
    assert_eq!(highest.score, 95);
    let lowest = records.iter().find(|r| r.record_type == RECORD_LOWEST).unwrap();
    assert_eq!(lowest.player_name, "Mallory");
    assert_eq!(lowest.score, 21);

    Ok(())
}

#[tokio::test]
async fn test_processed_gameweek_guard() -> Result<()> {
    let (db, _temp) = setup_test_db().await?;

    assert!(!ProcessedGameweek::is_processed(&db.pool, CHAT_ID, "314159", 4).await?);
    ProcessedGameweek::mark_processed(&db.pool, CHAT_ID, "314159", 4).await?;
    assert!(ProcessedGameweek::is_processed(&db.pool, CHAT_ID, "314159", 4).await?);
    assert!(!ProcessedGameweek::is_processed(&db.pool, CHAT_ID, "314159", 5).await?);

    // Marking again stays a single row.
    ProcessedGameweek::mark_processed(&db.pool, CHAT_ID, "314159", 4).await?;
    assert!(ProcessedGameweek::is_processed(&db.pool, CHAT_ID, "314159", 4).await?);

    Ok(())
}
