use footy_bots::utils::validation::{
    validate_gameweek, validate_league_id, validate_team_name, validate_telegram_chat_id,
};

#[test]
fn test_validate_team_name() {
    assert!(validate_team_name("Arsenal").is_ok());
    assert!(validate_team_name("Brighton & Hove Albion").is_ok());
    assert!(validate_team_name("  Spurs  ").is_ok()); // trimmed

    assert!(validate_team_name("").is_err());
    assert!(validate_team_name("   ").is_err());
    assert!(validate_team_name("ab").is_err());
    assert!(validate_team_name(&"x".repeat(51)).is_err());
    assert!(validate_team_name("Arse\nnal").is_err());
}

#[test]
fn test_validate_telegram_chat_id() {
    assert!(validate_telegram_chat_id(123456789).is_ok());
    assert!(validate_telegram_chat_id(-987654321).is_ok()); // group chat
    assert!(validate_telegram_chat_id(-1001234567890).is_ok()); // supergroup

    assert!(validate_telegram_chat_id(0).is_err());
    assert!(validate_telegram_chat_id(3000000000).is_err());
    assert!(validate_telegram_chat_id(-3000000000000).is_err());
}

#[test]
fn test_validate_league_id() {
    assert_eq!(validate_league_id("314159").unwrap(), 314159);
    assert_eq!(validate_league_id(" 42 ").unwrap(), 42);

    assert!(validate_league_id("").is_err());
    assert!(validate_league_id("abc").is_err());
    assert!(validate_league_id("-5").is_err());
    assert!(validate_league_id("0").is_err());
}

#[test]
fn test_validate_gameweek() {
    assert!(validate_gameweek(1).is_ok());
    assert!(validate_gameweek(38).is_ok());

    assert!(validate_gameweek(0).is_err());
    assert!(validate_gameweek(39).is_err());
    assert!(validate_gameweek(-1).is_err());
}
