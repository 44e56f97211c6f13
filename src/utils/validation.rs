use anyhow::{anyhow, Result};

pub fn validate_team_name(name: &str) -> Result<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(anyhow!("Team name cannot be empty"));
    }

    if name.len() < 3 {
        return Err(anyhow!("Team name must be at least 3 characters long"));
    }

    if name.len() > 50 {
        return Err(anyhow!("Team name cannot be longer than 50 characters"));
    }

    if name.contains('\n') || name.contains('\r') {
        return Err(anyhow!("Team name cannot contain line breaks"));
    }

    Ok(())
}

pub fn validate_telegram_chat_id(chat_id: i64) -> Result<()> {
    // Telegram chat IDs should be non-zero
    if chat_id == 0 {
        return Err(anyhow!("Chat ID cannot be zero"));
    }

    // Positive IDs should be within reasonable range for user chats (up to 2^31-1)
    if chat_id > 2147483647 {
        return Err(anyhow!("Invalid user chat ID range"));
    }

    // Negative IDs cover groups and supergroups; reject values beyond
    // Telegram's known ranges
    if chat_id < -2000000000000 {
        return Err(anyhow!("Chat ID out of valid range"));
    }

    Ok(())
}

/// FPL league ids are plain positive integers.
pub fn validate_league_id(league_id: &str) -> Result<i64> {
    let league_id = league_id.trim();

    if league_id.is_empty() {
        return Err(anyhow!("League ID cannot be empty"));
    }

    let parsed: i64 = league_id
        .parse()
        .map_err(|_| anyhow!("League ID must be a number"))?;

    if parsed <= 0 {
        return Err(anyhow!("League ID must be positive"));
    }

    Ok(parsed)
}

pub fn validate_gameweek(gameweek: i64) -> Result<()> {
    if !(1..=38).contains(&gameweek) {
        return Err(anyhow!("Gameweek must be between 1 and 38"));
    }
    Ok(())
}
