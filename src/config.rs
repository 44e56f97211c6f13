use anyhow::{anyhow, Result};
use chrono::Datelike;
use std::env;

/// Environment-provided configuration shared by both bots. Each binary asks
/// only for the token it needs, so the two bots can be deployed separately.
#[derive(Debug, Clone)]
pub struct Config {
    pub lms_bot_token: Option<String>,
    pub fpl_bot_token: Option<String>,
    pub football_api_key: Option<String>,
    pub database_url: String,
    pub http_port: u16,
    /// Competition to pull fixtures from (39 = Premier League).
    pub football_league_id: i64,
    pub football_season: i64,
    /// Days between speech-reminder escalation steps.
    pub speech_reminder_days: i64,
    /// Whether alive players with no pick are forfeit-eliminated on
    /// resolution. The original game eliminates deadline missers.
    pub forfeit_missing_picks: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = non_empty(env::var("DATABASE_URL").ok())
            .unwrap_or_else(|| "sqlite:./data/footy.db".to_string());

        let http_port = non_empty(env::var("HTTP_PORT").ok())
            .unwrap_or_else(|| "3000".to_string())
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid HTTP_PORT"))?;

        let football_league_id = parse_or("FOOTBALL_LEAGUE_ID", 39)?;
        let football_season = parse_or("FOOTBALL_SEASON", chrono::Utc::now().year() as i64)?;
        let speech_reminder_days = parse_or("SPEECH_REMINDER_DAYS", 3)?;
        if speech_reminder_days <= 0 {
            return Err(anyhow!("SPEECH_REMINDER_DAYS must be positive"));
        }

        let forfeit_missing_picks = non_empty(env::var("FORFEIT_MISSING_PICKS").ok())
            .map(|v| !matches!(v.trim(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Config {
            lms_bot_token: non_empty(env::var("TELEGRAM_BOT_TOKEN").ok()),
            fpl_bot_token: non_empty(env::var("FPL_TELEGRAM_BOT_TOKEN").ok()),
            football_api_key: non_empty(env::var("FOOTBALL_API_KEY").ok()),
            database_url,
            http_port,
            football_league_id,
            football_season,
            speech_reminder_days,
            forfeit_missing_picks,
        })
    }

    pub fn require_lms_token(&self) -> Result<&str> {
        self.lms_bot_token
            .as_deref()
            .ok_or_else(|| anyhow!("TELEGRAM_BOT_TOKEN must be set"))
    }

    pub fn require_fpl_token(&self) -> Result<&str> {
        self.fpl_bot_token
            .as_deref()
            .ok_or_else(|| anyhow!("FPL_TELEGRAM_BOT_TOKEN must be set"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_or(key: &str, default: i64) -> Result<i64> {
    match non_empty(env::var(key).ok()) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("Invalid {}", key)),
        None => Ok(default),
    }
}
