//! Fantasy Premier League API client plus the gameweek ingestion step that
//! keeps records and speech reminders up to date.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;
use sqlx::SqlitePool;
use teloxide::{prelude::*, types::ChatId};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};

use crate::database::connection::DatabaseManager;
use crate::database::models::{League, ProcessedGameweek, Record, RECORD_HIGHEST, RECORD_LOWEST};
use crate::database::store;
use crate::engine::EngineError;
use crate::utils::markdown::escape_markdown;

const FPL_API_BASE: &str = "https://fantasy.premierleague.com/api";

#[derive(Debug, Deserialize)]
pub struct LeagueStandings {
    pub league: LeagueInfo,
    pub standings: StandingsPage,
}

#[derive(Debug, Deserialize)]
pub struct LeagueInfo {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct StandingsPage {
    pub results: Vec<StandingEntry>,
}

#[derive(Debug, Deserialize)]
pub struct StandingEntry {
    pub entry: i64,
    pub player_name: String,
    pub entry_name: String,
    pub total: i64,
    pub event_total: i64,
}

#[derive(Debug, Deserialize)]
pub struct ManagerHistory {
    pub current: Vec<GameweekScore>,
}

#[derive(Debug, Deserialize)]
pub struct GameweekScore {
    pub event: i64,
    pub points: i64,
}

#[derive(Debug, Deserialize)]
struct Bootstrap {
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct Event {
    id: i64,
    finished: bool,
    data_checked: bool,
}

/// Summary of one ingested gameweek, for the announcement message.
#[derive(Debug, Clone)]
pub struct GameweekSummary {
    pub gameweek: i64,
    pub winner_name: String,
    pub winner_score: i64,
}

pub struct FplApi {
    client: Client,
}

impl FplApi {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub async fn league_standings(&self, league_id: &str) -> Result<LeagueStandings> {
        let url = format!("{}/leagues-classic/{}/standings/", FPL_API_BASE, league_id);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    pub async fn manager_history(&self, entry_id: i64) -> Result<ManagerHistory> {
        let url = format!("{}/entry/{}/history/", FPL_API_BASE, entry_id);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// The most recent gameweek that has finished but whose data the FPL
    /// backend has not yet finalized - the window in which a winner is fresh
    /// news.
    pub async fn latest_finished_gameweek(&self) -> Result<Option<i64>> {
        let url = format!("{}/bootstrap-static/", FPL_API_BASE);
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let bootstrap: Bootstrap = response.json().await?;
        Ok(bootstrap
            .events
            .iter()
            .find(|e| e.finished && !e.data_checked)
            .map(|e| e.id))
    }
}

impl Default for FplApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Ingest one finished gameweek for a tracked league: update the
/// highest/lowest records, record the gameweek winner's speech obligation,
/// and mark the gameweek processed so a rerun is a no-op.
pub async fn process_gameweek(
    pool: &SqlitePool,
    api: &FplApi,
    chat_id: i64,
    league_id: &str,
    gameweek: i64,
) -> Result<Option<GameweekSummary>> {
    if ProcessedGameweek::is_processed(pool, chat_id, league_id, gameweek).await? {
        debug!(
            "Gameweek {} already processed for league {} in chat {}",
            gameweek, league_id, chat_id
        );
        return Ok(None);
    }

    let standings = api.league_standings(league_id).await?;
    let mut winner: Option<(String, i64, i64)> = None; // (name, entry, score)

    for entry in &standings.standings.results {
        let history = api.manager_history(entry.entry).await?;
        for gw in &history.current {
            if gw.points <= 0 {
                continue;
            }
            Record::update(
                pool,
                chat_id,
                league_id,
                &entry.player_name,
                entry.entry,
                gw.event,
                gw.points,
                RECORD_HIGHEST,
            )
            .await?;
            Record::update(
                pool,
                chat_id,
                league_id,
                &entry.player_name,
                entry.entry,
                gw.event,
                gw.points,
                RECORD_LOWEST,
            )
            .await?;

            if gw.event == gameweek {
                let beats = winner.as_ref().map(|(_, _, s)| gw.points > *s).unwrap_or(true);
                if beats {
                    winner = Some((entry.player_name.clone(), entry.entry, gw.points));
                }
            }
        }
    }

    let (winner_name, winner_entry, winner_score) = winner.ok_or_else(|| {
        anyhow!(
            "no scores found for gameweek {} in league {}",
            gameweek,
            league_id
        )
    })?;

    match store::record_winner(
        pool,
        chat_id,
        league_id,
        gameweek,
        &winner_name,
        winner_entry,
        winner_score,
    )
    .await
    {
        Ok(_) => {}
        // Another ingestion got there first; the processed marker below
        // still needs to land.
        Err(e) if e.downcast_ref::<EngineError>().is_some() => {
            debug!("Winner already recorded: {}", e);
        }
        Err(e) => return Err(e),
    }

    ProcessedGameweek::mark_processed(pool, chat_id, league_id, gameweek).await?;
    info!(
        "Processed gameweek {} for league {}: winner {} ({} pts)",
        gameweek, league_id, winner_name, winner_score
    );

    Ok(Some(GameweekSummary {
        gameweek,
        winner_name,
        winner_score,
    }))
}

/// Hourly ingestion of freshly finished gameweeks across every tracked
/// league, announcing each new winner to its chat.
pub struct GameweekService {
    bot: Bot,
    db: Arc<DatabaseManager>,
    api: Arc<FplApi>,
    scheduler: JobScheduler,
}

impl GameweekService {
    pub async fn new(
        bot: Bot,
        db: Arc<DatabaseManager>,
        api: Arc<FplApi>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;
        Ok(Self {
            bot,
            db,
            api,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bot = self.bot.clone();
        let db = self.db.clone();
        let api = self.api.clone();

        let ingest_job = Job::new_async("0 5 * * * *", move |_uuid, _l| {
            let bot = bot.clone();
            let db = db.clone();
            let api = api.clone();
            Box::pin(async move {
                if let Err(e) = ingest_all_leagues(bot, db, api).await {
                    tracing::error!("Gameweek ingestion failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(ingest_job).await?;
        self.scheduler.start().await?;
        tracing::info!("Gameweek ingestion service started - checking hourly");
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

async fn ingest_all_leagues(
    bot: Bot,
    db: Arc<DatabaseManager>,
    api: Arc<FplApi>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let Some(gameweek) = api.latest_finished_gameweek().await? else {
        debug!("No freshly finished gameweek");
        return Ok(());
    };

    let leagues = League::find_all(&db.pool).await?;
    for league in leagues {
        match process_gameweek(&db.pool, &api, league.chat_id, &league.league_id, gameweek).await {
            Ok(Some(summary)) => {
                let text = format!(
                    "👑 *{}* won gameweek {} in {} with *{} points*\\!\n\nA victory speech is now owed\\. 🎤",
                    escape_markdown(&summary.winner_name),
                    summary.gameweek,
                    escape_markdown(&league.league_name),
                    summary.winner_score
                );
                if let Err(e) = bot
                    .send_message(ChatId(league.chat_id), text)
                    .parse_mode(teloxide::types::ParseMode::MarkdownV2)
                    .await
                {
                    tracing::error!(
                        "Failed to announce gameweek winner to chat {}: {}",
                        league.chat_id,
                        e
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(
                    "Ingestion failed for league {} in chat {}: {}",
                    league.league_id,
                    league.chat_id,
                    e
                );
            }
        }
    }
    Ok(())
}
