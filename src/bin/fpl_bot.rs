//! FPL league bot entry point.
//!
//! Runs the Telegram dispatcher plus two background services: hourly
//! gameweek ingestion (records + speech obligations) and the daily
//! speech-reminder escalation sweep.

use anyhow::Result;
use teloxide::prelude::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use footy_bots::bot::handlers::FplBotHandler;
use footy_bots::config::Config;
use footy_bots::database::connection::DatabaseManager;
use footy_bots::services::fpl::{FplApi, GameweekService};
use footy_bots::services::reminder::SpeechReminderService;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "footy_bots=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting FPL bot v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration loaded - Database: {}", config.database_url);

    info!("Initializing database connection...");
    let db_manager = DatabaseManager::new(&config.database_url).await?;
    info!("Running database migrations...");
    db_manager.run_migrations().await?;
    let db_arc = Arc::new(db_manager);
    info!("Database initialized successfully");

    let api = Arc::new(FplApi::new());

    info!("Initializing Telegram bot...");
    let bot = Bot::new(config.require_fpl_token()?);
    let handler = FplBotHandler::new(db_arc.as_ref().clone(), api.clone());
    info!("Telegram bot initialized successfully");

    info!("Starting gameweek ingestion service...");
    let mut gameweek_service = GameweekService::new(bot.clone(), db_arc.clone(), api.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create gameweek service: {}", e))?;
    gameweek_service
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start gameweek service: {}", e))?;

    info!("Starting speech reminder service...");
    let mut reminder_service =
        SpeechReminderService::new(bot.clone(), db_arc.clone(), config.speech_reminder_days)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create reminder service: {}", e))?;
    reminder_service
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start reminder service: {}", e))?;

    Dispatcher::builder(bot, handler.schema())
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    if let Err(e) = reminder_service.stop().await {
        tracing::warn!("Error stopping reminder service: {}", e);
    }
    if let Err(e) = gameweek_service.stop().await {
        tracing::warn!("Error stopping gameweek service: {}", e);
    }

    info!("Application stopped");
    Ok(())
}
