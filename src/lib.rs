//! # Footy Bots
//!
//! Two Telegram bots sharing one storage layer:
//! - a Last Man Standing elimination game (pick one winning team per round,
//!   never the same team twice, lose or draw and you are out), and
//! - an FPL league tracker (standings, score records, and escalating
//!   reminders for the speeches gameweek winners owe).
//!
//! The game rules live in [`engine`] as pure functions; everything around
//! them is glue: command dispatch, sqlx persistence, and the external
//! sports APIs.

/// Bot command definitions, handlers and dispatch schemas
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and the decision-commit store
pub mod database;
/// Rules engines: elimination game and speech-reminder escalation
pub mod engine;
/// External API clients and background services
pub mod services;
/// Utility functions for validation, datetime, and formatting
pub mod utils;
