use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{info, warn};

use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::store;
use crate::engine::elimination::{change_pick, submit_pick};
use crate::services::results::FootballApi;
use crate::utils::markdown::escape_markdown;
use crate::utils::validation::{validate_team_name, validate_telegram_chat_id};

/// /start - register the sender, creating the chat's competition when this
/// is the first registration.
pub async fn handle_start(
    bot: Bot,
    msg: Message,
    db: &DatabaseManager,
    config: &Config,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let Some(user) = msg.from() else {
        return Ok(());
    };

    if let Err(e) = validate_telegram_chat_id(chat_id) {
        warn!("Rejecting registration from chat {}: {}", chat_id, e);
        bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
        return Ok(());
    }

    let display_name = user.full_name();
    match store::register_player(
        &db.pool,
        chat_id,
        user.id.0 as i64,
        &display_name,
        config.football_season,
    )
    .await
    {
        Ok((competition, _player, created)) => {
            let text = if created {
                format!(
                    "⚽ Welcome to Last Man Standing, {}!\n\nPick one team per round with /pick <team>. If your team wins you survive; a loss or draw knocks you out. You can never pick the same team twice.\n\nCurrent round: {}",
                    display_name, competition.current_round
                )
            } else {
                format!(
                    "You are already in, {}. Current round: {}",
                    display_name, competition.current_round
                )
            };
            bot.send_message(msg.chat.id, text).await?;
            info!(
                "Registered player {} in chat {} (new: {})",
                display_name, chat_id, created
            );
        }
        Err(e) => {
            tracing::error!("Failed to register player in chat {}: {}", chat_id, e);
            bot.send_message(msg.chat.id, "❌ Could not register you right now, try again.")
                .await?;
        }
    }
    Ok(())
}

/// /pick <team> - validate against history and the current round, then
/// persist the single pending pick row.
pub async fn handle_pick(
    bot: Bot,
    msg: Message,
    team: String,
    db: &DatabaseManager,
    api: &FootballApi,
    config: &Config,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let Some(user) = msg.from() else {
        return Ok(());
    };

    if let Err(e) = validate_team_name(&team) {
        bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
        return Ok(());
    }

    let team_ref = match api
        .search_team(&team, config.football_league_id, config.football_season)
        .await
    {
        Ok(Some(team_ref)) => team_ref,
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                format!("❌ Could not find a team matching '{}'.", team),
            )
            .await?;
            return Ok(());
        }
        Err(e) => {
            warn!("Team lookup failed: {}", e);
            bot.send_message(msg.chat.id, "❌ Team lookup failed, try again shortly.")
                .await?;
            return Ok(());
        }
    };

    let state = match store::load_competition_state(&db.pool, chat_id).await {
        Ok(Some(state)) => state,
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                "No competition is running in this chat. Use /start to begin one.",
            )
            .await?;
            return Ok(());
        }
        Err(e) => {
            tracing::error!("Failed to load competition state: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    let round = state.competition.current_round;
    let decision = match submit_pick(
        &state,
        user.id.0 as i64,
        round,
        &team_ref.id.to_string(),
        &team_ref.name,
    ) {
        Ok(decision) => decision,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
            return Ok(());
        }
    };

    match store::apply_pick(&db.pool, &decision).await {
        Ok(pick) => {
            let text = format!(
                "✅ *{}* locked in for round {}, {}\\. Good luck\\!",
                escape_markdown(&pick.team_name),
                pick.round_number,
                escape_markdown(&user.full_name()),
            );
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
            info!(
                "Pick saved: {} round {} team {} in chat {}",
                user.id, round, pick.team_name, chat_id
            );
        }
        Err(e) => {
            tracing::error!("Failed to save pick: {}", e);
            bot.send_message(msg.chat.id, "❌ Could not save your pick, try again.")
                .await?;
        }
    }
    Ok(())
}

/// /changepick <team> - swap a still-pending pick; the old team stays burned.
pub async fn handle_change_pick(
    bot: Bot,
    msg: Message,
    team: String,
    db: &DatabaseManager,
    api: &FootballApi,
    config: &Config,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let Some(user) = msg.from() else {
        return Ok(());
    };

    if let Err(e) = validate_team_name(&team) {
        bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
        return Ok(());
    }

    let team_ref = match api
        .search_team(&team, config.football_league_id, config.football_season)
        .await
    {
        Ok(Some(team_ref)) => team_ref,
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                format!("❌ Could not find a team matching '{}'.", team),
            )
            .await?;
            return Ok(());
        }
        Err(e) => {
            warn!("Team lookup failed: {}", e);
            bot.send_message(msg.chat.id, "❌ Team lookup failed, try again shortly.")
                .await?;
            return Ok(());
        }
    };

    let state = match store::load_competition_state(&db.pool, chat_id).await {
        Ok(Some(state)) => state,
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                "No competition is running in this chat. Use /start to begin one.",
            )
            .await?;
            return Ok(());
        }
        Err(e) => {
            tracing::error!("Failed to load competition state: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    let round = state.competition.current_round;
    let decision = match change_pick(
        &state,
        user.id.0 as i64,
        round,
        &team_ref.id.to_string(),
        &team_ref.name,
    ) {
        Ok(decision) => decision,
        Err(e) => {
            bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
            return Ok(());
        }
    };

    match store::apply_change(&db.pool, &decision).await {
        Ok(()) => {
            let text = format!(
                "🔁 Pick changed to *{}* for round {}\\. *{}* is now burned for the rest of the competition\\.",
                escape_markdown(&decision.new_team_name),
                round,
                escape_markdown(&decision.old_team_name),
            );
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
        }
        Err(e) => {
            tracing::error!("Failed to change pick: {}", e);
            bot.send_message(msg.chat.id, "❌ Could not change your pick, try again.")
                .await?;
        }
    }
    Ok(())
}
