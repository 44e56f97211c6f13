use teloxide::prelude::*;
use teloxide::types::{ChatMemberStatus, ParseMode};
use tracing::{error, info};

use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::database::models::Competition;
use crate::database::store;
use crate::engine::elimination::{
    resolve_round, CompetitionAdvance, CompetitionState, ForfeitPolicy, RoundResolution,
};
use crate::engine::{EngineError, StateConflict};
use crate::services::results::FootballApi;
use crate::utils::markdown::escape_markdown;

/// /resolve - fetch this round's results, run the elimination engine and
/// commit the outcome atomically. Admin-only in group chats: resolution
/// eliminates players, so it is not open to every member.
pub async fn handle_resolve(
    bot: Bot,
    msg: Message,
    db: &DatabaseManager,
    api: &FootballApi,
    config: &Config,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let Some(user) = msg.from() else {
        return Ok(());
    };

    if !msg.chat.is_private() {
        let member = bot.get_chat_member(msg.chat.id, user.id).await?;
        if !is_chat_admin(&member.status()) {
            bot.send_message(
                msg.chat.id,
                "❌ Only group admins can resolve a round.",
            )
            .await?;
            return Ok(());
        }
    }

    let state = match store::load_competition_state(&db.pool, chat_id).await {
        Ok(Some(state)) => state,
        Ok(None) => {
            bot.send_message(msg.chat.id, "No competition is running in this chat.")
                .await?;
            return Ok(());
        }
        Err(e) => {
            error!("Failed to load competition state: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    let round = state.competition.current_round;
    bot.send_message(msg.chat.id, format!("⏳ Fetching results for round {}...", round))
        .await?;

    let results = match api
        .round_results(config.football_league_id, config.football_season, round)
        .await
    {
        Ok(results) => results,
        Err(e) => {
            error!("Results fetch failed for round {}: {}", round, e);
            bot.send_message(
                msg.chat.id,
                "❌ Could not fetch match results, try again later.",
            )
            .await?;
            return Ok(());
        }
    };

    let forfeit = if config.forfeit_missing_picks {
        ForfeitPolicy::Eliminate
    } else {
        ForfeitPolicy::Skip
    };

    let resolution = match resolve_round(&state, round, &results, forfeit) {
        Ok(resolution) => resolution,
        Err(EngineError::StateConflict(StateConflict::RoundAlreadyResolved { round })) => {
            bot.send_message(
                msg.chat.id,
                format!("Round {} has already been resolved - nothing to do.", round),
            )
            .await?;
            return Ok(());
        }
        Err(e @ EngineError::MissingResult { .. }) => {
            bot.send_message(
                msg.chat.id,
                format!("⚠️ Results are incomplete: {}. Try again once every match has finished.", e),
            )
            .await?;
            return Ok(());
        }
        Err(e) => {
            bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
            return Ok(());
        }
    };

    if let Err(e) = store::apply_resolution(&db.pool, &resolution).await {
        error!("Failed to commit round resolution: {}", e);
        bot.send_message(
            msg.chat.id,
            "❌ Could not save the round outcome; nothing was applied. Try again.",
        )
        .await?;
        return Ok(());
    }

    let announcement = format_resolution(&db.pool, &state, &resolution).await;
    bot.send_message(msg.chat.id, announcement)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    info!("Round {} resolved in chat {}", round, chat_id);
    Ok(())
}

/// Mirrors Telegram's privileged statuses: owners and administrators may
/// resolve, everyone else may not.
fn is_chat_admin(status: &ChatMemberStatus) -> bool {
    matches!(
        status,
        ChatMemberStatus::Owner | ChatMemberStatus::Administrator
    )
}

async fn format_resolution(
    pool: &sqlx::SqlitePool,
    state: &CompetitionState,
    resolution: &RoundResolution,
) -> String {
    let name_of = |player_id: &String| {
        state
            .players
            .iter()
            .find(|p| &p.id == player_id)
            .map(|p| p.display_name.clone())
            .unwrap_or_else(|| "unknown player".to_string())
    };

    let mut text = format!("🏁 *Round {} results*\n\n", resolution.round_number);

    if resolution.eliminated.is_empty() && resolution.forfeited.is_empty() {
        text.push_str("Everyone survived\\! 🎉\n");
    }
    for player_id in &resolution.eliminated {
        text.push_str(&format!(
            "💀 {} is eliminated\\.\n",
            escape_markdown(&name_of(player_id))
        ));
    }
    for player_id in &resolution.forfeited {
        text.push_str(&format!(
            "⏰ {} made no pick and forfeits\\.\n",
            escape_markdown(&name_of(player_id))
        ));
    }

    match &resolution.advance {
        CompetitionAdvance::NextRound(next) => {
            text.push_str(&format!("\n➡️ On to round {}\\.", next));
        }
        CompetitionAdvance::Finished { winner: Some(winner_id) } => {
            text.push_str(&format!(
                "\n🏆 *{}* is the last one standing\\!",
                escape_markdown(&name_of(winner_id))
            ));
        }
        CompetitionAdvance::Finished { winner: None } => {
            let rollovers = Competition::rollover_count(pool, state.competition.chat_id)
                .await
                .unwrap_or(0);
            text.push_str(&format!(
                "\n🤝 Everyone went down together \\- no winner\\. The pot rolls over \\(rollover \\#{}\\)\\. Use /start to go again\\.",
                rollovers
            ));
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_privileged_statuses_may_resolve() {
        assert!(is_chat_admin(&ChatMemberStatus::Owner));
        assert!(is_chat_admin(&ChatMemberStatus::Administrator));

        assert!(!is_chat_admin(&ChatMemberStatus::Member));
        assert!(!is_chat_admin(&ChatMemberStatus::Restricted));
        assert!(!is_chat_admin(&ChatMemberStatus::Left));
        assert!(!is_chat_admin(&ChatMemberStatus::Banned));
    }
}
