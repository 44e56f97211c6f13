use chrono::Utc;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::error;

use crate::database::connection::DatabaseManager;
use crate::database::models::SpeechReminder;
use crate::database::store;
use crate::engine::EngineError;
use crate::utils::datetime::{days_since, format_datetime};
use crate::utils::markdown::escape_markdown;
use crate::utils::validation::{validate_gameweek, validate_league_id};

/// /speech - pending speech obligations for this chat, with how overdue
/// each one is.
pub async fn handle_speech(bot: Bot, msg: Message, db: &DatabaseManager) -> ResponseResult<()> {
    let pending = match SpeechReminder::find_pending_by_chat(&db.pool, msg.chat.id.0).await {
        Ok(pending) => pending,
        Err(e) => {
            error!("Failed to load speech reminders: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    if pending.is_empty() {
        bot.send_message(msg.chat.id, "✅ No pending speech reminders at the moment!")
            .await?;
        return Ok(());
    }

    let now = Utc::now();
    let mut text = String::from("🎤 *Speech reminders*\n\n");
    for reminder in &pending {
        let days = days_since(reminder.created_at, now);
        let status_emoji = if reminder.escalation_level >= 1 { "⚠️" } else { "🔔" };
        text.push_str(&format!(
            "{} League `{}` \\(GW{}\\)\n👑 Winner: {}\n📊 Score: {} points\n🗓 Won on {}\n⏰ {} days ago \\(escalation level {}\\)\n\n",
            status_emoji,
            reminder.league_id,
            reminder.gameweek,
            escape_markdown(&reminder.winner_name),
            reminder.score,
            escape_markdown(&format_datetime(&reminder.created_at)),
            days,
            reminder.escalation_level
        ));
    }
    text.push_str("Use /speechdone <league\\_id> <gameweek> to mark one as written\\.");

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

/// /speechdone <league_id> <gameweek> - terminal completion.
pub async fn handle_speech_done(
    bot: Bot,
    msg: Message,
    league_id: String,
    gameweek: i64,
    db: &DatabaseManager,
) -> ResponseResult<()> {
    if let Err(e) = validate_league_id(&league_id) {
        bot.send_message(
            msg.chat.id,
            format!("❌ {}. Example: /speechdone 123456 15", e),
        )
        .await?;
        return Ok(());
    }
    if let Err(e) = validate_gameweek(gameweek) {
        bot.send_message(msg.chat.id, format!("❌ {}", e)).await?;
        return Ok(());
    }
    let league_id = league_id.trim();

    match store::mark_speech_done(&db.pool, msg.chat.id.0, league_id, gameweek).await {
        Ok(()) => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "✅ Speech marked as written for league {}, GW{}!",
                    league_id, gameweek
                ),
            )
            .await?;
        }
        Err(e) => match e.downcast_ref::<EngineError>() {
            Some(engine_err) => {
                bot.send_message(msg.chat.id, format!("❌ {}", engine_err))
                    .await?;
            }
            None => {
                error!("Failed to mark speech done: {}", e);
                bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                    .await?;
            }
        },
    }
    Ok(())
}
