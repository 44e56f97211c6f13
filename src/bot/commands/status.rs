use std::collections::HashMap;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::error;

use crate::database::connection::DatabaseManager;
use crate::database::models::{Competition, Pick, Player};
use crate::utils::markdown::escape_markdown;

/// /mypicks - the sender's pick history with outcomes.
pub async fn handle_my_picks(bot: Bot, msg: Message, db: &DatabaseManager) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let Some(user) = msg.from() else {
        return Ok(());
    };

    let Some(competition) = find_competition(&bot, &msg, db).await? else {
        return Ok(());
    };

    let player = match Player::find(&db.pool, &competition.id, user.id.0 as i64).await {
        Ok(Some(player)) => player,
        Ok(None) => {
            bot.send_message(msg.chat.id, "You are not registered - use /start to join.")
                .await?;
            return Ok(());
        }
        Err(e) => {
            error!("Failed to load player in chat {}: {}", chat_id, e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    let picks = match Pick::find_by_player(&db.pool, &competition.id, &player.id).await {
        Ok(picks) => picks,
        Err(e) => {
            error!("Failed to load picks: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    if picks.is_empty() {
        bot.send_message(msg.chat.id, "No picks yet. Use /pick <team> to make one.")
            .await?;
        return Ok(());
    }

    let mut text = String::from("📋 *Your picks*\n\n");
    for pick in picks {
        let marker = match pick.outcome.as_str() {
            crate::database::models::OUTCOME_WIN => "✅",
            crate::database::models::OUTCOME_LOSS_OR_DRAW => "💀",
            _ => "⏳",
        };
        text.push_str(&format!(
            "{} Round {}: {}\n",
            marker,
            pick.round_number,
            escape_markdown(&pick.team_name)
        ));
    }
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

/// /survivors - alive players in the chat's competition.
pub async fn handle_survivors(bot: Bot, msg: Message, db: &DatabaseManager) -> ResponseResult<()> {
    let Some(competition) = find_competition(&bot, &msg, db).await? else {
        return Ok(());
    };

    let players = match Player::find_by_competition(&db.pool, &competition.id).await {
        Ok(players) => players,
        Err(e) => {
            error!("Failed to load players: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    let survivors: Vec<&Player> = players.iter().filter(|p| p.is_alive()).collect();
    let mut text = format!(
        "🛡 *Survivors* \\({} of {}\\)\n\n",
        survivors.len(),
        players.len()
    );
    for player in &survivors {
        text.push_str(&format!("• {}\n", escape_markdown(&player.display_name)));
    }
    if survivors.is_empty() {
        text.push_str("Nobody\\. The pot rolls over\\.");
    }
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

/// /round - the competition's current round.
pub async fn handle_round(bot: Bot, msg: Message, db: &DatabaseManager) -> ResponseResult<()> {
    let Some(competition) = find_competition(&bot, &msg, db).await? else {
        return Ok(());
    };
    bot.send_message(
        msg.chat.id,
        format!(
            "⚽ Season {} - current round: {}. Submit with /pick <team>.",
            competition.season, competition.current_round
        ),
    )
    .await?;
    Ok(())
}

/// /winners - hall of fame across finished competitions in this chat.
pub async fn handle_winners(bot: Bot, msg: Message, db: &DatabaseManager) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let finished = match Competition::find_finished_by_chat(&db.pool, chat_id).await {
        Ok(finished) => finished,
        Err(e) => {
            error!("Failed to load finished competitions: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    let mut wins: HashMap<String, i64> = HashMap::new();
    for competition in &finished {
        let Some(winner_id) = &competition.winner_id else {
            continue;
        };
        match Player::find_by_id(&db.pool, winner_id).await {
            Ok(Some(player)) => *wins.entry(player.display_name).or_insert(0) += 1,
            Ok(None) => {}
            Err(e) => {
                error!("Failed to load winner {}: {}", winner_id, e);
            }
        }
    }

    if wins.is_empty() {
        bot.send_message(msg.chat.id, "No winners yet in this chat.")
            .await?;
        return Ok(());
    }

    let mut standings: Vec<(String, i64)> = wins.into_iter().collect();
    standings.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let mut text = String::from("🏆 *Hall of fame*\n\n");
    for (i, (name, count)) in standings.iter().enumerate() {
        let medal = match i {
            0 => "🥇",
            1 => "🥈",
            2 => "🥉",
            _ => "▪️",
        };
        text.push_str(&format!(
            "{} {} \\- {} win{}\n",
            medal,
            escape_markdown(name),
            count,
            if *count == 1 { "" } else { "s" }
        ));
    }
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

/// /pot - pot value from survivor count and rollover history.
/// £2 per player at stake, £5 per player once a pot has rolled over, plus
/// £5 per further rollover.
pub async fn handle_pot(bot: Bot, msg: Message, db: &DatabaseManager) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let Some(competition) = find_competition(&bot, &msg, db).await? else {
        return Ok(());
    };

    let players = match Player::find_by_competition(&db.pool, &competition.id).await {
        Ok(players) => players,
        Err(e) => {
            error!("Failed to load players: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };
    let rollovers = match Competition::rollover_count(&db.pool, chat_id).await {
        Ok(rollovers) => rollovers,
        Err(e) => {
            error!("Failed to compute rollover count: {}", e);
            0
        }
    };

    let player_count = players.len() as i64;
    let per_player = match rollovers {
        0 => 2,
        n => 5 + (n - 1) * 5,
    };
    let pot = player_count * per_player;

    bot.send_message(
        msg.chat.id,
        format!(
            "💰 Pot: £{} ({} players × £{}, {} rollover{})",
            pot,
            player_count,
            per_player,
            rollovers,
            if rollovers == 1 { "" } else { "s" }
        ),
    )
    .await?;
    Ok(())
}

async fn find_competition(
    bot: &Bot,
    msg: &Message,
    db: &DatabaseManager,
) -> Result<Option<Competition>, teloxide::RequestError> {
    match Competition::find_active_by_chat(&db.pool, msg.chat.id.0).await {
        Ok(Some(competition)) => Ok(Some(competition)),
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                "No competition is running in this chat. Use /start to begin one.",
            )
            .await?;
            Ok(None)
        }
        Err(e) => {
            error!("Failed to load competition: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            Ok(None)
        }
    }
}
