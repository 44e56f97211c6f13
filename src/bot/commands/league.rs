use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{error, info};

use crate::database::connection::DatabaseManager;
use crate::database::models::{League, Record, RECORD_HIGHEST, RECORD_LOWEST};
use crate::services::fpl::FplApi;
use crate::utils::markdown::escape_markdown;
use crate::utils::validation::validate_league_id;

/// /addleague <id> - validate the league against the FPL API and track it.
pub async fn handle_add_league(
    bot: Bot,
    msg: Message,
    league_id: String,
    db: &DatabaseManager,
    api: &FplApi,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;

    if let Err(e) = validate_league_id(&league_id) {
        bot.send_message(
            msg.chat.id,
            format!("❌ {}. Example: /addleague 123456", e),
        )
        .await?;
        return Ok(());
    }
    let league_id = league_id.trim();

    let standings = match api.league_standings(league_id).await {
        Ok(standings) => standings,
        Err(e) => {
            error!("League lookup failed for {}: {}", league_id, e);
            bot.send_message(
                msg.chat.id,
                format!(
                    "❌ Could not find league with ID: {}\nPlease check the league ID and try again.",
                    league_id
                ),
            )
            .await?;
            return Ok(());
        }
    };

    match League::create(&db.pool, chat_id, league_id, &standings.league.name).await {
        Ok(league) => {
            let text = format!(
                "✅ Now tracking *{}*\nLeague ID: `{}`\n\nUse /stats {} to view standings\\!",
                escape_markdown(&league.league_name),
                league.league_id,
                league.league_id
            );
            bot.send_message(msg.chat.id, text)
                .parse_mode(ParseMode::MarkdownV2)
                .await?;
            info!("Chat {} now tracks league {}", chat_id, league_id);
        }
        Err(e) => {
            error!("Failed to save league: {}", e);
            bot.send_message(msg.chat.id, "❌ Failed to add league to database. Please try again.")
                .await?;
        }
    }
    Ok(())
}

/// /leagues - list tracked leagues for this chat.
pub async fn handle_leagues(bot: Bot, msg: Message, db: &DatabaseManager) -> ResponseResult<()> {
    let leagues = match League::find_by_chat(&db.pool, msg.chat.id.0).await {
        Ok(leagues) => leagues,
        Err(e) => {
            error!("Failed to load leagues: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    if leagues.is_empty() {
        bot.send_message(
            msg.chat.id,
            "No leagues tracked yet. Add one with /addleague <league_id>",
        )
        .await?;
        return Ok(());
    }

    let mut text = String::from("📋 *Tracked leagues*\n\n");
    for league in &leagues {
        text.push_str(&format!(
            "• *{}* \\(ID: `{}`\\)\n",
            escape_markdown(&league.league_name),
            league.league_id
        ));
    }
    text.push_str("\nUse /stats <league\\_id> to view standings\\!");
    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

/// /stats <league_id> - live standings from the FPL API, top ten.
pub async fn handle_stats(
    bot: Bot,
    msg: Message,
    league_id: String,
    db: &DatabaseManager,
    api: &FplApi,
) -> ResponseResult<()> {
    if let Err(e) = validate_league_id(&league_id) {
        bot.send_message(msg.chat.id, format!("❌ {}. Example: /stats 123456", e))
            .await?;
        return Ok(());
    }
    let league_id = league_id.trim();

    // Only leagues this chat tracks, so one chat cannot use the bot as a
    // generic proxy for arbitrary leagues.
    match League::find(&db.pool, msg.chat.id.0, league_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            bot.send_message(
                msg.chat.id,
                "That league is not tracked here - add it with /addleague first.",
            )
            .await?;
            return Ok(());
        }
        Err(e) => {
            error!("Failed to check league: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    }

    bot.send_message(msg.chat.id, "🔄 Fetching league data...").await?;

    let standings = match api.league_standings(league_id).await {
        Ok(standings) => standings,
        Err(e) => {
            error!("Standings fetch failed for {}: {}", league_id, e);
            bot.send_message(
                msg.chat.id,
                format!("❌ Could not fetch data for league ID: {}", league_id),
            )
            .await?;
            return Ok(());
        }
    };

    let results = &standings.standings.results;
    if results.is_empty() {
        bot.send_message(msg.chat.id, "❌ No standings data available")
            .await?;
        return Ok(());
    }

    let mut text = format!("🏆 *{}*\n📊 Current standings:\n\n", escape_markdown(&standings.league.name));
    for (i, entry) in results.iter().take(10).enumerate() {
        let rank = match i {
            0 => "🥇".to_string(),
            1 => "🥈".to_string(),
            2 => "🥉".to_string(),
            n => format!("{}\\.", n + 1),
        };
        text.push_str(&format!(
            "{} *{}* \\({}\\)\n   📈 {} pts \\| GW: {} pts\n\n",
            rank,
            escape_markdown(&entry.player_name),
            escape_markdown(&entry.entry_name),
            entry.total,
            entry.event_total
        ));
    }
    if results.len() > 10 {
        text.push_str(&format!("\\.\\.\\. and {} more players\n\n", results.len() - 10));
    }
    text.push_str(&format!("🔢 Total players: {}", results.len()));

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}

/// /records - the stored highest/lowest gameweek scores for this chat.
pub async fn handle_records(bot: Bot, msg: Message, db: &DatabaseManager) -> ResponseResult<()> {
    let records = match Record::find_by_chat(&db.pool, msg.chat.id.0, None).await {
        Ok(records) => records,
        Err(e) => {
            error!("Failed to load records: {}", e);
            bot.send_message(msg.chat.id, "❌ Database error, command failed.")
                .await?;
            return Ok(());
        }
    };

    let highest = records.iter().find(|r| r.record_type == RECORD_HIGHEST);
    let lowest = records.iter().find(|r| r.record_type == RECORD_LOWEST);

    let mut text = String::from("📊 *All\\-time records*\n\n");
    if let Some(record) = highest {
        text.push_str(&format!(
            "🔥 *Highest score:*\n👑 {} \\- *{} points* \\(GW{}\\)\n\n",
            escape_markdown(&record.player_name),
            record.score,
            record.gameweek
        ));
    }
    if let Some(record) = lowest {
        text.push_str(&format!(
            "💀 *Lowest score:*\n😬 {} \\- *{} points* \\(GW{}\\)\n\n",
            escape_markdown(&record.player_name),
            record.score,
            record.gameweek
        ));
    }
    if highest.is_none() && lowest.is_none() {
        text.push_str("No records found yet\\. Add some leagues and check back\\!");
    }

    bot.send_message(msg.chat.id, text)
        .parse_mode(ParseMode::MarkdownV2)
        .await?;
    Ok(())
}
