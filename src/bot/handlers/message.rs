use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::commands::{self, FplCommand, LmsCommand};
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::services::fpl::FplApi;
use crate::services::results::FootballApi;

pub async fn lms_command_handler(
    bot: Bot,
    msg: Message,
    cmd: LmsCommand,
    db: DatabaseManager,
    api: Arc<FootballApi>,
    config: Arc<Config>,
) -> ResponseResult<()> {
    match cmd {
        LmsCommand::Help => {
            bot.send_message(msg.chat.id, LmsCommand::descriptions().to_string())
                .await?;
        }
        LmsCommand::Start => {
            commands::pick::handle_start(bot, msg, &db, &config).await?;
        }
        LmsCommand::Pick { team } => {
            commands::pick::handle_pick(bot, msg, team, &db, &api, &config).await?;
        }
        LmsCommand::ChangePick { team } => {
            commands::pick::handle_change_pick(bot, msg, team, &db, &api, &config).await?;
        }
        LmsCommand::MyPicks => {
            commands::status::handle_my_picks(bot, msg, &db).await?;
        }
        LmsCommand::Survivors => {
            commands::status::handle_survivors(bot, msg, &db).await?;
        }
        LmsCommand::Round => {
            commands::status::handle_round(bot, msg, &db).await?;
        }
        LmsCommand::Winners => {
            commands::status::handle_winners(bot, msg, &db).await?;
        }
        LmsCommand::Pot => {
            commands::status::handle_pot(bot, msg, &db).await?;
        }
        LmsCommand::Resolve => {
            commands::resolve::handle_resolve(bot, msg, &db, &api, &config).await?;
        }
    }
    Ok(())
}

pub async fn fpl_command_handler(
    bot: Bot,
    msg: Message,
    cmd: FplCommand,
    db: DatabaseManager,
    api: Arc<FplApi>,
) -> ResponseResult<()> {
    match cmd {
        FplCommand::Help | FplCommand::Start => {
            let text = format!(
                "🏆 Premier League Fantasy Football Bot 🏆\n\nI track your FPL league stats, records, and the speeches gameweek winners owe.\n\n{}",
                FplCommand::descriptions()
            );
            bot.send_message(msg.chat.id, text).await?;
        }
        FplCommand::AddLeague { league_id } => {
            commands::league::handle_add_league(bot, msg, league_id, &db, &api).await?;
        }
        FplCommand::Leagues => {
            commands::league::handle_leagues(bot, msg, &db).await?;
        }
        FplCommand::Stats { league_id } => {
            commands::league::handle_stats(bot, msg, league_id, &db, &api).await?;
        }
        FplCommand::Records => {
            commands::league::handle_records(bot, msg, &db).await?;
        }
        FplCommand::Speech => {
            commands::speech::handle_speech(bot, msg, &db).await?;
        }
        FplCommand::SpeechDone { league_id, gameweek } => {
            commands::speech::handle_speech_done(bot, msg, league_id, gameweek, &db).await?;
        }
    }
    Ok(())
}
