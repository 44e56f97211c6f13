pub mod league;
pub mod pick;
pub mod resolve;
pub mod speech;
pub mod status;

use teloxide::utils::command::BotCommands;

/// Commands understood by the Last Man Standing bot.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Last Man Standing commands:")]
pub enum LmsCommand {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Join the competition (starts one if needed)")]
    Start,
    #[command(description = "Pick a team for the current round")]
    Pick { team: String },
    #[command(description = "Swap this round's pick (the old team stays used)")]
    ChangePick { team: String },
    #[command(description = "Show your pick history")]
    MyPicks,
    #[command(description = "Show who is still standing")]
    Survivors,
    #[command(description = "Show the current round")]
    Round,
    #[command(description = "Hall of fame for this chat")]
    Winners,
    #[command(description = "Show the current pot")]
    Pot,
    #[command(description = "Resolve the current round from match results")]
    Resolve,
}

/// Commands understood by the FPL league bot.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "FPL league bot commands:")]
pub enum FplCommand {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Track an FPL classic league")]
    AddLeague { league_id: String },
    #[command(description = "List tracked leagues")]
    Leagues,
    #[command(description = "Show league standings")]
    Stats { league_id: String },
    #[command(description = "Show highest/lowest gameweek scores")]
    Records,
    #[command(description = "Show pending speech reminders")]
    Speech,
    #[command(description = "Mark a speech as written", parse_with = "split")]
    SpeechDone { league_id: String, gameweek: i64 },
}
