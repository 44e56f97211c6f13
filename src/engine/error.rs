use thiserror::Error;

/// Tagged failure taxonomy for the rules engines.
///
/// Every rejection carries enough context for the command handlers to render
/// a specific user-facing message; nothing is collapsed into a generic error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    StateConflict(#[from] StateConflict),

    /// The results provider handed us incomplete or unusable data. The round
    /// is left untouched and the resolution can be retried once complete
    /// results are available.
    #[error("no result supplied for picked team '{team}'")]
    MissingResult { team: String },

    #[error("unrecognized outcome '{value}' for team '{team}'")]
    UnknownOutcome { team: String, value: String },
}

/// User-caused rejections, surfaced verbatim as the reply text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("no competition is running in this chat")]
    CompetitionNotFound,

    #[error("the competition has already finished")]
    CompetitionFinished,

    #[error("you are not registered - use /start to join")]
    PlayerNotFound,

    #[error("you have been eliminated from this competition")]
    PlayerEliminated,

    #[error("you already have a pick for round {round} - use /changepick to swap it")]
    PickAlreadyMade { round: i64 },

    #[error("you have no pick to change for round {round}")]
    NoPickToChange { round: i64 },

    #[error("you have already used {team} in this competition")]
    TeamAlreadyUsed { team: String },

    #[error("picks are for round {current}, not round {submitted}")]
    RoundMismatch { submitted: i64, current: i64 },

    #[error("no pending speech reminder for league {league_id} gameweek {gameweek}")]
    ReminderNotFound { league_id: String, gameweek: i64 },

    #[error("the speech for league {league_id} gameweek {gameweek} is already marked done")]
    ReminderAlreadyDone { league_id: String, gameweek: i64 },
}

/// Double-submission races. The state is already what the caller tried to
/// make it, so these are reported as a no-op with an explanation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateConflict {
    #[error("round {round} has already been resolved")]
    RoundAlreadyResolved { round: i64 },

    #[error("a winner is already recorded for league {league_id} gameweek {gameweek}")]
    WinnerAlreadyRecorded { league_id: String, gameweek: i64 },
}
