pub mod burned_team;
pub mod competition;
pub mod gameweek;
pub mod league;
pub mod pick;
pub mod player;
pub mod record;
pub mod speech_reminder;

pub use burned_team::*;
pub use competition::*;
pub use gameweek::*;
pub use league::*;
pub use pick::*;
pub use player::*;
pub use record::*;
pub use speech_reminder::*;
