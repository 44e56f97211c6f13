//! The rules engines: pick validation and round resolution for the Last Man
//! Standing game, and escalation for speech reminders.
//!
//! Everything in here is pure. State comes in as arguments, decisions come
//! out as values, and `database::store` commits them atomically.

pub mod elimination;
pub mod error;
pub mod reminder;

pub use error::{EngineError, StateConflict, ValidationError};
