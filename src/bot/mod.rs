/// Command definitions and per-command handlers
pub mod commands;
/// dptree schema wiring for both bots
pub mod handlers;
