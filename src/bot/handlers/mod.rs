pub mod message;

use std::sync::Arc;

use teloxide::{dispatching::UpdateHandler, prelude::*};

use crate::bot::commands::{FplCommand, LmsCommand};
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::services::fpl::FplApi;
use crate::services::results::FootballApi;

/// Wires the Last Man Standing command set to its handlers.
pub struct LmsBotHandler {
    db: DatabaseManager,
    api: Arc<FootballApi>,
    config: Arc<Config>,
}

impl LmsBotHandler {
    pub fn new(db: DatabaseManager, api: Arc<FootballApi>, config: Arc<Config>) -> Self {
        Self { db, api, config }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        use teloxide::dispatching::UpdateFilterExt;

        let db = self.db.clone();
        let api = self.api.clone();
        let config = self.config.clone();

        Update::filter_message()
            .filter_command::<LmsCommand>()
            .endpoint(move |bot, msg, cmd| {
                let db = db.clone();
                let api = api.clone();
                let config = config.clone();
                async move {
                    message::lms_command_handler(bot, msg, cmd, db, api, config)
                        .await
                        .map_err(Into::into)
                }
            })
    }
}

/// Wires the FPL command set to its handlers.
pub struct FplBotHandler {
    db: DatabaseManager,
    api: Arc<FplApi>,
}

impl FplBotHandler {
    pub fn new(db: DatabaseManager, api: Arc<FplApi>) -> Self {
        Self { db, api }
    }

    pub fn schema(&self) -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
        use teloxide::dispatching::UpdateFilterExt;

        let db = self.db.clone();
        let api = self.api.clone();

        Update::filter_message()
            .filter_command::<FplCommand>()
            .endpoint(move |bot, msg, cmd| {
                let db = db.clone();
                let api = api.clone();
                async move {
                    message::fpl_command_handler(bot, msg, cmd, db, api)
                        .await
                        .map_err(Into::into)
                }
            })
    }
}
