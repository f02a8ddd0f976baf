use std::sync::Arc;

use crate::port::inbound::runtime::RuntimeState;

use super::super::command::{command_help, TelegramCommand};
use super::TelegramControl;

impl TelegramControl {
    #[must_use]
    pub fn new(state: Arc<dyn RuntimeState>) -> Self {
        Self { state }
    }

    /// Execute one parsed command and return response text.
    #[must_use]
    pub fn execute(&self, command: TelegramCommand) -> String {
        match command {
            TelegramCommand::Start | TelegramCommand::Help => command_help().to_string(),
            TelegramCommand::Status => self.status_text(),
            TelegramCommand::Today => self.today_text(),
            TelegramCommand::Version => self.version_text(),
        }
    }
}
