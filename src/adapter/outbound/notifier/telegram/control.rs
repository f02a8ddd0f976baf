//! Telegram command execution against runtime app state.

use std::sync::Arc;

use crate::port::inbound::runtime::RuntimeState;

mod dispatch;
mod render;
mod runtime;

/// Runtime command executor for Telegram control commands.
#[derive(Clone)]
pub struct TelegramControl {
    state: Arc<dyn RuntimeState>,
}
