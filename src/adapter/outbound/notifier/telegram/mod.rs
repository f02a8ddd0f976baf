//! Telegram announcements and command handling.
//!
//! Formatting is always available so block messages can be rendered without
//! a bot; sending and the command listener need the `telegram` feature.

#[cfg(feature = "telegram")]
mod auth;
#[cfg(feature = "telegram")]
mod command;
#[cfg(feature = "telegram")]
pub mod control;
pub mod format;
#[cfg(feature = "telegram")]
pub mod notifier;
