//! Herald - eCash block announcements for Telegram.
//!
//! Follows the chain through one or more chronik indexer instances, turns
//! every new block into a summary (miner, staking reward, token geneses,
//! token sends and burns, app actions, XEC sends) and posts it as HTML to a
//! Telegram chat. A daily summary goes out at a configured UTC hour.
//!
//! # Modules
//!
//! - [`domain`] - Indexer data model, script and address handling, block parsing
//! - [`port`] - Traits at the seams: block source, price source, notifiers
//! - [`adapter`] - Chronik and CoinGecko clients, Telegram notifier, state file, CLI
//! - [`app`] - Configuration, block tracker, orchestration
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `telegram` (default) - Telegram notifier and bot commands

pub mod adapter;
pub mod app;
pub mod domain;
pub mod error;
pub mod port;
