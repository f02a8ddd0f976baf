//! Outbound adapters (driven side).

pub mod chronik;
pub mod coingecko;
pub mod notifier;
pub mod state_file;
