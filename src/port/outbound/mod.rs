//! Outbound (driven) ports implemented by outbound adapters.

pub mod cursor;
pub mod indexer;
pub mod notifier;
pub mod price;
