//! Chronik indexer adapter.
//!
//! Implements [`BlockSource`](crate::port::BlockSource) over the indexer's
//! JSON HTTP API, failing over between instances.

mod client;

pub use client::ChronikClient;
