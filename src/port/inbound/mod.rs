//! Inbound (driving) ports consumed by inbound adapters.
//!
//! Inbound ports expose application state to external drivers such as the
//! command-line interface and the Telegram bot control surface.

pub mod runtime;
