//! Application layer - orchestration, configuration, and shared state.

mod config;
mod herald;
mod orchestrator;
mod schedule;
mod state;
mod tracker;

pub use config::{
    Config, IndexerConfig, LoggingConfig, PriceConfig, ReportConfig, SummaryConfig,
    TelegramAppConfig, TrackerConfig,
};
pub use herald::{BlockReporter, Herald};
pub use orchestrator::App;
pub(crate) use orchestrator::{build_block_source, build_reporter};
#[cfg(feature = "telegram")]
pub(crate) use orchestrator::telegram_config;
pub use schedule::{next_summary_at, until_next_summary};
pub use state::AppState;
pub use tracker::{Cursor, Tracker, TrackingMessage};
