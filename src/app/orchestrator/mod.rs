//! App orchestration module.
//!
//! Wires the indexer, price feed, notifiers and state file together and runs
//! the polling loop alongside the daily summary task.

mod builder;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::app::config::Config;
use crate::app::herald::Herald;
use crate::app::schedule::{next_summary_at, until_next_summary};
use crate::app::state::AppState;
use crate::app::tracker::{Cursor, Tracker};
use crate::error::Result;
use crate::port::{BlockSource, CursorStore, SavedCursor};

pub(crate) use builder::{build_block_source, build_reporter};
#[cfg(feature = "telegram")]
pub(crate) use builder::telegram_config;

use builder::{build_cursor_store, build_notifier_registry};

/// Main application orchestrator.
pub struct App;

impl App {
    /// Run the main application loop.
    ///
    /// Only returns on a startup error; the polling loop itself logs and
    /// retries indexer failures forever.
    pub async fn run(config: Config) -> Result<()> {
        info!(urls = ?config.indexer.urls, "Starting herald");

        let state = Arc::new(AppState::default());

        let source: Arc<dyn BlockSource> = build_block_source(&config)?;

        let notifiers = Arc::new(build_notifier_registry(&config, state.clone()));
        info!(notifiers = notifiers.len(), "Notifiers initialized");

        let herald = Arc::new(Herald::new(
            build_reporter(&config, source.clone()),
            notifiers,
            state,
        ));

        let store = build_cursor_store(&config);
        let mut tracker = Tracker::new(
            source,
            config.tracker.start_height,
            config.tracker.max_catch_up,
        );
        if let Some(saved) = store.as_deref().and_then(load_cursor) {
            info!(height = saved.height, hash = %saved.hash, "Resuming from state file");
            tracker = tracker.resume_from(saved.into());
        }

        if config.summary.enabled {
            tokio::spawn(run_daily_summary(herald.clone(), config.summary.hour_utc));
        }

        run_tracker(
            tracker,
            &herald,
            store.as_deref(),
            config.tracker.poll_interval(),
        )
        .await
    }
}

/// Poll forever, handing every tracked block to the herald.
async fn run_tracker(
    mut tracker: Tracker,
    herald: &Herald,
    store: Option<&dyn CursorStore>,
    poll_interval: Duration,
) -> Result<()> {
    let mut saved: Option<Cursor> = tracker.cursor().cloned();

    info!(poll_interval_ms = poll_interval.as_millis() as u64, "Watching for blocks");

    loop {
        match tracker.poll().await {
            Ok(messages) => {
                for message in messages {
                    herald.handle(message).await;
                }
            }
            Err(e) => warn!(error = %e, "Indexer poll failed"),
        }

        if let Some(store) = store {
            if tracker.cursor() != saved.as_ref() {
                saved = tracker.cursor().cloned();
                if let Some(cursor) = &saved {
                    save_cursor(store, cursor);
                }
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}

/// Send the daily summary at `hour_utc` every day.
async fn run_daily_summary(herald: Arc<Herald>, hour_utc: u32) {
    loop {
        let now = Utc::now();
        debug!(at = %next_summary_at(now, hour_utc), "Next daily summary scheduled");
        tokio::time::sleep(until_next_summary(now, hour_utc)).await;
        herald.send_daily_summary();
    }
}

fn load_cursor(store: &dyn CursorStore) -> Option<SavedCursor> {
    match store.load() {
        Ok(saved) => saved,
        Err(e) => {
            warn!(error = %e, "Failed to read state file, starting fresh");
            None
        }
    }
}

fn save_cursor(store: &dyn CursorStore, cursor: &Cursor) {
    if let Err(e) = store.save(&SavedCursor::from(cursor)) {
        warn!(height = cursor.height, error = %e, "Failed to write state file");
    }
}
