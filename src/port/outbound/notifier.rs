//! Notifier port for event notifications.
//!
//! This module defines the trait for sending notifications about
//! chain events such as newly connected blocks, reorgs, and daily summaries.

use std::sync::Arc;

use crate::domain::{BlockReport, DailySummary};

/// Events that can trigger notifications.
#[derive(Debug, Clone)]
pub enum Event {
    /// A block was connected and fully summarized.
    BlockConnected(Arc<BlockReport>),
    /// A block was connected but could not be summarized.
    BlockFallback {
        /// Height of the block.
        height: u64,
        /// Hash of the block.
        hash: String,
    },
    /// A previously announced block left the main chain.
    ChainReorganized {
        /// Height of the orphaned block.
        height: u64,
        /// Hash of the orphaned block.
        hash: String,
    },
    /// End-of-day summary.
    DailySummary(DailySummary),
}

/// Trait for notification handlers.
///
/// Implement this trait to receive events from the system.
/// Notifications are fire-and-forget.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - The `notify` method should not block or perform slow I/O synchronously
/// - Consider spawning async tasks for slow operations
pub trait Notifier: Send + Sync {
    /// Handle an event.
    ///
    /// This method should return quickly. For slow operations (e.g., HTTP calls),
    /// implementations should hand the event to a background task.
    fn notify(&self, event: Event);
}

/// Registry of notifiers (composite pattern).
///
/// Broadcasts events to all registered notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Notify all registered notifiers.
    pub fn notify_all(&self, event: Event) {
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _event: Event) {}
}

/// A logging notifier that logs events via tracing.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Event) {
        use tracing::{info, warn};
        match event {
            Event::BlockConnected(report) => {
                let block = &report.summary;
                info!(
                    height = block.height,
                    hash = %block.hash,
                    txs = block.num_txs,
                    miner = %block.miner,
                    geneses = block.geneses.len(),
                    app_txs = block.app_txs.len(),
                    "Block connected"
                );
            }
            Event::BlockFallback { height, hash } => {
                warn!(height, hash = %hash, "Block announced without summary");
            }
            Event::ChainReorganized { height, hash } => {
                warn!(height, hash = %hash, "Block orphaned");
            }
            Event::DailySummary(day) => {
                info!(
                    date = ?day.date,
                    blocks = day.blocks,
                    txs = day.txs,
                    geneses = day.token_geneses,
                    "Daily summary"
                );
            }
        }
    }
}
