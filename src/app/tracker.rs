//! Polling block tracker.
//!
//! The tracker remembers the last block it handed out and, on every poll,
//! walks from there to the indexer's tip. Each new block is linked to the
//! previous one through `prevHash`; a mismatch means the chain we followed
//! was replaced and the cursor steps back, one announced block at a time.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{BlockInfo, BlockRef};
use crate::error::Result;
use crate::port::{BlockSource, SavedCursor};

/// Announced ancestors kept for rolling back deeper reorgs.
const MAX_HISTORY: usize = 100;

/// Last block handed out by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub height: u64,
    pub hash: String,
}

impl From<&BlockInfo> for Cursor {
    fn from(info: &BlockInfo) -> Self {
        Self {
            height: info.height,
            hash: info.hash.clone(),
        }
    }
}

impl From<SavedCursor> for Cursor {
    fn from(saved: SavedCursor) -> Self {
        Self {
            height: saved.height,
            hash: saved.hash,
        }
    }
}

impl From<&Cursor> for SavedCursor {
    fn from(cursor: &Cursor) -> Self {
        Self {
            height: cursor.height,
            hash: cursor.hash.clone(),
        }
    }
}

/// What the tracker found on one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingMessage {
    /// A block that extends the followed chain.
    Include(BlockInfo),
    /// A previously included block that is no longer on the chain.
    Rollback { height: u64, hash: String },
}

pub struct Tracker {
    source: Arc<dyn BlockSource>,
    cursor: Option<Cursor>,
    /// Consecutive ancestors of `cursor`, oldest first.
    history: VecDeque<Cursor>,
    start_height: Option<u64>,
    max_catch_up: u64,
}

impl Tracker {
    /// Create a tracker that anchors at the tip on its first poll, or just
    /// before `start_height` when one is given.
    #[must_use]
    pub fn new(source: Arc<dyn BlockSource>, start_height: Option<u64>, max_catch_up: u64) -> Self {
        Self {
            source,
            cursor: None,
            history: VecDeque::new(),
            start_height,
            max_catch_up,
        }
    }

    /// Continue after a previously handled block.
    #[must_use]
    pub fn resume_from(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self.history.clear();
        self
    }

    #[must_use]
    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    /// Walk from the cursor to the current tip.
    ///
    /// Fails only if nothing could be produced. An error halfway through
    /// returns the messages gathered so far; the cursor always matches the
    /// last message handed out, so the next poll picks up from there.
    pub async fn poll(&mut self) -> Result<Vec<TrackingMessage>> {
        let tip = self.source.blockchain_info().await?;

        let Some(cursor) = self.cursor.clone() else {
            self.anchor(tip.tip_height, &tip.tip_hash).await?;
            return self.walk(tip.tip_height, Vec::new()).await;
        };

        let mut messages = Vec::new();

        if tip.tip_height <= cursor.height {
            if tip.tip_height == cursor.height && tip.tip_hash == cursor.hash {
                return Ok(messages);
            }
            warn!(
                height = cursor.height,
                hash = %cursor.hash,
                tip_height = tip.tip_height,
                tip_hash = %tip.tip_hash,
                "Tip does not extend the followed chain"
            );
            let rewound = self
                .rewind_below(tip.tip_height, Some(tip.tip_hash.as_str()), &mut messages)
                .await;
            if let Err(e) = rewound {
                if messages.is_empty() {
                    return Err(e);
                }
                warn!(error = %e, "Rewind failed, resuming next poll");
                return Ok(messages);
            }
        } else if tip.tip_height - cursor.height > self.max_catch_up {
            let skip_to = tip.tip_height - self.max_catch_up;
            warn!(
                height = cursor.height,
                tip_height = tip.tip_height,
                skip_to,
                "Too far behind, skipping ahead"
            );
            let base = self.source.block(&BlockRef::Height(skip_to)).await?;
            self.cursor = Some(Cursor::from(&base));
            self.history.clear();
        }

        self.walk(tip.tip_height, messages).await
    }

    async fn anchor(&mut self, tip_height: u64, tip_hash: &str) -> Result<()> {
        let cursor = match self.start_height {
            Some(start) if start > 0 && start <= tip_height => {
                let base = self.source.block(&BlockRef::Height(start - 1)).await?;
                Cursor::from(&base)
            }
            _ => Cursor {
                height: tip_height,
                hash: tip_hash.to_string(),
            },
        };
        info!(height = cursor.height, hash = %cursor.hash, "Tracker anchored");
        self.cursor = Some(cursor);
        self.history.clear();
        Ok(())
    }

    async fn walk(
        &mut self,
        tip_height: u64,
        mut messages: Vec<TrackingMessage>,
    ) -> Result<Vec<TrackingMessage>> {
        while let Some(cursor) = self.cursor.clone() {
            if cursor.height >= tip_height {
                break;
            }
            let next = cursor.height + 1;

            let info = match self.source.block(&BlockRef::Height(next)).await {
                Ok(info) => info,
                Err(e) if messages.is_empty() => return Err(e),
                Err(e) => {
                    warn!(height = next, error = %e, "Block fetch failed, resuming next poll");
                    break;
                }
            };

            if info.prev_hash != cursor.hash {
                if cursor.height == 0 {
                    warn!(hash = %cursor.hash, "Genesis block does not match indexer");
                    break;
                }
                warn!(
                    height = cursor.height,
                    hash = %cursor.hash,
                    next_prev_hash = %info.prev_hash,
                    "Block does not extend the followed chain, rolling back"
                );
                if let Err(e) = self.rewind_below(cursor.height, None, &mut messages).await {
                    warn!(height = cursor.height, error = %e, "Rewind failed, resuming next poll");
                    break;
                }
                continue;
            }

            debug!(height = info.height, hash = %info.hash, "New block");
            self.advance(Cursor::from(&info));
            messages.push(TrackingMessage::Include(info));
        }

        Ok(messages)
    }

    fn advance(&mut self, next: Cursor) {
        if let Some(previous) = self.cursor.replace(next) {
            self.history.push_back(previous);
            if self.history.len() > MAX_HISTORY {
                self.history.pop_front();
            }
        }
    }

    /// Roll back every handed-out block at or above `height`, stopping early
    /// at `keep` if it is one of ours.
    ///
    /// Steps through remembered ancestors; once those run out, asks the
    /// indexer for the block at `height - 1` and continues from there.
    async fn rewind_below(
        &mut self,
        height: u64,
        keep: Option<&str>,
        messages: &mut Vec<TrackingMessage>,
    ) -> Result<()> {
        while let Some(cursor) = self.cursor.clone() {
            if cursor.height < height || cursor.height == 0 || keep == Some(cursor.hash.as_str()) {
                break;
            }
            let parent = match self.history.pop_back() {
                Some(parent) => parent,
                None => {
                    let base = self
                        .source
                        .block(&BlockRef::Height(height.saturating_sub(1)))
                        .await?;
                    Cursor::from(&base)
                }
            };
            self.cursor = Some(parent);
            messages.push(TrackingMessage::Rollback {
                height: cursor.height,
                hash: cursor.hash,
            });
        }
        Ok(())
    }
}
