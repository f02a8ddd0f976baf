//! Persistence of the tracker position across restarts.

use crate::error::Result;

/// Last block the tracker fully handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedCursor {
    pub height: u64,
    pub hash: String,
}

/// Storage for the tracker cursor.
pub trait CursorStore: Send + Sync {
    /// The saved cursor, or `None` when nothing was saved yet.
    fn load(&self) -> Result<Option<SavedCursor>>;

    fn save(&self, cursor: &SavedCursor) -> Result<()>;
}
