//! The previous/current/next triple returned by the live feed

use crate::error::WindowError;
use crate::types::UpstreamItem;

/// A feed window holding at least a previous, current and next item
///
/// Feeds may return more than three items; only the first three are
/// meaningful and the rest are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    items: Vec<UpstreamItem>,
}

impl Window {
    /// Number of items needed to form a window
    pub const SIZE: usize = 3;

    /// Builds a window from the feed's ordered items
    pub fn new(mut items: Vec<UpstreamItem>) -> Result<Self, WindowError> {
        if items.len() < Self::SIZE {
            return Err(WindowError::TooShort { len: items.len() });
        }
        items.truncate(Self::SIZE);
        Ok(Self { items })
    }

    /// The item that finished most recently
    pub fn previous(&self) -> &UpstreamItem {
        &self.items[0]
    }

    /// The item currently on air
    pub fn current(&self) -> &UpstreamItem {
        &self.items[1]
    }

    /// The item scheduled after the current one
    pub fn next(&self) -> &UpstreamItem {
        &self.items[2]
    }

    /// The sub-window reconciled each cycle: current followed by next
    pub fn current_and_next(&self) -> &[UpstreamItem] {
        &self.items[1..Self::SIZE]
    }
}
