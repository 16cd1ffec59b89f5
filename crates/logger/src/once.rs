//! Once-per-tag suppression

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Tracks open suppression windows by tag.
///
/// The first record for a tag passes and opens a window; later records for
/// the same tag are dropped until the window elapses. Expired windows are
/// pruned on the next check.
#[derive(Debug, Default)]
pub struct OnceTable {
    windows: Mutex<HashMap<String, Instant>>,
}

impl OnceTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a record for `tag` may pass at `now`. Opens a `window` for
    /// the tag when it does.
    pub fn check(&self, tag: &str, window: Duration, now: Instant) -> bool {
        let mut windows = self.windows.lock();
        windows.retain(|_, until| *until > now);
        if windows.contains_key(tag) {
            return false;
        }
        windows.insert(tag.to_string(), now + window);
        true
    }

    /// Number of tags with an open (or not yet pruned) window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.lock().len()
    }

    /// Whether no window is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.lock().is_empty()
    }
}
