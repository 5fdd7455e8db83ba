//! Per-item outcome tracking for a batch run.

use derive_more::Display;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ItemState {
    /// The item was handled and changed something.
    #[display("PROCESSED")]
    Processed,
    /// The item was handled but needed no change.
    #[display("UNPROCESSED")]
    Unprocessed,
}

/// Latest known outcome of one item, keyed by the item's stable key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerItem {
    Normal { id: String, state: ItemState },
    Error { id: String, message: String },
}

impl TrackerItem {
    pub fn processed(id: impl Into<String>) -> Self {
        Self::Normal { id: id.into(), state: ItemState::Processed }
    }

    pub fn unprocessed(id: impl Into<String>) -> Self {
        Self::Normal { id: id.into(), state: ItemState::Unprocessed }
    }

    pub fn error(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error { id: id.into(), message: message.into() }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Normal { id, .. } | Self::Error { id, .. } => id,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// View handed to the item callback. Borrowed for the duration of the call,
/// which happens under the tracker's lock.
#[derive(Debug, Clone, Copy)]
pub struct ItemUpdate<'a> {
    pub current_item: &'a TrackerItem,
    pub total: usize,
    pub all_items: &'a BTreeMap<String, TrackerItem>,
}

pub type ItemCallback = Arc<dyn Fn(ItemUpdate<'_>) + Send + Sync>;

/// Records the outcome of every item; a later outcome for the same id
/// replaces the earlier one.
pub struct ItemTracker {
    items: Mutex<BTreeMap<String, TrackerItem>>,
    total: usize,
    callback: Option<ItemCallback>,
}

impl ItemTracker {
    pub fn new(total: usize, callback: Option<ItemCallback>) -> Self {
        Self { items: Mutex::new(BTreeMap::new()), total, callback }
    }

    pub fn track(&self, item: TrackerItem) {
        let mut items = self.items.lock().unwrap_or_else(PoisonError::into_inner);
        let id = item.id().to_string();
        items.insert(id.clone(), item);
        if let Some(callback) = &self.callback
            && let Some(current_item) = items.get(&id)
        {
            callback(ItemUpdate { current_item, total: self.total, all_items: &items });
        }
    }

    /// Clone of every tracked item, ordered by id.
    pub fn snapshot(&self) -> Vec<TrackerItem> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner).values().cloned().collect()
    }

    /// Only the items whose latest outcome is an error.
    pub fn errors(&self) -> Vec<TrackerItem> {
        self.snapshot().into_iter().filter(TrackerItem::is_error).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let tracker = ItemTracker::new(2, None);
        tracker.track(TrackerItem::error("a.jpg", "FAILED_MOVING_FILE: a.jpg"));
        tracker.track(TrackerItem::unprocessed("b.jpg"));
        tracker.track(TrackerItem::processed("a.jpg"));
        assert_eq!(
            tracker.snapshot(),
            [TrackerItem::processed("a.jpg"), TrackerItem::unprocessed("b.jpg")]
        );
        assert!(tracker.errors().is_empty());
    }

    #[test]
    fn test_callback_sees_the_whole_map() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ItemCallback = Arc::new(move |update: ItemUpdate<'_>| {
            sink.lock().unwrap().push((update.current_item.id().to_string(), update.all_items.len(), update.total));
        });
        let tracker = ItemTracker::new(3, Some(callback));
        tracker.track(TrackerItem::processed("a"));
        tracker.track(TrackerItem::error("b", "boom"));
        tracker.track(TrackerItem::processed("b"));
        assert_eq!(
            *seen.lock().unwrap(),
            [("a".to_string(), 1, 3), ("b".to_string(), 2, 3), ("b".to_string(), 2, 3)]
        );
    }

    #[test]
    fn test_state_display() {
        assert_eq!(ItemState::Processed.to_string(), "PROCESSED");
        assert_eq!(ItemState::Unprocessed.to_string(), "UNPROCESSED");
    }
}
