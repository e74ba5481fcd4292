//! The last-played marker: the single most recent individual song play,
//! independent of queue sessions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::storage::KvStore;

const LAST_PLAYED_KEY: &str = "last_played";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPlayedMarker {
    pub title: String,
}

/// Records and reads the marker. Overwritten on every song play; cleared by
/// explicit user action.
#[derive(Clone)]
pub struct LastPlayed {
    store: Arc<dyn KvStore>,
}

impl LastPlayed {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn record(&self, title: &str) {
        let marker = LastPlayedMarker {
            title: title.to_string(),
        };
        let raw = serde_json::to_string(&marker).expect("marker serializes");
        if let Err(e) = self.store.set(LAST_PLAYED_KEY, &raw) {
            // Not worth interrupting playback over.
            tracing::warn!("failed to record last played song: {}", e);
        }
    }

    pub fn get(&self) -> Option<LastPlayedMarker> {
        let raw = self.store.get(LAST_PLAYED_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(marker) => Some(marker),
            Err(e) => {
                tracing::warn!("stored last-played marker failed to parse: {}", e);
                None
            }
        }
    }

    pub fn clear(&self) {
        self.store.remove(LAST_PLAYED_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_record_overwrites() {
        let last = LastPlayed::new(Arc::new(MemoryStore::new()));
        assert!(last.get().is_none());

        last.record("Amazing Grace");
        last.record("Be Thou My Vision");
        assert_eq!(last.get().unwrap().title, "Be Thou My Vision");
    }

    #[test]
    fn test_clear() {
        let last = LastPlayed::new(Arc::new(MemoryStore::new()));
        last.record("Amazing Grace");
        last.clear();
        assert!(last.get().is_none());
    }

    #[test]
    fn test_malformed_marker_reads_as_absent() {
        let store = Arc::new(MemoryStore::new());
        store.set("last_played", "???").unwrap();
        let last = LastPlayed::new(store);
        assert!(last.get().is_none());
    }
}
