//! Playback queue sessions.
//!
//! A session is an ordered list of playable items plus a cursor, persisted so
//! that "random play" and playlist playback survive navigation between views.
//! Random play and playlists both materialize sessions through this manager;
//! views only ever see the persisted state.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::storage::{KvStore, StorageError};

/// Storage key holding the active session.
const SESSION_KEY: &str = "queue_session";

/// One playable entry: a display title plus an opaque fragment locator that
/// navigates straight to the player view for the item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub title: String,
    pub href: String,
}

/// The persisted session: ordered items plus the current position.
///
/// `current_index` stays within bounds while a session exists; a session
/// sitting on its last item is complete and never advances past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueSession {
    pub queue: Vec<QueueItem>,
    pub current_index: usize,
}

impl QueueSession {
    /// The item at the cursor, if the stored state is coherent.
    pub fn current(&self) -> Option<&QueueItem> {
        self.queue.get(self.current_index)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_complete(&self) -> bool {
        self.current_index + 1 >= self.queue.len()
    }
}

/// Result of starting a session. Playback proceeds from `first` even when
/// persistence failed; the error is carried so the caller can warn that the
/// position will not survive navigation.
#[derive(Debug)]
pub struct SessionStart {
    pub first: QueueItem,
    pub persisted: Result<(), StorageError>,
}

/// Result of advancing the persisted session.
#[derive(Debug)]
pub enum Advance {
    /// No session is stored (or the stored text failed to parse).
    NoSession,
    /// Already on the last item; the session is complete and unchanged.
    Complete,
    /// Moved to the next item.
    Next {
        item: QueueItem,
        persisted: Result<(), StorageError>,
    },
}

/// Builds, persists and advances playback sessions.
#[derive(Clone)]
pub struct QueueManager {
    store: Arc<dyn KvStore>,
}

impl QueueManager {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Start a fresh session at index 0, overwriting any prior one.
    ///
    /// Returns `None` for an empty item list.
    pub fn start_session(&self, items: Vec<QueueItem>) -> Option<SessionStart> {
        let first = items.first()?.clone();

        let session = QueueSession {
            queue: items,
            current_index: 0,
        };

        Some(SessionStart {
            first,
            persisted: self.persist(&session),
        })
    }

    /// Shuffle a copy of `items` and take the first `count`.
    ///
    /// Uses an unbiased Fisher-Yates shuffle; `count` larger than the
    /// population silently clamps.
    pub fn build_random_subset(&self, items: &[QueueItem], count: usize) -> Vec<QueueItem> {
        let mut shuffled = items.to_vec();
        shuffled.shuffle(&mut rand::thread_rng());
        shuffled.truncate(count.min(items.len()));
        shuffled
    }

    /// Advance the persisted session to its next item.
    pub fn advance(&self) -> Advance {
        let Some(mut session) = self.current_session() else {
            return Advance::NoSession;
        };

        if session.is_complete() {
            return Advance::Complete;
        }

        session.current_index += 1;
        let item = session.queue[session.current_index].clone();

        Advance::Next {
            item,
            persisted: self.persist(&session),
        }
    }

    /// Read the persisted session. Missing or malformed storage is no
    /// session, never an error.
    pub fn current_session(&self) -> Option<QueueSession> {
        let raw = self.store.get(SESSION_KEY)?;

        match serde_json::from_str::<QueueSession>(&raw) {
            Ok(session) if session.current_index < session.queue.len() => Some(session),
            Ok(_) => {
                tracing::warn!("stored queue session has an out-of-range index; discarding");
                None
            }
            Err(e) => {
                tracing::warn!("stored queue session failed to parse: {}", e);
                None
            }
        }
    }

    /// Drop the persisted session (user closed the playlist view).
    pub fn clear(&self) {
        self.store.remove(SESSION_KEY);
    }

    fn persist(&self, session: &QueueSession) -> Result<(), StorageError> {
        // Serializing these records cannot fail; write errors can.
        let raw = serde_json::to_string(session).expect("queue session serializes");
        self.store.set(SESSION_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FailingStore, MemoryStore};

    fn item(title: &str) -> QueueItem {
        QueueItem {
            title: title.to_string(),
            href: format!("song-player?title={}", title),
        }
    }

    fn manager() -> (QueueManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (QueueManager::new(store.clone()), store)
    }

    #[test]
    fn test_start_session_persists_and_returns_first() {
        let (queue, _store) = manager();

        let start = queue
            .start_session(vec![item("x"), item("y")])
            .expect("non-empty");
        assert_eq!(start.first.title, "x");
        assert!(start.persisted.is_ok());

        let session = queue.current_session().expect("persisted");
        assert_eq!(session.current_index, 0);
        assert_eq!(session.len(), 2);
    }

    #[test]
    fn test_start_session_rejects_empty() {
        let (queue, _store) = manager();
        assert!(queue.start_session(Vec::new()).is_none());
        assert!(queue.current_session().is_none());
    }

    #[test]
    fn test_advance_through_session() {
        let (queue, _store) = manager();
        queue.start_session(vec![item("x"), item("y"), item("z")]);

        match queue.advance() {
            Advance::Next { item, .. } => assert_eq!(item.title, "y"),
            other => panic!("expected Next, got {:?}", other),
        }
        match queue.advance() {
            Advance::Next { item, .. } => assert_eq!(item.title, "z"),
            other => panic!("expected Next, got {:?}", other),
        }

        // Complete: no further mutation.
        assert!(matches!(queue.advance(), Advance::Complete));
        let session = queue.current_session().unwrap();
        assert_eq!(session.current_index, 2);
        assert!(session.is_complete());
    }

    #[test]
    fn test_advance_without_session() {
        let (queue, _store) = manager();
        assert!(matches!(queue.advance(), Advance::NoSession));
    }

    #[test]
    fn test_single_item_session_is_complete() {
        let (queue, _store) = manager();
        queue.start_session(vec![item("only")]);
        assert!(matches!(queue.advance(), Advance::Complete));
    }

    #[test]
    fn test_corrupt_storage_is_no_session() {
        let (queue, store) = manager();
        store.set("queue_session", "{not json").unwrap();
        assert!(queue.current_session().is_none());
        assert!(matches!(queue.advance(), Advance::NoSession));
    }

    #[test]
    fn test_out_of_range_index_is_no_session() {
        let (queue, store) = manager();
        store
            .set(
                "queue_session",
                r#"{"queue":[{"title":"x","href":"h"}],"current_index":5}"#,
            )
            .unwrap();
        assert!(queue.current_session().is_none());
    }

    #[test]
    fn test_new_session_overwrites_previous() {
        let (queue, _store) = manager();
        queue.start_session(vec![item("a"), item("b")]);
        queue.advance();

        queue.start_session(vec![item("c")]);
        let session = queue.current_session().unwrap();
        assert_eq!(session.current_index, 0);
        assert_eq!(session.queue[0].title, "c");
    }

    #[test]
    fn test_clear_removes_session() {
        let (queue, _store) = manager();
        queue.start_session(vec![item("a")]);
        queue.clear();
        assert!(queue.current_session().is_none());
    }

    #[test]
    fn test_random_subset_is_permutation_when_count_exceeds_len() {
        let (queue, _store) = manager();
        let items: Vec<QueueItem> = (0..8).map(|i| item(&format!("s{}", i))).collect();

        let subset = queue.build_random_subset(&items, 100);
        assert_eq!(subset.len(), items.len());

        let mut titles: Vec<&str> = subset.iter().map(|i| i.title.as_str()).collect();
        titles.sort_unstable();
        let mut expected: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(titles, expected);
    }

    #[test]
    fn test_random_subset_clamps_and_draws_from_population() {
        let (queue, _store) = manager();
        let items: Vec<QueueItem> = (0..20).map(|i| item(&format!("s{}", i))).collect();

        let subset = queue.build_random_subset(&items, 5);
        assert_eq!(subset.len(), 5);
        for picked in &subset {
            assert!(items.contains(picked));
        }
    }

    #[test]
    fn test_write_failure_surfaces_but_playback_proceeds() {
        let queue = QueueManager::new(Arc::new(FailingStore::new()));

        let start = queue.start_session(vec![item("x")]).expect("non-empty");
        assert_eq!(start.first.title, "x");
        assert!(start.persisted.is_err());
    }
}
