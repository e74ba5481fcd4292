//! User-authored playlists.
//!
//! A playlist is a durable template; playing one materializes a queue session
//! through the queue manager. The whole collection is stored as one JSON
//! document, and malformed stored text lists as empty rather than erroring.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::queue::{QueueItem, QueueManager, SessionStart};
use crate::storage::{KvStore, StorageError};

/// Storage key holding the playlist collection.
const PLAYLISTS_KEY: &str = "playlists";

/// A named, ordered collection of playable items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    /// Unique id derived from creation time.
    pub id: String,
    pub name: String,
    pub songs: Vec<QueueItem>,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Durable CRUD over the playlist collection.
pub struct PlaylistStore {
    store: Arc<dyn KvStore>,
    // Last persistence failure, held for the app to surface as a blocking
    // notice. CRUD return values stay about validation only.
    persist_error: Mutex<Option<StorageError>>,
}

impl PlaylistStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            persist_error: Mutex::new(None),
        }
    }

    /// All stored playlists, in insertion order.
    pub fn list(&self) -> Vec<Playlist> {
        let Some(raw) = self.store.get(PLAYLISTS_KEY) else {
            return Vec::new();
        };

        match serde_json::from_str(&raw) {
            Ok(playlists) => playlists,
            Err(e) => {
                tracing::warn!("stored playlists failed to parse: {}", e);
                Vec::new()
            }
        }
    }

    /// Create a playlist. Rejects an empty name or empty song list.
    ///
    /// Not idempotent: identical arguments create distinct playlists.
    pub fn create(&self, name: &str, songs: Vec<QueueItem>) -> bool {
        if name.trim().is_empty() || songs.is_empty() {
            return false;
        }

        let mut playlists = self.list();
        playlists.push(Playlist {
            id: self.fresh_id(&playlists),
            name: name.trim().to_string(),
            songs,
            created_at: chrono::Utc::now().to_rfc3339(),
            updated_at: None,
        });

        self.persist(&playlists);
        true
    }

    /// Replace a playlist's name and songs, stamping `updated_at`.
    ///
    /// Rejects under the same validation as create, or when `id` is unknown.
    /// `id` and `created_at` are preserved.
    pub fn update(&self, id: &str, name: &str, songs: Vec<QueueItem>) -> bool {
        if name.trim().is_empty() || songs.is_empty() {
            return false;
        }

        let mut playlists = self.list();
        let Some(existing) = playlists.iter_mut().find(|p| p.id == id) else {
            return false;
        };

        existing.name = name.trim().to_string();
        existing.songs = songs;
        existing.updated_at = Some(chrono::Utc::now().to_rfc3339());

        self.persist(&playlists);
        true
    }

    /// Remove a playlist. Removing an unknown id is a no-op, not an error.
    pub fn delete(&self, id: &str) -> bool {
        let mut playlists = self.list();
        let before = playlists.len();
        playlists.retain(|p| p.id != id);

        if playlists.len() != before {
            self.persist(&playlists);
        }
        true
    }

    pub fn get_by_id(&self, id: &str) -> Option<Playlist> {
        self.list().into_iter().find(|p| p.id == id)
    }

    /// Materialize a queue session from a playlist's songs.
    ///
    /// Returns `None` for an empty playlist. Stored data can predate
    /// validation or be hand-edited, so the empty case is handled even though
    /// create/update reject it.
    pub fn prepare_playback(&self, playlist: &Playlist, queue: &QueueManager) -> Option<SessionStart> {
        queue.start_session(playlist.songs.clone())
    }

    /// Take the most recent persistence failure, if any.
    pub fn take_persist_error(&self) -> Option<StorageError> {
        self.persist_error.lock().unwrap().take()
    }

    fn persist(&self, playlists: &[Playlist]) {
        let raw = serde_json::to_string(playlists).expect("playlists serialize");
        if let Err(e) = self.store.set(PLAYLISTS_KEY, &raw) {
            tracing::error!("failed to persist playlists: {}", e);
            *self.persist_error.lock().unwrap() = Some(e);
        }
    }

    /// Millisecond-timestamp id, bumped past any collision so that rapid
    /// consecutive creates still get distinct ids.
    fn fresh_id(&self, existing: &[Playlist]) -> String {
        let mut candidate = chrono::Utc::now().timestamp_millis();
        while existing.iter().any(|p| p.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FailingStore, MemoryStore};

    fn song(title: &str) -> QueueItem {
        QueueItem {
            title: title.to_string(),
            href: format!("song-player?title={}", title),
        }
    }

    fn store() -> (PlaylistStore, Arc<MemoryStore>) {
        let kv = Arc::new(MemoryStore::new());
        (PlaylistStore::new(kv.clone()), kv)
    }

    #[test]
    fn test_create_and_list() {
        let (playlists, _kv) = store();

        assert!(playlists.create("Sunday Morning", vec![song("a"), song("b")]));

        let all = playlists.list();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Sunday Morning");
        assert_eq!(all[0].songs.len(), 2);
        assert!(all[0].updated_at.is_none());
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        let (playlists, _kv) = store();

        assert!(!playlists.create("", vec![song("a")]));
        assert!(!playlists.create("   ", vec![song("a")]));
        assert!(!playlists.create("name", Vec::new()));
        assert!(playlists.list().is_empty());
    }

    #[test]
    fn test_duplicate_create_gets_distinct_ids() {
        let (playlists, _kv) = store();

        assert!(playlists.create("A", vec![song("s1")]));
        assert!(playlists.create("A", vec![song("s1")]));

        let all = playlists.list();
        assert_eq!(all.len(), 2);
        assert_ne!(all[0].id, all[1].id);
        assert_eq!(all[0].name, all[1].name);
        assert_eq!(all[0].songs, all[1].songs);
    }

    #[test]
    fn test_update_preserves_identity() {
        let (playlists, _kv) = store();
        playlists.create("A", vec![song("s1")]);
        let original = playlists.list().remove(0);

        assert!(playlists.update(&original.id, "B", vec![song("s2")]));

        let updated = playlists.get_by_id(&original.id).unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.name, "B");
        assert_eq!(updated.songs, vec![song("s2")]);
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_update_rejects_unknown_id_and_invalid_input() {
        let (playlists, _kv) = store();
        playlists.create("A", vec![song("s1")]);
        let id = playlists.list()[0].id.clone();

        assert!(!playlists.update("nope", "B", vec![song("s2")]));
        assert!(!playlists.update(&id, "", vec![song("s2")]));
        assert!(!playlists.update(&id, "B", Vec::new()));

        // Nothing mutated.
        assert_eq!(playlists.list()[0].name, "A");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (playlists, _kv) = store();
        playlists.create("A", vec![song("s1")]);
        let id = playlists.list()[0].id.clone();

        assert!(playlists.delete(&id));
        assert!(playlists.list().is_empty());

        // Deleting a missing id succeeds and changes nothing.
        assert!(playlists.delete(&id));
        assert!(playlists.delete("never-existed"));
        assert!(playlists.list().is_empty());
    }

    #[test]
    fn test_malformed_storage_lists_empty() {
        let (playlists, kv) = store();
        kv.set("playlists", "definitely not json").unwrap();
        assert!(playlists.list().is_empty());
    }

    #[test]
    fn test_prepare_playback_starts_session() {
        let kv = Arc::new(MemoryStore::new());
        let playlists = PlaylistStore::new(kv.clone());
        let queue = QueueManager::new(kv);

        playlists.create("A", vec![song("s1"), song("s2")]);
        let playlist = playlists.list().remove(0);

        let start = playlists.prepare_playback(&playlist, &queue).unwrap();
        assert_eq!(start.first.title, "s1");
        assert_eq!(queue.current_session().unwrap().len(), 2);
    }

    #[test]
    fn test_prepare_playback_of_empty_playlist() {
        let kv = Arc::new(MemoryStore::new());
        let playlists = PlaylistStore::new(kv.clone());
        let queue = QueueManager::new(kv);

        // Hand-edited storage can contain an empty playlist.
        let rogue = Playlist {
            id: String::from("1"),
            name: String::from("empty"),
            songs: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
            updated_at: None,
        };
        assert!(playlists.prepare_playback(&rogue, &queue).is_none());
    }

    #[test]
    fn test_persist_failure_is_held_for_the_app() {
        let playlists = PlaylistStore::new(Arc::new(FailingStore::new()));

        // Validation passed, so the call reports success; the write failure
        // is surfaced separately.
        assert!(playlists.create("A", vec![song("s1")]));
        assert!(playlists.take_persist_error().is_some());
        assert!(playlists.take_persist_error().is_none());
    }
}
