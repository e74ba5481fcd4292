//! View registry and the contracts views implement.
//!
//! Each route name maps to a view factory. Navigation creates a fresh
//! view, runs its async `render` in a background task, and once the
//! markup is on screen runs the sync `after_render` hook to set up the
//! header, key bindings, and any follow-up actions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;

use crate::action::Action;
use crate::client::ChurchClient;
use crate::feed::FeedClient;
use crate::last_played::LastPlayed;
use crate::markup::Markup;
use crate::playlist::PlaylistStore;
use crate::prefs::Preferences;
use crate::queue::{QueueItem, QueueManager};
use crate::route::Params;

mod create_playlist;
mod find_sermons;
mod home;
mod playlists;
mod series;
mod series_details;
mod sermon_player;
mod sermons;
mod settings;
mod song_player;
mod songs;

pub(crate) use create_playlist::form_state as playlist_form_state;

/// Shared handles every view renders against.
pub struct Services {
    pub client: ChurchClient,
    pub feed: FeedClient,
    pub queue: QueueManager,
    pub playlists: PlaylistStore,
    pub last_played: LastPlayed,
    pub prefs: Preferences,
}

/// Context handed to a view's async render.
pub struct RenderCx {
    pub services: Arc<Services>,
    pub params: Params,
}

/// A footer key binding contributed by the current view.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBind {
    pub key: char,
    pub label: String,
    pub action: Action,
}

/// Shell state the current view controls: header title, back affordance,
/// view-specific key bindings, and the pool random play draws from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Chrome {
    pub title: String,
    pub back_visible: bool,
    pub bindings: Vec<KeyBind>,
    pub shuffle_pool: Vec<QueueItem>,
}

impl Chrome {
    pub fn bind(&mut self, key: char, label: impl Into<String>, action: Action) {
        self.bindings.push(KeyBind {
            key,
            label: label.into(),
            action,
        });
    }
}

/// Context handed to a view's post-render hook. The hook runs on the main
/// loop after the markup is displayed, mirroring how the rendered content
/// is what the hook has to work with.
pub struct HookCx<'a> {
    pub services: &'a Services,
    pub params: &'a Params,
    pub markup: &'a Markup,
    pub chrome: &'a mut Chrome,
    /// Actions to dispatch once the hook returns.
    pub actions: Vec<Action>,
}

/// A lazily constructed route view.
#[async_trait]
pub trait View: Send {
    /// Produce the view's markup. Runs in a background task, so it may
    /// await network calls freely.
    async fn render(&self, cx: &RenderCx) -> Result<Markup>;

    /// Wire up chrome and follow-up actions after the markup is shown.
    fn after_render(&self, cx: &mut HookCx) {
        let _ = cx;
    }
}

pub type ViewFactory = fn() -> Box<dyn View>;

/// Route name to view factory table.
pub fn registry() -> HashMap<&'static str, ViewFactory> {
    let mut map: HashMap<&'static str, ViewFactory> = HashMap::new();
    map.insert("home", || Box::new(home::HomeView));
    map.insert("songs", || Box::new(songs::SongsView));
    map.insert("song-player", || Box::new(song_player::SongPlayerView));
    map.insert("sermons", || Box::new(sermons::SermonsView));
    map.insert("find-sermons", || Box::new(find_sermons::FindSermonsView));
    map.insert("series", || Box::new(series::SeriesView));
    map.insert("series-details", || {
        Box::new(series_details::SeriesDetailsView)
    });
    map.insert("sermon-player", || Box::new(sermon_player::SermonPlayerView));
    map.insert("playlists", || Box::new(playlists::PlaylistsView));
    map.insert("create-playlist", || {
        Box::new(create_playlist::CreatePlaylistView)
    });
    map.insert("settings", || Box::new(settings::SettingsView));
    map
}

/// Link target for a sermon row: the in-app player when the custom player
/// preference is on, the podcast host otherwise. Sermons without a slug
/// surface an error instead.
pub(crate) fn sermon_row(
    markup: Markup,
    sermon: &crate::client::models::Sermon,
    use_custom_player: bool,
) -> Markup {
    use crate::markup::Target;

    let label = format!("{} ({})", sermon.title, sermon.speaker_or_unknown());
    let target = match (sermon.slug.as_deref().filter(|s| !s.is_empty()), use_custom_player) {
        (Some(slug), true) => Target::Route(crate::route::fragment(
            "sermon-player",
            &[
                ("slug", slug),
                ("title", &sermon.title),
                ("speaker", sermon.speaker.as_deref().unwrap_or("")),
            ],
        )),
        (Some(_), false) => match sermon.external_url() {
            Some(url) => Target::External(url),
            None => Target::Dispatch(Action::Error(String::from("No audio for this sermon"))),
        },
        (None, _) => Target::Dispatch(Action::Error(String::from("No audio for this sermon"))),
    };

    let mut markup = markup;
    markup.nodes.push(crate::markup::Node::Link(crate::markup::Link {
        label,
        target,
    }));
    if let Some(date) = sermon.date.as_deref().filter(|d| !d.is_empty()) {
        markup = markup.text(format!("    {}", date));
    }
    markup
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::Services;
    use crate::client::ChurchClient;
    use crate::feed::FeedClient;
    use crate::last_played::LastPlayed;
    use crate::playlist::PlaylistStore;
    use crate::prefs::Preferences;
    use crate::queue::QueueManager;
    use crate::storage::{KvStore, MemoryStore};

    /// Services over an in-memory store, for hook tests that never hit
    /// the network.
    pub fn services() -> Arc<Services> {
        let store: Arc<dyn KvStore> = Arc::new(MemoryStore::new());
        Arc::new(Services {
            client: ChurchClient::new("http://unused.invalid", "test"),
            feed: FeedClient::new("http://unused.invalid/feed.xml"),
            queue: QueueManager::new(Arc::clone(&store)),
            playlists: PlaylistStore::new(Arc::clone(&store)),
            last_played: LastPlayed::new(Arc::clone(&store)),
            prefs: Preferences::new(store),
        })
    }
}
