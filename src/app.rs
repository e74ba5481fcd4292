//! Main application state and logic.

use std::sync::Arc;
use std::time::Duration;

use color_eyre::Result;
use tokio::sync::mpsc;

use crate::action::{Action, PlayerState};
use crate::client::ChurchClient;
use crate::config::Config;
use crate::feed::FeedClient;
use crate::last_played::LastPlayed;
use crate::player::{Player, PlayerEvent};
use crate::playlist::PlaylistStore;
use crate::prefs::Preferences;
use crate::queue::{Advance, QueueItem, QueueManager};
use crate::route;
use crate::router::{RouteState, Router};
use crate::storage::{FileStore, KvStore, MemoryStore};
use crate::views::{self, Chrome, HookCx, Services};

const SEEK_STEP: Duration = Duration::from_secs(10);
const VOLUME_STEP: i16 = 5;

/// State of the text input overlay.
#[derive(Debug, Clone)]
pub struct InputPrompt {
    pub label: String,
    /// Fragment to navigate to on submit, with `key` set to the entry.
    pub fragment: String,
    pub key: String,
    pub value: String,
}

/// Main application state.
pub struct App {
    /// Whether the app should quit
    pub should_quit: bool,

    /// Configuration
    pub config: Config,

    /// Shared service handles
    pub services: Arc<Services>,

    /// Router owning the navigation stack and route lifecycle
    pub router: Router,

    /// Shell state the current view set up
    pub chrome: Chrome,

    /// Index of the selected link in the current markup
    pub selected_link: usize,

    /// Content scroll offset
    pub scroll: u16,

    /// Help overlay visible
    pub show_help: bool,

    /// Random play count prompt visible
    pub random_prompt: bool,

    /// Text input overlay, when open
    pub input: Option<InputPrompt>,

    /// Error message to display
    pub error_message: Option<String>,

    /// One-line footer status (external URLs, queue notices)
    pub status: Option<String>,

    /// Audio player
    pub player: Option<Player>,

    /// Title of the sermon currently loaded in the player
    pub playing_title: Option<String>,

    /// Playback state mirror for the footer
    pub player_state: PlayerState,

    /// Playback position and duration, in seconds
    pub position: u64,
    pub duration: u64,

    /// Action sender for async operations
    pub action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    /// Create a new application instance. With `ephemeral` set, all
    /// persistent state lives in memory and is lost on exit.
    pub fn new(config: Config, ephemeral: bool, action_tx: mpsc::UnboundedSender<Action>) -> Result<Self> {
        let store: Arc<dyn KvStore> = if ephemeral {
            Arc::new(MemoryStore::new())
        } else {
            Arc::new(FileStore::open()?)
        };

        let services = Arc::new(Services {
            client: ChurchClient::new(&config.server.url, &config.server.api_key),
            feed: FeedClient::new(&config.server.feed_url),
            queue: QueueManager::new(Arc::clone(&store)),
            playlists: PlaylistStore::new(Arc::clone(&store)),
            last_played: LastPlayed::new(Arc::clone(&store)),
            prefs: Preferences::new(store),
        });

        let router = Router::new(Arc::clone(&services), action_tx.clone());

        Ok(Self {
            should_quit: false,
            config,
            services,
            router,
            chrome: Chrome::default(),
            selected_link: 0,
            scroll: 0,
            show_help: false,
            random_prompt: false,
            input: None,
            error_message: None,
            status: None,
            player: None,
            playing_title: None,
            player_state: PlayerState::Stopped,
            position: 0,
            duration: 0,
            action_tx,
        })
    }

    /// Initialize the application and navigate to the landing route.
    pub fn init(&mut self) -> Result<()> {
        if !self.config.is_valid() {
            self.error_message = Some(String::from(
                "Invalid configuration. Please configure the server URL and API key.",
            ));
        }

        self.services.prefs.seed_defaults();

        match Player::new(self.config.player.volume) {
            Ok(player) => self.player = Some(player),
            Err(e) => {
                tracing::error!("Failed to initialize audio player: {}", e);
                self.error_message = Some(format!("Audio player error: {}", e));
            }
        }

        self.action_tx
            .send(Action::Navigate(String::from(route::HOME)))?;
        Ok(())
    }

    /// The markup currently on screen, if the route has rendered.
    pub fn current_markup(&self) -> Option<&crate::markup::Markup> {
        match self.router.state() {
            RouteState::Rendered { markup, .. } => Some(markup),
            _ => None,
        }
    }

    /// Handle an action and update state.
    pub fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.should_quit = true;
            }

            Action::Tick => {
                let events: Vec<_> = if let Some(player) = &mut self.player {
                    let mut events = Vec::new();
                    while let Some(event) = player.try_recv_event() {
                        events.push(event);
                    }
                    events
                } else {
                    Vec::new()
                };

                for event in events {
                    self.handle_player_event(event);
                }
            }

            Action::Resize(_, _) => {
                // The next draw picks up the new frame size.
            }

            // Routing
            Action::Navigate(fragment) => {
                self.reset_view_state();
                self.router.navigate(&fragment);
            }

            Action::Back => {
                if self.router.can_go_back() {
                    self.reset_view_state();
                    self.router.back();
                }
            }

            Action::Refresh => {
                self.router.refresh();
            }

            Action::RouteRendered { fragment, result } => {
                if let Some(markup) = self.router.on_rendered(fragment, result) {
                    self.run_after_render(&markup)?;
                    let link_count = markup.link_count();
                    if link_count > 0 && self.selected_link >= link_count {
                        self.selected_link = link_count - 1;
                    }
                }
            }

            // Content selection
            Action::LinkUp => {
                self.selected_link = self.selected_link.saturating_sub(1);
            }

            Action::LinkDown => {
                if let Some(markup) = self.current_markup() {
                    let count = markup.link_count();
                    if count > 0 && self.selected_link + 1 < count {
                        self.selected_link += 1;
                    }
                }
            }

            Action::ActivateLink => {
                self.activate_selected_link()?;
            }

            // Queue / session
            Action::OpenRandomPrompt => {
                if self.chrome.shuffle_pool.is_empty() {
                    self.error_message = Some(String::from("No songs to play"));
                } else {
                    self.random_prompt = true;
                }
            }

            Action::CancelRandomPrompt => {
                self.random_prompt = false;
            }

            Action::RandomCount(count) => {
                self.random_prompt = false;
                self.start_random_session(count)?;
            }

            Action::AdvanceQueue => match self.services.queue.advance() {
                Advance::NoSession => {}
                Advance::Complete => {
                    self.status = Some(String::from("Queue complete"));
                }
                Advance::Next { item, persisted } => {
                    if let Err(e) = persisted {
                        tracing::warn!("queue position not saved: {}", e);
                        self.status = Some(String::from("Queue position will not be saved"));
                    }
                    self.play_queue_item(&item)?;
                }
            },

            Action::ClearSession => {
                self.services.queue.clear();
                self.status = Some(String::from("Queue ended"));
                self.action_tx.send(Action::Refresh)?;
            }

            Action::ClearLastPlayed => {
                self.services.last_played.clear();
                self.action_tx.send(Action::Refresh)?;
            }

            // Playlists
            Action::PlayPlaylist(id) => {
                self.play_playlist(&id)?;
            }

            Action::DeletePlaylist(id) => {
                self.services.playlists.delete(&id);
                if let Some(e) = self.services.playlists.take_persist_error() {
                    self.error_message = Some(format!("Failed to save playlists: {}", e));
                }
                self.action_tx.send(Action::Refresh)?;
            }

            Action::SavePlaylist => {
                self.save_playlist()?;
            }

            // Text input overlay
            Action::OpenInput {
                label,
                fragment,
                key,
            } => {
                let value = route::resolve(&fragment)
                    .params
                    .get(&key)
                    .unwrap_or("")
                    .to_string();
                self.input = Some(InputPrompt {
                    label,
                    fragment,
                    key,
                    value,
                });
            }

            Action::InputChar(c) => {
                if let Some(input) = &mut self.input {
                    input.value.push(c);
                }
            }

            Action::InputBackspace => {
                if let Some(input) = &mut self.input {
                    input.value.pop();
                }
            }

            Action::InputSubmit => {
                if let Some(input) = self.input.take() {
                    let fragment =
                        route::with_param(&input.fragment, &input.key, input.value.trim());
                    self.action_tx.send(Action::Navigate(fragment))?;
                }
            }

            Action::InputCancel => {
                self.input = None;
            }

            // Playback
            Action::PlaySermon { url, title } => {
                if let Some(player) = &self.player {
                    player.play(url)?;
                    self.playing_title = Some(title);
                    self.status = Some(String::from("Loading audio..."));
                } else {
                    self.error_message = Some(String::from("Audio player is not available"));
                }
            }

            Action::PlayPause => {
                if let Some(player) = &self.player {
                    match self.player_state {
                        PlayerState::Playing => player.pause()?,
                        PlayerState::Paused => player.resume()?,
                        PlayerState::Stopped => {}
                    }
                }
            }

            Action::Stop => {
                if let Some(player) = &self.player {
                    player.stop()?;
                }
                self.playing_title = None;
            }

            Action::SeekForward => {
                if let Some(player) = &self.player {
                    player.seek(Duration::from_secs(self.position) + SEEK_STEP)?;
                }
            }

            Action::SeekBackward => {
                if let Some(player) = &self.player {
                    let target = Duration::from_secs(self.position).saturating_sub(SEEK_STEP);
                    player.seek(target)?;
                }
            }

            Action::VolumeUp => {
                self.change_volume(VOLUME_STEP)?;
            }

            Action::VolumeDown => {
                self.change_volume(-VOLUME_STEP)?;
            }

            // Preferences
            Action::ToggleTheme => {
                let next = self.services.prefs.theme().toggled();
                self.services.prefs.set_theme(next);
                self.action_tx.send(Action::Refresh)?;
            }

            Action::ToggleCustomPlayer => {
                let next = !self.services.prefs.use_custom_player();
                self.services.prefs.set_use_custom_player(next);
                self.action_tx.send(Action::Refresh)?;
            }

            // Overlays
            Action::ShowHelp => {
                self.show_help = true;
            }

            Action::HideHelp => {
                self.show_help = false;
            }

            Action::Error(message) => {
                self.error_message = Some(message);
            }

            Action::ClearError => {
                self.error_message = None;
            }

            Action::None => {}
        }

        Ok(())
    }

    /// Reset per-view UI state ahead of a navigation.
    fn reset_view_state(&mut self) {
        self.selected_link = 0;
        self.scroll = 0;
        self.status = None;
        self.random_prompt = false;
        self.input = None;
    }

    /// Run the current view's post-render hook: it rebuilds the chrome and
    /// may queue follow-up actions.
    fn run_after_render(&mut self, markup: &crate::markup::Markup) -> Result<()> {
        let mut chrome = Chrome::default();
        let params = self.router.current_params();

        let follow_ups = match self.router.current_view() {
            Some(view) => {
                let mut cx = HookCx {
                    services: &self.services,
                    params: &params,
                    markup,
                    chrome: &mut chrome,
                    actions: Vec::new(),
                };
                view.after_render(&mut cx);
                cx.actions
            }
            None => Vec::new(),
        };

        // The back affordance only shows when there is somewhere to go.
        chrome.back_visible = chrome.back_visible && self.router.can_go_back();
        self.chrome = chrome;

        for action in follow_ups {
            self.action_tx.send(action)?;
        }
        Ok(())
    }

    /// Activate the selected link in the current markup.
    fn activate_selected_link(&mut self) -> Result<()> {
        use crate::markup::Target;

        let Some(link) = self
            .current_markup()
            .and_then(|m| m.link(self.selected_link))
        else {
            return Ok(());
        };

        match link.target.clone() {
            Target::Route(fragment) => {
                // Opening a song's player marks it as the last played song.
                let resolved = route::resolve(&fragment);
                if resolved.name == "song-player" {
                    if let Some(title) = resolved.params.get("title") {
                        self.services.last_played.record(title);
                    }
                }
                self.action_tx.send(Action::Navigate(fragment))?;
            }
            Target::Dispatch(action) => {
                self.action_tx.send(action)?;
            }
            Target::External(url) => {
                // No browser in a terminal; surface the URL instead.
                self.status = Some(format!("Open in a browser: {}", url));
            }
        }
        Ok(())
    }

    /// Draw a random subset from the view's shuffle pool and start playing.
    fn start_random_session(&mut self, count: usize) -> Result<()> {
        let subset = self
            .services
            .queue
            .build_random_subset(&self.chrome.shuffle_pool, count);

        match self.services.queue.start_session(subset) {
            Some(start) => {
                if let Err(e) = start.persisted {
                    tracing::warn!("queue session not saved: {}", e);
                    self.status = Some(String::from("Queue position will not be saved"));
                }
                self.play_queue_item(&start.first)?;
            }
            None => {
                self.error_message = Some(String::from("No songs to play"));
            }
        }
        Ok(())
    }

    fn play_queue_item(&mut self, item: &QueueItem) -> Result<()> {
        self.services.last_played.record(&item.title);
        self.action_tx.send(Action::Navigate(item.href.clone()))?;
        Ok(())
    }

    fn play_playlist(&mut self, id: &str) -> Result<()> {
        let Some(playlist) = self.services.playlists.get_by_id(id) else {
            self.error_message = Some(String::from("Playlist not found"));
            return Ok(());
        };

        match self
            .services
            .playlists
            .prepare_playback(&playlist, &self.services.queue)
        {
            Some(start) => {
                if let Err(e) = start.persisted {
                    tracing::warn!("queue session not saved: {}", e);
                    self.status = Some(String::from("Queue position will not be saved"));
                }
                self.play_queue_item(&start.first)?;
            }
            None => {
                self.error_message = Some(String::from("Playlist has no songs"));
            }
        }
        Ok(())
    }

    /// Persist the playlist editor's current form state.
    fn save_playlist(&mut self) -> Result<()> {
        let params = self.router.current_params();
        let (id, name, selected) = views::playlist_form_state(&self.services, &params);

        if name.trim().is_empty() {
            self.error_message = Some(String::from("Please enter a playlist name"));
            return Ok(());
        }
        if selected.is_empty() {
            self.error_message = Some(String::from("Please select at least one song"));
            return Ok(());
        }

        let songs: Vec<QueueItem> = selected
            .iter()
            .map(|title| QueueItem {
                title: title.clone(),
                href: route::fragment("song-player", &[("title", title)]),
            })
            .collect();

        let saved = match id.as_deref() {
            Some(id) => self.services.playlists.update(id, &name, songs),
            None => self.services.playlists.create(&name, songs),
        };

        if !saved {
            self.error_message = Some(String::from("Error creating playlist"));
            return Ok(());
        }
        if let Some(e) = self.services.playlists.take_persist_error() {
            self.error_message = Some(format!("Failed to save playlists: {}", e));
            return Ok(());
        }

        self.action_tx
            .send(Action::Navigate(String::from("playlists")))?;
        Ok(())
    }

    /// Adjust playback volume by the given step, clamped to 0-100.
    fn change_volume(&mut self, delta: i16) -> Result<()> {
        let volume = (self.config.player.volume as i16 + delta).clamp(0, 100) as u8;
        self.config.player.volume = volume;
        if let Some(player) = &self.player {
            player.set_volume(volume)?;
        }
        self.status = Some(format!("Volume: {}%", volume));
        Ok(())
    }

    /// Handle an event from the player thread.
    fn handle_player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::StateChanged(state) => {
                self.player_state = state;
                if state == PlayerState::Playing {
                    self.status = None;
                }
            }
            PlayerEvent::Progress { position, duration } => {
                self.position = position.as_secs();
                self.duration = duration.as_secs();
            }
            PlayerEvent::TrackEnded => {
                self.player_state = PlayerState::Stopped;
                self.status = Some(String::from("Playback finished"));
            }
            PlayerEvent::Error(message) => {
                tracing::error!("Player error: {}", message);
                self.error_message = Some(format!("Playback error: {}", message));
                self.player_state = PlayerState::Stopped;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::Markup;

    fn app() -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(Config::default(), true, tx).unwrap();
        (app, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<Action>) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    #[tokio::test]
    async fn test_activate_song_link_records_last_played() {
        let (mut app, mut rx) = app();
        app.router.navigate("songs");
        app.router.on_rendered(
            String::from("songs"),
            Ok(Markup::new().route_link("Grace", "song-player?title=Grace")),
        );

        app.handle_action(Action::ActivateLink).unwrap();

        assert_eq!(
            app.services.last_played.get().map(|m| m.title),
            Some(String::from("Grace"))
        );
        let actions = drain(&mut rx);
        assert!(actions
            .iter()
            .any(|a| matches!(a, Action::Navigate(f) if f == "song-player?title=Grace")));
    }

    #[tokio::test]
    async fn test_activate_external_link_sets_status() {
        let (mut app, _rx) = app();
        app.router.navigate("home");
        app.router.on_rendered(
            String::from("home"),
            Ok(Markup::new().external_link("Live", "https://youtube.example/live")),
        );

        app.handle_action(Action::ActivateLink).unwrap();
        assert!(app
            .status
            .as_deref()
            .is_some_and(|s| s.contains("https://youtube.example/live")));
    }

    #[tokio::test]
    async fn test_random_prompt_requires_pool() {
        let (mut app, _rx) = app();
        app.handle_action(Action::OpenRandomPrompt).unwrap();
        assert!(!app.random_prompt);
        assert!(app.error_message.is_some());

        app.error_message = None;
        app.chrome.shuffle_pool = vec![QueueItem {
            title: String::from("Grace"),
            href: String::from("song-player?title=Grace"),
        }];
        app.handle_action(Action::OpenRandomPrompt).unwrap();
        assert!(app.random_prompt);
    }

    #[tokio::test]
    async fn test_random_count_starts_session_and_navigates() {
        let (mut app, mut rx) = app();
        app.chrome.shuffle_pool = vec![
            QueueItem {
                title: String::from("A"),
                href: String::from("song-player?title=A"),
            },
            QueueItem {
                title: String::from("B"),
                href: String::from("song-player?title=B"),
            },
        ];

        app.handle_action(Action::RandomCount(2)).unwrap();

        let session = app.services.queue.current_session().unwrap();
        assert_eq!(session.len(), 2);
        assert_eq!(session.current_index, 0);
        assert!(app.services.last_played.get().is_some());
        assert!(drain(&mut rx)
            .iter()
            .any(|a| matches!(a, Action::Navigate(_))));
    }

    #[tokio::test]
    async fn test_advance_queue_to_completion() {
        let (mut app, mut rx) = app();
        app.chrome.shuffle_pool = vec![
            QueueItem {
                title: String::from("A"),
                href: String::from("song-player?title=A"),
            },
            QueueItem {
                title: String::from("B"),
                href: String::from("song-player?title=B"),
            },
        ];
        app.handle_action(Action::RandomCount(2)).unwrap();
        drain(&mut rx);

        app.handle_action(Action::AdvanceQueue).unwrap();
        assert!(drain(&mut rx)
            .iter()
            .any(|a| matches!(a, Action::Navigate(_))));

        app.handle_action(Action::AdvanceQueue).unwrap();
        assert_eq!(app.status.as_deref(), Some("Queue complete"));
        // The session stays on its last item.
        assert!(app.services.queue.current_session().unwrap().is_complete());
    }

    #[tokio::test]
    async fn test_save_playlist_validates_name_and_selection() {
        let (mut app, mut rx) = app();
        app.router.navigate("create-playlist?sel=Grace");
        app.handle_action(Action::SavePlaylist).unwrap();
        assert_eq!(
            app.error_message.as_deref(),
            Some("Please enter a playlist name")
        );

        app.error_message = None;
        app.router.navigate("create-playlist?name=Sunday&sel=");
        app.handle_action(Action::SavePlaylist).unwrap();
        assert_eq!(
            app.error_message.as_deref(),
            Some("Please select at least one song")
        );

        app.error_message = None;
        app.router.navigate("create-playlist?name=Sunday&sel=Grace|Vision");
        app.handle_action(Action::SavePlaylist).unwrap();
        assert!(app.error_message.is_none());

        let playlists = app.services.playlists.list();
        assert_eq!(playlists.len(), 1);
        assert_eq!(playlists[0].songs.len(), 2);
        assert_eq!(playlists[0].songs[0].href, "song-player?title=Grace");
        assert!(drain(&mut rx)
            .iter()
            .any(|a| matches!(a, Action::Navigate(f) if f == "playlists")));
    }

    #[tokio::test]
    async fn test_volume_steps_and_clamps() {
        let (mut app, _rx) = app();
        assert_eq!(app.config.player.volume, 80);

        app.handle_action(Action::VolumeUp).unwrap();
        assert_eq!(app.config.player.volume, 85);
        assert_eq!(app.status.as_deref(), Some("Volume: 85%"));

        for _ in 0..10 {
            app.handle_action(Action::VolumeUp).unwrap();
        }
        assert_eq!(app.config.player.volume, 100);

        for _ in 0..30 {
            app.handle_action(Action::VolumeDown).unwrap();
        }
        assert_eq!(app.config.player.volume, 0);
    }

    #[tokio::test]
    async fn test_input_submit_navigates_with_param() {
        let (mut app, mut rx) = app();
        app.handle_action(Action::OpenInput {
            label: String::from("Search"),
            fragment: String::from("songs"),
            key: String::from("q"),
        })
        .unwrap();
        assert!(app.input.is_some());

        for c in "grace".chars() {
            app.handle_action(Action::InputChar(c)).unwrap();
        }
        app.handle_action(Action::InputBackspace).unwrap();
        app.handle_action(Action::InputSubmit).unwrap();

        assert!(app.input.is_none());
        assert!(drain(&mut rx)
            .iter()
            .any(|a| matches!(a, Action::Navigate(f) if f == "songs?q=grac")));
    }

    #[tokio::test]
    async fn test_toggle_custom_player_flips_and_refreshes() {
        let (mut app, mut rx) = app();
        app.services.prefs.seed_defaults();
        assert!(app.services.prefs.use_custom_player());

        app.handle_action(Action::ToggleCustomPlayer).unwrap();
        assert!(!app.services.prefs.use_custom_player());
        assert!(drain(&mut rx)
            .iter()
            .any(|a| matches!(a, Action::Refresh)));
    }

    #[tokio::test]
    async fn test_back_hidden_at_stack_bottom() {
        let (mut app, _rx) = app();
        app.router.navigate("home");
        let markup = Markup::new().heading("Home");
        app.router
            .on_rendered(String::from("home"), Ok(markup.clone()));
        app.run_after_render(&markup).unwrap();
        assert!(!app.chrome.back_visible);
    }
}
