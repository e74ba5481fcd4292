//! Application actions/events that drive state changes.

use crate::markup::Markup;

/// Actions that can be dispatched to update application state.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Action {
    // Application lifecycle
    Quit,
    Tick,
    Resize(u16, u16),

    // Routing
    Navigate(String),
    Back,
    Refresh,
    RouteRendered {
        fragment: String,
        result: Result<Markup, String>,
    },

    // Content selection
    LinkUp,
    LinkDown,
    ActivateLink,

    // Queue / session
    OpenRandomPrompt,
    CancelRandomPrompt,
    RandomCount(usize),
    AdvanceQueue,
    ClearSession,
    ClearLastPlayed,

    // Playlists
    PlayPlaylist(String),
    DeletePlaylist(String),
    SavePlaylist,

    // Text input overlay
    OpenInput {
        label: String,
        fragment: String,
        key: String,
    },
    InputChar(char),
    InputBackspace,
    InputSubmit,
    InputCancel,

    // Playback controls
    PlaySermon {
        url: String,
        title: String,
    },
    PlayPause,
    Stop,
    SeekForward,
    SeekBackward,
    VolumeUp,
    VolumeDown,

    // Preferences
    ToggleTheme,
    ToggleCustomPlayer,

    // Overlays
    ShowHelp,
    HideHelp,
    Error(String),
    ClearError,

    // No-op
    None,
}

/// Current playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Stopped,
    Playing,
    Paused,
}
