//! User preference flags, stored as plain strings in the key-value store
//! alongside the queue and playlist data.

use std::sync::Arc;

use crate::storage::KvStore;

const THEME_KEY: &str = "theme";
const CUSTOM_PLAYER_KEY: &str = "use_custom_player";

/// Color theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

/// Typed accessors over the preference keys.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KvStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Seed defaults for any flag that has never been written.
    pub fn seed_defaults(&self) {
        for (key, value) in [(THEME_KEY, "dark"), (CUSTOM_PLAYER_KEY, "true")] {
            if self.store.get(key).is_none() {
                if let Err(e) = self.store.set(key, value) {
                    tracing::warn!("failed to seed default for {}: {}", key, e);
                }
            }
        }
    }

    pub fn theme(&self) -> Theme {
        match self.store.get(THEME_KEY).as_deref() {
            Some("light") => Theme::Light,
            _ => Theme::Dark,
        }
    }

    pub fn set_theme(&self, theme: Theme) {
        if let Err(e) = self.store.set(THEME_KEY, theme.label()) {
            tracing::warn!("failed to store theme preference: {}", e);
        }
    }

    /// Whether sermons play in the in-app player rather than externally.
    /// Defaults to true; any stored value other than "false" counts as on.
    pub fn use_custom_player(&self) -> bool {
        self.store.get(CUSTOM_PLAYER_KEY).as_deref() != Some("false")
    }

    pub fn set_use_custom_player(&self, enabled: bool) {
        let value = if enabled { "true" } else { "false" };
        if let Err(e) = self.store.set(CUSTOM_PLAYER_KEY, value) {
            tracing::warn!("failed to store player preference: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));
        assert_eq!(prefs.theme(), Theme::Dark);
        assert!(prefs.use_custom_player());
    }

    #[test]
    fn test_seed_does_not_clobber() {
        let store = Arc::new(MemoryStore::new());
        store.set("use_custom_player", "false").unwrap();

        let prefs = Preferences::new(store);
        prefs.seed_defaults();
        assert!(!prefs.use_custom_player());
    }

    #[test]
    fn test_toggles_round_trip() {
        let prefs = Preferences::new(Arc::new(MemoryStore::new()));

        prefs.set_theme(Theme::Light);
        assert_eq!(prefs.theme(), Theme::Light);

        prefs.set_use_custom_player(false);
        assert!(!prefs.use_custom_player());
    }
}
