//! User preferences.

use async_trait::async_trait;
use color_eyre::Result;

use super::{HookCx, RenderCx, View};
use crate::action::Action;
use crate::markup::Markup;

pub struct SettingsView;

#[async_trait]
impl View for SettingsView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let theme = cx.services.prefs.theme();
        let custom_player = cx.services.prefs.use_custom_player();

        Ok(Markup::new()
            .heading("Settings")
            .blank()
            .heading("Display")
            .action_link(format!("Theme: {}", theme.label()), Action::ToggleTheme)
            .blank()
            .heading("Sermon Player")
            .action_link(
                format!(
                    "Use custom player: {}",
                    if custom_player { "on" } else { "off" }
                ),
                Action::ToggleCustomPlayer,
            )
            .text("When off, sermons open on Podbean instead.")
            .blank()
            .heading("About")
            .text("Pelsall Songs and Sermons")
            .text(concat!("chapel-tui v", env!("CARGO_PKG_VERSION"))))
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = String::from("Settings");
        cx.chrome.back_visible = true;
    }
}
