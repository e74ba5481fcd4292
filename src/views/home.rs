//! Landing view: navigation hub plus the current preaching series.

use async_trait::async_trait;
use color_eyre::Result;

use super::{HookCx, RenderCx, View};
use crate::markup::Markup;

pub struct HomeView;

#[async_trait]
impl View for HomeView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let current = cx.services.client.current_series().await?;

        let mut markup = Markup::new()
            .heading("Pelsall Songs and Sermons")
            .blank()
            .route_link("Songs", "songs")
            .route_link("Sermon series", "series")
            .route_link("Recent sermons", "sermons")
            .route_link("Find sermons", "find-sermons")
            .route_link("Playlists", "playlists")
            .route_link("Settings", "settings")
            .external_link(
                "Live stream",
                "https://www.youtube.com/@pelsallevangelicalchurch",
            )
            .blank()
            .heading("Current sermon series");

        if current.is_empty() {
            markup = markup.notice("No series is currently running");
        } else {
            for series in &current {
                markup = markup.route_link(&series.title, series.href("book"));
                let range = series.date_range();
                if !range.is_empty() {
                    markup = markup.text(format!("    {}", range));
                }
            }
        }

        Ok(markup
            .blank()
            .text("Explore 180 songs, and over 1300 sermons.")
            .blank()
            .text("Oh come, let us sing to the Lord; let us make a joyful")
            .text("noise to the rock of our salvation! (Psalm 95:1)"))
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = String::from("Pelsall Songs and Sermons");
        cx.chrome.back_visible = false;
    }
}
