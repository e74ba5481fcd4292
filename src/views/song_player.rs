//! Song player: lyrics slides, video links, and queue progress.

use async_trait::async_trait;
use color_eyre::Result;

use super::{HookCx, RenderCx, View};
use crate::action::Action;
use crate::markup::Markup;

pub struct SongPlayerView;

#[async_trait]
impl View for SongPlayerView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let title = cx.params.get("title").unwrap_or("").trim().to_string();

        let songs = cx.services.client.songs().await?;
        let song = songs
            .iter()
            .find(|s| s.title.trim().eq_ignore_ascii_case(&title));

        let Some(song) = song else {
            return Ok(Markup::new().notice("Song not found"));
        };

        let mut markup = Markup::new().heading(song.title.to_uppercase()).blank();

        match song.slide_embed_url() {
            Some(url) => markup = markup.external_link("Open lyrics slides", url),
            None => markup = markup.notice("No lyrics available"),
        }
        markup = markup.text(
            song.copyright
                .clone()
                .unwrap_or_else(|| String::from("Copyright info not available")),
        );
        markup = markup.blank();

        match song.video_embed_url() {
            Some(url) => {
                markup = markup.external_link("Open video", url);
                if let Some(watch) = song.video_watch_url() {
                    markup = markup.external_link("Open on YouTube", watch);
                }
            }
            None => markup = markup.notice("No video available"),
        }

        // Random play progress, when this song is part of a session.
        if let Some(session) = cx.services.queue.current_session() {
            if session
                .current()
                .is_some_and(|item| item.title.trim().eq_ignore_ascii_case(&title))
            {
                markup = markup.blank().text(format!(
                    "Song {} of {}",
                    session.current_index + 1,
                    session.len()
                ));
            }
        }

        Ok(markup)
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = String::from("Song Player");
        cx.chrome.back_visible = true;

        if cx.services.queue.current_session().is_some() {
            cx.chrome.bind('n', "Next song", Action::AdvanceQueue);
            cx.chrome.bind('x', "End queue", Action::ClearSession);
        }
    }
}
