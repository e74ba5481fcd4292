//! In-app sermon player: resolves the episode from the podcast feed and
//! starts playback once the view is on screen.

use async_trait::async_trait;
use color_eyre::Result;

use super::{HookCx, RenderCx, View};
use crate::action::Action;
use crate::markup::{Markup, Target};

pub struct SermonPlayerView;

#[async_trait]
impl View for SermonPlayerView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let slug = cx.params.get("slug").unwrap_or("");
        let title = cx.params.get("title").unwrap_or("Sermon");
        let speaker = cx.params.get("speaker").unwrap_or("");

        if slug.is_empty() {
            return Ok(Markup::new().notice("No sermon specified"));
        }

        let mut markup = Markup::new().heading(title);
        if !speaker.is_empty() {
            markup = markup.text(speaker);
        }
        markup = markup.blank();

        match cx.services.feed.episode_by_slug(slug).await? {
            Some(episode) => {
                markup = markup.action_link(
                    "Play audio",
                    Action::PlaySermon {
                        url: episode.media_url,
                        title: title.to_string(),
                    },
                );
                markup = markup.blank().heading("Description").blank();
                if episode.description.is_empty() {
                    markup = markup.text("No description available");
                } else {
                    for line in episode.description.lines() {
                        markup = markup.text(line);
                    }
                }
            }
            None => {
                markup = markup
                    .notice("Audio not available in custom player.")
                    .external_link(
                        "Open on Podbean",
                        format!("https://pecharchive.podbean.com/e/{}/", slug),
                    )
                    .blank()
                    .text("Description not available");
            }
        }

        Ok(markup)
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = String::from("Sermon Player");
        cx.chrome.back_visible = true;

        // Autoplay: dispatch the same action the Play link carries.
        let play = cx.markup.links().iter().find_map(|link| match &link.target {
            Target::Dispatch(action @ Action::PlaySermon { .. }) => Some(action.clone()),
            _ => None,
        });
        if let Some(action) = play {
            cx.actions.push(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route;
    use crate::views::{test_support, Chrome};

    #[test]
    fn test_after_render_autoplays_when_episode_found() {
        let services = test_support::services();
        let markup = Markup::new().heading("Grace").action_link(
            "Play audio",
            Action::PlaySermon {
                url: String::from("https://cdn.example/grace.mp3"),
                title: String::from("Grace"),
            },
        );

        let mut chrome = Chrome::default();
        let params = route::resolve("sermon-player?slug=grace&title=Grace").params;
        let mut cx = HookCx {
            services: &services,
            params: &params,
            markup: &markup,
            chrome: &mut chrome,
            actions: Vec::new(),
        };
        SermonPlayerView.after_render(&mut cx);

        assert_eq!(cx.actions.len(), 1);
        assert!(matches!(cx.actions[0], Action::PlaySermon { .. }));
    }

    #[test]
    fn test_after_render_no_autoplay_without_episode() {
        let services = test_support::services();
        let markup = Markup::new().notice("Audio not available in custom player.");

        let mut chrome = Chrome::default();
        let params = route::resolve("sermon-player?slug=missing").params;
        let mut cx = HookCx {
            services: &services,
            params: &params,
            markup: &markup,
            chrome: &mut chrome,
            actions: Vec::new(),
        };
        SermonPlayerView.after_render(&mut cx);

        assert!(cx.actions.is_empty());
    }
}
