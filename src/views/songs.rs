//! Song list with search, new-song filter, and the last-played marker.

use async_trait::async_trait;
use color_eyre::Result;

use super::{HookCx, RenderCx, View};
use crate::action::Action;
use crate::markup::{Markup, Target};
use crate::queue::QueueItem;
use crate::route;

pub struct SongsView;

#[async_trait]
impl View for SongsView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let songs = cx.services.client.songs().await?;

        let query = cx.params.get("q").unwrap_or("").to_lowercase();
        let new_only = cx.params.get("new").is_some();

        let mut markup = Markup::new().heading("Songs");

        if let Some(marker) = cx.services.last_played.get() {
            markup = markup
                .blank()
                .text(format!("Your last song: {}", marker.title))
                .action_link("Clear last song", Action::ClearLastPlayed);
        }
        markup = markup.blank();

        if new_only {
            markup = markup.route_link("Show all songs", "songs");
        } else {
            markup = markup.route_link("See new songs", "songs?new=1");
        }
        if !query.is_empty() {
            markup = markup
                .text(format!("Filter: {:?}", query))
                .route_link("Clear filter", "songs");
        }
        markup = markup.blank();

        let mut shown = 0;
        for song in &songs {
            if new_only && !song.is_new {
                continue;
            }
            if !query.is_empty() && !song.title.to_lowercase().contains(&query) {
                continue;
            }
            let label = if song.is_new {
                format!("{} (new)", song.title)
            } else {
                song.title.clone()
            };
            markup = markup.route_link(label, song.href());
            shown += 1;
        }

        if shown == 0 {
            markup = markup.notice("No songs match");
        }

        Ok(markup)
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = String::from("Songs");
        cx.chrome.back_visible = true;
        cx.chrome
            .bind('r', "Random play", Action::OpenRandomPrompt);
        cx.chrome.bind(
            's',
            "Search",
            Action::OpenInput {
                label: String::from("Search (enter any part of name)"),
                fragment: String::from("songs"),
                key: String::from("q"),
            },
        );
        cx.chrome
            .bind('p', "Playlists", Action::Navigate(String::from("playlists")));

        // Pool for random play: every song link on screen. Titles come from
        // the link target rather than the label, so display suffixes don't
        // leak into the queue.
        cx.chrome.shuffle_pool = cx
            .markup
            .links()
            .iter()
            .filter_map(|link| match &link.target {
                Target::Route(fragment) => {
                    let route = route::resolve(fragment);
                    if route.name != "song-player" {
                        return None;
                    }
                    let title = route.params.get("title")?;
                    Some(QueueItem {
                        title: title.to_string(),
                        href: fragment.clone(),
                    })
                }
                _ => None,
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support;
    use crate::views::Chrome;

    #[test]
    fn test_shuffle_pool_built_from_song_links() {
        let services = test_support::services();
        let markup = Markup::new()
            .heading("Songs")
            .route_link("Grace (new)", "song-player?title=Grace")
            .route_link("Settings", "settings")
            .route_link("Vision", "song-player?title=Vision");

        let mut chrome = Chrome::default();
        let params = route::resolve("songs").params;
        let mut cx = HookCx {
            services: &services,
            params: &params,
            markup: &markup,
            chrome: &mut chrome,
            actions: Vec::new(),
        };
        SongsView.after_render(&mut cx);

        let pool = &chrome.shuffle_pool;
        assert_eq!(pool.len(), 2);
        assert_eq!(pool[0].title, "Grace");
        assert_eq!(pool[0].href, "song-player?title=Grace");
        assert_eq!(pool[1].title, "Vision");
        assert!(chrome.bindings.iter().any(|b| b.key == 'r'));
    }
}
