//! Saved playlists: play, edit, delete.

use async_trait::async_trait;
use color_eyre::Result;

use super::{HookCx, RenderCx, View};
use crate::action::Action;
use crate::markup::Markup;
use crate::route;

pub struct PlaylistsView;

#[async_trait]
impl View for PlaylistsView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let playlists = cx.services.playlists.list();

        let mut markup = Markup::new()
            .heading("Your Playlists")
            .blank()
            .route_link("Create playlist", "create-playlist")
            .blank();

        if playlists.is_empty() {
            return Ok(markup.notice("No playlists created yet."));
        }

        for playlist in &playlists {
            markup = markup
                .action_link(&playlist.name, Action::PlayPlaylist(playlist.id.clone()))
                .text(format!(
                    "    {} songs, created {}",
                    playlist.songs.len(),
                    &playlist.created_at[..playlist.created_at.len().min(10)]
                ))
                .route_link(
                    "    Edit",
                    route::fragment("create-playlist", &[("id", &playlist.id)]),
                )
                .action_link("    Delete", Action::DeletePlaylist(playlist.id.clone()));
        }

        Ok(markup)
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = String::from("Your Playlists");
        cx.chrome.back_visible = true;
        cx.chrome.bind(
            'c',
            "Create",
            Action::Navigate(String::from("create-playlist")),
        );
    }
}
