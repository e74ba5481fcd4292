//! Playlist editor. Creates a new playlist or edits an existing one.
//!
//! All form state rides in the route params: `name` holds the entered
//! name, `sel` the selected song titles joined by '|', and `id` the
//! playlist being edited. Toggling a song navigates to the same route
//! with the selection updated, and Save reads the params back.

use async_trait::async_trait;
use color_eyre::Result;

use super::{HookCx, RenderCx, Services, View};
use crate::action::Action;
use crate::markup::Markup;
use crate::route;

const SELECTION_SEP: char = '|';

pub struct CreatePlaylistView;

/// Resolve the editor's effective state from the params, falling back to
/// the stored playlist when editing and the user hasn't touched a field.
pub(crate) fn form_state(
    services: &Services,
    params: &route::Params,
) -> (Option<String>, String, Vec<String>) {
    let id = params.get("id").map(String::from);
    let existing = id.as_deref().and_then(|id| services.playlists.get_by_id(id));

    let name = match params.get("name") {
        Some(name) => name.to_string(),
        None => existing.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
    };

    let selected: Vec<String> = match params.get("sel") {
        Some(sel) => sel
            .split(SELECTION_SEP)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        None => existing
            .as_ref()
            .map(|p| p.songs.iter().map(|s| s.title.clone()).collect())
            .unwrap_or_default(),
    };

    (id, name, selected)
}

/// Fragment for this editor with the given state baked into the params.
fn editor_fragment(id: Option<&str>, name: &str, selected: &[String]) -> String {
    let sel = selected.join(&SELECTION_SEP.to_string());
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if let Some(id) = id {
        pairs.push(("id", id));
    }
    if !name.is_empty() {
        pairs.push(("name", name));
    }
    pairs.push(("sel", &sel));
    route::fragment("create-playlist", &pairs)
}

fn toggled(selected: &[String], title: &str) -> Vec<String> {
    if selected.iter().any(|t| t == title) {
        selected.iter().filter(|t| *t != title).cloned().collect()
    } else {
        let mut next = selected.to_vec();
        next.push(title.to_string());
        next
    }
}

#[async_trait]
impl View for CreatePlaylistView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let (id, name, selected) = form_state(&cx.services, &cx.params);

        let mut songs = cx.services.client.songs().await?;
        songs.sort_by(|a, b| a.title.cmp(&b.title));

        let heading = if id.is_some() {
            "Edit Playlist"
        } else {
            "Create Playlist"
        };

        let mut markup = Markup::new()
            .heading(heading)
            .blank()
            .action_link(
                format!(
                    "Name: {}",
                    if name.is_empty() { "(not set)" } else { &name }
                ),
                Action::OpenInput {
                    label: String::from("Playlist Name (e.g. Sunday Morning Service)"),
                    fragment: editor_fragment(id.as_deref(), &name, &selected),
                    key: String::from("name"),
                },
            )
            .text(format!("{} songs selected", selected.len()))
            .action_link("Save", Action::SavePlaylist)
            .action_link("Cancel", Action::Back)
            .blank()
            .heading("Select Songs")
            .blank();

        for song in &songs {
            let is_selected = selected.iter().any(|t| t == &song.title);
            let mark = if is_selected { "[x]" } else { "[ ]" };
            let next = toggled(&selected, &song.title);
            markup = markup.route_link(
                format!("{} {}", mark, song.title),
                editor_fragment(id.as_deref(), &name, &next),
            );
        }

        Ok(markup)
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = if cx.params.get("id").is_some() {
            String::from("Edit Playlist")
        } else {
            String::from("Create Playlist")
        };
        cx.chrome.back_visible = true;

        let (id, name, selected) = form_state(cx.services, cx.params);
        cx.chrome.bind(
            'n',
            "Name",
            Action::OpenInput {
                label: String::from("Playlist Name (e.g. Sunday Morning Service)"),
                fragment: editor_fragment(id.as_deref(), &name, &selected),
                key: String::from("name"),
            },
        );
        cx.chrome.bind('w', "Save", Action::SavePlaylist);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::QueueItem;
    use crate::views::test_support;

    #[test]
    fn test_toggled_adds_and_removes() {
        let selected = vec![String::from("Grace")];
        let added = toggled(&selected, "Vision");
        assert_eq!(added, vec!["Grace", "Vision"]);
        let removed = toggled(&added, "Grace");
        assert_eq!(removed, vec!["Vision"]);
    }

    #[test]
    fn test_editor_fragment_round_trips_selection() {
        let fragment = editor_fragment(None, "Sunday", &[String::from("A"), String::from("B & C")]);
        let params = route::resolve(&fragment).params;
        assert_eq!(params.get("name"), Some("Sunday"));
        assert_eq!(params.get("sel"), Some("A|B & C"));
    }

    #[test]
    fn test_form_state_falls_back_to_stored_playlist() {
        let services = test_support::services();
        assert!(services.playlists.create(
            "Sunday",
            vec![QueueItem {
                title: String::from("Grace"),
                href: String::from("song-player?title=Grace"),
            }],
        ));
        let id = services.playlists.list()[0].id.clone();

        let params = route::resolve(&format!("create-playlist?id={}", id)).params;
        let (found_id, name, selected) = form_state(&services, &params);
        assert_eq!(found_id.as_deref(), Some(id.as_str()));
        assert_eq!(name, "Sunday");
        assert_eq!(selected, vec!["Grace"]);

        // Params win once the user has edited.
        let params =
            route::resolve(&format!("create-playlist?id={}&name=Evening&sel=", id)).params;
        let (_, name, selected) = form_state(&services, &params);
        assert_eq!(name, "Evening");
        assert!(selected.is_empty());
    }
}
