//! Sermon search by title, passage reference, and speaker.
//!
//! The criteria live in the route params, so every edit navigates to the
//! same route with an updated query and the results re-render from there.

use async_trait::async_trait;
use color_eyre::Result;

use super::{sermon_row, HookCx, RenderCx, View};
use crate::action::Action;
use crate::markup::Markup;
use crate::route;

pub struct FindSermonsView;

fn criteria(params: &route::Params) -> (String, String, String) {
    (
        params.get("title").unwrap_or("").trim().to_string(),
        params.get("book").unwrap_or("").trim().to_string(),
        params.get("speaker").unwrap_or("").trim().to_string(),
    )
}

fn current_fragment(params: &route::Params) -> String {
    let (title, book, speaker) = criteria(params);
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if !title.is_empty() {
        pairs.push(("title", &title));
    }
    if !book.is_empty() {
        pairs.push(("book", &book));
    }
    if !speaker.is_empty() {
        pairs.push(("speaker", &speaker));
    }
    route::fragment("find-sermons", &pairs)
}

#[async_trait]
impl View for FindSermonsView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let (title, book, speaker) = criteria(&cx.params);

        // Speaker picker sub-state: list the known speakers and let one be
        // chosen into the criteria.
        if cx.params.get("pick").is_some() {
            let speakers = cx.services.client.speakers().await?;
            let base = current_fragment(&cx.params);
            let mut markup = Markup::new().heading("Choose a speaker").blank();
            for s in &speakers {
                markup = markup.route_link(&s.name, route::with_param(&base, "speaker", &s.name));
            }
            return Ok(markup);
        }

        let mut markup = Markup::new()
            .heading("Find Sermons")
            .blank()
            .text(format!(
                "Title: {}",
                if title.is_empty() { "(any)" } else { &title }
            ))
            .text(format!(
                "Book ref: {}",
                if book.is_empty() { "(any)" } else { &book }
            ))
            .text(format!(
                "Speaker: {}",
                if speaker.is_empty() { "(any)" } else { &speaker }
            ))
            .route_link(
                "Choose speaker",
                route::with_param(&current_fragment(&cx.params), "pick", "1"),
            )
            .route_link("Clear all", "find-sermons")
            .blank();

        if title.is_empty() && book.is_empty() && speaker.is_empty() {
            return Ok(markup.text("Set a filter to search the sermon archive."));
        }

        let results = cx
            .services
            .client
            .search_sermons(&title, &book, &speaker)
            .await?;
        if results.is_empty() {
            return Ok(markup.notice("No sermons found"));
        }

        let use_custom_player = cx.services.prefs.use_custom_player();
        for sermon in &results {
            markup = sermon_row(markup, sermon, use_custom_player);
            if let Some(passage) = sermon.passage.as_deref().filter(|p| !p.is_empty()) {
                markup = markup.text(format!("    {}", passage));
            }
        }
        Ok(markup)
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = String::from("Find Sermons");
        cx.chrome.back_visible = true;

        let fragment = current_fragment(cx.params);
        cx.chrome.bind(
            't',
            "Title filter",
            Action::OpenInput {
                label: String::from("Enter title or part of title"),
                fragment: fragment.clone(),
                key: String::from("title"),
            },
        );
        cx.chrome.bind(
            'b',
            "Book filter",
            Action::OpenInput {
                label: String::from("Book ref"),
                fragment,
                key: String::from("book"),
            },
        );
        cx.chrome.bind(
            'c',
            "Clear all",
            Action::Navigate(String::from("find-sermons")),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_fragment_keeps_set_criteria_only() {
        let params = route::resolve("find-sermons?title=grace&speaker=&book=John").params;
        assert_eq!(current_fragment(&params), "find-sermons?title=grace&book=John");

        let empty = route::resolve("find-sermons").params;
        assert_eq!(current_fragment(&empty), "find-sermons");
    }
}
