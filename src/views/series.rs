//! Series index: expository (book) series and topical series.

use async_trait::async_trait;
use color_eyre::Result;

use super::{HookCx, RenderCx, View};
use crate::markup::Markup;

pub struct SeriesView;

#[async_trait]
impl View for SeriesView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let (books, topics) = tokio::try_join!(
            cx.services.client.book_series(),
            cx.services.client.topic_series()
        )?;

        let mut markup = Markup::new().heading("Bible Books").blank();
        if books.is_empty() {
            markup = markup.notice("No book series yet");
        }
        for series in &books {
            markup = markup.route_link(&series.title, series.href("book"));
            let range = series.date_range();
            if !range.is_empty() {
                markup = markup.text(format!("    {}", range));
            }
        }

        markup = markup.blank().heading("Topics").blank();
        if topics.is_empty() {
            markup = markup.notice("No topic series yet");
        }
        for series in &topics {
            markup = markup.route_link(&series.title, series.href("topic"));
        }

        Ok(markup)
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = String::from("Sermon Series");
        cx.chrome.back_visible = true;
    }
}
