//! Sermons belonging to one series.

use async_trait::async_trait;
use color_eyre::Result;

use super::{sermon_row, HookCx, RenderCx, View};
use crate::markup::Markup;

pub struct SeriesDetailsView;

#[async_trait]
impl View for SeriesDetailsView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let title = cx.params.get("title").unwrap_or("Series Details");
        let tag = cx.params.get("tag").unwrap_or("");

        let sermons = cx.services.client.sermons_by_series(tag).await?;

        let mut markup = Markup::new().heading(title).blank();
        if sermons.is_empty() {
            return Ok(markup.notice("No sermons found for this series."));
        }

        let use_custom_player = cx.services.prefs.use_custom_player();
        for sermon in &sermons {
            markup = sermon_row(markup, sermon, use_custom_player);
        }
        Ok(markup)
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = cx
            .params
            .get("title")
            .unwrap_or("Series Details")
            .to_string();
        cx.chrome.back_visible = true;
    }
}
