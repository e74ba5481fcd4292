//! Recent sermons list.

use async_trait::async_trait;
use color_eyre::Result;

use super::{sermon_row, HookCx, RenderCx, View};
use crate::action::Action;
use crate::markup::Markup;

const RECENT_LIMIT: u32 = 20;

pub struct SermonsView;

#[async_trait]
impl View for SermonsView {
    async fn render(&self, cx: &RenderCx) -> Result<Markup> {
        let sermons = cx.services.client.recent_sermons(RECENT_LIMIT).await?;
        let use_custom_player = cx.services.prefs.use_custom_player();

        let mut markup = Markup::new().heading("Recent Sermons").blank();
        if sermons.is_empty() {
            return Ok(markup.notice("No sermons available"));
        }
        for sermon in &sermons {
            markup = sermon_row(markup, sermon, use_custom_player);
        }
        Ok(markup)
    }

    fn after_render(&self, cx: &mut HookCx) {
        cx.chrome.title = String::from("Recent Sermons");
        cx.chrome.back_visible = true;
        cx.chrome.bind(
            'f',
            "Find sermons",
            Action::Navigate(String::from("find-sermons")),
        );
        cx.chrome
            .bind('s', "Series", Action::Navigate(String::from("series")));
    }
}
