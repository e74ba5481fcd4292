//! Hash-style router with an explicit navigation stack.
//!
//! Each navigation resolves the fragment, looks the route up in the view
//! registry, and spawns the view's async render. The result comes back
//! through the action channel; a result for a fragment that is no longer
//! current is dropped, so the latest navigation always wins.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::action::Action;
use crate::markup::Markup;
use crate::route;
use crate::views::{registry, RenderCx, Services, View, ViewFactory};

/// Where the current route is in its lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteState {
    Idle,
    Loading {
        fragment: String,
    },
    Rendered {
        fragment: String,
        markup: Markup,
    },
    Failed {
        fragment: String,
        message: String,
    },
    NotFound {
        fragment: String,
    },
}

pub struct Router {
    registry: HashMap<&'static str, ViewFactory>,
    services: Arc<Services>,
    action_tx: mpsc::UnboundedSender<Action>,

    /// Visited fragments, current last. Never empty once navigation starts.
    stack: Vec<String>,
    state: RouteState,
}

impl Router {
    pub fn new(services: Arc<Services>, action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            registry: registry(),
            services,
            action_tx,
            stack: Vec::new(),
            state: RouteState::Idle,
        }
    }

    pub fn state(&self) -> &RouteState {
        &self.state
    }

    /// The fragment the app is currently on.
    pub fn current_fragment(&self) -> Option<&str> {
        self.stack.last().map(String::as_str)
    }

    pub fn current_params(&self) -> route::Params {
        self.current_fragment()
            .map(|f| route::resolve(f).params)
            .unwrap_or_default()
    }

    /// A fresh view for the current route, for running its post-render hook.
    pub fn current_view(&self) -> Option<Box<dyn View>> {
        let fragment = self.current_fragment()?;
        let factory = self.registry.get(route::resolve(fragment).name.as_str())?;
        Some(factory())
    }

    /// Whether leaving the current route is possible.
    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    /// Navigate to a fragment, pushing it onto the stack. Navigating to the
    /// fragment already on top re-renders it in place.
    pub fn navigate(&mut self, fragment: &str) {
        let fragment = fragment.trim_start_matches('#').to_string();
        if self.current_fragment() != Some(fragment.as_str()) {
            self.stack.push(fragment.clone());
        }
        self.begin(fragment);
    }

    /// Pop the stack and re-render the previous route. At the stack bottom
    /// this is a no-op, matching a back affordance that is hidden on home.
    pub fn back(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        self.stack.pop();
        if let Some(fragment) = self.current_fragment() {
            let fragment = fragment.to_string();
            self.begin(fragment);
        }
    }

    /// Re-render the current route without touching the stack.
    pub fn refresh(&mut self) {
        if let Some(fragment) = self.current_fragment() {
            let fragment = fragment.to_string();
            self.begin(fragment);
        }
    }

    /// A background render finished. Returns the markup when the result is
    /// for the current route and it succeeded; stale results are dropped.
    pub fn on_rendered(
        &mut self,
        fragment: String,
        result: Result<Markup, String>,
    ) -> Option<Markup> {
        if self.current_fragment() != Some(fragment.as_str()) {
            tracing::debug!("dropping stale render for {:?}", fragment);
            return None;
        }

        match result {
            Ok(markup) => {
                self.state = RouteState::Rendered {
                    fragment,
                    markup: markup.clone(),
                };
                Some(markup)
            }
            Err(message) => {
                tracing::error!("render failed for {:?}: {}", fragment, message);
                self.state = RouteState::Failed { fragment, message };
                None
            }
        }
    }

    /// Resolve the fragment and kick off its view's render.
    fn begin(&mut self, fragment: String) {
        let resolved = route::resolve(&fragment);

        let Some(factory) = self.registry.get(resolved.name.as_str()) else {
            tracing::warn!("no view registered for route {:?}", resolved.name);
            self.state = RouteState::NotFound { fragment };
            return;
        };

        self.state = RouteState::Loading {
            fragment: fragment.clone(),
        };

        let view = factory();
        let cx = RenderCx {
            services: Arc::clone(&self.services),
            params: resolved.params,
        };
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = view.render(&cx).await.map_err(|e| e.to_string());
            let _ = tx.send(Action::RouteRendered { fragment, result });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support;

    fn router() -> (Router, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Router::new(test_support::services(), tx), rx)
    }

    #[tokio::test]
    async fn test_navigate_pushes_and_loads() {
        let (mut router, _rx) = router();
        router.navigate("home");
        router.navigate("#songs");

        assert_eq!(router.current_fragment(), Some("songs"));
        assert!(router.can_go_back());
        assert!(matches!(router.state(), RouteState::Loading { fragment } if fragment == "songs"));
    }

    #[tokio::test]
    async fn test_navigate_same_fragment_does_not_stack() {
        let (mut router, _rx) = router();
        router.navigate("home");
        router.navigate("home");
        assert!(!router.can_go_back());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found_and_back_recovers() {
        let (mut router, _rx) = router();
        router.navigate("home");
        router.navigate("no-such-view");
        assert!(matches!(router.state(), RouteState::NotFound { .. }));

        router.back();
        assert_eq!(router.current_fragment(), Some("home"));
        assert!(matches!(router.state(), RouteState::Loading { .. }));
    }

    #[tokio::test]
    async fn test_back_at_stack_bottom_is_noop() {
        let (mut router, _rx) = router();
        router.navigate("home");
        let before = router.state().clone();
        router.back();
        assert_eq!(router.current_fragment(), Some("home"));
        assert_eq!(*router.state(), before);
    }

    #[tokio::test]
    async fn test_stale_render_result_is_dropped() {
        let (mut router, _rx) = router();
        router.navigate("songs");
        router.navigate("sermons");

        let stale = router.on_rendered(String::from("songs"), Ok(Markup::new().heading("Songs")));
        assert!(stale.is_none());
        assert!(matches!(router.state(), RouteState::Loading { fragment } if fragment == "sermons"));

        let current = router.on_rendered(
            String::from("sermons"),
            Ok(Markup::new().heading("Sermons")),
        );
        assert!(current.is_some());
        assert!(matches!(router.state(), RouteState::Rendered { .. }));
    }

    #[tokio::test]
    async fn test_failed_render_records_message() {
        let (mut router, _rx) = router();
        router.navigate("songs");
        let markup = router.on_rendered(String::from("songs"), Err(String::from("boom")));
        assert!(markup.is_none());
        assert!(
            matches!(router.state(), RouteState::Failed { message, .. } if message == "boom")
        );
    }
}
