//! View markup: the serializable fragment a view's render produces.
//!
//! A fragment is a flat list of nodes; links are the interactive surface the
//! shell exposes (selection with up/down, activation with enter). Views never
//! touch the terminal directly.

use crate::action::Action;

/// What activating a link does.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// Navigate to another fragment.
    Route(String),
    /// Dispatch an action to the app.
    Dispatch(Action),
    /// A locator outside the app (shown to the user, not followed).
    External(String),
}

/// One interactive entry in a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub label: String,
    pub target: Target,
}

/// One line of rendered content.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Heading(String),
    Text(String),
    Blank,
    Link(Link),
    /// Inline warning or empty-state text.
    Notice(String),
}

/// A rendered view fragment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Markup {
    pub nodes: Vec<Node>,
}

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(mut self, text: impl Into<String>) -> Self {
        self.nodes.push(Node::Heading(text.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.nodes.push(Node::Text(text.into()));
        self
    }

    pub fn blank(mut self) -> Self {
        self.nodes.push(Node::Blank);
        self
    }

    pub fn notice(mut self, text: impl Into<String>) -> Self {
        self.nodes.push(Node::Notice(text.into()));
        self
    }

    pub fn route_link(mut self, label: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.nodes.push(Node::Link(Link {
            label: label.into(),
            target: Target::Route(fragment.into()),
        }));
        self
    }

    pub fn action_link(mut self, label: impl Into<String>, action: Action) -> Self {
        self.nodes.push(Node::Link(Link {
            label: label.into(),
            target: Target::Dispatch(action),
        }));
        self
    }

    pub fn external_link(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.nodes.push(Node::Link(Link {
            label: label.into(),
            target: Target::External(url.into()),
        }));
        self
    }

    /// All links in document order.
    pub fn links(&self) -> Vec<&Link> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                Node::Link(link) => Some(link),
                _ => None,
            })
            .collect()
    }

    /// The nth link, counting in document order.
    pub fn link(&self, index: usize) -> Option<&Link> {
        self.links().get(index).copied()
    }

    pub fn link_count(&self) -> usize {
        self.links().len()
    }

    /// Node index of the nth link, for scroll positioning.
    pub fn node_index_of_link(&self, index: usize) -> Option<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| matches!(node, Node::Link(_)))
            .nth(index)
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_in_document_order() {
        let markup = Markup::new()
            .heading("Songs")
            .route_link("First", "song-player?title=First")
            .text("between")
            .route_link("Second", "song-player?title=Second");

        let links = markup.links();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].label, "First");
        assert_eq!(links[1].label, "Second");
        assert_eq!(markup.link(1).unwrap().label, "Second");
        assert!(markup.link(2).is_none());
    }

    #[test]
    fn test_node_index_of_link() {
        let markup = Markup::new()
            .heading("h")
            .blank()
            .route_link("a", "x")
            .text("t")
            .route_link("b", "y");

        assert_eq!(markup.node_index_of_link(0), Some(2));
        assert_eq!(markup.node_index_of_link(1), Some(4));
        assert_eq!(markup.node_index_of_link(2), None);
    }
}
