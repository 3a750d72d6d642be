//! In-memory HTML page backed by an `ego_tree` arena.

use ego_tree::{NodeId, Tree};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::html;
use super::{Document, Mutation, Observable};

/// Element name and attributes, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// Lowercase tag name.
    pub name: String,
    /// Attributes as (name, value) pairs.
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    /// What: Look up an attribute value by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Node stored in the page tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageNode {
    /// Tree root.
    Document,
    /// `<!DOCTYPE name>`.
    Doctype(String),
    /// Element node.
    Element(ElementData),
    /// Text node (unescaped).
    Text(String),
    /// Comment node.
    Comment(String),
}

/// What: Parsed HTML page implementing `Document`.
///
/// Details:
/// - Insertions made with `append_element`/`append_html` and attribute changes are
///   reported to subscribers; content replaced by the binder is not.
/// - Subscribers whose receiver was dropped are removed on the next `subscribe` or
///   mutation. A live receiver that is never drained keeps buffering every mutation.
/// - Replaced children stay in the arena as detached nodes, so memory grows with
///   each `set_inner_html` pass. `set_text` rewrites a sole text child in place and
///   does not grow the arena across repeated language switches.
#[derive(Debug)]
pub struct PageDocument {
    tree: Tree<PageNode>,
    html: NodeId,
    subscribers: Vec<UnboundedSender<Mutation<NodeId>>>,
}

impl Default for PageDocument {
    fn default() -> Self {
        Self::parse("<!DOCTYPE html><html><head></head><body></body></html>")
    }
}

impl PageDocument {
    /// What: Parse a full HTML document.
    ///
    /// Inputs:
    /// - `markup`: HTML source; malformed markup is repaired by the HTML5 parser
    ///
    /// Output:
    /// - `PageDocument` with an `<html>` root element
    #[must_use]
    pub fn parse(markup: &str) -> Self {
        let mut tree = html::parse_document(markup);
        let existing = tree
            .root()
            .children()
            .find(|n| matches!(n.value(), PageNode::Element(e) if e.name == "html"))
            .map(|n| n.id());
        let html = existing.unwrap_or_else(|| {
            tree.root_mut()
                .append(PageNode::Element(ElementData {
                    name: "html".to_string(),
                    attrs: Vec::new(),
                }))
                .id()
        });
        Self {
            tree,
            html,
            subscribers: Vec::new(),
        }
    }

    /// What: Serialize the document back to HTML.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        html::serialize(&mut out, self.tree.root(), false);
        out
    }

    /// What: Serialize the children of an element.
    #[must_use]
    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(n) = self.tree.get(node) {
            for child in n.children() {
                html::serialize(&mut out, child, false);
            }
        }
        out
    }

    /// What: Concatenated text of all text nodes below `node`.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        self.tree.get(node).map_or_else(String::new, |n| {
            n.descendants()
                .filter_map(|d| match d.value() {
                    PageNode::Text(t) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        })
    }

    /// What: First element with the given tag name, in document order.
    #[must_use]
    pub fn find_element(&self, tag: &str) -> Option<NodeId> {
        self.tree
            .root()
            .descendants()
            .find(|n| matches!(n.value(), PageNode::Element(e) if e.name == tag))
            .map(|n| n.id())
    }

    /// What: Elements carrying attribute `name` with value `value`.
    #[must_use]
    pub fn find_by_attr(&self, name: &str, value: &str) -> Vec<NodeId> {
        self.tree
            .root()
            .descendants()
            .filter(|n| matches!(n.value(), PageNode::Element(e) if e.attr(name) == Some(value)))
            .map(|n| n.id())
            .collect()
    }

    /// What: Current document title, if a `<title>` element exists.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.find_element("title").map(|t| self.text_content(t))
    }

    /// What: Number of subscribers whose receiver is still alive.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|tx| !tx.is_closed()).count()
    }

    fn emit(&mut self, mutation: &Mutation<NodeId>) {
        self.subscribers
            .retain(|tx| !tx.is_closed() && tx.send(mutation.clone()).is_ok());
    }

    /// What: Append a new element under `parent` and report the insertion.
    ///
    /// Output:
    /// - Id of the new element, or `None` if `parent` does not exist
    pub fn append_element(
        &mut self,
        parent: NodeId,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Option<NodeId> {
        let data = ElementData {
            name: name.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        };
        let id = self.tree.get_mut(parent)?.append(PageNode::Element(data)).id();
        self.emit(&Mutation::Inserted(id));
        Some(id)
    }

    /// What: Parse `markup` and append it under `parent`, reporting inserted elements.
    ///
    /// Output:
    /// - Ids of the top-level nodes appended
    pub fn append_html(&mut self, parent: NodeId, markup: &str) -> Vec<NodeId> {
        let ids = html::append_fragment(&mut self.tree, parent, markup);
        for id in &ids {
            if self.is_element(*id) {
                self.emit(&Mutation::Inserted(*id));
            }
        }
        ids
    }

    fn is_element(&self, node: NodeId) -> bool {
        self.tree
            .get(node)
            .is_some_and(|n| matches!(n.value(), PageNode::Element(_)))
    }

    fn element(&self, node: NodeId) -> Option<&ElementData> {
        match self.tree.get(node)?.value() {
            PageNode::Element(e) => Some(e),
            _ => None,
        }
    }

    fn clear_children(&mut self, node: NodeId) {
        if let Some(mut n) = self.tree.get_mut(node) {
            while let Some(mut child) = n.first_child() {
                child.detach();
            }
        }
    }

    fn ensure_child(&mut self, parent: NodeId, tag: &str) -> Option<NodeId> {
        let existing = self.tree.get(parent)?.children().find(
            |n| matches!(n.value(), PageNode::Element(e) if e.name == tag),
        );
        if let Some(n) = existing {
            return Some(n.id());
        }
        let data = ElementData {
            name: tag.to_string(),
            attrs: Vec::new(),
        };
        Some(self.tree.get_mut(parent)?.append(PageNode::Element(data)).id())
    }
}

impl Observable for PageDocument {
    fn subscribe(&mut self) -> UnboundedReceiver<Mutation<NodeId>> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.retain(|tx| !tx.is_closed());
        self.subscribers.push(tx);
        rx
    }
}

impl Document for PageDocument {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.html
    }

    fn elements(&self, scope: NodeId) -> Vec<NodeId> {
        self.tree.get(scope).map_or_else(Vec::new, |n| {
            n.descendants()
                .filter(|d| matches!(d.value(), PageNode::Element(_)))
                .map(|d| d.id())
                .collect()
        })
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.name.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).and_then(|e| e.attr(name))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(mut n) = self.tree.get_mut(node) else {
            return;
        };
        let PageNode::Element(el) = n.value() else {
            return;
        };
        match el.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) if v.as_str() == value => return,
            Some((_, v)) => value.clone_into(v),
            None => el.attrs.push((name.to_string(), value.to_string())),
        }
        self.emit(&Mutation::AttributeChanged {
            node,
            name: name.to_string(),
        });
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if !self.is_element(node) {
            return;
        }
        let sole_text = self.tree.get(node).and_then(|n| {
            let child = n.first_child()?;
            (child.next_sibling().is_none() && matches!(child.value(), PageNode::Text(_)))
                .then_some(child.id())
        });
        if let Some(id) = sole_text
            && let Some(mut child) = self.tree.get_mut(id)
            && let PageNode::Text(current) = child.value()
        {
            if current.as_str() != text {
                text.clone_into(current);
            }
            return;
        }
        self.clear_children(node);
        if let Some(mut n) = self.tree.get_mut(node) {
            n.append(PageNode::Text(text.to_string()));
        }
    }

    fn set_inner_html(&mut self, node: NodeId, html: &str) {
        if !self.is_element(node) {
            return;
        }
        self.clear_children(node);
        html::append_fragment(&mut self.tree, node, html);
    }

    fn set_title(&mut self, title: &str) {
        let title_el = match self.find_element("title") {
            Some(t) => Some(t),
            None => self
                .ensure_child(self.html, "head")
                .and_then(|head| self.ensure_child(head, "title")),
        };
        if let Some(t) = title_el {
            self.set_text(t, title);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_document_has_skeleton() {
        let doc = PageDocument::default();
        assert!(doc.find_element("head").is_some());
        assert!(doc.find_element("body").is_some());
        assert_eq!(doc.tag_name(doc.root()), Some("html"));
    }

    #[test]
    fn set_text_replaces_children() {
        let mut doc = PageDocument::parse("<html><body><p id=\"p\">old <b>bold</b></p></body></html>");
        let p = doc.find_by_attr("id", "p")[0];
        doc.set_text(p, "a < b");
        assert_eq!(doc.inner_html(p), "a &lt; b");
        assert_eq!(doc.text_content(p), "a < b");
    }

    #[test]
    fn set_inner_html_parses_markup() {
        let mut doc = PageDocument::parse("<html><body><p id=\"p\">old</p></body></html>");
        let p = doc.find_by_attr("id", "p")[0];
        doc.set_inner_html(p, "Read <a href=\"/docs\">the docs</a>");
        assert_eq!(doc.inner_html(p), "Read <a href=\"/docs\">the docs</a>");
    }

    #[test]
    fn set_title_creates_missing_title() {
        let mut doc = PageDocument::parse("<html><head></head><body></body></html>");
        assert_eq!(doc.title(), None);
        doc.set_title("Merge PDF");
        assert_eq!(doc.title(), Some("Merge PDF".to_string()));
        doc.set_title("PDF 合并");
        assert_eq!(doc.title(), Some("PDF 合并".to_string()));
    }

    #[test]
    fn set_language_sets_html_lang() {
        let mut doc = PageDocument::default();
        doc.set_language("zh");
        assert_eq!(doc.attribute(doc.root(), "lang"), Some("zh"));
        assert!(doc.to_html().contains("<html lang=\"zh\">"));
    }

    #[test]
    fn mutations_are_reported_to_subscribers() {
        let mut doc = PageDocument::default();
        let mut rx = doc.subscribe();
        let body = doc.find_element("body").expect("default document has a body");

        let div = doc
            .append_element(body, "div", &[("data-i18n", "a.b")])
            .expect("body exists");
        assert_eq!(rx.try_recv().ok(), Some(Mutation::Inserted(div)));

        doc.set_attribute(div, "data-i18n", "a.c");
        assert_eq!(
            rx.try_recv().ok(),
            Some(Mutation::AttributeChanged {
                node: div,
                name: "data-i18n".to_string()
            })
        );

        doc.set_attribute(div, "data-i18n", "a.c");
        doc.set_text(div, "unreported");
        assert!(rx.try_recv().is_err());

        drop(rx);
        assert_eq!(doc.subscriber_count(), 0);
        doc.set_attribute(div, "title", "x");
        assert!(doc.subscribers.is_empty());
    }

    #[test]
    fn dropped_receivers_are_pruned_on_subscribe() {
        let mut doc = PageDocument::default();
        for _ in 0..3 {
            drop(doc.subscribe());
        }
        let _live = doc.subscribe();
        assert_eq!(doc.subscribers.len(), 1);
        assert_eq!(doc.subscriber_count(), 1);
    }

    #[test]
    fn repeated_set_text_does_not_grow_the_arena() {
        let mut doc = PageDocument::parse("<html><body><p id=\"p\">Home</p></body></html>");
        let p = doc.find_by_attr("id", "p")[0];
        doc.set_text(p, "首页");
        let nodes = doc.tree.nodes().count();
        for text in ["Home", "ホーム", "首页", "Home"] {
            doc.set_text(p, text);
        }
        assert_eq!(doc.tree.nodes().count(), nodes);
        assert_eq!(doc.text_content(p), "Home");
    }
}
