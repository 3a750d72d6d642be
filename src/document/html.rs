//! HTML parsing into the page tree and serialization back to markup.

use ego_tree::{NodeId, NodeRef, Tree};
use scraper::{Html, Node};

use super::page::{ElementData, PageNode};

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text content is emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// What: Convert a parsed `scraper` node into a page node.
///
/// Output:
/// - `None` for node kinds the page tree does not keep (document/fragment roots,
///   processing instructions)
fn convert(node: &Node) -> Option<PageNode> {
    match node {
        Node::Element(el) => Some(PageNode::Element(ElementData {
            name: el.name().to_ascii_lowercase(),
            attrs: el
                .attrs()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })),
        Node::Text(t) => Some(PageNode::Text(String::from(&**t))),
        Node::Comment(c) => Some(PageNode::Comment(String::from(&**c))),
        Node::Doctype(d) => Some(PageNode::Doctype(d.name().to_string())),
        _ => None,
    }
}

/// What: Copy the children of a parsed node under `parent` in the page tree.
///
/// Output:
/// - Ids of the nodes appended directly under `parent`
fn graft_children(src: NodeRef<Node>, tree: &mut Tree<PageNode>, parent: NodeId) -> Vec<NodeId> {
    let mut appended = Vec::new();
    for child in src.children() {
        let Some(value) = convert(child.value()) else {
            continue;
        };
        let Some(mut parent_mut) = tree.get_mut(parent) else {
            break;
        };
        let id = parent_mut.append(value).id();
        graft_children(child, tree, id);
        appended.push(id);
    }
    appended
}

/// What: Parse a full HTML document into a page tree.
///
/// Output:
/// - Tree rooted at `PageNode::Document`; html5ever guarantees an `<html>` element
pub(super) fn parse_document(markup: &str) -> Tree<PageNode> {
    let document = Html::parse_document(markup);
    let mut tree = Tree::new(PageNode::Document);
    let root = tree.root().id();
    graft_children(document.tree.root(), &mut tree, root);
    tree
}

/// What: Parse an HTML fragment and append its nodes under `parent`.
///
/// Output:
/// - Ids of the top-level nodes appended
///
/// Details:
/// - Parsed in a `<body>` context; html5ever's wrapper element is skipped.
pub(super) fn append_fragment(tree: &mut Tree<PageNode>, parent: NodeId, markup: &str) -> Vec<NodeId> {
    let fragment = Html::parse_fragment(markup);
    let Some(wrapper) = fragment.tree.get(fragment.root_element().id()) else {
        return Vec::new();
    };
    graft_children(wrapper, tree, parent)
}

fn escape_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// What: Serialize a node and its subtree as HTML.
///
/// Inputs:
/// - `out`: Output buffer
/// - `node`: Node to serialize
/// - `raw_text`: Whether the node sits inside `<script>`/`<style>`
pub(super) fn serialize(out: &mut String, node: NodeRef<PageNode>, raw_text: bool) {
    match node.value() {
        PageNode::Document => {
            for child in node.children() {
                serialize(out, child, false);
            }
        }
        PageNode::Doctype(name) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        PageNode::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        PageNode::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                escape_text(out, text);
            }
        }
        PageNode::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (name, value) in &el.attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_attr(out, value);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.name.as_str()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&el.name.as_str());
            for child in node.children() {
                serialize(out, child, raw);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}
