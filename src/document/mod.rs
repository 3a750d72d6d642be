//! Page document abstraction targeted by translation bindings.
//!
//! The binder only needs a handful of operations on a page: enumerate elements,
//! read and write attributes, replace content, and set the title and document
//! language. `Document` captures that surface; `PageDocument` implements it over
//! parsed HTML so pages can be translated ahead of time or in tests.

mod html;
mod page;

pub use page::{ElementData, PageDocument, PageNode};

use std::fmt::Debug;
use std::hash::Hash;

use tokio::sync::mpsc::UnboundedReceiver;

/// What: Mutable view of a page document.
///
/// Details:
/// - Node handles are cheap copyable ids, valid for the lifetime of the document.
/// - Only element nodes are ever handed to the binder.
pub trait Document {
    /// Element handle.
    type Node: Copy + Eq + Hash + Debug;

    /// Outermost element of the document (`<html>` for parsed pages).
    fn root(&self) -> Self::Node;

    /// `scope` (if it is an element) followed by its element descendants, in document order.
    fn elements(&self, scope: Self::Node) -> Vec<Self::Node>;

    /// Lowercase tag name of an element.
    fn tag_name(&self, node: Self::Node) -> Option<&str>;

    /// Attribute value of an element.
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;

    /// Set (or add) an attribute on an element.
    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    /// Replace the children of an element with a single text node.
    fn set_text(&mut self, node: Self::Node, text: &str);

    /// Replace the children of an element with raw markup, written verbatim.
    fn set_inner_html(&mut self, node: Self::Node, html: &str);

    /// Set the document title.
    fn set_title(&mut self, title: &str);

    /// Set the document language attribute (`<html lang>`).
    fn set_language(&mut self, lang: &str) {
        let root = self.root();
        self.set_attribute(root, "lang", lang);
    }
}

/// Structural change reported to dynamic-content subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<N> {
    /// An element was inserted by page code.
    Inserted(N),
    /// An attribute value changed on an element.
    AttributeChanged {
        /// Element whose attribute changed.
        node: N,
        /// Attribute name.
        name: String,
    },
}

/// What: Document that reports structural mutations.
///
/// Details:
/// - Content written by the binder (`set_text`, `set_inner_html`, `set_title`) is not reported.
/// - Attribute writes are reported, including the binder's; subscribers filter by name.
pub trait Observable: Document {
    /// Open a mutation feed; dropping the receiver ends the subscription.
    fn subscribe(&mut self) -> UnboundedReceiver<Mutation<Self::Node>>;
}
