//! Declarative binding discovery and application.
//!
//! Elements opt into translation through `data-i18n*` attributes:
//!
//! | Attribute | Written to |
//! |---|---|
//! | `data-i18n="key"` | text content |
//! | `data-i18n-html="key"` | inner HTML (trusted dictionaries only, no sanitization) |
//! | `data-i18n-placeholder="key"` | `placeholder` attribute |
//! | `data-i18n-attr="title:key;aria-label:key2"` | the named attributes |
//! | `data-i18n-attrs="key"` | every attribute of the bundle at `key` |
//! | `data-i18n-doc-title="key"` | document title |
//! | `data-i18n-meta="key"` | `content` attribute of a `<meta>` element |
//!
//! Any other `data-i18n-*` attribute is ignored.

use crate::document::Document;
use crate::i18n::translations::FallbackChain;

/// Plain-text binding attribute.
pub const ATTR_TEXT: &str = "data-i18n";
/// Inner-HTML binding attribute.
pub const ATTR_HTML: &str = "data-i18n-html";
/// Placeholder binding attribute.
pub const ATTR_PLACEHOLDER: &str = "data-i18n-placeholder";
/// Named attribute binding attribute.
pub const ATTR_NAMED: &str = "data-i18n-attr";
/// Attribute bundle binding attribute.
pub const ATTR_BUNDLE: &str = "data-i18n-attrs";
/// Document title binding attribute.
pub const ATTR_DOC_TITLE: &str = "data-i18n-doc-title";
/// Meta content binding attribute.
pub const ATTR_META: &str = "data-i18n-meta";
/// Language switch control attribute.
pub const ATTR_LANG_SWITCH: &str = "data-lang-btn";

/// Every recognized declaration attribute.
pub const DECLARATION_ATTRS: [&str; 7] = [
    ATTR_TEXT,
    ATTR_HTML,
    ATTR_PLACEHOLDER,
    ATTR_NAMED,
    ATTR_BUNDLE,
    ATTR_DOC_TITLE,
    ATTR_META,
];

/// Where a resolved value is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Facet {
    /// Text content of the element.
    Text,
    /// Inner HTML of the element.
    Html,
    /// A named attribute of the element.
    Attribute(String),
    /// All attributes of an attribute bundle.
    AttributeBundle,
    /// The document title.
    DocumentTitle,
    /// The `content` attribute of a `<meta>` element.
    MetaContent,
}

/// One (key path, facet) declaration found on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Dot-notation key path.
    pub key: String,
    /// Facet the value is written to.
    pub facet: Facet,
}

impl Binding {
    fn new(key: &str, facet: Facet) -> Self {
        Self {
            key: key.trim().to_string(),
            facet,
        }
    }
}

/// What: Check whether an attribute name belongs to the binding vocabulary.
#[must_use]
pub fn is_declaration_attribute(name: &str) -> bool {
    DECLARATION_ATTRS.contains(&name)
}

/// What: Parse a `data-i18n-attr` value into (attribute, key) pairs.
///
/// Details:
/// - Entries are separated by `;`, each `attribute:key`.
/// - Entries without a colon or with an empty side are skipped.
fn parse_named_attrs(spec: &str) -> Vec<(String, String)> {
    spec.split(';')
        .filter_map(|entry| {
            let (attr, key) = entry.split_once(':')?;
            let (attr, key) = (attr.trim(), key.trim());
            (!attr.is_empty() && !key.is_empty()).then(|| (attr.to_string(), key.to_string()))
        })
        .collect()
}

/// What: Collect the binding declarations of one element.
///
/// Output:
/// - Declarations in vocabulary order; empty keys are dropped
#[must_use]
pub fn declarations<D: Document>(doc: &D, node: D::Node) -> Vec<Binding> {
    let mut bindings = Vec::new();
    let mut push = |attr: &str, facet: Facet| {
        if let Some(key) = doc.attribute(node, attr)
            && !key.trim().is_empty()
        {
            bindings.push(Binding::new(key, facet));
        }
    };
    push(ATTR_TEXT, Facet::Text);
    push(ATTR_HTML, Facet::Html);
    push(ATTR_PLACEHOLDER, Facet::Attribute("placeholder".to_string()));
    push(ATTR_BUNDLE, Facet::AttributeBundle);
    push(ATTR_DOC_TITLE, Facet::DocumentTitle);
    if doc.tag_name(node) == Some("meta") {
        push(ATTR_META, Facet::MetaContent);
    }
    if let Some(spec) = doc.attribute(node, ATTR_NAMED) {
        bindings.extend(
            parse_named_attrs(spec)
                .into_iter()
                .map(|(attr, key)| Binding::new(&key, Facet::Attribute(attr))),
        );
    }
    bindings
}

/// What: Write one binding's resolved value into the document.
///
/// Output:
/// - `true` if something was written
fn apply_binding<D: Document>(
    doc: &mut D,
    node: D::Node,
    binding: &Binding,
    chain: &FallbackChain<'_>,
) -> bool {
    match &binding.facet {
        Facet::Text => doc.set_text(node, &chain.text(&binding.key)),
        Facet::Html => doc.set_inner_html(node, &chain.text(&binding.key)),
        Facet::Attribute(name) => doc.set_attribute(node, name, &chain.text(&binding.key)),
        Facet::AttributeBundle => {
            let Some(bundle) = chain.bundle(&binding.key) else {
                tracing::debug!("No attribute bundle at '{}'", binding.key);
                return false;
            };
            for (name, value) in bundle {
                doc.set_attribute(node, name, value);
            }
        }
        Facet::DocumentTitle => {
            let title = chain.text(&binding.key);
            if title.is_empty() {
                return false;
            }
            doc.set_title(&title);
        }
        Facet::MetaContent => {
            let content = chain.text(&binding.key);
            if content.is_empty() {
                return false;
            }
            doc.set_attribute(node, "content", &content);
        }
    }
    true
}

/// What: Apply every binding declared in `scope` (inclusive).
///
/// Inputs:
/// - `doc`: Document to update
/// - `scope`: Element whose subtree is scanned
/// - `chain`: Dictionaries to resolve through
///
/// Output:
/// - Number of facets written
pub fn apply_bindings<D: Document>(doc: &mut D, scope: D::Node, chain: &FallbackChain<'_>) -> usize {
    let mut written = 0;
    for node in doc.elements(scope) {
        for binding in declarations(doc, node) {
            if apply_binding(doc, node, &binding, chain) {
                written += 1;
            }
        }
    }
    written
}

/// What: Find language switch controls in `scope`.
///
/// Output:
/// - (element, language code) pairs; the code is empty when the attribute has no value
#[must_use]
pub fn language_switches<D: Document>(doc: &D, scope: D::Node) -> Vec<(D::Node, String)> {
    doc.elements(scope)
        .into_iter()
        .filter_map(|node| {
            doc.attribute(node, ATTR_LANG_SWITCH)
                .map(|lang| (node, lang.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::PageDocument;
    use crate::i18n::dictionary::Dictionary;
    use serde_json::json;

    const PAGE: &str = r#"<!DOCTYPE html><html><head>
<title data-i18n-doc-title="page.title">Old</title>
<meta name="description" data-i18n-meta="page.desc" content="old">
<link rel="x" data-i18n-meta="page.desc">
</head><body>
<h1 id="h" data-i18n="page.heading">Old</h1>
<p id="p" data-i18n-html="page.intro">Old</p>
<input id="q" data-i18n-placeholder="search.hint">
<button id="b" data-i18n-attr="title:search.go; aria-label :search.go;broken;:x">Go</button>
<input id="bundle" data-i18n-attrs="search.box">
<span id="u" data-i18n-unknown="page.heading">keep</span>
<a id="sw" data-lang-btn="zh">中文</a><a data-lang-btn>?</a>
</body></html>"#;

    fn en() -> Dictionary {
        Dictionary::from_value(json!({
            "page": {
                "title": "PDF Tools",
                "desc": "Free PDF tools",
                "heading": "Merge PDF",
                "intro": "Drop files <b>here</b>"
            },
            "search": {
                "hint": "Search tools",
                "go": "Go",
                "box": {"placeholder": "Find", "aria-label": "Find a tool"}
            }
        }))
        .expect("test dictionary must be an object")
    }

    fn by_id(doc: &PageDocument, id: &str) -> ego_tree::NodeId {
        doc.find_by_attr("id", id)[0]
    }

    #[test]
    fn applies_every_facet() {
        let mut doc = PageDocument::parse(PAGE);
        let en = en();
        let chain = FallbackChain::new(&en, None);
        let root = doc.root();
        let written = apply_bindings(&mut doc, root, &chain);
        assert_eq!(written, 8);

        assert_eq!(doc.title(), Some("PDF Tools".to_string()));
        let meta = doc.find_by_attr("name", "description")[0];
        assert_eq!(doc.attribute(meta, "content"), Some("Free PDF tools"));
        let link = doc.find_element("link").expect("page has a link");
        assert_eq!(doc.attribute(link, "content"), None);

        assert_eq!(doc.text_content(by_id(&doc, "h")), "Merge PDF");
        assert_eq!(doc.inner_html(by_id(&doc, "p")), "Drop files <b>here</b>");
        assert_eq!(doc.attribute(by_id(&doc, "q"), "placeholder"), Some("Search tools"));

        let b = by_id(&doc, "b");
        assert_eq!(doc.attribute(b, "title"), Some("Go"));
        assert_eq!(doc.attribute(b, "aria-label"), Some("Go"));

        let bundle = by_id(&doc, "bundle");
        assert_eq!(doc.attribute(bundle, "placeholder"), Some("Find"));
        assert_eq!(doc.attribute(bundle, "aria-label"), Some("Find a tool"));

        assert_eq!(doc.text_content(by_id(&doc, "u")), "keep");
    }

    #[test]
    fn missing_keys_render_raw_key_paths() {
        let mut doc = PageDocument::parse(PAGE);
        let empty = Dictionary::empty();
        let chain = FallbackChain::new(&empty, None);
        let root = doc.root();
        apply_bindings(&mut doc, root, &chain);

        assert_eq!(doc.text_content(by_id(&doc, "h")), "page.heading");
        assert_eq!(doc.title(), Some("page.title".to_string()));
        let bundle = by_id(&doc, "bundle");
        assert_eq!(doc.attribute(bundle, "placeholder"), None);
    }

    #[test]
    fn scoped_application_leaves_rest_untouched() {
        let mut doc = PageDocument::parse(PAGE);
        let en = en();
        let chain = FallbackChain::new(&en, None);
        let h = by_id(&doc, "h");
        assert_eq!(apply_bindings(&mut doc, h, &chain), 1);
        assert_eq!(doc.text_content(h), "Merge PDF");
        assert_eq!(doc.text_content(by_id(&doc, "p")), "Old");
    }

    #[test]
    fn parses_named_attribute_lists() {
        assert_eq!(
            parse_named_attrs("title:a.b; aria-label : c ;bad;:x;y:"),
            vec![
                ("title".to_string(), "a.b".to_string()),
                ("aria-label".to_string(), "c".to_string())
            ]
        );
    }

    #[test]
    fn finds_language_switches() {
        let doc = PageDocument::parse(PAGE);
        let switches = language_switches(&doc, doc.root());
        assert_eq!(switches.len(), 2);
        assert_eq!(switches[0], (by_id(&doc, "sw"), "zh".to_string()));
        assert_eq!(switches[1].1, "");
    }

    #[test]
    fn vocabulary_is_closed() {
        assert!(is_declaration_attribute("data-i18n"));
        assert!(is_declaration_attribute("data-i18n-meta"));
        assert!(!is_declaration_attribute("data-i18n-unknown"));
        assert!(!is_declaration_attribute("placeholder"));
    }
}
