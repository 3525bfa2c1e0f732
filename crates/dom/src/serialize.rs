//! Serialization of the arena tree back to XML text.
//!
//! Escaping is entity-aware: a `&` that already begins a valid entity
//! reference is left alone, so values that arrive pre-escaped are never
//! double-escaped.

use crate::parse::Prolog;
use crate::tree::{NodeId, NodeKind, Tree};

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Escapes text content: `<`, `>`, and any `&` not opening an entity.
pub fn encode_text(s: &str) -> String {
    encode(s, false)
}

/// Escapes an attribute value: text rules plus `"`.
pub fn encode_attr(s: &str) -> String {
    encode(s, true)
}

fn encode(s: &str, quote: bool) -> String {
    let mut out = String::with_capacity(s.len());
    let bytes = s.as_bytes();
    for (i, ch) in s.char_indices() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote => out.push_str("&quot;"),
            '&' => {
                if starts_entity(&bytes[i + 1..]) {
                    out.push('&');
                } else {
                    out.push_str("&amp;");
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Whether the bytes after a `&` look like `name;` with a short entity
/// name (alphanumeric, `_` or `#`), e.g. `amp;`, `#x27;`, `nbsp;`.
fn starts_entity(rest: &[u8]) -> bool {
    for (i, &b) in rest.iter().take(8).enumerate() {
        match b {
            b';' => return i > 0,
            b if b.is_ascii_alphanumeric() || b == b'_' || b == b'#' => continue,
            _ => return false,
        }
    }
    false
}

/// Serializes the tree. Whole-document mode re-emits the captured (or a
/// default) XML declaration and any DOCTYPE; fragment mode drops both and
/// strips the default XHTML namespace declaration from top-level elements.
pub fn serialize(tree: &Tree, prolog: &Prolog, whole: bool) -> String {
    let mut out = String::new();
    if whole {
        out.push_str(
            prolog
                .decl
                .as_deref()
                .unwrap_or(r#"<?xml version="1.0" encoding="utf-8"?>"#),
        );
        out.push('\n');
        if let Some(doctype) = &prolog.doctype {
            out.push_str(doctype);
            out.push('\n');
        }
    }
    for child in tree.children(tree.root()) {
        write_node(tree, child, !whole, &mut out);
    }
    out
}

/// Serializes a single subtree as a fragment.
pub fn serialize_node(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, false, &mut out);
    out
}

fn write_node(tree: &Tree, id: NodeId, strip_default_ns: bool, out: &mut String) {
    match tree.kind(id) {
        NodeKind::Root => {
            for child in tree.children(id) {
                write_node(tree, child, false, out);
            }
        }
        NodeKind::Element { name, attrs } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attrs {
                if strip_default_ns && key == "xmlns" && value == XHTML_NS {
                    continue;
                }
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&encode_attr(value));
                out.push('"');
            }
            if tree.first_child(id).is_none() {
                out.push_str("/>");
            } else {
                out.push('>');
                for child in tree.children(id) {
                    write_node(tree, child, false, out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
        NodeKind::Text(data) => out.push_str(&encode_text(data)),
        NodeKind::CData(data) => {
            out.push_str("<![CDATA[");
            out.push_str(data);
            out.push_str("]]>");
        }
        NodeKind::Comment(data) => {
            out.push_str("<!--");
            out.push_str(data);
            out.push_str("-->");
        }
    }
}
