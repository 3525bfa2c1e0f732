//! XML parsing into the arena tree, via quick-xml events.

use crate::error::DomError;
use crate::tree::{NodeId, NodeKind, Tree};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event as XmlEvent;

/// Document prolog captured at parse time and re-emitted only by
/// whole-document serialization.
#[derive(Debug, Clone, Default)]
pub struct Prolog {
    pub decl: Option<String>,
    pub doctype: Option<String>,
}

/// Parses a complete XML document into a tree plus its prolog.
pub fn parse_document(source: &str) -> Result<(Tree, Prolog), DomError> {
    let mut prolog = Prolog::default();
    let tree = parse_into_tree(source, Some(&mut prolog))?;
    Ok((tree, prolog))
}

/// Parses an XML fragment (zero or more top-level nodes, text included)
/// into a tree whose root holds the fragment's nodes. Fails on anything
/// not well-formed; callers fall back to a plain text node.
pub fn parse_fragment(source: &str) -> Result<Tree, DomError> {
    parse_into_tree(source, None)
}

fn parse_into_tree(source: &str, mut prolog: Option<&mut Prolog>) -> Result<Tree, DomError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);
    let mut tree = Tree::new();
    let mut stack = vec![tree.root()];
    let mut buf = Vec::new();

    loop {
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| DomError::Parse(e.to_string()))?
        {
            XmlEvent::Decl(e) => {
                if let Some(p) = prolog.as_deref_mut() {
                    let content = std::str::from_utf8(e.as_ref())
                        .map_err(|e| DomError::Parse(e.to_string()))?;
                    p.decl = Some(format!("<?{}?>", content));
                }
            }
            XmlEvent::DocType(e) => {
                if let Some(p) = prolog.as_deref_mut() {
                    let content = std::str::from_utf8(e.as_ref())
                        .map_err(|e| DomError::Parse(e.to_string()))?;
                    p.doctype = Some(format!("<!DOCTYPE {}>", content.trim()));
                }
            }
            XmlEvent::Start(e) => {
                let id = tree.new_node(element_kind(&reader, &e)?);
                let parent = *stack.last().unwrap_or(&tree.root());
                tree.append_child(parent, id);
                stack.push(id);
            }
            XmlEvent::Empty(e) => {
                let id = tree.new_node(element_kind(&reader, &e)?);
                let parent = *stack.last().unwrap_or(&tree.root());
                tree.append_child(parent, id);
            }
            XmlEvent::End(_) => {
                if stack.len() > 1 {
                    stack.pop();
                }
            }
            XmlEvent::Text(e) => {
                let raw = std::str::from_utf8(e.as_ref())
                    .map_err(|e| DomError::Parse(e.to_string()))?;
                let text = unescape(raw).map_err(|e| DomError::Parse(e.to_string()))?;
                // Whitespace between the prolog and the root element (or
                // after it) is not content.
                if prolog.is_some() && stack.len() == 1 && text.trim().is_empty() {
                    buf.clear();
                    continue;
                }
                let parent = *stack.last().unwrap_or(&tree.root());
                append_text(&mut tree, parent, &text);
            }
            XmlEvent::GeneralRef(e) => {
                let name = std::str::from_utf8(e.as_ref())
                    .map_err(|e| DomError::Parse(e.to_string()))?;
                let parent = *stack.last().unwrap_or(&tree.root());
                append_text(&mut tree, parent, &resolve_entity(name));
            }
            XmlEvent::CData(e) => {
                let data = std::str::from_utf8(e.as_ref())
                    .map_err(|e| DomError::Parse(e.to_string()))?
                    .to_string();
                let id = tree.new_node(NodeKind::CData(data));
                let parent = *stack.last().unwrap_or(&tree.root());
                tree.append_child(parent, id);
            }
            XmlEvent::Comment(e) => {
                let data = std::str::from_utf8(e.as_ref())
                    .map_err(|e| DomError::Parse(e.to_string()))?
                    .to_string();
                let id = tree.new_node(NodeKind::Comment(data));
                let parent = *stack.last().unwrap_or(&tree.root());
                tree.append_child(parent, id);
            }
            XmlEvent::Eof => break,
            _ => (),
        }
        buf.clear();
    }

    if stack.len() > 1 {
        return Err(DomError::Parse("unclosed element at end of input".into()));
    }
    Ok(tree)
}

/// Appends text to `parent`, merging into a trailing text node so text
/// split across reader events stays one node.
fn append_text(tree: &mut Tree, parent: NodeId, text: &str) {
    if let Some(last) = tree.node(parent).last_child
        && let NodeKind::Text(existing) = tree.kind_mut(last)
    {
        existing.push_str(text);
        return;
    }
    let id = tree.new_node(NodeKind::Text(text.to_string()));
    tree.append_child(parent, id);
}

/// Decodes a general entity reference. The predefined five and numeric
/// character references resolve to their character; anything else is kept
/// verbatim so HTML-ish entities survive the round trip.
fn resolve_entity(name: &str) -> String {
    match name {
        "amp" => "&".to_string(),
        "lt" => "<".to_string(),
        "gt" => ">".to_string(),
        "quot" => "\"".to_string(),
        "apos" => "'".to_string(),
        s if s.starts_with('#') => {
            let code = if let Some(hex) = s[1..].strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()
            } else {
                s[1..].parse::<u32>().ok()
            };
            code.and_then(char::from_u32)
                .map_or_else(|| format!("&{};", name), |c| c.to_string())
        }
        _ => format!("&{};", name),
    }
}

fn element_kind(
    reader: &Reader<&[u8]>,
    e: &quick_xml::events::BytesStart,
) -> Result<NodeKind, DomError> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(|e| DomError::Parse(e.to_string()))?
        .to_string();
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| DomError::Parse(e.to_string()))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| DomError::Parse(e.to_string()))?
            .to_string();
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| DomError::Parse(e.to_string()))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(NodeKind::Element { name, attrs })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_prolog_and_structure() {
        let source = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml"><body id="b">Hi &amp; bye</body></html>"#;
        let (tree, prolog) = parse_document(source).unwrap();
        assert!(prolog.decl.as_deref().unwrap().starts_with("<?xml"));
        assert_eq!(prolog.doctype.as_deref(), Some("<!DOCTYPE html>"));

        let html = tree.root_element().unwrap();
        assert_eq!(tree.element_name(html), Some("html"));
        assert_eq!(
            tree.attr(html, "xmlns"),
            Some("http://www.w3.org/1999/xhtml")
        );
        let body = tree.children(html).next().unwrap();
        assert_eq!(tree.attr(body, "id"), Some("b"));
        // Entities are stored decoded.
        assert_eq!(tree.text_content(body), "Hi & bye");
    }

    #[test]
    fn test_fragment_with_multiple_top_level_nodes() {
        let tree = parse_fragment("one <b>two</b> three").unwrap();
        assert_eq!(tree.children(tree.root()).count(), 3);
        assert_eq!(tree.text_content(tree.root()), "one two three");
    }

    #[test]
    fn test_fragment_rejects_malformed_markup() {
        assert!(parse_fragment("3 < 5 & up").is_err());
        assert!(parse_fragment("<div>unclosed").is_err());
    }

    #[test]
    fn test_entity_references_resolve_into_text() {
        let tree = parse_fragment("<p>1 &lt; 2 &amp; 3 &#x27;quoted&#39;</p>").unwrap();
        let p = tree.root_element().unwrap();
        // References merge with surrounding text into one node.
        assert_eq!(tree.children(p).count(), 1);
        assert_eq!(tree.text_content(p), "1 < 2 & 3 'quoted'");
    }

    #[test]
    fn test_unknown_entity_is_kept_verbatim() {
        let tree = parse_fragment("<p>a&nbsp;b</p>").unwrap();
        let p = tree.root_element().unwrap();
        assert_eq!(tree.text_content(p), "a&nbsp;b");
    }

    #[test]
    fn test_prolog_whitespace_is_not_content() {
        let source = "<?xml version=\"1.0\"?>\n<!DOCTYPE html>\n<html><p>hi</p></html>\n";
        let (tree, _) = parse_document(source).unwrap();
        assert_eq!(tree.children(tree.root()).count(), 1);
        assert_eq!(
            tree.root_element(),
            tree.children(tree.root()).next()
        );
    }

    #[test]
    fn test_comment_and_cdata_nodes() {
        let tree = parse_fragment("<div><!-- slot --><![CDATA[x < y]]></div>").unwrap();
        let div = tree.root_element().unwrap();
        let kinds: Vec<&NodeKind> = tree.children(div).map(|c| tree.kind(c)).collect();
        assert!(matches!(kinds[0], NodeKind::Comment(c) if c == " slot "));
        assert!(matches!(kinds[1], NodeKind::CData(d) if d == "x < y"));
    }
}
