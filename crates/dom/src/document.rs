//! The `Document`: a parsed tree plus the query/mutation surface the
//! directive compiler is written against.
//!
//! Recoverable failures (malformed XML, paths that match nothing,
//! unsupported values) are accumulated as diagnostics on the document,
//! never raised; every operation on an unset document is a recorded no-op.

use crate::cursor::{Cursor, NodeHandle, Target};
use crate::gap::{self, GapMode};
use crate::parse::{Prolog, parse_document, parse_fragment};
use crate::serialize;
use crate::tree::{NodeId, NodeKind, Tree};
use log::{debug, warn};
use weft_xpath::{EvaluationContext, PathValue, evaluate, parse_expression};

/// Elements that legitimately stay self-closed; every other childless
/// element gets an empty text child by `tidy` so it serializes as
/// `<tag></tag>`.
const VOID_ELEMENTS: [&str; 13] = [
    "area", "base", "br", "col", "hr", "img", "input", "link", "meta", "param", "command",
    "keygen", "source",
];

/// The result of a `get`/`consume`: type-dispatched on match count and
/// node kind.
#[derive(Debug, Clone)]
pub enum Fetched {
    /// Zero matches.
    Null,
    /// One text, CDATA, comment or attribute match.
    Value(String),
    /// One element match: a standalone deep clone.
    Doc(Document),
    /// More than one match.
    Nodes(Vec<NodeHandle>),
}

/// A value accepted by `set`.
#[derive(Debug)]
pub enum SetValue<'a> {
    /// Deletes the matched attribute or node.
    Null,
    /// A scalar; parsed as an XML fragment where node placement applies,
    /// falling back to a plain text node when not well-formed.
    Text(String),
    /// A sub-document; its root children are cloned into place.
    Doc(&'a Document),
    /// Nodes from another document, cloned into place in order.
    Nodes(&'a Document, Vec<NodeHandle>),
}

impl From<&str> for SetValue<'_> {
    fn from(s: &str) -> Self {
        SetValue::Text(s.to_string())
    }
}

impl From<String> for SetValue<'_> {
    fn from(s: String) -> Self {
        SetValue::Text(s)
    }
}

impl<'a> From<&'a Document> for SetValue<'a> {
    fn from(d: &'a Document) -> Self {
        SetValue::Doc(d)
    }
}

impl From<Option<String>> for SetValue<'_> {
    fn from(v: Option<String>) -> Self {
        match v {
            Some(s) => SetValue::Text(s),
            None => SetValue::Null,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Document {
    tree: Option<Tree>,
    prolog: Prolog,
    errs: Vec<String>,
}

impl Document {
    /// Creates a document from raw XML (any string containing `<`), a file
    /// path, or the empty string (an empty placeholder document).
    pub fn new(source: &str) -> Document {
        let mut doc = Document::default();
        if source.is_empty() {
            doc.tree = Some(Tree::new());
            return doc;
        }
        let xml = if source.contains('<') {
            source.to_string()
        } else {
            match std::fs::read_to_string(source) {
                Ok(content) => content,
                Err(e) => {
                    doc.log_err(format!("cannot read template file '{}': {}", source, e));
                    return doc;
                }
            }
        };
        match parse_document(&xml) {
            Ok((tree, prolog)) => {
                doc.tree = Some(tree);
                doc.prolog = prolog;
            }
            Err(e) => doc.log_err(format!("malformed XML: {}", e)),
        }
        doc
    }

    /// Deep clone of another document, with a fresh diagnostics log.
    pub fn from_document(other: &Document) -> Document {
        Document {
            tree: other.tree.clone(),
            prolog: other.prolog.clone(),
            errs: Vec::new(),
        }
    }

    /// A standalone document holding a deep clone of one node. Ancestor
    /// namespace declarations are lifted onto the cloned root so the
    /// result stays valid on its own.
    pub fn from_node(source: &Document, handle: &NodeHandle) -> Document {
        let Some(tree) = &source.tree else {
            return Document::default();
        };
        if matches!(handle, NodeHandle::Node(id) if *id == tree.root()) {
            return Document::from_document(source);
        }
        let mut out = Tree::new();
        match handle {
            NodeHandle::Node(id) => {
                let copy = out.import_subtree(tree, *id);
                out.append_child(out.root(), copy);
                if matches!(out.kind(copy), NodeKind::Element { .. }) {
                    let mut ancestor = tree.parent(*id);
                    while let Some(a) = ancestor {
                        let declared: Vec<(String, String)> = tree
                            .attrs(a)
                            .iter()
                            .filter(|(k, _)| k == "xmlns" || k.starts_with("xmlns:"))
                            .cloned()
                            .collect();
                        for (k, v) in declared {
                            if out.attr(copy, &k).is_none() {
                                out.set_attr(copy, &k, &v);
                            }
                        }
                        ancestor = tree.parent(a);
                    }
                }
            }
            NodeHandle::Attr(id, name) => {
                let value = tree.attr(*id, name).unwrap_or_default().to_string();
                let text = out.new_node(NodeKind::Text(value));
                out.append_child(out.root(), text);
            }
        }
        Document {
            tree: Some(out),
            prolog: Prolog::default(),
            errs: Vec::new(),
        }
    }

    pub fn is_set(&self) -> bool {
        self.tree.is_some()
    }

    /// Accumulated non-fatal diagnostics.
    pub fn errs(&self) -> &[String] {
        &self.errs
    }

    fn log_err(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!("{}", msg);
        self.errs.push(msg);
    }

    /// Evaluates a path expression, optionally scoped to a reference node.
    /// Returns an empty result (plus a diagnostic) on any failure.
    pub fn query(&mut self, path: &str, ref_node: Option<&NodeHandle>) -> Vec<NodeHandle> {
        let Some(tree) = &self.tree else {
            self.errs.push(format!("query '{}' on unset document", path));
            return Vec::new();
        };
        match run_query(tree, path, ref_node) {
            Ok(handles) => handles,
            Err(msg) => {
                self.log_err(msg);
                Vec::new()
            }
        }
    }

    pub fn count(&mut self, path: &str, ref_node: Option<&NodeHandle>) -> usize {
        self.query(path, ref_node).len()
    }

    /// Fetches the value at a path: 0 matches is `Null`, 1 match is
    /// extracted by node kind, more are returned raw.
    pub fn get(&mut self, path: &str, ref_node: Option<&NodeHandle>) -> Fetched {
        let handles = self.query(path, ref_node);
        self.materialize(handles)
    }

    /// Like `get`, but deletes the matched nodes after reading. Used to
    /// detach a loop's template fragment exactly once.
    pub fn consume(&mut self, path: &str, ref_node: Option<&NodeHandle>) -> Fetched {
        let handles = self.query(path, ref_node);
        let fetched = self.materialize(handles.clone());
        self.delete_handles(handles);
        fetched
    }

    fn materialize(&self, handles: Vec<NodeHandle>) -> Fetched {
        let Some(tree) = &self.tree else {
            return Fetched::Null;
        };
        match handles.len() {
            0 => Fetched::Null,
            1 => {
                let handle = &handles[0];
                match handle {
                    NodeHandle::Attr(id, name) => {
                        Fetched::Value(tree.attr(*id, name).unwrap_or_default().to_string())
                    }
                    NodeHandle::Node(id) => match tree.kind(*id) {
                        NodeKind::Text(d) | NodeKind::CData(d) | NodeKind::Comment(d) => {
                            Fetched::Value(d.clone())
                        }
                        NodeKind::Element { .. } | NodeKind::Root => {
                            Fetched::Doc(Document::from_node(self, handle))
                        }
                    },
                }
            }
            _ => Fetched::Nodes(handles),
        }
    }

    fn delete_handles(&mut self, handles: Vec<NodeHandle>) {
        for handle in handles {
            let Some(tree) = &mut self.tree else { return };
            match handle {
                NodeHandle::Attr(id, name) => tree.remove_attr(id, &name),
                NodeHandle::Node(id) => {
                    if id == tree.root() {
                        // Removing the root re-initializes to an empty document.
                        self.tree = Some(Tree::new());
                        self.prolog = Prolog::default();
                        return;
                    }
                    tree.detach(id);
                }
            }
        }
    }

    /// The core mutation primitive: places `value` at every node matched
    /// by `path`, honoring the gap suffix (see `gap`).
    pub fn set(&mut self, path: &str, value: SetValue, ref_node: Option<&NodeHandle>) {
        let (base, gap) = gap::parse(path);
        if self.tree.is_none() {
            self.errs.push(format!("set '{}' on unset document", path));
            return;
        }

        if let SetValue::Null = value {
            if gap == GapMode::None {
                let handles = self.query(base, ref_node);
                self.delete_handles(handles);
            }
            return;
        }

        let (query_path, attr_name) = split_attr_step(base);
        let targets: Vec<NodeHandle> = match ref_node {
            // `.` with an explicit reference needs no query round trip.
            Some(handle) if query_path == "." => vec![handle.clone()],
            _ => self.query(query_path, ref_node),
        };
        if targets.is_empty() {
            self.log_err(format!("set: no matches for '{}'", path));
            return;
        }

        for target in targets {
            self.place(&target, attr_name, &value, gap);
        }
        if let Some(tree) = &mut self.tree {
            tree.normalize();
        }
    }

    fn place(&mut self, target: &NodeHandle, attr_name: Option<&str>, value: &SetValue, gap: GapMode) {
        match target {
            NodeHandle::Attr(id, name) => {
                let text = self.value_text(value);
                self.apply_attr(*id, name, &text, gap);
            }
            NodeHandle::Node(id) => {
                let id = *id;
                let kind_is = |t: &Document, f: fn(&NodeKind) -> bool| {
                    t.tree.as_ref().is_some_and(|tr| f(tr.kind(id)))
                };
                if let Some(name) = attr_name {
                    let text = self.value_text(value);
                    self.apply_attr(id, name, &text, gap);
                } else if kind_is(self, |k| matches!(k, NodeKind::Text(_) | NodeKind::CData(_))) {
                    let text = self.value_text(value);
                    if let Some(tree) = &mut self.tree
                        && let NodeKind::Text(d) | NodeKind::CData(d) = tree.kind_mut(id)
                    {
                        apply_text_gap(d, &text, gap);
                    }
                } else if kind_is(self, |k| matches!(k, NodeKind::Comment(_))) && gap == GapMode::Data
                {
                    // Replace-a-commented-placeholder: the value (flattened
                    // to a fragment string) becomes the comment's data, with
                    // literal comment delimiters stripped.
                    let text = self.value_text(value).replace("<!--", "").replace("-->", "");
                    if let Some(tree) = &mut self.tree
                        && let NodeKind::Comment(d) = tree.kind_mut(id)
                    {
                        *d = text;
                    }
                } else if gap == GapMode::Data {
                    // Raw data write on an element: children become a single
                    // text node, no fragment parsing.
                    let text = self.value_text(value);
                    if let Some(tree) = &mut self.tree {
                        let children: Vec<NodeId> = tree.children(id).collect();
                        for c in children {
                            tree.detach(c);
                        }
                        let t = tree.new_node(NodeKind::Text(text));
                        tree.append_child(id, t);
                    }
                } else {
                    let nodes = self.value_nodes(value);
                    self.place_nodes(id, nodes, gap);
                }
            }
        }
    }

    fn apply_attr(&mut self, id: NodeId, name: &str, text: &str, gap: GapMode) {
        let Some(tree) = &mut self.tree else { return };
        let existing = tree.attr(id, name).unwrap_or_default().to_string();
        let new_value = match gap {
            GapMode::None | GapMode::Data => text.to_string(),
            GapMode::Preceding => format!("{}{}", text, existing),
            GapMode::Following | GapMode::Child => format!("{}{}", existing, text),
        };
        tree.set_attr(id, name, &new_value);
    }

    /// Flattens a value to plain text for attribute/data targets.
    fn value_text(&self, value: &SetValue) -> String {
        match value {
            SetValue::Null => String::new(),
            SetValue::Text(s) => s.clone(),
            SetValue::Doc(d) => d.show(false),
            SetValue::Nodes(doc, handles) => {
                let Some(tree) = &doc.tree else {
                    return String::new();
                };
                let mut out = String::new();
                for h in handles {
                    match h {
                        NodeHandle::Node(id) => out.push_str(&serialize::serialize_node(tree, *id)),
                        NodeHandle::Attr(id, name) => {
                            out.push_str(tree.attr(*id, name).unwrap_or_default())
                        }
                    }
                }
                out
            }
        }
    }

    /// Imports a value into this document's arena as a list of detached
    /// nodes ready for placement. A scalar is tried as an XML fragment
    /// first and becomes a plain text node when not well-formed.
    fn value_nodes(&mut self, value: &SetValue) -> Vec<NodeId> {
        match value {
            SetValue::Null => Vec::new(),
            SetValue::Text(s) => match parse_fragment(s) {
                Ok(frag) => self.import_root_children(&frag),
                Err(e) => {
                    debug!("value is not well-formed XML, inserting as text: {}", e);
                    match &mut self.tree {
                        Some(tree) => vec![tree.new_node(NodeKind::Text(s.clone()))],
                        None => Vec::new(),
                    }
                }
            },
            SetValue::Doc(d) => match &d.tree {
                Some(src) => {
                    let children: Vec<NodeId> = src.children(src.root()).collect();
                    self.import_from(src, &children)
                }
                None => Vec::new(),
            },
            SetValue::Nodes(doc, handles) => {
                let Some(src) = &doc.tree else {
                    return Vec::new();
                };
                let mut imported = Vec::new();
                for h in handles {
                    match h {
                        NodeHandle::Node(id) => {
                            if let Some(tree) = &mut self.tree {
                                imported.push(tree.import_subtree(src, *id));
                            }
                        }
                        NodeHandle::Attr(id, name) => {
                            let value = src.attr(*id, name).unwrap_or_default().to_string();
                            if let Some(tree) = &mut self.tree {
                                imported.push(tree.new_node(NodeKind::Text(value)));
                            }
                        }
                    }
                }
                imported
            }
        }
    }

    fn import_root_children(&mut self, frag: &Tree) -> Vec<NodeId> {
        let children: Vec<NodeId> = frag.children(frag.root()).collect();
        self.import_from(frag, &children)
    }

    fn import_from(&mut self, src: &Tree, nodes: &[NodeId]) -> Vec<NodeId> {
        let Some(tree) = &mut self.tree else {
            return Vec::new();
        };
        nodes
            .iter()
            .map(|&n| tree.import_subtree(src, n))
            .collect()
    }

    fn place_nodes(&mut self, target: NodeId, nodes: Vec<NodeId>, gap: GapMode) {
        let Some(tree) = &mut self.tree else { return };
        match gap {
            GapMode::None | GapMode::Data => {
                if tree.parent(target).is_none() {
                    // Replacing the root replaces the whole document content.
                    let old: Vec<NodeId> = tree.children(target).collect();
                    for c in old {
                        tree.detach(c);
                    }
                    for n in nodes {
                        tree.append_child(target, n);
                    }
                } else {
                    for n in nodes {
                        tree.insert_before(target, n);
                    }
                    tree.detach(target);
                }
            }
            GapMode::Preceding => {
                for n in nodes {
                    tree.insert_before(target, n);
                }
            }
            GapMode::Following => {
                let mut anchor = target;
                for n in nodes {
                    tree.insert_after(anchor, n);
                    anchor = n;
                }
            }
            GapMode::Child => {
                for n in nodes {
                    tree.append_child(target, n);
                }
            }
        }
    }

    /// Serializes the document. `whole` re-emits the XML declaration and
    /// DOCTYPE; fragment mode strips both plus the default XHTML namespace.
    pub fn show(&self, whole: bool) -> String {
        match &self.tree {
            Some(tree) => serialize::serialize(tree, &self.prolog, whole),
            None => String::new(),
        }
    }

    /// Concatenated text content, after the void-element tidy pass.
    pub fn text(&mut self) -> String {
        self.tidy();
        match &self.tree {
            Some(tree) => tree.text_content(tree.root()),
            None => String::new(),
        }
    }

    /// Gives every childless non-void element an empty text child so it
    /// serializes as `<tag></tag>` instead of self-closing. Idempotent.
    pub fn tidy(&mut self) {
        let Some(tree) = &mut self.tree else { return };
        let mut empties = Vec::new();
        collect_empty_elements(tree, tree.root(), &mut empties);
        for id in empties {
            let t = tree.new_node(NodeKind::Text(String::new()));
            tree.append_child(id, t);
        }
    }

    /// Declares a namespace prefix on the root element, for queries over
    /// prefixed names.
    pub fn add_namespace(&mut self, prefix: &str, uri: &str) {
        let Some(tree) = &mut self.tree else {
            self.errs
                .push(format!("add_namespace '{}' on unset document", prefix));
            return;
        };
        if let Some(root) = tree.root_element() {
            let key = format!("xmlns:{}", prefix);
            if tree.attr(root, &key).is_none() {
                tree.set_attr(root, &key, uri);
            }
        }
    }

    /// Whether a previously obtained handle is still linked to the tree.
    /// The dispatcher checks this before running handlers on a node
    /// scanned earlier in the pass.
    pub fn is_attached(&self, handle: &NodeHandle) -> bool {
        match (&self.tree, handle) {
            (Some(tree), NodeHandle::Node(id)) => tree.is_attached(*id),
            (Some(tree), NodeHandle::Attr(id, name)) => {
                tree.is_attached(*id) && tree.attr(*id, name).is_some()
            }
            (None, _) => false,
        }
    }

    pub fn node_name(&self, handle: &NodeHandle) -> Option<String> {
        let tree = self.tree.as_ref()?;
        match handle {
            NodeHandle::Node(id) => tree.element_name(*id).map(str::to_string),
            NodeHandle::Attr(_, name) => Some(name.clone()),
        }
    }

    /// The attributes of an element node, in declaration order.
    pub fn attrs_of(&self, handle: &NodeHandle) -> Vec<(String, String)> {
        match (&self.tree, handle) {
            (Some(tree), NodeHandle::Node(id)) => tree.attrs(*id).to_vec(),
            _ => Vec::new(),
        }
    }

    pub fn remove_attribute(&mut self, handle: &NodeHandle, name: &str) {
        if let (Some(tree), NodeHandle::Node(id)) = (&mut self.tree, handle) {
            tree.remove_attr(*id, name);
        }
    }

    pub fn root_element_handle(&self) -> Option<NodeHandle> {
        self.tree
            .as_ref()
            .and_then(|t| t.root_element())
            .map(NodeHandle::Node)
    }
}

fn apply_text_gap(data: &mut String, text: &str, gap: GapMode) {
    match gap {
        GapMode::None | GapMode::Data => *data = text.to_string(),
        GapMode::Preceding => data.insert_str(0, text),
        GapMode::Following | GapMode::Child => data.push_str(text),
    }
}

fn collect_empty_elements(tree: &Tree, id: NodeId, out: &mut Vec<NodeId>) {
    for child in tree.children(id) {
        if let NodeKind::Element { name, .. } = tree.kind(child) {
            if tree.first_child(child).is_none() {
                let local = name.rsplit(':').next().unwrap_or(name);
                if !VOID_ELEMENTS.contains(&local.to_ascii_lowercase().as_str()) {
                    out.push(child);
                }
            } else {
                collect_empty_elements(tree, child, out);
            }
        }
    }
}

fn run_query(tree: &Tree, path: &str, ref_node: Option<&NodeHandle>) -> Result<Vec<NodeHandle>, String> {
    let expr =
        parse_expression(path).map_err(|e| format!("invalid path '{}': {}", path, e))?;
    let root = Cursor::node(tree, tree.root());
    let context = match ref_node {
        Some(NodeHandle::Node(id)) => Cursor::node(tree, *id),
        Some(NodeHandle::Attr(id, name)) => {
            let idx = tree
                .attrs(*id)
                .iter()
                .position(|(n, _)| n == name)
                .ok_or_else(|| format!("reference attribute '{}' no longer exists", name))?;
            Cursor {
                tree,
                target: Target::Attr(*id, idx as u32),
            }
        }
        None => root,
    };
    let e_ctx = EvaluationContext::new(context, root, 1, 1);
    match evaluate(&expr, &e_ctx).map_err(|e| format!("query '{}' failed: {}", path, e))? {
        PathValue::NodeSet(nodes) => Ok(nodes.into_iter().map(Cursor::to_handle).collect()),
        _ => Err(format!("query '{}' did not yield nodes", path)),
    }
}

/// Splits a trailing `/@name` step off a set-path so the attribute can be
/// created on the owning element when it does not exist yet. Wildcard or
/// predicated attribute steps are left for the query engine.
fn split_attr_step(base: &str) -> (&str, Option<&str>) {
    if let Some(pos) = base.rfind("/@") {
        let name = &base[pos + 2..];
        let valid = !name.is_empty()
            && name
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | ':'));
        if valid {
            let head = &base[..pos];
            let head = if head.is_empty() { "/" } else { head };
            return (head, Some(name));
        }
    }
    (base, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(xml: &str) -> Document {
        let d = Document::new(xml);
        assert!(d.is_set(), "fixture should parse: {:?}", d.errs());
        d
    }

    #[test]
    fn test_attribute_gap_round_trip() {
        let mut d = doc(r#"<div id="foo"/>"#);
        let node = d.root_element_handle().unwrap();

        d.set("./@id/child-gap()", "bar".into(), Some(&node));
        assert_eq!(d.show(false), r#"<div id="foobar"/>"#);

        d.set("./@id", "foo".into(), Some(&node));
        d.set("./@id/preceding-gap()", "bar".into(), Some(&node));
        assert_eq!(d.show(false), r#"<div id="barfoo"/>"#);

        d.set("./@id", SetValue::Null, Some(&node));
        assert_eq!(d.show(false), "<div/>");

        d.set("./@id", "".into(), Some(&node));
        assert_eq!(d.show(false), r#"<div id=""/>"#);
    }

    #[test]
    fn test_attribute_created_when_missing() {
        let mut d = doc("<div/>");
        let node = d.root_element_handle().unwrap();
        d.set("./@class", "wide".into(), Some(&node));
        assert_eq!(d.show(false), r#"<div class="wide"/>"#);
    }

    #[test]
    fn test_escaping_never_doubles() {
        let mut d = doc("<div/>");
        let node = d.root_element_handle().unwrap();
        d.set("./@id", "foo&bar".into(), Some(&node));
        assert_eq!(d.show(false), r#"<div id="foo&amp;bar"/>"#);

        d.set("./@id", "foo&amp;bar".into(), Some(&node));
        assert_eq!(d.show(false), r#"<div id="foo&amp;bar"/>"#);
    }

    #[test]
    fn test_null_removes_node_and_descendants() {
        let mut d = doc("<root><a><b>deep</b></a><c/></root>");
        d.set("//a", SetValue::Null, None);
        assert_eq!(d.show(false), "<root><c/></root>");
    }

    #[test]
    fn test_removing_root_element_reinitializes_content() {
        let mut d = doc("<root><a/></root>");
        d.set("/root", SetValue::Null, None);
        assert_eq!(d.show(false), "");
        assert!(d.is_set());
    }

    #[test]
    fn test_replace_node_with_fragment() {
        let mut d = doc("<root><slot/></root>");
        d.set("//slot", "<p>one</p><p>two</p>".into(), None);
        assert_eq!(d.show(false), "<root><p>one</p><p>two</p></root>");
    }

    #[test]
    fn test_malformed_fragment_falls_back_to_text() {
        let mut d = doc("<root><slot/></root>");
        d.set("//slot", "3 < 5 & up".into(), None);
        assert_eq!(d.show(false), "<root>3 &lt; 5 &amp; up</root>");
    }

    #[test]
    fn test_child_and_sibling_gaps_on_elements() {
        let mut d = doc("<root><mid/></root>");
        d.set("//mid/preceding-gap()", "<a/>".into(), None);
        d.set("//mid/following-gap()", "<z/><z2/>".into(), None);
        d.set("//mid/child-gap()", "<k/>".into(), None);
        assert_eq!(d.show(false), "<root><a/><mid><k/></mid><z/><z2/></root>");
    }

    #[test]
    fn test_data_gap_bypasses_fragment_parsing() {
        let mut d = doc("<root><p>old</p></root>");
        d.set("//p/data()", "<b>not parsed</b>".into(), None);
        assert_eq!(
            d.show(false),
            "<root><p>&lt;b&gt;not parsed&lt;/b&gt;</p></root>"
        );
    }

    #[test]
    fn test_comment_data_splice_strips_delimiters() {
        let mut d = doc("<root><!--placeholder--></root>");
        d.set("//comment()/data()", "<!--<b>x</b>-->".into(), None);
        assert_eq!(d.show(false), "<root><!--<b>x</b>--></root>");
    }

    #[test]
    fn test_get_element_yields_standalone_doc_with_lifted_namespaces() {
        let mut d = doc(r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:x="urn:x"><body><p>hi</p></body></html>"#);
        let Fetched::Doc(sub) = d.get("//body", None) else {
            panic!("expected a sub-document");
        };
        let shown = sub.show(true);
        assert!(shown.contains(r#"xmlns="http://www.w3.org/1999/xhtml""#));
        assert!(shown.contains(r#"xmlns:x="urn:x""#));
        assert!(shown.contains("<p>hi</p>"));
        // Original is untouched.
        assert!(d.show(false).contains("<body><p>hi</p></body>"));
    }

    #[test]
    fn test_consume_detaches_after_reading() {
        let mut d = doc("<ul><li>tpl</li></ul>");
        let root = d.root_element_handle().unwrap();
        let fetched = d.consume("./*[1]", Some(&root));
        assert!(matches!(fetched, Fetched::Doc(_)));
        assert_eq!(d.show(false), "<ul/>");
    }

    #[test]
    fn test_set_doc_value_splices_clone() {
        let mut outer = doc("<root><slot/></root>");
        let inner = doc("<p>spliced</p>");
        outer.set("//slot", SetValue::Doc(&inner), None);
        assert_eq!(outer.show(false), "<root><p>spliced</p></root>");
        assert_eq!(inner.show(false), "<p>spliced</p>");
    }

    #[test]
    fn test_unset_document_is_a_recorded_noop() {
        let mut d = Document::new("not-a-file-that-exists.xml");
        assert!(!d.is_set());
        d.set("//x", "v".into(), None);
        assert!(d.query("//x", None).is_empty());
        assert!(d.errs().len() >= 2);
        assert_eq!(d.show(false), "");
    }

    #[test]
    fn test_tidy_is_idempotent_and_skips_voids() {
        let mut d = doc("<root><div/><br/></root>");
        d.tidy();
        assert_eq!(d.show(false), "<root><div></div><br/></root>");
        let once = d.show(false);
        d.tidy();
        assert_eq!(d.show(false), once);
    }

    #[test]
    fn test_add_namespace_declares_prefix_once() {
        let mut d = doc("<root/>");
        d.add_namespace("h", "urn:h");
        d.add_namespace("h", "urn:other");
        assert_eq!(d.show(false), r#"<root xmlns:h="urn:h"/>"#);
    }
}
