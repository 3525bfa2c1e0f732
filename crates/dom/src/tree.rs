//! A mutable arena-backed node tree.
//!
//! Nodes are stored in a flat `Vec` and addressed by `NodeId` handles;
//! structure lives in parent/child/sibling links. Detaching a node only
//! unlinks it, the arena slot stays valid, so previously handed-out ids
//! never dangle. `is_attached` reports whether an id is still reachable
//! from the root, which is what the directive dispatcher checks before
//! touching a node scanned earlier in the pass.

/// A stable handle into the arena. Id 0 is always the document root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

pub(crate) const ROOT: NodeId = NodeId(0);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// The document node itself; never has a name or attributes.
    Root,
    Element {
        name: String,
        /// Attribute values are stored decoded; entity escaping happens
        /// once, at serialization.
        attrs: Vec<(String, String)>,
    },
    Text(String),
    CData(String),
    Comment(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) first_child: Option<NodeId>,
    pub(crate) last_child: Option<NodeId>,
    pub(crate) prev_sibling: Option<NodeId>,
    pub(crate) next_sibling: Option<NodeId>,
    pub(crate) kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Creates a tree holding only the root node.
    pub fn new() -> Self {
        Tree {
            nodes: vec![Node {
                parent: None,
                first_child: None,
                last_child: None,
                prev_sibling: None,
                next_sibling: None,
                kind: NodeKind::Root,
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn new_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            kind,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    /// Children of `id` in document order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.node(id).first_child, move |&c| {
            self.node(c).next_sibling
        })
    }

    /// The first element child of the root node, if any.
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(ROOT)
            .find(|&c| matches!(self.kind(c), NodeKind::Element { .. }))
    }

    /// Whether `id` is still reachable from the root by parent links.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == ROOT {
                return true;
            }
            match self.node(current).parent {
                Some(p) => current = p,
                None => return false,
            }
        }
    }

    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn attrs(&self, id: NodeId) -> &[(String, String)] {
        match self.kind(id) {
            NodeKind::Element { attrs, .. } => attrs,
            _ => &[],
        }
    }

    /// Sets (or creates) an attribute, preserving declaration order.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attrs, .. } = self.kind_mut(id) {
            if let Some(slot) = attrs.iter_mut().find(|(n, _)| n == name) {
                slot.1 = value.to_string();
            } else {
                attrs.push((name.to_string(), value.to_string()));
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeKind::Element { attrs, .. } = self.kind_mut(id) {
            attrs.retain(|(n, _)| n != name);
        }
    }

    /// Unlinks `id` from its parent and siblings. The arena slot survives,
    /// so stale handles stay valid but report as detached.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let n = self.node(id);
            (n.parent, n.prev_sibling, n.next_sibling)
        };
        if let Some(p) = prev {
            self.node_mut(p).next_sibling = next;
        } else if let Some(par) = parent {
            self.node_mut(par).first_child = next;
        }
        if let Some(nx) = next {
            self.node_mut(nx).prev_sibling = prev;
        } else if let Some(par) = parent {
            self.node_mut(par).last_child = prev;
        }
        let n = self.node_mut(id);
        n.parent = None;
        n.prev_sibling = None;
        n.next_sibling = None;
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let old_last = self.node(parent).last_child;
        if let Some(last) = old_last {
            self.node_mut(last).next_sibling = Some(child);
        } else {
            self.node_mut(parent).first_child = Some(child);
        }
        let c = self.node_mut(child);
        c.parent = Some(parent);
        c.prev_sibling = old_last;
        c.next_sibling = None;
        self.node_mut(parent).last_child = Some(child);
    }

    pub fn insert_before(&mut self, anchor: NodeId, new: NodeId) {
        self.detach(new);
        let (parent, prev) = {
            let a = self.node(anchor);
            (a.parent, a.prev_sibling)
        };
        let Some(parent) = parent else {
            return;
        };
        if let Some(p) = prev {
            self.node_mut(p).next_sibling = Some(new);
        } else {
            self.node_mut(parent).first_child = Some(new);
        }
        self.node_mut(anchor).prev_sibling = Some(new);
        let n = self.node_mut(new);
        n.parent = Some(parent);
        n.prev_sibling = prev;
        n.next_sibling = Some(anchor);
    }

    pub fn insert_after(&mut self, anchor: NodeId, new: NodeId) {
        self.detach(new);
        let (parent, next) = {
            let a = self.node(anchor);
            (a.parent, a.next_sibling)
        };
        let Some(parent) = parent else {
            return;
        };
        if let Some(nx) = next {
            self.node_mut(nx).prev_sibling = Some(new);
        } else {
            self.node_mut(parent).last_child = Some(new);
        }
        self.node_mut(anchor).next_sibling = Some(new);
        let n = self.node_mut(new);
        n.parent = Some(parent);
        n.prev_sibling = Some(anchor);
        n.next_sibling = next;
    }

    /// Deep-copies the subtree rooted at `src` (from `source`) into this
    /// arena, returning the id of the copy. The copy starts detached.
    pub fn import_subtree(&mut self, source: &Tree, src: NodeId) -> NodeId {
        let copy = self.new_node(source.kind(src).clone());
        let children: Vec<NodeId> = source.children(src).collect();
        for child in children {
            let child_copy = self.import_subtree(source, child);
            self.append_child(copy, child_copy);
        }
        copy
    }

    /// Concatenated text content of the subtree, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            NodeKind::Text(data) | NodeKind::CData(data) => out.push_str(data),
            NodeKind::Comment(_) => {}
            NodeKind::Root | NodeKind::Element { .. } => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Merges adjacent text-node siblings and drops empty text nodes,
    /// keeping path queries stable after textual insertions.
    pub fn normalize(&mut self) {
        self.normalize_children(ROOT);
    }

    fn normalize_children(&mut self, id: NodeId) {
        let mut current = self.node(id).first_child;
        while let Some(c) = current {
            let next = self.node(c).next_sibling;
            if let NodeKind::Text(data) = self.kind(c) {
                if data.is_empty() {
                    self.detach(c);
                    current = next;
                    continue;
                }
                if let Some(n) = next
                    && let NodeKind::Text(next_data) = self.kind(n)
                {
                    let merged = next_data.clone();
                    if let NodeKind::Text(data) = self.kind_mut(c) {
                        data.push_str(&merged);
                    }
                    self.detach(n);
                    // Re-check the same node against its new neighbour.
                    continue;
                }
            }
            self.normalize_children(c);
            current = next;
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut Tree, name: &str) -> NodeId {
        tree.new_node(NodeKind::Element {
            name: name.to_string(),
            attrs: Vec::new(),
        })
    }

    #[test]
    fn test_append_and_sibling_links() {
        let mut tree = Tree::new();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.append_child(ROOT, a);
        tree.append_child(ROOT, b);

        let children: Vec<NodeId> = tree.children(ROOT).collect();
        assert_eq!(children, vec![a, b]);
        assert_eq!(tree.node(b).prev_sibling, Some(a));
        assert_eq!(tree.node(a).next_sibling, Some(b));
    }

    #[test]
    fn test_detach_reports_unattached() {
        let mut tree = Tree::new();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.append_child(ROOT, a);
        tree.append_child(a, b);
        assert!(tree.is_attached(b));

        tree.detach(a);
        assert!(!tree.is_attached(a));
        assert!(!tree.is_attached(b));
        assert_eq!(tree.children(ROOT).count(), 0);
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut tree = Tree::new();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let c = element(&mut tree, "c");
        tree.append_child(ROOT, b);
        tree.insert_before(b, a);
        tree.insert_after(b, c);

        let names: Vec<&str> = tree
            .children(ROOT)
            .filter_map(|id| tree.element_name(id))
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_import_subtree_is_deep_and_detached() {
        let mut source = Tree::new();
        let a = element(&mut source, "a");
        let t = source.new_node(NodeKind::Text("hi".to_string()));
        source.append_child(ROOT, a);
        source.append_child(a, t);

        let mut dest = Tree::new();
        let copy = dest.import_subtree(&source, a);
        assert!(dest.node(copy).parent.is_none());
        assert_eq!(dest.text_content(copy), "hi");
    }

    #[test]
    fn test_normalize_merges_adjacent_text() {
        let mut tree = Tree::new();
        let a = element(&mut tree, "a");
        tree.append_child(ROOT, a);
        let t1 = tree.new_node(NodeKind::Text("foo".to_string()));
        let t2 = tree.new_node(NodeKind::Text("bar".to_string()));
        let empty = tree.new_node(NodeKind::Text(String::new()));
        tree.append_child(a, t1);
        tree.append_child(a, t2);
        tree.append_child(a, empty);

        tree.normalize();
        assert_eq!(tree.children(a).count(), 1);
        assert_eq!(tree.text_content(a), "foobar");
    }
}
