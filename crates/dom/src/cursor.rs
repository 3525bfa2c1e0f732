//! Read-only navigation over a `Tree` for the path engine.
//!
//! A `Cursor` is the crate's implementation of `weft_xpath::SourceNode`:
//! a cheap copyable view used only while an expression is being evaluated.
//! Query results are materialized into owned `NodeHandle`s before any
//! mutation happens, so attribute targets survive reordering by name.

use crate::tree::{NodeId, NodeKind, Tree};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use weft_xpath::{NodeType, SourceNode};

/// An owned, mutation-safe reference to a query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeHandle {
    Node(NodeId),
    /// An attribute, addressed by owning element and attribute name.
    Attr(NodeId, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Target {
    Node(NodeId),
    /// Attribute by positional index within its element. Only valid for
    /// the duration of one evaluation; materialized to a name afterwards.
    Attr(NodeId, u32),
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Cursor<'t> {
    pub(crate) tree: &'t Tree,
    pub(crate) target: Target,
}

impl<'t> Cursor<'t> {
    pub(crate) fn node(tree: &'t Tree, id: NodeId) -> Self {
        Cursor {
            tree,
            target: Target::Node(id),
        }
    }

    /// Converts an evaluation cursor into an owned handle.
    pub(crate) fn to_handle(self) -> NodeHandle {
        match self.target {
            Target::Node(id) => NodeHandle::Node(id),
            Target::Attr(id, idx) => {
                let name = self.tree.attrs(id)[idx as usize].0.clone();
                NodeHandle::Attr(id, name)
            }
        }
    }
}

impl<'t> PartialEq for Cursor<'t> {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}
impl<'t> Eq for Cursor<'t> {}

impl<'t> PartialOrd for Cursor<'t> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<'t> Ord for Cursor<'t> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.target.cmp(&other.target)
    }
}

impl<'t> Hash for Cursor<'t> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.target.hash(state);
    }
}

impl<'t> SourceNode<'t> for Cursor<'t> {
    fn node_type(&self) -> NodeType {
        match self.target {
            Target::Attr(..) => NodeType::Attribute,
            Target::Node(id) => match self.tree.kind(id) {
                NodeKind::Root => NodeType::Root,
                NodeKind::Element { .. } => NodeType::Element,
                NodeKind::Text(_) => NodeType::Text,
                NodeKind::CData(_) => NodeType::CData,
                NodeKind::Comment(_) => NodeType::Comment,
            },
        }
    }

    fn name(&self) -> Option<&'t str> {
        match self.target {
            Target::Attr(id, idx) => Some(self.tree.attrs(id)[idx as usize].0.as_str()),
            Target::Node(id) => self.tree.element_name(id),
        }
    }

    fn string_value(&self) -> String {
        match self.target {
            Target::Attr(id, idx) => self.tree.attrs(id)[idx as usize].1.clone(),
            Target::Node(id) => match self.tree.kind(id) {
                NodeKind::Text(data) | NodeKind::CData(data) | NodeKind::Comment(data) => {
                    data.clone()
                }
                NodeKind::Root | NodeKind::Element { .. } => self.tree.text_content(id),
            },
        }
    }

    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 't> {
        let tree = self.tree;
        match self.target {
            Target::Node(id) => {
                let count = tree.attrs(id).len() as u32;
                Box::new((0..count).map(move |idx| Cursor {
                    tree,
                    target: Target::Attr(id, idx),
                }))
            }
            Target::Attr(..) => Box::new(std::iter::empty()),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = Self> + 't> {
        let tree = self.tree;
        match self.target {
            Target::Node(id) => Box::new(
                std::iter::successors(tree.node(id).first_child, move |&c| {
                    tree.node(c).next_sibling
                })
                .map(move |c| Cursor::node(tree, c)),
            ),
            Target::Attr(..) => Box::new(std::iter::empty()),
        }
    }

    fn parent(&self) -> Option<Self> {
        match self.target {
            Target::Attr(id, _) => Some(Cursor::node(self.tree, id)),
            Target::Node(id) => self.tree.parent(id).map(|p| Cursor::node(self.tree, p)),
        }
    }
}
