//! The contract for a navigable node tree the path engine can walk.
use std::hash::Hash;

/// The type of a node, aligned with the XPath 1.0 data model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Root,
    Element,
    Attribute,
    Text,
    CData,
    Comment,
}

/// The universal contract for a node in a hierarchical document.
///
/// The path engine is written exclusively against this trait, so it can
/// address any tree that implements it. Evaluation borrows the tree
/// immutably; mutation happens between evaluations, never during one.
///
/// `'a` is the lifetime of the underlying tree borrow.
pub trait SourceNode<'a>:
    std::fmt::Debug + Clone + Copy + PartialEq + Eq + Hash + PartialOrd + Ord
{
    /// The type of the node (Element, Text, Attribute, etc.).
    fn node_type(&self) -> NodeType;

    /// The qualified name of the node (e.g. `div`, `data-v.include`).
    /// Returns `None` for node types without names, such as text nodes.
    fn name(&self) -> Option<&'a str>;

    /// The string value of the node, as defined by the XPath 1.0 `string()`
    /// function: text content for text nodes, concatenated descendant text
    /// for elements, the value for attributes.
    fn string_value(&self) -> String;

    /// An iterator over the attribute nodes of this node.
    /// Empty for non-element nodes.
    fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// An iterator over the child nodes of this node, in document order.
    /// Empty for leaf nodes (like text or attributes).
    fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a>;

    /// A reference to the parent node. Returns `None` for the root.
    /// For an attribute this is its owning element.
    fn parent(&self) -> Option<Self>;
}

// Test utilities - publicly available for integration testing in downstream crates
pub mod tests {
    use super::*;
    use std::cmp::Ordering;
    use std::collections::HashMap;
    use std::hash::Hasher;

    #[derive(Debug, Clone)]
    struct MockNodeData {
        node_type: NodeType,
        name: Option<&'static str>,
        value: String,
        children: Vec<usize>,
        attributes: Vec<usize>,
    }

    #[derive(Debug)]
    pub struct MockTree {
        nodes: HashMap<usize, MockNodeData>,
        parent_map: HashMap<usize, usize>,
    }

    /// A simple in-memory node that holds a reference to its tree so it can
    /// navigate itself.
    #[derive(Debug, Clone, Copy)]
    pub struct MockNode<'a> {
        pub id: usize,
        pub tree: &'a MockTree,
    }

    impl<'a> PartialEq for MockNode<'a> {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl<'a> Eq for MockNode<'a> {}

    impl<'a> PartialOrd for MockNode<'a> {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }
    impl<'a> Ord for MockNode<'a> {
        fn cmp(&self, other: &Self) -> Ordering {
            self.id.cmp(&other.id)
        }
    }

    impl<'a> Hash for MockNode<'a> {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.id.hash(state);
        }
    }

    impl<'a> SourceNode<'a> for MockNode<'a> {
        fn node_type(&self) -> NodeType {
            self.tree.nodes[&self.id].node_type
        }

        fn name(&self) -> Option<&'a str> {
            self.tree.nodes[&self.id].name
        }

        fn string_value(&self) -> String {
            self.tree.nodes[&self.id].value.clone()
        }

        fn attributes(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            let ids = tree.nodes[&self.id].attributes.clone();
            Box::new(ids.into_iter().map(move |id| MockNode { id, tree }))
        }

        fn children(&self) -> Box<dyn Iterator<Item = Self> + 'a> {
            let tree = self.tree;
            let ids = tree.nodes[&self.id].children.clone();
            Box::new(ids.into_iter().map(move |id| MockNode { id, tree }))
        }

        fn parent(&self) -> Option<Self> {
            self.tree.parent_map.get(&self.id).map(|&pid| MockNode {
                id: pid,
                tree: self.tree,
            })
        }
    }

    /// Creates a simple mock tree for testing:
    /// <root> <!-- id 0, element id 1 -->
    ///   <section data-v.tr="title">Hello</section> <!-- id 2, attr 3, text 4 -->
    ///   <div></div> <!-- id 5 -->
    ///   <section>World</section> <!-- id 6, text 7 -->
    /// </root>
    pub fn create_test_tree() -> MockTree {
        let mut nodes = HashMap::new();
        let mut parent_map = HashMap::new();

        nodes.insert(
            0,
            MockNodeData {
                node_type: NodeType::Root,
                name: None,
                value: "HelloWorld".to_string(),
                children: vec![1],
                attributes: vec![],
            },
        );
        nodes.insert(
            1,
            MockNodeData {
                node_type: NodeType::Element,
                name: Some("root"),
                value: "HelloWorld".to_string(),
                children: vec![2, 5, 6],
                attributes: vec![],
            },
        );
        parent_map.insert(1, 0);

        nodes.insert(
            2,
            MockNodeData {
                node_type: NodeType::Element,
                name: Some("section"),
                value: "Hello".to_string(),
                children: vec![4],
                attributes: vec![3],
            },
        );
        parent_map.insert(2, 1);

        nodes.insert(
            3,
            MockNodeData {
                node_type: NodeType::Attribute,
                name: Some("data-v.tr"),
                value: "title".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(3, 2);

        nodes.insert(
            4,
            MockNodeData {
                node_type: NodeType::Text,
                name: None,
                value: "Hello".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(4, 2);

        nodes.insert(
            5,
            MockNodeData {
                node_type: NodeType::Element,
                name: Some("div"),
                value: "".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(5, 1);

        nodes.insert(
            6,
            MockNodeData {
                node_type: NodeType::Element,
                name: Some("section"),
                value: "World".to_string(),
                children: vec![7],
                attributes: vec![],
            },
        );
        parent_map.insert(6, 1);

        nodes.insert(
            7,
            MockNodeData {
                node_type: NodeType::Text,
                name: None,
                value: "World".to_string(),
                children: vec![],
                attributes: vec![],
            },
        );
        parent_map.insert(7, 6);

        MockTree { nodes, parent_map }
    }
}
