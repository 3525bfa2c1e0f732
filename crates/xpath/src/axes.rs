//! Pure functions for collecting nodes along each supported axis.
//!
//! Results are kept in document order: the node scanner relies on visiting
//! directive-bearing elements top to bottom.

use crate::source::SourceNode;
use std::collections::HashSet;

fn add_node<'a, N: SourceNode<'a>>(node: N, seen: &mut HashSet<N>, results: &mut Vec<N>) {
    if seen.insert(node) {
        results.push(node);
    }
}

pub fn collect_self_nodes<'a, N: SourceNode<'a>>(
    node: N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    add_node(node, seen, results);
}

pub fn collect_child_nodes<'a, N: SourceNode<'a>>(
    node: N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    for child in node.children() {
        add_node(child, seen, results);
    }
}

pub fn collect_attribute_nodes<'a, N: SourceNode<'a>>(
    node: N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    for attr in node.attributes() {
        add_node(attr, seen, results);
    }
}

pub fn collect_descendant_nodes<'a, N: SourceNode<'a>>(
    node: N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    for child in node.children() {
        add_node(child, seen, results);
        collect_descendant_nodes(child, seen, results);
    }
}

pub fn collect_descendant_or_self_nodes<'a, N: SourceNode<'a>>(
    node: N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    add_node(node, seen, results);
    collect_descendant_nodes(node, seen, results);
}

pub fn collect_parent_nodes<'a, N: SourceNode<'a>>(
    node: N,
    seen: &mut HashSet<N>,
    results: &mut Vec<N>,
) {
    if let Some(parent) = node.parent() {
        add_node(parent, seen, results);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::tests::{MockNode, create_test_tree};

    #[test]
    fn test_collect_child() {
        let tree = create_test_tree();
        let root = MockNode { id: 1, tree: &tree };
        let section1 = MockNode { id: 2, tree: &tree };
        let div = MockNode { id: 5, tree: &tree };
        let section2 = MockNode { id: 6, tree: &tree };
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        collect_child_nodes(root, &mut seen, &mut results);
        assert_eq!(results, vec![section1, div, section2]);
    }

    #[test]
    fn test_collect_descendants_in_document_order() {
        let tree = create_test_tree();
        let root = MockNode { id: 1, tree: &tree };
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        collect_descendant_nodes(root, &mut seen, &mut results);
        let ids: Vec<usize> = results.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![2, 4, 5, 6, 7]);
    }

    #[test]
    fn test_collect_attributes() {
        let tree = create_test_tree();
        let section1 = MockNode { id: 2, tree: &tree };
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        collect_attribute_nodes(section1, &mut seen, &mut results);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name(), Some("data-v.tr"));
    }
}
