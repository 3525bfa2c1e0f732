//! The evaluation engine for executing a parsed path AST against a generic
//! `SourceNode` tree.

use super::ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, NodeTypeTest, Step};
use super::axes;
use crate::error::PathError;
use crate::functions;
use crate::source::{NodeType, SourceNode};
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;

/// The possible result types of a path expression evaluation.
#[derive(Debug, Clone)]
pub enum PathValue<N> {
    NodeSet(Vec<N>),
    String(String),
    Number(f64),
    Boolean(bool),
}

impl<'a, N: SourceNode<'a>> PathValue<N> {
    /// Coerces the value to a boolean as per XPath 1.0 rules.
    pub fn to_bool(&self) -> bool {
        match self {
            PathValue::NodeSet(nodes) => !nodes.is_empty(),
            PathValue::String(s) => !s.is_empty(),
            PathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            PathValue::Boolean(b) => *b,
        }
    }
}

impl<'a, N: SourceNode<'a>> fmt::Display for PathValue<N> {
    /// Coerces the value to a string as per XPath 1.0 rules.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathValue::NodeSet(nodes) => write!(
                f,
                "{}",
                nodes.first().map(|n| n.string_value()).unwrap_or_default()
            ),
            PathValue::String(s) => write!(f, "{}", s),
            PathValue::Number(n) => write!(f, "{}", n),
            PathValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// State needed during expression evaluation.
/// `'a` is the lifetime of the underlying tree borrow.
pub struct EvaluationContext<'a, N: SourceNode<'a>> {
    pub context_node: N,
    pub root_node: N,
    pub context_position: usize, // 1-based index
    pub context_size: usize,
    _marker: PhantomData<&'a ()>,
}

impl<'a, N: SourceNode<'a>> EvaluationContext<'a, N> {
    pub fn new(context_node: N, root_node: N, context_position: usize, context_size: usize) -> Self {
        Self {
            context_node,
            root_node,
            context_position,
            context_size,
            _marker: PhantomData,
        }
    }
}

/// Evaluates a compiled expression and returns a concrete `PathValue`.
pub fn evaluate<'a, N>(
    expr: &Expression,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<PathValue<N>, PathError>
where
    N: SourceNode<'a> + 'a,
{
    match expr {
        Expression::Literal(s) => Ok(PathValue::String(s.clone())),
        Expression::Number(n) => Ok(PathValue::Number(*n)),
        Expression::LocationPath(path) => {
            let nodes = evaluate_location_path(path, e_ctx)?;
            Ok(PathValue::NodeSet(nodes))
        }
        Expression::FunctionCall { name, args } => {
            let mut evaluated_args = Vec::with_capacity(args.len());
            for arg in args {
                evaluated_args.push(evaluate(arg, e_ctx)?);
            }
            functions::evaluate_function(name, evaluated_args, e_ctx)
        }
        Expression::BinaryOp { left, op, right } => {
            let left_val = evaluate(left, e_ctx)?;
            // Short-circuit the logical connectives.
            match op {
                BinaryOperator::And => {
                    if !left_val.to_bool() {
                        return Ok(PathValue::Boolean(false));
                    }
                    let right_val = evaluate(right, e_ctx)?;
                    Ok(PathValue::Boolean(right_val.to_bool()))
                }
                BinaryOperator::Or => {
                    if left_val.to_bool() {
                        return Ok(PathValue::Boolean(true));
                    }
                    let right_val = evaluate(right, e_ctx)?;
                    Ok(PathValue::Boolean(right_val.to_bool()))
                }
                BinaryOperator::Equals | BinaryOperator::NotEquals => {
                    let right_val = evaluate(right, e_ctx)?;
                    let eq = values_equal(&left_val, &right_val);
                    Ok(PathValue::Boolean(if *op == BinaryOperator::Equals {
                        eq
                    } else {
                        !eq
                    }))
                }
            }
        }
    }
}

/// XPath 1.0 equality over the subset: a node-set compares by the string
/// value of each member; everything else compares as strings.
fn values_equal<'a, N: SourceNode<'a>>(left: &PathValue<N>, right: &PathValue<N>) -> bool {
    match (left, right) {
        (PathValue::NodeSet(nodes), other) | (other, PathValue::NodeSet(nodes)) => {
            let rhs = other.to_string();
            nodes.iter().any(|n| n.string_value() == rhs)
        }
        (l, r) => l.to_string() == r.to_string(),
    }
}

fn evaluate_location_path<'a, N>(
    path: &LocationPath,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<Vec<N>, PathError>
where
    N: SourceNode<'a> + 'a,
{
    // A path with no steps refers to the root (absolute) or context node.
    if path.steps.is_empty() {
        return Ok(vec![if path.is_absolute {
            e_ctx.root_node
        } else {
            e_ctx.context_node
        }]);
    }

    let mut current_nodes = vec![if path.is_absolute {
        e_ctx.root_node
    } else {
        e_ctx.context_node
    }];
    for step in &path.steps {
        current_nodes = evaluate_step(step, &current_nodes, e_ctx)?;
    }
    Ok(current_nodes)
}

/// Evaluates a single step by chaining axis collection, node testing, and
/// predicate application.
fn evaluate_step<'a, N>(
    step: &Step,
    context_nodes: &[N],
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<Vec<N>, PathError>
where
    N: SourceNode<'a> + 'a,
{
    // Abbreviated step '.' means the context node set itself.
    if step.axis == Axis::SelfAxis && step.node_test == NodeTest::Name(".".to_string()) {
        return apply_predicates(context_nodes, &step.predicates, e_ctx);
    }

    let axis_nodes = collect_axis_nodes(step.axis, context_nodes);
    let tested_nodes = filter_by_node_test(&axis_nodes, &step.node_test, step.axis);
    apply_predicates(&tested_nodes, &step.predicates, e_ctx)
}

/// Stage 1: Collects all unique nodes from the context set along a given axis.
fn collect_axis_nodes<'a, N>(axis: Axis, context_nodes: &[N]) -> Vec<N>
where
    N: SourceNode<'a> + 'a,
{
    let mut result_nodes = Vec::new();
    let mut seen = HashSet::new();

    for &node in context_nodes {
        match axis {
            Axis::Child => axes::collect_child_nodes(node, &mut seen, &mut result_nodes),
            Axis::Attribute => axes::collect_attribute_nodes(node, &mut seen, &mut result_nodes),
            Axis::Descendant => axes::collect_descendant_nodes(node, &mut seen, &mut result_nodes),
            Axis::DescendantOrSelf => {
                axes::collect_descendant_or_self_nodes(node, &mut seen, &mut result_nodes)
            }
            Axis::Parent => axes::collect_parent_nodes(node, &mut seen, &mut result_nodes),
            Axis::SelfAxis => axes::collect_self_nodes(node, &mut seen, &mut result_nodes),
        }
    }
    result_nodes
}

/// Stage 2: Filters a set of nodes based on a `NodeTest`.
fn filter_by_node_test<'a, N>(nodes: &[N], test: &NodeTest, axis: Axis) -> Vec<N>
where
    N: SourceNode<'a> + 'a,
{
    nodes
        .iter()
        .filter(|&node| match test {
            NodeTest::Wildcard => match axis {
                Axis::Attribute => node.node_type() == NodeType::Attribute,
                _ => node.node_type() == NodeType::Element,
            },
            NodeTest::Name(name_to_test) => node.name().is_some_and(|n| n == name_to_test),
            NodeTest::NodeType(ntt) => match ntt {
                NodeTypeTest::Text => {
                    node.node_type() == NodeType::Text || node.node_type() == NodeType::CData
                }
                NodeTypeTest::Comment => node.node_type() == NodeType::Comment,
                NodeTypeTest::Node => true,
            },
        })
        .copied()
        .collect()
}

/// Stage 3: Filters a set of nodes by applying a series of predicates.
fn apply_predicates<'a, N>(
    nodes: &[N],
    predicates: &[Expression],
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<Vec<N>, PathError>
where
    N: SourceNode<'a> + 'a,
{
    let mut final_nodes = nodes.to_vec();
    for predicate in predicates {
        let mut predicate_results = Vec::new();
        let context_size = final_nodes.len();
        for (i, node) in final_nodes.iter().enumerate() {
            let predicate_e_ctx =
                EvaluationContext::new(*node, e_ctx.root_node, i + 1, context_size);
            let result = evaluate(predicate, &predicate_e_ctx)?;
            let keep = match result {
                // A bare number predicate is positional: [2] == [position()=2].
                PathValue::Number(n) => (n as usize) == (i + 1),
                _ => result.to_bool(),
            };
            if keep {
                predicate_results.push(*node);
            }
        }
        final_nodes = predicate_results;
    }
    Ok(final_nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::tests::{MockNode, create_test_tree};

    fn ctx<'a>(tree: &'a crate::source::tests::MockTree) -> EvaluationContext<'a, MockNode<'a>> {
        let root = MockNode { id: 0, tree };
        EvaluationContext::new(root, root, 1, 1)
    }

    #[test]
    fn test_child_name_path() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr = crate::parser::parse_expression("root/section").unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        if let PathValue::NodeSet(nodes) = result {
            assert_eq!(nodes.len(), 2);
            assert_eq!(nodes[0].id, 2);
            assert_eq!(nodes[1].id, 6);
        } else {
            panic!("Expected a NodeSet");
        }
    }

    #[test]
    fn test_descendant_scan_for_prefixed_attributes() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr =
            crate::parser::parse_expression("//*[@*[starts-with(name(),'data-v.')]]").unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        if let PathValue::NodeSet(nodes) = result {
            assert_eq!(nodes.len(), 1);
            assert_eq!(nodes[0].id, 2);
        } else {
            panic!("Expected a NodeSet");
        }
    }

    #[test]
    fn test_positional_predicate() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr = crate::parser::parse_expression("root/*[1]").unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        if let PathValue::NodeSet(nodes) = result {
            assert_eq!(nodes.len(), 1);
            assert_eq!(nodes[0].id, 2);
        } else {
            panic!("Expected a NodeSet");
        }
    }

    #[test]
    fn test_attribute_value_predicate() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr = crate::parser::parse_expression("//*[@data-v.tr='title']").unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        if let PathValue::NodeSet(nodes) = result {
            assert_eq!(nodes.len(), 1);
            assert_eq!(nodes[0].id, 2);
        } else {
            panic!("Expected a NodeSet");
        }
    }

    #[test]
    fn test_equality_and_inequality() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr = crate::parser::parse_expression(
            "//@*[starts-with(name(),'data-v.') and name() != 'data-v.section']",
        )
        .unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        if let PathValue::NodeSet(nodes) = result {
            assert_eq!(nodes.len(), 1);
            assert_eq!(nodes[0].name(), Some("data-v.tr"));
        } else {
            panic!("Expected a NodeSet");
        }
    }

    #[test]
    fn test_text_node_test() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr = crate::parser::parse_expression("root/section/text()").unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        if let PathValue::NodeSet(nodes) = result {
            assert_eq!(nodes.len(), 2);
            assert_eq!(nodes[0].string_value(), "Hello");
            assert_eq!(nodes[1].string_value(), "World");
        } else {
            panic!("Expected a NodeSet");
        }
    }

    #[test]
    fn test_self_abbreviation_keeps_context() {
        let tree = create_test_tree();
        let section = MockNode { id: 2, tree: &tree };
        let root = MockNode { id: 0, tree: &tree };
        let e_ctx = EvaluationContext::new(section, root, 1, 1);
        let expr = crate::parser::parse_expression(".").unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        if let PathValue::NodeSet(nodes) = result {
            assert_eq!(nodes, vec![section]);
        } else {
            panic!("Expected a NodeSet");
        }
    }
}
