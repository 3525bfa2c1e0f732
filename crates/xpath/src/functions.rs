//! Built-in function implementations for the path subset.

use super::engine::{EvaluationContext, PathValue};
use crate::error::PathError;
use crate::source::SourceNode;

/// Dispatches a function call to the correct implementation.
pub fn evaluate_function<'a, N: SourceNode<'a>>(
    name: &str,
    args: Vec<PathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<PathValue<N>, PathError> {
    match name {
        // Core & node-set
        "string" => func_string(args, e_ctx),
        "count" => func_count(args),
        "position" => func_position(args, e_ctx),
        "last" => func_last(args, e_ctx),
        "local-name" => func_local_name(args, e_ctx),
        "name" => func_name(args, e_ctx),

        // String
        "starts-with" => func_starts_with(args),
        "contains" => func_contains(args),

        // Boolean
        "not" => func_not(args),
        "true" => func_true(args),
        "false" => func_false(args),

        _ => Err(PathError::FunctionError {
            function: name.to_string(),
            message: "Unknown path function".to_string(),
        }),
    }
}

fn expect_args<N>(
    function: &str,
    args: &[PathValue<N>],
    count: usize,
) -> Result<(), PathError> {
    if args.len() != count {
        return Err(PathError::FunctionError {
            function: function.to_string(),
            message: format!("Expected {} argument(s), got {}", count, args.len()),
        });
    }
    Ok(())
}

fn func_string<'a, N: SourceNode<'a>>(
    args: Vec<PathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<PathValue<N>, PathError> {
    let value = match args.into_iter().next() {
        Some(v) => v.to_string(),
        None => e_ctx.context_node.string_value(),
    };
    Ok(PathValue::String(value))
}

fn func_count<'a, N: SourceNode<'a>>(args: Vec<PathValue<N>>) -> Result<PathValue<N>, PathError> {
    expect_args("count()", &args, 1)?;
    match &args[0] {
        PathValue::NodeSet(nodes) => Ok(PathValue::Number(nodes.len() as f64)),
        _ => Err(PathError::TypeError(
            "count() requires a node-set argument".to_string(),
        )),
    }
}

fn func_position<'a, N: SourceNode<'a>>(
    args: Vec<PathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<PathValue<N>, PathError> {
    expect_args("position()", &args, 0)?;
    Ok(PathValue::Number(e_ctx.context_position as f64))
}

fn func_last<'a, N: SourceNode<'a>>(
    args: Vec<PathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<PathValue<N>, PathError> {
    expect_args("last()", &args, 0)?;
    Ok(PathValue::Number(e_ctx.context_size as f64))
}

/// The full qualified name of the context node (or of the first node in a
/// node-set argument).
fn func_name<'a, N: SourceNode<'a>>(
    args: Vec<PathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<PathValue<N>, PathError> {
    let node = match args.into_iter().next() {
        Some(PathValue::NodeSet(nodes)) => nodes.into_iter().next(),
        Some(_) => {
            return Err(PathError::TypeError(
                "name() requires a node-set argument".to_string(),
            ));
        }
        None => Some(e_ctx.context_node),
    };
    Ok(PathValue::String(
        node.and_then(|n| n.name()).unwrap_or_default().to_string(),
    ))
}

/// Like `name()` but with any `prefix:` stripped.
fn func_local_name<'a, N: SourceNode<'a>>(
    args: Vec<PathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> Result<PathValue<N>, PathError> {
    let full = match func_name(args, e_ctx)? {
        PathValue::String(s) => s,
        _ => unreachable!(),
    };
    let local = full.rsplit(':').next().unwrap_or_default();
    Ok(PathValue::String(local.to_string()))
}

fn func_starts_with<'a, N: SourceNode<'a>>(
    args: Vec<PathValue<N>>,
) -> Result<PathValue<N>, PathError> {
    expect_args("starts-with()", &args, 2)?;
    let haystack = args[0].to_string();
    let prefix = args[1].to_string();
    Ok(PathValue::Boolean(haystack.starts_with(&prefix)))
}

fn func_contains<'a, N: SourceNode<'a>>(
    args: Vec<PathValue<N>>,
) -> Result<PathValue<N>, PathError> {
    expect_args("contains()", &args, 2)?;
    let haystack = args[0].to_string();
    let needle = args[1].to_string();
    Ok(PathValue::Boolean(haystack.contains(&needle)))
}

fn func_not<'a, N: SourceNode<'a>>(args: Vec<PathValue<N>>) -> Result<PathValue<N>, PathError> {
    expect_args("not()", &args, 1)?;
    Ok(PathValue::Boolean(!args[0].to_bool()))
}

fn func_true<'a, N: SourceNode<'a>>(args: Vec<PathValue<N>>) -> Result<PathValue<N>, PathError> {
    expect_args("true()", &args, 0)?;
    Ok(PathValue::Boolean(true))
}

fn func_false<'a, N: SourceNode<'a>>(args: Vec<PathValue<N>>) -> Result<PathValue<N>, PathError> {
    expect_args("false()", &args, 0)?;
    Ok(PathValue::Boolean(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate;
    use crate::source::tests::{MockNode, create_test_tree};

    fn ctx<'a>(tree: &'a crate::source::tests::MockTree) -> EvaluationContext<'a, MockNode<'a>> {
        let root = MockNode { id: 0, tree };
        EvaluationContext::new(root, root, 1, 1)
    }

    #[test]
    fn test_name_of_attribute_node() {
        let tree = create_test_tree();
        let attr = MockNode { id: 3, tree: &tree };
        let root = MockNode { id: 0, tree: &tree };
        let e_ctx = EvaluationContext::new(attr, root, 1, 1);
        let expr = crate::parser::parse_expression("name()").unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        assert_eq!(result.to_string(), "data-v.tr");
    }

    #[test]
    fn test_starts_with_and_not() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr =
            crate::parser::parse_expression("not(starts-with('data-v.include', 'data-v.'))")
                .unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        assert!(!result.to_bool());
    }

    #[test]
    fn test_contains() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr = crate::parser::parse_expression("contains('[br|hr|img]', 'hr')").unwrap();
        assert!(evaluate(&expr, &e_ctx).unwrap().to_bool());
        let expr = crate::parser::parse_expression("contains('[br|hr|img]', 'div')").unwrap();
        assert!(!evaluate(&expr, &e_ctx).unwrap().to_bool());
    }

    #[test]
    fn test_count() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr = crate::parser::parse_expression("count(root/section)").unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        assert_eq!(result.to_string(), "2");
    }

    #[test]
    fn test_local_name_strips_prefix() {
        let tree = create_test_tree();
        let e_ctx = ctx(&tree);
        let expr = crate::parser::parse_expression("local-name(root/section)").unwrap();
        let result = evaluate(&expr, &e_ctx).unwrap();
        assert_eq!(result.to_string(), "section");
    }
}
