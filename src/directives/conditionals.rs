//! Subtree-pruning directives. Each one either keeps the host element or
//! removes it wholesale; none of them produce output of their own.

use super::DirectiveAttr;
use crate::data::{get_value, has_value, loosely_equal, parse_bool};
use crate::error::RenderError;
use crate::view::View;
use serde_json::Value;
use weft_dom::NodeHandle;

/// `auth`: keep the element when the authentication state matches the
/// literal argument (`auth="true"` for signed-in, `auth="false"` for guests).
pub(crate) fn auth(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    if view.factory.services().auth.check() != parse_bool(&attr.value) {
        view.remove_node(node);
    }
    Ok(())
}

/// `can`: keep the element when the gate allows the named ability.
pub(crate) fn can(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let context = view.compiler_parameter(node);
    if view
        .factory
        .services()
        .gate
        .denies(&attr.value, context.as_ref())
    {
        view.remove_node(node);
    }
    Ok(())
}

/// `cannot`: the inverse of `can`.
pub(crate) fn cannot(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let context = view.compiler_parameter(node);
    if view
        .factory
        .services()
        .gate
        .allows(&attr.value, context.as_ref())
    {
        view.remove_node(node);
    }
    Ok(())
}

/// `exists`: keep the element only when the data path has a non-null value.
pub(crate) fn exists(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    if !has_value(&attr.value, &view.data) {
        view.remove_node(node);
    }
    Ok(())
}

/// `empty`: keep the element only when the data path is missing or null.
pub(crate) fn not_exists(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    if has_value(&attr.value, &view.data) {
        view.remove_node(node);
    }
    Ok(())
}

/// `match`: keep the element when the resolved value equals the parameter.
pub(crate) fn match_value(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    if !matches(view, node, attr) {
        view.remove_node(node);
    }
    Ok(())
}

/// `nomatch`: the inverse of `match`.
pub(crate) fn no_match(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    if matches(view, node, attr) {
        view.remove_node(node);
    }
    Ok(())
}

fn matches(view: &View<'_>, node: &NodeHandle, attr: &DirectiveAttr) -> bool {
    // The comparison is loose: both sides compare by string rendering, and
    // a missing parameter compares as the empty string.
    let expected = view.compiler_parameter(node).unwrap_or(Value::Null);
    let actual = get_value(&attr.value, &view.data);
    loosely_equal(&expected, &actual)
}
