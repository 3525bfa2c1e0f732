//! Directives that compile another view and splice it in: `include`,
//! `errors`, `pagination` and `container`.

use super::DirectiveAttr;
use crate::data::{get_value, DataMap};
use crate::error::RenderError;
use crate::view::View;
use log::debug;
use serde_json::Value;
use weft_dom::{Document, NodeHandle, SetValue};

/// `include`: compiles the named view and replaces the host element with
/// it. A `param` attribute resolving to an object becomes the included
/// view's entire data context; otherwise the current context flows through.
pub(crate) fn include(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let data = match view.compiler_parameter(node) {
        Some(Value::Object(map)) => map,
        Some(other) if !other.is_null() => {
            debug!("include parameter is not an object; passing current data through");
            view.data.clone()
        }
        _ => view.data.clone(),
    };
    let included = view
        .factory
        .make_at_depth(&attr.value, data, view.depth + 1)?
        .compile()?;
    view.document.set(".", SetValue::Doc(&included), Some(node));
    Ok(())
}

/// `errors`: when the `errors` data entry is non-empty, replaces the host
/// element with the named view; otherwise removes it.
pub(crate) fn errors(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    if !has_errors(&view.data) {
        view.remove_node(node);
        return Ok(());
    }
    let rendered = view
        .factory
        .make_at_depth(&attr.value, view.data.clone(), view.depth + 1)?
        .compile()?;
    view.document.set(".", SetValue::Doc(&rendered), Some(node));
    Ok(())
}

fn has_errors(data: &DataMap) -> bool {
    match data.get("errors") {
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

/// `pagination`: when the paginator named by the `name` attribute spans
/// more than one page, replaces the host element with the named view,
/// passing the paginator under the `paginator` key. A single-page
/// paginator just consumes the directive.
pub(crate) fn pagination(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let source = view.node_attr(node, "name").unwrap_or_default();
    let paginator = get_value(&source, &view.data);
    if !has_pages(&paginator) {
        return Ok(());
    }
    let mut data = view.data.clone();
    data.insert("paginator".to_string(), paginator);
    let rendered = view
        .factory
        .make_at_depth(&attr.value, data, view.depth + 1)?
        .compile()?;
    view.document.set(".", SetValue::Doc(&rendered), Some(node));
    Ok(())
}

fn has_pages(paginator: &Value) -> bool {
    let Value::Object(map) = paginator else {
        return false;
    };
    if map.get("has_pages").and_then(Value::as_bool) == Some(true) {
        return true;
    }
    let more_than_one =
        |key: &str| map.get(key).and_then(Value::as_f64).is_some_and(|n| n > 1.0);
    more_than_one("last_page") || more_than_one("pages")
}

/// `container`: compiles the host element's subtree as a child view,
/// hands it to the named layout view, and replaces the host element with
/// the composed result.
pub(crate) fn container(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let mut layout = view
        .factory
        .make_at_depth(&attr.value, view.data.clone(), view.depth + 1)?;
    // Drop the directive attribute first so the cloned subtree cannot
    // re-enter this handler.
    view.document
        .remove_attribute(node, &view.prefixed("container"));
    let subtree = Document::from_node(&view.document, node);
    let content = view
        .factory
        .make_doc_at_depth(subtree, view.data.clone(), view.depth + 1)?
        .compile()?;
    layout.set_child(content);
    let composed = layout.compile()?;
    view.document.set(".", SetValue::Doc(&composed), Some(node));
    Ok(())
}
