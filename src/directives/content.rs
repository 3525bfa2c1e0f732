//! Value-splicing directives: `child`, `replace`, `tr` and `null`.

use super::DirectiveAttr;
use crate::data::get_value;
use crate::error::RenderError;
use crate::view::View;
use log::debug;
use weft_dom::NodeHandle;

/// `child`: resolves the data path and appends the value as content of the
/// host element. Markup in a string value is parsed; a missing value is a
/// no-op so placeholder children survive.
pub(crate) fn child_gap(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let value = get_value(&attr.value, &view.data);
    view.splice_value("./child-gap()", value, node);
    Ok(())
}

/// `replace`: like `child`, but the value replaces the host element itself.
/// A missing value removes the element.
pub(crate) fn replace(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let value = get_value(&attr.value, &view.data);
    view.splice_value(".", value, node);
    Ok(())
}

/// `tr`: replaces the element's content with the translation of the key.
pub(crate) fn translate(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let translated = view.factory.services().translator.translate(&attr.value);
    view.document.set("./data()", translated.into(), Some(node));
    Ok(())
}

/// `null`: resolves the data path for its side effects only, so templates
/// can assert a path is reachable without emitting anything.
pub(crate) fn null(
    view: &mut View<'_>,
    _node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let value = get_value(&attr.value, &view.data);
    debug!("null directive resolved '{}' to {}", attr.value, value);
    Ok(())
}
