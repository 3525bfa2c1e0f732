//! URL-emitting directives: `url`, `route` and `asset`.

use super::DirectiveAttr;
use crate::data::{get_value, interpolate, interpolate_with, value_to_string};
use crate::error::RenderError;
use crate::view::View;
use serde_json::Value;
use weft_dom::NodeHandle;

/// `url`: interpolates the argument and writes it to `href`.
pub(crate) fn url(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let href = interpolate(&attr.value, &view.data);
    view.document.set("./@href", href.into(), Some(node));
    Ok(())
}

/// `route`: builds the route name by interpolation, asks the URL generator
/// for the link, and writes it to `href`. The optional `param` attribute
/// supplies route parameters.
pub(crate) fn route(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let params = view.compiler_parameter(node);
    let data = &view.data;
    let name = interpolate_with(&attr.value, |path| {
        let value = get_value(path, data);
        match &value {
            // Models interpolate as their type name, so `posts.{post}.edit`
            // works without a dedicated string field.
            Value::Object(map) if map.contains_key("#type") => {
                value_to_string(&map["#type"]).to_lowercase()
            }
            other => value_to_string(other),
        }
    });
    let href = view.factory.services().urls.route(&name, params.as_ref());
    view.document.set("./@href", href.into(), Some(node));
    Ok(())
}

/// `asset`: writes an asset URL to `src`, or to `href` on `link` elements.
pub(crate) fn asset(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let target = match view.document.node_name(node).as_deref() {
        Some("link") => "./@href",
        _ => "./@src",
    };
    let href = view.factory.services().urls.asset(&attr.value);
    view.document.set(target, href.into(), Some(node));
    Ok(())
}
