use super::DirectiveAttr;
use crate::data::interpolate;
use crate::error::RenderError;
use crate::view::View;
use log::debug;
use weft_dom::NodeHandle;

/// `attr.<name>`: interpolates the argument and writes it to the named
/// attribute on the host element, creating the attribute when missing.
pub(crate) fn attribute(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let Some(target) = &attr.subkey else {
        debug!("attr directive without a target attribute name");
        return Ok(());
    };
    let value = interpolate(&attr.value, &view.data);
    view.document
        .set(&format!("./@{}", target), value.into(), Some(node));
    Ok(())
}
