use super::DirectiveAttr;
use crate::data::get_value;
use crate::error::RenderError;
use crate::view::View;
use log::debug;
use serde_json::Value;
use weft_dom::{Document, Fetched, NodeHandle, SetValue};

/// `foreach`: consumes the host element's first element child as a
/// template and compiles one copy per collection entry, each in its own
/// data context. The entry value binds under the `name` attribute and its
/// key or index under the `key` attribute (default `#key`). An empty or
/// missing collection removes the host element entirely.
pub(crate) fn for_each(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    let collection = get_value(&attr.value, &view.data);
    let entries: Vec<(Value, Value)> = match collection {
        Value::Array(items) if !items.is_empty() => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Value::from(i), v))
            .collect(),
        Value::Object(map) if !map.is_empty() => {
            map.into_iter().map(|(k, v)| (Value::String(k), v)).collect()
        }
        _ => {
            view.remove_node(node);
            return Ok(());
        }
    };
    let item_name = view.node_attr(node, "name").filter(|n| !n.is_empty());
    let key_name = view
        .node_attr(node, "key")
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| "#key".to_string());
    let template = match view.document.consume("./*[1]", Some(node)) {
        Fetched::Doc(doc) => doc,
        _ => {
            debug!("foreach over '{}' has no element child to repeat", attr.value);
            return Ok(());
        }
    };
    if item_name.is_none() {
        debug!("foreach over '{}' has no name attribute; entries are unbound", attr.value);
    }
    for (key, value) in entries {
        let mut item_data = view.data.clone();
        item_data.insert(key_name.clone(), key);
        if let Some(name) = &item_name {
            item_data.insert(name.clone(), value);
        }
        let rendered = view
            .factory
            .make_doc_at_depth(Document::from_document(&template), item_data, view.depth + 1)?
            .compile()?;
        view.document
            .set("./child-gap()", SetValue::Doc(&rendered), Some(node));
    }
    Ok(())
}
