//! A view: one template document bound to a data context, compiled by the
//! directive pass and rendered to markup.

use crate::controller::ViewController;
use crate::data::{get_value, value_to_string, DataMap};
use crate::directives::{self, DirectiveAttr};
use crate::error::RenderError;
use crate::factory::Factory;
use crate::services::merge_data;
use log::debug;
use serde_json::Value;
use std::rc::Rc;
use weft_dom::{Document, Fetched, NodeHandle, SetValue};

/// The `contents` marker value that splices the whole child document
/// rather than one named section.
const DEFAULT_SECTION: &str = "#document";

/// A template document paired with its data, pending compilation.
///
/// Views are built by [`Factory::make`] and consumed by [`render`] or
/// [`compile`]; the factory outlives every view it makes.
///
/// [`Factory::make`]: crate::Factory::make
/// [`render`]: View::render
/// [`compile`]: View::compile
pub struct View<'f> {
    pub(crate) factory: &'f Factory,
    name: Option<String>,
    pub(crate) document: Document,
    pub(crate) data: DataMap,
    child: Option<Document>,
    controller: Option<Rc<dyn ViewController>>,
    pub(crate) depth: usize,
}

impl<'f> View<'f> {
    pub(crate) fn new(
        factory: &'f Factory,
        name: Option<String>,
        mut document: Document,
        data: DataMap,
        depth: usize,
    ) -> View<'f> {
        let controller = resolve_controller(factory, name.as_deref(), &mut document);
        View {
            factory,
            name,
            document,
            data,
            child: None,
            controller,
            depth,
        }
    }

    /// The resolved template name, or a placeholder for inline sources.
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("(inline)")
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Adds one data entry, builder style.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Shorthand for binding validation errors under the `errors` key.
    pub fn with_errors(self, errors: Value) -> Self {
        self.with("errors", errors)
    }

    /// Supplies the child document spliced at `contents` markers; used by
    /// layout composition.
    pub fn set_child(&mut self, child: Document) {
        self.child = Some(child);
    }

    /// Direct document manipulation before compilation runs.
    pub fn set(&mut self, path: &str, value: SetValue, ref_node: Option<&NodeHandle>) {
        self.document.set(path, value, ref_node);
    }

    /// Lists the distinct directive tokens present in the template, in
    /// sorted order. Useful for deciding what data a template needs.
    pub fn scan_tokens(&mut self) -> Vec<String> {
        let prefix = self.factory.prefix().to_string();
        let path = format!("//*/@*[starts-with(name(),'{}')]", prefix);
        let mut tokens: Vec<String> = self
            .document
            .query(&path, None)
            .into_iter()
            .filter_map(|handle| match handle {
                NodeHandle::Attr(_, name) => {
                    let rest = name.strip_prefix(&prefix)?;
                    Some(rest.split('.').next().unwrap_or(rest).to_string())
                }
                NodeHandle::Node(_) => None,
            })
            .collect();
        tokens.sort();
        tokens.dedup();
        tokens
    }

    /// Compiles and serializes the whole document, stripping every
    /// remaining directive attribute first.
    pub fn render(mut self) -> Result<String, RenderError> {
        self.data = merge_data(self.factory.shared(), std::mem::take(&mut self.data));
        let prefix = self.factory.prefix().to_string();
        let mut document = self.compile()?;
        document.set(
            &format!("//*/@*[starts-with(name(),'{}')]", prefix),
            SetValue::Null,
            None,
        );
        document.tidy();
        Ok(document.show(true))
    }

    /// Runs the full compilation pipeline and returns the document:
    /// child-section splicing, controller hooks, the directive pass, and
    /// finally composition into a controller-declared parent layout.
    ///
    /// Unlike [`render`], directive attributes on untouched nodes are kept,
    /// so a compiled document can be spliced into another view and
    /// processed further.
    ///
    /// [`render`]: View::render
    pub fn compile(mut self) -> Result<Document, RenderError> {
        if !self.document.is_set() {
            let detail = self
                .document
                .errs()
                .first()
                .cloned()
                .unwrap_or_else(|| "document is unset".to_string());
            return Err(RenderError::UnparsableTemplate {
                view: self.name().to_string(),
                detail,
            });
        }
        self.splice_child_sections();
        if let Some(controller) = self.controller.clone() {
            controller.compose(&mut self.document, &mut self.data);
            let document = std::mem::take(&mut self.document);
            self.document = controller.render(document, &self.data);
            controller.creator(&mut self.document, &self.data);
        }
        self.run_compilers()?;
        if let Some(parent) = self
            .controller
            .as_ref()
            .and_then(|c| c.parent())
            .map(str::to_string)
        {
            return self.compile_into_parent(&parent);
        }
        Ok(self.document)
    }

    /// Composes this compiled document into the layout its controller
    /// declared, giving the layout's controller the last word.
    fn compile_into_parent(self, parent_name: &str) -> Result<Document, RenderError> {
        let mut parent =
            self.factory
                .make_at_depth(parent_name, self.data.clone(), self.depth + 1)?;
        let parent_controller = parent.controller.clone();
        parent.set_child(Document::from_document(&self.document));
        let composed = parent.compile()?;
        Ok(match parent_controller {
            Some(controller) => controller.render_child(composed, &self.document),
            None => composed,
        })
    }

    /// Replaces every `contents`-marked element with the matching part of
    /// the child document: the whole document for `#document`, otherwise
    /// the element carrying the matching `section` attribute. A marker
    /// with no matching section is removed.
    fn splice_child_sections(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        let marker = self.prefixed("contents");
        let nodes = self.document.query(&format!("//*[@{}]", marker), None);
        for node in nodes {
            let section = self.node_attr(&node, "contents").unwrap_or_default();
            if section == DEFAULT_SECTION {
                self.document.set(".", SetValue::Doc(&child), Some(&node));
                continue;
            }
            let path = format!("//*[@{}='{}']", self.prefixed("section"), section);
            match child.get(&path, None) {
                Fetched::Doc(mut part) => {
                    if let Some(root) = part.root_element_handle() {
                        part.remove_attribute(&root, &self.prefixed("section"));
                    }
                    self.document.set(".", SetValue::Doc(&part), Some(&node));
                }
                _ => {
                    debug!("child document has no section '{}'", section);
                    self.document.set(".", SetValue::Null, Some(&node));
                }
            }
        }
    }

    /// The directive pass: scans once for every element carrying a
    /// prefixed attribute, then executes each node's directives in table
    /// priority order. A node detached by an earlier handler is skipped.
    fn run_compilers(&mut self) -> Result<(), RenderError> {
        let scan = format!(
            "//*[@*[starts-with(name(),'{}')]]",
            self.factory.prefix()
        );
        let nodes = self.document.query(&scan, None);
        for node in nodes {
            if !self.document.is_attached(&node) {
                continue;
            }
            let found = self.collect_directives(&node);
            if found.is_empty() {
                continue;
            }
            for directive in &found {
                if !self.document.is_attached(&node) {
                    break;
                }
                directives::execute(self, &node, directive)?;
            }
            if self.document.is_attached(&node) {
                self.strip_directive_attrs(&node);
            }
        }
        Ok(())
    }

    /// Parses a node's prefixed attributes into execution units, ordered
    /// by table priority. The sort is stable, so repeated tokens such as
    /// several `attr.*` directives keep their declaration order.
    fn collect_directives(&self, node: &NodeHandle) -> Vec<DirectiveAttr> {
        let prefix = self.factory.prefix();
        let mut found: Vec<DirectiveAttr> = self
            .document
            .attrs_of(node)
            .into_iter()
            .filter_map(|(name, value)| {
                let rest = name.strip_prefix(prefix)?;
                let (token, subkey) = match rest.split_once('.') {
                    Some((token, sub)) => (token, Some(sub.to_string())),
                    None => (rest, None),
                };
                let (priority, directive) = directives::lookup(token)?;
                Some(DirectiveAttr {
                    directive,
                    priority,
                    subkey,
                    value,
                })
            })
            .collect();
        found.sort_by_key(|d| d.priority);
        found
    }

    /// Removes a processed node's directive attributes, keeping `section`
    /// markers so the node stays addressable by later layout splicing.
    fn strip_directive_attrs(&mut self, node: &NodeHandle) {
        let path = format!(
            "./@*[starts-with(name(),'{p}') and name() != '{p}section']",
            p = self.factory.prefix()
        );
        self.document.set(&path, SetValue::Null, Some(node));
    }

    /// The `param`/`literal` argument convention shared by `can`, `match`,
    /// `include`, `route` and friends: `param` names a data path, `literal`
    /// passes its text through as a string.
    pub(crate) fn compiler_parameter(&self, node: &NodeHandle) -> Option<Value> {
        match self.node_attr(node, "param") {
            Some(path) if !path.is_empty() => Some(get_value(&path, &self.data)),
            _ => self.node_attr(node, "literal").map(Value::String),
        }
    }

    /// Reads a prefixed attribute off the node, e.g. `name` for the
    /// `foreach` item binding.
    pub(crate) fn node_attr(&self, node: &NodeHandle, token: &str) -> Option<String> {
        let key = self.prefixed(token);
        self.document
            .attrs_of(node)
            .into_iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value)
    }

    pub(crate) fn prefixed(&self, token: &str) -> String {
        format!("{}{}", self.factory.prefix(), token)
    }

    pub(crate) fn remove_node(&mut self, node: &NodeHandle) {
        self.document.set(".", SetValue::Null, Some(node));
    }

    /// Splices a resolved data value at a path relative to the node.
    /// Strings may carry markup; structured values are a diagnostic, not
    /// output.
    pub(crate) fn splice_value(&mut self, path: &str, value: Value, node: &NodeHandle) {
        match value {
            Value::Null => self.document.set(path, SetValue::Null, Some(node)),
            Value::String(s) => self.document.set(path, SetValue::Text(s), Some(node)),
            Value::Bool(_) | Value::Number(_) => {
                self.document
                    .set(path, value_to_string(&value).into(), Some(node))
            }
            other => {
                debug!("cannot splice structured value at '{}': {}", path, other);
            }
        }
    }
}

impl std::fmt::Debug for View<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("depth", &self.depth)
            .field("has_child", &self.child.is_some())
            .field("has_controller", &self.controller.is_some())
            .finish()
    }
}

/// Controllers resolve from the registry: first by the name the template
/// declares on its root element, then by the view name itself.
fn resolve_controller(
    factory: &Factory,
    name: Option<&str>,
    document: &mut Document,
) -> Option<Rc<dyn ViewController>> {
    let path = format!("/*/@{}controller", factory.prefix());
    if let Fetched::Value(declared) = document.get(&path, None) {
        if !declared.is_empty() {
            if let Some(controller) = factory.controllers().resolve(&declared) {
                return Some(controller);
            }
            debug!("declared controller '{}' is not registered", declared);
        }
    }
    name.and_then(|n| factory.controllers().resolve(n))
}

#[cfg(test)]
mod tests {
    use crate::factory::Factory;
    use crate::services::{MemoryFinder, Services};
    use serde_json::json;

    fn factory_with(templates: &[(&str, &str)]) -> Factory {
        let mut finder = MemoryFinder::new();
        for (name, source) in templates {
            finder.insert(*name, *source);
        }
        Factory::new(Services {
            finder: Box::new(finder),
            ..Services::default()
        })
    }

    #[test]
    fn test_scan_tokens_reports_sorted_unique_tokens() {
        let factory = factory_with(&[]);
        let mut view = factory
            .make(
                r#"<div data-v.exists="a"><p data-v.child="b" data-v.attr.class="c"/><p data-v.child="d"/></div>"#,
                Default::default(),
            )
            .unwrap();
        assert_eq!(view.scan_tokens(), vec!["attr", "child", "exists"]);
    }

    #[test]
    fn test_directives_run_in_table_order_not_attribute_order() {
        // `exists` outranks `child`, so the missing path removes the node
        // before any content splices even though `child` is written first.
        let factory = factory_with(&[]);
        let out = factory
            .make(
                r#"<ul><li data-v.child="name" data-v.exists="missing">x</li></ul>"#,
                Default::default(),
            )
            .unwrap()
            .with("name", json!("kept"))
            .render()
            .unwrap();
        assert!(!out.contains("<li"));
        assert!(!out.contains("kept"));
    }

    #[test]
    fn test_render_strips_unknown_prefixed_attributes() {
        let factory = factory_with(&[]);
        let out = factory
            .make(
                r#"<div data-v.frobnicate="x"><span data-v.section="s">ok</span></div>"#,
                Default::default(),
            )
            .unwrap()
            .render()
            .unwrap();
        assert!(!out.contains("data-v."));
        assert!(out.contains("<span>ok</span>"));
    }

    #[test]
    fn test_unparsable_template_surfaces_view_name() {
        let factory = factory_with(&[("broken", "<div><span></div>")]);
        let err = factory
            .make("broken", Default::default())
            .unwrap()
            .render()
            .unwrap_err();
        assert!(err.to_string().contains("broken"));
    }
}
