//! The view factory: template resolution, the parsed-document cache,
//! shared data and controller registration live here. One factory serves
//! many renders; every view it makes gets a private clone of the cached
//! document, so no render can corrupt another.

use crate::controller::{ControllerRegistry, ViewController};
use crate::data::DataMap;
use crate::error::RenderError;
use crate::services::Services;
use crate::view::View;
use log::trace;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use weft_dom::Document;

/// Bounds nested view construction (`include`, `container`, `foreach`
/// templates, controller parents) so cyclic templates fail fast instead of
/// overflowing the stack.
pub const RECURSION_LIMIT: usize = 32;

const DEFAULT_PREFIX: &str = "data-v.";

pub struct Factory {
    services: Services,
    shared: DataMap,
    cache: RefCell<HashMap<String, Document>>,
    controllers: ControllerRegistry,
    prefix: String,
}

impl Factory {
    pub fn new(services: Services) -> Factory {
        Factory::with_prefix(services, DEFAULT_PREFIX)
    }

    /// A factory whose directive attributes use a custom prefix instead of
    /// `data-v.`.
    pub fn with_prefix(services: Services, prefix: impl Into<String>) -> Factory {
        Factory {
            services,
            shared: DataMap::new(),
            cache: RefCell::new(HashMap::new()),
            controllers: ControllerRegistry::new(),
            prefix: prefix.into(),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers data merged under every render's own data.
    pub fn share(&mut self, key: impl Into<String>, value: Value) {
        self.shared.insert(key.into(), value);
    }

    pub fn shared(&self) -> &DataMap {
        &self.shared
    }

    pub fn register_controller(
        &mut self,
        name: impl Into<String>,
        controller: Rc<dyn ViewController>,
    ) {
        self.controllers.register(name, controller);
    }

    pub(crate) fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Whether `make` would resolve the name, without parsing anything.
    pub fn exists(&self, name: &str) -> bool {
        self.cache.borrow().contains_key(name) || self.services.finder.find(name).is_some()
    }

    /// Drops every cached parsed template.
    pub fn flush_cache(&self) {
        self.cache.borrow_mut().clear();
    }

    /// Builds a view from a template name or, when the string contains
    /// `<`, from inline markup.
    pub fn make(&self, target: &str, data: DataMap) -> Result<View<'_>, RenderError> {
        self.make_at_depth(target, data, 0)
    }

    /// Builds a view around an already-constructed document.
    pub fn make_doc(&self, document: Document, data: DataMap) -> Result<View<'_>, RenderError> {
        self.make_doc_at_depth(document, data, 0)
    }

    /// Resolves, compiles and renders in one call.
    pub fn render(&self, target: &str, data: DataMap) -> Result<String, RenderError> {
        self.make(target, data)?.render()
    }

    pub(crate) fn make_at_depth(
        &self,
        target: &str,
        data: DataMap,
        depth: usize,
    ) -> Result<View<'_>, RenderError> {
        if depth > RECURSION_LIMIT {
            return Err(RenderError::RecursionLimit {
                view: target.to_string(),
            });
        }
        if target.contains('<') {
            return Ok(View::new(self, None, Document::new(target), data, depth));
        }
        let document = self.document_for(target)?;
        Ok(View::new(
            self,
            Some(target.to_string()),
            document,
            data,
            depth,
        ))
    }

    pub(crate) fn make_doc_at_depth(
        &self,
        document: Document,
        data: DataMap,
        depth: usize,
    ) -> Result<View<'_>, RenderError> {
        if depth > RECURSION_LIMIT {
            return Err(RenderError::RecursionLimit {
                view: "(document)".to_string(),
            });
        }
        Ok(View::new(self, None, document, data, depth))
    }

    /// The cache sits in front of the finder. It stores a pristine parsed
    /// copy per name and hands out clones, so template mutation during one
    /// render never leaks into the next.
    fn document_for(&self, name: &str) -> Result<Document, RenderError> {
        if let Some(cached) = self.cache.borrow().get(name) {
            trace!("template cache hit for '{}'", name);
            return Ok(Document::from_document(cached));
        }
        let source = self
            .services
            .finder
            .find(name)
            .ok_or_else(|| RenderError::ViewNotFound(name.to_string()))?;
        let document = Document::new(&source);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Document::from_document(&document));
        Ok(document)
    }
}

impl std::fmt::Debug for Factory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Factory")
            .field("prefix", &self.prefix)
            .field("shared", &self.shared.keys().collect::<Vec<_>>())
            .field("cached", &self.cache.borrow().keys().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryFinder;
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
    fn test_missing_view_is_an_error() {
        let factory = factory_with(&[]);
        let err = factory.make("nowhere", DataMap::new()).unwrap_err();
        assert!(matches!(err, RenderError::ViewNotFound(name) if name == "nowhere"));
    }

    #[test]
    fn test_cache_isolates_successive_renders() {
        let factory =
            factory_with(&[("greeting", r#"<p data-v.child="who">placeholder</p>"#)]);
        let first = factory.render("greeting", DataMap::new()).unwrap();
        // The first render mutated its own clone only; the placeholder is
        // intact on the next make.
        let second = factory.render("greeting", DataMap::new()).unwrap();
        assert_eq!(first, second);
        assert!(second.contains("placeholder"));
    }

    #[test]
    fn test_shared_data_merges_under_render_data() {
        let mut factory = factory_with(&[("t", r#"<p data-v.child="site"/>"#)]);
        factory.share("site", json!("default"));
        let kept = factory.render("t", DataMap::new()).unwrap();
        assert!(kept.contains("default"));

        let mut data = DataMap::new();
        data.insert("site".to_string(), json!("override"));
        let overridden = factory.render("t", data).unwrap();
        assert!(overridden.contains("override"));
        assert!(!overridden.contains("default"));
    }

    #[test]
    fn test_recursive_include_hits_the_depth_guard() {
        let factory = factory_with(&[("loop", r#"<div data-v.include="loop"/>"#)]);
        let err = factory.render("loop", DataMap::new()).unwrap_err();
        assert!(matches!(err, RenderError::RecursionLimit { .. }));
    }
}
