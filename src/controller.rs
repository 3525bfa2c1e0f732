//! View controllers: per-template hooks resolved from an explicit
//! registration map. "No controller registered" is the common case, not
//! an error.

use crate::data::DataMap;
use std::collections::HashMap;
use std::rc::Rc;
use weft_dom::Document;

/// Hooks a template can register to participate in its own compilation.
///
/// All methods have no-op defaults; a controller overrides only what it
/// needs.
pub trait ViewController {
    /// Pre-compile hook: may add data or reshape the document before the
    /// directive pass runs.
    fn compose(&self, _document: &mut Document, _data: &mut DataMap) {}

    /// Wraps the document between `compose` and the directive pass.
    fn render(&self, document: Document, _data: &DataMap) -> Document {
        document
    }

    /// Post-render hook, called after `render`.
    fn creator(&self, _document: &mut Document, _data: &DataMap) {}

    /// An optional layout view this template composes itself into, like a
    /// `container` directive declared in code.
    fn parent(&self) -> Option<&str> {
        None
    }

    /// Lets a parent's controller adjust the composed document when this
    /// view was compiled as somebody's layout.
    fn render_child(&self, document: Document, _child: &Document) -> Document {
        document
    }
}

/// The explicit name-to-controller registration map.
///
/// A template may also name its controller directly via the `controller`
/// directive attribute on its root element; that name is looked up here
/// before the view name is.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: HashMap<String, Rc<dyn ViewController>>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, controller: Rc<dyn ViewController>) {
        self.controllers.insert(name.into(), controller);
    }

    pub fn resolve(&self, name: &str) -> Option<Rc<dyn ViewController>> {
        self.controllers.get(name).cloned()
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("registered", &self.controllers.keys().collect::<Vec<_>>())
            .finish()
    }
}
