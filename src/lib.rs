//! weft: an attribute-directive template engine over mutable XML views.
//!
//! Templates are plain XHTML/XML documents. Behavior attaches through
//! prefixed attributes (`data-v.child`, `data-v.foreach`, ...); the
//! compiler scans a document once, executes each element's directives in a
//! fixed priority order, and strips every directive attribute from the
//! final output. Under the directives sit two layers published as their
//! own crates: `weft-dom`, a mutable document with gap-addressed `set`
//! semantics, and `weft-xpath`, the path engine that targets nodes.
//!
//! ```
//! use weft::{Factory, MemoryFinder, Services};
//! use serde_json::json;
//!
//! let mut finder = MemoryFinder::new();
//! finder.insert("hello", r#"<p data-v.child="name"/>"#);
//! let factory = Factory::new(Services {
//!     finder: Box::new(finder),
//!     ..Services::default()
//! });
//! let out = factory
//!     .make("hello", Default::default())
//!     .unwrap()
//!     .with("name", json!("world"))
//!     .render()
//!     .unwrap();
//! assert!(out.contains("<p>world</p>"));
//! ```

pub mod controller;
pub mod data;
pub mod directives;
pub mod error;
pub mod factory;
pub mod services;
pub mod view;

pub use controller::{ControllerRegistry, ViewController};
pub use data::DataMap;
pub use directives::Directive;
pub use error::RenderError;
pub use factory::{Factory, RECURSION_LIMIT};
pub use services::{
    Auth, FileFinder, Gate, GuestAuth, MemoryFinder, NullGate, NullTranslator,
    PlainUrlGenerator, Services, Translator, UrlGenerator, ViewFinder,
};
pub use view::View;

pub use weft_dom::{Document, DomError, Fetched, GapMode, NodeHandle, SetValue};
pub use weft_xpath::PathError;
