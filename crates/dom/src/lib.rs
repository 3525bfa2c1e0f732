//! A mutable XML document with XPath-subset addressing and gap-based
//! placement, built for directive-driven template compilation.

pub mod cursor;
pub mod document;
pub mod error;
pub mod gap;
pub mod parse;
pub mod serialize;
pub mod tree;

pub use cursor::NodeHandle;
pub use document::{Document, Fetched, SetValue};
pub use error::DomError;
pub use gap::GapMode;
pub use tree::{NodeId, NodeKind, Tree};
