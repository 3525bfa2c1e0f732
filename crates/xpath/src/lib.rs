pub mod ast;
pub mod axes;
pub mod engine;
pub mod error;
pub mod functions;
pub mod parser;
pub mod source;

pub use ast::{Axis, BinaryOperator, Expression, LocationPath, NodeTest, Step};
pub use engine::{EvaluationContext, PathValue, evaluate};
pub use error::PathError;
pub use parser::parse_expression;
pub use source::{NodeType, SourceNode};

// Re-export test utilities for integration testing in downstream crates
pub use source::tests;
