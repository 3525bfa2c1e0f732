//! Abstract syntax tree for the path-expression subset.
//!
//! Directive targeting never needs arithmetic, unions or variables, so the
//! expression grammar stops at boolean connectives, (in)equality, literals,
//! numbers, function calls and location paths.

/// The top-level expression that can be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    LocationPath(LocationPath),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
}

impl Expression {
    /// Checks if the expression is a `LocationPath` variant.
    pub fn is_location_path(&self) -> bool {
        matches!(self, Expression::LocationPath(_))
    }
}

/// A binary operator used in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
}

/// A full location path, like `//div`, `./@id` or `./*[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// True if the path starts from the document root (e.g. `/html`).
    pub is_absolute: bool,
    pub steps: Vec<Step>,
}

/// A single step in a location path, like `child::div[@id = 'a']`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

/// The axis of movement from the context node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    SelfAxis,
}

/// A test to apply to nodes on a given axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A name test (e.g. `div`, `data-v.section`).
    Name(String),
    /// A wildcard test (`*`).
    Wildcard,
    /// A node type test (e.g. `text()`, `node()`).
    NodeType(NodeTypeTest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTypeTest {
    Text,
    Node,
    Comment,
}
