//! The directive table and per-directive handlers.
//!
//! Any element attribute named `prefix + token[.subkey]` is a directive.
//! A node's directives execute in the fixed priority order below, not in
//! attribute-declaration order; unknown tokens after the prefix are inert
//! and are only removed by the final tidy pass.

mod attrs;
mod conditionals;
mod content;
mod includes;
mod links;
mod loops;

use crate::error::RenderError;
use crate::view::View;
use weft_dom::NodeHandle;

/// Every recognized directive token, in execution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Attr,
    Container,
    Errors,
    Auth,
    Can,
    Cannot,
    Exists,
    Empty,
    Match,
    NoMatch,
    Include,
    Pagination,
    ForEach,
    Url,
    Route,
    Asset,
    ChildGap,
    Replace,
    Translate,
    Null,
}

const TABLE: [(&str, Directive); 20] = [
    ("attr", Directive::Attr),
    ("container", Directive::Container),
    ("errors", Directive::Errors),
    ("auth", Directive::Auth),
    ("can", Directive::Can),
    ("cannot", Directive::Cannot),
    ("exists", Directive::Exists),
    ("empty", Directive::Empty),
    ("match", Directive::Match),
    ("nomatch", Directive::NoMatch),
    ("include", Directive::Include),
    ("pagination", Directive::Pagination),
    ("foreach", Directive::ForEach),
    ("url", Directive::Url),
    ("route", Directive::Route),
    ("asset", Directive::Asset),
    ("child", Directive::ChildGap),
    ("replace", Directive::Replace),
    ("tr", Directive::Translate),
    ("null", Directive::Null),
];

/// Resolves a token to its directive and priority rank. Unknown tokens
/// are simply absent, never an error.
pub fn lookup(token: &str) -> Option<(usize, Directive)> {
    TABLE
        .iter()
        .position(|(t, _)| *t == token)
        .map(|i| (i, TABLE[i].1))
}

/// One (node, attribute) execution unit collected by the dispatcher.
#[derive(Debug, Clone)]
pub struct DirectiveAttr {
    pub directive: Directive,
    pub priority: usize,
    /// The part after `token.` in the attribute name, e.g. the target
    /// attribute of `attr.class`.
    pub subkey: Option<String>,
    /// The raw directive argument string.
    pub value: String,
}

pub(crate) fn execute(
    view: &mut View<'_>,
    node: &NodeHandle,
    attr: &DirectiveAttr,
) -> Result<(), RenderError> {
    match attr.directive {
        Directive::Attr => attrs::attribute(view, node, attr),
        Directive::Container => includes::container(view, node, attr),
        Directive::Errors => includes::errors(view, node, attr),
        Directive::Auth => conditionals::auth(view, node, attr),
        Directive::Can => conditionals::can(view, node, attr),
        Directive::Cannot => conditionals::cannot(view, node, attr),
        Directive::Exists => conditionals::exists(view, node, attr),
        Directive::Empty => conditionals::not_exists(view, node, attr),
        Directive::Match => conditionals::match_value(view, node, attr),
        Directive::NoMatch => conditionals::no_match(view, node, attr),
        Directive::Include => includes::include(view, node, attr),
        Directive::Pagination => includes::pagination(view, node, attr),
        Directive::ForEach => loops::for_each(view, node, attr),
        Directive::Url => links::url(view, node, attr),
        Directive::Route => links::route(view, node, attr),
        Directive::Asset => links::asset(view, node, attr),
        Directive::ChildGap => content::child_gap(view, node, attr),
        Directive::Replace => content::replace(view, node, attr),
        Directive::Translate => content::translate(view, node, attr),
        Directive::Null => content::null(view, node, attr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_orders_by_table_priority() {
        let (attr_rank, _) = lookup("attr").unwrap();
        let (container_rank, _) = lookup("container").unwrap();
        let (tr_rank, _) = lookup("tr").unwrap();
        assert!(attr_rank < container_rank);
        assert!(container_rank < tr_rank);
    }

    #[test]
    fn test_unknown_token_is_inert() {
        assert!(lookup("section").is_none());
        assert!(lookup("contents").is_none());
        assert!(lookup("param").is_none());
        assert!(lookup("frobnicate").is_none());
    }
}
