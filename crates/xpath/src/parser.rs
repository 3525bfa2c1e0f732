//! A `nom`-based parser for the path-expression subset.

use super::ast::*;
use crate::error::PathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::{map, opt, peek, recognize},
    multi::{many0, separated_list0},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
};

// --- Main Public Parser ---

pub fn parse_expression(input: &str) -> Result<Expression, PathError> {
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(PathError::PathParse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(PathError::PathParse(input.to_string(), e.to_string())),
    }
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn build_binary_expr_parser<'a, F, G>(
    sub_expr_parser: F,
    op_parser: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, Expression>
where
    F: Parser<&'a str, Output = Expression, Error = nom::error::Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = BinaryOperator, Error = nom::error::Error<&'a str>> + Clone,
{
    move |input: &str| {
        let (input, mut left) = sub_expr_parser.clone().parse(input)?;
        let (input, remainder) =
            many0(pair(ws(op_parser.clone()), sub_expr_parser.clone())).parse(input)?;

        for (op, right) in remainder {
            left = Expression::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok((input, left))
    }
}

// --- Expression Parsers (in order of precedence) ---

fn expression(input: &str) -> IResult<&str, Expression> {
    or_expr(input)
}

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(tag("or"), |_| BinaryOperator::Or).parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(tag("and"), |_| BinaryOperator::And).parse(input)
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(and_expr, or_op)(input)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(equality_expr, and_op)(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("="), |_| BinaryOperator::Equals),
        map(tag("!="), |_| BinaryOperator::NotEquals),
    ))
    .parse(input)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(path_expr, equality_op)(input)
}

/// The core parser handling the ambiguity between location paths and other
/// primary expressions.
fn path_expr(input: &str) -> IResult<&str, Expression> {
    // Try primary expressions FIRST, because a function call like `position()`
    // is a primary expression, but the more general `location_path` parser
    // might incorrectly parse `position` as a step name before the
    // `function_call` parser gets a chance to see the `()`.
    alt((primary_expr, map(location_path, Expression::LocationPath))).parse(input)
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    ws(alt((
        map(double, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        delimited(ws(char('(')), expression, ws(char(')'))),
    )))
    .parse(input)
}

// --- Literal Parsers ---
fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

// --- Name and NodeTest Parsers ---

/// A name test. Directive attribute names embed dots (`data-v.include`), so
/// '.' is a legal name character after the leading alphabetic.
fn name_test(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(|c: char| c.is_alphanumeric() || c == '_' || c == '-' || c == '.' || c == ':'),
    ))
    .parse(input)
}

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    map(
        terminated(
            alt((tag("text"), tag("node"), tag("comment"))),
            pair(ws(char('(')), ws(char(')'))),
        ),
        |node_type: &str| match node_type {
            "text" => NodeTest::NodeType(NodeTypeTest::Text),
            "comment" => NodeTest::NodeType(NodeTypeTest::Comment),
            _ => NodeTest::NodeType(NodeTypeTest::Node),
        },
    )
    .parse(input)
}

pub fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        map(tag("*"), |_| NodeTest::Wildcard),
        node_type_test,
        map(name_test, |s| NodeTest::Name(s.to_string())),
    ))
    .parse(input)
}

// --- Path Parsers ---
fn axis(input: &str) -> IResult<&str, Axis> {
    map(
        pair(
            alt((
                tag("child"),
                tag("descendant-or-self"),
                tag("descendant"),
                tag("attribute"),
                tag("parent"),
                tag("self"),
            )),
            tag("::"),
        ),
        |(axis_str, _)| match axis_str {
            "descendant-or-self" => Axis::DescendantOrSelf,
            "descendant" => Axis::Descendant,
            "attribute" => Axis::Attribute,
            "parent" => Axis::Parent,
            "self" => Axis::SelfAxis,
            _ => Axis::Child,
        },
    )
    .parse(input)
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    let (i, (axis, node_test)) = alt((
        map(tag("."), |_| {
            (Axis::SelfAxis, NodeTest::Name(".".to_string()))
        }),
        map(preceded(char('@'), node_test), |nt| (Axis::Attribute, nt)),
        map(pair(opt(axis), node_test), |(ax, nt)| {
            (ax.unwrap_or(Axis::Child), nt)
        }),
    ))
    .parse(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    Ok((
        i,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

fn descendant_step() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        node_test: NodeTest::NodeType(NodeTypeTest::Node),
        predicates: vec![],
    }
}

fn location_path(input: &str) -> IResult<&str, LocationPath> {
    let (i, (is_absolute, mut steps)) =
        if let Ok((rem, _)) = tag::<&str, &str, nom::error::Error<&str>>("//")(input) {
            let (rem, first) = step(rem)?;
            (rem, (true, vec![descendant_step(), first]))
        } else if let Ok((rem, _)) = tag::<&str, &str, nom::error::Error<&str>>("/")(input) {
            if let Ok((rem, first)) = step(rem) {
                (rem, (true, vec![first]))
            } else {
                // A path that is just "/".
                (rem, (true, vec![]))
            }
        } else {
            let (rem, first) = step(input)?;
            (rem, (false, vec![first]))
        };

    // After the first step, subsequent steps MUST be preceded by / or //.
    let (i, remainder) = many0(pair(alt((tag("//"), tag("/"))), step)).parse(i)?;

    for (sep, next_step) in remainder {
        if sep == "//" {
            steps.push(descendant_step());
        }
        steps.push(next_step);
    }

    Ok((i, LocationPath { is_absolute, steps }))
}

// --- Function Call Parser ---
fn function_call(input: &str) -> IResult<&str, Expression> {
    // A function call must be a name followed by '('. The lookahead avoids
    // parsing a simple step name (like 'foo' in 'foo/bar') as a function.
    let (i, name) = name_test(input)?;
    let (i, _) = peek(ws(char('('))).parse(i)?;

    // Node-type tests like text() are not functions; they are handled by the
    // step parser. If the name is a node type test, fail this parser.
    if name == "text" || name == "node" || name == "comment" {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    let (i, _) = multispace0(i)?;
    let (i, args) = delimited(
        char('('),
        separated_list0(ws(char(',')), expression),
        char(')'),
    )
    .parse(i)?;

    Ok((
        i,
        Expression::FunctionCall {
            name: name.to_string(),
            args,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_path() {
        let result = parse_expression("foo/bar").unwrap();
        assert_eq!(
            result,
            Expression::LocationPath(LocationPath {
                is_absolute: false,
                steps: vec![
                    Step {
                        axis: Axis::Child,
                        node_test: NodeTest::Name("foo".into()),
                        predicates: vec![]
                    },
                    Step {
                        axis: Axis::Child,
                        node_test: NodeTest::Name("bar".into()),
                        predicates: vec![]
                    },
                ]
            })
        );
    }

    #[test]
    fn test_parse_dotted_attribute_name() {
        let result = parse_expression("./@data-v.container").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps.len(), 2);
            assert_eq!(lp.steps[1].axis, Axis::Attribute);
            assert_eq!(
                lp.steps[1].node_test,
                NodeTest::Name("data-v.container".to_string())
            );
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_directive_scan_query() {
        // The scanner's main query: elements carrying >=1 prefixed attribute.
        let result = parse_expression("//*[@*[starts-with(name(),'data-v.')]]").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert!(lp.is_absolute);
            assert_eq!(lp.steps.len(), 2);
            let elem_step = &lp.steps[1];
            assert_eq!(elem_step.node_test, NodeTest::Wildcard);
            assert_eq!(elem_step.predicates.len(), 1);
            // The predicate is itself a path with an attribute wildcard step.
            if let Expression::LocationPath(inner) = &elem_step.predicates[0] {
                assert_eq!(inner.steps[0].axis, Axis::Attribute);
                assert_eq!(inner.steps[0].predicates.len(), 1);
            } else {
                panic!("Expected inner location path predicate");
            }
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_tidy_query_with_exclusion() {
        let expr =
            "./@*[starts-with(name(),'data-v.') and name() != 'data-v.section']";
        let result = parse_expression(expr).unwrap();
        if let Expression::LocationPath(lp) = result {
            let step = &lp.steps[1];
            assert_eq!(step.axis, Axis::Attribute);
            assert_eq!(step.node_test, NodeTest::Wildcard);
            assert!(matches!(
                step.predicates[0],
                Expression::BinaryOp {
                    op: BinaryOperator::And,
                    ..
                }
            ));
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_numeric_predicate() {
        let result = parse_expression("./*[1]").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps.len(), 2);
            assert_eq!(lp.steps[1].node_test, NodeTest::Wildcard);
            assert_eq!(lp.steps[1].predicates, vec![Expression::Number(1.0)]);
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_predicate_by_attribute_value() {
        let result = parse_expression("//*[@data-v.section='main']").unwrap();
        if let Expression::LocationPath(lp) = result {
            let pred = &lp.steps[1].predicates[0];
            assert!(matches!(
                pred,
                Expression::BinaryOp {
                    op: BinaryOperator::Equals,
                    ..
                }
            ));
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_abbreviated_step() {
        let result = parse_expression(".").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps.len(), 1);
            assert_eq!(lp.steps[0].node_test, NodeTest::Name(".".to_string()));
            assert_eq!(lp.steps[0].axis, Axis::SelfAxis);
        } else {
            panic!("Expected location path for '.'");
        }
    }

    #[test]
    fn test_parse_text_node_test() {
        let result = parse_expression("foo/text()").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert_eq!(lp.steps.len(), 2);
            assert_eq!(
                lp.steps[1].node_test,
                NodeTest::NodeType(NodeTypeTest::Text)
            );
        } else {
            panic!("Expected location path");
        }
    }

    #[test]
    fn test_parse_descendant_or_self() {
        let result = parse_expression("//foo").unwrap();
        assert_eq!(
            result,
            Expression::LocationPath(LocationPath {
                is_absolute: true,
                steps: vec![
                    descendant_step(),
                    Step {
                        axis: Axis::Child,
                        node_test: NodeTest::Name("foo".into()),
                        predicates: vec![]
                    },
                ]
            })
        );
    }

    #[test]
    fn test_parse_root_element_attribute() {
        let result = parse_expression("/*/@data-v.container").unwrap();
        if let Expression::LocationPath(lp) = result {
            assert!(lp.is_absolute);
            assert_eq!(lp.steps.len(), 2);
            assert_eq!(lp.steps[0].node_test, NodeTest::Wildcard);
            assert_eq!(lp.steps[1].axis, Axis::Attribute);
        } else {
            panic!("Expected location path");
        }
    }
}
