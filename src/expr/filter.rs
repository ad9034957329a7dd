//! Filter tree.
//!
//! A closed set of predicate variants. The translator in
//! [`crate::translate::filter`] matches on every variant exhaustively.

use super::{Expression, IntoExpression, Literal, Path, QueryFunction};
use crate::error::{SqlError, SqlResult};

/// How a string-match filter places wildcards around its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// The value is matched as-is.
    #[default]
    Exact,
    /// `%v%`
    Contains,
    /// `v%`
    StartsWith,
    /// `%v`
    EndsWith,
}

impl MatchMode {
    /// Place wildcards around an already-escaped value.
    pub fn pattern(&self, value: &str) -> String {
        match self {
            MatchMode::Exact => value.to_string(),
            MatchMode::Contains => format!("%{value}%"),
            MatchMode::StartsWith => format!("{value}%"),
            MatchMode::EndsWith => format!("%{value}"),
        }
    }
}

/// A predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Null(Box<Expression>),
    NotNull(Box<Expression>),
    Equal {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    NotEqual {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Greater {
        left: Box<Expression>,
        right: Box<Expression>,
        inclusive: bool,
    },
    Less {
        left: Box<Expression>,
        right: Box<Expression>,
        inclusive: bool,
    },
    In {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    NotIn {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Between {
        operand: Box<Expression>,
        low: Box<Expression>,
        high: Box<Expression>,
    },
    StringMatch {
        operand: Box<Expression>,
        value: String,
        mode: MatchMode,
        ignore_case: bool,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Exists(Box<Expression>),
    NotExists(Box<Expression>),
}

impl Filter {
    /// Conjunction; flattens when `self` is already an `And`.
    pub fn and(self, other: Filter) -> Filter {
        match self {
            Filter::And(mut children) => {
                children.push(other);
                Filter::And(children)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Disjunction; flattens when `self` is already an `Or`.
    pub fn or(self, other: Filter) -> Filter {
        match self {
            Filter::Or(mut children) => {
                children.push(other);
                Filter::Or(children)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    pub fn negate(self) -> Filter {
        Filter::Not(Box::new(self))
    }

    pub fn exists(subquery: impl IntoExpression) -> Filter {
        Filter::Exists(Box::new(subquery.into_expression()))
    }

    pub fn not_exists(subquery: impl IntoExpression) -> Filter {
        Filter::NotExists(Box::new(subquery.into_expression()))
    }

    pub fn validate(&self) -> SqlResult<()> {
        match self {
            Filter::Null(operand) | Filter::NotNull(operand) => operand.validate(),
            Filter::Equal { left, right } | Filter::NotEqual { left, right } => {
                left.validate()?;
                right.validate()
            }
            Filter::Greater { left, right, .. } | Filter::Less { left, right, .. } => {
                left.validate()?;
                if is_null_literal(right) {
                    return Err(SqlError::invalid(
                        "ordering comparison against NULL is never true",
                    ));
                }
                right.validate()
            }
            Filter::In { left, right } | Filter::NotIn { left, right } => {
                left.validate()?;
                if let Expression::Literal(Literal { value, .. }) = right.as_ref() {
                    if matches!(value, super::Value::List(items) if items.is_empty()) {
                        return Err(SqlError::invalid("IN list must not be empty"));
                    }
                }
                right.validate()
            }
            Filter::Between { operand, low, high } => {
                operand.validate()?;
                low.validate()?;
                high.validate()
            }
            Filter::StringMatch { operand, .. } => operand.validate(),
            Filter::And(children) | Filter::Or(children) => {
                if children.is_empty() {
                    return Err(SqlError::invalid("logical filter has no children"));
                }
                children.iter().try_for_each(Filter::validate)
            }
            Filter::Not(child) => child.validate(),
            Filter::Exists(subquery) | Filter::NotExists(subquery) => {
                if !matches!(subquery.as_ref(), Expression::Query(_) | Expression::Sql(_)) {
                    return Err(SqlError::invalid("EXISTS requires a sub-query"));
                }
                subquery.validate()
            }
        }
    }
}

pub(crate) fn is_null_literal(expr: &Expression) -> bool {
    matches!(expr, Expression::Literal(Literal { value, .. }) if value.is_null())
}

// =============================================================================
// Builder DSL
// =============================================================================

/// Fluent predicate constructors on left-hand operands.
///
/// Only operand types implement this; literals go on the right.
pub trait FilterExt: IntoExpression + Sized {
    fn eq(self, right: impl IntoExpression) -> Filter {
        Filter::Equal {
            left: Box::new(self.into_expression()),
            right: Box::new(right.into_expression()),
        }
    }

    fn ne(self, right: impl IntoExpression) -> Filter {
        Filter::NotEqual {
            left: Box::new(self.into_expression()),
            right: Box::new(right.into_expression()),
        }
    }

    fn gt(self, right: impl IntoExpression) -> Filter {
        Filter::Greater {
            left: Box::new(self.into_expression()),
            right: Box::new(right.into_expression()),
            inclusive: false,
        }
    }

    fn gte(self, right: impl IntoExpression) -> Filter {
        Filter::Greater {
            left: Box::new(self.into_expression()),
            right: Box::new(right.into_expression()),
            inclusive: true,
        }
    }

    fn lt(self, right: impl IntoExpression) -> Filter {
        Filter::Less {
            left: Box::new(self.into_expression()),
            right: Box::new(right.into_expression()),
            inclusive: false,
        }
    }

    fn lte(self, right: impl IntoExpression) -> Filter {
        Filter::Less {
            left: Box::new(self.into_expression()),
            right: Box::new(right.into_expression()),
            inclusive: true,
        }
    }

    fn is_null(self) -> Filter {
        Filter::Null(Box::new(self.into_expression()))
    }

    fn is_not_null(self) -> Filter {
        Filter::NotNull(Box::new(self.into_expression()))
    }

    fn in_(self, right: impl IntoExpression) -> Filter {
        Filter::In {
            left: Box::new(self.into_expression()),
            right: Box::new(right.into_expression()),
        }
    }

    fn not_in(self, right: impl IntoExpression) -> Filter {
        Filter::NotIn {
            left: Box::new(self.into_expression()),
            right: Box::new(right.into_expression()),
        }
    }

    fn between(self, low: impl IntoExpression, high: impl IntoExpression) -> Filter {
        Filter::Between {
            operand: Box::new(self.into_expression()),
            low: Box::new(low.into_expression()),
            high: Box::new(high.into_expression()),
        }
    }

    fn matches(self, value: &str, mode: MatchMode, ignore_case: bool) -> Filter {
        Filter::StringMatch {
            operand: Box::new(self.into_expression()),
            value: value.into(),
            mode,
            ignore_case,
        }
    }

    fn contains(self, value: &str) -> Filter {
        self.matches(value, MatchMode::Contains, false)
    }

    fn starts_with(self, value: &str) -> Filter {
        self.matches(value, MatchMode::StartsWith, false)
    }

    fn ends_with(self, value: &str) -> Filter {
        self.matches(value, MatchMode::EndsWith, false)
    }
}

impl FilterExt for Path {}

impl FilterExt for QueryFunction {}

impl FilterExt for Expression {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{lit, path, Value};

    #[test]
    fn test_and_flattens() {
        let f = path("a").eq(1).and(path("b").eq(2)).and(path("c").eq(3));
        match f {
            Filter::And(children) => assert_eq!(children.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_empty_logical() {
        assert!(Filter::Or(vec![]).validate().is_err());
    }

    #[test]
    fn test_validate_ordering_against_null() {
        assert!(path("a").gt(Value::Null).validate().is_err());
        assert!(path("a").eq(Value::Null).validate().is_ok());
    }

    #[test]
    fn test_validate_empty_in_list() {
        let empty = lit(Value::List(vec![]));
        assert!(path("a").in_(empty).validate().is_err());
    }

    #[test]
    fn test_exists_requires_subquery() {
        assert!(Filter::exists(path("a")).validate().is_err());
    }

    #[test]
    fn test_builders_leave_std_methods_alone() {
        let message = String::from("missing :[0002]");
        assert!(message.contains(":[0002]"));
        assert!(message.ends_with("]"));
        assert!(Value::Int(1).eq(&Value::Int(1)));

        let filter = lit(1).eq(path("a"));
        assert!(matches!(filter, Filter::Equal { .. }));
    }

    #[test]
    fn test_match_mode_pattern() {
        assert_eq!(MatchMode::Contains.pattern("oh"), "%oh%");
        assert_eq!(MatchMode::StartsWith.pattern("oh"), "oh%");
        assert_eq!(MatchMode::EndsWith.pattern("oh"), "%oh");
        assert_eq!(MatchMode::Exact.pattern("oh"), "oh");
    }
}
