//! Expression model - the input tree the compiler resolves into SQL.
//!
//! This module provides a closed set of expression variants with
//! exhaustive pattern matching enforced by the compiler:
//!
//! - [`Path`] - dotted property references
//! - [`DataTarget`] / [`RelationalTarget`] - statement roots with joins
//! - [`Filter`] / [`Sort`] - predicate and ordering trees
//! - [`QueryFunction`] - aggregates and scalar functions
//! - [`Literal`] / [`SqlParameter`] - values
//! - [`SqlExpression`] - raw SQL with positional `?` parameters
//!
//! Every expression must pass [`Expression::validate`] before resolution.

mod filter;
mod function;
mod path;
mod sort;
mod target;
mod value;

pub use filter::{Filter, FilterExt, MatchMode};
pub(crate) use filter::is_null_literal;
pub use function::{
    avg, count, count_star, current_date, current_timestamp, day, func, hour, lower, max, min,
    month, sum, upper, year, FunctionKind, QueryFunction,
};
pub use path::{path, Path};
pub use sort::{Sort, SortDirection};
pub use target::{DataTarget, Join, JoinType, RelationalTarget};
pub use value::{EnumType, EnumValue, LogicalType, StreamHandle, TemporalKind, Value};

use crate::error::{SqlError, SqlResult};
use crate::query::SelectQuery;
use crate::statement::SqlParameter;

// =============================================================================
// Expression
// =============================================================================

/// An expression tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Path(Path),
    DataTarget(DataTarget),
    Target(RelationalTarget),
    Filter(Filter),
    Sort(Sort),
    Function(QueryFunction),
    Literal(Literal),
    Parameter(SqlParameter),
    Sql(SqlExpression),
    /// A nested SELECT compiled in a child context.
    Query(Box<SelectQuery>),
}

/// Variant tag used to key resolvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpressionKind {
    Path,
    DataTarget,
    Target,
    Filter,
    Sort,
    Function,
    Literal,
    Parameter,
    Sql,
    Query,
}

impl Expression {
    pub fn kind(&self) -> ExpressionKind {
        match self {
            Expression::Path(_) => ExpressionKind::Path,
            Expression::DataTarget(_) => ExpressionKind::DataTarget,
            Expression::Target(_) => ExpressionKind::Target,
            Expression::Filter(_) => ExpressionKind::Filter,
            Expression::Sort(_) => ExpressionKind::Sort,
            Expression::Function(_) => ExpressionKind::Function,
            Expression::Literal(_) => ExpressionKind::Literal,
            Expression::Parameter(_) => ExpressionKind::Parameter,
            Expression::Sql(_) => ExpressionKind::Sql,
            Expression::Query(_) => ExpressionKind::Query,
        }
    }

    /// Check required fields. Invalid trees fail before any resolver runs.
    pub fn validate(&self) -> SqlResult<()> {
        match self {
            Expression::Path(p) => p.validate(),
            Expression::DataTarget(t) => t.validate(),
            Expression::Target(t) => t.validate(),
            Expression::Filter(f) => f.validate(),
            Expression::Sort(s) => s.validate(),
            Expression::Function(f) => f.validate(),
            Expression::Literal(l) => l.validate(),
            Expression::Parameter(p) => p.validate(),
            Expression::Sql(s) => s.validate(),
            Expression::Query(q) => q.validate(),
        }
    }
}

// =============================================================================
// Literal
// =============================================================================

/// A constant value, optionally tagged with the temporal kind to bind it as.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub temporal: Option<TemporalKind>,
}

impl Literal {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            temporal: None,
        }
    }

    pub fn temporal(value: impl Into<Value>, kind: TemporalKind) -> Self {
        Self {
            value: value.into(),
            temporal: Some(kind),
        }
    }

    pub fn validate(&self) -> SqlResult<()> {
        if let Value::List(items) = &self.value {
            if items.iter().any(|v| matches!(v, Value::List(_))) {
                return Err(SqlError::invalid("nested list literals are not supported"));
            }
        }
        Ok(())
    }
}

/// Shorthand for a literal expression.
pub fn lit(value: impl Into<Value>) -> Expression {
    Expression::Literal(Literal::new(value))
}

// =============================================================================
// Raw SQL
// =============================================================================

/// Raw SQL text with positional `?` markers bound to `parameters` in order.
///
/// # Security Warning
///
/// **Never pass user input as `text`.** Only the parameters are bound; the
/// text is emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlExpression {
    pub text: String,
    pub parameters: Vec<Value>,
}

impl SqlExpression {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(text: &str, parameters: Vec<Value>) -> Self {
        Self {
            text: text.into(),
            parameters,
        }
    }

    pub fn validate(&self) -> SqlResult<()> {
        if self.text.trim().is_empty() {
            return Err(SqlError::invalid("SQL expression text is empty"));
        }
        Ok(())
    }
}

/// Shorthand for a raw SQL expression.
pub fn raw(text: &str) -> Expression {
    Expression::Sql(SqlExpression::new(text))
}

// =============================================================================
// Conversions
// =============================================================================

/// Anything usable as an operand.
pub trait IntoExpression {
    fn into_expression(self) -> Expression;
}

impl IntoExpression for Expression {
    fn into_expression(self) -> Expression {
        self
    }
}

macro_rules! into_expression {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl IntoExpression for $ty {
                fn into_expression(self) -> Expression {
                    Expression::$variant(self)
                }
            }
        )*
    };
}

into_expression! {
    Path => Path,
    DataTarget => DataTarget,
    RelationalTarget => Target,
    Filter => Filter,
    Sort => Sort,
    QueryFunction => Function,
    Literal => Literal,
    SqlParameter => Parameter,
    SqlExpression => Sql,
}

impl IntoExpression for SelectQuery {
    fn into_expression(self) -> Expression {
        Expression::Query(Box::new(self))
    }
}

macro_rules! value_into_expression {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoExpression for $ty {
                fn into_expression(self) -> Expression {
                    lit(self)
                }
            }
        )*
    };
}

value_into_expression!(
    Value,
    bool,
    i8,
    i16,
    i32,
    i64,
    f32,
    f64,
    i128,
    &str,
    String,
    rust_decimal::Decimal,
    chrono::NaiveDate,
    chrono::NaiveTime,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::FixedOffset>,
    EnumValue,
);

impl<T: Into<Value>> IntoExpression for Vec<T> {
    fn into_expression(self) -> Expression {
        lit(Value::List(self.into_iter().map(Into::into).collect()))
    }
}
