//! Query functions (aggregates, case folding, date parts).

use super::{Expression, IntoExpression};
use crate::error::{SqlError, SqlResult};

/// Functions with a default rendering in every dialect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    Count,
    Avg,
    Min,
    Max,
    Sum,
    Lower,
    Upper,
    CurrentDate,
    CurrentTimestamp,
    Year,
    Month,
    Day,
    Hour,
    /// Any other function, rendered as `NAME(args)` after dialect remapping.
    Custom(String),
}

impl FunctionKind {
    pub fn name(&self) -> &str {
        match self {
            FunctionKind::Count => "COUNT",
            FunctionKind::Avg => "AVG",
            FunctionKind::Min => "MIN",
            FunctionKind::Max => "MAX",
            FunctionKind::Sum => "SUM",
            FunctionKind::Lower => "LOWER",
            FunctionKind::Upper => "UPPER",
            FunctionKind::CurrentDate => "CURRENT_DATE",
            FunctionKind::CurrentTimestamp => "CURRENT_TIMESTAMP",
            FunctionKind::Year => "YEAR",
            FunctionKind::Month => "MONTH",
            FunctionKind::Day => "DAY",
            FunctionKind::Hour => "HOUR",
            FunctionKind::Custom(name) => name,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            FunctionKind::Count
                | FunctionKind::Avg
                | FunctionKind::Min
                | FunctionKind::Max
                | FunctionKind::Sum
        )
    }

    /// Accepted argument counts, `None` when unconstrained.
    fn arity(&self) -> Option<std::ops::RangeInclusive<usize>> {
        match self {
            FunctionKind::Count => Some(0..=1),
            FunctionKind::CurrentDate | FunctionKind::CurrentTimestamp => Some(0..=0),
            FunctionKind::Custom(_) => None,
            _ => Some(1..=1),
        }
    }
}

/// A function applied to argument expressions.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct QueryFunction {
    pub kind: FunctionKind,
    pub args: Vec<Expression>,
    pub distinct: bool,
}

impl QueryFunction {
    pub fn new(kind: FunctionKind, args: Vec<Expression>) -> Self {
        Self {
            kind,
            args,
            distinct: false,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn validate(&self) -> SqlResult<()> {
        if let FunctionKind::Custom(name) = &self.kind {
            if name.trim().is_empty() {
                return Err(SqlError::invalid("function name must not be empty"));
            }
        }
        if let Some(arity) = self.kind.arity() {
            if !arity.contains(&self.args.len()) {
                return Err(SqlError::invalid(format!(
                    "{} takes {:?} arguments, got {}",
                    self.kind.name(),
                    arity,
                    self.args.len()
                )));
            }
        }
        if self.distinct && !self.kind.is_aggregate() {
            return Err(SqlError::invalid(format!(
                "DISTINCT is only valid on aggregates, not {}",
                self.kind.name()
            )));
        }
        self.args.iter().try_for_each(Expression::validate)
    }
}

fn unary(kind: FunctionKind, arg: impl IntoExpression) -> QueryFunction {
    QueryFunction::new(kind, vec![arg.into_expression()])
}

/// COUNT(*)
pub fn count_star() -> QueryFunction {
    QueryFunction::new(FunctionKind::Count, Vec::new())
}

pub fn count(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Count, arg)
}

pub fn avg(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Avg, arg)
}

pub fn min(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Min, arg)
}

pub fn max(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Max, arg)
}

pub fn sum(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Sum, arg)
}

pub fn lower(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Lower, arg)
}

pub fn upper(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Upper, arg)
}

pub fn year(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Year, arg)
}

pub fn month(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Month, arg)
}

pub fn day(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Day, arg)
}

pub fn hour(arg: impl IntoExpression) -> QueryFunction {
    unary(FunctionKind::Hour, arg)
}

pub fn current_date() -> QueryFunction {
    QueryFunction::new(FunctionKind::CurrentDate, Vec::new())
}

pub fn current_timestamp() -> QueryFunction {
    QueryFunction::new(FunctionKind::CurrentTimestamp, Vec::new())
}

/// Any function by name.
pub fn func(name: &str, args: Vec<Expression>) -> QueryFunction {
    QueryFunction::new(FunctionKind::Custom(name.into()), args)
}
