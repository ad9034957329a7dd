//! Sort specifications.

use super::{Expression, IntoExpression};
use crate::error::{SqlError, SqlResult};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// A single ordering term or an ordered group of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Sort {
    Path {
        expr: Box<Expression>,
        direction: SortDirection,
    },
    Composite(Vec<Sort>),
}

impl Sort {
    pub fn asc(expr: impl IntoExpression) -> Self {
        Sort::Path {
            expr: Box::new(expr.into_expression()),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(expr: impl IntoExpression) -> Self {
        Sort::Path {
            expr: Box::new(expr.into_expression()),
            direction: SortDirection::Desc,
        }
    }

    /// Append another term, keeping declaration order.
    pub fn then(self, next: Sort) -> Sort {
        match self {
            Sort::Composite(mut sorts) => {
                sorts.push(next);
                Sort::Composite(sorts)
            }
            first => Sort::Composite(vec![first, next]),
        }
    }

    /// Leaf terms in declaration order, with nested composites flattened.
    pub fn flatten(&self) -> Vec<(&Expression, SortDirection)> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<(&'a Expression, SortDirection)>) {
        match self {
            Sort::Path { expr, direction } => out.push((expr, *direction)),
            Sort::Composite(sorts) => sorts.iter().for_each(|s| s.collect(out)),
        }
    }

    pub fn validate(&self) -> SqlResult<()> {
        match self {
            Sort::Path { expr, .. } => match expr.as_ref() {
                Expression::Path(_) | Expression::Function(_) | Expression::Sql(_) => {
                    expr.validate()
                }
                other => Err(SqlError::invalid(format!(
                    "cannot sort by {:?} expression",
                    other.kind()
                ))),
            },
            Sort::Composite(sorts) => {
                if sorts.is_empty() {
                    return Err(SqlError::invalid("composite sort has no terms"));
                }
                sorts.iter().try_for_each(Sort::validate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::path;

    #[test]
    fn test_flatten_preserves_order() {
        let nested = Sort::Composite(vec![
            Sort::asc(path("a")),
            Sort::Composite(vec![Sort::desc(path("b")), Sort::asc(path("c"))]),
        ]);
        let names: Vec<_> = nested
            .flatten()
            .into_iter()
            .map(|(e, d)| match e {
                Expression::Path(p) => (p.key(), d),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(
            names,
            vec![
                ("a".to_string(), SortDirection::Asc),
                ("b".to_string(), SortDirection::Desc),
                ("c".to_string(), SortDirection::Asc),
            ]
        );
    }

    #[test]
    fn test_empty_composite_invalid() {
        assert!(Sort::Composite(vec![]).validate().is_err());
    }
}
