//! UPDATE statements.

use super::{assignment_column, render_value, seed_dml_target, validate_assigned_value, validate_dml_target};
use crate::context::CompositionContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::{path, Expression, Filter, IntoExpression, Path};
use crate::token::{Token, TokenStream};

/// `UPDATE table SET column=value, ... [WHERE filter]`.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until compiled"]
pub struct UpdateStatement {
    pub target: Expression,
    pub assignments: Vec<(Path, Expression)>,
    pub filter: Option<Filter>,
}

impl UpdateStatement {
    pub fn new(target: impl IntoExpression) -> Self {
        Self {
            target: target.into_expression(),
            assignments: Vec::new(),
            filter: None,
        }
    }

    pub fn set(mut self, column: &str, value: impl IntoExpression) -> Self {
        self.assignments.push((path(column), value.into_expression()));
        self
    }

    /// Add a predicate, AND-ed with any existing one.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    pub fn validate(&self) -> SqlResult<()> {
        validate_dml_target(&self.target, "UPDATE")?;
        if self.assignments.is_empty() {
            return Err(SqlError::invalid("UPDATE has no assignments"));
        }
        for (column, value) in &self.assignments {
            column.validate()?;
            validate_assigned_value(value)?;
        }
        if let Some(filter) = &self.filter {
            filter.validate()?;
        }
        Ok(())
    }

    pub(crate) fn render(&self, ctx: &CompositionContext<'_>) -> SqlResult<String> {
        self.validate()?;
        let table = seed_dml_target(&self.target, ctx)?;
        let assignments = self
            .assignments
            .iter()
            .map(|(column, value)| {
                let column = assignment_column(column, ctx)?;
                let value = render_value(value, ctx)?;
                let mut ts = TokenStream::new();
                ts.push(Token::Ident(column)).push(Token::Eq).fragment(value);
                Ok(ts.serialize(ctx.dialect()))
            })
            .collect::<SqlResult<Vec<_>>>()?;

        let mut ts = TokenStream::new();
        ts.push(Token::Update)
            .space()
            .push(table)
            .space()
            .push(Token::Set)
            .space()
            .comma_separated(assignments);
        if let Some(filter) = &self.filter {
            let condition = ctx.resolve_sql(&Expression::Filter(filter.clone()))?;
            ts.space().push(Token::Where).space().fragment(condition);
        }
        Ok(ts.serialize(ctx.dialect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::dialect::{Dialect, DialectKind};
    use crate::expr::{lit, FilterExt, RelationalTarget, Value};

    #[test]
    fn test_update_with_filter() {
        let ctx = CompositionContext::root(Arc::new(Dialect::new(DialectKind::MySql)));
        let update = UpdateStatement::new(RelationalTarget::new("person").with_alias("p"))
            .set("age", 32)
            .set("nickname", lit(Value::Null))
            .filter(path("id").eq(7));
        assert_eq!(
            update.render(&ctx).unwrap(),
            "UPDATE person SET age=:[0001], nickname=:[0002] WHERE person.id=:[0003]"
        );
        assert_eq!(ctx.parameters().len(), 3);
    }

    #[test]
    fn test_update_requires_assignments() {
        let update = UpdateStatement::new(RelationalTarget::new("person"));
        assert!(update.validate().unwrap_err().is_invalid());
    }
}
