//! DELETE statements.

use super::{seed_dml_target, validate_dml_target};
use crate::context::CompositionContext;
use crate::error::SqlResult;
use crate::expr::{Expression, Filter, IntoExpression};
use crate::token::{Token, TokenStream};

/// `DELETE FROM table [WHERE filter]`.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until compiled"]
pub struct DeleteStatement {
    pub target: Expression,
    pub filter: Option<Filter>,
}

impl DeleteStatement {
    pub fn new(target: impl IntoExpression) -> Self {
        Self {
            target: target.into_expression(),
            filter: None,
        }
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
        validate_dml_target(&self.target, "DELETE")?;
        match &self.filter {
            Some(filter) => filter.validate(),
            None => Ok(()),
        }
    }

    pub(crate) fn render(&self, ctx: &CompositionContext<'_>) -> SqlResult<String> {
        self.validate()?;
        let table = seed_dml_target(&self.target, ctx)?;
        let mut ts = TokenStream::new();
        ts.push(Token::Delete)
            .space()
            .push(Token::From)
            .space()
            .push(table);
        if let Some(filter) = &self.filter {
            let condition = ctx.resolve_sql(&Expression::Filter(filter.clone()))?;
            ts.space().push(Token::Where).space().fragment(condition);
        }
        Ok(ts.serialize(ctx.dialect()))
    }
}
