//! INSERT statements.

use super::{assignment_column, render_value, seed_dml_target, validate_assigned_value, validate_dml_target};
use crate::context::CompositionContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::{path, Expression, IntoExpression, Path};
use crate::token::{Token, TokenStream};

/// `INSERT INTO table (columns) VALUES (values)`.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until compiled"]
pub struct InsertStatement {
    pub target: Expression,
    pub values: Vec<(Path, Expression)>,
    /// Columns whose generated values the caller wants back.
    pub generated_keys: Vec<String>,
}

impl InsertStatement {
    pub fn new(target: impl IntoExpression) -> Self {
        Self {
            target: target.into_expression(),
            values: Vec::new(),
            generated_keys: Vec::new(),
        }
    }

    pub fn value(mut self, column: &str, value: impl IntoExpression) -> Self {
        self.values.push((path(column), value.into_expression()));
        self
    }

    /// Ask for generated values of `columns` after execution.
    pub fn returning_keys(mut self, columns: &[&str]) -> Self {
        self.generated_keys = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn validate(&self) -> SqlResult<()> {
        validate_dml_target(&self.target, "INSERT")?;
        if self.values.is_empty() {
            return Err(SqlError::invalid("INSERT has no values"));
        }
        for (column, value) in &self.values {
            column.validate()?;
            validate_assigned_value(value)?;
        }
        Ok(())
    }

    /// Render with named placeholders in a fresh root context.
    pub(crate) fn render(&self, ctx: &CompositionContext<'_>) -> SqlResult<String> {
        self.validate()?;
        let table = seed_dml_target(&self.target, ctx)?;
        let columns = self
            .values
            .iter()
            .map(|(column, _)| assignment_column(column, ctx))
            .collect::<SqlResult<Vec<_>>>()?;
        let values = self
            .values
            .iter()
            .map(|(_, value)| render_value(value, ctx))
            .collect::<SqlResult<Vec<_>>>()?;

        let mut ts = TokenStream::new();
        ts.push(Token::Insert)
            .space()
            .push(Token::Into)
            .space()
            .push(table)
            .space()
            .lparen()
            .comma_separated(columns)
            .rparen()
            .space()
            .push(Token::Values)
            .space()
            .lparen()
            .comma_separated(values)
            .rparen();
        Ok(ts.serialize(ctx.dialect()))
    }
}
