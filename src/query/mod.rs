//! Top-level statements and the compiler that drives them.
//!
//! Each statement resolves its target into a root [`CompositionContext`],
//! renders its clauses through the resolver registry, then hands the SQL with
//! named placeholders to [`crate::statement::prepare`].

mod compiler;
mod delete;
mod insert;
mod select;
mod update;

pub use compiler::{CompiledInsert, CompiledQuery, Compiler};
pub use delete::DeleteStatement;
pub use insert::InsertStatement;
pub use select::{Lock, SelectQuery};
pub use update::UpdateStatement;

pub(crate) use select::{render_select, resolve_source};

use crate::context::CompositionContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expression, Path, RelationalTarget};
use crate::resolve::TargetType;
use crate::token::Token;

/// Check that a DML statement writes to a plain table.
fn validate_dml_target(target: &Expression, statement: &str) -> SqlResult<()> {
    let joins = match target {
        Expression::DataTarget(t) => t.joins.len(),
        Expression::Target(t) => t.joins.len(),
        other => {
            return Err(SqlError::invalid(format!(
                "{statement} target cannot be a {:?} expression",
                other.kind()
            )))
        }
    };
    if joins > 0 {
        return Err(SqlError::invalid(format!("{statement} target cannot have joins")));
    }
    target.validate()
}

/// Resolve a DML target and bind it in `ctx` without an alias.
fn seed_dml_target(target: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Token> {
    let resolved = ctx.resolve(target, TargetType::Relational)?.into_relational()?;
    let table = RelationalTarget {
        alias: None,
        ..resolved
    };
    ctx.seed_unaliased(&table);
    Ok(Token::QualifiedIdent {
        schema: table.schema,
        name: table.table,
    })
}

/// Bare column name for an assignment to the statement's own table.
fn assignment_column(path: &Path, ctx: &CompositionContext<'_>) -> SqlResult<String> {
    path.validate()?;
    if path.parent().is_some() {
        return Err(SqlError::invalid(format!(
            "cannot assign to '{}', only columns of the target table",
            path.key()
        )));
    }
    let entity = ctx.root_binding().and_then(|b| b.entity);
    let mapped = entity
        .as_deref()
        .zip(ctx.data_model())
        .and_then(|(entity, model)| model.column(entity, path.name()));
    Ok(mapped.unwrap_or_else(|| path.name().to_string()))
}

/// Check that an assigned value can be rendered as a column value.
fn validate_assigned_value(value: &Expression) -> SqlResult<()> {
    match value {
        Expression::Path(_)
        | Expression::Function(_)
        | Expression::Literal(_)
        | Expression::Parameter(_)
        | Expression::Sql(_)
        | Expression::Query(_) => value.validate(),
        other => Err(SqlError::invalid(format!(
            "cannot assign a {:?} expression",
            other.kind()
        ))),
    }
}

/// Resolve an assigned value, parenthesizing sub-queries.
fn render_value(value: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<String> {
    let sql = ctx.resolve_sql(value)?;
    Ok(match value {
        Expression::Query(_) => format!("({sql})"),
        _ => sql,
    })
}
