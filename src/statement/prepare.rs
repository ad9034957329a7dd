//! Placeholder rewriting.

use tracing::debug;

use super::SqlStatement;
use crate::context::{parse_placeholder, CompositionContext, PLACEHOLDER_WIDTH};
use crate::error::{SqlError, SqlResult};
use crate::expr::Expression;
use crate::resolve::TargetType;

/// Rewrite every `:[NNNN]` token in `sql` into the bind marker of the
/// parameter it names.
///
/// A `:` not followed by the exact placeholder shape is copied verbatim, so
/// casts like `::int` and times like `'12:30'` survive. A well-formed token
/// with no accumulator entry fails the whole statement.
pub fn prepare(sql: &str, ctx: &CompositionContext<'_>) -> SqlResult<SqlStatement> {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut parameters = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == ':' && chars.len() - i >= PLACEHOLDER_WIDTH {
            let token: String = chars[i..i + PLACEHOLDER_WIDTH].iter().collect();
            if parse_placeholder(&token).is_some() {
                let parameter = ctx.parameters().get(&token).ok_or_else(|| {
                    SqlError::preparation(format!("no parameter registered for {token}"))
                })?;
                let bound = ctx
                    .resolve(&Expression::Parameter(parameter), TargetType::Bindable)?
                    .into_bindable()?;
                out.push_str(&bound.marker);
                parameters.push(bound.parameter);
                i += PLACEHOLDER_WIDTH;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }
    debug!(parameters = parameters.len(), "prepared statement");
    Ok(SqlStatement::new(out, parameters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::dialect::{Dialect, DialectKind};
    use crate::expr::Value;
    use crate::statement::SqlParameter;

    fn root() -> CompositionContext<'static> {
        CompositionContext::root(Arc::new(Dialect::new(DialectKind::Postgres)))
    }

    #[test]
    fn test_markers_follow_occurrence_order() {
        let ctx = root();
        let a = ctx.add_parameter(SqlParameter::new(1)).unwrap();
        let b = ctx.add_parameter(SqlParameter::new(2)).unwrap();
        let stmt = prepare(&format!("x={b} AND y={a} AND z={b}"), &ctx).unwrap();
        assert_eq!(stmt.sql, "x=? AND y=? AND z=?");
        let values: Vec<_> = stmt.parameters.iter().map(|p| p.value().clone()).collect();
        assert_eq!(values, vec![Value::Int(2), Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_non_placeholder_colons_are_kept() {
        let ctx = root();
        let stmt = prepare("SELECT '12:30', x::int, :[12a4] FROM t", &ctx).unwrap();
        assert_eq!(stmt.sql, "SELECT '12:30', x::int, :[12a4] FROM t");
        assert!(stmt.parameters.is_empty());
    }

    #[test]
    fn test_missing_entry_fails() {
        let ctx = root();
        let err = prepare("x=:[0001]", &ctx).unwrap_err();
        assert!(matches!(err, SqlError::StatementPreparation(_)));
    }

    #[test]
    fn test_short_tail_is_copied() {
        let ctx = root();
        assert_eq!(prepare("a:[00", &ctx).unwrap().sql, "a:[00");
    }
}
