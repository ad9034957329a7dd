//! Filter translation.
//!
//! Rendering rules:
//!
//! | Filter | SQL |
//! |---|---|
//! | `Null` / `NotNull` | `x IS NULL` / `x IS NOT NULL` |
//! | `Equal` ... `Less` | `x=:[0001]`, `x<>..`, `x>..`, `x>=..`, `x<..`, `x<=..` |
//! | `Equal` / `NotEqual` with a NULL literal | `x IS NULL` / `x IS NOT NULL` |
//! | `In` / `NotIn` | `x IN (..)` / `x NOT IN (..)` |
//! | `Between` | `x BETWEEN a AND b` |
//! | `StringMatch` | `x LIKE :[0001] ESCAPE '!'` |
//! | `And` / `Or` | `(a) AND (b)` / `(a) OR (b)` |
//! | `Not` | `NOT (a)` |
//! | `Exists` / `NotExists` | `EXISTS (..)` / `NOT EXISTS (..)` |

use crate::context::CompositionContext;
use crate::error::SqlResult;
use crate::expr::{is_null_literal, lit, Expression, Filter, FunctionKind, MatchMode};
use crate::token::{Token, TokenStream};

/// Escape character used in `LIKE ... ESCAPE` clauses.
pub const LIKE_ESCAPE: char = '!';

const LIKE_RESERVED: [char; 4] = [LIKE_ESCAPE, '%', '_', '['];

/// Prefix LIKE wildcards and the escape character itself with `!`.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if LIKE_RESERVED.contains(&c) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Translate a validated filter tree into a SQL predicate.
pub fn translate_filter(filter: &Filter, ctx: &CompositionContext<'_>) -> SqlResult<String> {
    let mut ts = TokenStream::new();
    write_filter(filter, ctx, &mut ts)?;
    Ok(ts.serialize(ctx.dialect()))
}

fn write_filter(filter: &Filter, ctx: &CompositionContext<'_>, ts: &mut TokenStream) -> SqlResult<()> {
    match filter {
        Filter::Null(operand) => {
            ts.fragment(ctx.resolve_sql(operand)?).space().push(Token::IsNull);
        }
        Filter::NotNull(operand) => {
            ts.fragment(ctx.resolve_sql(operand)?).space().push(Token::IsNotNull);
        }
        Filter::Equal { left, right } => comparison(ctx, ts, left, right, Token::Eq)?,
        Filter::NotEqual { left, right } => comparison(ctx, ts, left, right, Token::Ne)?,
        Filter::Greater {
            left,
            right,
            inclusive,
        } => {
            let op = if *inclusive { Token::Gte } else { Token::Gt };
            comparison(ctx, ts, left, right, op)?
        }
        Filter::Less {
            left,
            right,
            inclusive,
        } => {
            let op = if *inclusive { Token::Lte } else { Token::Lt };
            comparison(ctx, ts, left, right, op)?
        }
        Filter::In { left, right } => membership(ctx, ts, left, right, false)?,
        Filter::NotIn { left, right } => membership(ctx, ts, left, right, true)?,
        Filter::Between { operand, low, high } => {
            ts.fragment(ctx.resolve_sql(operand)?)
                .space()
                .push(Token::Between)
                .space()
                .fragment(ctx.resolve_sql(low)?)
                .space()
                .push(Token::And)
                .space()
                .fragment(ctx.resolve_sql(high)?);
        }
        Filter::StringMatch {
            operand,
            value,
            mode,
            ignore_case,
        } => string_match(ctx, ts, operand, value, *mode, *ignore_case)?,
        Filter::And(children) => logical(ctx, ts, children, Token::And)?,
        Filter::Or(children) => logical(ctx, ts, children, Token::Or)?,
        Filter::Not(child) => {
            ts.push(Token::Not).space().lparen();
            write_filter(child, ctx, ts)?;
            ts.rparen();
        }
        Filter::Exists(subquery) => {
            ts.push(Token::Exists).space().lparen();
            ts.fragment(ctx.resolve_sql(subquery)?).rparen();
        }
        Filter::NotExists(subquery) => {
            ts.push(Token::Not).space().push(Token::Exists).space().lparen();
            ts.fragment(ctx.resolve_sql(subquery)?).rparen();
        }
    }
    Ok(())
}

fn comparison(
    ctx: &CompositionContext<'_>,
    ts: &mut TokenStream,
    left: &Expression,
    right: &Expression,
    op: Token,
) -> SqlResult<()> {
    ts.fragment(ctx.resolve_sql(left)?);
    if is_null_literal(right) {
        // ordering comparisons against NULL are rejected by validation
        let test = if op == Token::Ne {
            Token::IsNotNull
        } else {
            Token::IsNull
        };
        ts.space().push(test);
        return Ok(());
    }
    ts.push(op).fragment(ctx.resolve_sql(right)?);
    Ok(())
}

fn membership(
    ctx: &CompositionContext<'_>,
    ts: &mut TokenStream,
    left: &Expression,
    right: &Expression,
    negated: bool,
) -> SqlResult<()> {
    ts.fragment(ctx.resolve_sql(left)?).space();
    if negated {
        ts.push(Token::Not).space();
    }
    ts.push(Token::In).space().lparen();
    ts.fragment(ctx.resolve_sql(right)?).rparen();
    Ok(())
}

fn string_match(
    ctx: &CompositionContext<'_>,
    ts: &mut TokenStream,
    operand: &Expression,
    value: &str,
    mode: MatchMode,
    ignore_case: bool,
) -> SqlResult<()> {
    let dialect = ctx.dialect();
    let mut operand_sql = ctx.resolve_sql(operand)?;
    let mut value = value.to_string();
    if ignore_case {
        operand_sql = dialect
            .function(&FunctionKind::Lower)
            .render(&[operand_sql], false);
        value = value.to_lowercase();
    }
    let escape = dialect.supports_like_escape();
    if escape {
        value = escape_like(&value);
    }
    let marker = ctx.resolve_sql(&lit(mode.pattern(&value)))?;
    ts.fragment(operand_sql)
        .space()
        .push(Token::Like)
        .space()
        .fragment(marker);
    if escape {
        ts.space()
            .push(Token::Escape)
            .space()
            .push(Token::LitString(LIKE_ESCAPE.to_string()));
    }
    Ok(())
}

fn logical(
    ctx: &CompositionContext<'_>,
    ts: &mut TokenStream,
    children: &[Filter],
    op: Token,
) -> SqlResult<()> {
    ts.lparen();
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            ts.rparen().space().push(op.clone()).space().lparen();
        }
        write_filter(child, ctx, ts)?;
    }
    ts.rparen();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("oh"), "oh");
        assert_eq!(escape_like("50%_off!"), "50!%!_off!!");
        assert_eq!(escape_like("[a]"), "![a]");
    }
}
