//! Sort translation.

use crate::context::CompositionContext;
use crate::error::SqlResult;
use crate::expr::Sort;
use crate::token::TokenStream;

/// Translate a sort into a comma-separated ORDER BY list.
///
/// Nested composites are flattened in declaration order.
pub fn translate_sort(sort: &Sort, ctx: &CompositionContext<'_>) -> SqlResult<String> {
    let terms = sort
        .flatten()
        .into_iter()
        .map(|(expr, direction)| Ok(format!("{} {}", ctx.resolve_sql(expr)?, direction.keyword())))
        .collect::<SqlResult<Vec<_>>>()?;
    let mut ts = TokenStream::new();
    ts.comma_separated(terms);
    Ok(ts.serialize(ctx.dialect()))
}
