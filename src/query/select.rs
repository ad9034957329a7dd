//! SELECT statements.

use tracing::warn;

use crate::context::CompositionContext;
use crate::dialect::LockMode;
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expression, Filter, IntoExpression, RelationalTarget, Sort};
use crate::projection::{select_list, ProjectedColumn, Projection};
use crate::resolve::TargetType;
use crate::token::{Token, TokenStream};

/// Row lock requested by a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lock {
    pub mode: LockMode,
    /// `Some(0)` fails immediately where the dialect can express it.
    pub timeout_ms: Option<u64>,
}

/// A SELECT over one data target.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until compiled"]
pub struct SelectQuery {
    pub source: Expression,
    pub distinct: bool,
    pub projection: Option<Projection>,
    pub filter: Option<Filter>,
    pub sort: Option<Sort>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub lock: Option<Lock>,
}

impl SelectQuery {
    /// Select from a `DataTarget` or `RelationalTarget`.
    pub fn new(source: impl IntoExpression) -> Self {
        Self {
            source: source.into_expression(),
            distinct: false,
            projection: None,
            filter: None,
            sort: None,
            limit: None,
            offset: None,
            lock: None,
        }
    }

    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
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

    pub fn order_by(mut self, sort: Sort) -> Self {
        self.sort = Some(match self.sort.take() {
            Some(existing) => existing.then(sort),
            None => sort,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn lock(mut self, mode: LockMode, timeout_ms: Option<u64>) -> Self {
        self.lock = Some(Lock { mode, timeout_ms });
        self
    }

    pub fn validate(&self) -> SqlResult<()> {
        match &self.source {
            Expression::DataTarget(_) | Expression::Target(_) => self.source.validate()?,
            other => {
                return Err(SqlError::invalid(format!(
                    "a query cannot select from a {:?} expression",
                    other.kind()
                )))
            }
        }
        if self.offset.is_some() && self.limit.is_none() {
            return Err(SqlError::invalid("offset requires a limit"));
        }
        if let Some(projection) = &self.projection {
            projection.validate()?;
        }
        if let Some(filter) = &self.filter {
            filter.validate()?;
        }
        if let Some(sort) = &self.sort {
            sort.validate()?;
        }
        Ok(())
    }
}

/// SELECT text with its placeholders still named.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RenderedSelect {
    pub sql: String,
    pub columns: Vec<ProjectedColumn>,
}

/// Resolve the query's source to the table it reads.
pub(crate) fn resolve_source(
    query: &SelectQuery,
    ctx: &CompositionContext<'_>,
) -> SqlResult<RelationalTarget> {
    ctx.resolve(&query.source, TargetType::Relational)?
        .into_relational()
}

/// Render a SELECT in a context already seeded with `target`.
pub(crate) fn render_select(
    query: &SelectQuery,
    target: &RelationalTarget,
    ctx: &CompositionContext<'_>,
) -> SqlResult<RenderedSelect> {
    query.validate()?;
    let dialect = ctx.dialect();
    let from = ctx.resolve_sql(&Expression::Target(target.clone()))?;
    let columns = match &query.projection {
        Some(projection) => projection.render(ctx)?,
        None => Vec::new(),
    };

    let mut ts = TokenStream::new();
    ts.push(Token::Select).space();
    if query.distinct {
        ts.push(Token::Distinct).space();
    }
    ts.append(select_list(&columns))
        .space()
        .push(Token::From)
        .space()
        .fragment(from);
    if let Some(filter) = &query.filter {
        let condition = ctx.resolve_sql(&Expression::Filter(filter.clone()))?;
        ts.space().push(Token::Where).space().fragment(condition);
    }
    if let Some(sort) = &query.sort {
        let order = ctx.resolve_sql(&Expression::Sort(sort.clone()))?;
        ts.space().push(Token::OrderBy).space().fragment(order);
    }
    let mut sql = ts.serialize(dialect);

    if let Some(limit) = query.limit {
        let offset = match query.offset {
            Some(offset) => i64::try_from(offset)
                .map_err(|_| SqlError::invalid(format!("offset {offset} is out of range")))?,
            None => -1,
        };
        sql = dialect.limit_offset_ordered(&sql, limit, offset, query.sort.is_some())?;
    }

    if let Some(lock) = query.lock {
        match dialect.lock_clause(lock.mode, lock.timeout_ms) {
            Ok(clause) => {
                sql.push(' ');
                sql.push_str(&clause);
            }
            Err(err @ SqlError::UnsupportedDialectFeature { .. }) => {
                warn!(dialect = dialect.name(), error = %err, "lock not expressible, omitting");
            }
            Err(err) => return Err(err),
        }
    }

    Ok(RenderedSelect { sql, columns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::dialect::{Dialect, DialectKind};
    use crate::expr::{path, FilterExt};

    fn render(kind: DialectKind, query: &SelectQuery) -> SqlResult<String> {
        let ctx = CompositionContext::root(Arc::new(Dialect::new(kind)));
        let target = resolve_source(query, &ctx)?;
        ctx.seed_target(&target);
        render_select(query, &target, &ctx).map(|r| r.sql)
    }

    #[test]
    fn test_select_star_with_filter_and_sort() {
        let query = SelectQuery::new(RelationalTarget::new("person").with_alias("p"))
            .filter(path("age").gte(18))
            .order_by(Sort::desc(path("age")));
        assert_eq!(
            render(DialectKind::Postgres, &query).unwrap(),
            "SELECT * FROM person p WHERE p.age>=:[0001] ORDER BY p.age DESC"
        );
    }

    #[test]
    fn test_filters_are_and_combined() {
        let query = SelectQuery::new(RelationalTarget::new("person"))
            .filter(path("age").gte(18))
            .filter(path("active").eq(true));
        assert!(matches!(query.filter, Some(Filter::And(ref children)) if children.len() == 2));
    }

    #[test]
    fn test_offset_without_limit_is_invalid() {
        let query = SelectQuery::new(RelationalTarget::new("person")).offset(5);
        assert!(query.validate().unwrap_err().is_invalid());
    }

    #[test]
    fn test_limit_without_handler_is_unsupported() {
        let query = SelectQuery::new(RelationalTarget::new("person")).limit(5);
        let err = render(DialectKind::Ansi, &query).unwrap_err();
        assert!(matches!(err, SqlError::UnsupportedDialectFeature { .. }));
    }

    #[test]
    fn test_unsupported_lock_is_omitted() {
        let query = SelectQuery::new(RelationalTarget::new("person")).lock(LockMode::Shared, None);
        assert_eq!(render(DialectKind::Ansi, &query).unwrap(), "SELECT * FROM person");
        let query = query.lock(LockMode::Exclusive, Some(0));
        assert_eq!(
            render(DialectKind::Ansi, &query).unwrap(),
            "SELECT * FROM person FOR UPDATE NOWAIT"
        );
    }

    #[test]
    fn test_source_must_be_a_target() {
        let query = SelectQuery::new(path("age"));
        assert!(query.validate().unwrap_err().is_invalid());
    }
}
