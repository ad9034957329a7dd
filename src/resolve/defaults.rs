//! Built-in resolvers.
//!
//! One resolver per `(variant, target)` pair, all at priority 0 so that
//! dialect resolvers registered above them take precedence.

use std::sync::Arc;

use super::{BoundParameter, Resolved, Resolver, TargetType};
use crate::context::CompositionContext;
use crate::error::{SqlError, SqlResult};
use crate::expr::{Expression, ExpressionKind, Join, Literal, RelationalTarget, Value};
use crate::query::{render_select, resolve_source};
use crate::statement::SqlParameter;
use crate::token::{Token, TokenStream};
use crate::translate::{translate_filter, translate_sort};

macro_rules! resolver {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $kind:ident => $target:ident, $body:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy)]
        pub struct $ty;

        impl Resolver for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn accepts(&self) -> ExpressionKind {
                ExpressionKind::$kind
            }

            fn target(&self) -> TargetType {
                TargetType::$target
            }

            fn resolve(
                &self,
                expr: &Expression,
                ctx: &CompositionContext<'_>,
            ) -> SqlResult<Option<Resolved>> {
                $body(expr, ctx)
            }
        }
    };
}

/// The built-in resolvers in registration order.
pub fn default_resolvers() -> Vec<Arc<dyn Resolver>> {
    vec![
        Arc::new(PathResolver),
        Arc::new(DataTargetResolver),
        Arc::new(DataTargetSqlResolver),
        Arc::new(TargetResolver),
        Arc::new(TargetSqlResolver),
        Arc::new(FilterResolver),
        Arc::new(SortResolver),
        Arc::new(FunctionResolver),
        Arc::new(LiteralParameterResolver),
        Arc::new(LiteralSqlResolver),
        Arc::new(ParameterSqlResolver),
        Arc::new(ParameterBindableResolver),
        Arc::new(SqlExpressionResolver),
        Arc::new(QueryResolver),
    ]
}

// =============================================================================
// Paths and targets
// =============================================================================

resolver!(
    /// Qualified column reference: `alias.column`.
    PathResolver, "path", Path => Sql, path_sql
);

fn path_sql(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    let Expression::Path(path) = expr else {
        return Ok(None);
    };
    let (binding, qualifier) = match path.parent() {
        None => {
            let binding = ctx.root_binding();
            let qualifier = binding.as_ref().map(|b| b.qualifier().to_string());
            (binding, qualifier)
        }
        Some(parent) => {
            let binding = ctx.binding(&parent.key(), true);
            let qualifier = ctx
                .alias(parent, true)
                .or_else(|| binding.as_ref().map(|b| b.qualifier().to_string()))
                .unwrap_or_else(|| parent.key());
            (binding, Some(qualifier))
        }
    };
    let column = binding
        .as_ref()
        .and_then(|b| b.entity.as_deref())
        .zip(ctx.data_model())
        .and_then(|(entity, model)| model.column(entity, path.name()))
        .unwrap_or_else(|| path.name().to_string());
    let sql = match qualifier {
        Some(q) => format!("{q}.{column}"),
        None => column,
    };
    Ok(Some(Resolved::Sql(sql)))
}

resolver!(
    /// Entity to table through the data model; names pass through without one.
    DataTargetResolver, "data-target", DataTarget => Relational, data_target_relational
);

fn data_target_relational(
    expr: &Expression,
    ctx: &CompositionContext<'_>,
) -> SqlResult<Option<Resolved>> {
    let Expression::DataTarget(target) = expr else {
        return Ok(None);
    };
    let model = ctx.data_model();
    let table = model.and_then(|m| m.table(&target.entity));
    let joins = target
        .joins
        .iter()
        .map(|join| {
            let source = match model.and_then(|m| m.table(&join.source)) {
                Some(mapped) => match mapped.schema {
                    Some(schema) => format!("{schema}.{}", mapped.table),
                    None => mapped.table,
                },
                None => join.source.clone(),
            };
            Join {
                source,
                entity: Some(join.source.clone()),
                ..join.clone()
            }
        })
        .collect();
    let (schema, table) = match table {
        Some(mapped) => (mapped.schema, mapped.table),
        None => (None, target.entity.clone()),
    };
    Ok(Some(Resolved::Relational(RelationalTarget {
        schema,
        table,
        alias: target.alias.clone(),
        joins,
        entity: Some(target.entity.clone()),
    })))
}

resolver!(
    /// Resolves to a relational target first, then renders that.
    DataTargetSqlResolver, "data-target-sql", DataTarget => Sql, data_target_sql
);

fn data_target_sql(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    let target = ctx.resolve(expr, TargetType::Relational)?.into_relational()?;
    ctx.resolve(&Expression::Target(target), TargetType::Sql).map(Some)
}

resolver!(TargetResolver, "target", Target => Relational, target_relational);

fn target_relational(expr: &Expression, _ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    match expr {
        Expression::Target(target) => Ok(Some(Resolved::Relational(target.clone()))),
        _ => Ok(None),
    }
}

resolver!(
    /// FROM-clause body: `table alias JOIN ... ON ...`.
    TargetSqlResolver, "target-sql", Target => Sql, target_sql
);

fn target_sql(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    let Expression::Target(target) = expr else {
        return Ok(None);
    };
    ctx.seed_target(target);
    let mut ts = TokenStream::new();
    ts.push(Token::QualifiedIdent {
        schema: target.schema.clone(),
        name: target.table.clone(),
    });
    if let Some(alias) = ctx.root_binding().and_then(|b| b.alias) {
        ts.space().push(Token::Ident(alias));
    }
    for join in &target.joins {
        let binding = ctx
            .binding(&join.name, false)
            .ok_or_else(|| SqlError::invalid(format!("join '{}' is not bound", join.name)))?;
        ts.space()
            .push(Token::Join(join.join_type))
            .space()
            .push(Token::Ident(binding.table.clone()));
        if let Some(alias) = binding.alias {
            ts.space().push(Token::Ident(alias));
        }
        if let Some(on) = &join.on {
            let condition = ctx.resolve_sql(&Expression::Filter(on.clone()))?;
            ts.space().push(Token::On).space().fragment(condition);
        }
    }
    Ok(Some(Resolved::Sql(ts.serialize(ctx.dialect()))))
}

// =============================================================================
// Filters, sorts and functions
// =============================================================================

resolver!(FilterResolver, "filter", Filter => Sql, filter_sql);

fn filter_sql(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    match expr {
        Expression::Filter(filter) => translate_filter(filter, ctx).map(|s| Some(Resolved::Sql(s))),
        _ => Ok(None),
    }
}

resolver!(SortResolver, "sort", Sort => Sql, sort_sql);

fn sort_sql(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    match expr {
        Expression::Sort(sort) => translate_sort(sort, ctx).map(|s| Some(Resolved::Sql(s))),
        _ => Ok(None),
    }
}

resolver!(
    /// Dialect override, remapped custom name, or the ANSI default.
    FunctionResolver, "function", Function => Sql, function_sql
);

fn function_sql(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    let Expression::Function(function) = expr else {
        return Ok(None);
    };
    let args = function
        .args
        .iter()
        .map(|arg| ctx.resolve_sql(arg))
        .collect::<SqlResult<Vec<_>>>()?;
    let sql = ctx
        .dialect()
        .function(&function.kind)
        .render(&args, function.distinct);
    Ok(Some(Resolved::Sql(sql)))
}

// =============================================================================
// Values
// =============================================================================

resolver!(
    /// A scalar literal as a parameter, wrapped by the dialect's temporal
    /// renderer when tagged. Lists are declined.
    LiteralParameterResolver, "literal-parameter", Literal => Parameter, literal_parameter
);

fn literal_parameter(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    let Expression::Literal(literal) = expr else {
        return Ok(None);
    };
    if let Value::List(_) = literal.value {
        return Ok(None);
    }
    let mut parameter = SqlParameter::new(literal.value.clone());
    if let Some(kind) = literal.temporal {
        parameter = parameter.with_temporal(kind);
        if let Some(renderer) = ctx.dialect().temporal_parameter_renderer(kind) {
            parameter = parameter.with_renderer(renderer);
        }
    }
    Ok(Some(Resolved::Parameter(parameter)))
}

resolver!(
    /// A literal as named placeholders; lists become `:[0001], :[0002]`.
    LiteralSqlResolver, "literal-sql", Literal => Sql, literal_sql
);

fn literal_sql(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    let Expression::Literal(literal) = expr else {
        return Ok(None);
    };
    let sql = match &literal.value {
        Value::List(items) => items
            .iter()
            .map(|value| {
                let item = Expression::Literal(Literal {
                    value: value.clone(),
                    temporal: literal.temporal,
                });
                let parameter = ctx.resolve(&item, TargetType::Parameter)?.into_parameter()?;
                ctx.add_parameter(parameter)
            })
            .collect::<SqlResult<Vec<_>>>()?
            .join(", "),
        _ => {
            let parameter = ctx.resolve(expr, TargetType::Parameter)?.into_parameter()?;
            ctx.add_parameter(parameter)?
        }
    };
    Ok(Some(Resolved::Sql(sql)))
}

resolver!(ParameterSqlResolver, "parameter-sql", Parameter => Sql, parameter_sql);

fn parameter_sql(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    match expr {
        Expression::Parameter(parameter) => {
            let name = ctx.add_parameter(parameter.clone())?;
            Ok(Some(Resolved::Sql(name)))
        }
        _ => Ok(None),
    }
}

resolver!(ParameterBindableResolver, "parameter-bindable", Parameter => Bindable, parameter_bindable);

fn parameter_bindable(expr: &Expression, _ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    match expr {
        Expression::Parameter(parameter) => Ok(Some(Resolved::Bindable(BoundParameter {
            marker: parameter.bind_marker(),
            parameter: parameter.clone(),
        }))),
        _ => Ok(None),
    }
}

resolver!(
    /// Raw SQL with each `?` outside string literals replaced by a named
    /// placeholder for the matching parameter.
    SqlExpressionResolver, "sql-expression", Sql => Sql, sql_expression
);

fn sql_expression(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    let Expression::Sql(raw) = expr else {
        return Ok(None);
    };
    let mut values = raw.parameters.iter();
    let mut out = String::with_capacity(raw.text.len());
    let mut in_quote = false;
    for c in raw.text.chars() {
        match c {
            '\'' => {
                in_quote = !in_quote;
                out.push(c);
            }
            '?' if !in_quote => {
                let value = values.next().ok_or_else(|| {
                    SqlError::preparation(format!(
                        "'{}' has more '?' markers than its {} parameters",
                        raw.text,
                        raw.parameters.len()
                    ))
                })?;
                out.push_str(&ctx.add_parameter(SqlParameter::new(value.clone()))?);
            }
            _ => out.push(c),
        }
    }
    if values.next().is_some() {
        return Err(SqlError::preparation(format!(
            "'{}' has fewer '?' markers than its {} parameters",
            raw.text,
            raw.parameters.len()
        )));
    }
    Ok(Some(Resolved::Sql(out)))
}

resolver!(
    /// A sub-select compiled in a nested statement scope.
    QueryResolver, "query", Query => Sql, query_sql
);

fn query_sql(expr: &Expression, ctx: &CompositionContext<'_>) -> SqlResult<Option<Resolved>> {
    let Expression::Query(query) = expr else {
        return Ok(None);
    };
    let target = resolve_source(query, ctx)?;
    let sub = ctx.statement_context(&target);
    let rendered = render_select(query, &target, &sub)?;
    Ok(Some(Resolved::Sql(rendered.sql)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{Dialect, DialectKind};
    use crate::expr::{lit, path, raw, DataTarget, IntoExpression, SqlExpression, TemporalKind};
    use crate::mapping::{EntityMapping, StaticDataModel};

    fn root(kind: DialectKind) -> CompositionContext<'static> {
        CompositionContext::root(Arc::new(Dialect::new(kind)))
    }

    #[test]
    fn test_path_uses_root_alias() {
        let ctx = root(DialectKind::Postgres);
        ctx.seed_target(&RelationalTarget::new("person").with_alias("p"));
        assert_eq!(ctx.resolve_sql(&path("age").into_expression()).unwrap(), "p.age");
    }

    #[test]
    fn test_unbound_parent_is_kept_verbatim() {
        let ctx = root(DialectKind::Postgres);
        assert_eq!(
            ctx.resolve_sql(&path("p.deleted_at").into_expression()).unwrap(),
            "p.deleted_at"
        );
        assert_eq!(ctx.resolve_sql(&path("age").into_expression()).unwrap(), "age");
    }

    #[test]
    fn test_data_target_maps_through_model() {
        let model = StaticDataModel::new().entity(
            EntityMapping::new("Person", "person")
                .with_schema("hr")
                .column("firstName", "first_name"),
        );
        let ctx = root(DialectKind::Postgres).with_data_model(Arc::new(model));
        let sql = ctx
            .resolve_sql(&DataTarget::new("Person").with_alias("p").into_expression())
            .unwrap();
        assert_eq!(sql, "hr.person p");
        assert_eq!(
            ctx.resolve_sql(&path("firstName").into_expression()).unwrap(),
            "p.first_name"
        );
    }

    #[test]
    fn test_join_rendering() {
        let ctx = root(DialectKind::Postgres);
        let target = RelationalTarget::new("person").with_alias("p").join(
            Join::left("address", "address")
                .with_alias("a")
                .on(crate::expr::FilterExt::eq(path("address.person_id"), path("id"))),
        );
        let sql = ctx.resolve_sql(&target.into_expression()).unwrap();
        assert_eq!(sql, "person p LEFT JOIN address a ON a.person_id=p.id");
    }

    #[test]
    fn test_list_literal_allocates_one_parameter_per_item() {
        let ctx = root(DialectKind::Postgres);
        let sql = ctx.resolve_sql(&vec![1, 2, 3].into_expression()).unwrap();
        assert_eq!(sql, ":[0001], :[0002], :[0003]");
        assert_eq!(ctx.parameters().len(), 3);
    }

    #[test]
    fn test_temporal_literal_gets_dialect_renderer() {
        let ctx = root(DialectKind::Postgres);
        let expr = Expression::Literal(Literal::temporal("2024-01-02", TemporalKind::Date));
        let parameter = ctx
            .resolve(&expr, TargetType::Parameter)
            .unwrap()
            .into_parameter()
            .unwrap();
        assert_eq!(parameter.bind_marker(), "CAST(? AS DATE)");
    }

    #[test]
    fn test_raw_sql_markers_become_placeholders() {
        let ctx = root(DialectKind::Ansi);
        let expr = Expression::Sql(SqlExpression::with_parameters(
            "age > ? and note <> '?'",
            vec![Value::Int(18)],
        ));
        assert_eq!(ctx.resolve_sql(&expr).unwrap(), "age > :[0001] and note <> '?'");
    }

    #[test]
    fn test_raw_sql_with_too_few_parameters() {
        let ctx = root(DialectKind::Ansi);
        let expr = Expression::Sql(SqlExpression::with_parameters("a = ? or b = ?", vec![Value::Int(1)]));
        let err = ctx.resolve_sql(&expr).unwrap_err();
        assert!(matches!(err, SqlError::StatementPreparation(_)));
        assert!(ctx.resolve_sql(&raw("1 = 1")).is_ok());
    }

    #[test]
    fn test_list_literal_cannot_become_single_parameter() {
        let ctx = root(DialectKind::Ansi);
        let err = ctx
            .resolve(&lit(Value::List(vec![Value::Int(1)])), TargetType::Parameter)
            .unwrap_err();
        assert!(err.is_unresolved());
    }
}
