//! Statement preparation tests.

use std::sync::Arc;

use relsql::context::CompositionContext;
use relsql::dialect::{Dialect, DialectKind};
use relsql::expr::{path, FilterExt, Literal, RelationalTarget, TemporalKind, Value};
use relsql::statement::{prepare, SqlParameter};
use relsql::translate::translate_filter;
use relsql::SqlError;

fn root(kind: DialectKind) -> CompositionContext<'static> {
    CompositionContext::root(Arc::new(Dialect::new(kind)))
}

fn values(parameters: &[SqlParameter]) -> Vec<Value> {
    parameters.iter().map(|p| p.value().clone()).collect()
}

#[test]
fn test_translated_filter_prepares_in_order() {
    let ctx = root(DialectKind::Postgres);
    ctx.seed_target(&RelationalTarget::new("person").with_alias("p"));
    let filter = path("age").gte(18).and(path("name").contains("oh"));
    let where_clause = translate_filter(&filter, &ctx).unwrap();

    let stmt = prepare(&format!("SELECT * FROM person p WHERE {where_clause}"), &ctx).unwrap();

    assert_eq!(
        stmt.sql,
        "SELECT * FROM person p WHERE (p.age>=?) AND (p.name LIKE ? ESCAPE '!')"
    );
    assert_eq!(values(&stmt.parameters), vec![Value::Int(18), Value::from("%oh%")]);
}

#[test]
fn test_repeated_placeholder_binds_twice() {
    let ctx = root(DialectKind::MySql);
    let name = ctx.add_parameter(SqlParameter::new("x")).unwrap();
    let stmt = prepare(&format!("SELECT {name}, {name}"), &ctx).unwrap();

    assert_eq!(stmt.sql, "SELECT ?, ?");
    assert_eq!(stmt.parameter_count(), 2);
}

#[test]
fn test_unused_accumulator_entries_are_not_bound() {
    let ctx = root(DialectKind::MySql);
    ctx.add_parameter(SqlParameter::new(1)).unwrap();
    let second = ctx.add_parameter(SqlParameter::new(2)).unwrap();

    let stmt = prepare(&format!("x={second}"), &ctx).unwrap();

    assert_eq!(values(&stmt.parameters), vec![Value::Int(2)]);
}

#[test]
fn test_missing_mapping_fails_without_partial_statement() {
    let ctx = root(DialectKind::Postgres);
    ctx.add_parameter(SqlParameter::new(1)).unwrap();

    let err = prepare("a=:[0001] AND b=:[0002]", &ctx).unwrap_err();

    assert!(matches!(err, SqlError::StatementPreparation(ref msg) if msg.contains(":[0002]")));
}

#[test]
fn test_placeholder_at_end_of_text() {
    let ctx = root(DialectKind::Postgres);
    let name = ctx.add_parameter(SqlParameter::new(5)).unwrap();
    let stmt = prepare(&format!("x={name}"), &ctx).unwrap();
    assert_eq!(stmt.sql, "x=?");
}

#[test]
fn test_lookalike_tokens_are_verbatim() {
    let ctx = root(DialectKind::Postgres);
    ctx.add_parameter(SqlParameter::new(1)).unwrap();

    let sql = "SELECT :[001], :[00001], :(0001), x::text FROM t WHERE at > '10:15'";
    let stmt = prepare(sql, &ctx).unwrap();

    assert_eq!(stmt.sql, sql);
    assert!(stmt.parameters.is_empty());
}

#[test]
fn test_temporal_parameter_uses_dialect_marker() {
    let ctx = root(DialectKind::Postgres);
    let sql = ctx
        .resolve_sql(&relsql::expr::Expression::Literal(Literal::temporal(
            "2024-03-01",
            TemporalKind::Date,
        )))
        .unwrap();

    let stmt = prepare(&format!("d >= {sql}"), &ctx).unwrap();

    assert_eq!(stmt.sql, "d >= CAST(? AS DATE)");
    assert_eq!(stmt.parameters[0].temporal(), Some(TemporalKind::Date));
}

#[test]
fn test_parameters_from_child_contexts_prepare_at_root() {
    let ctx = root(DialectKind::Postgres);
    let child = ctx.child_context();
    let name = child.add_parameter(SqlParameter::new(true)).unwrap();

    let stmt = prepare(&format!("flag={name}"), &ctx).unwrap();

    assert_eq!(values(&stmt.parameters), vec![Value::Bool(true)]);
}

#[test]
fn test_accumulator_overflow() {
    let ctx = root(DialectKind::Postgres);
    for i in 0..9999 {
        ctx.add_parameter(SqlParameter::new(i)).unwrap();
    }
    let err = ctx.add_parameter(SqlParameter::new(0)).unwrap_err();
    assert!(matches!(err, SqlError::StatementPreparation(_)));
}

#[test]
fn test_statement_display_is_sql() {
    let ctx = root(DialectKind::Postgres);
    let stmt = prepare("SELECT 1", &ctx).unwrap();
    assert_eq!(stmt.to_string(), "SELECT 1");
    assert_eq!(stmt.parameter_count(), 0);
}
