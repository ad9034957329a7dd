//! Filter translation tests.

use std::sync::Arc;

use relsql::context::CompositionContext;
use relsql::dialect::{DatabaseInfo, Dialect, DialectKind};
use relsql::expr::{lit, path, raw, Filter, FilterExt, MatchMode, RelationalTarget, Value};
use relsql::query::SelectQuery;
use relsql::translate::translate_filter;

fn person_ctx(dialect: Dialect) -> CompositionContext<'static> {
    let ctx = CompositionContext::root(Arc::new(dialect));
    ctx.seed_target(&RelationalTarget::new("person").with_alias("p"));
    ctx
}

fn postgres() -> CompositionContext<'static> {
    person_ctx(Dialect::new(DialectKind::Postgres))
}

fn values(ctx: &CompositionContext<'_>) -> Vec<Value> {
    ctx.parameters()
        .entries()
        .into_iter()
        .map(|(_, p)| p.value().clone())
        .collect()
}

// ============================================================================
// Comparisons
// ============================================================================

#[test]
fn test_and_with_contains() {
    let ctx = postgres();
    let filter = path("age").gte(18).and(path("name").contains("oh"));

    let sql = translate_filter(&filter, &ctx).unwrap();

    assert_eq!(sql, "(p.age>=:[0001]) AND (p.name LIKE :[0002] ESCAPE '!')");
    assert_eq!(values(&ctx), vec![Value::Int(18), Value::from("%oh%")]);
}

#[test]
fn test_null_filter_has_no_parameters() {
    let ctx = postgres();
    let sql = translate_filter(&path("deleted_at").is_null(), &ctx).unwrap();

    assert_eq!(sql, "p.deleted_at IS NULL");
    assert!(ctx.parameters().is_empty());
}

#[test]
fn test_comparison_operators() {
    let ctx = postgres();
    let cases = [
        (path("a").eq(1), "p.a=:[0001]"),
        (path("a").ne(1), "p.a<>:[0002]"),
        (path("a").gt(1), "p.a>:[0003]"),
        (path("a").gte(1), "p.a>=:[0004]"),
        (path("a").lt(1), "p.a<:[0005]"),
        (path("a").lte(1), "p.a<=:[0006]"),
        (path("a").is_not_null(), "p.a IS NOT NULL"),
    ];
    for (filter, expected) in cases {
        assert_eq!(translate_filter(&filter, &ctx).unwrap(), expected);
    }
    assert_eq!(ctx.parameters().len(), 6);
}

#[test]
fn test_equality_against_null_literal() {
    let ctx = postgres();
    let eq = path("manager_id").eq(Value::Null);
    let ne = path("manager_id").ne(Value::Null);

    assert_eq!(translate_filter(&eq, &ctx).unwrap(), "p.manager_id IS NULL");
    assert_eq!(translate_filter(&ne, &ctx).unwrap(), "p.manager_id IS NOT NULL");
    assert!(ctx.parameters().is_empty());
}

#[test]
fn test_ordering_against_null_is_invalid() {
    let filter = path("age").gt(Value::Null);
    assert!(filter.validate().unwrap_err().is_invalid());
}

#[test]
fn test_path_to_path_comparison() {
    let ctx = postgres();
    let sql = translate_filter(&path("updated_at").gt(path("created_at")), &ctx).unwrap();
    assert_eq!(sql, "p.updated_at>p.created_at");
    assert!(ctx.parameters().is_empty());
}

// ============================================================================
// Membership and ranges
// ============================================================================

#[test]
fn test_in_list() {
    let ctx = postgres();
    let sql = translate_filter(&path("status").in_(vec!["new", "open"]), &ctx).unwrap();

    assert_eq!(sql, "p.status IN (:[0001], :[0002])");
    assert_eq!(values(&ctx), vec![Value::from("new"), Value::from("open")]);
}

#[test]
fn test_not_in_list() {
    let ctx = postgres();
    let sql = translate_filter(&path("id").not_in(vec![1, 2, 3]), &ctx).unwrap();
    assert_eq!(sql, "p.id NOT IN (:[0001], :[0002], :[0003])");
}

#[test]
fn test_in_subquery() {
    let ctx = postgres();
    let managers = SelectQuery::new(RelationalTarget::new("manager").with_alias("m"))
        .filter(path("active").eq(true));
    let sql = translate_filter(&path("id").in_(managers), &ctx).unwrap();

    assert_eq!(
        sql,
        "p.id IN (SELECT * FROM manager m WHERE m.active=:[0001])"
    );
    assert_eq!(values(&ctx), vec![Value::Bool(true)]);
}

#[test]
fn test_between() {
    let ctx = postgres();
    let sql = translate_filter(&path("age").between(18, 65), &ctx).unwrap();

    assert_eq!(sql, "p.age BETWEEN :[0001] AND :[0002]");
    assert_eq!(values(&ctx), vec![Value::Int(18), Value::Int(65)]);
}

// ============================================================================
// String matching
// ============================================================================

#[test]
fn test_match_modes() {
    let ctx = postgres();
    translate_filter(&path("name").starts_with("Jo"), &ctx).unwrap();
    translate_filter(&path("name").ends_with("son"), &ctx).unwrap();
    translate_filter(&path("name").matches("Ann", MatchMode::Exact, false), &ctx).unwrap();

    assert_eq!(
        values(&ctx),
        vec![Value::from("Jo%"), Value::from("%son"), Value::from("Ann")]
    );
}

#[test]
fn test_wildcards_in_value_are_escaped() {
    let ctx = postgres();
    translate_filter(&path("code").contains("50%_off"), &ctx).unwrap();
    assert_eq!(values(&ctx), vec![Value::from("%50!%!_off%")]);
}

#[test]
fn test_ignore_case_lowers_both_sides() {
    let ctx = postgres();
    let filter = path("name").matches("JOhn", MatchMode::StartsWith, true);
    let sql = translate_filter(&filter, &ctx).unwrap();

    assert_eq!(sql, "LOWER(p.name) LIKE :[0001] ESCAPE '!'");
    assert_eq!(values(&ctx), vec![Value::from("john%")]);
}

#[test]
fn test_no_escape_clause_without_support() {
    let info = DatabaseInfo::new("SQLite", 3, 45).with_like_escape(false);
    let ctx = person_ctx(Dialect::with_info(DialectKind::Sqlite, info));
    let sql = translate_filter(&path("code").contains("50%"), &ctx).unwrap();

    assert_eq!(sql, "p.code LIKE :[0001]");
    assert_eq!(values(&ctx), vec![Value::from("%50%%")]);
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn test_nested_composition_parenthesizes_each_level() {
    let ctx = postgres();
    let filter = path("a")
        .eq(1)
        .and(path("b").eq(2).or(path("c").eq(3)))
        .and(path("d").eq(4).negate());
    let sql = translate_filter(&filter, &ctx).unwrap();

    assert_eq!(
        sql,
        "(p.a=:[0001]) AND ((p.b=:[0002]) OR (p.c=:[0003])) AND (NOT (p.d=:[0004]))"
    );
    assert_eq!(ctx.parameters().len(), 4);
}

#[test]
fn test_exists_correlated_subquery() {
    let ctx = postgres();
    let addresses = SelectQuery::new(RelationalTarget::new("address").with_alias("a"))
        .filter(path("person_id").eq(path("p.id")));

    let exists = translate_filter(&Filter::exists(addresses.clone()), &ctx).unwrap();
    let missing = translate_filter(&Filter::not_exists(addresses), &ctx).unwrap();

    assert_eq!(exists, "EXISTS (SELECT * FROM address a WHERE a.person_id=p.id)");
    assert_eq!(missing, "NOT EXISTS (SELECT * FROM address a WHERE a.person_id=p.id)");
}

#[test]
fn test_raw_sql_operand() {
    let ctx = postgres();
    let filter = path("score").gt(raw("(SELECT avg(score) FROM person)"));
    let sql = translate_filter(&filter, &ctx).unwrap();
    assert_eq!(sql, "p.score>(SELECT avg(score) FROM person)");
}

#[test]
fn test_parameters_shared_across_filters() {
    let ctx = postgres();
    translate_filter(&path("a").eq(lit(1)), &ctx).unwrap();
    let child = ctx.child_context();
    let sql = translate_filter(&path("b").eq(lit(2)), &child).unwrap();

    assert_eq!(sql, "p.b=:[0002]");
    assert_eq!(ctx.parameters().len(), 2);
}
