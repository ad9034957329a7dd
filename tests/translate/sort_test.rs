//! Sort translation tests.

use std::sync::Arc;

use relsql::context::{AliasMode, CompositionContext};
use relsql::dialect::{Dialect, DialectKind};
use relsql::expr::{lower, path, raw, year, RelationalTarget, Sort};
use relsql::translate::translate_sort;

fn ctx(kind: DialectKind) -> CompositionContext<'static> {
    let ctx = CompositionContext::root(Arc::new(Dialect::new(kind)));
    ctx.seed_target(&RelationalTarget::new("person").with_alias("p"));
    ctx
}

#[test]
fn test_single_term() {
    let ctx = ctx(DialectKind::Postgres);
    assert_eq!(translate_sort(&Sort::asc(path("name")), &ctx).unwrap(), "p.name ASC");
    assert_eq!(translate_sort(&Sort::desc(path("age")), &ctx).unwrap(), "p.age DESC");
}

#[test]
fn test_composite_keeps_declaration_order() {
    let ctx = ctx(DialectKind::Postgres);
    let sort = Sort::desc(path("age"))
        .then(Sort::asc(path("last_name")))
        .then(Sort::asc(path("first_name")));

    assert_eq!(
        translate_sort(&sort, &ctx).unwrap(),
        "p.age DESC, p.last_name ASC, p.first_name ASC"
    );
}

#[test]
fn test_nested_composites_flatten() {
    let ctx = ctx(DialectKind::Postgres);
    let inner = Sort::asc(path("b")).then(Sort::desc(path("c")));
    let sort = Sort::asc(path("a")).then(inner);

    assert_eq!(translate_sort(&sort, &ctx).unwrap(), "p.a ASC, p.b ASC, p.c DESC");
}

#[test]
fn test_function_terms() {
    let ctx = ctx(DialectKind::SqlServer);
    let sort = Sort::asc(year(path("hired_on"))).then(Sort::asc(lower(path("name"))));

    assert_eq!(
        translate_sort(&sort, &ctx).unwrap(),
        "DATEPART(year, p.hired_on) ASC, LOWER(p.name) ASC"
    );
}

#[test]
fn test_raw_term() {
    let ctx = ctx(DialectKind::Postgres);
    let sort = Sort::desc(raw("p.score * 2"));
    assert_eq!(translate_sort(&sort, &ctx).unwrap(), "p.score * 2 DESC");
}

#[test]
fn test_unaliased_mode_uses_bare_columns() {
    let ctx = CompositionContext::root(Arc::new(Dialect::new(DialectKind::Postgres)))
        .with_alias_mode(AliasMode::Unsupported);
    ctx.seed_target(&RelationalTarget::new("person").with_alias("p"));

    assert_eq!(translate_sort(&Sort::asc(path("name")), &ctx).unwrap(), "person.name ASC");
}

#[test]
fn test_sort_allocates_no_parameters() {
    let ctx = ctx(DialectKind::Postgres);
    translate_sort(&Sort::asc(path("a")).then(Sort::desc(path("b"))), &ctx).unwrap();
    assert!(ctx.parameters().is_empty());
}
