//! Dialect capability tests across all vendors.

use relsql::dialect::{
    DatabaseInfo, Dialect, DialectKind, ErrorKind, GeneratedKeys, IdentifierCase, LockMode,
};
use relsql::types::SqlType;
use relsql::SqlError;

const BASE: &str = "select * from person";

fn versioned(kind: DialectKind, major: u32, minor: u32) -> Dialect {
    let info = kind.vendor().default_info();
    Dialect::with_info(
        kind,
        DatabaseInfo {
            major_version: major,
            minor_version: minor,
            ..info
        },
    )
}

// ============================================================================
// Limit / offset
// ============================================================================

#[test]
fn test_postgres_limit_offset() {
    let dialect = Dialect::new(DialectKind::Postgres);
    assert_eq!(
        dialect.limit_offset(BASE, 10, 20).unwrap(),
        "select * from person limit 10 offset 20"
    );
    assert_eq!(
        dialect.limit_offset(BASE, 10, -1).unwrap(),
        "select * from person limit 10"
    );
}

#[test]
fn test_oracle_12_offset_fetch() {
    let dialect = Dialect::with_info(DialectKind::Oracle, DatabaseInfo::new("Oracle", 12, 1));
    assert_eq!(
        dialect.limit_offset(BASE, 10, 20).unwrap(),
        "select * from person OFFSET 20 ROWS FETCH NEXT 10 ROWS ONLY"
    );
    assert_eq!(
        dialect.limit_offset(BASE, 10, -1).unwrap(),
        "select * from person FETCH FIRST 10 ROWS ONLY"
    );
}

#[test]
fn test_oracle_11_rownum() {
    let dialect = versioned(DialectKind::Oracle, 11, 2);
    assert_eq!(
        dialect.limit_offset(BASE, 10, -1).unwrap(),
        "select * from ( select * from person ) where rownum <= 10"
    );
    assert_eq!(
        dialect.limit_offset(BASE, 10, 20).unwrap(),
        "select * from ( select row_.*, rownum rownum_ from ( select * from person ) row_ where rownum <= 30) where rownum_ > 20"
    );
}

#[test]
fn test_sqlserver_by_version() {
    let modern = Dialect::new(DialectKind::SqlServer);
    assert_eq!(
        modern.limit_offset(BASE, 5, -1).unwrap(),
        "select * from person ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
    );
    assert_eq!(
        modern
            .limit_offset("select * from person order by name", 5, 10)
            .unwrap(),
        "select * from person order by name OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
    );

    assert_eq!(
        modern
            .limit_offset("select * from person where id in (select id from boss order by id)", 5, -1)
            .unwrap(),
        "select * from person where id in (select id from boss order by id) ORDER BY (SELECT NULL) OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
    );

    let legacy = versioned(DialectKind::SqlServer, 10, 50);
    assert!(legacy
        .limit_offset(BASE, 5, 10)
        .unwrap()
        .ends_with("where rownumber_ > 10 and rownumber_ <= 15 order by rownumber_"));
}

#[test]
fn test_db2_by_version() {
    assert_eq!(
        Dialect::new(DialectKind::Db2).limit_offset(BASE, 3, 6).unwrap(),
        "select * from person OFFSET 6 ROWS FETCH NEXT 3 ROWS ONLY"
    );
    let legacy = versioned(DialectKind::Db2, 10, 5);
    assert!(legacy
        .limit_offset(BASE, 3, -1)
        .unwrap()
        .contains("rownumber() over() as rownumber_"));
}

#[test]
fn test_every_dialect_but_ansi_limits() {
    for kind in DialectKind::ALL {
        let result = Dialect::new(kind).limit_offset(BASE, 1, -1);
        if kind == DialectKind::Ansi {
            assert!(matches!(result, Err(SqlError::UnsupportedDialectFeature { .. })));
        } else {
            assert!(result.is_ok(), "{kind} should support limits");
        }
    }
}

// ============================================================================
// Locking
// ============================================================================

#[test]
fn test_lock_clauses() {
    let cases = [
        (DialectKind::Postgres, LockMode::Shared, None, "FOR SHARE"),
        (DialectKind::Postgres, LockMode::Exclusive, Some(0), "FOR UPDATE NOWAIT"),
        (DialectKind::MySql, LockMode::Shared, None, "LOCK IN SHARE MODE"),
        (DialectKind::Oracle, LockMode::Exclusive, Some(1500), "FOR UPDATE WAIT 2"),
        (DialectKind::Hana, LockMode::Exclusive, None, "FOR UPDATE"),
        (DialectKind::Db2, LockMode::Exclusive, None, "FOR UPDATE WITH RS"),
        (DialectKind::Derby, LockMode::Shared, None, "FOR READ ONLY"),
        (DialectKind::H2, LockMode::Exclusive, Some(0), "FOR UPDATE NOWAIT"),
    ];
    for (kind, mode, timeout, expected) in cases {
        assert_eq!(
            Dialect::new(kind).lock_clause(mode, timeout).unwrap(),
            expected,
            "{kind} {mode:?}"
        );
    }
}

#[test]
fn test_unsupported_locks() {
    for kind in [DialectKind::SqlServer, DialectKind::Sqlite] {
        let err = Dialect::new(kind)
            .lock_clause(LockMode::Exclusive, None)
            .unwrap_err();
        assert!(matches!(err, SqlError::UnsupportedDialectFeature { .. }));
    }
    assert!(Dialect::new(DialectKind::Oracle)
        .lock_clause(LockMode::Shared, None)
        .is_err());
}

// ============================================================================
// Identifiers, keys and types
// ============================================================================

#[test]
fn test_identifier_folding() {
    let oracle = Dialect::new(DialectKind::Oracle);
    assert_eq!(oracle.identifier_case(), IdentifierCase::Upper);
    assert_eq!(oracle.normalize_identifier("person"), "PERSON");
    assert_eq!(oracle.normalize_identifier("\"Person\""), "\"Person\"");

    let postgres = Dialect::new(DialectKind::Postgres);
    assert_eq!(postgres.column_name("CreatedAt"), "createdat");

    let mysql = Dialect::new(DialectKind::MySql);
    assert_eq!(mysql.table_name("Person"), "Person");
}

#[test]
fn test_generated_keys_flags() {
    let no_keys = Dialect::with_info(DialectKind::Db2, DatabaseInfo::new("DB2", 11, 5));
    assert_eq!(no_keys.generated_keys(&["id"]), GeneratedKeys::Unsupported);

    let db2 = Dialect::new(DialectKind::Db2);
    assert_eq!(db2.generated_keys(&["id"]), GeneratedKeys::ByName(vec!["ID".into()]));

    let mysql = Dialect::new(DialectKind::MySql);
    assert!(mysql.generated_keys_always_returned());
}

#[test]
fn test_null_type_capability() {
    let db2 = Dialect::new(DialectKind::Db2);
    assert!(!db2.supports_null_type());
    assert_eq!(db2.null_type(), SqlType::VARCHAR);

    let postgres = Dialect::new(DialectKind::Postgres);
    assert!(postgres.supports_null_type());
    assert_eq!(postgres.null_type(), SqlType::NULL);
}

#[test]
fn test_error_classification() {
    let postgres = Dialect::new(DialectKind::Postgres);
    assert_eq!(postgres.classify_error(0, Some("55P03")), Some(ErrorKind::LockTimeout));
    assert_eq!(postgres.classify_error(0, Some("40P01")), Some(ErrorKind::Deadlock));
    assert_eq!(postgres.classify_error(0, Some("23505")), None);
    assert_eq!(postgres.classify_error(0, None), None);

    let mysql = Dialect::new(DialectKind::MySql);
    assert_eq!(mysql.classify_error(1205, None), Some(ErrorKind::LockTimeout));

    let oracle = Dialect::new(DialectKind::Oracle);
    assert_eq!(oracle.classify_error(54, None), Some(ErrorKind::LockTimeout));
    assert_eq!(oracle.classify_error(60, None), Some(ErrorKind::Deadlock));

    let sqlserver = Dialect::new(DialectKind::SqlServer);
    assert_eq!(sqlserver.classify_error(1222, None), Some(ErrorKind::LockTimeout));

    assert_eq!(Dialect::new(DialectKind::Ansi).classify_error(1205, None), None);
}

#[test]
fn test_temporal_renderers() {
    use relsql::expr::TemporalKind;

    let postgres = Dialect::new(DialectKind::Postgres);
    let renderer = postgres
        .temporal_parameter_renderer(TemporalKind::DateTime)
        .unwrap();
    assert_eq!(renderer.render("?"), "CAST(? AS TIMESTAMP)");

    let oracle = Dialect::new(DialectKind::Oracle);
    assert!(oracle.temporal_parameter_renderer(TemporalKind::Date).is_none());
}
