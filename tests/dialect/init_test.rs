//! One-time dialect initialization against a connection provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use relsql::dialect::{
    Connection, ConnectionProvider, DatabaseMetadata, Dialect, DialectKind, IdentifierCase,
};
use relsql::SqlError;

struct FakeConnection {
    metadata: Result<DatabaseMetadata, String>,
}

impl Connection for FakeConnection {
    type Error = String;

    fn metadata(&self) -> Result<DatabaseMetadata, Self::Error> {
        self.metadata.clone()
    }
}

/// Hands out the same fake connection and counts how often it is borrowed.
struct CountingProvider {
    conn: FakeConnection,
    calls: AtomicUsize,
}

impl CountingProvider {
    fn new(metadata: Result<DatabaseMetadata, String>) -> Self {
        Self {
            conn: FakeConnection { metadata },
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConnectionProvider for CountingProvider {
    type Conn = FakeConnection;

    fn with_connection<R>(&self, f: impl FnOnce(&Self::Conn) -> R) -> R {
        self.calls.fetch_add(1, Ordering::SeqCst);
        f(&self.conn)
    }
}

fn oracle_11() -> DatabaseMetadata {
    DatabaseMetadata {
        product_name: "Oracle".into(),
        product_version: "11.2.0.4".into(),
        major_version: 11,
        minor_version: 2,
        supports_get_generated_keys: true,
        generated_key_always_returned: false,
        supports_like_escape_clause: true,
        stores_upper_case_identifiers: true,
        stores_lower_case_identifiers: false,
    }
}

#[test]
fn test_init_queries_metadata_once() {
    let dialect = Dialect::new(DialectKind::Oracle);
    let provider = CountingProvider::new(Ok(oracle_11()));

    let first = dialect.init(&provider).unwrap().clone();
    let second = dialect.init(&provider).unwrap().clone();

    assert_eq!(provider.calls(), 1);
    assert_eq!(first, second);
    assert_eq!(first.major_version, 11);
    assert_eq!(first.identifier_case, IdentifierCase::Upper);
}

#[test]
fn test_reported_version_drives_limit_style() {
    let dialect = Dialect::new(DialectKind::Oracle);
    let before = dialect.limit_offset("select 1 from dual", 5, -1).unwrap();
    assert_eq!(before, "select 1 from dual FETCH FIRST 5 ROWS ONLY");

    dialect.init(&CountingProvider::new(Ok(oracle_11()))).unwrap();

    let after = dialect.limit_offset("select 1 from dual", 5, -1).unwrap();
    assert_eq!(after, "select * from ( select 1 from dual ) where rownum <= 5");
}

#[test]
fn test_failed_init_leaves_dialect_uninitialized() {
    let dialect = Dialect::new(DialectKind::Postgres);
    let broken = CountingProvider::new(Err("connection refused".into()));

    let err = dialect.init(&broken).unwrap_err();
    assert!(matches!(err, SqlError::DialectInit(ref msg) if msg == "connection refused"));
    assert!(!dialect.is_initialized());

    let healthy = CountingProvider::new(Ok(DatabaseMetadata {
        product_name: "PostgreSQL".into(),
        major_version: 15,
        stores_lower_case_identifiers: true,
        ..Default::default()
    }));
    assert_eq!(dialect.init(&healthy).unwrap().major_version, 15);
    assert!(dialect.is_initialized());
}

#[test]
fn test_static_info_skips_metadata_lookup() {
    let dialect = Dialect::with_info(
        DialectKind::Oracle,
        relsql::dialect::DatabaseInfo::new("Oracle", 19, 0),
    );
    let provider = CountingProvider::new(Ok(oracle_11()));

    assert_eq!(dialect.init(&provider).unwrap().major_version, 19);
    assert_eq!(provider.calls(), 0);
}

#[test]
fn test_concurrent_init_queries_metadata_once() {
    let dialect = Arc::new(Dialect::new(DialectKind::Oracle));
    let provider = Arc::new(CountingProvider::new(Ok(oracle_11())));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let dialect = Arc::clone(&dialect);
            let provider = Arc::clone(&provider);
            thread::spawn(move || dialect.init(&*provider).map(|info| info.major_version))
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap().unwrap(), 11);
    }
    assert_eq!(provider.calls(), 1);
}

#[test]
fn test_like_escape_flag_from_metadata() {
    let dialect = Dialect::new(DialectKind::Sqlite);
    let provider = CountingProvider::new(Ok(DatabaseMetadata {
        product_name: "SQLite".into(),
        major_version: 3,
        minor_version: 45,
        supports_like_escape_clause: false,
        ..Default::default()
    }));
    dialect.init(&provider).unwrap();
    assert!(!dialect.supports_like_escape());
}
