//! Test utilities for SQL emission validation.
//!
//! Provides helpers for validating that emitted SQL is syntactically correct
//! using sqlparser-rs for roundtrip validation.

use sqlparser::dialect::{
    AnsiDialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect, SQLiteDialect,
};
use sqlparser::parser::Parser;

use crate::dialect::DialectKind;

/// Validates that a SQL string is syntactically valid for the given dialect.
///
/// Placeholders must already be prepared into `?` markers.
pub fn validate_sql(sql: &str, dialect: DialectKind) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        DialectKind::Ansi => Box::new(AnsiDialect {}),
        DialectKind::Postgres => Box::new(PostgreSqlDialect {}),
        DialectKind::MySql => Box::new(MySqlDialect {}),
        DialectKind::SqlServer => Box::new(MsSqlDialect {}),
        DialectKind::Sqlite => Box::new(SQLiteDialect {}),
        // sqlparser has no dialect for these
        DialectKind::H2
        | DialectKind::Hana
        | DialectKind::Oracle
        | DialectKind::Db2
        | DialectKind::Derby => Box::new(GenericDialect {}),
    };

    Parser::parse_sql(&*parser_dialect, sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT * FROM users", DialectKind::Postgres).unwrap();
        validate_sql("SELECT * FROM users WHERE id=?", DialectKind::MySql).unwrap();
        validate_sql("SELECT * FROM users", DialectKind::Sqlite).unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC * FORM users", DialectKind::Postgres);
        assert!(result.is_err());
    }
}
