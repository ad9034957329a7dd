//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use std::sync::LazyLock;

use regex::Regex;

use crate::expr::TemporalKind;

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Quote string with N prefix for Unicode.
/// Used by: SQL Server for non-ASCII strings
pub fn quote_string_unicode(s: &str) -> String {
    format!("N'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: Postgres, H2, HANA, Ansi
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: SQL Server, MySQL, SQLite, Oracle, DB2, Derby
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Binary and Temporal Literals
// =============================================================================

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// `X'0aff'`
/// Used by: Ansi, MySQL, H2, HANA, SQLite, DB2, Derby, SQL Server
pub fn format_binary_standard(bytes: &[u8]) -> String {
    format!("X'{}'", hex(bytes))
}

/// `'\x0aff'::bytea`
/// Used by: Postgres
pub fn format_binary_bytea(bytes: &[u8]) -> String {
    format!("'\\x{}'::bytea", hex(bytes))
}

/// `HEXTORAW('0aff')`
/// Used by: Oracle
pub fn format_binary_hextoraw(bytes: &[u8]) -> String {
    format!("HEXTORAW('{}')", hex(bytes))
}

/// `DATE '...'`, `TIME '...'`, `TIMESTAMP '...'`
/// Used by: Ansi, Postgres, MySQL, H2, HANA
pub fn format_temporal_typed(kind: TemporalKind, text: &str) -> String {
    let keyword = match kind {
        TemporalKind::Date => "DATE",
        TemporalKind::Time => "TIME",
        TemporalKind::DateTime => "TIMESTAMP",
    };
    format!("{keyword} {}", quote_string_single(text))
}

/// `DATE('...')`, `TIME('...')`, `TIMESTAMP('...')`
/// Used by: DB2, Derby
pub fn format_temporal_function(kind: TemporalKind, text: &str) -> String {
    let function = match kind {
        TemporalKind::Date => "DATE",
        TemporalKind::Time => "TIME",
        TemporalKind::DateTime => "TIMESTAMP",
    };
    format!("{function}({})", quote_string_single(text))
}

/// Plain quoted ISO text.
/// Used by: SQL Server, SQLite
pub fn format_temporal_plain(_kind: TemporalKind, text: &str) -> String {
    quote_string_single(text)
}

// =============================================================================
// Pagination
// =============================================================================

static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\border\s+by\b").unwrap());

/// Whether `sql` sorts its outermost statement.
///
/// ORDER BY inside parentheses or string literals belongs to a sub-query
/// or a value and is ignored.
pub fn has_outer_order_by(sql: &str) -> bool {
    ORDER_BY
        .find_iter(sql)
        .any(|m| nesting_at(sql, m.start()) == Some(0))
}

/// Parenthesis depth at byte `end`, or `None` inside a string literal.
fn nesting_at(sql: &str, end: usize) -> Option<u32> {
    let mut depth = 0u32;
    let mut in_quote = false;
    for c in sql[..end].chars() {
        match c {
            '\'' => in_quote = !in_quote,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    (!in_quote).then_some(depth)
}

/// Append ` limit L[ offset O]`.
/// Used by: Postgres, MySQL, H2, HANA, SQLite
pub fn limit_offset_standard(sql: &str, limit: u64, offset: i64) -> String {
    let mut out = format!("{sql} limit {limit}");
    if offset >= 0 {
        out.push_str(&format!(" offset {offset}"));
    }
    out
}

/// Append ` OFFSET O ROWS FETCH NEXT L ROWS ONLY`, or
/// ` FETCH FIRST L ROWS ONLY` without an offset.
/// Used by: Oracle 12+, DB2 11+, Derby
pub fn offset_fetch(sql: &str, limit: u64, offset: i64) -> String {
    if offset < 0 {
        format!("{sql} FETCH FIRST {limit} ROWS ONLY")
    } else {
        format!("{sql} OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY")
    }
}

/// OFFSET FETCH that always carries an OFFSET and an ORDER BY.
/// `ordered` tells whether the outer statement already sorts.
/// Used by: SQL Server 2012+
pub fn offset_fetch_required(sql: &str, limit: u64, offset: i64, ordered: bool) -> String {
    let order_by = if ordered {
        ""
    } else {
        " ORDER BY (SELECT NULL)"
    };
    format!(
        "{sql}{order_by} OFFSET {} ROWS FETCH NEXT {limit} ROWS ONLY",
        offset.max(0)
    )
}

/// Wrap in a ROWNUM filter.
/// Used by: Oracle before 12c
pub fn rownum(sql: &str, limit: u64, offset: i64) -> String {
    if offset <= 0 {
        return format!("select * from ( {sql} ) where rownum <= {limit}");
    }
    let upper = limit.saturating_add(offset.unsigned_abs());
    format!(
        "select * from ( select row_.*, rownum rownum_ from ( {sql} ) row_ where rownum <= {upper}) where rownum_ > {offset}"
    )
}

/// Wrap in a numbered derived table filtered on the row number.
/// Used by: DB2 before 11, SQL Server before 2012
pub fn row_number(sql: &str, limit: u64, offset: i64, function: &str) -> String {
    let offset = offset.max(0).unsigned_abs();
    let upper = limit.saturating_add(offset);
    format!(
        "select * from ( select inner_.*, {function} as rownumber_ from ( {sql} ) inner_ ) outer_ where rownumber_ > {offset} and rownumber_ <= {upper} order by rownumber_"
    )
}

// =============================================================================
// Locking
// =============================================================================

/// `FOR UPDATE`, with `NOWAIT` for a zero timeout.
/// Used by: Postgres, MySQL, H2, Derby, Ansi
pub fn for_update(timeout_ms: Option<u64>) -> String {
    match timeout_ms {
        Some(0) => "FOR UPDATE NOWAIT".into(),
        _ => "FOR UPDATE".into(),
    }
}

/// `FOR UPDATE` with `NOWAIT` or `WAIT n` seconds (rounded up).
/// Used by: Oracle, HANA
pub fn for_update_wait(timeout_ms: Option<u64>) -> String {
    match timeout_ms {
        None => "FOR UPDATE".into(),
        Some(0) => "FOR UPDATE NOWAIT".into(),
        Some(ms) => format!("FOR UPDATE WAIT {}", ms.div_ceil(1000)),
    }
}

// =============================================================================
// Function Remapping
// =============================================================================

/// Remap functions for Postgres dialect.
pub fn remap_function_postgres(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "STRFTIME" => Some("TO_CHAR"),
        "DATE_FORMAT" => Some("TO_CHAR"),
        "FORMAT" => Some("TO_CHAR"),
        "NVL" => Some("COALESCE"),
        "IFNULL" => Some("COALESCE"),
        "ISNULL" => Some("COALESCE"),
        "LEN" => Some("LENGTH"),
        _ => None,
    }
}

/// Remap functions for MySQL dialect.
pub fn remap_function_mysql(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "STRFTIME" => Some("DATE_FORMAT"),
        "TO_CHAR" => Some("DATE_FORMAT"),
        "NVL" => Some("IFNULL"),
        "ISNULL" => Some("IFNULL"),
        "SUBSTR" => Some("SUBSTRING"),
        "LEN" => Some("CHAR_LENGTH"),
        _ => None,
    }
}

/// Remap functions for SQL Server dialect.
pub fn remap_function_sqlserver(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "LENGTH" => Some("LEN"),
        "SUBSTR" => Some("SUBSTRING"),
        "NOW" => Some("GETDATE"),
        "STRFTIME" => Some("FORMAT"),
        "TO_CHAR" => Some("FORMAT"),
        "DATE_FORMAT" => Some("FORMAT"),
        "NVL" => Some("ISNULL"),
        "IFNULL" => Some("ISNULL"),
        _ => None,
    }
}

/// Remap functions for Oracle dialect.
pub fn remap_function_oracle(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "IFNULL" => Some("NVL"),
        "ISNULL" => Some("NVL"),
        "SUBSTRING" => Some("SUBSTR"),
        "LEN" => Some("LENGTH"),
        "STRFTIME" => Some("TO_CHAR"),
        "DATE_FORMAT" => Some("TO_CHAR"),
        _ => None,
    }
}

/// Remap functions for DB2 and Derby dialects.
pub fn remap_function_db2(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("COALESCE"),
        "IFNULL" => Some("COALESCE"),
        "ISNULL" => Some("COALESCE"),
        "SUBSTRING" => Some("SUBSTR"),
        "LEN" => Some("LENGTH"),
        _ => None,
    }
}

/// Remap functions for SQLite dialect.
pub fn remap_function_sqlite(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("IFNULL"),
        "ISNULL" => Some("IFNULL"),
        "LEN" => Some("LENGTH"),
        "SUBSTRING" => Some("SUBSTR"),
        "TO_CHAR" => Some("STRFTIME"),
        "DATE_FORMAT" => Some("STRFTIME"),
        _ => None,
    }
}

/// Remap functions for HANA dialect.
pub fn remap_function_hana(name: &str) -> Option<&'static str> {
    match name.to_uppercase().as_str() {
        "NVL" => Some("IFNULL"),
        "ISNULL" => Some("IFNULL"),
        "LEN" => Some("LENGTH"),
        _ => None,
    }
}
