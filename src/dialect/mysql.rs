//! MySQL dialect.
//!
//! MySQL differences from ANSI:
//! - Numeric boolean literals
//! - `LOCK IN SHARE MODE` for shared row locks
//! - Native `YEAR()`/`MONTH()`/... date-part functions
//! - Generated keys are returned without naming columns

use super::functions::date_part_native;
use super::helpers;
use super::{DatabaseInfo, ErrorKind, LimitStyle, LockMode, SqlDialect, SqlFunction};
use crate::expr::FunctionKind;

/// MySQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new("MySQL", 8, 0).with_generated_keys(true, true)
    }

    fn quote_string(&self, s: &str) -> String {
        // backslash is an escape character in MySQL string literals
        helpers::quote_string_single(&s.replace('\\', "\\\\"))
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn limit_style(&self, _info: &DatabaseInfo) -> Option<LimitStyle> {
        Some(LimitStyle::LimitOffset)
    }

    fn lock_clause(&self, mode: LockMode, timeout_ms: Option<u64>) -> Option<String> {
        Some(match mode {
            LockMode::Exclusive => helpers::for_update(timeout_ms),
            LockMode::Shared => "LOCK IN SHARE MODE".into(),
        })
    }

    fn function(&self, kind: &FunctionKind) -> Option<SqlFunction> {
        date_part_native(kind)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_mysql(name)
    }

    fn classify_error(&self, native_code: i32, _sql_state: Option<&str>) -> Option<ErrorKind> {
        match native_code {
            1205 | 3572 => Some(ErrorKind::LockTimeout),
            1213 => Some(ErrorKind::Deadlock),
            _ => None,
        }
    }
}
