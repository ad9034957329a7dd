//! SAP HANA dialect.

use super::helpers;
use super::{DatabaseInfo, ErrorKind, IdentifierCase, LimitStyle, LockMode, SqlDialect, SqlFunction};
use crate::expr::FunctionKind;

/// SAP HANA dialect.
#[derive(Debug, Clone, Copy)]
pub struct Hana;

impl SqlDialect for Hana {
    fn name(&self) -> &'static str {
        "hana"
    }

    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new("HDB", 2, 0).with_identifier_case(IdentifierCase::Upper)
    }

    fn limit_style(&self, _info: &DatabaseInfo) -> Option<LimitStyle> {
        Some(LimitStyle::LimitOffset)
    }

    fn lock_clause(&self, mode: LockMode, timeout_ms: Option<u64>) -> Option<String> {
        Some(match mode {
            LockMode::Exclusive => helpers::for_update_wait(timeout_ms),
            LockMode::Shared => "FOR SHARE LOCK".into(),
        })
    }

    fn function(&self, kind: &FunctionKind) -> Option<SqlFunction> {
        match kind {
            FunctionKind::Day => Some(SqlFunction::Template("DAYOFMONTH({0})")),
            _ => None,
        }
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_hana(name)
    }

    fn classify_error(&self, native_code: i32, _sql_state: Option<&str>) -> Option<ErrorKind> {
        match native_code {
            131 | 146 => Some(ErrorKind::LockTimeout),
            133 => Some(ErrorKind::Deadlock),
            _ => None,
        }
    }
}
