//! DB2 dialect.

use super::functions::date_part_native;
use super::helpers;
use super::{DatabaseInfo, IdentifierCase, LimitStyle, LockMode, SqlDialect, SqlFunction};
use crate::expr::{FunctionKind, TemporalKind};

/// DB2 dialect.
#[derive(Debug, Clone, Copy)]
pub struct Db2;

impl SqlDialect for Db2 {
    fn name(&self) -> &'static str {
        "db2"
    }

    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new("DB2", 11, 5)
            .with_generated_keys(true, false)
            .with_identifier_case(IdentifierCase::Upper)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn format_temporal_literal(&self, kind: TemporalKind, text: &str) -> String {
        helpers::format_temporal_function(kind, text)
    }

    fn limit_style(&self, info: &DatabaseInfo) -> Option<LimitStyle> {
        if info.major_version >= 11 {
            Some(LimitStyle::OffsetFetch)
        } else {
            Some(LimitStyle::RowNumber("rownumber() over()"))
        }
    }

    fn lock_clause(&self, mode: LockMode, _timeout_ms: Option<u64>) -> Option<String> {
        Some(match mode {
            LockMode::Exclusive => "FOR UPDATE WITH RS".into(),
            LockMode::Shared => "FOR READ ONLY WITH RS".into(),
        })
    }

    fn generated_keys_by_name(&self) -> bool {
        true
    }

    fn function(&self, kind: &FunctionKind) -> Option<SqlFunction> {
        date_part_native(kind)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_db2(name)
    }

    fn supports_null_type(&self) -> bool {
        false
    }
}
