//! Oracle dialect.
//!
//! Oracle before 12c has no OFFSET/FETCH, so limits wrap the query in a
//! ROWNUM filter. `DATE` columns carry a time part and read back as
//! date-times. Temporal parameters are bound without a wrapper.

use std::sync::Arc;

use super::helpers;
use super::resolvers::CharacterStreamResolver;
use super::{DatabaseInfo, ErrorKind, IdentifierCase, LimitStyle, LockMode, SqlDialect, SqlFunction};
use crate::expr::{FunctionKind, LogicalType, TemporalKind};
use crate::resolve::Resolver;
use crate::types::SqlType;

/// Oracle dialect.
#[derive(Debug, Clone, Copy)]
pub struct Oracle;

impl SqlDialect for Oracle {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new("Oracle", 19, 0)
            .with_generated_keys(true, false)
            .with_identifier_case(IdentifierCase::Upper)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn format_binary_literal(&self, bytes: &[u8]) -> String {
        helpers::format_binary_hextoraw(bytes)
    }

    fn format_temporal_literal(&self, kind: TemporalKind, text: &str) -> String {
        match kind {
            // no TIME type; keep the text
            TemporalKind::Time => helpers::quote_string_single(text),
            _ => helpers::format_temporal_typed(kind, text),
        }
    }

    fn limit_style(&self, info: &DatabaseInfo) -> Option<LimitStyle> {
        if info.major_version >= 12 {
            Some(LimitStyle::OffsetFetch)
        } else {
            Some(LimitStyle::RowNum)
        }
    }

    fn lock_clause(&self, mode: LockMode, timeout_ms: Option<u64>) -> Option<String> {
        match mode {
            LockMode::Exclusive => Some(helpers::for_update_wait(timeout_ms)),
            LockMode::Shared => None,
        }
    }

    fn generated_keys_by_name(&self) -> bool {
        true
    }

    fn function(&self, kind: &FunctionKind) -> Option<SqlFunction> {
        match kind {
            FunctionKind::Hour => Some(SqlFunction::Template(
                "EXTRACT(HOUR FROM CAST({0} AS TIMESTAMP))",
            )),
            _ => None,
        }
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_oracle(name)
    }

    fn sql_type_for(&self, ty: &LogicalType) -> Option<SqlType> {
        match ty {
            LogicalType::Boolean => Some(SqlType::vendor(SqlType::NUMERIC.code, "NUMBER(1)")),
            _ => None,
        }
    }

    fn logical_type_for(&self, ty: &SqlType) -> Option<LogicalType> {
        (ty.code == SqlType::DATE.code).then_some(LogicalType::DateTime)
    }

    fn resolvers(&self) -> Vec<Arc<dyn Resolver>> {
        vec![Arc::new(CharacterStreamResolver)]
    }

    fn classify_error(&self, native_code: i32, _sql_state: Option<&str>) -> Option<ErrorKind> {
        match native_code {
            // ORA-00054 resource busy (NOWAIT), ORA-30006 WAIT timeout
            54 | 30006 => Some(ErrorKind::LockTimeout),
            60 => Some(ErrorKind::Deadlock),
            _ => None,
        }
    }
}
