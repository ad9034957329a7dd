//! SQL Server dialect.
//!
//! SQL Server has significant differences from ANSI:
//! - OFFSET FETCH for pagination (requires ORDER BY), ROW_NUMBER before 2012
//! - N'...' prefix for Unicode strings
//! - No boolean literals; BIT columns take 1/0
//! - Row locks are table hints, not a trailing clause
//! - `DATEPART` instead of `EXTRACT`

use super::helpers;
use super::{DatabaseInfo, ErrorKind, LimitStyle, LockMode, SqlDialect, SqlFunction};
use crate::expr::{FunctionKind, LogicalType, TemporalKind};
use crate::types::SqlType;

const DATETIMEOFFSET: i32 = -155;

/// SQL Server dialect.
#[derive(Debug, Clone, Copy)]
pub struct SqlServer;

impl SqlDialect for SqlServer {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new("Microsoft SQL Server", 15, 0).with_generated_keys(true, false)
    }

    fn quote_string(&self, s: &str) -> String {
        if !s.is_ascii() {
            helpers::quote_string_unicode(s)
        } else {
            helpers::quote_string_single(s)
        }
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn format_temporal_literal(&self, kind: TemporalKind, text: &str) -> String {
        helpers::format_temporal_plain(kind, text)
    }

    fn limit_style(&self, info: &DatabaseInfo) -> Option<LimitStyle> {
        if info.major_version >= 11 {
            Some(LimitStyle::OffsetFetchRequired)
        } else {
            Some(LimitStyle::RowNumber("row_number() over (order by (select 0))"))
        }
    }

    fn lock_clause(&self, _mode: LockMode, _timeout_ms: Option<u64>) -> Option<String> {
        None
    }

    fn function(&self, kind: &FunctionKind) -> Option<SqlFunction> {
        match kind {
            FunctionKind::Year => Some(SqlFunction::Template("DATEPART(year, {0})")),
            FunctionKind::Month => Some(SqlFunction::Template("DATEPART(month, {0})")),
            FunctionKind::Day => Some(SqlFunction::Template("DATEPART(day, {0})")),
            FunctionKind::Hour => Some(SqlFunction::Template("DATEPART(hour, {0})")),
            FunctionKind::CurrentDate => Some(SqlFunction::Keyword("CAST(GETDATE() AS DATE)")),
            _ => None,
        }
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_sqlserver(name)
    }

    fn sql_type_for(&self, ty: &LogicalType) -> Option<SqlType> {
        match ty {
            LogicalType::Boolean => Some(SqlType::BIT),
            LogicalType::ZonedDateTime => Some(SqlType::vendor(DATETIMEOFFSET, "DATETIMEOFFSET")),
            _ => None,
        }
    }

    fn logical_type_for(&self, ty: &SqlType) -> Option<LogicalType> {
        (ty.code == DATETIMEOFFSET).then_some(LogicalType::ZonedDateTime)
    }

    fn classify_error(&self, native_code: i32, _sql_state: Option<&str>) -> Option<ErrorKind> {
        match native_code {
            1222 => Some(ErrorKind::LockTimeout),
            1205 => Some(ErrorKind::Deadlock),
            _ => None,
        }
    }
}
