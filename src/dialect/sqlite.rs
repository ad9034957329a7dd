//! SQLite dialect.
//!
//! SQLite has no temporal storage class and no row locks. Dates are bound
//! and stored as ISO text, and date parts come from `strftime`.

use std::sync::Arc;

use super::helpers;
use super::resolvers::{CharacterStreamResolver, TemporalTextResolver};
use super::{DatabaseInfo, LimitStyle, LockMode, SqlDialect, SqlFunction};
use crate::expr::{FunctionKind, LogicalType, TemporalKind};
use crate::resolve::Resolver;
use crate::types::{SqlType, SqliteTemporalProcessor, TypedLiteralProcessor, ValueProcessor};

/// SQLite dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new("SQLite", 3, 45).with_generated_keys(true, false)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn format_temporal_literal(&self, kind: TemporalKind, text: &str) -> String {
        helpers::format_temporal_plain(kind, text)
    }

    fn limit_style(&self, _info: &DatabaseInfo) -> Option<LimitStyle> {
        Some(LimitStyle::LimitOffset)
    }

    fn lock_clause(&self, _mode: LockMode, _timeout_ms: Option<u64>) -> Option<String> {
        None
    }

    fn function(&self, kind: &FunctionKind) -> Option<SqlFunction> {
        match kind {
            FunctionKind::Year => Some(SqlFunction::Template("CAST(strftime('%Y', {0}) AS INTEGER)")),
            FunctionKind::Month => Some(SqlFunction::Template("CAST(strftime('%m', {0}) AS INTEGER)")),
            FunctionKind::Day => Some(SqlFunction::Template("CAST(strftime('%d', {0}) AS INTEGER)")),
            FunctionKind::Hour => Some(SqlFunction::Template("CAST(strftime('%H', {0}) AS INTEGER)")),
            _ => None,
        }
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_sqlite(name)
    }

    fn sql_type_for(&self, ty: &LogicalType) -> Option<SqlType> {
        ty.is_temporal().then_some(SqlType::VARCHAR)
    }

    fn resolvers(&self) -> Vec<Arc<dyn Resolver>> {
        vec![
            Arc::new(TemporalTextResolver),
            Arc::new(CharacterStreamResolver),
        ]
    }

    fn value_processors(&self) -> Vec<Arc<dyn ValueProcessor>> {
        vec![
            Arc::new(TypedLiteralProcessor),
            Arc::new(SqliteTemporalProcessor),
        ]
    }
}
