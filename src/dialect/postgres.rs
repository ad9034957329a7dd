//! PostgreSQL dialect.

use std::sync::Arc;

use super::helpers;
use super::resolvers::CharacterStreamResolver;
use super::{DatabaseInfo, ErrorKind, IdentifierCase, LimitStyle, LockMode, SqlDialect};
use crate::expr::{LogicalType, TemporalKind};
use crate::resolve::Resolver;
use crate::statement::ParameterRenderer;
use crate::types::{OffsetTimestampProcessor, SqlType, TypedLiteralProcessor, ValueProcessor};

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new("PostgreSQL", 16, 0)
            .with_generated_keys(true, false)
            .with_identifier_case(IdentifierCase::Lower)
    }

    fn format_binary_literal(&self, bytes: &[u8]) -> String {
        helpers::format_binary_bytea(bytes)
    }

    fn limit_style(&self, _info: &DatabaseInfo) -> Option<LimitStyle> {
        Some(LimitStyle::LimitOffset)
    }

    fn lock_clause(&self, mode: LockMode, timeout_ms: Option<u64>) -> Option<String> {
        let clause = match mode {
            LockMode::Exclusive => "FOR UPDATE",
            LockMode::Shared => "FOR SHARE",
        };
        // lock_timeout is a session setting; only NOWAIT is expressible inline
        Some(match timeout_ms {
            Some(0) => format!("{clause} NOWAIT"),
            _ => clause.to_string(),
        })
    }

    fn generated_keys_by_name(&self) -> bool {
        true
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_postgres(name)
    }

    fn sql_type_for(&self, ty: &LogicalType) -> Option<SqlType> {
        match ty {
            LogicalType::Blob | LogicalType::ByteStream => {
                Some(SqlType::vendor(SqlType::BINARY.code, "bytea"))
            }
            LogicalType::Clob | LogicalType::CharStream => {
                Some(SqlType::vendor(SqlType::VARCHAR.code, "text"))
            }
            _ => None,
        }
    }

    fn temporal_parameter_renderer(&self, kind: TemporalKind) -> Option<ParameterRenderer> {
        Some(match kind {
            TemporalKind::Date => ParameterRenderer::template("CAST(? AS DATE)"),
            TemporalKind::Time => ParameterRenderer::template("CAST(? AS TIME)"),
            TemporalKind::DateTime => ParameterRenderer::template("CAST(? AS TIMESTAMP)"),
        })
    }

    fn resolvers(&self) -> Vec<Arc<dyn Resolver>> {
        vec![Arc::new(CharacterStreamResolver)]
    }

    fn value_processors(&self) -> Vec<Arc<dyn ValueProcessor>> {
        vec![
            Arc::new(TypedLiteralProcessor),
            Arc::new(OffsetTimestampProcessor),
        ]
    }

    fn classify_error(&self, _native_code: i32, sql_state: Option<&str>) -> Option<ErrorKind> {
        match sql_state? {
            "55P03" => Some(ErrorKind::LockTimeout),
            "40P01" => Some(ErrorKind::Deadlock),
            _ => None,
        }
    }
}
