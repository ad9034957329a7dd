//! Apache Derby dialect.

use super::functions::date_part_native;
use super::helpers;
use super::{DatabaseInfo, IdentifierCase, LimitStyle, LockMode, SqlDialect, SqlFunction};
use crate::expr::{FunctionKind, TemporalKind};

/// Apache Derby dialect.
#[derive(Debug, Clone, Copy)]
pub struct Derby;

impl SqlDialect for Derby {
    fn name(&self) -> &'static str {
        "derby"
    }

    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new("Apache Derby", 10, 16)
            .with_generated_keys(true, false)
            .with_identifier_case(IdentifierCase::Upper)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn format_temporal_literal(&self, kind: TemporalKind, text: &str) -> String {
        helpers::format_temporal_function(kind, text)
    }

    fn limit_style(&self, _info: &DatabaseInfo) -> Option<LimitStyle> {
        Some(LimitStyle::OffsetFetch)
    }

    fn lock_clause(&self, mode: LockMode, _timeout_ms: Option<u64>) -> Option<String> {
        Some(match mode {
            LockMode::Exclusive => "FOR UPDATE".into(),
            LockMode::Shared => "FOR READ ONLY".into(),
        })
    }

    fn function(&self, kind: &FunctionKind) -> Option<SqlFunction> {
        date_part_native(kind)
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        helpers::remap_function_db2(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_fetch() {
        let style = Derby.limit_style(&Derby.default_info()).unwrap();
        assert_eq!(
            style.apply("SELECT a FROM t", 5, 10, false),
            "SELECT a FROM t OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn test_native_date_parts() {
        let f = Derby.function(&FunctionKind::Year).unwrap();
        assert_eq!(f.render(&["d".into()], false), "YEAR(d)");
    }
}
