//! H2 dialect.

use super::{DatabaseInfo, IdentifierCase, LimitStyle, SqlDialect};

/// H2 dialect.
#[derive(Debug, Clone, Copy)]
pub struct H2;

impl SqlDialect for H2 {
    fn name(&self) -> &'static str {
        "h2"
    }

    fn default_info(&self) -> DatabaseInfo {
        DatabaseInfo::new("H2", 2, 2)
            .with_generated_keys(true, false)
            .with_identifier_case(IdentifierCase::Upper)
    }

    fn limit_style(&self, _info: &DatabaseInfo) -> Option<LimitStyle> {
        Some(LimitStyle::LimitOffset)
    }

    fn generated_keys_by_name(&self) -> bool {
        true
    }

    fn remap_function(&self, name: &str) -> Option<&'static str> {
        match name.to_uppercase().as_str() {
            "STRFTIME" | "DATE_FORMAT" => Some("FORMATDATETIME"),
            _ => None,
        }
    }
}
