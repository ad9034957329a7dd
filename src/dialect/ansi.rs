//! ANSI SQL dialect (reference implementation).
//!
//! Uses every trait default. ANSI SQL has no portable row-limit syntax the
//! compiler relies on, so limits are rejected.

use super::SqlDialect;

/// ANSI SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Ansi;

impl SqlDialect for Ansi {
    fn name(&self) -> &'static str {
        "ansi"
    }
}
