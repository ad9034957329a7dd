//! Executable statements.
//!
//! Generated SQL carries `:[NNNN]` placeholders that name entries in the
//! context's parameter accumulator. [`prepare`] rewrites them into bind
//! markers and collects the parameters in marker order, which is the order a
//! positional executor binds them in.

mod parameter;
mod prepare;

pub use parameter::{ParameterRenderer, SqlParameter};
pub use prepare::prepare;

/// Final SQL text plus parameters in bind order.
///
/// Parameter `i` binds to the `i`-th marker, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub parameters: Vec<SqlParameter>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>, parameters: Vec<SqlParameter>) -> Self {
        Self {
            sql: sql.into(),
            parameters,
        }
    }

    /// Number of values the executor has to bind.
    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }
}

impl std::fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sql)
    }
}
