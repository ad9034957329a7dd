//! # relsql
//!
//! Compiles relational expression trees into dialect-correct,
//! parameterized SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Expression tree (paths, targets, filters)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolver registry + context]
//! ┌─────────────────────────────────────────────────────────┐
//! │         SQL text with :[NNNN] named placeholders         │
//! │         + shared parameter accumulator                   │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [statement preparer]
//! ┌─────────────────────────────────────────────────────────┐
//! │      SqlStatement (bind markers + ordered parameters)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every stage consults the active [`Dialect`] for limits, locks, functions,
//! literal formats and type mapping.

pub mod config;
pub mod context;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod mapping;
pub mod projection;
pub mod query;
pub mod resolve;
pub mod statement;
pub mod token;
pub mod translate;
pub mod types;

#[cfg(test)]
pub mod test_utils;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::context::{AliasMode, CompositionContext};
    pub use crate::dialect::{Dialect, DialectKind, LockMode, SqlDialect};
    pub use crate::error::{SqlError, SqlResult};
    pub use crate::expr::{
        // Constructors
        avg,
        count,
        count_star,
        current_date,
        current_timestamp,
        func,
        lit,
        lower,
        max,
        min,
        path,
        raw,
        sum,
        upper,
        // Types
        DataTarget,
        Expression,
        Filter,
        FilterExt,
        IntoExpression,
        Join,
        MatchMode,
        RelationalTarget,
        Sort,
        TemporalKind,
        Value,
    };
    pub use crate::projection::{Projection, Selection};
    pub use crate::query::{Compiler, DeleteStatement, InsertStatement, SelectQuery, UpdateStatement};
    pub use crate::statement::{SqlParameter, SqlStatement};
}

// Also export at crate root for convenience
pub use config::Settings;
pub use dialect::{Dialect, DialectKind};
pub use error::{SqlError, SqlResult};
pub use query::{Compiler, SelectQuery};
pub use statement::SqlStatement;
