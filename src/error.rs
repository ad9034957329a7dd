//! Compiler error types.
//!
//! Every error aborts the statement being built; there is no partial SQL.

use thiserror::Error;

use crate::config::SettingsError;
use crate::expr::ExpressionKind;
use crate::resolve::TargetType;

/// Result type for compiler operations.
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors raised while compiling an expression tree to SQL.
#[derive(Error, Debug)]
pub enum SqlError {
    /// An expression failed local validation.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// Every registered resolver declined the expression.
    #[error("no resolver produced {target:?} for {kind:?} expression")]
    UnresolvedExpression {
        kind: ExpressionKind,
        target: TargetType,
    },

    /// Placeholder rewriting failed.
    #[error("statement preparation failed: {0}")]
    StatementPreparation(String),

    /// The active dialect cannot express the requested feature.
    #[error("{dialect} does not support {feature}")]
    UnsupportedDialectFeature {
        dialect: &'static str,
        feature: String,
    },

    /// A value could not be coerced to or from the required type.
    #[error("type conversion failed: {0}")]
    TypeConversion(String),

    /// The one-time metadata lookup failed.
    #[error("dialect initialization failed: {0}")]
    DialectInit(String),

    #[error(transparent)]
    Config(#[from] SettingsError),
}

impl SqlError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidExpression(message.into())
    }

    pub fn preparation(message: impl Into<String>) -> Self {
        Self::StatementPreparation(message.into())
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::TypeConversion(message.into())
    }

    pub fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        Self::UnsupportedDialectFeature {
            dialect,
            feature: feature.into(),
        }
    }

    /// Check if the registry ran out of resolvers.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedExpression { .. })
    }

    /// Check if this error came from local validation.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::InvalidExpression(_))
    }

    /// Short stable name of the error category, for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidExpression(_) => "invalid_expression",
            Self::UnresolvedExpression { .. } => "unresolved_expression",
            Self::StatementPreparation(_) => "statement_preparation",
            Self::UnsupportedDialectFeature { .. } => "unsupported_dialect_feature",
            Self::TypeConversion(_) => "type_conversion",
            Self::DialectInit(_) => "dialect_init",
            Self::Config(_) => "config",
        }
    }
}
