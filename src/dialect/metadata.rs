//! Database capability metadata and the connection seam used to fetch it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the database folds unquoted identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierCase {
    Upper,
    Lower,
    /// Stored as written.
    #[default]
    Mixed,
}

impl IdentifierCase {
    /// Fold an unquoted identifier. Quoted identifiers are returned as-is.
    pub fn apply(&self, ident: &str) -> String {
        if ident.starts_with('"') || ident.starts_with('`') || ident.starts_with('[') {
            return ident.to_string();
        }
        match self {
            IdentifierCase::Upper => ident.to_uppercase(),
            IdentifierCase::Lower => ident.to_lowercase(),
            IdentifierCase::Mixed => ident.to_string(),
        }
    }
}

/// Raw capability flags as a driver reports them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatabaseMetadata {
    pub product_name: String,
    pub product_version: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub supports_get_generated_keys: bool,
    pub generated_key_always_returned: bool,
    pub supports_like_escape_clause: bool,
    pub stores_upper_case_identifiers: bool,
    pub stores_lower_case_identifiers: bool,
}

/// Capabilities a dialect renders against, from metadata or vendor defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub product_name: String,
    pub major_version: u32,
    pub minor_version: u32,
    pub supports_generated_keys: bool,
    pub generated_keys_always_returned: bool,
    pub supports_like_escape: bool,
    pub identifier_case: IdentifierCase,
}

impl DatabaseInfo {
    pub fn new(product_name: &str, major_version: u32, minor_version: u32) -> Self {
        Self {
            product_name: product_name.into(),
            major_version,
            minor_version,
            supports_generated_keys: false,
            generated_keys_always_returned: false,
            supports_like_escape: true,
            identifier_case: IdentifierCase::Mixed,
        }
    }

    pub fn with_generated_keys(mut self, supported: bool, always_returned: bool) -> Self {
        self.supports_generated_keys = supported;
        self.generated_keys_always_returned = always_returned;
        self
    }

    pub fn with_like_escape(mut self, supported: bool) -> Self {
        self.supports_like_escape = supported;
        self
    }

    pub fn with_identifier_case(mut self, case: IdentifierCase) -> Self {
        self.identifier_case = case;
        self
    }

    /// Check if the server is at least `major.minor`.
    pub fn is_at_least(&self, major: u32, minor: u32) -> bool {
        (self.major_version, self.minor_version) >= (major, minor)
    }
}

impl From<DatabaseMetadata> for DatabaseInfo {
    fn from(md: DatabaseMetadata) -> Self {
        let identifier_case = if md.stores_upper_case_identifiers {
            IdentifierCase::Upper
        } else if md.stores_lower_case_identifiers {
            IdentifierCase::Lower
        } else {
            IdentifierCase::Mixed
        };
        Self {
            product_name: md.product_name,
            major_version: md.major_version,
            minor_version: md.minor_version,
            supports_generated_keys: md.supports_get_generated_keys,
            generated_keys_always_returned: md.generated_key_always_returned,
            supports_like_escape: md.supports_like_escape_clause,
            identifier_case,
        }
    }
}

/// A live connection able to describe its database.
pub trait Connection {
    type Error: fmt::Display;

    fn metadata(&self) -> Result<DatabaseMetadata, Self::Error>;
}

/// Lends a connection for the duration of a closure.
pub trait ConnectionProvider {
    type Conn: Connection;

    fn with_connection<R>(&self, f: impl FnOnce(&Self::Conn) -> R) -> R;
}
