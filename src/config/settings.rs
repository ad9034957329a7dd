//! TOML-based configuration for the compiler.
//!
//! Supports a config file (relsql.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [compiler]
//! dialect = "${RELSQL_DIALECT}"
//! alias_mode = "auto"
//! like_escape = true
//! null_type = 12  # VARCHAR
//!
//! [dialect]
//! major_version = 12
//! minor_version = 2
//! identifier_case = "upper"
//! generated_keys = true
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::context::AliasMode;
use crate::dialect::{DatabaseInfo, DialectKind, IdentifierCase};
use crate::types::SqlType;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Compiler behavior.
    pub compiler: CompilerSettings,

    /// Static capability overrides used without live metadata.
    pub dialect: DialectSettings,
}

/// Compiler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CompilerSettings {
    /// Dialect name (supports ${ENV_VAR} expansion).
    pub dialect: String,

    /// Table and column alias policy.
    pub alias_mode: AliasMode,

    /// Force LIKE ... ESCAPE support on or off.
    pub like_escape: Option<bool>,

    /// Numeric SQL type used to bind NULLs whose type cannot be inferred.
    pub null_type: Option<i32>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            dialect: "ansi".to_string(),
            alias_mode: AliasMode::Default,
            like_escape: None,
            null_type: None,
        }
    }
}

/// Capability overrides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DialectSettings {
    pub major_version: Option<u32>,
    pub minor_version: Option<u32>,
    pub identifier_case: Option<IdentifierCase>,
    /// Whether the driver can return generated keys.
    pub generated_keys: Option<bool>,
}

impl DialectSettings {
    fn is_empty(&self) -> bool {
        *self == DialectSettings::default()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, SettingsError> {
        Ok(toml::from_str(content)?)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `RELSQL_CONFIG`
    /// 2. `./relsql.toml`
    /// 3. `~/.config/relsql/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("RELSQL_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("relsql.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("relsql").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// The configured dialect, with environment variables expanded.
    pub fn dialect_kind(&self) -> Result<DialectKind, SettingsError> {
        expand_env_vars(&self.compiler.dialect)?.trim().parse()
    }

    /// Capabilities to seed the dialect with, or `None` to use vendor
    /// defaults until a live metadata lookup.
    pub fn database_info(&self) -> Result<Option<DatabaseInfo>, SettingsError> {
        if self.dialect.is_empty() && self.compiler.like_escape.is_none() {
            return Ok(None);
        }
        let mut info = self.dialect_kind()?.vendor().default_info();
        let overrides = &self.dialect;
        if let Some(major) = overrides.major_version {
            info.major_version = major;
            info.minor_version = overrides.minor_version.unwrap_or(0);
        } else if overrides.minor_version.is_some() {
            return Err(SettingsError::InvalidConfig(
                "dialect.minor_version requires dialect.major_version".to_string(),
            ));
        }
        if let Some(case) = overrides.identifier_case {
            info.identifier_case = case;
        }
        if let Some(generated_keys) = overrides.generated_keys {
            info.supports_generated_keys = generated_keys;
        }
        if let Some(like_escape) = self.compiler.like_escape {
            info.supports_like_escape = like_escape;
        }
        Ok(Some(info))
    }

    /// NULL binding type override.
    pub fn null_type(&self) -> Option<SqlType> {
        self.compiler.null_type.map(SqlType::new)
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }
        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR ends at non-alphanumeric/underscore
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };
        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
