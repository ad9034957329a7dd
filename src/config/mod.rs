//! Configuration module for the compiler.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{expand_env_vars, CompilerSettings, DialectSettings, Settings, SettingsError};
