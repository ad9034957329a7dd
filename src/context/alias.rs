//! Alias generation.
//!
//! Generated aliases look like `pers_0_1`: up to four safe characters of the
//! local name, a per-prefix duplicate counter, and the owning context's
//! sequence number.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::SettingsError;

/// Maximum number of name characters kept in a generated alias.
pub const ALIAS_PREFIX_LEN: usize = 4;

/// Policy for table and column aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasMode {
    /// Only explicit aliases already on the path or target.
    #[default]
    Default,
    /// Explicit aliases, otherwise generated ones.
    Auto,
    /// Never emit aliases.
    Unsupported,
}

impl FromStr for AliasMode {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "default" => Ok(AliasMode::Default),
            "auto" => Ok(AliasMode::Auto),
            "unsupported" | "none" => Ok(AliasMode::Unsupported),
            other => Err(SettingsError::InvalidConfig(format!(
                "unknown alias mode '{other}'"
            ))),
        }
    }
}

/// Lowercased, truncated, `[a-z0-9_]`-only prefix of a local name.
pub fn alias_prefix(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .take(ALIAS_PREFIX_LEN)
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '_' => c,
            _ => '_',
        })
        .collect()
}

pub fn format_alias(prefix: &str, duplicate: u32, sequence: u32) -> String {
    format!("{prefix}_{duplicate}_{sequence}")
}

/// Hands out aliases with a duplicate counter per prefix.
#[derive(Debug, Default)]
pub struct AliasGenerator {
    counters: HashMap<String, u32>,
}

impl AliasGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next alias for `name` within a context numbered `sequence`.
    pub fn next(&mut self, name: &str, sequence: u32) -> String {
        let prefix = alias_prefix(name);
        let counter = self.counters.entry(prefix.clone()).or_insert(0);
        let alias = format_alias(&prefix, *counter, sequence);
        *counter += 1;
        alias
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_is_safe_and_short() {
        assert_eq!(alias_prefix("Person"), "pers");
        assert_eq!(alias_prefix("ab"), "ab");
        assert_eq!(alias_prefix("Ä-x y"), "__x_");
        // multi-byte characters count as one character
        assert_eq!(alias_prefix("日本語"), "___");
    }

    #[test]
    fn test_colliding_prefixes_get_distinct_counters() {
        let mut generator = AliasGenerator::new();
        assert_eq!(generator.next("person", 0), "pers_0_0");
        assert_eq!(generator.next("personal", 0), "pers_1_0");
        assert_eq!(generator.next("address", 0), "addr_0_0");
    }

    #[test]
    fn test_sequence_is_appended() {
        let mut generator = AliasGenerator::new();
        assert_eq!(generator.next("order", 2), "orde_0_2");
    }

    #[test]
    fn test_alias_mode_from_str() {
        assert_eq!("AUTO".parse::<AliasMode>().unwrap(), AliasMode::Auto);
        assert!("sometimes".parse::<AliasMode>().is_err());
    }
}
