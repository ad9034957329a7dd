//! Dotted property paths.

use std::fmt;

use crate::error::{SqlError, SqlResult};

/// A property path such as `address.city`.
///
/// The last segment is the path's own `name`; earlier segments live in the
/// `parent` chain. A path may carry an explicit alias that overrides
/// generated aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[must_use = "builders have no effect until used"]
pub struct Path {
    name: String,
    parent: Option<Box<Path>>,
    alias: Option<String>,
}

impl Path {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            parent: None,
            alias: None,
        }
    }

    /// Parse a dotted name into a path chain.
    pub fn parse(dotted: &str) -> Self {
        let mut segments = dotted.split('.');
        // split always yields at least one segment
        let first = segments.next().unwrap_or_default();
        segments.fold(Path::new(first), |parent, segment| parent.child(segment))
    }

    /// A path one level below this one.
    pub fn child(self, name: &str) -> Self {
        Self {
            name: name.into(),
            parent: Some(Box::new(self)),
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Path> {
        self.parent.as_deref()
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The full dotted key, ignoring aliases.
    pub fn key(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}.{}", parent.key(), self.name),
            None => self.name.clone(),
        }
    }

    /// Segments from root to leaf.
    pub fn segments(&self) -> Vec<&str> {
        let mut out = match &self.parent {
            Some(parent) => parent.segments(),
            None => Vec::new(),
        };
        out.push(&self.name);
        out
    }

    pub fn validate(&self) -> SqlResult<()> {
        if self.name.trim().is_empty() {
            return Err(SqlError::invalid("path segment must not be empty"));
        }
        if self.name.contains('.') {
            return Err(SqlError::invalid(format!(
                "path segment '{}' must not contain '.'",
                self.name
            )));
        }
        if let Some(alias) = &self.alias {
            if alias.trim().is_empty() {
                return Err(SqlError::invalid(format!(
                    "alias of path '{}' must not be empty",
                    self.key()
                )));
            }
        }
        match &self.parent {
            Some(parent) => parent.validate(),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Shorthand for [`Path::parse`].
pub fn path(dotted: &str) -> Path {
    Path::parse(dotted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dotted() {
        let p = Path::parse("address.city");
        assert_eq!(p.name(), "city");
        assert_eq!(p.parent().map(Path::name), Some("address"));
        assert_eq!(p.key(), "address.city");
        assert_eq!(p.segments(), vec!["address", "city"]);
    }

    #[test]
    fn test_validate_rejects_empty_segment() {
        assert!(Path::parse("a..b").validate().is_err());
        assert!(Path::new("").validate().is_err());
        assert!(Path::new("ok").with_alias(" ").validate().is_err());
        assert!(Path::parse("a.b").validate().is_ok());
    }
}
