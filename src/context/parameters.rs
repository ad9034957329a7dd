//! Named-parameter accumulator shared by every context of one statement.
//!
//! Names use the fixed-width wire format `:[NNNN]` (colon, bracket, four
//! zero-padded digits, bracket). The statement preparer scans for exactly
//! this shape, so [`PLACEHOLDER_WIDTH`] must not change on one side only.

use std::sync::{Mutex, PoisonError};

use crate::error::{SqlError, SqlResult};
use crate::statement::SqlParameter;

/// Width of a placeholder token in characters.
pub const PLACEHOLDER_WIDTH: usize = 7;

/// Largest sequence number that fits the four-digit field.
pub const MAX_PARAMETERS: usize = 9999;

/// Format the placeholder for a 1-based sequence number.
pub fn placeholder_name(sequence: usize) -> String {
    format!(":[{sequence:04}]")
}

/// Parse a token with the exact placeholder shape into its sequence number.
pub fn parse_placeholder(token: &str) -> Option<usize> {
    let bytes = token.as_bytes();
    if bytes.len() != PLACEHOLDER_WIDTH
        || bytes[0] != b':'
        || bytes[1] != b'['
        || bytes[PLACEHOLDER_WIDTH - 1] != b']'
    {
        return None;
    }
    let digits = &token[2..PLACEHOLDER_WIDTH - 1];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Append-only map from generated placeholder name to parameter.
///
/// Insertion allocates the name and appends under one lock, so names stay
/// dense and ordered even if the context tree is shared across threads.
#[derive(Debug, Default)]
pub struct NamedParameters {
    entries: Mutex<Vec<SqlParameter>>,
}

impl NamedParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a parameter and return its placeholder name.
    pub fn add(&self, parameter: SqlParameter) -> SqlResult<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= MAX_PARAMETERS {
            return Err(SqlError::preparation(format!(
                "statement exceeds {MAX_PARAMETERS} named parameters"
            )));
        }
        entries.push(parameter);
        Ok(placeholder_name(entries.len()))
    }

    /// Look up a parameter by its placeholder name.
    pub fn get(&self, name: &str) -> Option<SqlParameter> {
        let sequence = parse_placeholder(name)?;
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        sequence
            .checked_sub(1)
            .and_then(|index| entries.get(index))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries with their names, in insertion order.
    pub fn entries(&self) -> Vec<(String, SqlParameter)> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .enumerate()
            .map(|(i, p)| (placeholder_name(i + 1), p.clone()))
            .collect()
    }
}
