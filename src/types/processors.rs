//! Deserialization pre-processors.
//!
//! Processors run in registration order before structural conversion; each
//! sees the output of the one before it.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::error::{SqlError, SqlResult};
use crate::expr::{LogicalType, Value};

/// A step applied to raw driver values before structural conversion.
pub trait ValueProcessor: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Transform `value`, or return it unchanged if it is not applicable.
    fn process(&self, value: Value, expected: &LogicalType) -> SqlResult<Value>;
}

// =============================================================================
// Typed literal unwrapping
// =============================================================================

static TYPED_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^\s*(?:DATE|TIME|TIMESTAMP)\s*'((?:[^']|'')*)'\s*$").unwrap()
});

static FUNCTION_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)^\s*(?:TO_DATE|TO_TIMESTAMP|DATE|TIME|TIMESTAMP)\s*\(\s*'((?:[^']|'')*)'(?:\s*,\s*'[^']*')?\s*\)\s*$",
    )
    .unwrap()
});

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*N?'((?:[^']|'')*)'\s*$").unwrap()
});

static HEX_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:X'([0-9a-f]*)'|HEXTORAW\('([0-9a-f]*)'\)|'\\x([0-9a-f]*)'::bytea)\s*$").unwrap()
});

/// Unwraps SQL literal text (`DATE '...'`, `TO_DATE('...')`, `'...'`,
/// `X'..'`) into the raw value it encodes.
///
/// Only applies to strings read where a typed value is expected, so plain
/// text columns pass through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypedLiteralProcessor;

impl ValueProcessor for TypedLiteralProcessor {
    fn name(&self) -> &'static str {
        "typed-literal"
    }

    fn process(&self, value: Value, expected: &LogicalType) -> SqlResult<Value> {
        let Value::String(text) = &value else {
            return Ok(value);
        };
        match expected {
            ty if ty.is_temporal() => {
                let inner = TYPED_LITERAL
                    .captures(text)
                    .or_else(|| FUNCTION_LITERAL.captures(text))
                    .or_else(|| QUOTED.captures(text))
                    .and_then(|c| c.get(1));
                Ok(match inner {
                    Some(m) => Value::String(m.as_str().replace("''", "'")),
                    None => value,
                })
            }
            LogicalType::Bytes | LogicalType::Blob | LogicalType::ByteStream => {
                let digits = HEX_LITERAL
                    .captures(text)
                    .and_then(|c| c.get(1).or_else(|| c.get(2)).or_else(|| c.get(3)));
                match digits {
                    Some(m) => Ok(Value::Bytes(decode_hex(m.as_str())?)),
                    None => Ok(value),
                }
            }
            LogicalType::String | LogicalType::Clob | LogicalType::CharStream => {
                Ok(match QUOTED.captures(text).and_then(|c| c.get(1)) {
                    Some(m) => Value::String(m.as_str().replace("''", "'")),
                    None => value,
                })
            }
            _ => Ok(value),
        }
    }
}

fn decode_hex(digits: &str) -> SqlResult<Vec<u8>> {
    if digits.len() % 2 != 0 {
        return Err(SqlError::conversion(format!(
            "hex literal '{digits}' has an odd number of digits"
        )));
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|e| SqlError::conversion(format!("bad hex literal '{digits}': {e}")))
        })
        .collect()
}

// =============================================================================
// SQLite temporal coercion
// =============================================================================

/// SQLite has no temporal storage class: dates come back as ISO text, epoch
/// milliseconds or epoch seconds as a double.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteTemporalProcessor;

impl ValueProcessor for SqliteTemporalProcessor {
    fn name(&self) -> &'static str {
        "sqlite-temporal"
    }

    fn process(&self, value: Value, expected: &LogicalType) -> SqlResult<Value> {
        if !expected.is_temporal() {
            return Ok(value);
        }
        let datetime = match &value {
            Value::Long(millis) => DateTime::from_timestamp_millis(*millis)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| SqlError::conversion(format!("epoch {millis} out of range")))?,
            Value::Int(secs) => DateTime::from_timestamp(i64::from(*secs), 0)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| SqlError::conversion(format!("epoch {secs} out of range")))?,
            Value::Double(secs) => {
                let millis = (secs * 1000.0).round() as i64;
                DateTime::from_timestamp_millis(millis)
                    .map(|dt| dt.naive_utc())
                    .ok_or_else(|| SqlError::conversion(format!("epoch {secs} out of range")))?
            }
            Value::String(text) => match parse_iso(text) {
                Some(parsed) => return Ok(parsed),
                None => return Ok(value),
            },
            _ => return Ok(value),
        };
        Ok(Value::DateTime(datetime))
    }
}

/// Parse ISO-8601 text in the shapes SQLite's date functions produce.
fn parse_iso(text: &str) -> Option<Value> {
    let text = text.trim();
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Value::DateTime(dt));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Value::Date(d));
    }
    NaiveTime::parse_from_str(text, "%H:%M:%S%.f")
        .ok()
        .map(Value::Time)
}

// =============================================================================
// Offset timestamps
// =============================================================================

/// Parses `timestamptz` text such as `2024-01-02 10:00:00+02` into a zoned
/// value.
#[derive(Debug, Default, Clone, Copy)]
pub struct OffsetTimestampProcessor;

impl ValueProcessor for OffsetTimestampProcessor {
    fn name(&self) -> &'static str {
        "offset-timestamp"
    }

    fn process(&self, value: Value, expected: &LogicalType) -> SqlResult<Value> {
        let (Value::String(text), LogicalType::ZonedDateTime) = (&value, expected) else {
            return Ok(value);
        };
        let text = text.trim();
        let parsed = DateTime::parse_from_rfc3339(text)
            .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%:z"))
            .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z"));
        Ok(parsed.map(Value::Zoned).unwrap_or(value))
    }
}
