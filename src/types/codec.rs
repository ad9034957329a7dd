//! Literal serialization and value deserialization.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::trace;

use super::ValueProcessor;
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::expr::{LogicalType, StreamHandle, TemporalKind, Value};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const ZONED_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f%:z";

/// Converts values to SQL literal text and raw driver values back to
/// logical values.
#[derive(Debug, Clone)]
pub struct ValueCodec<'d> {
    dialect: &'d Dialect,
    processors: Vec<Arc<dyn ValueProcessor>>,
}

impl<'d> ValueCodec<'d> {
    /// A codec with the dialect's processor chain.
    pub fn new(dialect: &'d Dialect) -> Self {
        Self {
            dialect,
            processors: dialect.vendor().value_processors(),
        }
    }

    /// Append a processor after the dialect's own.
    pub fn with_processor(mut self, processor: Arc<dyn ValueProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn processors(&self) -> &[Arc<dyn ValueProcessor>] {
        &self.processors
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Render `value` as SQL literal text.
    ///
    /// `temporal` forces the temporal flavour, e.g. a date-time rendered as a
    /// DATE literal. Lists serialize as a comma-joined sequence.
    pub fn serialize(&self, value: &Value, temporal: Option<TemporalKind>) -> SqlResult<String> {
        let vendor = self.dialect.vendor();
        if let Some(kind) = temporal {
            if !value.is_null() && !matches!(value, Value::List(_)) {
                let text = temporal_text(value, kind)?;
                return Ok(vendor.format_temporal_literal(kind, &text));
            }
        }
        let sql = match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => vendor.format_bool(*b).to_string(),
            Value::Byte(v) => v.to_string(),
            Value::Short(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Long(v) => v.to_string(),
            Value::BigInt(v) => v.to_string(),
            Value::Decimal(v) => v.to_string(),
            Value::Float(v) => finite(f64::from(*v))?.to_string(),
            Value::Double(v) => finite(*v)?.to_string(),
            Value::String(s) | Value::Clob(s) => vendor.quote_string(s),
            Value::CharStream(stream) => vendor.quote_string(&stream.read_string()?),
            Value::Bytes(b) | Value::Blob(b) => vendor.format_binary_literal(b),
            Value::ByteStream(stream) => vendor.format_binary_literal(&stream.read_bytes()?),
            Value::Date(_) => vendor.format_temporal_literal(TemporalKind::Date, &temporal_text(value, TemporalKind::Date)?),
            Value::Time(_) => vendor.format_temporal_literal(TemporalKind::Time, &temporal_text(value, TemporalKind::Time)?),
            Value::DateTime(_) | Value::Zoned(_) => vendor.format_temporal_literal(
                TemporalKind::DateTime,
                &temporal_text(value, TemporalKind::DateTime)?,
            ),
            Value::Enum(v) => v.ordinal.to_string(),
            Value::List(items) => items
                .iter()
                .map(|item| self.serialize(item, temporal))
                .collect::<SqlResult<Vec<_>>>()?
                .join(", "),
        };
        Ok(sql)
    }

    // =========================================================================
    // Deserialization
    // =========================================================================

    /// Convert a raw driver value into `expected`.
    ///
    /// NULL short-circuits. Otherwise the processor chain runs in order,
    /// then structural conversion, then a final assignability check.
    pub fn deserialize(&self, raw: Value, expected: &LogicalType) -> SqlResult<Value> {
        if raw.is_null() {
            return Ok(Value::Null);
        }
        let mut value = raw;
        for processor in &self.processors {
            value = processor.process(value, expected)?;
            trace!(processor = processor.name(), "processed value");
        }
        let value = convert(value, expected)?;
        if !value.is_assignable_to(expected) {
            return Err(SqlError::conversion(format!(
                "cannot convert {} to {:?}",
                value.type_name(),
                expected
            )));
        }
        Ok(value)
    }
}

/// ISO text of a temporal value, `None` for anything else.
pub(crate) fn iso_temporal_text(value: &Value) -> Option<String> {
    match value {
        Value::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
        Value::Time(t) => Some(t.format(TIME_FORMAT).to_string()),
        Value::DateTime(dt) => Some(dt.format(DATETIME_FORMAT).to_string()),
        Value::Zoned(dt) => Some(dt.format(ZONED_FORMAT).to_string()),
        _ => None,
    }
}

fn finite(v: f64) -> SqlResult<f64> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(SqlError::conversion(format!("{v} has no SQL literal form")))
    }
}

/// ISO text of `value` in the given temporal flavour.
fn temporal_text(value: &Value, kind: TemporalKind) -> SqlResult<String> {
    let text = match (value, kind) {
        (Value::Zoned(dt), TemporalKind::DateTime) => dt.format(ZONED_FORMAT).to_string(),
        (Value::String(s), _) => s.clone(),
        _ => match convert(value.clone(), &kind.logical_type())? {
            Value::Date(d) => d.format(DATE_FORMAT).to_string(),
            Value::Time(t) => t.format(TIME_FORMAT).to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            other => {
                return Err(SqlError::conversion(format!(
                    "{} cannot be rendered as {kind:?}",
                    other.type_name()
                )))
            }
        },
    };
    Ok(text)
}

// =============================================================================
// Structural conversion
// =============================================================================

fn integer(value: &Value) -> Option<i128> {
    match value {
        Value::Byte(v) => Some(i128::from(*v)),
        Value::Short(v) => Some(i128::from(*v)),
        Value::Int(v) => Some(i128::from(*v)),
        Value::Long(v) => Some(i128::from(*v)),
        Value::BigInt(v) => Some(*v),
        Value::Bool(b) => Some(i128::from(*b)),
        Value::Decimal(d) if d.fract().is_zero() => d.to_i128(),
        Value::Enum(v) => Some(i128::from(v.ordinal)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn float(value: &Value) -> Option<f64> {
    match value {
        Value::Float(v) => Some(f64::from(*v)),
        Value::Double(v) => Some(*v),
        Value::Decimal(d) => d.to_f64(),
        Value::String(s) => s.trim().parse().ok(),
        other => integer(other).map(|i| i as f64),
    }
}

fn narrow<T: TryFrom<i128>>(value: &Value, target: &str) -> SqlResult<T> {
    let wide = integer(value).ok_or_else(|| {
        SqlError::conversion(format!("cannot convert {} to {target}", value.type_name()))
    })?;
    T::try_from(wide).map_err(|_| SqlError::conversion(format!("{wide} out of range for {target}")))
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Default structural conversion. Values it cannot convert are returned
/// unchanged and rejected by the assignability check.
fn convert(value: Value, expected: &LogicalType) -> SqlResult<Value> {
    if value.is_assignable_to(expected) {
        return Ok(value);
    }
    let converted = match (expected, &value) {
        (LogicalType::String, Value::Clob(s)) => Value::String(s.clone()),
        (LogicalType::String, Value::CharStream(stream)) => Value::String(stream.read_string()?),
        (LogicalType::String, Value::Enum(v)) => Value::String(v.name.clone()),
        (LogicalType::String, Value::Decimal(d)) => Value::String(d.to_string()),
        (
            LogicalType::String,
            Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) | Value::BigInt(_),
        ) => Value::String(integer(&value).map(|i| i.to_string()).unwrap_or_default()),

        (LogicalType::Boolean, Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "y" | "1" => Value::Bool(true),
            "false" | "f" | "n" | "0" => Value::Bool(false),
            _ => value,
        },
        (LogicalType::Boolean, v) => match integer(v) {
            Some(i) => Value::Bool(i != 0),
            None => value,
        },

        (LogicalType::Byte, v) => Value::Byte(narrow(v, "byte")?),
        (LogicalType::Short, v) => Value::Short(narrow(v, "short")?),
        (LogicalType::Int, v) => Value::Int(narrow(v, "int")?),
        (LogicalType::Long, v) => Value::Long(narrow(v, "long")?),
        (LogicalType::BigInteger, v) => Value::BigInt(narrow(v, "biginteger")?),
        (LogicalType::Float, v) => match float(v) {
            Some(f) => Value::Float(f as f32),
            None => value,
        },
        (LogicalType::Double, v) => match float(v) {
            Some(f) => Value::Double(f),
            None => value,
        },
        (LogicalType::BigDecimal, Value::String(s)) => match s.trim().parse::<Decimal>() {
            Ok(d) => Value::Decimal(d),
            Err(e) => return Err(SqlError::conversion(format!("'{s}' is not a decimal: {e}"))),
        },
        (LogicalType::BigDecimal, Value::Float(_) | Value::Double(_)) => {
            let f = float(&value).unwrap_or_default();
            Value::Decimal(
                Decimal::try_from(f)
                    .map_err(|e| SqlError::conversion(format!("{f} is not a decimal: {e}")))?,
            )
        }
        (LogicalType::BigDecimal, v) => match integer(v) {
            Some(i) => Value::Decimal(
                Decimal::try_from_i128_with_scale(i, 0)
                    .map_err(|e| SqlError::conversion(format!("{i} is not a decimal: {e}")))?,
            ),
            None => value,
        },

        (LogicalType::Bytes, Value::Blob(b)) => Value::Bytes(b.clone()),
        (LogicalType::Bytes, Value::ByteStream(stream)) => Value::Bytes(stream.read_bytes()?),
        (LogicalType::Blob, Value::Bytes(b)) => Value::Blob(b.clone()),
        (LogicalType::Blob, Value::ByteStream(stream)) => Value::Blob(stream.read_bytes()?),
        (LogicalType::ByteStream, Value::Bytes(b) | Value::Blob(b)) => {
            Value::ByteStream(StreamHandle::from_bytes(b.clone()))
        }
        (LogicalType::Clob, Value::String(s)) => Value::Clob(s.clone()),
        (LogicalType::Clob, Value::CharStream(stream)) => Value::Clob(stream.read_string()?),
        (LogicalType::CharStream, Value::String(s) | Value::Clob(s)) => {
            Value::CharStream(StreamHandle::from_string(s.clone()))
        }

        (LogicalType::Date, Value::DateTime(dt)) => Value::Date(dt.date()),
        (LogicalType::Date, Value::Zoned(dt)) => Value::Date(dt.date_naive()),
        (LogicalType::Date, Value::String(s)) => match parse_datetime(s) {
            Some(dt) => Value::Date(dt.date()),
            None => return Err(SqlError::conversion(format!("'{s}' is not a date"))),
        },
        (LogicalType::Time, Value::DateTime(dt)) => Value::Time(dt.time()),
        (LogicalType::Time, Value::Zoned(dt)) => Value::Time(dt.time()),
        (LogicalType::Time, Value::String(s)) => {
            match NaiveTime::parse_from_str(s.trim(), TIME_FORMAT) {
                Ok(t) => Value::Time(t),
                Err(_) => match parse_datetime(s) {
                    Some(dt) => Value::Time(dt.time()),
                    None => return Err(SqlError::conversion(format!("'{s}' is not a time"))),
                },
            }
        }
        (LogicalType::DateTime, Value::Date(d)) => Value::DateTime(d.and_time(NaiveTime::MIN)),
        (LogicalType::DateTime, Value::Zoned(dt)) => Value::DateTime(dt.naive_local()),
        (LogicalType::DateTime, Value::String(s)) => match parse_datetime(s) {
            Some(dt) => Value::DateTime(dt),
            None => return Err(SqlError::conversion(format!("'{s}' is not a date-time"))),
        },
        (LogicalType::ZonedDateTime, Value::DateTime(dt)) => {
            Value::Zoned(dt.and_utc().fixed_offset())
        }
        (LogicalType::ZonedDateTime, Value::String(s)) => {
            match DateTime::parse_from_rfc3339(s.trim())
                .or_else(|_| DateTime::parse_from_str(s.trim(), ZONED_FORMAT))
            {
                Ok(dt) => Value::Zoned(dt),
                Err(e) => return Err(SqlError::conversion(format!("'{s}' is not zoned: {e}"))),
            }
        }

        (LogicalType::Enum(ty), Value::String(name)) => match ty.value_named(name.trim()) {
            Some(v) => Value::Enum(v),
            None => {
                return Err(SqlError::conversion(format!(
                    "'{name}' is not a constant of {}",
                    ty.name
                )))
            }
        },
        (LogicalType::Enum(ty), v) => {
            let ordinal: u32 = narrow(v, &ty.name)?;
            match ty.value_of(ordinal) {
                Some(v) => Value::Enum(v),
                None => {
                    return Err(SqlError::conversion(format!(
                        "ordinal {ordinal} out of range for {}",
                        ty.name
                    )))
                }
            }
        }
        _ => value,
    };
    Ok(converted)
}
