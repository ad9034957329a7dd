//! Logical values and the logical type system.

use std::fmt;
use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::error::{SqlError, SqlResult};

// =============================================================================
// Logical Types
// =============================================================================

/// The caller-facing type system that values are converted to and from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogicalType {
    String,
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    BigDecimal,
    BigInteger,
    Bytes,
    ByteStream,
    CharStream,
    Date,
    Time,
    DateTime,
    ZonedDateTime,
    Clob,
    Blob,
    Enum(EnumType),
}

impl LogicalType {
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Self::Date | Self::Time | Self::DateTime | Self::ZonedDateTime
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Short
                | Self::Int
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::BigDecimal
                | Self::BigInteger
        )
    }

    /// The temporal kind matching this type, if it is temporal.
    pub fn temporal_kind(&self) -> Option<TemporalKind> {
        match self {
            Self::Date => Some(TemporalKind::Date),
            Self::Time => Some(TemporalKind::Time),
            Self::DateTime | Self::ZonedDateTime => Some(TemporalKind::DateTime),
            _ => None,
        }
    }
}

/// An enumeration whose values are stored by ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumType {
    pub name: String,
    pub variants: Vec<String>,
}

impl EnumType {
    pub fn new(name: &str, variants: &[&str]) -> Self {
        Self {
            name: name.into(),
            variants: variants.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// The value stored at `ordinal`.
    pub fn value_of(&self, ordinal: u32) -> Option<EnumValue> {
        self.variants
            .get(ordinal as usize)
            .map(|name| EnumValue::new(ordinal, name))
    }

    pub fn value_named(&self, name: &str) -> Option<EnumValue> {
        self.variants
            .iter()
            .position(|v| v == name)
            .map(|ordinal| EnumValue::new(ordinal as u32, name))
    }
}

/// A single enum constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub ordinal: u32,
    pub name: String,
}

impl EnumValue {
    pub fn new(ordinal: u32, name: &str) -> Self {
        Self {
            ordinal,
            name: name.into(),
        }
    }
}

/// Which temporal flavour a value is bound or rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalKind {
    Date,
    Time,
    DateTime,
}

impl TemporalKind {
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Self::Date => LogicalType::Date,
            Self::Time => LogicalType::Time,
            Self::DateTime => LogicalType::DateTime,
        }
    }
}

// =============================================================================
// Streams
// =============================================================================

type BoxedReader = Box<dyn Read + Send>;

/// A read-once stream handed to the driver (character or binary).
///
/// Clones share the same underlying reader; reading it consumes it for all.
#[derive(Clone)]
pub struct StreamHandle(Arc<Mutex<Option<BoxedReader>>>);

impl StreamHandle {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self(Arc::new(Mutex::new(Some(Box::new(reader)))))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(Cursor::new(bytes))
    }

    pub fn from_string(s: String) -> Self {
        Self::from_bytes(s.into_bytes())
    }

    /// Drain the stream into memory.
    pub fn read_bytes(&self) -> SqlResult<Vec<u8>> {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        let mut reader = guard
            .take()
            .ok_or_else(|| SqlError::conversion("stream was already consumed"))?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| SqlError::conversion(format!("failed to read stream: {e}")))?;
        Ok(buf)
    }

    pub fn read_string(&self) -> SqlResult<String> {
        let bytes = self.read_bytes()?;
        String::from_utf8(bytes)
            .map_err(|e| SqlError::conversion(format!("character stream is not UTF-8: {e}")))
    }
}

impl PartialEq for StreamHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StreamHandle(..)")
    }
}

// =============================================================================
// Values
// =============================================================================

/// A logical value, either supplied by the caller or read back from a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(Decimal),
    BigInt(i128),
    String(String),
    Bytes(Vec<u8>),
    ByteStream(StreamHandle),
    CharStream(StreamHandle),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),
    Clob(String),
    Blob(Vec<u8>),
    Enum(EnumValue),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Logical type inferred from the runtime variant.
    ///
    /// `Null`, `List` and `Enum` carry no self-describing type.
    pub fn logical_type(&self) -> Option<LogicalType> {
        let ty = match self {
            Value::Null | Value::List(_) | Value::Enum(_) => return None,
            Value::Bool(_) => LogicalType::Boolean,
            Value::Byte(_) => LogicalType::Byte,
            Value::Short(_) => LogicalType::Short,
            Value::Int(_) => LogicalType::Int,
            Value::Long(_) => LogicalType::Long,
            Value::Float(_) => LogicalType::Float,
            Value::Double(_) => LogicalType::Double,
            Value::Decimal(_) => LogicalType::BigDecimal,
            Value::BigInt(_) => LogicalType::BigInteger,
            Value::String(_) => LogicalType::String,
            Value::Bytes(_) => LogicalType::Bytes,
            Value::ByteStream(_) => LogicalType::ByteStream,
            Value::CharStream(_) => LogicalType::CharStream,
            Value::Date(_) => LogicalType::Date,
            Value::Time(_) => LogicalType::Time,
            Value::DateTime(_) => LogicalType::DateTime,
            Value::Zoned(_) => LogicalType::ZonedDateTime,
            Value::Clob(_) => LogicalType::Clob,
            Value::Blob(_) => LogicalType::Blob,
        };
        Some(ty)
    }

    /// Whether this value may stand for `expected` without further conversion.
    pub fn is_assignable_to(&self, expected: &LogicalType) -> bool {
        match (self, expected) {
            (Value::Null, _) => true,
            (Value::Enum(v), LogicalType::Enum(ty)) => {
                ty.variants.get(v.ordinal as usize) == Some(&v.name)
            }
            _ => self.logical_type().as_ref() == Some(expected),
        }
    }

    /// Short name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::BigInt(_) => "biginteger",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::ByteStream(_) => "byte stream",
            Value::CharStream(_) => "character stream",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::Zoned(_) => "zoned datetime",
            Value::Clob(_) => "clob",
            Value::Blob(_) => "blob",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Decimal => Decimal,
    i128 => BigInt,
    String => String,
    Vec<u8> => Bytes,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => Zoned,
    EnumValue => Enum,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_type_of_values() {
        assert_eq!(Value::from(1i32).logical_type(), Some(LogicalType::Int));
        assert_eq!(Value::from("x").logical_type(), Some(LogicalType::String));
        assert_eq!(Value::Null.logical_type(), None);
    }

    #[test]
    fn test_enum_assignability() {
        let status = EnumType::new("Status", &["ACTIVE", "RETIRED"]);
        let ty = LogicalType::Enum(status.clone());
        assert!(Value::Enum(status.value_of(1).unwrap()).is_assignable_to(&ty));
        assert!(!Value::Enum(EnumValue::new(1, "ACTIVE")).is_assignable_to(&ty));
        assert!(!Value::Int(1).is_assignable_to(&ty));
    }

    #[test]
    fn test_stream_reads_once() {
        let stream = StreamHandle::from_string("hello".into());
        let shared = stream.clone();
        assert_eq!(stream.read_string().unwrap(), "hello");
        assert!(shared.read_string().is_err());
        assert_eq!(stream, shared);
    }

    #[test]
    fn test_option_into_value() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::String("a".into()));
    }
}
