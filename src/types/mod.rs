//! Logical ⇄ SQL type mapping and value conversion.
//!
//! - [`SqlType`] - numeric SQL type identifier plus optional vendor name
//! - [`TypeConverter`] - model→SQL and SQL→model type inference
//! - [`ValueCodec`] - literal serialization and value deserialization
//! - [`ValueProcessor`] - pluggable pre-conversion steps (vendor unwrapping)

mod codec;
mod processors;

pub use codec::ValueCodec;
pub(crate) use codec::iso_temporal_text;
pub use processors::{OffsetTimestampProcessor, SqliteTemporalProcessor, TypedLiteralProcessor, ValueProcessor};

use std::fmt;

use crate::dialect::Dialect;
use crate::expr::LogicalType;
use crate::statement::SqlParameter;

// =============================================================================
// SQL Types
// =============================================================================

/// A SQL type: numeric identifier (JDBC `Types` numbering) plus an optional
/// vendor type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SqlType {
    pub code: i32,
    pub vendor_name: Option<String>,
}

impl SqlType {
    pub const NULL: SqlType = SqlType::new(0);
    pub const CHAR: SqlType = SqlType::new(1);
    pub const NUMERIC: SqlType = SqlType::new(2);
    pub const DECIMAL: SqlType = SqlType::new(3);
    pub const INTEGER: SqlType = SqlType::new(4);
    pub const SMALLINT: SqlType = SqlType::new(5);
    pub const FLOAT: SqlType = SqlType::new(6);
    pub const REAL: SqlType = SqlType::new(7);
    pub const DOUBLE: SqlType = SqlType::new(8);
    pub const VARCHAR: SqlType = SqlType::new(12);
    pub const BOOLEAN: SqlType = SqlType::new(16);
    pub const DATE: SqlType = SqlType::new(91);
    pub const TIME: SqlType = SqlType::new(92);
    pub const TIMESTAMP: SqlType = SqlType::new(93);
    pub const OTHER: SqlType = SqlType::new(1111);
    pub const BLOB: SqlType = SqlType::new(2004);
    pub const CLOB: SqlType = SqlType::new(2005);
    pub const NCLOB: SqlType = SqlType::new(2011);
    pub const TIMESTAMP_WITH_TIMEZONE: SqlType = SqlType::new(2014);
    pub const LONGVARCHAR: SqlType = SqlType::new(-1);
    pub const BINARY: SqlType = SqlType::new(-2);
    pub const VARBINARY: SqlType = SqlType::new(-3);
    pub const LONGVARBINARY: SqlType = SqlType::new(-4);
    pub const BIGINT: SqlType = SqlType::new(-5);
    pub const TINYINT: SqlType = SqlType::new(-6);
    pub const BIT: SqlType = SqlType::new(-7);
    pub const NCHAR: SqlType = SqlType::new(-15);
    pub const NVARCHAR: SqlType = SqlType::new(-9);

    pub const fn new(code: i32) -> Self {
        Self {
            code,
            vendor_name: None,
        }
    }

    /// A vendor-specific type sharing a standard code.
    pub fn vendor(code: i32, name: &str) -> Self {
        Self {
            code,
            vendor_name: Some(name.into()),
        }
    }

    pub fn is_null(&self) -> bool {
        self.code == Self::NULL.code
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.vendor_name {
            Some(name) => write!(f, "{name} ({})", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

/// Dialect-independent model→SQL mapping.
pub fn default_sql_type(ty: &LogicalType) -> SqlType {
    match ty {
        LogicalType::String => SqlType::VARCHAR,
        LogicalType::Boolean => SqlType::BOOLEAN,
        LogicalType::Byte => SqlType::TINYINT,
        LogicalType::Short => SqlType::SMALLINT,
        LogicalType::Int => SqlType::INTEGER,
        LogicalType::Long => SqlType::BIGINT,
        LogicalType::Float => SqlType::REAL,
        LogicalType::Double => SqlType::DOUBLE,
        LogicalType::BigDecimal => SqlType::DECIMAL,
        LogicalType::BigInteger => SqlType::NUMERIC,
        LogicalType::Bytes => SqlType::VARBINARY,
        LogicalType::ByteStream => SqlType::LONGVARBINARY,
        LogicalType::CharStream => SqlType::LONGVARCHAR,
        LogicalType::Date => SqlType::DATE,
        LogicalType::Time => SqlType::TIME,
        LogicalType::DateTime => SqlType::TIMESTAMP,
        LogicalType::ZonedDateTime => SqlType::TIMESTAMP_WITH_TIMEZONE,
        LogicalType::Clob => SqlType::CLOB,
        LogicalType::Blob => SqlType::BLOB,
        LogicalType::Enum(_) => SqlType::INTEGER,
    }
}

/// Dialect-independent SQL→model mapping, the categorical inverse of
/// [`default_sql_type`].
pub fn default_logical_type(ty: &SqlType) -> Option<LogicalType> {
    let logical = match ty.code {
        c if c == SqlType::CHAR.code
            || c == SqlType::VARCHAR.code
            || c == SqlType::LONGVARCHAR.code
            || c == SqlType::NCHAR.code
            || c == SqlType::NVARCHAR.code =>
        {
            LogicalType::String
        }
        c if c == SqlType::BOOLEAN.code || c == SqlType::BIT.code => LogicalType::Boolean,
        c if c == SqlType::TINYINT.code => LogicalType::Byte,
        c if c == SqlType::SMALLINT.code => LogicalType::Short,
        c if c == SqlType::INTEGER.code => LogicalType::Int,
        c if c == SqlType::BIGINT.code => LogicalType::Long,
        c if c == SqlType::REAL.code => LogicalType::Float,
        c if c == SqlType::FLOAT.code || c == SqlType::DOUBLE.code => LogicalType::Double,
        c if c == SqlType::DECIMAL.code || c == SqlType::NUMERIC.code => LogicalType::BigDecimal,
        c if c == SqlType::BINARY.code
            || c == SqlType::VARBINARY.code
            || c == SqlType::LONGVARBINARY.code =>
        {
            LogicalType::Bytes
        }
        c if c == SqlType::DATE.code => LogicalType::Date,
        c if c == SqlType::TIME.code => LogicalType::Time,
        c if c == SqlType::TIMESTAMP.code => LogicalType::DateTime,
        c if c == SqlType::TIMESTAMP_WITH_TIMEZONE.code => LogicalType::ZonedDateTime,
        c if c == SqlType::CLOB.code || c == SqlType::NCLOB.code => LogicalType::Clob,
        c if c == SqlType::BLOB.code => LogicalType::Blob,
        _ => return None,
    };
    Some(logical)
}

// =============================================================================
// Type Converter
// =============================================================================

/// Type inference for binding, consulting the dialect before the defaults.
#[derive(Debug, Clone)]
pub struct TypeConverter<'d> {
    dialect: &'d Dialect,
    null_type: Option<SqlType>,
}

impl<'d> TypeConverter<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self {
            dialect,
            null_type: None,
        }
    }

    /// Use `ty` instead of the dialect's NULL type when nothing is inferable.
    pub fn with_null_type(mut self, ty: SqlType) -> Self {
        self.null_type = Some(ty);
        self
    }

    pub fn sql_type(&self, ty: &LogicalType) -> SqlType {
        self.dialect
            .vendor()
            .sql_type_for(ty)
            .unwrap_or_else(|| default_sql_type(ty))
    }

    pub fn logical_type(&self, ty: &SqlType) -> Option<LogicalType> {
        self.dialect
            .vendor()
            .logical_type_for(ty)
            .or_else(|| default_logical_type(ty))
    }

    /// SQL type used to bind a NULL of the given logical type.
    ///
    /// Falls back to the dialect's declared NULL type when nothing can be
    /// inferred.
    pub fn null_sql_type(&self, ty: Option<&LogicalType>) -> SqlType {
        match ty {
            Some(ty) => self.sql_type(ty),
            None => self
                .null_type
                .clone()
                .unwrap_or_else(|| self.dialect.null_type()),
        }
    }

    /// SQL type the executor should use for a prepared parameter.
    pub fn parameter_sql_type(&self, parameter: &SqlParameter) -> SqlType {
        let inferred = parameter
            .logical_type()
            .cloned()
            .or_else(|| parameter.value().logical_type());
        match inferred {
            Some(ty) => self.sql_type(&ty),
            None => self.null_sql_type(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectKind;

    #[test]
    fn test_default_mapping_round_trips() {
        let types = [
            LogicalType::String,
            LogicalType::Boolean,
            LogicalType::Int,
            LogicalType::Long,
            LogicalType::Double,
            LogicalType::BigDecimal,
            LogicalType::Bytes,
            LogicalType::Date,
            LogicalType::Time,
            LogicalType::DateTime,
            LogicalType::ZonedDateTime,
            LogicalType::Clob,
            LogicalType::Blob,
        ];
        for ty in types {
            assert_eq!(default_logical_type(&default_sql_type(&ty)), Some(ty));
        }
    }

    #[test]
    fn test_dialect_override_first() {
        let sqlserver = Dialect::new(DialectKind::SqlServer);
        let converter = TypeConverter::new(&sqlserver);
        assert_eq!(converter.sql_type(&LogicalType::Boolean), SqlType::BIT);
        assert_eq!(
            converter.logical_type(&SqlType::vendor(-155, "DATETIMEOFFSET")),
            Some(LogicalType::ZonedDateTime)
        );
    }

    #[test]
    fn test_null_type_fallback() {
        let postgres = Dialect::new(DialectKind::Postgres);
        let db2 = Dialect::new(DialectKind::Db2);
        assert_eq!(TypeConverter::new(&postgres).null_sql_type(None), SqlType::NULL);
        assert_eq!(TypeConverter::new(&db2).null_sql_type(None), SqlType::VARCHAR);
        assert_eq!(
            TypeConverter::new(&db2).null_sql_type(Some(&LogicalType::Int)),
            SqlType::INTEGER
        );
    }

    #[test]
    fn test_parameter_sql_type() {
        let postgres = Dialect::new(DialectKind::Postgres);
        let converter = TypeConverter::new(&postgres);
        let typed_null = SqlParameter::typed(crate::expr::Value::Null, LogicalType::Date);
        assert_eq!(converter.parameter_sql_type(&typed_null), SqlType::DATE);
        assert_eq!(
            converter.parameter_sql_type(&SqlParameter::new(crate::expr::Value::Null)),
            SqlType::NULL
        );
    }
}
