//! Value codec and type converter tests.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use relsql::dialect::{Dialect, DialectKind};
use relsql::expr::{LogicalType, TemporalKind, Value};
use relsql::statement::SqlParameter;
use relsql::types::{SqlType, TypeConverter, ValueCodec};
use relsql::SqlError;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn time() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(10, 30, 5, 250).unwrap()
}

fn datetime() -> NaiveDateTime {
    date().and_time(time())
}

// ============================================================================
// Temporal round-trip
// ============================================================================

#[test]
fn test_temporal_round_trip_every_dialect() {
    let samples = [
        (Value::Date(date()), TemporalKind::Date),
        (
            Value::Time(NaiveTime::from_hms_opt(23, 59, 59).unwrap()),
            TemporalKind::Time,
        ),
        (Value::Time(time()), TemporalKind::Time),
        (Value::DateTime(datetime()), TemporalKind::DateTime),
        (
            Value::DateTime(date().and_hms_opt(0, 0, 0).unwrap()),
            TemporalKind::DateTime,
        ),
    ];
    for kind in DialectKind::ALL {
        let dialect = Dialect::new(kind);
        let codec = ValueCodec::new(&dialect);
        for (value, temporal) in &samples {
            let literal = codec.serialize(value, Some(*temporal)).unwrap();
            let back = codec
                .deserialize(Value::String(literal.clone()), &temporal.logical_type())
                .unwrap();
            assert_eq!(&back, value, "{kind}: {literal}");
        }
    }
}

#[test]
fn test_temporal_literal_shapes() {
    let value = Value::Date(date());
    let cases = [
        (DialectKind::Ansi, "DATE '2024-03-01'"),
        (DialectKind::Postgres, "DATE '2024-03-01'"),
        (DialectKind::SqlServer, "'2024-03-01'"),
        (DialectKind::Sqlite, "'2024-03-01'"),
        (DialectKind::Db2, "DATE('2024-03-01')"),
        (DialectKind::Derby, "DATE('2024-03-01')"),
    ];
    for (kind, expected) in cases {
        let dialect = Dialect::new(kind);
        assert_eq!(
            ValueCodec::new(&dialect).serialize(&value, None).unwrap(),
            expected,
            "{kind}"
        );
    }
}

#[test]
fn test_string_input_forced_to_temporal() {
    let dialect = Dialect::new(DialectKind::Ansi);
    let codec = ValueCodec::new(&dialect);
    assert_eq!(
        codec
            .serialize(&Value::from("2024-03-01"), Some(TemporalKind::Date))
            .unwrap(),
        "DATE '2024-03-01'"
    );
}

#[test]
fn test_sqlite_epoch_values() {
    let dialect = Dialect::new(DialectKind::Sqlite);
    let codec = ValueCodec::new(&dialect);
    let millis = datetime().and_utc().timestamp_millis();

    assert_eq!(
        codec
            .deserialize(Value::Long(millis), &LogicalType::DateTime)
            .unwrap(),
        Value::DateTime(datetime())
    );
    assert_eq!(
        codec.deserialize(Value::Long(millis), &LogicalType::Date).unwrap(),
        Value::Date(date())
    );
}

#[test]
fn test_postgres_offset_timestamp() {
    let dialect = Dialect::new(DialectKind::Postgres);
    let codec = ValueCodec::new(&dialect);
    let value = codec
        .deserialize(
            Value::from("2024-03-01 10:30:05+02:00"),
            &LogicalType::ZonedDateTime,
        )
        .unwrap();
    match value {
        Value::Zoned(dt) => {
            assert_eq!(dt.offset().local_minus_utc(), 2 * 3600);
            assert_eq!(dt.naive_local(), date().and_hms_opt(10, 30, 5).unwrap());
        }
        other => panic!("expected a zoned value, got {other:?}"),
    }
}

// ============================================================================
// Scalars
// ============================================================================

#[test]
fn test_boolean_literals_by_dialect() {
    for (kind, expected) in [
        (DialectKind::Postgres, "true"),
        (DialectKind::Oracle, "1"),
        (DialectKind::SqlServer, "1"),
        (DialectKind::Sqlite, "1"),
    ] {
        let dialect = Dialect::new(kind);
        assert_eq!(
            ValueCodec::new(&dialect)
                .serialize(&Value::Bool(true), None)
                .unwrap(),
            expected,
            "{kind}"
        );
    }
}

#[test]
fn test_boolean_from_text_and_numbers() {
    let dialect = Dialect::new(DialectKind::Oracle);
    let codec = ValueCodec::new(&dialect);
    assert_eq!(
        codec.deserialize(Value::Int(1), &LogicalType::Boolean).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(
        codec.deserialize(Value::from("N"), &LogicalType::Boolean).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn test_decimal_from_text() {
    let dialect = Dialect::new(DialectKind::Ansi);
    let codec = ValueCodec::new(&dialect);
    let value = codec
        .deserialize(Value::from("12.50"), &LogicalType::BigDecimal)
        .unwrap();
    assert_eq!(value, Value::Decimal(rust_decimal::Decimal::new(1250, 2)));

    let err = codec
        .deserialize(Value::from("twelve"), &LogicalType::BigDecimal)
        .unwrap_err();
    assert!(matches!(err, SqlError::TypeConversion(_)));
}

#[test]
fn test_bad_temporal_text_is_a_conversion_error() {
    let dialect = Dialect::new(DialectKind::Ansi);
    let codec = ValueCodec::new(&dialect);
    let err = codec
        .deserialize(Value::from("not a date"), &LogicalType::Date)
        .unwrap_err();
    assert!(matches!(err, SqlError::TypeConversion(_)));
}

// ============================================================================
// Type converter
// ============================================================================

#[test]
fn test_dialect_type_overrides() {
    let oracle = Dialect::new(DialectKind::Oracle);
    let converter = TypeConverter::new(&oracle);
    assert_eq!(converter.sql_type(&LogicalType::Boolean).code, SqlType::NUMERIC.code);
    assert_eq!(
        converter.logical_type(&SqlType::DATE),
        Some(LogicalType::DateTime)
    );

    let ansi = Dialect::new(DialectKind::Ansi);
    let converter = TypeConverter::new(&ansi);
    assert_eq!(converter.sql_type(&LogicalType::Boolean), SqlType::BOOLEAN);
    assert_eq!(converter.logical_type(&SqlType::DATE), Some(LogicalType::Date));
}

#[test]
fn test_null_binding_types() {
    let postgres = Dialect::new(DialectKind::Postgres);
    let converter = TypeConverter::new(&postgres);
    let typed_null = SqlParameter::typed(Value::Null, LogicalType::Int);
    let untyped_null = SqlParameter::new(Value::Null);

    assert_eq!(converter.parameter_sql_type(&typed_null), SqlType::INTEGER);
    assert_eq!(converter.parameter_sql_type(&untyped_null), SqlType::NULL);

    let db2 = Dialect::new(DialectKind::Db2);
    assert_eq!(
        TypeConverter::new(&db2).parameter_sql_type(&untyped_null),
        SqlType::VARCHAR
    );
    assert_eq!(
        TypeConverter::new(&db2)
            .with_null_type(SqlType::INTEGER)
            .parameter_sql_type(&untyped_null),
        SqlType::INTEGER
    );
}

#[test]
fn test_parameter_type_follows_value() {
    let sqlserver = Dialect::new(DialectKind::SqlServer);
    let converter = TypeConverter::new(&sqlserver);
    assert_eq!(
        converter.parameter_sql_type(&SqlParameter::new(true)),
        SqlType::BIT
    );
    assert_eq!(
        converter.parameter_sql_type(&SqlParameter::new("x")),
        SqlType::VARCHAR
    );
}
