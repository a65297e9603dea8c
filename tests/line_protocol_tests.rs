//! Tests for InfluxDB line protocol encoding.

use chrono::{TimeZone, Utc};
use p1_rs::{encode, encode_batch, MeasurementRecord};
use proptest::prelude::*;
use std::collections::HashMap;

fn sample_record() -> MeasurementRecord {
    MeasurementRecord {
        timestamp: Utc.timestamp_opt(1_678_883_696, 123_456_789).unwrap(),
        consumed_tariff1: 123.456,
        consumed_tariff2: 234.567,
        produced_tariff1: 12.345,
        produced_tariff2: 23.456,
        current_power_usage: 324,
        current_power_production: 0,
    }
}

/// Splits `measurement,tags fields timestamp` into its three sections.
fn sections(line: &str) -> (&str, &str, &str) {
    let mut parts = line.split(' ');
    let head = parts.next().unwrap();
    let fields = parts.next().unwrap();
    let timestamp = parts.next().unwrap();
    assert!(parts.next().is_none(), "unexpected extra section in {line}");
    (head, fields, timestamp)
}

fn field_map(fields: &str) -> HashMap<&str, &str> {
    fields
        .split(',')
        .map(|kv| kv.split_once('=').unwrap())
        .collect()
}

/// Tests the exact encoding of a populated record.
#[test]
fn test_encode_sample_record() {
    let line = encode(&sample_record());
    assert_eq!(
        line.as_str(),
        "electricity,meter=smart_meter \
         consumed_tariff1=123.456000,consumed_tariff2=234.567000,\
         produced_tariff1=12.345000,produced_tariff2=23.456000,\
         current_power_usage=324,current_power_production=0,\
         total_consumed=358.023000,total_produced=35.801000 \
         1678883696123456789"
    );
}

/// Tests that the field set is emitted in its fixed order.
#[test]
fn test_field_order() {
    let line = encode(&sample_record());
    let (head, fields, _) = sections(line.as_str());
    assert_eq!(head, "electricity,meter=smart_meter");

    let keys: Vec<&str> = fields
        .split(',')
        .map(|kv| kv.split_once('=').unwrap().0)
        .collect();
    assert_eq!(
        keys,
        [
            "consumed_tariff1",
            "consumed_tariff2",
            "produced_tariff1",
            "produced_tariff2",
            "current_power_usage",
            "current_power_production",
            "total_consumed",
            "total_produced",
        ]
    );
}

/// Tests that large and tiny values never use exponent notation.
#[test]
fn test_fixed_notation() {
    let record = MeasurementRecord {
        consumed_tariff1: 1e21,
        consumed_tariff2: 1e-7,
        ..MeasurementRecord::empty(Utc.timestamp_opt(0, 0).unwrap())
    };
    let line = encode(&record);
    let (_, fields, timestamp) = sections(line.as_str());
    let map = field_map(fields);

    assert_eq!(map["consumed_tariff1"], "1000000000000000000000.000000");
    assert_eq!(map["consumed_tariff2"], "0.000000");
    assert_eq!(timestamp, "0");
    assert!(!map["consumed_tariff1"].contains('e'));
}

/// Tests that negative power values are written as signed integers.
#[test]
fn test_integer_fields() {
    let record = MeasurementRecord {
        current_power_usage: 12_345,
        current_power_production: -1,
        ..MeasurementRecord::empty(Utc.timestamp_opt(0, 0).unwrap())
    };
    let line = encode(&record);
    let (_, fields, _) = sections(line.as_str());
    let map = field_map(fields);
    assert_eq!(map["current_power_usage"], "12345");
    assert_eq!(map["current_power_production"], "-1");
}

/// Tests that the line carries no trailing newline.
#[test]
fn test_no_trailing_newline() {
    let line = encode(&sample_record());
    assert!(!line.as_str().ends_with('\n'));
    assert!(!line.as_str().contains('\n'));
}

/// Tests that a batch body is newline separated.
#[test]
fn test_encode_batch() {
    let a = encode(&sample_record());
    let b = encode(&MeasurementRecord::empty(Utc.timestamp_opt(10, 0).unwrap()));
    let body = encode_batch(&[a.clone(), b.clone()]);
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines, [a.as_str(), b.as_str()]);
}

fn arb_record() -> impl Strategy<Value = MeasurementRecord> {
    (
        0.0f64..1e7,
        0.0f64..1e7,
        0.0f64..1e7,
        0.0f64..1e7,
        0i64..100_000,
        0i64..100_000,
        0i64..4_000_000_000,
    )
        .prop_map(|(c1, c2, p1, p2, usage, production, secs)| MeasurementRecord {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            consumed_tariff1: c1,
            consumed_tariff2: c2,
            produced_tariff1: p1,
            produced_tariff2: p2,
            current_power_usage: usage,
            current_power_production: production,
        })
}

proptest! {
    #[test]
    fn prop_encoding_is_idempotent(record in arb_record()) {
        prop_assert_eq!(encode(&record), encode(&record));
    }

    #[test]
    fn prop_totals_are_tariff_sums(record in arb_record()) {
        let line = encode(&record);
        let (_, fields, timestamp) = sections(line.as_str());
        let map = field_map(fields);

        let total_consumed = format!("{:.6}", record.consumed_tariff1 + record.consumed_tariff2);
        let total_produced = format!("{:.6}", record.produced_tariff1 + record.produced_tariff2);
        prop_assert_eq!(map["total_consumed"], total_consumed.as_str());
        prop_assert_eq!(map["total_produced"], total_produced.as_str());

        let nanos = record.timestamp.timestamp() * 1_000_000_000;
        prop_assert_eq!(timestamp, nanos.to_string());
    }
}
