//! # Line Protocol Encoding
//!
//! Serializes a [`MeasurementRecord`] into one InfluxDB line protocol
//! statement:
//!
//! ```text
//! electricity,meter=smart_meter consumed_tariff1=123.456000,...,total_produced=35.801000 1678883696000000000
//! ```
//!
//! Floats use fixed notation with six decimals, integers are written bare,
//! and the timestamp is nanoseconds since the Unix epoch.

use crate::constants::{MEASUREMENT_NAME, METER_TAG_KEY, METER_TAG_VALUE};
use crate::payload::record::MeasurementRecord;
use std::fmt;

/// One encoded statement, without a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedLine(String);

impl EncodedLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EncodedLine {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncodedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encodes one record. Pure; the same record always yields the same line.
pub fn encode(record: &MeasurementRecord) -> EncodedLine {
    let timestamp = record.timestamp.timestamp_nanos_opt().unwrap_or(
        // outside 1677..2262
        if record.timestamp.timestamp() < 0 {
            i64::MIN
        } else {
            i64::MAX
        },
    );

    EncodedLine(format!(
        "{MEASUREMENT_NAME},{METER_TAG_KEY}={METER_TAG_VALUE} \
         consumed_tariff1={:.6},consumed_tariff2={:.6},\
         produced_tariff1={:.6},produced_tariff2={:.6},\
         current_power_usage={},current_power_production={},\
         total_consumed={:.6},total_produced={:.6} {}",
        record.consumed_tariff1,
        record.consumed_tariff2,
        record.produced_tariff1,
        record.produced_tariff2,
        record.current_power_usage,
        record.current_power_production,
        record.total_consumed(),
        record.total_produced(),
        timestamp,
    ))
}

/// Joins encoded lines into one write request body.
pub fn encode_batch(lines: &[EncodedLine]) -> String {
    lines
        .iter()
        .map(EncodedLine::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}
