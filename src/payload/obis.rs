//! # OBIS Field Extraction
//!
//! Turns a framed telegram into a [`MeasurementRecord`]. Each supported
//! quantity is one entry in [`OBIS_RULES`]: the OBIS code, the unit the meter
//! reports it in, a scale factor and the record field it lands in. Supporting
//! another register is a new table row, not new control flow.
//!
//! A rule matches a whole line of the shape `<code>(<digits>.<digits>*<unit>)`:
//!
//! ```text
//! 1-0:1.8.1(000123.456*kWh)
//! 1-0:1.7.0(00.324*kW)
//! ```
//!
//! Extraction never fails. Lines that match no rule are skipped, a missing
//! register leaves its field at zero, and when a code appears twice the last
//! line wins.

use crate::constants::*;
use crate::p1::framer::RawTelegram;
use crate::payload::record::MeasurementRecord;
use chrono::{DateTime, Utc};
use nom::{
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{all_consuming, recognize},
    sequence::{delimited, pair, tuple},
    IResult,
};

/// The record field a rule writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    ConsumedTariff1,
    ConsumedTariff2,
    ProducedTariff1,
    ProducedTariff2,
    PowerUsage,
    PowerProduction,
}

impl RecordField {
    /// Stores an already scaled value. Power fields truncate toward zero.
    fn apply(self, record: &mut MeasurementRecord, value: f64) {
        match self {
            RecordField::ConsumedTariff1 => record.consumed_tariff1 = value,
            RecordField::ConsumedTariff2 => record.consumed_tariff2 = value,
            RecordField::ProducedTariff1 => record.produced_tariff1 = value,
            RecordField::ProducedTariff2 => record.produced_tariff2 = value,
            RecordField::PowerUsage => record.current_power_usage = value as i64,
            RecordField::PowerProduction => record.current_power_production = value as i64,
        }
    }
}

/// One extraction rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObisRule {
    pub code: &'static str,
    pub unit: &'static str,
    /// Multiplier from the reported unit to the stored unit
    pub scale: f64,
    pub field: RecordField,
}

/// Registers read from every telegram.
pub static OBIS_RULES: [ObisRule; 6] = [
    ObisRule {
        code: OBIS_CONSUMED_TARIFF1,
        unit: UNIT_KWH,
        scale: 1.0,
        field: RecordField::ConsumedTariff1,
    },
    ObisRule {
        code: OBIS_CONSUMED_TARIFF2,
        unit: UNIT_KWH,
        scale: 1.0,
        field: RecordField::ConsumedTariff2,
    },
    ObisRule {
        code: OBIS_PRODUCED_TARIFF1,
        unit: UNIT_KWH,
        scale: 1.0,
        field: RecordField::ProducedTariff1,
    },
    ObisRule {
        code: OBIS_PRODUCED_TARIFF2,
        unit: UNIT_KWH,
        scale: 1.0,
        field: RecordField::ProducedTariff2,
    },
    // kW -> W
    ObisRule {
        code: OBIS_POWER_USAGE,
        unit: UNIT_KW,
        scale: 1000.0,
        field: RecordField::PowerUsage,
    },
    ObisRule {
        code: OBIS_POWER_PRODUCTION,
        unit: UNIT_KW,
        scale: 1000.0,
        field: RecordField::PowerProduction,
    },
];

/// Uses `nom` to match `<code>(<digits>.<digits>*<unit>)` against a whole line,
/// yielding the decimal text.
fn parse_reading<'a>(
    input: &'a str,
    code: &'static str,
    unit: &'static str,
) -> IResult<&'a str, &'a str> {
    all_consuming(delimited(
        pair(tag(code), char('(')),
        recognize(tuple((digit1, char('.'), digit1))),
        tuple((char('*'), tag(unit), char(')'))),
    ))(input)
}

impl ObisRule {
    /// Returns the decimal text when `line` has this rule's shape.
    pub fn match_line<'a>(&self, line: &'a str) -> Option<&'a str> {
        parse_reading(line, self.code, self.unit)
            .ok()
            .map(|(_, value)| value)
    }

    /// Returns the scaled value when `line` matches and its number is usable.
    pub fn parse_value(&self, line: &str) -> Option<f64> {
        let text = self.match_line(line)?;
        let value: f64 = text.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(value * self.scale)
    }
}

/// Extracts the supported registers from `telegram`, stamping the record with
/// `capture_time`.
pub fn extract(telegram: &RawTelegram, capture_time: DateTime<Utc>) -> MeasurementRecord {
    let mut record = MeasurementRecord::empty(capture_time);

    for line in telegram.lines() {
        let line = line.trim();
        for rule in OBIS_RULES.iter() {
            // Malformed numbers leave whatever an earlier line stored
            if let Some(value) = rule.parse_value(line) {
                rule.field.apply(&mut record, value);
            }
        }
    }

    record
}
