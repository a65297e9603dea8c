//! # Telegram Payload
//!
//! The measurement record and the OBIS extraction rules that fill it.

pub mod obis;
pub mod record;

pub use obis::{extract, ObisRule, RecordField, OBIS_RULES};
pub use record::MeasurementRecord;
