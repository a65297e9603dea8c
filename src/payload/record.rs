use chrono::{DateTime, Utc};
use serde::Serialize;

/// Electricity readings taken from one telegram.
///
/// Every value defaults to zero when its line is missing from the telegram.
/// The tariff totals are not stored; they are derived when encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasurementRecord {
    /// Wall-clock time the telegram was extracted, not the meter's own clock
    pub timestamp: DateTime<Utc>,
    /// kWh delivered to the client, tariff 1
    pub consumed_tariff1: f64,
    /// kWh delivered to the client, tariff 2
    pub consumed_tariff2: f64,
    /// kWh delivered by the client, tariff 1
    pub produced_tariff1: f64,
    /// kWh delivered by the client, tariff 2
    pub produced_tariff2: f64,
    /// Instantaneous import in W
    pub current_power_usage: i64,
    /// Instantaneous export in W
    pub current_power_production: i64,
}

impl MeasurementRecord {
    /// A record with every reading at its zero default.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        MeasurementRecord {
            timestamp,
            consumed_tariff1: 0.0,
            consumed_tariff2: 0.0,
            produced_tariff1: 0.0,
            produced_tariff2: 0.0,
            current_power_usage: 0,
            current_power_production: 0,
        }
    }

    pub fn total_consumed(&self) -> f64 {
        self.consumed_tariff1 + self.consumed_tariff2
    }

    pub fn total_produced(&self) -> f64 {
        self.produced_tariff1 + self.produced_tariff2
    }
}
