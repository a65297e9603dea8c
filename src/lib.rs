//! # p1-rs - A Rust Crate for DSMR P1 Smart Meter Telegrams
//!
//! Dutch, Belgian and Luxembourg smart meters emit a plain-text telegram on
//! their P1 port every second or so. This crate frames those telegrams from
//! the serial line, extracts the electricity registers and writes them to
//! InfluxDB v1.x as line protocol.
//!
//! ## Features
//!
//! - Frame telegrams from any async line source, resynchronizing on each start line
//! - Extract tariff energy registers and instantaneous power via a table of OBIS rules
//! - Encode records as InfluxDB line protocol with derived tariff totals
//! - Open the P1 port with `tokio-serial` and poll it in a retrying loop
//! - Write to InfluxDB over HTTP, with optional credentials
//!
//! ## Usage
//!
//! ```rust
//! use p1_rs::{encode, extract, RawTelegram};
//! use chrono::Utc;
//!
//! let telegram = RawTelegram::from(
//!     "/ISK5\\2M550T-1012\n1-0:1.8.1(000123.456*kWh)\n1-0:1.7.0(00.324*kW)\n!1A2B\n",
//! );
//! let record = extract(&telegram, Utc::now());
//! assert_eq!(record.current_power_usage, 324);
//!
//! let line = encode(&record);
//! assert!(line.as_str().starts_with("electricity,meter=smart_meter consumed_tariff1=123.456000,"));
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod influx;
pub mod logging;
pub mod meter_reader;
pub mod p1;
pub mod payload;
pub mod util;

pub use crate::config::Config;
pub use crate::error::P1Error;
pub use crate::logging::{init_logger, init_logger_with_level, log_info};

// Core pipeline
pub use influx::line_protocol::{encode, encode_batch, EncodedLine};
pub use p1::framer::{read_capture_file, read_telegram, RawTelegram, TelegramFramer};
pub use payload::{extract, MeasurementRecord};

// Collaborators
pub use influx::client::{InfluxClient, InfluxConfig, MeasurementSink};
pub use meter_reader::{shutdown_signal, MeterReader, ReaderSettings};
pub use p1::serial::{P1Port, SerialConfig};

/// Open the meter's P1 port.
///
/// # Arguments
/// * `port` - Serial port path (e.g., "/dev/ttyUSB0" on Linux, "COM3" on Windows)
/// * `baudrate` - 115200 for DSMR 4 and 5 meters
///
/// # Returns
/// * `Ok(P1Port)` - Open port, ready to read telegrams
/// * `Err(P1Error)` - The port could not be opened
pub async fn connect(port: &str, baudrate: u32) -> Result<P1Port, P1Error> {
    P1Port::connect_with_config(port, SerialConfig { baudrate }).await
}

/// Extract a record from a telegram, stamped with the current time.
pub fn parse_telegram(telegram: &RawTelegram) -> MeasurementRecord {
    extract(telegram, chrono::Utc::now())
}
