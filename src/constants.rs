//! P1 Protocol Constants
//!
//! This module defines constants used in the P1 telegram implementation,
//! based on the DSMR P1 companion standard.

/// First character of the identification line that opens a telegram
pub const P1_START_MARKER: char = '/';

/// First character of the line that closes a telegram
pub const P1_END_MARKER: char = '!';

/// Length of the end line: marker plus four hex CRC digits (`!1A2B`)
pub const P1_END_LINE_LEN: usize = 5;

/// Upper bound on an accumulated telegram before it is discarded as noise.
/// DSMR 5 telegrams are well under 2 KiB.
pub const MAX_TELEGRAM_LEN: usize = 16 * 1024;

/// OBIS code: electricity delivered to client, tariff 1
pub const OBIS_CONSUMED_TARIFF1: &str = "1-0:1.8.1";

/// OBIS code: electricity delivered to client, tariff 2
pub const OBIS_CONSUMED_TARIFF2: &str = "1-0:1.8.2";

/// OBIS code: electricity delivered by client, tariff 1
pub const OBIS_PRODUCED_TARIFF1: &str = "1-0:2.8.1";

/// OBIS code: electricity delivered by client, tariff 2
pub const OBIS_PRODUCED_TARIFF2: &str = "1-0:2.8.2";

/// OBIS code: actual electricity power delivered (+P)
pub const OBIS_POWER_USAGE: &str = "1-0:1.7.0";

/// OBIS code: actual electricity power received (-P)
pub const OBIS_POWER_PRODUCTION: &str = "1-0:2.7.0";

/// Energy register unit
pub const UNIT_KWH: &str = "kWh";

/// Instantaneous power unit
pub const UNIT_KW: &str = "kW";

/// Line protocol measurement name
pub const MEASUREMENT_NAME: &str = "electricity";

/// Line protocol tag key
pub const METER_TAG_KEY: &str = "meter";

/// Line protocol tag value
pub const METER_TAG_VALUE: &str = "smart_meter";

/// Default serial device
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";

/// DSMR 4/5 meters transmit at 115200 baud, 8N1
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default InfluxDB endpoint
pub const DEFAULT_INFLUXDB_URL: &str = "http://localhost:8086";

/// Default InfluxDB database
pub const DEFAULT_INFLUXDB_DATABASE: &str = "smart_meter";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

/// Seconds between successful polling cycles
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;

/// Seconds to wait after a failed telegram read
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 5;

/// Seconds to wait for one complete telegram
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// Timeout applied to every InfluxDB HTTP request
pub const INFLUXDB_REQUEST_TIMEOUT_SECS: u64 = 10;
