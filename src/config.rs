//! # Configuration
//!
//! Settings for the serial port, the InfluxDB sink and the polling loop.
//! Every option can be given on the command line or through the environment
//! variable shown below; the command line wins.
//!
//! | option | env | default |
//! |---|---|---|
//! | `--serial-port` | `SERIAL_PORT` | `/dev/ttyUSB0` |
//! | `--baud-rate` | `SERIAL_BAUD_RATE` | `115200` |
//! | `--influxdb-url` | `INFLUXDB_URL` | `http://localhost:8086` |
//! | `--influxdb-database` | `INFLUXDB_DATABASE` | `smart_meter` |
//! | `--influxdb-username` | `INFLUXDB_USERNAME` | unset |
//! | `--influxdb-password` | `INFLUXDB_PASSWORD` | unset |
//! | `--log-level` | `LOG_LEVEL` | `INFO` |
//! | `--poll-interval-secs` | `POLL_INTERVAL_SECS` | `10` |
//! | `--retry-delay-secs` | `RETRY_DELAY_SECS` | `5` |
//! | `--read-timeout-secs` | `READ_TIMEOUT_SECS` | `30` |
//!
//! A variable that is set but empty counts as unset and yields the default.
//! An empty `INFLUXDB_USERNAME` disables authentication.

use crate::constants::*;
use crate::error::P1Error;
use clap::Args;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Value parser that maps a blank value onto `default`.
fn or_default<T>(default: T) -> impl Fn(&str) -> Result<T, String> + Clone + Send + Sync + 'static
where
    T: FromStr + Clone + Send + Sync + 'static,
    T::Err: Display,
{
    move |raw: &str| {
        let raw = raw.trim();
        if raw.is_empty() {
            Ok(default.clone())
        } else {
            raw.parse::<T>().map_err(|e| e.to_string())
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Serial device the P1 cable is attached to
    #[arg(long, env = "SERIAL_PORT", default_value = DEFAULT_SERIAL_PORT,
          value_parser = or_default(DEFAULT_SERIAL_PORT.to_string()))]
    pub serial_port: String,

    #[arg(long, env = "SERIAL_BAUD_RATE", default_value_t = DEFAULT_BAUD_RATE,
          value_parser = or_default(DEFAULT_BAUD_RATE))]
    pub baud_rate: u32,

    #[arg(long, env = "INFLUXDB_URL", default_value = DEFAULT_INFLUXDB_URL,
          value_parser = or_default(DEFAULT_INFLUXDB_URL.to_string()))]
    pub influxdb_url: String,

    #[arg(long, env = "INFLUXDB_DATABASE", default_value = DEFAULT_INFLUXDB_DATABASE,
          value_parser = or_default(DEFAULT_INFLUXDB_DATABASE.to_string()))]
    pub influxdb_database: String,

    #[arg(long, env = "INFLUXDB_USERNAME")]
    pub influxdb_username: Option<String>,

    #[arg(long, env = "INFLUXDB_PASSWORD", hide_env_values = true)]
    pub influxdb_password: Option<String>,

    /// One of error, warn, info, debug, trace (case-insensitive)
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL,
          value_parser = or_default(DEFAULT_LOG_LEVEL.to_string()))]
    pub log_level: String,

    /// Pause between successful polling cycles
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value_t = DEFAULT_POLL_INTERVAL_SECS,
          value_parser = or_default(DEFAULT_POLL_INTERVAL_SECS))]
    pub poll_interval_secs: u64,

    /// Pause after a failed telegram read
    #[arg(long, env = "RETRY_DELAY_SECS", default_value_t = DEFAULT_RETRY_DELAY_SECS,
          value_parser = or_default(DEFAULT_RETRY_DELAY_SECS))]
    pub retry_delay_secs: u64,

    /// Maximum wait for one complete telegram
    #[arg(long, env = "READ_TIMEOUT_SECS", default_value_t = DEFAULT_READ_TIMEOUT_SECS,
          value_parser = or_default(DEFAULT_READ_TIMEOUT_SECS))]
    pub read_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            serial_port: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            influxdb_url: DEFAULT_INFLUXDB_URL.to_string(),
            influxdb_database: DEFAULT_INFLUXDB_DATABASE.to_string(),
            influxdb_username: None,
            influxdb_password: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            retry_delay_secs: DEFAULT_RETRY_DELAY_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Checks the settings the sink cannot work without.
    ///
    /// Authentication stays optional; InfluxDB 1.x runs without it by default.
    pub fn validate(&self) -> Result<(), P1Error> {
        if self.influxdb_database.trim().is_empty() {
            return Err(P1Error::ConfigError("INFLUXDB_DATABASE is required".into()));
        }
        if !(self.influxdb_url.starts_with("http://") || self.influxdb_url.starts_with("https://"))
        {
            return Err(P1Error::ConfigError(format!(
                "INFLUXDB_URL must start with http:// or https://, got {:?}",
                self.influxdb_url
            )));
        }
        if self.serial_port.trim().is_empty() {
            return Err(P1Error::ConfigError("SERIAL_PORT is required".into()));
        }
        if self.baud_rate == 0 {
            return Err(P1Error::ConfigError("SERIAL_BAUD_RATE must be positive".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}
