//! # Meter Reader
//!
//! The polling loop that ties the pipeline together. Each cycle frames one
//! telegram from the byte source, extracts a [`MeasurementRecord`], encodes
//! it and hands the line to a [`MeasurementSink`].
//!
//! Failure policy:
//! - read/framing failures are logged (rate-limited) and retried after
//!   `retry_delay`
//! - sink failures are logged and the loop carries on after `poll_interval`
//! - the shutdown future cancels a pending read or sleep immediately

use crate::config::Config;
use crate::error::P1Error;
use crate::influx::client::MeasurementSink;
use crate::influx::line_protocol::encode;
use crate::p1::framer::read_telegram;
use crate::payload::obis::extract;
use crate::payload::record::MeasurementRecord;
use crate::util::logging::{log_telegram, LogThrottle};
use chrono::Utc;
use std::future::Future;
use std::time::Duration;
use tokio::io::AsyncBufRead;

/// Window and cap for repeated read-failure warnings.
const READ_FAILURE_LOG_WINDOW_MS: u64 = 60_000;
const READ_FAILURE_LOG_CAP: u32 = 3;

/// Timing of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSettings {
    pub poll_interval: Duration,
    pub retry_delay: Duration,
    pub read_timeout: Duration,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        ReaderSettings::from(&Config::default())
    }
}

impl From<&Config> for ReaderSettings {
    fn from(config: &Config) -> Self {
        ReaderSettings {
            poll_interval: config.poll_interval(),
            retry_delay: config.retry_delay(),
            read_timeout: config.read_timeout(),
        }
    }
}

/// Drives source -> extractor -> encoder -> sink.
pub struct MeterReader<S, K> {
    source: S,
    sink: K,
    settings: ReaderSettings,
    read_failures: LogThrottle,
    records_written: u64,
}

impl<S, K> MeterReader<S, K>
where
    S: AsyncBufRead + Unpin + Send,
    K: MeasurementSink,
{
    pub fn new(source: S, sink: K, settings: ReaderSettings) -> Self {
        MeterReader {
            source,
            sink,
            settings,
            read_failures: LogThrottle::new(READ_FAILURE_LOG_WINDOW_MS, READ_FAILURE_LOG_CAP),
            records_written: 0,
        }
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Frames and extracts one record, bounded by the read timeout.
    pub async fn read_record(&mut self) -> Result<MeasurementRecord, P1Error> {
        let telegram = tokio::time::timeout(
            self.settings.read_timeout,
            read_telegram(&mut self.source),
        )
        .await
        .map_err(|_| P1Error::ReadTimeout(self.settings.read_timeout))??;

        log_telegram("Received telegram", telegram.as_str());
        Ok(extract(&telegram, Utc::now()))
    }

    /// One full cycle: read, encode, write.
    pub async fn run_once(&mut self) -> Result<MeasurementRecord, P1Error> {
        let record = self.read_record().await?;
        let line = encode(&record);
        log::debug!("Encoded: {line}");

        self.sink.write_lines(std::slice::from_ref(&line)).await?;
        self.records_written += 1;
        Ok(record)
    }

    /// Logs the cycle result and returns how long to wait before the next one.
    fn handle_outcome(&mut self, outcome: Result<MeasurementRecord, P1Error>) -> Duration {
        match outcome {
            Ok(record) => {
                self.read_failures.reset();
                log::info!(
                    "Successfully sent data to InfluxDB: Power={}W",
                    record.current_power_usage
                );
                self.settings.poll_interval
            }
            Err(e) if e.is_read_failure() => {
                if self.read_failures.allow() {
                    log::warn!("Error reading telegram: {e}");
                }
                self.settings.retry_delay
            }
            Err(e) => {
                log::error!("Error writing to InfluxDB: {e}");
                self.settings.poll_interval
            }
        }
    }

    /// Runs cycles until `shutdown` completes.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), P1Error>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        log::info!("Starting smart meter reader...");

        loop {
            let outcome = tokio::select! {
                biased;
                _ = &mut shutdown => break,
                outcome = self.run_once() => outcome,
            };
            let delay = self.handle_outcome(outcome);

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        log::info!("Shutting down after {} records", self.records_written);
        Ok(())
    }
}

/// Completes on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                log::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    log::info!("Received shutdown signal, stopping...");
}
