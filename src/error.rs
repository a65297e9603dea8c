//! # P1 Error Handling
//!
//! This module defines the P1Error enum, which represents the different error
//! types that can occur in the p1-rs crate.
//!
//! The framing variants (`SourceReadError`, `FramingIncomplete`, `NoTelegram`)
//! are produced by the telegram framer and surfaced verbatim. Extraction and
//! encoding never fail, so they have no variants here.

use std::time::Duration;
use thiserror::Error;

/// Represents the different error types that can occur in the P1 crate.
#[derive(Debug, Error)]
pub enum P1Error {
    /// Indicates an error opening or configuring the serial port.
    #[error("Serial port error: {0}")]
    SerialPortError(String),

    /// The underlying byte source failed while reading a telegram.
    #[error("Error reading from byte source: {0}")]
    SourceReadError(#[from] std::io::Error),

    /// The byte source ended after a start marker but before the end marker.
    #[error("Incomplete telegram: stream ended before end marker")]
    FramingIncomplete,

    /// The byte source ended without producing any telegram data.
    #[error("No telegram received")]
    NoTelegram,

    /// No complete telegram arrived within the read timeout.
    #[error("Timed out after {0:?} waiting for telegram")]
    ReadTimeout(Duration),

    /// Indicates a transport failure talking to the time-series store.
    #[error("Sink error: {0}")]
    SinkError(String),

    /// The time-series store answered with an unexpected status.
    #[error("{operation} failed with status: {status}")]
    SinkStatus { operation: &'static str, status: u16 },

    /// Indicates invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl P1Error {
    /// True for failures on the byte source side of a polling cycle.
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            P1Error::SourceReadError(_)
                | P1Error::FramingIncomplete
                | P1Error::NoTelegram
                | P1Error::ReadTimeout(_)
        )
    }
}

impl From<reqwest::Error> for P1Error {
    fn from(err: reqwest::Error) -> Self {
        P1Error::SinkError(err.to_string())
    }
}

impl From<tokio_serial::Error> for P1Error {
    fn from(err: tokio_serial::Error) -> Self {
        P1Error::SerialPortError(err.to_string())
    }
}
