//! # P1 Serial Communication
//!
//! This module opens the meter's P1 port and exposes it as a buffered, line
//! readable byte source for the framer. The P1 port is receive-only; nothing
//! is ever written back to the meter.

use crate::constants::DEFAULT_BAUD_RATE;
use crate::error::P1Error;
use crate::p1::framer::{read_telegram, RawTelegram};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncBufRead, AsyncRead, BufReader, ReadBuf};
use tokio_serial::SerialPortBuilderExt;

/// Configuration for serial connection.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub baudrate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baudrate: DEFAULT_BAUD_RATE,
        }
    }
}

/// Represents a handle to the P1 serial connection, encapsulating the tokio_serial::SerialStream.
pub struct P1Port {
    reader: BufReader<tokio_serial::SerialStream>,
    port_name: String,
}

impl P1Port {
    /// Opens the serial port with default settings (115200 baud, 8N1).
    pub async fn connect(port_name: &str) -> Result<P1Port, P1Error> {
        Self::connect_with_config(port_name, SerialConfig::default()).await
    }

    /// Opens the serial port with 8 data bits, no parity, one stop bit.
    ///
    /// DSMR 2.2 meters use 9600 7E1; those are not supported.
    pub async fn connect_with_config(
        port_name: &str,
        config: SerialConfig,
    ) -> Result<P1Port, P1Error> {
        let port = tokio_serial::new(port_name, config.baudrate)
            .data_bits(tokio_serial::DataBits::Eight)
            .stop_bits(tokio_serial::StopBits::One)
            .parity(tokio_serial::Parity::None)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|e| P1Error::SerialPortError(format!("failed to open {port_name}: {e}")))?;

        log::debug!("Opened serial port {port_name} at {} baud", config.baudrate);

        Ok(P1Port {
            reader: BufReader::new(port),
            port_name: port_name.to_string(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Reads the next complete telegram from the port.
    ///
    /// No timeout is applied here; see [`crate::meter_reader::MeterReader`].
    pub async fn read_telegram(&mut self) -> Result<RawTelegram, P1Error> {
        read_telegram(&mut self.reader).await
    }
}

impl AsyncRead for P1Port {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().reader).poll_read(cx, buf)
    }
}

impl AsyncBufRead for P1Port {
    fn poll_fill_buf(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<&[u8]>> {
        Pin::new(&mut self.get_mut().reader).poll_fill_buf(cx)
    }

    fn consume(self: Pin<&mut Self>, amt: usize) {
        Pin::new(&mut self.get_mut().reader).consume(amt)
    }
}
