//! Mock serial port implementation for testing
//!
//! This module provides a mock serial port that can be used to test
//! telegram framing and the reader loop without requiring a meter.
//! Once the queued bytes are drained, reads report end of stream.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, ReadBuf};

/// Mock serial port that plays back queued bytes
#[derive(Clone)]
pub struct MockSerialPort {
    /// Data to be read from the port (incoming)
    pub rx_buffer: Arc<Mutex<VecDeque<u8>>>,
    /// Simulated errors
    pub next_error: Arc<Mutex<Option<io::Error>>>,
    /// Upper bound on bytes returned per read, to exercise partial reads
    pub chunk_size: Arc<Mutex<Option<usize>>>,
}

impl Default for MockSerialPort {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSerialPort {
    pub fn new() -> Self {
        MockSerialPort {
            rx_buffer: Arc::new(Mutex::new(VecDeque::new())),
            next_error: Arc::new(Mutex::new(None)),
            chunk_size: Arc::new(Mutex::new(None)),
        }
    }

    /// Queue data to be read from the port
    pub fn queue_rx_data(&self, data: &[u8]) {
        let mut rx = self.rx_buffer.lock().unwrap();
        rx.extend(data);
    }

    /// Queue lines terminated with CRLF, as a meter sends them
    pub fn queue_lines(&self, lines: &[&str]) {
        for line in lines {
            self.queue_rx_data(line.as_bytes());
            self.queue_rx_data(b"\r\n");
        }
    }

    /// Bytes not yet read
    pub fn pending(&self) -> usize {
        self.rx_buffer.lock().unwrap().len()
    }

    /// Clear all buffers
    pub fn clear(&self) {
        self.rx_buffer.lock().unwrap().clear();
    }

    /// Set an error to be returned once the queued data has been read
    pub fn set_next_error(&self, error: io::Error) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    /// Limit every read to at most `size` bytes
    pub fn set_chunk_size(&self, size: usize) {
        *self.chunk_size.lock().unwrap() = Some(size.max(1));
    }
}

impl AsyncRead for MockSerialPort {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let mut rx = self.rx_buffer.lock().unwrap();

        if rx.is_empty() {
            // Simulated error fires once the line has gone quiet
            if let Some(error) = self.next_error.lock().unwrap().take() {
                return Poll::Ready(Err(error));
            }
            return Poll::Ready(Ok(()));
        }

        let limit = self.chunk_size.lock().unwrap().unwrap_or(usize::MAX);
        let available = rx.len().min(buf.remaining()).min(limit);
        let data: Vec<u8> = rx.drain(..available).collect();
        buf.put_slice(&data);

        Poll::Ready(Ok(()))
    }
}
