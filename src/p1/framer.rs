//! # P1 Telegram Framer
//!
//! This module assembles complete DSMR P1 telegrams from a line-oriented byte
//! stream. A telegram starts with an identification line beginning with `/`
//! and ends with a line of the form `!XXXX`, where `XXXX` is the CRC16 of the
//! telegram (not verified here).
//!
//! ```text
//! /ISK5\2M550T-1012
//!
//! 1-3:0.2.8(50)
//! 1-0:1.8.1(000123.456*kWh)
//! ...
//! !1A2B
//! ```
//!
//! Framing is split in two parts:
//! - [`TelegramFramer`] is a pure state machine fed one line at a time.
//! - [`read_telegram`] drives it from any [`AsyncBufRead`] source and maps end
//!   of stream and I/O failures onto [`P1Error`].
//!
//! A new start line always resynchronizes the framer, so a partial telegram
//! left over from an earlier read (or line noise after the meter powers up)
//! never leaks into the next result.

use crate::constants::{MAX_TELEGRAM_LEN, P1_END_LINE_LEN, P1_END_MARKER, P1_START_MARKER};
use crate::error::P1Error;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};

/// One framed telegram: every line from the start line up to and including the
/// end line, each terminated by `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTelegram(String);

impl RawTelegram {
    pub fn new(text: impl Into<String>) -> Self {
        RawTelegram(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.0.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for RawTelegram {
    fn from(text: String) -> Self {
        RawTelegram(text)
    }
}

impl From<&str> for RawTelegram {
    fn from(text: &str) -> Self {
        RawTelegram(text.to_string())
    }
}

impl fmt::Display for RawTelegram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the framer is within the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramerState {
    SearchingStart,
    InTelegram,
}

/// Line-at-a-time telegram assembler.
#[derive(Debug)]
pub struct TelegramFramer {
    buffer: String,
    state: FramerState,
    /// Set when a started frame was discarded for exceeding `MAX_TELEGRAM_LEN`.
    dropped: bool,
}

impl Default for TelegramFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelegramFramer {
    pub fn new() -> Self {
        TelegramFramer {
            buffer: String::new(),
            state: FramerState::SearchingStart,
            dropped: false,
        }
    }

    pub fn state(&self) -> FramerState {
        self.state
    }

    /// Bytes accumulated for the telegram currently being assembled.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Feeds one line (without its terminator) into the framer.
    ///
    /// Returns the completed telegram when `line` is the end line of a frame.
    pub fn push_line(&mut self, line: &str) -> Option<RawTelegram> {
        if line.starts_with(P1_START_MARKER) {
            self.buffer.clear();
            self.state = FramerState::InTelegram;
            self.dropped = false;
        }

        if self.state != FramerState::InTelegram {
            return None;
        }

        self.buffer.push_str(line);
        self.buffer.push('\n');

        if is_end_line(line) {
            self.state = FramerState::SearchingStart;
            return Some(RawTelegram(std::mem::take(&mut self.buffer)));
        }

        // A frame this large has lost its end line; wait for the next start.
        if self.buffer.len() > MAX_TELEGRAM_LEN {
            self.drop_frame();
        }

        None
    }

    /// Feeds the head of a line that was cut off at `MAX_TELEGRAM_LEN` bytes.
    ///
    /// Such a line can never fit in a frame, so any frame it belongs to is
    /// dropped. The rest of the line must not be fed to the framer.
    pub fn push_overlong_line(&mut self, head: &str) {
        if head.starts_with(P1_START_MARKER) || self.state == FramerState::InTelegram {
            self.drop_frame();
        }
    }

    fn drop_frame(&mut self) {
        self.buffer.clear();
        self.state = FramerState::SearchingStart;
        self.dropped = true;
    }

    /// Consumes the framer at end of stream and reports why no telegram was produced.
    ///
    /// A frame that was started counts as incomplete even if it was dropped
    /// for size.
    pub fn finish(self) -> P1Error {
        if self.buffer.is_empty() && !self.dropped {
            P1Error::NoTelegram
        } else {
            P1Error::FramingIncomplete
        }
    }
}

/// `!` followed by exactly four CRC characters.
fn is_end_line(line: &str) -> bool {
    line.starts_with(P1_END_MARKER) && line.len() == P1_END_LINE_LEN
}

/// Strips the `\n` / `\r\n` terminator and decodes lossily; meters on a noisy
/// line do emit the odd non-ASCII byte.
fn decode_line(raw: &[u8]) -> Cow<'_, str> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw)
}

/// Reads lines from `source` until one complete telegram has been framed.
///
/// # Errors
/// * [`P1Error::SourceReadError`] - the source returned an I/O error
/// * [`P1Error::FramingIncomplete`] - the stream ended inside a telegram
/// * [`P1Error::NoTelegram`] - the stream ended before any telegram started
pub async fn read_telegram<R>(source: &mut R) -> Result<RawTelegram, P1Error>
where
    R: AsyncBufRead + Unpin + ?Sized,
{
    let mut framer = TelegramFramer::new();
    let mut raw = Vec::with_capacity(128);
    // Inside the tail of a line already reported as overlong
    let mut skipping = false;

    loop {
        raw.clear();
        let n = (&mut *source)
            .take(MAX_TELEGRAM_LEN as u64)
            .read_until(b'\n', &mut raw)
            .await?;
        if n == 0 {
            return Err(framer.finish());
        }

        let complete = raw.ends_with(b"\n");
        if skipping {
            skipping = !complete;
            continue;
        }

        if !complete && n == MAX_TELEGRAM_LEN {
            log::debug!("Discarding line longer than {MAX_TELEGRAM_LEN} bytes");
            framer.push_overlong_line(&decode_line(&raw));
            skipping = true;
            continue;
        }

        if let Some(telegram) = framer.push_line(&decode_line(&raw)) {
            return Ok(telegram);
        }
    }
}

/// Frames the first telegram found in a captured file.
pub async fn read_capture_file(path: impl AsRef<Path>) -> Result<RawTelegram, P1Error> {
    let file = tokio::fs::File::open(path.as_ref()).await?;
    let mut reader = BufReader::new(file);
    read_telegram(&mut reader).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_line_ignores_noise_before_start() {
        let mut framer = TelegramFramer::new();
        assert!(framer.push_line("1-0:1.8.1(000001.000*kWh)").is_none());
        assert!(framer.push_line("!1234").is_none());
        assert_eq!(framer.state(), FramerState::SearchingStart);
        assert_eq!(framer.buffered_len(), 0);
    }

    #[test]
    fn test_push_line_completes_on_end_line() {
        let mut framer = TelegramFramer::new();
        assert!(framer.push_line("/ISK5\\2M550T-1012").is_none());
        assert_eq!(framer.state(), FramerState::InTelegram);
        assert!(framer.push_line("").is_none());
        let telegram = framer.push_line("!1A2B").unwrap();
        assert_eq!(telegram.as_str(), "/ISK5\\2M550T-1012\n\n!1A2B\n");
        assert_eq!(framer.state(), FramerState::SearchingStart);
    }

    #[test]
    fn test_end_marker_requires_five_characters() {
        let mut framer = TelegramFramer::new();
        framer.push_line("/XMX5");
        assert!(framer.push_line("!").is_none());
        assert!(framer.push_line("!123").is_none());
        assert!(framer.push_line("!12345").is_none());
        let telegram = framer.push_line("!ABCD").unwrap();
        assert_eq!(telegram.lines().count(), 5);
    }

    #[test]
    fn test_start_line_resynchronizes() {
        let mut framer = TelegramFramer::new();
        framer.push_line("/FIRST");
        framer.push_line("1-0:1.8.1(000001.000*kWh)");
        framer.push_line("/SECOND");
        let telegram = framer.push_line("!0000").unwrap();
        assert_eq!(telegram.as_str(), "/SECOND\n!0000\n");
    }

    #[test]
    fn test_oversize_frame_is_dropped() {
        let mut framer = TelegramFramer::new();
        framer.push_line("/XMX5");
        let filler = "x".repeat(1024);
        for _ in 0..(MAX_TELEGRAM_LEN / 1024 + 1) {
            assert!(framer.push_line(&filler).is_none());
        }
        assert_eq!(framer.state(), FramerState::SearchingStart);
        assert_eq!(framer.buffered_len(), 0);
        assert!(framer.push_line("!1234").is_none());
        assert!(matches!(framer.finish(), P1Error::FramingIncomplete));
    }

    #[test]
    fn test_frame_after_oversize_frame() {
        let mut framer = TelegramFramer::new();
        framer.push_line("/XMX5");
        framer.push_overlong_line("xxxx");
        assert_eq!(framer.state(), FramerState::SearchingStart);

        framer.push_line("/ISK5");
        let telegram = framer.push_line("!1A2B").unwrap();
        assert_eq!(telegram.as_str(), "/ISK5\n!1A2B\n");
        assert!(matches!(framer.finish(), P1Error::NoTelegram));
    }

    #[test]
    fn test_overlong_noise_is_ignored() {
        let mut framer = TelegramFramer::new();
        framer.push_overlong_line("garbage");
        assert!(matches!(framer.finish(), P1Error::NoTelegram));
    }

    #[test]
    fn test_finish_reports_incomplete_frame() {
        let mut framer = TelegramFramer::new();
        framer.push_line("/XMX5");
        assert!(matches!(framer.finish(), P1Error::FramingIncomplete));
        assert!(matches!(TelegramFramer::new().finish(), P1Error::NoTelegram));
    }

    #[test]
    fn test_decode_line_strips_terminators() {
        assert_eq!(decode_line(b"!1234\r\n"), "!1234");
        assert_eq!(decode_line(b"!1234\n"), "!1234");
        assert_eq!(decode_line(b"!1234"), "!1234");
        assert_eq!(decode_line(b"/A\xffB\r\n"), "/A\u{fffd}B");
    }
}
