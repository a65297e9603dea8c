//! End-to-end tests of the polling loop with in-memory sources and a recording sink.


use p1_rs::p1::serial_mock::MockSerialPort;
use p1_rs::{MeterReader, P1Error, ReaderSettings};
use std::sync::Arc;
use std::time::Duration;
use telegram_support::{telegram_text, RecordingSink, SAMPLE_TELEGRAM};
use tokio::io::BufReader;
use tokio::sync::Notify;

fn fast_settings() -> ReaderSettings {
    ReaderSettings {
        poll_interval: Duration::ZERO,
        retry_delay: Duration::from_millis(1),
        read_timeout: Duration::from_secs(5),
    }
}

/// Tests that one cycle frames, extracts, encodes and writes a line.
#[tokio::test]
async fn test_run_once_writes_line() {
    let sink = RecordingSink::new();
    let mut reader = MeterReader::new(SAMPLE_TELEGRAM.as_bytes(), sink.clone(), fast_settings());

    let record = reader.run_once().await.unwrap();
    assert_eq!(record.current_power_usage, 324);
    assert_eq!(reader.records_written(), 1);

    let written = sink.written();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with(
        "electricity,meter=smart_meter consumed_tariff1=123.456000,consumed_tariff2=234.567000,"
    ));
    assert!(written[0].contains(",total_consumed=358.023000,total_produced=35.801000 "));
}

/// Tests that a framing failure is returned and nothing is written.
#[tokio::test]
async fn test_run_once_framing_failure() {
    let sink = RecordingSink::new();
    let source: &[u8] = b"/XMX5LGBBFG1012327662\r\n1-0:1.7.0(00.324*kW)\r\n";
    let mut reader = MeterReader::new(source, sink.clone(), fast_settings());

    let err = reader.run_once().await.unwrap_err();
    assert!(matches!(err, P1Error::FramingIncomplete));
    assert!(err.is_read_failure());
    assert!(sink.written().is_empty());
    assert_eq!(reader.records_written(), 0);
}

/// Tests that a sink failure is surfaced as a non-read failure.
#[tokio::test]
async fn test_run_once_sink_failure() {
    let mut reader = MeterReader::new(
        SAMPLE_TELEGRAM.as_bytes(),
        RecordingSink::failing(500),
        fast_settings(),
    );

    let err = reader.run_once().await.unwrap_err();
    assert!(matches!(
        err,
        P1Error::SinkStatus {
            operation: "write",
            status: 500
        }
    ));
    assert!(!err.is_read_failure());
    assert_eq!(reader.records_written(), 0);
}

/// Tests that a silent source hits the read timeout.
#[tokio::test]
async fn test_read_timeout() {
    let (client, _server) = tokio::io::duplex(64);
    let settings = ReaderSettings {
        read_timeout: Duration::from_millis(50),
        ..fast_settings()
    };
    let mut reader = MeterReader::new(BufReader::new(client), RecordingSink::new(), settings);

    let err = reader.read_record().await.unwrap_err();
    assert!(matches!(err, P1Error::ReadTimeout(d) if d == Duration::from_millis(50)));
    assert!(err.is_read_failure());
}

/// Tests that the loop keeps polling until shutdown and writes each telegram.
#[tokio::test]
async fn test_run_until_shutdown() {
    let port = MockSerialPort::new();
    port.queue_rx_data(telegram_text(&["1-0:1.7.0(00.100*kW)"]).as_bytes());
    port.queue_rx_data(b"line noise\r\n");
    port.queue_rx_data(telegram_text(&["1-0:1.7.0(00.200*kW)"]).as_bytes());

    let done = Arc::new(Notify::new());
    let sink = RecordingSink::notifying(2, done.clone());
    let mut reader = MeterReader::new(BufReader::new(port), sink.clone(), fast_settings());

    let shutdown = {
        let done = done.clone();
        async move { done.notified().await }
    };
    tokio::time::timeout(Duration::from_secs(5), reader.run_until(shutdown))
        .await
        .expect("reader did not stop")
        .unwrap();

    let written = sink.written();
    assert_eq!(written.len(), 2);
    assert!(written[0].contains(",current_power_usage=100,"));
    assert!(written[1].contains(",current_power_usage=200,"));
}

/// Tests that read failures do not end the loop.
#[tokio::test]
async fn test_run_until_survives_read_failures() {
    let sink = RecordingSink::new();
    let source: &[u8] = b"";
    let mut reader = MeterReader::new(source, sink.clone(), fast_settings());

    tokio::time::timeout(
        Duration::from_secs(5),
        reader.run_until(tokio::time::sleep(Duration::from_millis(30))),
    )
    .await
    .expect("reader did not stop")
    .unwrap();

    assert!(sink.written().is_empty());
}

/// Tests that an already completed shutdown stops the loop before any cycle.
#[tokio::test]
async fn test_run_until_immediate_shutdown() {
    let sink = RecordingSink::new();
    let mut reader = MeterReader::new(SAMPLE_TELEGRAM.as_bytes(), sink.clone(), fast_settings());

    reader.run_until(std::future::ready(())).await.unwrap();
    assert!(sink.written().is_empty());
    assert_eq!(reader.records_written(), 0);
}
