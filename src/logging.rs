use log::{info, log_enabled, Level, LevelFilter};

/// Initializes the logger with the `env_logger` crate.
///
/// Honors `RUST_LOG`; defaults to `error` when unset.
pub fn init_logger() {
    let _ = env_logger::try_init();
}

/// Initializes the logger from a `LOG_LEVEL`-style string such as `INFO` or `debug`.
///
/// `RUST_LOG`, when set, takes precedence so individual modules can still be
/// tuned. Calling this more than once is harmless; later calls are ignored.
pub fn init_logger_with_level(level: &str) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(parse_level(level));
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let _ = builder.try_init();
}

/// Maps a level name onto a [`LevelFilter`], falling back to `Info`.
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" | "warning" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Logs an informational message.
pub fn log_info(message: &str) {
    if log_enabled!(Level::Info) {
        info!("{message}");
    }
}
