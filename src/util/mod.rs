//! # Utility Modules
//!
//! Common helpers used by the driver loop: rate-limited logging and bounded
//! telegram dumps.

pub mod logging;

pub use logging::{log_telegram, LogThrottle};
