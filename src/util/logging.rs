//! # Logging Utilities
//!
//! Rate limiting for repeated warnings and a bounded dump of raw telegram
//! text for debugging a meter that sends something unexpected.
//!
//! ## Usage
//!
//! ```rust
//! use p1_rs::util::logging::{log_telegram, LogThrottle};
//!
//! // Rate-limited logging
//! let mut throttle = LogThrottle::new(60_000, 3); // 3 messages per minute
//! if throttle.allow() {
//!     log::warn!("Error reading telegram");
//! }
//!
//! log_telegram("Received telegram", "/ISK5\\2M550T-1012\n!1A2B\n");
//! ```

use std::time::Instant;

/// Throttling structure for rate-limiting log messages
///
/// A meter that is unplugged produces one read failure per retry; this keeps
/// the log readable while the condition persists.
#[derive(Debug)]
pub struct LogThrottle {
    /// Time window for throttling (in milliseconds)
    window_ms: u64,
    /// Maximum messages allowed per window
    cap: u32,
    /// Current message count in window
    count: u32,
    /// Messages suppressed since the window opened
    suppressed: u32,
    /// Start time of current window
    t0: Instant,
}

impl LogThrottle {
    /// Create new throttle with time window and message cap
    ///
    /// # Arguments
    /// * `window_ms` - Time window in milliseconds
    /// * `cap` - Maximum messages allowed per window
    pub fn new(window_ms: u64, cap: u32) -> Self {
        Self {
            window_ms,
            cap,
            count: 0,
            suppressed: 0,
            t0: Instant::now(),
        }
    }

    /// Check if logging is allowed (resets counter after window expires)
    ///
    /// Returns `true` if the message should be logged, `false` if it
    /// should be throttled.
    pub fn allow(&mut self) -> bool {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(self.t0).as_millis() as u64;

        if elapsed_ms > self.window_ms {
            self.t0 = now;
            self.count = 0;
            self.suppressed = 0;
        }

        self.count += 1;
        let allowed = self.count <= self.cap;
        if !allowed {
            self.suppressed += 1;
        }
        allowed
    }

    /// Number of messages dropped in the current window
    pub fn suppressed(&self) -> u32 {
        self.suppressed
    }

    /// Reset the throttle (start new window immediately)
    pub fn reset(&mut self) {
        self.t0 = Instant::now();
        self.count = 0;
        self.suppressed = 0;
    }
}

/// Log raw telegram text at debug level, truncated to keep the log bounded.
pub fn log_telegram(prefix: &str, text: &str) {
    const MAX_LOG_CHARS: usize = 512;

    if !log::log_enabled!(log::Level::Debug) {
        return;
    }

    let total = text.chars().count();
    let shown: String = text.chars().take(MAX_LOG_CHARS).collect();
    let suffix = if total > MAX_LOG_CHARS {
        format!(" ... ({total} chars total)")
    } else {
        String::new()
    };

    log::debug!(target: "p1::telegram", "{prefix}:\n{shown}{suffix}");
}
