#![no_main]

use libfuzzer_sys::fuzz_target;
use p1_rs::p1::framer::FramerState;
use p1_rs::TelegramFramer;

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let mut framer = TelegramFramer::new();

    for line in text.lines() {
        if let Some(telegram) = framer.push_line(line) {
            // Every frame opens on a start line and closes on a `!XXXX` end line
            assert!(telegram.as_str().starts_with('/'));
            let last = telegram.lines().last().unwrap_or_default();
            assert!(last.starts_with('!'));
            assert_eq!(last.len(), 5);
            assert_eq!(framer.state(), FramerState::SearchingStart);
        }
        assert!(framer.buffered_len() <= p1_rs::constants::MAX_TELEGRAM_LEN);
    }

    let _ = framer.finish();
});
