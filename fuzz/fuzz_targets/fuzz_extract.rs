#![no_main]

use chrono::{TimeZone, Utc};
use libfuzzer_sys::fuzz_target;
use p1_rs::{encode, extract, RawTelegram};

fuzz_target!(|data: &[u8]| {
    let telegram = RawTelegram::new(String::from_utf8_lossy(data).into_owned());
    let Some(ts) = Utc.timestamp_opt(1_678_883_696, 0).single() else {
        return;
    };

    // Extraction never fails; whatever it yields must encode to one line
    let record = extract(&telegram, ts);
    let line = encode(&record);
    assert!(!line.as_str().contains('\n'));
    assert!(line.as_str().starts_with("electricity,meter=smart_meter "));
});
