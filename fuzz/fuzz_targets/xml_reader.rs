#![no_main]
use libfuzzer_sys::fuzz_target;
use xcfg::{Reader, ReaderConfig};

fuzz_target!(|data: &[u8]| {
    let reader = Reader::with_config(data, ReaderConfig::new(64, 1 << 16));
    for event in reader {
        if event.is_err() {
            break;
        }
    }
});
