#![no_main]
use libfuzzer_sys::fuzz_target;
use xcfg::{from_xml_str, WriteOptions};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(doc) = from_xml_str(s) {
            for options in [WriteOptions::pretty(), WriteOptions::compact()] {
                let _ = from_xml_str(&doc.to_xml(options));
            }
        }
    }
});
