#![no_main]
use libfuzzer_sys::fuzz_target;
use loader::{parse_patterns, Catalog};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        for json in [false, true] {
            if let Ok(defs) = parse_patterns(s, json) {
                if let Ok(catalog) = Catalog::compile(defs) {
                    let _ = engine::scan_matches(s, &catalog);
                }
            }
        }
    }
});
