#![no_main]
use engine::{analyze_file_risk, scan_file, trace_variable, HeatmapPolicy};
use libfuzzer_sys::fuzz_target;
use loader::Catalog;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let catalog = Catalog::builtin();
        let result = scan_file("fuzz.js", s, catalog);
        for path in &result.flow.tainted_paths {
            assert!(path.iter().all(|id| result.flow.node(id).is_some()));
        }
        let _ = trace_variable("fuzz.js", s, catalog, "input");
        let risk = analyze_file_risk("fuzz.js", s, catalog, &HeatmapPolicy::default(), 10);
        assert!((0.0..=100.0).contains(&risk.risk_score));
    }
});
