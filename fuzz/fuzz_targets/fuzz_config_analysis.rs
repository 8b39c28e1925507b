//! Fuzz target for analysis.json configuration parsing.
//!
//! Tests that JSON configuration parsing and validation handle arbitrary
//! input without panicking.

#![no_main]

use dw_config::validate::validate_analysis;
use dw_config::AnalysisConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = AnalysisConfig::parse_json(text) {
        let _ = validate_analysis(&config);
    }
});
