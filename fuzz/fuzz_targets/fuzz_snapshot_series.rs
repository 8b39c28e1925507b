//! Fuzz target for snapshot series documents.
//!
//! Tests that series parsing handles arbitrary input without panicking, and
//! that every document the loader accepts can be analysed.

#![no_main]

use dw_common::CpuMode;
use dw_core::contention::MonitorFilter;
use dw_core::input::parse_series;
use dw_core::report::{CpuReport, MonitorReport, SummaryReport};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(series) = parse_series(text) else {
        return;
    };
    for mode in CpuMode::ALL {
        let _ = CpuReport::build(&series.snapshots, mode, 40);
    }
    let _ = MonitorReport::build(&series.snapshots, MonitorFilter::default());
    let _ = SummaryReport::build(&series.snapshots);
});
