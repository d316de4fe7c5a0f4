#![no_main]
use gauge_config::{CalibrationRow, FittedCurve};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: Vec<(u32, f32)>| {
    let rows: Vec<CalibrationRow> = data
        .into_iter()
        .map(|(raw, gallons)| CalibrationRow { raw, gallons })
        .collect();
    // Bad measurement sets (too few rows, duplicates, NaN gallons) must
    // come back as errors, never panics or non-finite coefficients.
    if let Ok(fit) = FittedCurve::from_rows(&rows) {
        assert!(fit.slope_g_per_count.is_finite());
        assert!(fit.intercept_g.is_finite());
    }
});
