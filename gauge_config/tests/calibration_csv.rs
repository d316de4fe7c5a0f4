use std::fs::File;
use std::io::Write;

use gauge_config::{CalibrationRow, FittedCurve, load_calibration_csv};
use rstest::rstest;
use tempfile::tempdir;

#[rstest]
fn fit_from_two_points_is_exact() {
    // Two points on gallons = -0.05*raw + 25
    let rows = [
        CalibrationRow {
            raw: 100,
            gallons: 20.0,
        },
        CalibrationRow {
            raw: 300,
            gallons: 10.0,
        },
    ];
    let c = FittedCurve::from_rows(&rows).unwrap();
    assert!((c.slope_g_per_count - -0.05).abs() < 1e-6);
    assert!((c.intercept_g - 25.0).abs() < 1e-4);
}

#[rstest]
fn fit_from_three_points_ols() {
    // Exactly collinear for determinism: gallons = -0.1*raw + 40
    let rows = [
        CalibrationRow {
            raw: 100,
            gallons: 30.0,
        },
        CalibrationRow {
            raw: 200,
            gallons: 20.0,
        },
        CalibrationRow {
            raw: 300,
            gallons: 10.0,
        },
    ];
    let c = FittedCurve::from_rows(&rows).unwrap();
    assert!((c.slope_g_per_count - -0.1).abs() < 1e-6);
    assert!((c.intercept_g - 40.0).abs() < 1e-4);
}

#[rstest]
fn rejects_single_row() {
    let rows = [CalibrationRow {
        raw: 100,
        gallons: 20.0,
    }];
    let err = FittedCurve::from_rows(&rows).unwrap_err();
    assert!(format!("{err}").contains("at least two rows"));
}

#[rstest]
fn rejects_duplicate_raw() {
    let rows = [
        CalibrationRow {
            raw: 100,
            gallons: 20.0,
        },
        CalibrationRow {
            raw: 100,
            gallons: 10.0,
        },
    ];
    let err = FittedCurve::from_rows(&rows).unwrap_err();
    assert!(format!("{err}").contains("duplicate raw"));
}

#[rstest]
fn rejects_non_monotonic_raw() {
    let rows = [
        CalibrationRow {
            raw: 100,
            gallons: 20.0,
        },
        CalibrationRow {
            raw: 300,
            gallons: 10.0,
        },
        CalibrationRow {
            raw: 200,
            gallons: 15.0,
        },
    ];
    let err = FittedCurve::from_rows(&rows).unwrap_err();
    assert!(format!("{err}").contains("monotonic"));
}

#[rstest]
fn loads_csv_with_strict_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cal.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "raw,gallons").unwrap();
    writeln!(f, "120,19.0").unwrap();
    writeln!(f, "305,7.0").unwrap();
    drop(f);

    let c = load_calibration_csv(&path).unwrap();
    assert!(c.slope_g_per_count < 0.0, "fuel slope must be negative");
}

#[rstest]
fn rejects_wrong_headers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cal.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "raw,grams").unwrap();
    writeln!(f, "120,19.0").unwrap();
    drop(f);

    let err = load_calibration_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("raw,gallons"));
}

#[rstest]
fn rejects_malformed_row() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cal.csv");
    let mut f = File::create(&path).unwrap();
    writeln!(f, "raw,gallons").unwrap();
    writeln!(f, "120,19.0").unwrap();
    writeln!(f, "oops,7.0").unwrap();
    drop(f);

    let err = load_calibration_csv(&path).unwrap_err();
    assert!(format!("{err}").contains("invalid CSV row 3"));
}
