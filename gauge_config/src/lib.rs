#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration fitting for the fuel gauge.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//!   Every field has a default matching the reference vehicle, so an
//!   empty config file (or none at all) yields the stock gauge.
//! - The calibration CSV loader enforces headers and fits a direct
//!   raw-to-gallons line by ordinary least squares from in-vehicle
//!   measurement rows.
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SensorCfg {
    /// Analog input channel the fuel sender divider is wired to.
    pub channel: u8,
    /// Full-scale ADC code (1023 for the 10-bit reference converter).
    pub adc_max: u16,
}

impl Default for SensorCfg {
    fn default() -> Self {
        Self {
            channel: 0,
            adc_max: 1023,
        }
    }
}

/// Which transfer function converts raw codes to gallons.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CurveMode {
    /// Single affine fit straight from in-vehicle measurements.
    #[default]
    Direct,
    /// Quadratic resistance approximation, then a linear ohms-to-gallons
    /// stage derived from the sender's empty/full resistance spec.
    TwoStage,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DirectCurveCfg {
    pub intercept_g: f32,
    /// Gallons per ADC count; negative because the divider reads higher
    /// as the tank empties.
    pub slope_g_per_count: f32,
}

impl Default for DirectCurveCfg {
    fn default() -> Self {
        Self {
            intercept_g: 26.3,
            slope_g_per_count: -0.0637,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct TwoStageCurveCfg {
    /// Raw code observed at minimum sender resistance.
    pub norm_floor: f32,
    /// Raw span between the fitted calibration endpoints.
    pub norm_span: f32,
    pub quad_a: f32,
    pub quad_b: f32,
    pub ohms_gain: f32,
    pub ohms_offset: f32,
    pub slope_g_per_ohm: f32,
    pub intercept_g: f32,
}

impl Default for TwoStageCurveCfg {
    fn default() -> Self {
        Self {
            norm_floor: 80.0,
            norm_span: 454.0,
            quad_a: 0.5387,
            quad_b: 0.4665,
            ohms_gain: 100.0,
            ohms_offset: 2.0,
            slope_g_per_ohm: -0.3016,
            intercept_g: 22.016,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct CalibrationCfg {
    pub mode: CurveMode,
    pub direct: DirectCurveCfg,
    pub two_stage: TwoStageCurveCfg,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct FilterCfg {
    /// Rolling-average window in samples. 1 disables smoothing and routes
    /// each raw reading straight to calibration.
    pub window: usize,
}

impl Default for FilterCfg {
    fn default() -> Self {
        Self { window: 100 }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SchedulerCfg {
    /// Sampling interval right after power-on.
    pub startup_interval_ms: u32,
    /// Steady-state sampling interval.
    pub normal_interval_ms: u32,
    /// How long after boot the startup cadence lasts.
    pub startup_window_ms: u32,
}

impl Default for SchedulerCfg {
    fn default() -> Self {
        Self {
            startup_interval_ms: 500,
            normal_interval_ms: 5_000,
            startup_window_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MeterCfg {
    /// Number of bar-graph cells on the cluster.
    pub segments: u8,
    /// Gallons held back at the bottom of the tank; the bar reads empty
    /// while the reserve is all that remains.
    pub reserve_gallons: u8,
}

impl Default for MeterCfg {
    fn default() -> Self {
        Self {
            segments: 16,
            reserve_gallons: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct DisplayCfg {
    /// Width of the numeric stats fields (right-aligned).
    pub stats_width: usize,
    /// Digits after the decimal point in the gallons field.
    pub stats_decimals: usize,
}

impl Default for DisplayCfg {
    fn default() -> Self {
        Self {
            stats_width: 6,
            stats_decimals: 1,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct RunnerCfg {
    /// How often the control loop polls the scheduler between samples.
    pub poll_ms: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self { poll_ms: 50 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorCfg,
    pub calibration: CalibrationCfg,
    pub filter: FilterCfg,
    pub scheduler: SchedulerCfg,
    pub meter: MeterCfg,
    pub display: DisplayCfg,
    pub logging: Logging,
    pub runner: RunnerCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensor
        if self.sensor.adc_max == 0 {
            eyre::bail!("sensor.adc_max must be > 0");
        }
        if self.sensor.channel > 7 {
            eyre::bail!("sensor.channel must be in [0, 7]");
        }

        // Calibration
        let d = &self.calibration.direct;
        if !d.intercept_g.is_finite() || !d.slope_g_per_count.is_finite() {
            eyre::bail!("calibration.direct coefficients must be finite");
        }
        if d.slope_g_per_count == 0.0 {
            eyre::bail!("calibration.direct.slope_g_per_count must be non-zero");
        }
        let t = &self.calibration.two_stage;
        for (name, v) in [
            ("norm_floor", t.norm_floor),
            ("norm_span", t.norm_span),
            ("quad_a", t.quad_a),
            ("quad_b", t.quad_b),
            ("ohms_gain", t.ohms_gain),
            ("ohms_offset", t.ohms_offset),
            ("slope_g_per_ohm", t.slope_g_per_ohm),
            ("intercept_g", t.intercept_g),
        ] {
            if !v.is_finite() {
                eyre::bail!("calibration.two_stage.{name} must be finite");
            }
        }
        if t.norm_span == 0.0 {
            eyre::bail!("calibration.two_stage.norm_span must be non-zero");
        }

        // Filter
        if self.filter.window == 0 {
            eyre::bail!("filter.window must be >= 1");
        }
        if self.filter.window > 10_000 {
            eyre::bail!("filter.window is unreasonably large (>10000 samples)");
        }

        // Scheduler
        if self.scheduler.startup_interval_ms == 0 {
            eyre::bail!("scheduler.startup_interval_ms must be >= 1");
        }
        if self.scheduler.normal_interval_ms == 0 {
            eyre::bail!("scheduler.normal_interval_ms must be >= 1");
        }
        if self.scheduler.normal_interval_ms < self.scheduler.startup_interval_ms {
            eyre::bail!("scheduler.normal_interval_ms must be >= startup_interval_ms");
        }

        // Meter
        if self.meter.segments == 0 {
            eyre::bail!("meter.segments must be >= 1");
        }
        if self.meter.segments > 64 {
            eyre::bail!("meter.segments is unreasonably large (>64)");
        }

        // Display
        if self.display.stats_width == 0 {
            eyre::bail!("display.stats_width must be >= 1");
        }
        if self.display.stats_decimals > 6 {
            eyre::bail!("display.stats_decimals must be <= 6");
        }

        // Runner
        if self.runner.poll_ms == 0 {
            eyre::bail!("runner.poll_ms must be >= 1");
        }

        Ok(())
    }
}

/// Calibration CSV schema.
///
/// Expected headers:
/// raw,gallons
///
/// Example:
/// raw,gallons
/// 120,19.0
/// 305,7.0
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CalibrationRow {
    pub raw: u32,
    pub gallons: f32,
}

/// A direct curve fitted from measurement rows.
#[derive(Debug, Clone, Copy)]
pub struct FittedCurve {
    pub intercept_g: f32,
    pub slope_g_per_count: f32,
}

impl FittedCurve {
    /// Ordinary least squares over all rows: gallons = slope*raw + intercept.
    ///
    /// Raw values must be strictly monotonic (increasing or decreasing) —
    /// duplicate or back-tracking codes mean the tank was not settled
    /// between measurements and the fit would be meaningless.
    pub fn from_rows(rows: &[CalibrationRow]) -> eyre::Result<Self> {
        if rows.len() < 2 {
            eyre::bail!("calibration requires at least two rows, got {}", rows.len());
        }

        let mut dir: i8 = 0; // 1 for increasing, -1 for decreasing
        for i in 1..rows.len() {
            let d = i64::from(rows[i].raw) - i64::from(rows[i - 1].raw);
            if d == 0 {
                eyre::bail!(
                    "calibration rows have duplicate raw values at index {} and {}",
                    i - 1,
                    i
                );
            }
            let step_dir = if d > 0 { 1 } else { -1 };
            if dir == 0 {
                dir = step_dir;
            } else if dir != step_dir {
                eyre::bail!(
                    "calibration raw values must be monotonic (strictly increasing or strictly decreasing)"
                );
            }
        }

        // OLS in f64 for numerical stability
        let n = rows.len() as f64;
        let sum_x: f64 = rows.iter().map(|r| f64::from(r.raw)).sum();
        let sum_y: f64 = rows.iter().map(|r| f64::from(r.gallons)).sum();
        let mean_x = sum_x / n;
        let mean_y = sum_y / n;
        let mut sxx = 0.0f64;
        let mut sxy = 0.0f64;
        for r in rows {
            let x = f64::from(r.raw) - mean_x;
            let y = f64::from(r.gallons) - mean_y;
            sxx += x * x;
            sxy += x * y;
        }
        if !sxx.is_finite() || sxx == 0.0 {
            eyre::bail!("calibration cannot determine slope (degenerate raw variance)");
        }
        let a = sxy / sxx;
        let b = mean_y - a * mean_x;
        // Check after narrowing: a slope finite in f64 can still overflow
        // or underflow the f32 the curve stores.
        let slope = a as f32;
        let intercept = b as f32;
        if !slope.is_finite() || slope == 0.0 {
            eyre::bail!("calibration produced an unusable slope");
        }
        if !intercept.is_finite() {
            eyre::bail!("calibration produced a non-finite intercept");
        }

        Ok(Self {
            intercept_g: intercept,
            slope_g_per_count: slope,
        })
    }
}

impl TryFrom<&[CalibrationRow]> for FittedCurve {
    type Error = eyre::Report;
    fn try_from(rows: &[CalibrationRow]) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

pub fn load_calibration_csv(path: &std::path::Path) -> eyre::Result<FittedCurve> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open calibration CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["raw", "gallons"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "calibration CSV must have headers 'raw,gallons', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CalibrationRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    FittedCurve::try_from(rows.as_slice())
}
