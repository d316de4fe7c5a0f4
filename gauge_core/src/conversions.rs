//! `From` implementations bridging `gauge_config` types to `gauge_core`
//! types, so hosts assemble the gauge without field-by-field mapping.

use crate::calibration::{DirectCurve, FuelCurve, TwoStageCurve};
use crate::quantizer::MeterScale;
use crate::scheduler::SchedulerCfg;
use crate::FilterCfg;

// ── FilterCfg ────────────────────────────────────────────────────────────────

impl From<&gauge_config::FilterCfg> for FilterCfg {
    fn from(c: &gauge_config::FilterCfg) -> Self {
        Self { window: c.window }
    }
}

// ── SchedulerCfg ─────────────────────────────────────────────────────────────

impl From<&gauge_config::SchedulerCfg> for SchedulerCfg {
    fn from(c: &gauge_config::SchedulerCfg) -> Self {
        Self {
            startup_interval_ms: c.startup_interval_ms,
            normal_interval_ms: c.normal_interval_ms,
            startup_window_ms: c.startup_window_ms,
        }
    }
}

// ── MeterScale ───────────────────────────────────────────────────────────────

impl From<&gauge_config::MeterCfg> for MeterScale {
    fn from(c: &gauge_config::MeterCfg) -> Self {
        Self {
            max_segments: c.segments,
            reserve_gallons: c.reserve_gallons,
        }
    }
}

// ── Curves ───────────────────────────────────────────────────────────────────

impl From<&gauge_config::DirectCurveCfg> for DirectCurve {
    fn from(c: &gauge_config::DirectCurveCfg) -> Self {
        Self {
            intercept_g: c.intercept_g,
            slope_g_per_count: c.slope_g_per_count,
        }
    }
}

impl From<&gauge_config::TwoStageCurveCfg> for TwoStageCurve {
    fn from(c: &gauge_config::TwoStageCurveCfg) -> Self {
        Self {
            norm_floor: c.norm_floor,
            norm_span: c.norm_span,
            quad_a: c.quad_a,
            quad_b: c.quad_b,
            ohms_gain: c.ohms_gain,
            ohms_offset: c.ohms_offset,
            slope_g_per_ohm: c.slope_g_per_ohm,
            intercept_g: c.intercept_g,
        }
    }
}

impl From<&gauge_config::CalibrationCfg> for FuelCurve {
    fn from(c: &gauge_config::CalibrationCfg) -> Self {
        match c.mode {
            gauge_config::CurveMode::Direct => Self::Direct((&c.direct).into()),
            gauge_config::CurveMode::TwoStage => Self::TwoStage((&c.two_stage).into()),
        }
    }
}

/// A CSV-fitted curve drops straight into the direct slot.
impl From<&gauge_config::FittedCurve> for DirectCurve {
    fn from(c: &gauge_config::FittedCurve) -> Self {
        Self {
            intercept_g: c.intercept_g,
            slope_g_per_count: c.slope_g_per_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_mode_selects_the_curve() {
        let mut cfg = gauge_config::CalibrationCfg::default();
        assert!(matches!(FuelCurve::from(&cfg), FuelCurve::Direct(_)));
        cfg.mode = gauge_config::CurveMode::TwoStage;
        let curve = FuelCurve::from(&cfg);
        assert!(matches!(curve, FuelCurve::TwoStage(_)));
        // Defaults carry the stock fitted coefficients through.
        if let FuelCurve::TwoStage(t) = curve {
            assert!((t.quad_a - 0.5387).abs() < 1e-6);
        }
    }
}
