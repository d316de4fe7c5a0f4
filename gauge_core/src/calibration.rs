//! Transfer functions from raw sender codes to fuel volume.
//!
//! Coefficients are calibration data, not behavior: both curve shapes are
//! plain coefficient structs so an alternate sender or tank is supported
//! by substitution alone. Every function here is total over the full
//! native reading range; readings outside the fitted span extrapolate
//! silently.

/// Resistance-mediated curve.
///
/// The sender is a rheostat in a voltage divider, so the ADC code vs.
/// resistance relationship is hyperbolic. Stage one normalizes the code
/// with empirically fitted bounds and approximates that hyperbola with a
/// quadratic; stage two is the linear ohms-to-gallons map from the sender
/// spec (73 ohms at empty, 10 ohms at full, 19-gallon tank).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoStageCurve {
    /// Raw code at the low end of the fitted span.
    pub norm_floor: f32,
    /// Raw span between the fitted endpoints.
    pub norm_span: f32,
    pub quad_a: f32,
    pub quad_b: f32,
    /// Rescale from the unit quadratic output back to ohms.
    pub ohms_gain: f32,
    pub ohms_offset: f32,
    pub slope_g_per_ohm: f32,
    pub intercept_g: f32,
}

impl Default for TwoStageCurve {
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

impl TwoStageCurve {
    /// Estimated sender resistance for a raw code.
    pub fn ohms(&self, raw: f32) -> f32 {
        let x = (raw - self.norm_floor) / self.norm_span;
        let y = self.quad_a * x * x + self.quad_b * x;
        self.ohms_gain * y + self.ohms_offset
    }

    pub fn gallons(&self, raw: f32) -> f32 {
        self.slope_g_per_ohm * self.ohms(raw) + self.intercept_g
    }
}

/// Single affine fit straight from in-vehicle measurements, skipping the
/// resistance intermediate. Slope is negative: the divider reads higher
/// as the tank empties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectCurve {
    pub intercept_g: f32,
    pub slope_g_per_count: f32,
}

impl Default for DirectCurve {
    fn default() -> Self {
        Self {
            intercept_g: 26.3,
            slope_g_per_count: -0.0637,
        }
    }
}

impl DirectCurve {
    pub fn gallons(&self, raw: f32) -> f32 {
        self.intercept_g + self.slope_g_per_count * raw
    }
}

/// The calibration model in use. Swappable without touching any other
/// component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FuelCurve {
    TwoStage(TwoStageCurve),
    Direct(DirectCurve),
}

impl Default for FuelCurve {
    fn default() -> Self {
        Self::Direct(DirectCurve::default())
    }
}

impl FuelCurve {
    /// Estimated gallons remaining. May be negative or exceed tank
    /// capacity; clamping is the quantizer's job.
    pub fn gallons(&self, raw: f32) -> f32 {
        match self {
            Self::TwoStage(c) => c.gallons(raw),
            Self::Direct(c) => c.gallons(raw),
        }
    }

    /// Estimated sender resistance, when the curve models one.
    pub fn ohms(&self, raw: f32) -> Option<f32> {
        match self {
            Self::TwoStage(c) => Some(c.ohms(raw)),
            Self::Direct(_) => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        match self {
            Self::TwoStage(c) => {
                let coeffs = [
                    c.norm_floor,
                    c.norm_span,
                    c.quad_a,
                    c.quad_b,
                    c.ohms_gain,
                    c.ohms_offset,
                    c.slope_g_per_ohm,
                    c.intercept_g,
                ];
                if coeffs.iter().any(|v| !v.is_finite()) {
                    return Err("two-stage curve coefficients must be finite");
                }
                if c.norm_span == 0.0 {
                    return Err("two-stage curve norm_span must be non-zero");
                }
            }
            Self::Direct(c) => {
                if !c.intercept_g.is_finite() || !c.slope_g_per_count.is_finite() {
                    return Err("direct curve coefficients must be finite");
                }
                if c.slope_g_per_count == 0.0 {
                    return Err("direct curve slope must be non-zero");
                }
            }
        }
        Ok(())
    }
}
