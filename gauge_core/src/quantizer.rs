//! Quantizes a continuous fuel estimate into bar-graph segments.

/// Maps gallons to a filled-segment count in [0, max_segments].
///
/// Whole gallons are taken by truncation toward zero (negative estimates
/// from extreme extrapolation truncate toward zero as well, matching the
/// original gauge), then the reserve margin is subtracted and the result
/// clamped. Each segment reads one gallon with the reserve offset baked
/// in: the bar shows empty while reserve_gallons + 1 exceeds the
/// estimate, keeping the driver off the sediment at the tank bottom, and
/// the top reserve_gallons of headroom collapse into a full bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterScale {
    pub max_segments: u8,
    pub reserve_gallons: u8,
}

impl Default for MeterScale {
    fn default() -> Self {
        Self {
            max_segments: 16,
            reserve_gallons: 2,
        }
    }
}

impl MeterScale {
    /// Monotonically non-decreasing in `gallons`; total over every f32
    /// including NaN (the saturating cast maps NaN to 0, which clamps to
    /// an empty bar).
    pub fn segments(&self, gallons: f32) -> u8 {
        let whole = gallons as i32; // truncation toward zero
        let shifted = whole - i32::from(self.reserve_gallons);
        shifted.clamp(0, i32::from(self.max_segments)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::MeterScale;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, 0)]
    #[case(2.99, 0)] // dead zone: under three gallons reads empty
    #[case(3.0, 1)]
    #[case(7.19, 5)]
    #[case(14.1, 12)]
    #[case(17.9, 15)]
    #[case(18.0, 16)]
    #[case(19.0, 16)] // top headroom collapses into the full bar
    #[case(25.0, 16)]
    fn quantizes_reference_points(#[case] gallons: f32, #[case] expected: u8) {
        let m = MeterScale::default();
        assert_eq!(m.segments(gallons), expected);
    }

    #[rstest]
    #[case(-0.5)]
    #[case(-4.2)]
    #[case(f32::NEG_INFINITY)]
    fn negative_estimates_clamp_to_empty(#[case] gallons: f32) {
        assert_eq!(MeterScale::default().segments(gallons), 0);
    }

    #[test]
    fn nan_reads_empty() {
        assert_eq!(MeterScale::default().segments(f32::NAN), 0);
    }

    #[test]
    fn monotone_over_a_sweep() {
        let m = MeterScale::default();
        let mut prev = 0;
        let mut g = -5.0f32;
        while g < 30.0 {
            let s = m.segments(g);
            assert!(s >= prev, "segments regressed at {g}");
            assert!(s <= m.max_segments);
            prev = s;
            g += 0.1;
        }
    }

    #[test]
    fn custom_scale() {
        let m = MeterScale {
            max_segments: 8,
            reserve_gallons: 0,
        };
        assert_eq!(m.segments(3.7), 3);
        assert_eq!(m.segments(12.0), 8);
    }
}
