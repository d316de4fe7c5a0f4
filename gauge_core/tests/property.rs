use gauge_core::{
    DirectCurve, FuelCurve, MeterScale, SampleFilter, SampleScheduler, SchedulerCfg,
    TwoStageCurve,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn quantizer_is_bounded_and_monotone(a in -100.0f32..100.0, b in -100.0f32..100.0) {
        let m = MeterScale::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let s_lo = m.segments(lo);
        let s_hi = m.segments(hi);
        prop_assert!(s_lo <= 16 && s_hi <= 16);
        prop_assert!(s_lo <= s_hi, "segments({lo}) = {s_lo} > segments({hi}) = {s_hi}");
    }

    #[test]
    fn calibration_is_total_and_deterministic(raw in 0u16..=1023) {
        let curves = [
            FuelCurve::Direct(DirectCurve::default()),
            FuelCurve::TwoStage(TwoStageCurve::default()),
        ];
        for curve in curves {
            let g1 = curve.gallons(f32::from(raw));
            let g2 = curve.gallons(f32::from(raw));
            prop_assert!(g1.is_finite());
            prop_assert_eq!(g1, g2);
            if let Some(ohms) = curve.ohms(f32::from(raw)) {
                prop_assert!(ohms.is_finite());
            }
        }
    }

    #[test]
    fn filter_average_stays_within_pushed_bounds(
        values in proptest::collection::vec(0u16..=1023, 1..300),
        capacity in 1usize..120,
    ) {
        let mut f = SampleFilter::new(capacity);
        for &v in &values {
            f.push(v);
        }
        // Only the most recent min(len, capacity) readings matter.
        let tail_len = values.len().min(capacity);
        let tail = &values[values.len() - tail_len..];
        let lo = f32::from(*tail.iter().min().unwrap());
        let hi = f32::from(*tail.iter().max().unwrap());
        let avg = f.average();
        prop_assert!(avg >= lo - 1e-3 && avg <= hi + 1e-3, "avg {avg} outside [{lo}, {hi}]");
        prop_assert_eq!(f.len(), tail_len);
    }

    #[test]
    fn filter_eviction_matches_exact_tail_mean(
        values in proptest::collection::vec(0u16..=1023, 1..50),
        capacity in 1usize..10,
    ) {
        let mut f = SampleFilter::new(capacity);
        for &v in &values {
            f.push(v);
        }
        let tail_len = values.len().min(capacity);
        let tail = &values[values.len() - tail_len..];
        let expected: f32 =
            tail.iter().map(|&v| f32::from(v)).sum::<f32>() / tail_len as f32;
        prop_assert!((f.average() - expected).abs() < 1e-2);
    }

    #[test]
    fn scheduler_never_fires_twice_without_a_qualifying_delta(
        deltas in proptest::collection::vec(0u32..2_000, 1..200),
    ) {
        let cfg = SchedulerCfg::default();
        let mut s = SampleScheduler::new(cfg, 0);
        let mut now: u32 = 0;
        let mut last_due: Option<u32> = None;
        for d in deltas {
            now = now.saturating_add(d);
            if s.poll(now) {
                if let Some(prev) = last_due {
                    // Fastest legal cadence is the startup interval.
                    prop_assert!(
                        now - prev >= cfg.startup_interval_ms,
                        "due at {now} only {} ms after {prev}",
                        now - prev
                    );
                }
                last_due = Some(now);
            }
        }
    }
}
