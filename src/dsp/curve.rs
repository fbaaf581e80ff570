//! # Parameter Curve
//!
//! Maps a normalized control value (what the host automates, `0.0..=1.0`)
//! to a delay in milliseconds and back, using a symmetric power law around
//! the middle of the range:
//!
//! ```text
//! n  = (normalized - 0.5) * 2          // -1 ..= 1
//! ms = mid + sign(n) * |n|^skew * half
//! ```
//!
//! where `mid` and `half` are the centre and half-width of the millisecond
//! range. With `skew > 1` the curve is flat around the centre, so the first
//! half of the knob travel away from the middle covers only a small slice of
//! the range. For the bipolar `-250..=250` control that puts the fine
//! resolution around 0 ms, where the Haas illusion is most sensitive.
//! `skew < 1` gives the opposite shape.
//!
//! The inverse uses `|n|^(1 / skew)`, so the two directions round-trip.

/// Shape exponent shared by the plugin's delay controls.
pub const CURVE_SKEW: f32 = 1.6;

/// A normalized ↔ milliseconds mapping over `[min_ms, max_ms]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterCurve {
    min_ms: f32,
    max_ms: f32,
    skew: f32,
}

impl ParameterCurve {
    /// `skew` must be positive and `min_ms < max_ms`.
    pub const fn new(min_ms: f32, max_ms: f32, skew: f32) -> Self {
        Self {
            min_ms,
            max_ms,
            skew,
        }
    }

    /// A zero-centred range, `-max_ms..=max_ms`.
    pub const fn bipolar(max_ms: f32, skew: f32) -> Self {
        Self::new(-max_ms, max_ms, skew)
    }

    /// A positive-only range, `0..=max_ms`.
    pub const fn unipolar(max_ms: f32, skew: f32) -> Self {
        Self::new(0.0, max_ms, skew)
    }

    #[cfg(test)]
    pub fn min_ms(&self) -> f32 {
        self.min_ms
    }

    #[cfg(test)]
    pub fn max_ms(&self) -> f32 {
        self.max_ms
    }

    /// Normalized control value to milliseconds. Input is clamped to `0..=1`.
    pub fn to_milliseconds(&self, normalized: f32) -> f32 {
        let n = (normalized.clamp(0.0, 1.0) - 0.5) * 2.0;
        let warped = n.abs().powf(self.skew).copysign(n);
        (self.mid() + warped * self.half()).clamp(self.min_ms, self.max_ms)
    }

    /// Milliseconds to normalized control value. Input is clamped to the range.
    pub fn to_normalized(&self, ms: f32) -> f32 {
        let n = (ms.clamp(self.min_ms, self.max_ms) - self.mid()) / self.half();
        let unwarped = n.abs().powf(self.skew.recip()).copysign(n);
        (unwarped * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    fn mid(&self) -> f32 {
        (self.min_ms + self.max_ms) * 0.5
    }

    fn half(&self) -> f32 {
        (self.max_ms - self.min_ms) * 0.5
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const BIPOLAR: ParameterCurve = ParameterCurve::bipolar(250.0, CURVE_SKEW);
    const UNIPOLAR: ParameterCurve = ParameterCurve::unipolar(250.0, CURVE_SKEW);

    /// Tolerance is 1e-4 relative to `scale` (the full range being tested).
    fn assert_close(a: f32, b: f32, scale: f32, what: &str) {
        let tolerance = 1e-4 * scale.max(1.0);
        assert!((a - b).abs() <= tolerance, "{what}: {a} vs {b}");
    }

    #[test]
    fn test_endpoints_and_centre() {
        assert_close(BIPOLAR.to_milliseconds(0.0), -250.0, 250.0, "bipolar min");
        assert_close(BIPOLAR.to_milliseconds(0.5), 0.0, 250.0, "bipolar centre");
        assert_close(BIPOLAR.to_milliseconds(1.0), 250.0, 250.0, "bipolar max");

        assert_close(UNIPOLAR.to_milliseconds(0.0), 0.0, 250.0, "unipolar min");
        assert_close(UNIPOLAR.to_milliseconds(0.5), 125.0, 250.0, "unipolar centre");
        assert_close(UNIPOLAR.to_milliseconds(1.0), 250.0, 250.0, "unipolar max");
    }

    #[test]
    fn test_bipolar_is_odd_around_centre() {
        for i in 0..=50 {
            let x = i as f32 / 100.0;
            let left = BIPOLAR.to_milliseconds(0.5 - x);
            let right = BIPOLAR.to_milliseconds(0.5 + x);
            assert_close(left, -right, 250.0, "symmetry");
        }
    }

    /// A skew above 1 compresses the region around the centre: a quarter of
    /// the travel from the middle covers less than a quarter of the range.
    #[test]
    fn test_skew_concentrates_resolution_at_centre() {
        let quarter = BIPOLAR.to_milliseconds(0.75);
        assert!(quarter > 0.0 && quarter < 125.0, "Expected < 125 ms, got {quarter}");

        let linear = ParameterCurve::bipolar(250.0, 1.0);
        assert_close(linear.to_milliseconds(0.75), 125.0, 250.0, "linear quarter");
    }

    #[test]
    fn test_monotonic() {
        let mut prev = BIPOLAR.to_milliseconds(0.0);
        for i in 1..=1000 {
            let ms = BIPOLAR.to_milliseconds(i as f32 / 1000.0);
            assert!(ms >= prev, "Curve must be monotonic at step {i}");
            prev = ms;
        }
    }

    #[test]
    fn test_round_trip_normalized_first() {
        for curve in [BIPOLAR, UNIPOLAR] {
            for i in 0..=1000 {
                let x = i as f32 / 1000.0;
                let back = curve.to_normalized(curve.to_milliseconds(x));
                assert_close(back, x, 1.0, "normalized round trip");
            }
        }
    }

    #[test]
    fn test_round_trip_milliseconds_first() {
        for curve in [BIPOLAR, UNIPOLAR] {
            let span = curve.max_ms() - curve.min_ms();
            for i in 0..=1000 {
                let ms = curve.min_ms() + span * i as f32 / 1000.0;
                let back = curve.to_milliseconds(curve.to_normalized(ms));
                assert_close(back, ms, span, "milliseconds round trip");
            }
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(BIPOLAR.to_milliseconds(-3.0), -250.0);
        assert_eq!(BIPOLAR.to_milliseconds(7.0), 250.0);
        assert_eq!(UNIPOLAR.to_normalized(-20.0), 0.0);
        assert_eq!(UNIPOLAR.to_normalized(900.0), 1.0);
    }
}
