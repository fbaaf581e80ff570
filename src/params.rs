//! # Plugin Parameters
//!
//! The host-facing value store. The host (UI or automation) writes these
//! atomically from its own threads; the audio thread reads them once per
//! block through [`HaasParams::current_snapshot()`] and never again until
//! the next block, so routing and delay length stay fixed within a block.
//!
//! ## Why the delay controls are stored normalized
//!
//! nih-plug's built-in ranges can't express the symmetric power-law curve
//! the delay controls use. So both `offset` and `amount` are plain
//! `0.0..=1.0` values, and [`ParameterCurve`] converts them to milliseconds.
//! The same curve drives the value-to-string and string-to-value
//! formatters, so the host still displays and accepts milliseconds.
//!
//! No smoothing is applied: a Haas delay jumps between integer frame
//! offsets, and the snapshot is taken once per block.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::curve::{ParameterCurve, CURVE_SKEW};
use crate::dsp::router::{DelayParameter, DelaySide, RoutingMode};
use crate::engine::MAX_DELAY_MS;

/// `offset` control: -250 ms (left late) ..= +250 ms (right late).
pub const OFFSET_CURVE: ParameterCurve = ParameterCurve::bipolar(MAX_DELAY_MS, CURVE_SKEW);

/// `amount` control: 0 ..= 250 ms on the side picked by `side`.
pub const AMOUNT_CURVE: ParameterCurve = ParameterCurve::unipolar(MAX_DELAY_MS, CURVE_SKEW);

#[derive(Params)]
pub struct HaasParams {
    /// **Mode**: which routing strategy is active.
    ///
    /// - *Signed Offset* uses `offset` only; its sign picks the late side.
    /// - *Side Select* uses `amount` and `side`.
    #[id = "mode"]
    pub mode: EnumParam<RoutingMode>,

    /// **Offset**: bipolar delay. Negative delays the left channel,
    /// positive the right, dead centre bypasses.
    #[id = "delay"]
    pub offset: FloatParam,

    /// **Amount**: delay length for side-select mode.
    #[id = "amount"]
    pub amount: FloatParam,

    /// **Side**: the channel that is delayed in side-select mode.
    #[id = "side"]
    pub side: EnumParam<DelaySide>,
}

impl Default for HaasParams {
    fn default() -> Self {
        Self {
            mode: EnumParam::new("Mode", RoutingMode::SignedOffset),

            offset: curve_param("Delay", OFFSET_CURVE, 0.0),

            amount: curve_param("Amount", AMOUNT_CURVE, 1.0),

            side: EnumParam::new("Side", DelaySide::Left),
        }
    }
}

impl HaasParams {
    /// Read every delay-related parameter once and build this block's
    /// immutable snapshot.
    pub fn current_snapshot(&self) -> DelayParameter {
        snapshot(
            self.mode.value(),
            self.offset.value(),
            self.amount.value(),
            self.side.value(),
        )
    }
}

/// Turn raw normalized control values into a [`DelayParameter`].
fn snapshot(mode: RoutingMode, offset: f32, amount: f32, side: DelaySide) -> DelayParameter {
    match mode {
        RoutingMode::SignedOffset => DelayParameter::Signed {
            ms: OFFSET_CURVE.to_milliseconds(offset),
        },
        RoutingMode::SideSelect => DelayParameter::Sided {
            magnitude_ms: AMOUNT_CURVE.to_milliseconds(amount),
            side,
        },
    }
}

/// A normalized `0..=1` float parameter that displays and parses
/// milliseconds through `curve`. `default_ms` is converted to its
/// normalized position.
fn curve_param(name: &'static str, curve: ParameterCurve, default_ms: f32) -> FloatParam {
    FloatParam::new(
        name,
        curve.to_normalized(default_ms),
        FloatRange::Linear { min: 0.0, max: 1.0 },
    )
    .with_unit(" ms")
    .with_value_to_string(Arc::new(move |value: f32| {
        format!("{:.2}", curve.to_milliseconds(value))
    }))
    .with_string_to_value(Arc::new(move |string: &str| {
        parse_milliseconds(string).map(|ms| curve.to_normalized(ms))
    }))
}

/// Accepts `"12.5"`, `"12.5ms"`, `" -3 ms "`.
fn parse_milliseconds(string: &str) -> Option<f32> {
    string
        .trim()
        .trim_end_matches("ms")
        .trim()
        .parse::<f32>()
        .ok()
        .filter(|ms| ms.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_bypass() {
        let params = HaasParams::default();
        let snap = params.current_snapshot();
        match snap {
            DelayParameter::Signed { ms } => assert!(ms.abs() < 1e-4, "Expected 0 ms, got {ms}"),
            other => panic!("Expected a signed snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_signed_mode_uses_offset() {
        let snap = snapshot(RoutingMode::SignedOffset, 1.0, 0.0, DelaySide::Right);
        assert_eq!(snap, DelayParameter::Signed { ms: 250.0 });

        let snap = snapshot(RoutingMode::SignedOffset, 0.0, 1.0, DelaySide::Right);
        assert_eq!(snap, DelayParameter::Signed { ms: -250.0 });
    }

    #[test]
    fn test_snapshot_side_mode_uses_amount_and_side() {
        let snap = snapshot(RoutingMode::SideSelect, 0.0, 1.0, DelaySide::Right);
        assert_eq!(
            snap,
            DelayParameter::Sided {
                magnitude_ms: 250.0,
                side: DelaySide::Right
            }
        );
    }

    #[test]
    fn test_display_in_milliseconds() {
        let params = HaasParams::default();
        assert_eq!(params.offset.normalized_value_to_string(1.0, false), "250.00");
        assert_eq!(params.offset.normalized_value_to_string(0.0, true), "-250.00 ms");
        assert_eq!(params.amount.normalized_value_to_string(0.0, false), "0.00");
    }

    #[test]
    fn test_parse_milliseconds_to_normalized() {
        let params = HaasParams::default();
        let normalized = params
            .offset
            .string_to_normalized_value("-250 ms")
            .expect("should parse");
        assert!(normalized.abs() < 1e-6);

        let normalized = params
            .amount
            .string_to_normalized_value("40")
            .expect("should parse");
        let back = AMOUNT_CURVE.to_milliseconds(normalized);
        assert!((back - 40.0).abs() < 0.025, "Expected 40 ms, got {back}");

        assert!(params.offset.string_to_normalized_value("abc").is_none());
    }

    #[test]
    fn test_parse_milliseconds_formats() {
        assert_eq!(parse_milliseconds("12.5"), Some(12.5));
        assert_eq!(parse_milliseconds("12.5ms"), Some(12.5));
        assert_eq!(parse_milliseconds(" -3 ms "), Some(-3.0));
        assert_eq!(parse_milliseconds("inf"), None);
        assert_eq!(parse_milliseconds(""), None);
    }
}
