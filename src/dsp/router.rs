//! # Channel Routing
//!
//! Decides, once per block, which channel hears the delayed (wet) signal
//! and which stays dry. Two strategies are supported:
//!
//! - **Side select**: a magnitude plus an explicit [`DelaySide`]. The chosen
//!   side is always the wet one, even at 0 ms (where wet equals dry anyway
//!   because the read lands on the sample just written).
//! - **Signed offset**: one signed value. Negative delays the left channel,
//!   positive delays the right, exactly zero bypasses both. Crossing zero
//!   flips the wet side instantly; there is no crossfade.
//!
//! The routing is a pure function of the [`DelayParameter`] snapshot, so a
//! block never changes routing halfway through.

use nih_plug::prelude::*;

/// Which stereo leg a side-select delay applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum DelaySide {
    #[name = "Left"]
    Left,
    #[name = "Right"]
    Right,
}

impl DelaySide {
    pub fn channel(self) -> usize {
        match self {
            DelaySide::Left => 0,
            DelaySide::Right => 1,
        }
    }
}

/// Which of the two routing strategies the plugin runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum RoutingMode {
    /// Magnitude control plus an explicit side switch.
    #[name = "Side Select"]
    SideSelect,
    /// One bipolar control; its sign picks the side.
    #[name = "Signed Offset"]
    SignedOffset,
}

/// One block's worth of delay settings, read once from the parameter store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DelayParameter {
    /// Signed milliseconds; the sign selects the delayed channel.
    Signed { ms: f32 },
    /// Unsigned milliseconds applied to an explicit side.
    Sided { magnitude_ms: f32, side: DelaySide },
}

impl DelayParameter {
    /// The same setting with its magnitude clamped to `max_ms`.
    ///
    /// NaN collapses to 0 ms so garbage automation degrades to a bypass.
    pub fn clamped(self, max_ms: f32) -> Self {
        let limit = |ms: f32| if ms.is_nan() { 0.0 } else { ms.clamp(-max_ms, max_ms) };
        match self {
            DelayParameter::Signed { ms } => DelayParameter::Signed { ms: limit(ms) },
            DelayParameter::Sided { magnitude_ms, side } => DelayParameter::Sided {
                magnitude_ms: limit(magnitude_ms).abs(),
                side,
            },
        }
    }

    /// How far the wet channel lags, regardless of side.
    pub fn magnitude_ms(&self) -> f32 {
        match *self {
            DelayParameter::Signed { ms } => ms.abs(),
            DelayParameter::Sided { magnitude_ms, .. } => magnitude_ms.abs(),
        }
    }

    /// Resolve the routing for this snapshot.
    pub fn routing(&self) -> RoutingPolicy {
        match *self {
            DelayParameter::Sided { side, .. } => match side {
                DelaySide::Left => RoutingPolicy::DelayLeftOnly,
                DelaySide::Right => RoutingPolicy::DelayRightOnly,
            },
            DelayParameter::Signed { ms } => {
                if ms < 0.0 {
                    RoutingPolicy::DelayLeftOnly
                } else if ms > 0.0 {
                    RoutingPolicy::DelayRightOnly
                } else {
                    // Exactly zero (or NaN): leave both legs alone.
                    RoutingPolicy::BypassAll
                }
            }
        }
    }
}

/// The per-block routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingPolicy {
    BypassAll,
    DelayLeftOnly,
    DelayRightOnly,
}

impl RoutingPolicy {
    /// Whether `channel` gets the delayed signal. Channels past the stereo
    /// pair are always dry.
    #[inline]
    pub fn is_wet(self, channel: usize) -> bool {
        match self {
            RoutingPolicy::BypassAll => false,
            RoutingPolicy::DelayLeftOnly => channel == DelaySide::Left.channel(),
            RoutingPolicy::DelayRightOnly => channel == DelaySide::Right.channel(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn wet_channels(param: DelayParameter) -> [bool; 2] {
        let policy = param.routing();
        [policy.is_wet(0), policy.is_wet(1)]
    }

    #[test]
    fn test_signed_negative_delays_left() {
        assert_eq!(wet_channels(DelayParameter::Signed { ms: -12.0 }), [true, false]);
    }

    #[test]
    fn test_signed_positive_delays_right() {
        assert_eq!(wet_channels(DelayParameter::Signed { ms: 0.01 }), [false, true]);
    }

    #[test]
    fn test_signed_zero_bypasses_both() {
        assert_eq!(
            DelayParameter::Signed { ms: 0.0 }.routing(),
            RoutingPolicy::BypassAll
        );
        assert_eq!(wet_channels(DelayParameter::Signed { ms: -0.0 }), [false, false]);
    }

    #[test]
    fn test_sided_ignores_magnitude() {
        for magnitude_ms in [0.0, 5.0, 250.0] {
            let left = DelayParameter::Sided {
                magnitude_ms,
                side: DelaySide::Left,
            };
            let right = DelayParameter::Sided {
                magnitude_ms,
                side: DelaySide::Right,
            };
            assert_eq!(wet_channels(left), [true, false]);
            assert_eq!(wet_channels(right), [false, true]);
        }
    }

    #[test]
    fn test_extra_channels_stay_dry() {
        for policy in [
            RoutingPolicy::BypassAll,
            RoutingPolicy::DelayLeftOnly,
            RoutingPolicy::DelayRightOnly,
        ] {
            assert!(!policy.is_wet(2));
            assert!(!policy.is_wet(7));
        }
    }

    #[test]
    fn test_clamping() {
        let signed = DelayParameter::Signed { ms: -900.0 }.clamped(250.0);
        assert_eq!(signed, DelayParameter::Signed { ms: -250.0 });
        assert_eq!(signed.routing(), RoutingPolicy::DelayLeftOnly);

        let sided = DelayParameter::Sided {
            magnitude_ms: 400.0,
            side: DelaySide::Right,
        }
        .clamped(250.0);
        assert_eq!(sided.magnitude_ms(), 250.0);

        let nan = DelayParameter::Signed { ms: f32::NAN }.clamped(250.0);
        assert_eq!(nan, DelayParameter::Signed { ms: 0.0 });
        assert_eq!(nan.routing(), RoutingPolicy::BypassAll);
    }
}
