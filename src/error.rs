//! # Errors
//!
//! Everything that can go wrong while (re)configuring the delay engine.
//! The per-sample path has no failure modes: out-of-range parameter values
//! are clamped, and index arithmetic relies on invariants established here.

use std::collections::TryReserveError;

use thiserror::Error;

/// A failure while sizing or configuring the delay engine.
///
/// Any of these is fatal for the current stream: the engine moves to its
/// `Failed` state and the host sees a failed `initialize()`.
#[derive(Debug, Error)]
pub enum HaasError {
    /// The ring buffer could not be grown to the requested size.
    #[error("failed to allocate delay buffer for {channels} channel(s) x {frames} frames")]
    Allocation {
        channels: usize,
        frames: usize,
        #[source]
        source: TryReserveError,
    },

    /// The host handed us a stream configuration we cannot run with.
    #[error("invalid stream configuration: {0}")]
    InvalidConfig(&'static str),
}
