//! # Haas Engine
//!
//! The real-time part of the plugin: one [`DelayBuffer`] plus the per-block
//! loop that writes every channel into it and picks wet or dry output per
//! channel.
//!
//! ## Lifecycle
//!
//! ```text
//! Idle ──configure()──► Ready ──process_block()──► Ready ...
//!            │                        │
//!            ▼                        ▼ (block larger than expected,
//!         Failed                         reallocation fails)
//!                                  Failed
//! ```
//!
//! `Configuring` and `Processing` only exist for the duration of the
//! respective calls, so they are not stored. While `Idle` or `Failed` the
//! engine leaves blocks untouched. A fresh `configure()` (a new stream) is
//! the only way out of `Failed`.
//!
//! ## Per-frame order
//!
//! For frame `i`, every channel's input is written at the shared cursor
//! before that channel's delayed sample is read, and the cursor advances
//! once after all channels. A delay of 0 frames therefore reads back the
//! input itself.

use nih_plug::prelude::*;

use crate::dsp::delay_buffer::DelayBuffer;
use crate::dsp::router::DelayParameter;
use crate::error::HaasError;

/// Longest delay either control can reach.
pub const MAX_DELAY_MS: f32 = 250.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Not configured yet.
    Idle,
    /// Buffer sized for the current stream; blocks are processed.
    Ready,
    /// Configuration failed; blocks pass through untouched.
    Failed,
}

pub struct HaasEngine {
    buffer: DelayBuffer,
    sample_rate: f32,
    max_delay_ms: f32,
    /// Largest block seen or announced for this stream, in frames.
    max_block_size: usize,
    state: EngineState,
}

impl Default for HaasEngine {
    fn default() -> Self {
        Self::new(MAX_DELAY_MS)
    }
}

impl HaasEngine {
    pub fn new(max_delay_ms: f32) -> Self {
        Self {
            buffer: DelayBuffer::new(),
            // Placeholder until the host tells us the real rate.
            sample_rate: 44100.0,
            max_delay_ms,
            max_block_size: 0,
            state: EngineState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> EngineState {
        self.state
    }

    #[cfg(test)]
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Set up for a new stream (or a changed sample rate / channel count).
    ///
    /// Sizes the buffer for `max_delay_frames + max_block_size` frames and
    /// always starts the new stream from silence with the cursor at 0, even
    /// when the existing storage is big enough. History recorded at another
    /// sample rate or channel layout is meaningless to the new stream.
    pub fn configure(
        &mut self,
        sample_rate: f32,
        channels: usize,
        max_block_size: usize,
    ) -> Result<(), HaasError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            self.state = EngineState::Failed;
            return Err(HaasError::InvalidConfig("sample rate must be positive and finite"));
        }

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;

        nih_log!(
            "Configuring Haas engine: {sample_rate} Hz, {channels} channel(s), \
             max block {max_block_size}, max delay {} ms",
            self.max_delay_ms
        );

        self.resize_buffer(channels)?;
        self.buffer.clear();
        Ok(())
    }

    /// Clear all delay history without reallocating.
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// `floor(max_delay_ms / 1000 * sample_rate)`
    pub fn max_delay_frames(&self) -> usize {
        (self.max_delay_ms / 1000.0 * self.sample_rate).floor() as usize
    }

    /// `round(|ms| * sample_rate / 1000)`, clamped to what the buffer can
    /// reach (`capacity - 1`).
    pub fn delay_frames(&self, param: &DelayParameter) -> usize {
        let magnitude = param.clamped(self.max_delay_ms).magnitude_ms();
        let frames = (magnitude * self.sample_rate / 1000.0).round() as usize;
        frames.min(self.buffer.capacity().saturating_sub(1))
    }

    /// Process one host block in place.
    ///
    /// `channels` holds one slice per channel, all the same length (the
    /// shape of `Buffer::as_slice()`). `param` is this block's snapshot and
    /// is not re-read. Returns the delay that was applied, in frames.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]], param: DelayParameter) -> usize {
        if self.state != EngineState::Ready {
            return 0;
        }

        let num_channels = channels.len();
        let num_frames = channels.first().map_or(0, |samples| samples.len());
        if num_channels == 0 || num_frames == 0 {
            return 0;
        }

        // The host may send a bigger block (or another channel count) than
        // it announced. Grow before touching any samples.
        if self.buffer.channels() != num_channels
            || self.buffer.capacity() < self.max_delay_frames() + num_frames
        {
            self.max_block_size = self.max_block_size.max(num_frames);
            let resized = nih_plug::util::permit_alloc(|| {
                nih_warn!(
                    "Unexpected block of {num_frames} frames x {num_channels} channel(s); \
                     resizing delay buffer"
                );
                self.resize_buffer(num_channels)
            });
            if resized.is_err() {
                return 0;
            }
        }

        // Routing and delay length are fixed for the whole block. Both
        // come from the same clamped snapshot, so a value out of range
        // (automation overshoot, a typed-in 900 ms) degrades to the
        // maximum instead of reading past the ring.
        let param = param.clamped(self.max_delay_ms);
        let routing = param.routing();
        let delay_frames = self.delay_frames(&param);

        // Write before read: with `delay_frames == 0` the wet leg reads
        // back its own input, so a zero offset is transparent even on the
        // routed side.

        for frame in 0..num_frames {
            for (channel, samples) in channels.iter_mut().enumerate() {
                let input = samples[frame];
                self.buffer.write(channel, input);

                if routing.is_wet(channel) {
                    samples[frame] = self.buffer.read_delayed(channel, delay_frames);
                }
            }
            self.buffer.advance();
        }

        delay_frames
    }

    fn resize_buffer(&mut self, channels: usize) -> Result<(), HaasError> {
        let min_frames = self.max_delay_frames() + self.max_block_size;

        match self.buffer.ensure_capacity(channels, min_frames) {
            Ok(reallocated) => {
                if reallocated {
                    nih_log!(
                        "Delay buffer reallocated: {channels} channel(s) x {} frames",
                        self.buffer.capacity()
                    );
                }
                nih_debug_assert!(self.buffer.capacity() > 0);
                self.state = EngineState::Ready;
                Ok(())
            }
            Err(err) => {
                nih_error!("Haas engine failed to configure: {err}");
                self.state = EngineState::Failed;
                Err(err)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
