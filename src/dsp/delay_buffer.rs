//! # Delay Buffer (Multi-Channel Ring Buffer)
//!
//! One contiguous block of `channels × capacity` samples, laid out channel
//! after channel, with a single write cursor shared by every channel.
//!
//! ```text
//!            cursor
//!              ▼
//! ch 0: [ . . . W . . . . . . ]   ◄── capacity frames
//! ch 1: [ . . . W . . . . . . ]
//! ```
//!
//! Per frame the caller writes each channel's input at the cursor, reads
//! back whatever it needs `delay_frames` behind the cursor, and then calls
//! [`advance()`](DelayBuffer::advance) exactly once. Sharing the cursor keeps
//! the two stereo legs sample-aligned, which is the whole point of a Haas
//! delay: the *only* difference between them is the offset we choose.
//!
//! ## Resizing
//!
//! Growing the buffer throws away its history. The new storage is zeroed
//! and the cursor rewinds to 0, so a resize can click. That is acceptable
//! at configuration boundaries (stream start, sample-rate change, a host
//! suddenly sending bigger blocks) and nowhere else.

use nih_plug::prelude::*;

use crate::error::HaasError;

/// A ring buffer holding the recent history of every channel.
///
/// Starts empty (capacity 0). Nothing may be written or read until
/// [`ensure_capacity()`](Self::ensure_capacity) has succeeded once, which
/// establishes `capacity > 0`.
#[derive(Debug, Default)]
pub struct DelayBuffer {
    /// `channels × capacity` samples, channel-major.
    data: Vec<f32>,

    channels: usize,

    /// Frames per channel (`N`).
    capacity: usize,

    /// Write position shared by all channels, always `< capacity`.
    cursor: usize,
}

impl DelayBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the buffer holds `channels` channels of at least
    /// `min_frames` frames each.
    ///
    /// Returns `Ok(true)` if storage was reallocated (history cleared,
    /// cursor rewound), `Ok(false)` if the current storage already fits.
    ///
    /// On error the previous storage is left intact; the caller decides
    /// whether it can still be used (the engine treats it as fatal).
    pub fn ensure_capacity(&mut self, channels: usize, min_frames: usize) -> Result<bool, HaasError> {
        if channels == 0 {
            return Err(HaasError::InvalidConfig("delay buffer needs at least one channel"));
        }

        // Modular indexing divides by the capacity, so it can never be 0.
        let min_frames = min_frames.max(1);
        if channels == self.channels && self.capacity >= min_frames {
            return Ok(false);
        }

        let total = channels
            .checked_mul(min_frames)
            .ok_or(HaasError::InvalidConfig("delay buffer size overflows usize"))?;

        // `try_reserve_exact` turns an out-of-memory condition into a value
        // instead of aborting the host process.
        let mut data = Vec::new();
        data.try_reserve_exact(total)
            .map_err(|source| HaasError::Allocation {
                channels,
                frames: min_frames,
                source,
            })?;
        data.resize(total, 0.0);

        self.data = data;
        self.channels = channels;
        self.capacity = min_frames;
        self.cursor = 0;

        Ok(true)
    }

    /// Store `sample` for `channel` at the cursor. Does not advance.
    #[inline]
    pub fn write(&mut self, channel: usize, sample: f32) {
        nih_debug_assert!(channel < self.channels);
        let index = self.slot(channel, self.cursor);
        self.data[index] = sample;
    }

    /// Read the sample written `delay_frames` frames before the cursor.
    ///
    /// `delay_frames == 0` yields the sample written at the cursor in the
    /// current frame. The caller clamps `delay_frames` to `capacity - 1`;
    /// this only does the modular indexing:
    ///
    /// ```text
    /// read_pos = (cursor + capacity - delay_frames) % capacity
    /// ```
    #[inline]
    pub fn read_delayed(&self, channel: usize, delay_frames: usize) -> f32 {
        nih_debug_assert!(channel < self.channels);
        nih_debug_assert!(delay_frames < self.capacity);
        let read_pos = (self.cursor + self.capacity - delay_frames) % self.capacity;
        self.data[self.slot(channel, read_pos)]
    }

    /// Move the cursor one frame forward, wrapping at `capacity`.
    ///
    /// Call once per frame, after every channel has been written and read.
    #[inline]
    pub fn advance(&mut self) {
        nih_debug_assert!(self.capacity > 0);
        self.cursor += 1;
        if self.cursor >= self.capacity {
            self.cursor = 0;
        }
    }

    /// Silence the whole history and rewind the cursor, keeping the storage.
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.cursor = 0;
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    fn slot(&self, channel: usize, frame: usize) -> usize {
        channel * self.capacity + frame
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────
