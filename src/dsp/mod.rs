//! # DSP Primitives
//!
//! - **`delay_buffer`**: the multi-channel ring buffer holding recent history.
//! - **`curve`**: the skewed normalized ↔ milliseconds mapping used by the
//!   delay controls.
//! - **`router`**: decides which stereo leg is delayed for a block.

pub mod curve;
pub mod delay_buffer;
pub mod router;
