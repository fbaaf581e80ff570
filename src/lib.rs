//! # Haas Delay — A Stereo-Widening AU/VST3/CLAP Plugin
//!
//! Delays one leg of a stereo signal by up to 250 ms. With short offsets
//! (a few to a few tens of milliseconds) the ear fuses both legs into one
//! wider source instead of hearing an echo: the Haas (precedence) effect.
//!
//! ## Signal Flow
//!
//! ```text
//!                    ┌───────────────────────┐
//! Left  in ──┬──────►│                       │──(wet?)──► Left  out
//!            │       │  DelayBuffer (shared  │
//! Right in ──┼──┬───►│  cursor, one ring per │──(wet?)──► Right out
//!            │  │    │  channel)             │
//!            │  │    └───────────────────────┘
//!            │  └──────────────(dry)──────────────────► Right out
//!            └─────────────────(dry)──────────────────► Left  out
//! ```
//!
//! Per block the parameters are snapshotted once, the snapshot decides
//! which leg is wet ([`dsp::router`]), and [`engine::HaasEngine`] runs the
//! per-frame write/read/advance loop.

mod dsp;
mod engine;
mod error;
mod params;

use std::num::NonZeroU32;
use std::sync::Arc;

use engine::HaasEngine;
use nih_plug::prelude::*;
use params::HaasParams;

/// The plugin: the host-facing parameter store plus the audio-thread engine.
///
/// `params` is shared with the host through an `Arc` and read from any
/// thread. `engine` belongs to the audio thread alone and is only touched
/// from `initialize()`, `reset()` and `process()`.
struct HaasDelay {
    params: Arc<HaasParams>,
    engine: HaasEngine,
}

impl Default for HaasDelay {
    fn default() -> Self {
        Self {
            params: Arc::new(HaasParams::default()),
            // Idle until initialize() tells us the sample rate and layout.
            engine: HaasEngine::default(),
        }
    }
}

impl Plugin for HaasDelay {
    const NAME: &'static str = "Haas Delay";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "steve.loveless@gmail.com";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Input and output must match: stereo first, mono as a fallback. Any
    // other layout never reaches the engine.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Parameters are read once per block, so there is nothing to gain from
    // the host splitting blocks at automation points.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Called when the plugin is first loaded, or when the audio
    /// configuration changes (sample rate, channel count, block size).
    ///
    /// # Why size the buffer here?
    ///
    /// The ring has to hold the longest possible delay *plus* one full
    /// block, and both depend on numbers only the host knows:
    ///
    /// ```text
    /// capacity = floor(0.250 s * sample_rate) + max_buffer_size
    ///   48000 Hz, 512-sample blocks → 12000 + 512 = 12512 frames
    /// ```
    ///
    /// Allocating now means `process()` never has to, as long as the host
    /// keeps its promise about the maximum block size.
    ///
    /// # Return value
    ///
    /// `false` tells the host this configuration can't run. That is how an
    /// allocation failure surfaces: the plugin refuses to start rather than
    /// process audio without a valid buffer.
    fn initialize(
        &mut self,
        audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        // Only the layouts listed in AUDIO_IO_LAYOUTS get this far, so this
        // is either 1 or 2.
        let num_channels = audio_io_layout
            .main_input_channels
            .map(|c| c.get() as usize)
            .unwrap_or(2);

        // Configuring always starts from silence with the cursor at 0, so
        // audio recorded at a previous sample rate never leaks into this
        // stream.

        match self.engine.configure(
            buffer_config.sample_rate,
            num_channels,
            buffer_config.max_buffer_size as usize,
        ) {
            Ok(()) => true,
            Err(err) => {
                nih_error!("Initialization failed: {err}");
                false
            }
        }
    }

    /// Drop the delay history when playback stops so old audio doesn't
    /// reappear on the late leg when it restarts.
    fn reset(&mut self) {
        self.engine.reset();
    }

    /// The audio callback. The host hands us one block of samples per
    /// channel and we rewrite it in place.
    ///
    /// # Why snapshot the parameters once per block?
    ///
    /// The host can move the delay control from another thread at any
    /// moment. If we re-read it every sample, one block could start with
    /// the right leg late and end with the left leg late, and the jump in
    /// read position would land mid-block as a click. Reading once gives
    /// every frame in the block the same routing and the same offset.
    ///
    /// # The Haas algorithm, per frame
    ///
    /// 1. **Write** every channel's input into the ring at the cursor
    /// 2. **Read** the sample `delay_frames` behind the cursor
    /// 3. **Route**: the wet leg outputs the delayed sample, the other the input
    /// 4. **Advance** the shared cursor once
    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        // One atomic read per parameter, then never again this block.
        let snapshot = self.params.current_snapshot();
        let delay_frames = self.engine.process_block(buffer.as_slice(), snapshot);

        // Tell the host how long the effect keeps sounding after the input
        // goes silent. The late leg is still playing back the last
        // `delay_frames` of input, so without this a region ending would
        // cut the delayed side short. With no delay there is no tail.
        if delay_frames > 0 {
            ProcessStatus::Tail(delay_frames as u32)
        } else {
            ProcessStatus::Normal
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Plugin format trait implementations
// ─────────────────────────────────────────────────────────────────────
//
// These tell nih-plug how to describe the plugin to CLAP and VST3 hosts.
// The categories put it next to other delay and stereo-imaging effects
// in the host's plugin browser.

impl ClapPlugin for HaasDelay {
    const CLAP_ID: &'static str = "com.loveless-audio.haas-delay";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("Stereo widening by delaying one channel (Haas effect)");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for HaasDelay {
    // 16 ASCII bytes, unique among all VST3 plugins. `*b"..."` turns the
    // string literal into a `[u8; 16]`.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssHaasDly_v01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] = &[
        Vst3SubCategory::Fx,
        Vst3SubCategory::Delay,
        Vst3SubCategory::Spatial,
    ];
}

// ─────────────────────────────────────────────────────────────────────
// Export macros
// ─────────────────────────────────────────────────────────────────────
//
// These generate the C entry points a host looks for when it loads the
// library: `clap_entry` for CLAP and `GetPluginFactory` for VST3.

nih_export_clap!(HaasDelay);
nih_export_vst3!(HaasDelay);

// AUv2 entry point for Logic Pro, which only loads Audio Units. This
// wraps the CLAP build through clap-wrapper.
clap_wrapper::export_auv2!();
