//! DSP engine. Pure Rust, allocation-free once prepared.
//!
//! The same code runs inside the browser AudioWorklet (via WASM) and in the
//! offline WAV renderer, so both paths produce identical samples.

pub mod chain;
pub mod delay;
pub mod effects;
pub mod envelope;
pub mod filter;
pub mod meter;
pub mod oscillator;
pub mod preamp;
pub mod renderer;
pub mod smoothed;

/// Sample rate used when a host hands us something unusable.
pub const DEFAULT_SAMPLE_RATE: f64 = 44100.0;

/// Lowest sample rate accepted from a host.
pub const MIN_SAMPLE_RATE: f64 = 8000.0;

/// Block size used when a host reports zero.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

/// Host-supplied playback configuration, passed to every `prepare()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    pub sample_rate: f64,
    pub maximum_block_size: usize,
    pub num_channels: usize,
}

impl ProcessSpec {
    pub fn new(sample_rate: f64, maximum_block_size: usize, num_channels: usize) -> Self {
        ProcessSpec {
            sample_rate,
            maximum_block_size,
            num_channels,
        }
    }

    /// A copy with a non-finite sample rate or one below [`MIN_SAMPLE_RATE`],
    /// and a zero block size, replaced by the defaults. Channel count is kept
    /// as is.
    pub fn sanitized(&self) -> ProcessSpec {
        let sample_rate = if self.sample_rate.is_finite() && self.sample_rate >= MIN_SAMPLE_RATE {
            self.sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        let maximum_block_size = if self.maximum_block_size == 0 {
            DEFAULT_BLOCK_SIZE
        } else {
            self.maximum_block_size
        };
        ProcessSpec {
            sample_rate,
            maximum_block_size,
            num_channels: self.num_channels,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.sanitized() == *self
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        ProcessSpec::new(DEFAULT_SAMPLE_RATE, DEFAULT_BLOCK_SIZE, 2)
    }
}
