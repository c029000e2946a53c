//! Steel family: aggressive industrial voicings.

use super::filament::quantize;
use super::{MixControl, SILENCE, mix_accessors};
use crate::dsp::ProcessSpec;
use crate::dsp::delay::DelayLine;
use crate::dsp::envelope::EnvelopeFollower;
use crate::dsp::filter::{BiquadFilter, Coefficients};
use crate::dsp::oscillator::{Lfo, Waveform};

// ── Scorch: hard-clip fuzz ──────────────────────────────────

/// Up to 9x gain into a hard clip, with some rectified signal blended in.
#[derive(Debug, Clone)]
pub struct Scorch {
    mix: MixControl,
}

impl Scorch {
    pub fn new() -> Self {
        Scorch {
            mix: MixControl::new(),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
    }

    pub fn reset(&mut self) {
        self.mix.reset();
    }

    mix_accessors!();

    #[inline]
    fn fuzz(x: f32, mix: f32) -> f32 {
        let clipped = (x * (1.0 + mix * 8.0)).clamp(-1.0, 1.0);
        clipped * 0.7 + clipped.abs() * 0.3 * mix
    }

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);
            let wet_l = Self::fuzz(dry_l, mix);
            let wet_r = Self::fuzz(dry_r, mix);
            *l = dry_l + (wet_l - dry_l) * mix;
            *r = dry_r + (wet_r - dry_r) * mix;
        }
    }
}

impl Default for Scorch {
    fn default() -> Self {
        Scorch::new()
    }
}

// ── Snarl: resonant band-pass drive ─────────────────────────

/// Band-pass that climbs from 800 Hz to 2 kHz and narrows with the mix,
/// followed by tanh drive. Coefficients are refreshed once per block.
#[derive(Debug, Clone)]
pub struct Snarl {
    mix: MixControl,
    filter_l: BiquadFilter,
    filter_r: BiquadFilter,
}

impl Snarl {
    pub fn new() -> Self {
        Snarl {
            mix: MixControl::new(),
            filter_l: BiquadFilter::default(),
            filter_r: BiquadFilter::default(),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        let coeffs = Coefficients::bandpass(spec.sample_rate, 1000.0, 3.0);
        self.filter_l = BiquadFilter::new(coeffs);
        self.filter_r = BiquadFilter::new(coeffs);
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.filter_l.reset();
        self.filter_r.reset();
    }

    mix_accessors!();

    /// Centre frequency and Q for a given mix.
    pub fn response(mix: f32) -> (f64, f64) {
        let mix = mix as f64;
        (800.0 + mix * 1200.0, 2.0 + mix * 4.0)
    }

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        let block_mix = self.mix.current();
        if block_mix >= SILENCE {
            let (centre, q) = Self::response(block_mix);
            let coeffs = Coefficients::bandpass(self.mix.sample_rate(), centre, q);
            self.filter_l.set_coefficients(coeffs);
            self.filter_r.set_coefficients(coeffs);
        }

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);
            let gain = 1.0 + mix * 3.0;
            let wet_l = (self.filter_l.process_sample(dry_l) * gain).tanh();
            let wet_r = (self.filter_r.process_sample(dry_r) * gain).tanh();
            *l = dry_l + wet_l * mix;
            *r = dry_r + wet_r * mix;
        }
    }
}

impl Default for Snarl {
    fn default() -> Self {
        Snarl::new()
    }
}

// ── Shred: ring modulator ───────────────────────────────────

/// Ring modulation against a sine that rises from 200 to 500 Hz.
#[derive(Debug, Clone)]
pub struct Shred {
    mix: MixControl,
    carrier: Lfo,
}

impl Shred {
    pub fn new() -> Self {
        Shred {
            mix: MixControl::new(),
            carrier: Lfo::new(Waveform::Sine, 44100.0),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.carrier = Lfo::new(Waveform::Sine, spec.sample_rate);
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.carrier.reset();
    }

    mix_accessors!();

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);

            let osc = self.carrier.value();
            self.carrier.advance(200.0 + mix * 300.0);

            let wet_l = dry_l * osc;
            let wet_r = dry_r * osc;
            *l = dry_l + (wet_l - dry_l) * mix * 0.8;
            *r = dry_r + (wet_r - dry_r) * mix * 0.8;
        }
    }
}

impl Default for Shred {
    fn default() -> Self {
        Shred::new()
    }
}

// ── Grind: decimating delay ─────────────────────────────────

/// 300 ms delay whose repeats are sample-and-held (1x to 8x) and
/// quantised (16 down to 4 bits) on the way out.
#[derive(Debug, Clone)]
pub struct Grind {
    mix: MixControl,
    line: DelayLine,
    hold_counter: u32,
    held_l: f32,
    held_r: f32,
}

impl Grind {
    pub fn new() -> Self {
        Grind {
            mix: MixControl::new(),
            line: DelayLine::empty(),
            hold_counter: 0,
            held_l: 0.0,
            held_r: 0.0,
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.line = DelayLine::new(spec.sample_rate, 0.3, 0);
        self.hold_counter = 0;
        self.held_l = 0.0;
        self.held_r = 0.0;
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.line.clear();
        self.hold_counter = 0;
        self.held_l = 0.0;
        self.held_r = 0.0;
    }

    mix_accessors!();

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);

            let hold = 1 + (mix * 7.0) as u32;
            self.hold_counter += 1;
            if self.hold_counter >= hold {
                self.hold_counter = 0;
                let (tap_l, tap_r) = self.line.read_oldest();
                let bits = 16.0 - mix * 12.0;
                self.held_l = quantize(tap_l, bits);
                self.held_r = quantize(tap_r, bits);
            }

            self.line
                .push(dry_l + self.held_l * 0.5, dry_r + self.held_r * 0.5);

            *l = dry_l + self.held_l * mix;
            *r = dry_r + self.held_r * mix;
        }
    }
}

impl Default for Grind {
    fn default() -> Self {
        Grind::new()
    }
}

// ── Rust: gated early reflections ───────────────────────────

const RUST_ATTACK: f32 = 0.001;
const RUST_RELEASE: f32 = 0.05;
const RUST_GATE_THRESHOLD: f32 = 0.05;

/// Two short cross-fed reflection lines gated by the input envelope.
#[derive(Debug, Clone)]
pub struct Rust {
    mix: MixControl,
    short: DelayLine,
    long: DelayLine,
    envelope: EnvelopeFollower,
}

impl Rust {
    pub fn new() -> Self {
        Rust {
            mix: MixControl::new(),
            short: DelayLine::empty(),
            long: DelayLine::empty(),
            envelope: EnvelopeFollower::new(RUST_ATTACK, RUST_RELEASE),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.short = DelayLine::new(spec.sample_rate, 0.023, 0);
        self.long = DelayLine::new(spec.sample_rate, 0.047, 0);
        self.envelope.reset();
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.short.clear();
        self.long.clear();
        self.envelope.reset();
    }

    mix_accessors!();

    /// Gate gain for an envelope level: open above the threshold, linear below.
    #[inline]
    pub fn gate(level: f32) -> f32 {
        if level > RUST_GATE_THRESHOLD {
            1.0
        } else {
            level / RUST_GATE_THRESHOLD
        }
    }

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);

            let level = self.envelope.next(dry_l.abs().max(dry_r.abs()));
            let gate = Self::gate(level);

            let (tap1_l, tap1_r) = self.short.read_oldest();
            let (tap2_l, tap2_r) = self.long.read_oldest();

            let wet_l = (tap1_l * 0.7 + tap2_l * 0.5) * gate;
            let wet_r = (tap1_r * 0.7 + tap2_r * 0.5) * gate;

            self.short
                .push(dry_l + tap2_r * 0.3 * gate, dry_r + tap2_l * 0.3 * gate);
            self.long
                .push(tap1_l * 0.4 + dry_l * 0.3, tap1_r * 0.4 + dry_r * 0.3);

            *l = dry_l + wet_l * mix;
            *r = dry_r + wet_r * mix;
        }
    }
}

impl Default for Rust {
    fn default() -> Self {
        Rust::new()
    }
}
