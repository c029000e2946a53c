//! Filament family: cold digital voicings.

use super::{MixControl, SILENCE, mix_accessors};
use crate::dsp::ProcessSpec;
use crate::dsp::delay::DelayLine;
use crate::dsp::filter::{BiquadFilter, Coefficients};
use crate::dsp::oscillator::{Lfo, Waveform};

/// Round `x` onto a grid of `2^bits` steps per unit.
#[inline]
pub(crate) fn quantize(x: f32, bits: f32) -> f32 {
    let levels = bits.exp2();
    (x * levels).round() / levels
}

// ── Fracture: bit-crusher ───────────────────────────────────

/// Gain into a hard clip, then quantisation from 12 down to 8 bits.
#[derive(Debug, Clone)]
pub struct Fracture {
    mix: MixControl,
}

impl Fracture {
    pub fn new() -> Self {
        Fracture {
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
    fn crush(x: f32, mix: f32) -> f32 {
        let driven = (x * (1.0 + mix * 4.0)).clamp(-1.0, 1.0);
        quantize(driven, 12.0 - mix * 4.0)
    }

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);
            let wet_l = Self::crush(dry_l, mix);
            let wet_r = Self::crush(dry_r, mix);
            *l = dry_l + (wet_l - dry_l) * mix;
            *r = dry_r + (wet_r - dry_r) * mix;
        }
    }
}

impl Default for Fracture {
    fn default() -> Self {
        Fracture::new()
    }
}

// ── Prism: metallic comb ────────────────────────────────────

/// 7 ms feedback comb; feedback rises with the mix.
#[derive(Debug, Clone)]
pub struct Prism {
    mix: MixControl,
    line: DelayLine,
}

impl Prism {
    pub fn new() -> Self {
        Prism {
            mix: MixControl::new(),
            line: DelayLine::empty(),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.line = DelayLine::new(spec.sample_rate, 0.007, 0);
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.line.clear();
    }

    mix_accessors!();

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);
            let feedback = 0.5 + mix * 0.35;

            let (tap_l, tap_r) = self.line.read_oldest();
            let wet_l = dry_l + tap_l * feedback;
            let wet_r = dry_r + tap_r * feedback;
            self.line.push(wet_l, wet_r);

            *l = dry_l + (wet_l - dry_l) * mix * 0.7;
            *r = dry_r + (wet_r - dry_r) * mix * 0.7;
        }
    }
}

impl Default for Prism {
    fn default() -> Self {
        Prism::new()
    }
}

// ── Phase: through-zero flanger ─────────────────────────────

const PHASE_RATE_HZ: f32 = 0.2;
const PHASE_SWEEP_SECONDS: f64 = 0.008;

/// Short swept delay subtracted from the dry path, so the notches pass
/// through zero delay at the bottom of the sweep.
#[derive(Debug, Clone)]
pub struct Phase {
    mix: MixControl,
    line: DelayLine,
    lfo: Lfo,
    sweep: f32,
}

impl Phase {
    pub fn new() -> Self {
        Phase {
            mix: MixControl::new(),
            line: DelayLine::empty(),
            lfo: Lfo::new(Waveform::Triangle, 44100.0),
            sweep: 0.0,
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.line = DelayLine::new(spec.sample_rate, 0.01, 10);
        self.lfo = Lfo::new(Waveform::Triangle, spec.sample_rate);
        self.sweep = (PHASE_SWEEP_SECONDS * spec.sample_rate) as f32;
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.line.clear();
        self.lfo.reset();
    }

    mix_accessors!();

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);

            let delay = self.lfo.value() * self.sweep + 1.0;
            self.lfo.advance(PHASE_RATE_HZ);

            let (wet_l, wet_r) = self.line.read_fractional(delay, delay);
            let out_l = dry_l - wet_l * 0.7;
            let out_r = dry_r - wet_r * 0.7;

            let feedback = 0.5 + mix * 0.3;
            self.line
                .push(dry_l + wet_l * feedback, dry_r + wet_r * feedback);

            *l = dry_l + (out_l - dry_l) * mix;
            *r = dry_r + (out_r - dry_r) * mix;
        }
    }
}

impl Default for Phase {
    fn default() -> Self {
        Phase::new()
    }
}

// ── Cascade: multi-tap delay ────────────────────────────────

const CASCADE_TAPS: [(f64, f32); 4] = [(0.125, 0.7), (0.25, 0.5), (0.375, 0.35), (0.5, 0.2)];

/// Four fixed taps with falling gains and a little feedback.
#[derive(Debug, Clone)]
pub struct Cascade {
    mix: MixControl,
    line: DelayLine,
    taps: [usize; 4],
}

impl Cascade {
    pub fn new() -> Self {
        Cascade {
            mix: MixControl::new(),
            line: DelayLine::empty(),
            taps: [1; 4],
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        // One extra slot so the longest tap never aliases onto the write cursor
        self.line = DelayLine::new(spec.sample_rate, 0.5, 1);
        for (tap, (seconds, _)) in self.taps.iter_mut().zip(CASCADE_TAPS) {
            *tap = ((seconds * spec.sample_rate) as usize).max(1);
        }
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.line.clear();
    }

    mix_accessors!();

    pub fn tap_lags(&self) -> [usize; 4] {
        self.taps
    }

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);

            let (mut sum_l, mut sum_r) = (0.0f32, 0.0f32);
            for (&lag, (_, gain)) in self.taps.iter().zip(CASCADE_TAPS) {
                let (tap_l, tap_r) = self.line.read(lag);
                sum_l += tap_l * gain;
                sum_r += tap_r * gain;
            }
            let wet_l = sum_l * 0.5;
            let wet_r = sum_r * 0.5;

            self.line.push(dry_l + wet_l * 0.15, dry_r + wet_r * 0.15);

            *l = dry_l + wet_l * mix;
            *r = dry_r + wet_r * mix;
        }
    }
}

impl Default for Cascade {
    fn default() -> Self {
        Cascade::new()
    }
}

// ── Glisten: shimmer reverb ─────────────────────────────────

const SHIMMER_RATIO: f32 = 2.0;

/// 80 ms recirculating reverb plus an octave-up shimmer read from a
/// 40 ms buffer at double speed.
#[derive(Debug, Clone)]
pub struct Glisten {
    mix: MixControl,
    reverb: DelayLine,
    shimmer: DelayLine,
    shimmer_phase: f32,
    bright_l: BiquadFilter,
    bright_r: BiquadFilter,
}

impl Glisten {
    pub fn new() -> Self {
        Glisten {
            mix: MixControl::new(),
            reverb: DelayLine::empty(),
            shimmer: DelayLine::empty(),
            shimmer_phase: 0.0,
            bright_l: BiquadFilter::default(),
            bright_r: BiquadFilter::default(),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.reverb = DelayLine::new(spec.sample_rate, 0.08, 0);
        self.shimmer = DelayLine::new(spec.sample_rate, 0.04, 0);
        self.shimmer_phase = 0.0;
        let coeffs = Coefficients::highpass(spec.sample_rate, 2000.0, 0.7);
        self.bright_l = BiquadFilter::new(coeffs);
        self.bright_r = BiquadFilter::new(coeffs);
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.reverb.clear();
        self.shimmer.clear();
        self.shimmer_phase = 0.0;
        self.bright_l.reset();
        self.bright_r.reset();
    }

    mix_accessors!();

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        let shimmer_len = self.shimmer.capacity() as f32;

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);

            let (verb_l, verb_r) = self.reverb.read_oldest();

            self.shimmer_phase += SHIMMER_RATIO;
            if self.shimmer_phase >= shimmer_len {
                self.shimmer_phase -= shimmer_len;
            }
            let (shim_l, shim_r) = self.shimmer.read_at(self.shimmer_phase as usize);
            let shim_l = self.bright_l.process_sample(shim_l * 0.3);
            let shim_r = self.bright_r.process_sample(shim_r * 0.3);

            let wet_l = verb_l * 0.6 + shim_l;
            let wet_r = verb_r * 0.6 + shim_r;

            self.reverb.push(dry_l + wet_l * 0.35, dry_r + wet_r * 0.35);
            self.shimmer.push(dry_l + verb_l * 0.4, dry_r + verb_r * 0.4);

            *l = dry_l + wet_l * mix;
            *r = dry_r + wet_r * mix;
        }
    }
}

impl Default for Glisten {
    fn default() -> Self {
        Glisten::new()
    }
}
