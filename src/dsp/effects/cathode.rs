//! Cathode family: warm tube voicings.

use super::{MixControl, SILENCE, mix_accessors};
use crate::dsp::ProcessSpec;
use crate::dsp::delay::DelayLine;
use crate::dsp::filter::{BiquadFilter, Coefficients};
use crate::dsp::oscillator::{Lfo, Waveform};

// ── Ember: asymmetric tube saturation ───────────────────────

/// Asymmetric tanh saturation on a lightly smoothed input.
///
/// The positive half clips softer than the negative half, which is where
/// the even harmonics come from.
#[derive(Debug, Clone)]
pub struct Ember {
    mix: MixControl,
    last_l: f32,
    last_r: f32,
}

impl Ember {
    pub fn new() -> Self {
        Ember {
            mix: MixControl::new(),
            last_l: 0.0,
            last_r: 0.0,
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.last_l = 0.0;
        self.last_r = 0.0;
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.last_l = 0.0;
        self.last_r = 0.0;
    }

    mix_accessors!();

    #[inline]
    fn shape(input: f32) -> f32 {
        let x = input * 2.0;
        let x = if x > 0.0 {
            (x * 0.8).tanh() * 1.1
        } else {
            (x * 1.2).tanh()
        };
        x * 0.7
    }

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);

            let wet_l = Self::shape(dry_l * 0.7 + self.last_l * 0.3);
            let wet_r = Self::shape(dry_r * 0.7 + self.last_r * 0.3);
            self.last_l = dry_l;
            self.last_r = dry_r;

            *l = dry_l + (wet_l - dry_l) * mix;
            *r = dry_r + (wet_r - dry_r) * mix;
        }
    }
}

impl Default for Ember {
    fn default() -> Self {
        Ember::new()
    }
}

// ── Velvet: resonant low-pass ───────────────────────────────

/// Resonant low-pass that darkens as the mix rises.
///
/// Coefficients follow the mix sampled once at the start of each block;
/// the crossfade itself uses the per-sample mix.
#[derive(Debug, Clone)]
pub struct Velvet {
    mix: MixControl,
    filter_l: BiquadFilter,
    filter_r: BiquadFilter,
}

impl Velvet {
    pub fn new() -> Self {
        Velvet {
            mix: MixControl::new(),
            filter_l: BiquadFilter::default(),
            filter_r: BiquadFilter::default(),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        let coeffs = Coefficients::lowpass(spec.sample_rate, 3000.0, 1.2);
        self.filter_l = BiquadFilter::new(coeffs);
        self.filter_r = BiquadFilter::new(coeffs);
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.filter_l.reset();
        self.filter_r.reset();
    }

    mix_accessors!();

    /// Cutoff and Q for a given mix: 3 kHz / 1.0 down to 1 kHz / 1.5.
    pub fn response(mix: f32) -> (f64, f64) {
        let mix = mix as f64;
        (3000.0 - mix * 2000.0, 1.0 + mix * 0.5)
    }

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        let block_mix = self.mix.current();
        if block_mix > SILENCE {
            let (cutoff, q) = Self::response(block_mix);
            let coeffs = Coefficients::lowpass(self.mix.sample_rate(), cutoff, q);
            self.filter_l.set_coefficients(coeffs);
            self.filter_r.set_coefficients(coeffs);
        }

        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);
            let wet_l = self.filter_l.process_sample(dry_l);
            let wet_r = self.filter_r.process_sample(dry_r);
            *l = dry_l + (wet_l - dry_l) * mix;
            *r = dry_r + (wet_r - dry_r) * mix;
        }
    }
}

impl Default for Velvet {
    fn default() -> Self {
        Velvet::new()
    }
}

// ── Drift: slow tape chorus ─────────────────────────────────

const DRIFT_RATE_HZ: f32 = 0.3;
const DRIFT_DEPTH_SECONDS: f64 = 0.012;
const DRIFT_CENTER_SECONDS: f64 = 0.015;

/// Slow stereo chorus; the right LFO runs a quarter cycle ahead.
#[derive(Debug, Clone)]
pub struct Drift {
    mix: MixControl,
    line: DelayLine,
    lfo: Lfo,
    depth: f32,
    center: f32,
}

impl Drift {
    pub fn new() -> Self {
        Drift {
            mix: MixControl::new(),
            line: DelayLine::empty(),
            lfo: Lfo::new(Waveform::Sine, 44100.0),
            depth: 0.0,
            center: 0.0,
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.line = DelayLine::new(spec.sample_rate, 0.03, 50);
        self.lfo = Lfo::new(Waveform::Sine, spec.sample_rate);
        self.depth = (DRIFT_DEPTH_SECONDS * spec.sample_rate) as f32;
        self.center = (DRIFT_CENTER_SECONDS * spec.sample_rate) as f32;
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

            let mod_l = self.lfo.value() * self.depth;
            let mod_r = self.lfo.value_at(0.25) * self.depth;
            self.lfo.advance(DRIFT_RATE_HZ);

            let (wet_l, wet_r) = self
                .line
                .read_fractional(self.center + mod_l, self.center + mod_r);
            self.line.push(dry_l, dry_r);

            *l = dry_l + (wet_l - dry_l) * mix * 0.7;
            *r = dry_r + (wet_r - dry_r) * mix * 0.7;
        }
    }
}

impl Default for Drift {
    fn default() -> Self {
        Drift::new()
    }
}

// ── Echo: tape delay with wow/flutter ───────────────────────

const ECHO_SECONDS: f64 = 0.35;
const ECHO_WOW_HZ: f32 = 0.5;
const ECHO_WOW_SAMPLES: f32 = 15.0;
const ECHO_FEEDBACK: f32 = 0.4;

/// Tape echo: a wobbling read head and a darkened, fed-back repeat.
#[derive(Debug, Clone)]
pub struct Echo {
    mix: MixControl,
    line: DelayLine,
    lfo: Lfo,
    tone_l: BiquadFilter,
    tone_r: BiquadFilter,
    base_delay: f32,
}

impl Echo {
    pub fn new() -> Self {
        Echo {
            mix: MixControl::new(),
            line: DelayLine::empty(),
            lfo: Lfo::new(Waveform::Sine, 44100.0),
            tone_l: BiquadFilter::default(),
            tone_r: BiquadFilter::default(),
            base_delay: 0.0,
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.line = DelayLine::new(spec.sample_rate, ECHO_SECONDS, 100);
        self.lfo = Lfo::new(Waveform::Sine, spec.sample_rate);
        self.base_delay = (ECHO_SECONDS * spec.sample_rate).floor() as f32;
        let coeffs = Coefficients::lowpass(spec.sample_rate, 4000.0, 0.6);
        self.tone_l = BiquadFilter::new(coeffs);
        self.tone_r = BiquadFilter::new(coeffs);
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.line.clear();
        self.lfo.reset();
        self.tone_l.reset();
        self.tone_r.reset();
    }

    mix_accessors!();

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);

            let wow = self.lfo.value() * ECHO_WOW_SAMPLES;
            self.lfo.advance(ECHO_WOW_HZ);

            let delay = self.base_delay + wow;
            let (tap_l, tap_r) = self.line.read_fractional(delay, delay);
            let wet_l = self.tone_l.process_sample(tap_l);
            let wet_r = self.tone_r.process_sample(tap_r);

            self.line
                .push(dry_l + wet_l * ECHO_FEEDBACK, dry_r + wet_r * ECHO_FEEDBACK);

            *l = dry_l + wet_l * mix;
            *r = dry_r + wet_r * mix;
        }
    }
}

impl Default for Echo {
    fn default() -> Self {
        Echo::new()
    }
}

// ── Haze: dark plate reverb ─────────────────────────────────

/// Two cross-fed combs behind a 2 kHz low-pass.
#[derive(Debug, Clone)]
pub struct Haze {
    mix: MixControl,
    short: DelayLine,
    long: DelayLine,
    damp_l: BiquadFilter,
    damp_r: BiquadFilter,
}

impl Haze {
    pub fn new() -> Self {
        Haze {
            mix: MixControl::new(),
            short: DelayLine::empty(),
            long: DelayLine::empty(),
            damp_l: BiquadFilter::default(),
            damp_r: BiquadFilter::default(),
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.mix.prepare(spec);
        self.short = DelayLine::new(spec.sample_rate, 0.037, 0);
        self.long = DelayLine::new(spec.sample_rate, 0.053, 0);
        let coeffs = Coefficients::lowpass(spec.sample_rate, 2000.0, 0.7);
        self.damp_l = BiquadFilter::new(coeffs);
        self.damp_r = BiquadFilter::new(coeffs);
    }

    pub fn reset(&mut self) {
        self.mix.reset();
        self.short.clear();
        self.long.clear();
        self.damp_l.reset();
        self.damp_r.reset();
    }

    mix_accessors!();

    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let mix = self.mix.next();
            if mix < SILENCE {
                continue;
            }
            let (dry_l, dry_r) = (*l, *r);

            let (tap1_l, tap1_r) = self.short.read_oldest();
            let (tap2_l, tap2_r) = self.long.read_oldest();

            let wet_l = self.damp_l.process_sample(tap1_l * 0.6 + tap2_l * 0.4);
            let wet_r = self.damp_r.process_sample(tap1_r * 0.6 + tap2_r * 0.4);

            self.short.push(dry_l + wet_r * 0.45, dry_r + wet_l * 0.45);
            self.long.push(wet_l * 0.5 + dry_l * 0.3, wet_r * 0.5 + dry_r * 0.3);

            *l = dry_l + wet_l * mix;
            *r = dry_r + wet_r * mix;
        }
    }
}

impl Default for Haze {
    fn default() -> Self {
        Haze::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(sample_rate: f64) -> ProcessSpec {
        ProcessSpec {
            sample_rate,
            maximum_block_size: 512,
            num_channels: 2,
        }
    }

    #[test]
    fn ember_shape_is_asymmetric() {
        let pos = Ember::shape(0.5);
        let neg = Ember::shape(-0.5);
        assert!(pos > 0.0 && neg < 0.0);
        assert!((pos + neg).abs() > 0.01, "Halves should clip differently: {pos} vs {neg}");
        assert!(Ember::shape(10.0) <= 1.1 * 0.7 + 1e-6);
        assert!(Ember::shape(-10.0) >= -0.7 - 1e-6);
    }

    #[test]
    fn ember_full_mix_matches_shaper() {
        let mut ember = Ember::new();
        ember.prepare(&spec(44100.0));
        ember.set_mix(1.0);
        ember.reset();

        let mut left = vec![0.4, 0.4];
        let mut right = vec![-0.4, -0.4];
        ember.process(&mut left, &mut right);

        assert!((left[0] - Ember::shape(0.4 * 0.7)).abs() < 1e-6);
        assert!((left[1] - Ember::shape(0.4)).abs() < 1e-6);
        assert!((right[1] - Ember::shape(-0.4)).abs() < 1e-6);
    }

    #[test]
    fn velvet_response_sweeps_down() {
        assert_eq!(Velvet::response(0.0), (3000.0, 1.0));
        assert_eq!(Velvet::response(1.0), (1000.0, 1.5));
    }

    #[test]
    fn velvet_attenuates_highs() {
        let sample_rate = 44100.0;
        let mut velvet = Velvet::new();
        velvet.prepare(&spec(sample_rate));
        velvet.set_mix(1.0);
        velvet.reset();

        let n = 8192;
        let mut left: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * 10000.0 * i as f32 / sample_rate as f32).sin())
            .collect();
        let mut right = left.clone();
        velvet.process(&mut left, &mut right);

        let peak = left[4096..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak < 0.1, "10 kHz should be strongly cut at full mix, got {peak}");
    }

    #[test]
    fn echo_repeats_after_base_delay() {
        let sample_rate = 8000.0;
        let mut echo = Echo::new();
        echo.prepare(&spec(sample_rate));
        echo.set_mix(1.0);
        echo.reset();

        let n = 4000;
        let mut left = vec![0.0f32; n];
        let mut right = vec![0.0f32; n];
        left[0] = 1.0;
        right[0] = 1.0;
        echo.process(&mut left, &mut right);

        let base = (0.35 * sample_rate) as usize;
        let before = left[1..base - 40].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let around = left[base - 40..base + 80].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(before < 1e-6, "Nothing should arrive before the tape delay, got {before}");
        assert!(around > 0.05, "Repeat should arrive near {base}, got {around}");
    }

    #[test]
    fn drift_spreads_stereo() {
        let mut drift = Drift::new();
        drift.prepare(&spec(44100.0));
        drift.set_mix(1.0);
        drift.reset();

        let mut left: Vec<f32> = (0..8192).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut right = left.clone();
        drift.process(&mut left, &mut right);

        let diff = left
            .iter()
            .zip(right.iter())
            .skip(2048)
            .fold(0.0f32, |m, (a, b)| m.max((a - b).abs()));
        assert!(diff > 0.001, "Quarter-cycle LFO offset should split L/R, got {diff}");
    }

    #[test]
    fn haze_tail_decays() {
        let mut haze = Haze::new();
        haze.prepare(&spec(44100.0));
        haze.set_mix(1.0);
        haze.reset();

        let n = 44100 * 2;
        let mut left = vec![0.0f32; n];
        let mut right = vec![0.0f32; n];
        left[0] = 1.0;
        haze.process(&mut left, &mut right);

        let early = left[1..8820].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let late = left[n - 4410..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(early > 0.01, "Reverb should respond to the impulse, got {early}");
        assert!(late < early * 0.1, "Tail should decay: early {early}, late {late}");
        assert!(right[1..8820].iter().any(|s| s.abs() > 1e-4), "Cross-feed should reach R");
    }
}
