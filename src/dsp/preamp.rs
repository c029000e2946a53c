//! Preamp stage: drive, transformer knee, tube clip, tone shelf, DC blocker.

use super::ProcessSpec;
use super::filter::{BiquadFilter, Coefficients};
use super::smoothed::SmoothedValue;

/// Ramp length of the drive, tone and output smoothers.
const RAMP_SECONDS: f64 = 0.02;

/// Knee of the transformer stage.
const TRANSFORMER_THRESHOLD: f32 = 0.7;

const DC_BLOCK_HZ: f64 = 10.0;

/// Map the normalized output knob to a linear gain (-12 dB to +6 dB).
pub fn output_gain(output: f32) -> f32 {
    let db = -12.0 + output.clamp(0.0, 1.0) * 18.0;
    10f32.powf(db / 20.0)
}

/// Symmetric soft knee above ±0.7, capped at ±1.
#[inline]
pub fn transformer_saturate(x: f32) -> f32 {
    let magnitude = x.abs();
    if magnitude < TRANSFORMER_THRESHOLD {
        return x;
    }
    let knee = TRANSFORMER_THRESHOLD + (magnitude - TRANSFORMER_THRESHOLD) * 0.5;
    knee.min(1.0).copysign(x)
}

/// Asymmetric tanh: the negative half clips a little harder.
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    if x > 0.0 { (x * 0.9).tanh() } else { (x * 1.1).tanh() }
}

/// Tone shelf for a normalized tone value: cutoff 800..4800 Hz, linear
/// shelf gain 0.5..1.5.
fn tone_coefficients(sample_rate: f64, tone: f32) -> Coefficients {
    let tone = tone as f64;
    Coefficients::low_shelf(sample_rate, 800.0 + tone * 4000.0, 0.707, 0.5 + tone)
}

/// The preamp that runs ahead of the effects chain.
///
/// Drive, tone and output are smoothed per sample. The tone shelf follows
/// the smoothed tone value every sample; its design is skipped while the
/// value is unchanged.
#[derive(Debug, Clone)]
pub struct Preamp {
    sample_rate: f64,
    drive: SmoothedValue,
    tone: SmoothedValue,
    output: SmoothedValue,
    designed_tone: f32,
    tone_l: BiquadFilter,
    tone_r: BiquadFilter,
    dc_l: BiquadFilter,
    dc_r: BiquadFilter,
}

impl Preamp {
    pub fn new() -> Self {
        let mut preamp = Preamp {
            sample_rate: super::DEFAULT_SAMPLE_RATE,
            drive: SmoothedValue::new(0.25),
            tone: SmoothedValue::new(0.5),
            output: SmoothedValue::new(output_gain(0.5)),
            designed_tone: f32::NAN,
            tone_l: BiquadFilter::default(),
            tone_r: BiquadFilter::default(),
            dc_l: BiquadFilter::default(),
            dc_r: BiquadFilter::default(),
        };
        preamp.prepare(&ProcessSpec::default());
        preamp
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;

        let flat = Coefficients::low_shelf(self.sample_rate, 2000.0, 0.707, 1.0);
        self.tone_l.set_coefficients(flat);
        self.tone_r.set_coefficients(flat);

        let dc = Coefficients::highpass(self.sample_rate, DC_BLOCK_HZ, std::f64::consts::FRAC_1_SQRT_2);
        self.dc_l.set_coefficients(dc);
        self.dc_r.set_coefficients(dc);

        self.reset();
    }

    /// Clear filter histories and snap every smoother to its target.
    pub fn reset(&mut self) {
        self.tone_l.reset();
        self.tone_r.reset();
        self.dc_l.reset();
        self.dc_r.reset();
        self.drive.reset(self.sample_rate, RAMP_SECONDS);
        self.tone.reset(self.sample_rate, RAMP_SECONDS);
        self.output.reset(self.sample_rate, RAMP_SECONDS);
        self.designed_tone = f32::NAN;
    }

    pub fn set_drive(&mut self, drive: f32) {
        self.drive.set_target(drive.clamp(0.0, 1.0));
    }

    pub fn set_tone(&mut self, tone: f32) {
        self.tone.set_target(tone.clamp(0.0, 1.0));
    }

    /// Set the normalized output knob; the smoother ramps the linear gain.
    pub fn set_output(&mut self, output: f32) {
        self.output.set_target(output_gain(output));
    }

    pub fn drive_target(&self) -> f32 {
        self.drive.target_value()
    }

    pub fn tone_target(&self) -> f32 {
        self.tone.target_value()
    }

    pub fn output_gain_target(&self) -> f32 {
        self.output.target_value()
    }

    #[inline]
    fn saturate(x: f32, drive: f32) -> f32 {
        soft_clip(transformer_saturate(x * (1.0 + drive * 3.0)))
    }

    /// Process a stereo block in place.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let drive = self.drive.next_value();
            let tone = self.tone.next_value();
            let gain = self.output.next_value();

            if tone != self.designed_tone {
                let coeffs = tone_coefficients(self.sample_rate, tone);
                self.tone_l.set_coefficients(coeffs);
                self.tone_r.set_coefficients(coeffs);
                self.designed_tone = tone;
            }

            let shaped_l = self.tone_l.process_sample(Self::saturate(*l, drive));
            let shaped_r = self.tone_r.process_sample(Self::saturate(*r, drive));

            *l = self.dc_l.process_sample(shaped_l) * gain;
            *r = self.dc_r.process_sample(shaped_r) * gain;
        }
    }
}

impl Default for Preamp {
    fn default() -> Self {
        Preamp::new()
    }
}
