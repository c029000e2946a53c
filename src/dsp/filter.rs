//! Biquad filter: RBJ cookbook coefficients, transposed direct form II.

use std::f64::consts::PI;

/// Filter response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterType {
    Lowpass,
    Highpass,
    Bandpass,
    /// Low shelf; the shelf gain is a linear factor (1.0 = flat).
    LowShelf,
}

/// Normalised biquad coefficients (`a0` divided out).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Coefficients {
    /// Unity pass-through.
    pub const IDENTITY: Coefficients = Coefficients {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Design a filter section.
    ///
    /// `gain` is only read for [`FilterType::LowShelf`]. The frequency is
    /// clamped below Nyquist and `q` away from zero so every input yields a
    /// stable section.
    pub fn design(filter_type: FilterType, sample_rate: f64, frequency: f64, q: f64, gain: f64) -> Self {
        let sample_rate = if sample_rate > 0.0 { sample_rate } else { 44100.0 };
        let frequency = frequency.min(sample_rate * 0.49).max(1.0);
        let q = q.max(1e-3);

        let w0 = 2.0 * PI * frequency / sample_rate;
        let cos_w0 = w0.cos();
        let sin_w0 = w0.sin();
        let alpha = sin_w0 / (2.0 * q);

        let (b0, b1, b2, a0, a1, a2) = match filter_type {
            FilterType::Lowpass => {
                let b1 = 1.0 - cos_w0;
                let b0 = b1 / 2.0;
                (b0, b1, b0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
            FilterType::Highpass => {
                let b0 = (1.0 + cos_w0) / 2.0;
                let b1 = -(1.0 + cos_w0);
                (b0, b1, b0, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
            FilterType::Bandpass => {
                // Constant 0 dB peak gain
                (alpha, 0.0, -alpha, 1.0 + alpha, -2.0 * cos_w0, 1.0 - alpha)
            }
            FilterType::LowShelf => {
                let a = gain.max(1e-6).sqrt();
                let beta = sin_w0 * a.sqrt() / q;
                let ap1 = a + 1.0;
                let am1 = a - 1.0;
                (
                    a * (ap1 - am1 * cos_w0 + beta),
                    2.0 * a * (am1 - ap1 * cos_w0),
                    a * (ap1 - am1 * cos_w0 - beta),
                    ap1 + am1 * cos_w0 + beta,
                    -2.0 * (am1 + ap1 * cos_w0),
                    ap1 + am1 * cos_w0 - beta,
                )
            }
        };

        Coefficients {
            b0: (b0 / a0) as f32,
            b1: (b1 / a0) as f32,
            b2: (b2 / a0) as f32,
            a1: (a1 / a0) as f32,
            a2: (a2 / a0) as f32,
        }
    }

    pub fn lowpass(sample_rate: f64, frequency: f64, q: f64) -> Self {
        Self::design(FilterType::Lowpass, sample_rate, frequency, q, 1.0)
    }

    pub fn highpass(sample_rate: f64, frequency: f64, q: f64) -> Self {
        Self::design(FilterType::Highpass, sample_rate, frequency, q, 1.0)
    }

    pub fn bandpass(sample_rate: f64, frequency: f64, q: f64) -> Self {
        Self::design(FilterType::Bandpass, sample_rate, frequency, q, 1.0)
    }

    pub fn low_shelf(sample_rate: f64, frequency: f64, q: f64, gain: f64) -> Self {
        Self::design(FilterType::LowShelf, sample_rate, frequency, q, gain)
    }
}

impl Default for Coefficients {
    fn default() -> Self {
        Coefficients::IDENTITY
    }
}

/// A single biquad section with its own history.
///
/// One instance per channel; left and right never share state.
#[derive(Debug, Clone, Default)]
pub struct BiquadFilter {
    coefficients: Coefficients,
    z1: f32,
    z2: f32,
}

impl BiquadFilter {
    pub fn new(coefficients: Coefficients) -> Self {
        BiquadFilter {
            coefficients,
            z1: 0.0,
            z2: 0.0,
        }
    }

    /// Replace the coefficients, keeping the history.
    #[inline]
    pub fn set_coefficients(&mut self, coefficients: Coefficients) {
        self.coefficients = coefficients;
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    /// Process a single sample through the filter.
    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        let c = &self.coefficients;
        let output = c.b0 * input + self.z1;
        self.z1 = c.b1 * input - c.a1 * output + self.z2;
        self.z2 = c.b2 * input - c.a2 * output;
        output
    }

    /// Zero the history; coefficients are untouched.
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    pub fn is_silent(&self) -> bool {
        self.z1 == 0.0 && self.z2 == 0.0
    }
}
