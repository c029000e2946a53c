//! Low-frequency phase oscillators for modulation.

use std::f32::consts::TAU;

/// Supported waveform shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    /// Unipolar triangle, 1 → 0 → 1 over one cycle.
    Triangle,
}

/// A phase accumulator in `[0, 1)` driving a fixed waveform.
///
/// The frequency is passed on every `advance()` so effects can sweep it per
/// sample without touching oscillator state.
#[derive(Debug, Clone)]
pub struct Lfo {
    pub waveform: Waveform,
    phase: f32,
    sample_rate: f32,
}

impl Lfo {
    pub fn new(waveform: Waveform, sample_rate: f64) -> Self {
        Lfo {
            waveform,
            phase: 0.0,
            sample_rate: sample_rate as f32,
        }
    }

    /// Waveform value at the current phase.
    #[inline]
    pub fn value(&self) -> f32 {
        self.value_at(0.0)
    }

    /// Waveform value at the current phase plus `offset` cycles.
    #[inline]
    pub fn value_at(&self, offset: f32) -> f32 {
        let phase = self.phase + offset;
        match self.waveform {
            Waveform::Sine => (phase * TAU).sin(),
            Waveform::Triangle => (2.0 * phase.fract() - 1.0).abs(),
        }
    }

    /// Step the phase by one sample at `frequency` Hz.
    #[inline]
    pub fn advance(&mut self, frequency: f32) {
        self.phase += frequency / self.sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Reset oscillator phase.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_zero_at_start() {
        let lfo = Lfo::new(Waveform::Sine, 44100.0);
        assert!(lfo.value().abs() < 1e-6);
    }

    #[test]
    fn quarter_offset_is_cosine() {
        let lfo = Lfo::new(Waveform::Sine, 44100.0);
        assert!((lfo.value_at(0.25) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn triangle_range() {
        let mut lfo = Lfo::new(Waveform::Triangle, 1000.0);
        assert!((lfo.value() - 1.0).abs() < 1e-6, "Triangle starts at its peak");
        for _ in 0..5000 {
            let v = lfo.value();
            assert!((0.0..=1.0).contains(&v), "Triangle out of range: {v}");
            lfo.advance(3.0);
        }
    }

    #[test]
    fn phase_wraps() {
        let mut lfo = Lfo::new(Waveform::Sine, 100.0);
        for _ in 0..1000 {
            lfo.advance(7.0);
            assert!(lfo.phase() >= 0.0 && lfo.phase() < 1.0);
        }
    }

    #[test]
    fn one_cycle_per_period() {
        let mut lfo = Lfo::new(Waveform::Sine, 1000.0);
        for _ in 0..250 {
            lfo.advance(1.0);
        }
        assert!((lfo.phase() - 0.25).abs() < 1e-4);
        assert!((lfo.value() - 1.0).abs() < 1e-3);
    }
}
