//! Peak level meters shared between the audio thread and the UI.
//!
//! The audio thread is the only writer. Readers poll with relaxed loads and
//! may see a value one block old, which is fine for a decaying peak display.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::Serialize;

/// Meter release time.
pub const RELEASE_SECONDS: f64 = 0.3;

/// Per-sample decay factor for a 300 ms release at `sample_rate`.
pub fn decay_for(sample_rate: f64) -> f32 {
    (-1.0 / (RELEASE_SECONDS * sample_rate)).exp() as f32
}

/// Stereo peak-with-decay level, stored as `f32` bits.
#[derive(Debug, Default)]
pub struct LevelMeter {
    left: AtomicU32,
    right: AtomicU32,
}

impl LevelMeter {
    pub fn new() -> Self {
        LevelMeter::default()
    }

    pub fn left(&self) -> f32 {
        f32::from_bits(self.left.load(Ordering::Relaxed))
    }

    pub fn right(&self) -> f32 {
        f32::from_bits(self.right.load(Ordering::Relaxed))
    }

    /// Run a block through the peak tracker and publish the result.
    ///
    /// `level = max(|x|, level * decay)` per sample; the atomics are touched
    /// once per block.
    pub fn track(&self, left: &[f32], right: &[f32], decay: f32) {
        self.left.store(Self::follow(self.left(), left, decay).to_bits(), Ordering::Relaxed);
        self.right.store(Self::follow(self.right(), right, decay).to_bits(), Ordering::Relaxed);
    }

    #[inline]
    fn follow(mut level: f32, samples: &[f32], decay: f32) -> f32 {
        for &s in samples {
            level = s.abs().max(level * decay);
        }
        level
    }

    pub fn clear(&self) {
        self.left.store(0f32.to_bits(), Ordering::Relaxed);
        self.right.store(0f32.to_bits(), Ordering::Relaxed);
    }
}

/// A point-in-time copy of all four meter values, as handed to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Levels {
    pub input_l: f32,
    pub input_r: f32,
    pub output_l: f32,
    pub output_r: f32,
}

/// Input and output meters of one processor.
#[derive(Debug, Default)]
pub struct Meters {
    pub input: LevelMeter,
    pub output: LevelMeter,
}

impl Meters {
    pub fn new() -> Self {
        Meters::default()
    }

    pub fn input_left(&self) -> f32 {
        self.input.left()
    }

    pub fn input_right(&self) -> f32 {
        self.input.right()
    }

    pub fn output_left(&self) -> f32 {
        self.output.left()
    }

    pub fn output_right(&self) -> f32 {
        self.output.right()
    }

    pub fn levels(&self) -> Levels {
        Levels {
            input_l: self.input_left(),
            input_r: self.input_right(),
            output_l: self.output_left(),
            output_r: self.output_right(),
        }
    }

    pub fn clear(&self) {
        self.input.clear();
        self.output.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let meters = Meters::new();
        assert_eq!(meters.input_left(), 0.0);
        assert_eq!(meters.output_right(), 0.0);
    }

    #[test]
    fn captures_peak() {
        let meter = LevelMeter::new();
        meter.track(&[0.1, -0.8, 0.2], &[0.0, 0.3, 0.0], decay_for(44100.0));
        assert!(meter.left() > 0.79 && meter.left() <= 0.8, "got {}", meter.left());
        assert!(meter.right() > 0.29 && meter.right() <= 0.3, "got {}", meter.right());
    }

    #[test]
    fn decays_over_release_time() {
        let sample_rate = 1000.0;
        let decay = decay_for(sample_rate);
        let meter = LevelMeter::new();
        meter.track(&[1.0], &[1.0], decay);

        // 300 ms of silence → one time constant → 1/e
        let silence = vec![0.0f32; 300];
        meter.track(&silence, &silence, decay);
        let expected = (-1.0f32).exp();
        assert!((meter.left() - expected).abs() < 1e-3, "got {}", meter.left());
    }

    #[test]
    fn levels_serialize_with_ui_names() {
        let meters = Meters::new();
        meters.input.track(&[0.5], &[0.25], 0.9);
        let json = serde_json::to_string(&meters.levels()).unwrap();
        assert_eq!(json, r#"{"inputL":0.5,"inputR":0.25,"outputL":0.0,"outputR":0.0}"#);
    }

    #[test]
    fn clear_resets() {
        let meters = Meters::new();
        meters.output.track(&[0.5], &[0.5], 0.99);
        meters.clear();
        assert_eq!(meters.output_left(), 0.0);
    }
}
