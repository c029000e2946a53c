//! Linearly ramped parameter values.

/// A scalar that ramps linearly from its current value to a target over a
/// fixed number of samples.
///
/// The per-sample increment is fixed when the target changes, so the ramp
/// never overshoots and the final step lands exactly on the target.
#[derive(Debug, Clone)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    countdown: usize,
    steps_to_target: usize,
}

impl SmoothedValue {
    pub fn new(initial: f32) -> Self {
        SmoothedValue {
            current: initial,
            target: initial,
            step: 0.0,
            countdown: 0,
            steps_to_target: 0,
        }
    }

    /// Set the ramp length and snap the current value to the target.
    pub fn reset(&mut self, sample_rate: f64, ramp_seconds: f64) {
        let steps = (ramp_seconds * sample_rate).ceil();
        self.steps_to_target = if steps.is_finite() && steps > 0.0 {
            steps as usize
        } else {
            0
        };
        self.set_current_and_target(self.target);
    }

    /// Jump straight to `value` with no ramp.
    pub fn set_current_and_target(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.countdown = 0;
        self.step = 0.0;
    }

    /// Start a ramp from the current value towards `value`.
    pub fn set_target(&mut self, value: f32) {
        if value == self.target {
            return;
        }
        if self.steps_to_target == 0 {
            self.set_current_and_target(value);
            return;
        }
        self.target = value;
        self.countdown = self.steps_to_target;
        self.step = (self.target - self.current) / self.countdown as f32;
    }

    /// Advance one sample and return the new value.
    #[inline]
    pub fn next_value(&mut self) -> f32 {
        if self.countdown == 0 {
            return self.target;
        }
        self.countdown -= 1;
        if self.countdown > 0 {
            self.current += self.step;
        } else {
            self.current = self.target;
        }
        self.current
    }

    /// Peek at the current value without advancing.
    #[inline]
    pub fn current_value(&self) -> f32 {
        self.current
    }

    pub fn target_value(&self) -> f32 {
        self.target
    }

    pub fn is_smoothing(&self) -> bool {
        self.countdown > 0
    }

    /// Number of samples a full ramp takes.
    pub fn ramp_length(&self) -> usize {
        self.steps_to_target
    }
}

impl Default for SmoothedValue {
    fn default() -> Self {
        SmoothedValue::new(0.0)
    }
}
