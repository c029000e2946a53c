//! Peak envelope follower.

/// One-pole envelope follower with separate rise and fall coefficients.
///
/// Each sample the level moves towards the input by a fixed fraction:
/// `attack` while the input is above the level, `release` otherwise.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    /// Fraction of the gap closed per sample while rising.
    pub attack: f32,
    /// Fraction of the gap closed per sample while falling.
    pub release: f32,
    level: f32,
}

impl EnvelopeFollower {
    pub fn new(attack: f32, release: f32) -> Self {
        EnvelopeFollower {
            attack: attack.clamp(0.0, 1.0),
            release: release.clamp(0.0, 1.0),
            level: 0.0,
        }
    }

    /// Track one input magnitude and return the new level.
    #[inline]
    pub fn next(&mut self, input: f32) -> f32 {
        let coef = if input > self.level { self.attack } else { self.release };
        self.level += coef * (input - self.level);
        self.level
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
    }
}
