//! Stereo circular delay line with integer and interpolated reads.

/// A stereo delay line: one buffer per channel sharing a write cursor.
///
/// Capacity is fixed at construction (from the longest delay the owning
/// effect needs) and never changes while processing. Reads are expressed as
/// a lag behind the write cursor, so an effect that reads before it writes
/// sees the sample written `lag` samples ago.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer_l: Vec<f32>,
    buffer_r: Vec<f32>,
    write_pos: usize,
}

impl DelayLine {
    /// Create a delay line holding `ceil(max_delay_seconds * sample_rate)`
    /// samples plus `guard` extra slots for modulated reads.
    pub fn new(sample_rate: f64, max_delay_seconds: f64, guard: usize) -> Self {
        let samples = (max_delay_seconds * sample_rate).ceil();
        let samples = if samples.is_finite() && samples > 0.0 { samples as usize } else { 0 };
        Self::with_capacity(samples + guard)
    }

    /// Create a delay line with an exact capacity in samples (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer_l: vec![0.0; capacity],
            buffer_r: vec![0.0; capacity],
            write_pos: 0,
        }
    }

    /// An unallocated placeholder used before `prepare()`.
    pub fn empty() -> Self {
        Self::with_capacity(1)
    }

    pub fn capacity(&self) -> usize {
        self.buffer_l.len()
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Read the pair written `lag` samples ago.
    ///
    /// `lag` is taken modulo the capacity, so `lag == capacity` reads the
    /// oldest slot (the one about to be overwritten).
    #[inline]
    pub fn read(&self, lag: usize) -> (f32, f32) {
        let index = self.index_behind(lag);
        (self.buffer_l[index], self.buffer_r[index])
    }

    /// Read the oldest pair, i.e. the slot at the write cursor.
    #[inline]
    pub fn read_oldest(&self) -> (f32, f32) {
        (self.buffer_l[self.write_pos], self.buffer_r[self.write_pos])
    }

    /// Read an absolute buffer slot (wrapped into range).
    #[inline]
    pub fn read_at(&self, index: usize) -> (f32, f32) {
        let index = index % self.capacity();
        (self.buffer_l[index], self.buffer_r[index])
    }

    /// Read with a fractional lag per channel using linear interpolation
    /// between the slot at `write_pos - delay` and the next newer slot.
    #[inline]
    pub fn read_fractional(&self, delay_l: f32, delay_r: f32) -> (f32, f32) {
        (
            Self::interpolate(&self.buffer_l, self.write_pos, delay_l),
            Self::interpolate(&self.buffer_r, self.write_pos, delay_r),
        )
    }

    #[inline]
    fn interpolate(buffer: &[f32], write_pos: usize, delay: f32) -> f32 {
        let len = buffer.len();
        let mut pos = write_pos as f32 - delay;
        if pos < 0.0 {
            pos += len as f32;
        }
        let pos = pos.max(0.0);
        let base = pos.floor();
        let frac = pos - base;
        let i0 = (base as usize) % len;
        let i1 = (i0 + 1) % len;
        buffer[i0] * (1.0 - frac) + buffer[i1] * frac
    }

    #[inline]
    fn index_behind(&self, lag: usize) -> usize {
        let len = self.capacity();
        (self.write_pos + len - lag % len) % len
    }

    /// Store a pair at the write cursor without advancing it.
    #[inline]
    pub fn write(&mut self, left: f32, right: f32) {
        self.buffer_l[self.write_pos] = left;
        self.buffer_r[self.write_pos] = right;
    }

    /// Move the write cursor one slot forward.
    #[inline]
    pub fn advance(&mut self) {
        self.write_pos += 1;
        if self.write_pos >= self.buffer_l.len() {
            self.write_pos = 0;
        }
    }

    /// Write a pair and advance.
    #[inline]
    pub fn push(&mut self, left: f32, right: f32) {
        self.write(left, right);
        self.advance();
    }

    /// Clear the delay buffers.
    pub fn clear(&mut self) {
        self.buffer_l.fill(0.0);
        self.buffer_r.fill(0.0);
        self.write_pos = 0;
    }

    pub fn is_silent(&self) -> bool {
        self.buffer_l.iter().chain(self.buffer_r.iter()).all(|&s| s == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_from_seconds() {
        let line = DelayLine::new(44100.0, 0.35, 100);
        assert_eq!(line.capacity(), (0.35_f64 * 44100.0).ceil() as usize + 100);
    }

    #[test]
    fn integer_lag_round_trip() {
        let mut line = DelayLine::with_capacity(64);
        for i in 0..64 {
            line.push(i as f32, -(i as f32));
        }

        line.push(1000.0, -1000.0);
        for lag in 1..=64 {
            let (l, r) = line.read(lag);
            let expected = if lag == 1 { 1000.0 } else { (65 - lag) as f32 };
            assert_eq!(l, expected, "lag {lag}");
            assert_eq!(r, -expected, "lag {lag}");
        }
    }

    #[test]
    fn write_pos_stays_in_range() {
        let mut line = DelayLine::with_capacity(7);
        for i in 0..1000 {
            line.push(i as f32, 0.0);
            assert!(line.write_pos() < line.capacity());
        }
    }

    #[test]
    fn read_oldest_is_full_lag() {
        let mut line = DelayLine::with_capacity(5);
        for i in 1..=5 {
            line.push(i as f32, 0.0);
        }
        assert_eq!(line.read_oldest(), line.read(5));
        assert_eq!(line.read_oldest().0, 1.0);
    }

    #[test]
    fn fractional_read_interpolates() {
        let mut line = DelayLine::with_capacity(16);
        line.push(0.0, 0.0);
        line.push(1.0, 10.0);
        line.push(2.0, 20.0);
        line.push(3.0, 30.0);

        // write_pos = 4; delay 1.5 → position 2.5 → between 2.0 and 3.0
        let (l, r) = line.read_fractional(1.5, 2.0);
        assert!((l - 2.5).abs() < 1e-6, "got {l}");
        assert!((r - 20.0).abs() < 1e-6, "got {r}");
    }

    #[test]
    fn fractional_read_wraps_backwards() {
        let mut line = DelayLine::with_capacity(4);
        line.push(1.0, 0.0);
        line.push(2.0, 0.0);
        line.push(3.0, 0.0);
        line.push(4.0, 0.0);

        // write_pos = 0; delay 0.5 → position 3.5 → between slot 3 (4.0) and slot 0 (1.0)
        let (l, _) = line.read_fractional(0.5, 0.5);
        assert!((l - 2.5).abs() < 1e-6, "got {l}");
    }

    #[test]
    fn clear_zeroes_everything() {
        let mut line = DelayLine::with_capacity(8);
        line.push(0.5, 0.5);
        line.push(0.25, -0.25);
        line.clear();
        assert!(line.is_silent());
        assert_eq!(line.write_pos(), 0);
    }
}
