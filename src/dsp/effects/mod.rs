//! Single-knob effect units, grouped into three voicing families.
//!
//! Every unit has `prepare`, `reset`, `set_mix` and `process`, and is
//! dispatched through [`EffectUnit`], a plain enum, so the per-block call is
//! a `match` rather than a virtual call.
//!
//! Units read their smoothed mix once per sample. Below [`SILENCE`] the
//! sample is left untouched and the unit's internal state does not move, but
//! the mix ramp still advances.

pub mod cathode;
pub mod filament;
pub mod steel;

use super::ProcessSpec;
use super::smoothed::SmoothedValue;

pub use cathode::{Drift, Echo, Ember, Haze, Velvet};
pub use filament::{Cascade, Fracture, Glisten, Phase, Prism};
pub use steel::{Grind, Rust, Scorch, Shred, Snarl};

/// Mix values below this are treated as fully dry.
pub const SILENCE: f32 = 0.001;

/// Mix ramp length.
pub const MIX_RAMP_SECONDS: f64 = 0.02;

/// Voicing family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Warm tube.
    Cathode,
    /// Cold and digital.
    Filament,
    /// Aggressive and industrial.
    Steel,
}

impl Family {
    pub const ALL: [Family; 3] = [Family::Cathode, Family::Filament, Family::Steel];

    /// Map the `preampType` selector (0..=2) to a family; out-of-range
    /// values clamp to the nearest end.
    pub fn from_index(index: usize) -> Family {
        match index {
            0 => Family::Cathode,
            1 => Family::Filament,
            _ => Family::Steel,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Family::Cathode => "Cathode",
            Family::Filament => "Filament",
            Family::Steel => "Steel",
        }
    }

    /// The family's five units in processing order.
    pub fn units(self) -> [EffectKind; 5] {
        let base = self.index() * Category::ALL.len();
        let mut out = [EffectKind::Ember; 5];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = EffectKind::ALL[base + i];
        }
        out
    }
}

/// Position of a unit within its family's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Distortion,
    Filter,
    Modulation,
    Delay,
    Reverb,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Distortion,
        Category::Filter,
        Category::Modulation,
        Category::Delay,
        Category::Reverb,
    ];
}

/// Identifies one of the fifteen effect units.
///
/// Declaration order is family-major, category-minor, which is also the
/// processing order inside each family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Ember,
    Velvet,
    Drift,
    Echo,
    Haze,
    Fracture,
    Prism,
    Phase,
    Cascade,
    Glisten,
    Scorch,
    Snarl,
    Shred,
    Grind,
    Rust,
}

impl EffectKind {
    pub const ALL: [EffectKind; 15] = [
        EffectKind::Ember,
        EffectKind::Velvet,
        EffectKind::Drift,
        EffectKind::Echo,
        EffectKind::Haze,
        EffectKind::Fracture,
        EffectKind::Prism,
        EffectKind::Phase,
        EffectKind::Cascade,
        EffectKind::Glisten,
        EffectKind::Scorch,
        EffectKind::Snarl,
        EffectKind::Shred,
        EffectKind::Grind,
        EffectKind::Rust,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn family(self) -> Family {
        Family::ALL[self.index() / Category::ALL.len()]
    }

    pub fn category(self) -> Category {
        Category::ALL[self.index() % Category::ALL.len()]
    }

    /// Parameter key of this unit's mix control.
    pub fn param_key(self) -> &'static str {
        match self {
            EffectKind::Ember => "cath_ember",
            EffectKind::Velvet => "cath_velvet",
            EffectKind::Drift => "cath_drift",
            EffectKind::Echo => "cath_echo",
            EffectKind::Haze => "cath_haze",
            EffectKind::Fracture => "fil_fracture",
            EffectKind::Prism => "fil_prism",
            EffectKind::Phase => "fil_phase",
            EffectKind::Cascade => "fil_cascade",
            EffectKind::Glisten => "fil_glisten",
            EffectKind::Scorch => "steel_scorch",
            EffectKind::Snarl => "steel_snarl",
            EffectKind::Shred => "steel_shred",
            EffectKind::Grind => "steel_grind",
            EffectKind::Rust => "steel_rust",
        }
    }
}

/// State every unit carries: the sample rate it was prepared for and its
/// smoothed mix.
#[derive(Debug, Clone)]
pub struct MixControl {
    sample_rate: f64,
    mix: SmoothedValue,
}

impl MixControl {
    pub fn new() -> Self {
        let mut mix = SmoothedValue::new(0.0);
        mix.reset(44100.0, MIX_RAMP_SECONDS);
        MixControl {
            sample_rate: 44100.0,
            mix,
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        self.mix.reset(self.sample_rate, MIX_RAMP_SECONDS);
    }

    pub fn reset(&mut self) {
        self.mix.reset(self.sample_rate, MIX_RAMP_SECONDS);
    }

    pub fn set(&mut self, mix: f32) {
        self.mix.set_target(mix.clamp(0.0, 1.0));
    }

    /// Advance the ramp one sample.
    #[inline]
    pub fn next(&mut self) -> f32 {
        self.mix.next_value()
    }

    /// The ramp's value without advancing, for block-rate decisions.
    #[inline]
    pub fn current(&self) -> f32 {
        self.mix.current_value()
    }

    pub fn target(&self) -> f32 {
        self.mix.target_value()
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl Default for MixControl {
    fn default() -> Self {
        MixControl::new()
    }
}

/// A unit of any kind.
#[derive(Debug, Clone)]
pub enum EffectUnit {
    Ember(Ember),
    Velvet(Velvet),
    Drift(Drift),
    Echo(Echo),
    Haze(Haze),
    Fracture(Fracture),
    Prism(Prism),
    Phase(Phase),
    Cascade(Cascade),
    Glisten(Glisten),
    Scorch(Scorch),
    Snarl(Snarl),
    Shred(Shred),
    Grind(Grind),
    Rust(Rust),
}

/// Expands `$body` once per variant with `$unit` bound to the inner struct.
macro_rules! dispatch {
    ($self:expr, $unit:ident => $body:expr) => {
        match $self {
            EffectUnit::Ember($unit) => $body,
            EffectUnit::Velvet($unit) => $body,
            EffectUnit::Drift($unit) => $body,
            EffectUnit::Echo($unit) => $body,
            EffectUnit::Haze($unit) => $body,
            EffectUnit::Fracture($unit) => $body,
            EffectUnit::Prism($unit) => $body,
            EffectUnit::Phase($unit) => $body,
            EffectUnit::Cascade($unit) => $body,
            EffectUnit::Glisten($unit) => $body,
            EffectUnit::Scorch($unit) => $body,
            EffectUnit::Snarl($unit) => $body,
            EffectUnit::Shred($unit) => $body,
            EffectUnit::Grind($unit) => $body,
            EffectUnit::Rust($unit) => $body,
        }
    };
}

impl EffectUnit {
    pub fn new(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Ember => EffectUnit::Ember(Ember::new()),
            EffectKind::Velvet => EffectUnit::Velvet(Velvet::new()),
            EffectKind::Drift => EffectUnit::Drift(Drift::new()),
            EffectKind::Echo => EffectUnit::Echo(Echo::new()),
            EffectKind::Haze => EffectUnit::Haze(Haze::new()),
            EffectKind::Fracture => EffectUnit::Fracture(Fracture::new()),
            EffectKind::Prism => EffectUnit::Prism(Prism::new()),
            EffectKind::Phase => EffectUnit::Phase(Phase::new()),
            EffectKind::Cascade => EffectUnit::Cascade(Cascade::new()),
            EffectKind::Glisten => EffectUnit::Glisten(Glisten::new()),
            EffectKind::Scorch => EffectUnit::Scorch(Scorch::new()),
            EffectKind::Snarl => EffectUnit::Snarl(Snarl::new()),
            EffectKind::Shred => EffectUnit::Shred(Shred::new()),
            EffectKind::Grind => EffectUnit::Grind(Grind::new()),
            EffectKind::Rust => EffectUnit::Rust(Rust::new()),
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            EffectUnit::Ember(_) => EffectKind::Ember,
            EffectUnit::Velvet(_) => EffectKind::Velvet,
            EffectUnit::Drift(_) => EffectKind::Drift,
            EffectUnit::Echo(_) => EffectKind::Echo,
            EffectUnit::Haze(_) => EffectKind::Haze,
            EffectUnit::Fracture(_) => EffectKind::Fracture,
            EffectUnit::Prism(_) => EffectKind::Prism,
            EffectUnit::Phase(_) => EffectKind::Phase,
            EffectUnit::Cascade(_) => EffectKind::Cascade,
            EffectUnit::Glisten(_) => EffectKind::Glisten,
            EffectUnit::Scorch(_) => EffectKind::Scorch,
            EffectUnit::Snarl(_) => EffectKind::Snarl,
            EffectUnit::Shred(_) => EffectKind::Shred,
            EffectUnit::Grind(_) => EffectKind::Grind,
            EffectUnit::Rust(_) => EffectKind::Rust,
        }
    }

    /// Size buffers for the sample rate and clear all state.
    pub fn prepare(&mut self, spec: &ProcessSpec) {
        dispatch!(self, unit => unit.prepare(spec))
    }

    /// Zero delay lines and filter histories and snap the mix to its target.
    pub fn reset(&mut self) {
        dispatch!(self, unit => unit.reset())
    }

    pub fn set_mix(&mut self, mix: f32) {
        dispatch!(self, unit => unit.set_mix(mix))
    }

    pub fn mix_target(&self) -> f32 {
        dispatch!(self, unit => unit.mix_target())
    }

    /// Process a block of stereo audio in-place.
    #[inline]
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        dispatch!(self, unit => unit.process(left, right))
    }
}

/// Implements the mix plumbing shared by every unit struct.
macro_rules! mix_accessors {
    () => {
        pub fn set_mix(&mut self, mix: f32) {
            self.mix.set(mix);
        }

        pub fn mix_target(&self) -> f32 {
            self.mix.target()
        }
    };
}
pub(crate) use mix_accessors;

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> ProcessSpec {
        ProcessSpec {
            sample_rate: 44100.0,
            maximum_block_size: 512,
            num_channels: 2,
        }
    }

    fn test_signal(len: usize) -> (Vec<f32>, Vec<f32>) {
        let left = (0..len).map(|i| (i as f32 * 0.031).sin() * 0.6).collect();
        let right = (0..len).map(|i| (i as f32 * 0.017).cos() * 0.4).collect();
        (left, right)
    }

    #[test]
    fn kind_layout_matches_families() {
        for family in Family::ALL {
            let units = family.units();
            for (i, kind) in units.iter().enumerate() {
                assert_eq!(kind.family(), family);
                assert_eq!(kind.category(), Category::ALL[i]);
            }
        }
        assert_eq!(
            Family::Cathode.units(),
            [EffectKind::Ember, EffectKind::Velvet, EffectKind::Drift, EffectKind::Echo, EffectKind::Haze]
        );
        assert_eq!(
            Family::Steel.units(),
            [EffectKind::Scorch, EffectKind::Snarl, EffectKind::Shred, EffectKind::Grind, EffectKind::Rust]
        );
    }

    #[test]
    fn constructed_unit_reports_kind() {
        for kind in EffectKind::ALL {
            assert_eq!(EffectUnit::new(kind).kind(), kind);
        }
    }

    #[test]
    fn zero_mix_is_identity() {
        for kind in EffectKind::ALL {
            let mut unit = EffectUnit::new(kind);
            unit.prepare(&spec());
            unit.set_mix(0.0);

            let (mut left, mut right) = test_signal(4096);
            let (orig_l, orig_r) = (left.clone(), right.clone());
            unit.process(&mut left, &mut right);
            assert_eq!(left, orig_l, "{kind:?} altered left channel at mix 0");
            assert_eq!(right, orig_r, "{kind:?} altered right channel at mix 0");
        }
    }

    #[test]
    fn silence_in_silence_out_after_reset() {
        for kind in EffectKind::ALL {
            let mut unit = EffectUnit::new(kind);
            unit.prepare(&spec());
            unit.set_mix(1.0);

            // Dirty the state first
            let (mut left, mut right) = test_signal(8192);
            unit.process(&mut left, &mut right);

            unit.reset();
            let mut left = vec![0.0f32; 8192];
            let mut right = vec![0.0f32; 8192];
            unit.process(&mut left, &mut right);
            assert!(
                left.iter().chain(right.iter()).all(|&s| s == 0.0),
                "{kind:?} produced energy from silence after reset"
            );
        }
    }

    #[test]
    fn full_mix_changes_signal_and_stays_finite() {
        for kind in EffectKind::ALL {
            let mut unit = EffectUnit::new(kind);
            unit.prepare(&spec());
            unit.set_mix(1.0);
            unit.reset();

            let (mut left, mut right) = test_signal(44100);
            let (orig_l, _) = (left.clone(), right.clone());
            unit.process(&mut left, &mut right);
            assert!(
                left.iter().chain(right.iter()).all(|s| s.is_finite()),
                "{kind:?} produced non-finite output"
            );
            assert_ne!(left, orig_l, "{kind:?} had no effect at mix 1");
        }
    }

    #[test]
    fn mix_ramp_advances_through_skipped_samples() {
        let sample_rate = 192000.0;
        let ramp = (MIX_RAMP_SECONDS * sample_rate).ceil() as usize;
        let mut unit = EffectUnit::new(EffectKind::Fracture);
        unit.prepare(&ProcessSpec::new(sample_rate, 512, 2));
        unit.set_mix(1.0);

        let mut left = vec![0.3f32; ramp + 1];
        let mut right = left.clone();
        unit.process(&mut left, &mut right);

        // The first few ramp steps sit below the silence threshold and pass dry
        assert_eq!(&left[..3], &[0.3, 0.3, 0.3]);
        assert!(left[3] > 0.3, "Ramp should be audible by sample 3, got {}", left[3]);
        assert!(left[ramp / 2] > 0.3 && left[ramp / 2] < 1.0);
        assert!((left[ramp - 1] - 1.0).abs() < 1e-6, "Ramp should finish after {ramp} samples");
        assert!((left[ramp] - 1.0).abs() < 1e-6, "got {}", left[ramp]);
        assert_eq!(left, right);
    }

    #[test]
    fn mix_is_clamped() {
        let mut unit = EffectUnit::new(EffectKind::Fracture);
        unit.set_mix(3.0);
        assert_eq!(unit.mix_target(), 1.0);
        unit.set_mix(-1.0);
        assert_eq!(unit.mix_target(), 0.0);
    }
}
