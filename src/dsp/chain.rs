//! Effects chain: all fifteen units, one family active at a time.

use super::ProcessSpec;
use super::effects::{EffectKind, EffectUnit, Family};

/// Owns every effect unit and runs the active family's five in
/// category order.
///
/// Switching family is immediate: the outgoing family's tails are dropped
/// where they stand, and its units keep whatever state they had until the
/// next `reset()`.
#[derive(Debug, Clone)]
pub struct EffectsChain {
    units: [EffectUnit; 15],
    family: Family,
}

impl EffectsChain {
    pub fn new() -> Self {
        EffectsChain {
            units: EffectKind::ALL.map(EffectUnit::new),
            family: Family::Cathode,
        }
    }

    pub fn prepare(&mut self, spec: &ProcessSpec) {
        for unit in &mut self.units {
            unit.prepare(spec);
        }
    }

    pub fn reset(&mut self) {
        for unit in &mut self.units {
            unit.reset();
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn set_family(&mut self, family: Family) {
        self.family = family;
    }

    pub fn set_mix(&mut self, kind: EffectKind, mix: f32) {
        self.units[kind.index()].set_mix(mix);
    }

    pub fn mix_target(&self, kind: EffectKind) -> f32 {
        self.units[kind.index()].mix_target()
    }

    pub fn unit(&self, kind: EffectKind) -> &EffectUnit {
        &self.units[kind.index()]
    }

    /// Run the active family over a stereo block in place.
    ///
    /// All five units run every block regardless of their mix.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        for kind in self.family.units() {
            self.units[kind.index()].process(left, right);
        }
    }
}

impl Default for EffectsChain {
    fn default() -> Self {
        EffectsChain::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared() -> EffectsChain {
        let mut chain = EffectsChain::new();
        chain.prepare(&ProcessSpec::default());
        chain
    }

    fn sine(len: usize) -> Vec<f32> {
        (0..len).map(|i| (i as f32 * 0.05).sin() * 0.5).collect()
    }

    #[test]
    fn units_are_indexed_by_kind() {
        let chain = EffectsChain::new();
        for kind in EffectKind::ALL {
            assert_eq!(chain.unit(kind).kind(), kind);
        }
    }

    #[test]
    fn all_mixes_zero_is_transparent() {
        for family in Family::ALL {
            let mut chain = prepared();
            chain.set_family(family);
            let mut left = sine(2048);
            let mut right = sine(2048);
            let original = left.clone();
            chain.process(&mut left, &mut right);
            assert_eq!(left, original, "{family:?} chain altered audio with all mixes at 0");
        }
    }

    #[test]
    fn only_active_family_is_heard() {
        let mut chain = prepared();
        chain.set_mix(EffectKind::Scorch, 1.0);
        chain.reset();

        // Scorch lives in Steel; with Cathode active it must be silent
        chain.set_family(Family::Cathode);
        let mut left = sine(1024);
        let mut right = sine(1024);
        let original = left.clone();
        chain.process(&mut left, &mut right);
        assert_eq!(left, original);

        chain.set_family(Family::Steel);
        chain.process(&mut left, &mut right);
        assert_ne!(left, original, "Scorch at full mix should change the signal");
    }

    #[test]
    fn set_mix_routes_to_unit() {
        let mut chain = prepared();
        chain.set_mix(EffectKind::Glisten, 0.4);
        assert!((chain.mix_target(EffectKind::Glisten) - 0.4).abs() < 1e-6);
        assert_eq!(chain.mix_target(EffectKind::Ember), 0.0);
    }
}
