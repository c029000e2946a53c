//! Parameter identifiers, the lock-free parameter store and persisted state.
//!
//! The control thread writes normalized values into [`ParamStore`]; the
//! audio thread takes a [`ParamSnapshot`] once per block. Each value is an
//! independent relaxed atomic, so a block may see one parameter updated and
//! another not yet. Everything downstream is smoothed, so that is inaudible.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use crate::dsp::effects::{EffectKind, Family};
use crate::error::{ParamError, StateError};

/// Version written into saved state.
pub const STATE_VERSION: u32 = 3;

/// Number of parameters.
pub const PARAM_COUNT: usize = 5 + EffectKind::ALL.len();

/// A host-automatable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Drive,
    Tone,
    Output,
    Bypass,
    /// Active family selector, 0..=2.
    PreampType,
    /// Wet/dry mix of one effect unit.
    Mix(EffectKind),
}

impl ParamId {
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::Drive,
        ParamId::Tone,
        ParamId::Output,
        ParamId::Bypass,
        ParamId::PreampType,
        ParamId::Mix(EffectKind::Ember),
        ParamId::Mix(EffectKind::Velvet),
        ParamId::Mix(EffectKind::Drift),
        ParamId::Mix(EffectKind::Echo),
        ParamId::Mix(EffectKind::Haze),
        ParamId::Mix(EffectKind::Fracture),
        ParamId::Mix(EffectKind::Prism),
        ParamId::Mix(EffectKind::Phase),
        ParamId::Mix(EffectKind::Cascade),
        ParamId::Mix(EffectKind::Glisten),
        ParamId::Mix(EffectKind::Scorch),
        ParamId::Mix(EffectKind::Snarl),
        ParamId::Mix(EffectKind::Shred),
        ParamId::Mix(EffectKind::Grind),
        ParamId::Mix(EffectKind::Rust),
    ];

    pub fn index(self) -> usize {
        match self {
            ParamId::Drive => 0,
            ParamId::Tone => 1,
            ParamId::Output => 2,
            ParamId::Bypass => 3,
            ParamId::PreampType => 4,
            ParamId::Mix(kind) => 5 + kind.index(),
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ParamId::Drive => "drive",
            ParamId::Tone => "tone",
            ParamId::Output => "output",
            ParamId::Bypass => "bypass",
            ParamId::PreampType => "preampType",
            ParamId::Mix(kind) => kind.param_key(),
        }
    }

    pub fn from_key(key: &str) -> Option<ParamId> {
        ParamId::ALL.into_iter().find(|id| id.key() == key)
    }

    pub fn default_value(self) -> f32 {
        match self {
            ParamId::Drive => 0.25,
            ParamId::Tone | ParamId::Output => 0.5,
            ParamId::Bypass | ParamId::PreampType | ParamId::Mix(_) => 0.0,
        }
    }

    /// Clamp a raw value into this parameter's range. The family selector
    /// is rounded to the nearest index.
    pub fn clamp(self, value: f32) -> f32 {
        match self {
            ParamId::PreampType => value.round().clamp(0.0, 2.0),
            _ => value.clamp(0.0, 1.0),
        }
    }
}

/// All parameter values as seen at the start of one audio block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub drive: f32,
    pub tone: f32,
    pub output: f32,
    pub bypass: bool,
    pub family: Family,
    pub mixes: [f32; 15],
}

/// Lock-free parameter storage: one `f32` per parameter, stored as bits.
#[derive(Debug)]
pub struct ParamStore {
    values: [AtomicU32; PARAM_COUNT],
}

impl ParamStore {
    pub fn new() -> Self {
        ParamStore {
            values: std::array::from_fn(|i| AtomicU32::new(ParamId::ALL[i].default_value().to_bits())),
        }
    }

    #[inline]
    pub fn get(&self, id: ParamId) -> f32 {
        f32::from_bits(self.values[id.index()].load(Ordering::Relaxed))
    }

    /// Store a clamped value. Non-finite input is ignored.
    pub fn set(&self, id: ParamId, value: f32) {
        if !value.is_finite() {
            return;
        }
        self.values[id.index()].store(id.clamp(value).to_bits(), Ordering::Relaxed);
    }

    /// Store a value by its string key, as sent by the UI relay.
    pub fn set_by_key(&self, key: &str, value: f32) -> Result<ParamId, ParamError> {
        let id = ParamId::from_key(key).ok_or_else(|| ParamError::UnknownKey(key.to_string()))?;
        if !value.is_finite() {
            return Err(ParamError::NotFinite { key: key.to_string() });
        }
        self.set(id, value);
        Ok(id)
    }

    pub fn get_by_key(&self, key: &str) -> Result<f32, ParamError> {
        ParamId::from_key(key)
            .map(|id| self.get(id))
            .ok_or_else(|| ParamError::UnknownKey(key.to_string()))
    }

    /// Read every parameter once. Called at the top of each audio block.
    pub fn snapshot(&self) -> ParamSnapshot {
        let mut mixes = [0.0; 15];
        for (slot, kind) in mixes.iter_mut().zip(EffectKind::ALL) {
            *slot = self.get(ParamId::Mix(kind));
        }
        ParamSnapshot {
            drive: self.get(ParamId::Drive),
            tone: self.get(ParamId::Tone),
            output: self.get(ParamId::Output),
            bypass: self.get(ParamId::Bypass) > 0.5,
            family: Family::from_index(self.get(ParamId::PreampType) as usize),
            mixes,
        }
    }

    pub fn to_state(&self) -> PluginState {
        PluginState {
            state_version: Some(STATE_VERSION),
            params: ParamId::ALL.iter().map(|id| (id.key().to_string(), self.get(*id))).collect(),
        }
    }

    /// Apply a saved state. Keys not present keep their current value and
    /// unknown keys are skipped.
    pub fn apply_state(&self, state: &PluginState) -> Result<(), StateError> {
        let version = state.state_version.ok_or(StateError::MissingVersion)?;
        if version > STATE_VERSION {
            log::warn!("State version {version} is newer than supported {STATE_VERSION}; loading known keys");
        }
        for (key, &value) in &state.params {
            match ParamId::from_key(key) {
                Some(id) => self.set(id, value),
                None => log::debug!("Ignoring unknown state key '{key}'"),
            }
        }
        Ok(())
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        ParamStore::new()
    }
}

/// Persisted plugin state: a flat key → value map plus a version tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginState {
    #[serde(rename = "stateVersion", default)]
    pub state_version: Option<u32>,
    #[serde(default)]
    pub params: BTreeMap<String, f32>,
}

impl PluginState {
    pub fn from_json(json: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, StateError> {
        Ok(serde_json::to_string(self)?)
    }
}
