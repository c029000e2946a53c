//! Host-facing processor: parameters in, audio through preamp and chain,
//! meters out.

use std::sync::Arc;

use no_denormals::no_denormals;

use crate::dsp::ProcessSpec;
use crate::dsp::chain::EffectsChain;
use crate::dsp::effects::EffectKind;
use crate::dsp::meter::{Meters, decay_for};
use crate::dsp::preamp::Preamp;
use crate::params::{ParamSnapshot, ParamStore};

/// The full signal path for one plugin instance.
///
/// `prepare`, `reset` and `process_block` belong to the audio thread. Other
/// threads talk to it only through the shared [`ParamStore`] and [`Meters`].
pub struct Processor {
    params: Arc<ParamStore>,
    meters: Arc<Meters>,
    spec: ProcessSpec,
    preamp: Preamp,
    chain: EffectsChain,
    meter_decay: f32,
    bypassed: bool,
    scratch: Vec<f32>,
}

impl Processor {
    pub fn new(params: Arc<ParamStore>) -> Self {
        let spec = ProcessSpec::default();
        let mut processor = Processor {
            params,
            meters: Arc::new(Meters::new()),
            spec,
            preamp: Preamp::new(),
            chain: EffectsChain::new(),
            meter_decay: decay_for(spec.sample_rate),
            bypassed: false,
            scratch: Vec::new(),
        };
        processor.prepare(spec);
        processor
    }

    /// Size everything for `spec` and start from a clean state at the
    /// current parameter values.
    ///
    /// Unusable specs (sample rate below 8 kHz or not finite, zero block
    /// size) are replaced with defaults rather than rejected.
    pub fn prepare(&mut self, spec: ProcessSpec) {
        let sanitized = spec.sanitized();
        if sanitized != spec {
            log::warn!(
                "Unusable process spec (sample rate {}, block size {}); using {} Hz / {}",
                spec.sample_rate,
                spec.maximum_block_size,
                sanitized.sample_rate,
                sanitized.maximum_block_size
            );
        }
        self.spec = sanitized;
        log::info!(
            "Preparing processor: {} Hz, max block {}, {} channel(s)",
            self.spec.sample_rate,
            self.spec.maximum_block_size,
            self.spec.num_channels
        );

        self.preamp.prepare(&self.spec);
        self.chain.prepare(&self.spec);
        self.meter_decay = decay_for(self.spec.sample_rate);
        self.scratch = vec![0.0; self.spec.maximum_block_size];

        let snapshot = self.params.snapshot();
        self.bypassed = snapshot.bypass;
        self.apply(&snapshot);
        self.reset();
    }

    /// Clear all DSP state and snap every smoother to its target.
    pub fn reset(&mut self) {
        self.preamp.reset();
        self.chain.reset();
        self.meters.clear();
    }

    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    pub fn params(&self) -> &Arc<ParamStore> {
        &self.params
    }

    /// Shared handle for the UI's meter polling.
    pub fn meters(&self) -> Arc<Meters> {
        Arc::clone(&self.meters)
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    pub fn chain(&self) -> &EffectsChain {
        &self.chain
    }

    fn apply(&mut self, snapshot: &ParamSnapshot) {
        self.preamp.set_drive(snapshot.drive);
        self.preamp.set_tone(snapshot.tone);
        self.preamp.set_output(snapshot.output);
        self.chain.set_family(snapshot.family);
        for (kind, &mix) in EffectKind::ALL.iter().zip(snapshot.mixes.iter()) {
            self.chain.set_mix(*kind, mix);
        }
    }

    /// Process one stereo block in place.
    ///
    /// While bypassed the buffers are not written at all. Entering bypass
    /// resets the DSP; leaving it snaps the smoothers to the current
    /// parameters so processing resumes without a fade.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        let frames = left.len().min(right.len());
        let (left, right) = (&mut left[..frames], &mut right[..frames]);
        let snapshot = self.params.snapshot();

        if snapshot.bypass {
            if !self.bypassed {
                self.preamp.reset();
                self.chain.reset();
                self.bypassed = true;
            }
            self.meters.input.track(left, right, self.meter_decay);
            self.meters.output.track(left, right, self.meter_decay);
            return;
        }

        self.apply(&snapshot);
        if self.bypassed {
            self.preamp.reset();
            self.chain.reset();
            self.bypassed = false;
        }

        let decay = self.meter_decay;
        let meters = &self.meters;
        let preamp = &mut self.preamp;
        let chain = &mut self.chain;
        no_denormals(|| {
            meters.input.track(left, right, decay);
            preamp.process(left, right);
            chain.process(left, right);
            meters.output.track(left, right, decay);
        });
    }

    /// Process a mono buffer in place.
    ///
    /// The channel is duplicated into a pre-allocated scratch buffer and run
    /// through the stereo path in chunks of the prepared block size; only
    /// the left result is kept.
    pub fn process_mono(&mut self, buffer: &mut [f32]) {
        let mut scratch = std::mem::take(&mut self.scratch);
        let chunk_len = scratch.len().max(1);
        for chunk in buffer.chunks_mut(chunk_len) {
            let right = &mut scratch[..chunk.len()];
            right.copy_from_slice(chunk);
            self.process_block(chunk, right);
        }
        self.scratch = scratch;
    }
}
