pub mod dsp;
pub mod error;
pub mod params;
pub mod processor;

use std::sync::Arc;

use crate::dsp::ProcessSpec;
use crate::dsp::effects::Family;
use crate::error::DimuraError;
use crate::params::{ParamId, ParamStore, PluginState};
use crate::processor::Processor;
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// WASM-exposed: return the dimura-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

/// Runs once when the WASM module is instantiated.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Info));
}

fn js_error(e: impl Into<DimuraError>) -> JsValue {
    JsValue::from_str(&format!("{}", e.into()))
}

/// WASM-exposed processor for the browser AudioWorklet.
///
/// Parameter writes go through the same lock-free store a native host
/// would use, so UI messages and audio callbacks never contend.
#[wasm_bindgen]
pub struct WebProcessor {
    params: Arc<ParamStore>,
    processor: Processor,
}

#[wasm_bindgen]
impl WebProcessor {
    #[wasm_bindgen(constructor)]
    pub fn new(sample_rate: f64, max_block: usize) -> WebProcessor {
        let params = Arc::new(ParamStore::new());
        let mut processor = Processor::new(Arc::clone(&params));
        processor.prepare(ProcessSpec::new(sample_rate, max_block, 2));
        WebProcessor { params, processor }
    }

    /// Set a parameter by key (`drive`, `preampType`, `cath_ember`, ...).
    pub fn set_param(&self, key: &str, value: f32) -> Result<(), JsValue> {
        let id = self.params.set_by_key(key, value).map_err(js_error)?;
        if id == ParamId::PreampType {
            let family = Family::from_index(self.params.get(id) as usize);
            log::debug!("Family switched to {}", family.name());
        }
        Ok(())
    }

    pub fn get_param(&self, key: &str) -> Result<f32, JsValue> {
        self.params.get_by_key(key).map_err(js_error)
    }

    /// Process one stereo block in place.
    pub fn process(&mut self, left: &mut [f32], right: &mut [f32]) {
        self.processor.process_block(left, right);
    }

    /// Process a mono block in place.
    pub fn process_mono(&mut self, buffer: &mut [f32]) {
        self.processor.process_mono(buffer);
    }

    pub fn reset(&mut self) {
        self.processor.reset();
    }

    /// Current meter values as `{inputL, inputR, outputL, outputR}`.
    pub fn levels(&self) -> Result<JsValue, JsValue> {
        let levels = self.processor.meters().levels();
        serde_wasm_bindgen::to_value(&levels).map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    /// Serialize every parameter plus the state version to JSON.
    pub fn save_state(&self) -> Result<String, JsValue> {
        self.params.to_state().to_json().map_err(js_error)
    }

    /// Restore parameters from JSON produced by `save_state`.
    pub fn load_state(&mut self, json: &str) -> Result<(), JsValue> {
        let state = PluginState::from_json(json).map_err(js_error)?;
        self.params.apply_state(&state).map_err(js_error)?;
        log::debug!("Loaded state with {} parameter(s)", state.params.len());
        Ok(())
    }

    /// Render a stereo signal offline through the current settings to WAV bytes.
    ///
    /// Uses its own processor, so the live instance keeps its tails and meters.
    pub fn render_wav(&self, left: &[f32], right: &[f32]) -> Vec<u8> {
        let sample_rate = self.processor.spec().sample_rate.round() as u32;
        let mut offline = Processor::new(Arc::clone(&self.params));
        dsp::renderer::render_wav(&mut offline, left, right, sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::effects::EffectKind;

    #[test]
    fn version_matches_manifest() {
        assert_eq!(core_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn web_processor_round_trips_state() {
        let web = WebProcessor::new(48000.0, 128);
        web.set_param("drive", 0.7).unwrap();
        web.set_param("preampType", 1.0).unwrap();
        web.set_param("fil_glisten", 0.3).unwrap();
        let json = web.save_state().unwrap();

        let mut other = WebProcessor::new(48000.0, 128);
        other.load_state(&json).unwrap();
        assert!((other.get_param("drive").unwrap() - 0.7).abs() < 1e-6);
        assert_eq!(other.get_param("preampType").unwrap(), 1.0);
        assert!((other.params.get(ParamId::Mix(EffectKind::Glisten)) - 0.3).abs() < 1e-6);
    }

    #[test]
    fn web_processor_processes_in_place() {
        let mut web = WebProcessor::new(44100.0, 256);
        web.set_param("steel_scorch", 1.0).unwrap();
        web.set_param("preampType", 2.0).unwrap();

        let mut left: Vec<f32> = (0..256).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        let mut right = left.clone();
        let original = left.clone();
        web.process(&mut left, &mut right);
        assert_ne!(left, original);
        assert!(web.processor.meters().levels().output_l > 0.0);
    }

    #[test]
    fn web_processor_renders_wav() {
        let web = WebProcessor::new(22050.0, 512);
        let signal = vec![0.1f32; 2205];
        let wav = web.render_wav(&signal, &signal);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(wav.len(), 44 + 2205 * 4);
        assert_eq!(u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]), 22050);
    }

    #[test]
    fn render_leaves_live_processor_alone() {
        let mut web = WebProcessor::new(48000.0, 256);
        web.set_param("preampType", 0.0).unwrap();
        web.set_param("cath_echo", 1.0).unwrap();

        let mut left = vec![0.0f32; 256];
        left[0] = 0.8;
        let mut right = left.clone();
        web.process(&mut left, &mut right);
        let before = web.processor.meters().levels();

        let signal = vec![0.0f32; 4800];
        web.render_wav(&signal, &signal);

        assert_eq!(web.processor.spec().sample_rate, 48000.0);
        assert_eq!(web.processor.spec().maximum_block_size, 256);
        assert_eq!(web.processor.meters().levels(), before);

        // The echo of the live impulse is still pending in the delay line
        let mut tail_l = vec![0.0f32; 48000];
        let mut tail_r = tail_l.clone();
        web.process(&mut tail_l, &mut tail_r);
        assert!(tail_l.iter().any(|&s| s.abs() > 1e-3), "Live delay tail was wiped");
    }
}
