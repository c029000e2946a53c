//! WAV renderer: runs a stereo signal through a processor offline and
//! returns WAV bytes.

use crate::processor::Processor;

/// Render `left`/`right` through `processor` to a 16-bit stereo PCM WAV.
///
/// The processor is re-prepared at `sample_rate` (keeping its block size)
/// so offline renders always start from a clean state. If the channels
/// differ in length the shorter one is padded with silence.
pub fn render_wav(processor: &mut Processor, left: &[f32], right: &[f32], sample_rate: u32) -> Vec<u8> {
    let mut spec = *processor.spec();
    spec.sample_rate = sample_rate as f64;
    processor.prepare(spec);

    let frames = left.len().max(right.len());
    let mut out_l = vec![0.0f32; frames];
    let mut out_r = vec![0.0f32; frames];
    out_l[..left.len()].copy_from_slice(left);
    out_r[..right.len()].copy_from_slice(right);

    let block = processor.spec().maximum_block_size;
    for (l, r) in out_l.chunks_mut(block).zip(out_r.chunks_mut(block)) {
        processor.process_block(l, r);
    }

    let pcm: Vec<i16> = out_l
        .iter()
        .zip(out_r.iter())
        .flat_map(|(&l, &r)| [to_i16(l), to_i16(r)])
        .collect();

    encode_wav(&pcm, sample_rate, 2)
}

#[inline]
fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Encode interleaved i16 PCM samples to a WAV byte buffer.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let byte_rate = sample_rate * channels as u32 * (bits_per_sample as u32 / 8);
    let block_align = channels * (bits_per_sample / 8);
    let data_size = (samples.len() * 2) as u32;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    // RIFF header
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    // fmt chunk
    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        buf.extend_from_slice(&sample.to_le_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamId, ParamStore};
    use std::sync::Arc;

    fn processor() -> Processor {
        Processor::new(Arc::new(ParamStore::new()))
    }

    #[test]
    fn wav_header_valid() {
        let mut processor = processor();
        let signal = vec![0.25f32; 100];
        let wav = render_wav(&mut processor, &signal, &signal, 48000);

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(&wav[36..40], b"data");

        let sr = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(sr, 48000);
        let ch = u16::from_le_bytes([wav[22], wav[23]]);
        assert_eq!(ch, 2);
        assert_eq!(processor.spec().sample_rate, 48000.0);
    }

    #[test]
    fn wav_size_correct() {
        let mut processor = processor();
        let left = vec![0.0f32; 1000];
        let right = vec![0.0f32; 600];
        let wav = render_wav(&mut processor, &left, &right, 44100);

        // 1000 frames * 2 channels * 2 bytes
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size, 4000);
        assert_eq!(wav.len(), 44 + 4000);
    }

    #[test]
    fn bypassed_render_is_plain_conversion() {
        let params = Arc::new(ParamStore::new());
        params.set(ParamId::Bypass, 1.0);
        let mut processor = Processor::new(params);

        let signal: Vec<f32> = (0..256).map(|i| (i as f32 * 0.1).sin() * 0.5).collect();
        let wav = render_wav(&mut processor, &signal, &signal, 44100);

        for (i, &s) in signal.iter().enumerate() {
            let offset = 44 + i * 4;
            let l = i16::from_le_bytes([wav[offset], wav[offset + 1]]);
            assert_eq!(l, to_i16(s), "frame {i}");
        }
    }

    #[test]
    fn processed_render_is_not_silent() {
        let mut processor = processor();
        let signal: Vec<f32> = (0..4410).map(|i| (i as f32 * 0.14).sin() * 0.5).collect();
        let wav = render_wav(&mut processor, &signal, &signal, 44100);

        let has_nonzero = wav[44..]
            .chunks_exact(2)
            .any(|b| i16::from_le_bytes([b[0], b[1]]) != 0);
        assert!(has_nonzero, "Rendered WAV should contain non-silent audio");
    }
}
