//! Lyra codec adapters and their registration surface.
//!
//! - [`encoder`] - PCM-accumulating encoder adapter and its pipeline node
//! - [`decoder`] - Packet-to-PCM decoder adapter and its pipeline node
//! - [`sdp`] - Negotiated audio format and codec capability types
//! - [`registry`] - Format negotiation, capability advertisement, and
//!   adapter factories

pub mod decoder;
pub mod encoder;
pub mod registry;
pub mod sdp;

pub use decoder::{DecoderConfig, LyraDecoder, LyraDecoderNode};
pub use encoder::{EncoderConfig, LyraEncoder, LyraEncoderNode, LyraPacket};
pub use sdp::{AudioCodecInfo, AudioCodecSpec, SdpAudioFormat};

/// SDP codec name Lyra is negotiated under.
pub const SDP_NAME: &str = "lyra";

/// Sample rate the shipped Lyra models run at.
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16000;

/// Packet duration advertised and used by default.
pub const DEFAULT_FRAME_SIZE_MS: u32 = 40;

/// The one bitrate this integration supports.
pub const BITRATE_BPS: u32 = 3000;

/// Default dynamic RTP payload type.
pub const DEFAULT_PAYLOAD_TYPE: u8 = 125;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::decoder::{DecoderConfig, LyraDecoderNode};
    use super::encoder::{EncoderConfig, LyraEncoder, LyraEncoderNode};
    use super::registry::{make_audio_decoder, make_audio_encoder};
    use super::*;
    use crate::audio::frame::AudioBuffer;
    use crate::backend::{PassthroughDecoder, PassthroughEncoder};
    use crate::pipeline::Node;

    fn encoder_config() -> EncoderConfig {
        EncoderConfig {
            model_path: PathBuf::from("model_coeffs"),
            ..Default::default()
        }
    }

    fn decoder_config() -> DecoderConfig {
        DecoderConfig {
            model_path: PathBuf::from("model_coeffs"),
            ..Default::default()
        }
    }

    fn rms(samples: &[i16]) -> f64 {
        let sum: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
        (sum / samples.len() as f64).sqrt()
    }

    #[test]
    fn test_wav_driven_roundtrip() {
        // Half a second of 300 Hz tone, through a WAV file like a capture
        // tool would hand us, then through the full encode/decode path.
        let wav_path = std::env::temp_dir().join("lyra_rtc_roundtrip.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&wav_path, spec).unwrap();
        for i in 0..8000usize {
            let t = i as f64 / 16000.0;
            let s = ((t * 300.0 * 2.0 * std::f64::consts::PI).sin() * 10000.0) as i16;
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let mut reader = hound::WavReader::open(&wav_path).unwrap();
        let input: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(input.len(), 8000);

        let mut encoder =
            make_audio_encoder::<PassthroughEncoder>(&encoder_config(), DEFAULT_PAYLOAD_TYPE)
                .unwrap();
        let mut decoder = make_audio_decoder::<PassthroughDecoder>(&decoder_config()).unwrap();

        let mut timestamp = 0u32;
        let mut decoded: Vec<i16> = Vec::new();
        for chunk in input.chunks(160) {
            if let Some(packet) = encoder.encode(timestamp, chunk).unwrap() {
                decoded.extend(decoder.decode(&packet.payload).unwrap());
            }
            timestamp = timestamp.wrapping_add(chunk.len() as u32);
        }

        // 8000 samples fill exactly 12 full 640-sample frames; the leftover
        // 320 samples stay buffered in the encoder.
        assert_eq!(decoded.len(), 12 * 640);

        let input_rms = rms(&input[..decoded.len()]);
        let output_rms = rms(&decoded);
        assert!(
            (input_rms - output_rms).abs() / input_rms < 0.05,
            "RMS drifted: {} -> {}",
            input_rms,
            output_rms
        );

        std::fs::remove_file(&wav_path).ok();
    }

    #[test]
    fn test_f32_node_chain() {
        let encoder: LyraEncoderNode<f32, 1, 16000, PassthroughEncoder> =
            LyraEncoderNode::new(&encoder_config()).unwrap();
        let decoder: LyraDecoderNode<f32, 1, 16000, PassthroughDecoder> =
            LyraDecoderNode::new(&decoder_config()).unwrap();

        let chunk: Vec<f32> = (0..160)
            .map(|i| ((i as f32) * 0.1).sin() * 0.5)
            .collect();

        let mut output = None;
        for _ in 0..4 {
            let input = AudioBuffer::<f32, 1, 16000>::new(chunk.clone()).unwrap();
            output = encoder.process(input);
        }
        let packet = output.expect("four 10 ms chunks complete a frame");

        let buffer = decoder.process(packet).expect("decode should succeed");
        assert_eq!(buffer.data().len(), 640);

        // Quantization is coarse but the signal must come back in range.
        for (&orig, &dec) in chunk.iter().zip(buffer.data().iter()) {
            assert!((orig - dec).abs() < 0.02, "{} vs {}", orig, dec);
        }
    }

    #[test]
    fn test_encoder_bitrate_matches_advertisement() {
        let encoder = LyraEncoder::<PassthroughEncoder>::new(&encoder_config()).unwrap();
        assert_eq!(encoder.target_bitrate(), BITRATE_BPS);
        assert_eq!(encoder.sample_rate_hz(), DEFAULT_SAMPLE_RATE_HZ);
    }
}
