//! Byte-per-sample pass-through backend.
//!
//! Quantizes each 16-bit sample to its top byte on encode and expands it back
//! on decode. Useless as a codec, but it exercises every adapter path (frame
//! accumulation, DTX suppression, concealment) without model weights, and its
//! one-byte-per-sample packets match the sizing the adapters assume.

use anyhow::Result;
use tracing::trace;

use super::{BackendParams, DecoderBackend, EncoderBackend};

/// Sample rates the backend accepts, mirroring what Lyra models ship for.
const SUPPORTED_SAMPLE_RATES_HZ: [u32; 4] = [8000, 16000, 32000, 48000];
const SUPPORTED_BITRATE_BPS: u32 = 3000;

/// Frames whose peak amplitude quantizes to zero count as silence for DTX.
const DTX_SILENCE_PEAK: i16 = 256;

fn check_params(params: &BackendParams) -> Result<()> {
    if !SUPPORTED_SAMPLE_RATES_HZ.contains(&params.sample_rate_hz) {
        anyhow::bail!("Unsupported sample rate: {} Hz", params.sample_rate_hz);
    }
    if params.num_channels < 1 {
        anyhow::bail!("Channel count must be at least 1");
    }
    if params.bitrate != SUPPORTED_BITRATE_BPS {
        anyhow::bail!(
            "Unsupported bitrate: {} bps (expected {})",
            params.bitrate,
            SUPPORTED_BITRATE_BPS
        );
    }
    Ok(())
}

pub struct PassthroughEncoder {
    dtx: bool,
}

impl EncoderBackend for PassthroughEncoder {
    fn create(params: &BackendParams) -> Result<Self> {
        check_params(params)?;
        Ok(Self { dtx: params.dtx })
    }

    fn encode(&mut self, pcm: &[i16]) -> Result<Vec<u8>> {
        if self.dtx && pcm.iter().all(|s| s.unsigned_abs() < DTX_SILENCE_PEAK as u16) {
            trace!("DTX: suppressing silent frame of {} samples", pcm.len());
            return Ok(Vec::new());
        }
        Ok(pcm.iter().map(|&s| (s >> 8) as i8 as u8).collect())
    }
}

pub struct PassthroughDecoder {
    pending: Option<Vec<u8>>,
}

impl DecoderBackend for PassthroughDecoder {
    fn create(params: &BackendParams) -> Result<Self> {
        check_params(params)?;
        Ok(Self { pending: None })
    }

    fn set_encoded_packet(&mut self, packet: &[u8]) -> Result<()> {
        self.pending = Some(packet.to_vec());
        Ok(())
    }

    fn decode_samples(&mut self, count: usize) -> Result<Vec<i16>> {
        match self.pending.take() {
            Some(packet) => {
                if packet.len() != count {
                    anyhow::bail!(
                        "Packet holds {} samples but {} were requested",
                        packet.len(),
                        count
                    );
                }
                Ok(packet.iter().map(|&b| (b as i8 as i16) << 8).collect())
            }
            None => {
                // No packet pending: concealment output.
                trace!("Generating {} samples of concealment", count);
                Ok(vec![0i16; count])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::path::PathBuf;

    fn params() -> BackendParams {
        BackendParams {
            sample_rate_hz: 16000,
            num_channels: 1,
            bitrate: 3000,
            dtx: false,
            model_path: PathBuf::from("model_coeffs"),
        }
    }

    #[test]
    fn test_create_rejects_bad_params() {
        let mut p = params();
        p.sample_rate_hz = 44100;
        assert!(PassthroughEncoder::create(&p).is_err());

        let mut p = params();
        p.bitrate = 6000;
        assert!(PassthroughDecoder::create(&p).is_err());

        let mut p = params();
        p.num_channels = 0;
        assert!(PassthroughEncoder::create(&p).is_err());
    }

    #[test]
    fn test_quantization_roundtrip() {
        let mut encoder = PassthroughEncoder::create(&params()).unwrap();
        let mut decoder = PassthroughDecoder::create(&params()).unwrap();

        let mut rng = rand::thread_rng();
        let pcm: Vec<i16> = (0..640).map(|_| rng.gen_range(i16::MIN..=i16::MAX)).collect();

        let packet = encoder.encode(&pcm).unwrap();
        assert_eq!(packet.len(), 640);

        decoder.set_encoded_packet(&packet).unwrap();
        let decoded = decoder.decode_samples(640).unwrap();

        for (&orig, &dec) in pcm.iter().zip(decoded.iter()) {
            assert!((orig as i32 - dec as i32).abs() < 256);
        }
    }

    #[test]
    fn test_dtx_suppresses_silence() {
        let mut p = params();
        p.dtx = true;
        let mut encoder = PassthroughEncoder::create(&p).unwrap();

        assert!(encoder.encode(&[0i16; 640]).unwrap().is_empty());
        assert_eq!(encoder.encode(&[3000i16; 640]).unwrap().len(), 640);
    }

    #[test]
    fn test_concealment_without_packet() {
        let mut decoder = PassthroughDecoder::create(&params()).unwrap();
        assert_eq!(decoder.decode_samples(640).unwrap(), vec![0i16; 640]);
    }

    #[test]
    fn test_packet_consumed_once() {
        let mut decoder = PassthroughDecoder::create(&params()).unwrap();
        decoder.set_encoded_packet(&[1u8; 640]).unwrap();
        decoder.decode_samples(640).unwrap();

        // Second call has no packet left and falls back to concealment.
        assert_eq!(decoder.decode_samples(640).unwrap(), vec![0i16; 640]);
    }

    #[test]
    fn test_length_mismatch_is_an_error() {
        let mut decoder = PassthroughDecoder::create(&params()).unwrap();
        decoder.set_encoded_packet(&[1u8; 100]).unwrap();
        assert!(decoder.decode_samples(640).is_err());
    }
}
