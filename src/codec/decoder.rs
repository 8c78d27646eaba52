//! Lyra decoder adapter.
//!
//! The decode side is a pass-through: hand the backend one encoded packet,
//! ask it for one frame's worth of PCM. Concealment output for missing
//! packets comes from the same backend call with no packet pending.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::warn;

use super::encoder::LyraPacket;
use super::registry::default_model_path;
use super::{BITRATE_BPS, DEFAULT_FRAME_SIZE_MS, DEFAULT_SAMPLE_RATE_HZ};
use crate::audio::frame::AudioBuffer;
use crate::audio::sample::AudioSample;
use crate::backend::{BackendParams, DecoderBackend};
use crate::pipeline::Node;

/// Decoder configuration negotiated from SDP or built by hand.
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    pub num_channels: usize,
    pub frame_size_ms: u32,
    pub bitrate: u32,
    pub sample_rate_hz: u32,
    pub model_path: PathBuf,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            num_channels: 1,
            frame_size_ms: DEFAULT_FRAME_SIZE_MS,
            bitrate: BITRATE_BPS,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            model_path: default_model_path().map(Path::to_path_buf).unwrap_or_default(),
        }
    }
}

impl DecoderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_channels < 1 {
            anyhow::bail!("Channel count must be at least 1");
        }
        if self.frame_size_ms == 0 || self.frame_size_ms % 10 != 0 {
            anyhow::bail!(
                "Frame size must be a positive multiple of 10 ms, got {} ms",
                self.frame_size_ms
            );
        }
        if self.bitrate != BITRATE_BPS {
            anyhow::bail!(
                "Bitrate must be {} bps, got {}",
                BITRATE_BPS,
                self.bitrate
            );
        }
        if self.sample_rate_hz == 0 {
            anyhow::bail!("Sample rate must be larger than 0 Hz");
        }
        if self.model_path.as_os_str().is_empty() {
            anyhow::bail!("Model path is not set");
        }
        Ok(())
    }
}

/// Packet-to-PCM decoder adapter around a [`DecoderBackend`].
pub struct LyraDecoder<B: DecoderBackend> {
    backend: B,
    sample_rate_hz: u32,
    num_channels: usize,
    frame_size_ms: u32,
}

impl<B: DecoderBackend> LyraDecoder<B> {
    pub fn new(config: &DecoderConfig) -> Result<Self> {
        config.validate()?;

        let backend = B::create(&BackendParams {
            sample_rate_hz: config.sample_rate_hz,
            num_channels: config.num_channels,
            bitrate: config.bitrate,
            dtx: false,
            model_path: config.model_path.clone(),
        })
        .context("Failed to create Lyra decoder backend")?;

        Ok(Self {
            backend,
            sample_rate_hz: config.sample_rate_hz,
            num_channels: config.num_channels,
            frame_size_ms: config.frame_size_ms,
        })
    }

    /// Interleaved PCM samples produced per packet.
    fn samples_per_packet(&self) -> usize {
        (self.sample_rate_hz / 1000 * self.frame_size_ms) as usize * self.num_channels
    }

    /// Decode one encoded packet into one frame of interleaved PCM.
    pub fn decode(&mut self, packet: &[u8]) -> Result<Vec<i16>> {
        self.backend
            .set_encoded_packet(packet)
            .context("Unable to set encoded packet")?;
        self.backend
            .decode_samples(self.samples_per_packet())
            .context("Unable to decode samples")
    }

    /// Produce one frame of concealment output (DTX gap or lost packet).
    pub fn decode_missing(&mut self) -> Result<Vec<i16>> {
        self.backend
            .decode_samples(self.samples_per_packet())
            .context("Unable to generate concealment samples")
    }

    /// Duration of an encoded packet in samples per channel.
    ///
    /// Follows the backend's one-byte-per-sample packet sizing. A backend
    /// with model-coded packets would instead derive this from the
    /// configured frame size.
    pub fn packet_duration(&self, encoded_len: usize) -> usize {
        encoded_len / self.num_channels
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn channels(&self) -> usize {
        self.num_channels
    }

    /// Stream reset. The backend keeps no cross-packet state this adapter
    /// manages, so there is nothing to clear.
    pub fn reset(&mut self) {}
}

/// Pipeline node that decodes Lyra packets back to PCM buffers.
///
/// Input: LyraPacket (compressed payload)
/// Output: AudioBuffer<Sample> (PCM samples)
pub struct LyraDecoderNode<Sample, const CHANNELS: usize, const SAMPLE_RATE: u32, B: DecoderBackend>
{
    state: Mutex<LyraDecoder<B>>,
    _marker: PhantomData<Sample>,
}

impl<Sample: AudioSample, const CHANNELS: usize, const SAMPLE_RATE: u32, B: DecoderBackend>
    LyraDecoderNode<Sample, CHANNELS, SAMPLE_RATE, B>
{
    pub fn new(config: &DecoderConfig) -> Result<Self> {
        if config.num_channels != CHANNELS {
            anyhow::bail!(
                "Config has {} channels but node carries {}",
                config.num_channels,
                CHANNELS
            );
        }
        if config.sample_rate_hz != SAMPLE_RATE {
            anyhow::bail!(
                "Config has {} Hz but node carries {} Hz",
                config.sample_rate_hz,
                SAMPLE_RATE
            );
        }
        Ok(Self {
            state: Mutex::new(LyraDecoder::new(config)?),
            _marker: PhantomData,
        })
    }

    fn to_buffer(pcm: Vec<i16>) -> Option<AudioBuffer<Sample, CHANNELS, SAMPLE_RATE>> {
        let samples: Vec<Sample> = pcm
            .iter()
            .map(|&s| Sample::from_f64_normalized(s.to_f64_normalized()))
            .collect();
        AudioBuffer::new(samples).ok()
    }

    pub fn decode_packet(
        &self,
        packet: &LyraPacket,
    ) -> Option<AudioBuffer<Sample, CHANNELS, SAMPLE_RATE>> {
        let mut state = self.state.lock().unwrap();
        match state.decode(&packet.payload) {
            Ok(pcm) => Self::to_buffer(pcm),
            Err(e) => {
                warn!("Lyra decoding failed: {}", e);
                None
            }
        }
    }

    /// One frame of concealment output for a missing packet.
    pub fn decode_missing(&self) -> Option<AudioBuffer<Sample, CHANNELS, SAMPLE_RATE>> {
        let mut state = self.state.lock().unwrap();
        match state.decode_missing() {
            Ok(pcm) => Self::to_buffer(pcm),
            Err(e) => {
                warn!("Lyra concealment failed: {}", e);
                None
            }
        }
    }
}

impl<Sample: AudioSample, const CHANNELS: usize, const SAMPLE_RATE: u32, B: DecoderBackend> Node
    for LyraDecoderNode<Sample, CHANNELS, SAMPLE_RATE, B>
{
    type Input = LyraPacket;
    type Output = AudioBuffer<Sample, CHANNELS, SAMPLE_RATE>;

    fn process(&self, input: Self::Input) -> Option<Self::Output> {
        self.decode_packet(&input)
    }
}
