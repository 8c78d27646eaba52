//! Lyra encoder adapter.
//!
//! Translates between the pipeline's PCM conventions and the backend's
//! frame-at-a-time contract: PCM chunks are accumulated until a full frame is
//! available, then the backend is invoked exactly once per frame and the
//! result is stamped into a [`LyraPacket`].

use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{trace, warn};

use super::registry::default_model_path;
use super::{BITRATE_BPS, DEFAULT_FRAME_SIZE_MS, DEFAULT_PAYLOAD_TYPE, DEFAULT_SAMPLE_RATE_HZ};
use crate::audio::buffers::FrameAssembler;
use crate::audio::frame::{AudioBuffer, EncodedFrame};
use crate::audio::sample::AudioSample;
use crate::backend::{BackendParams, EncoderBackend};
use crate::pipeline::Node;

/// Encoder configuration negotiated from SDP or built by hand.
#[derive(Debug, Clone)]
pub struct EncoderConfig {
    pub num_channels: usize,
    pub frame_size_ms: u32,
    pub bitrate: u32,
    pub dtx: bool,
    pub payload_type: u8,
    pub model_path: PathBuf,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            num_channels: 1,
            frame_size_ms: DEFAULT_FRAME_SIZE_MS,
            bitrate: BITRATE_BPS,
            dtx: false,
            payload_type: DEFAULT_PAYLOAD_TYPE,
            model_path: default_model_path().map(Path::to_path_buf).unwrap_or_default(),
        }
    }
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_size_ms == 0 || self.frame_size_ms % 10 != 0 {
            anyhow::bail!(
                "Frame size must be a positive multiple of 10 ms, got {} ms",
                self.frame_size_ms
            );
        }
        if self.num_channels < 1 {
            anyhow::bail!("Channel count must be at least 1");
        }
        if self.bitrate != BITRATE_BPS {
            anyhow::bail!(
                "Bitrate must be {} bps, got {}",
                BITRATE_BPS,
                self.bitrate
            );
        }
        if self.model_path.as_os_str().is_empty() {
            anyhow::bail!("Model path is not set");
        }
        Ok(())
    }
}

/// One encoded packet, ready for packetization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyraPacket {
    pub payload: Vec<u8>,
    /// RTP timestamp of the first PCM sample in the payload.
    pub timestamp: u32,
    pub payload_type: u8,
}

impl LyraPacket {
    /// Wrap the packet in a transport frame.
    pub fn to_frame(&self, sequence_number: u64) -> EncodedFrame {
        EncodedFrame::new(sequence_number, self.timestamp, self.payload.clone())
    }

    /// Rebuild a packet from a received transport frame.
    pub fn from_frame(frame: EncodedFrame, payload_type: u8) -> Self {
        Self {
            payload: frame.payload,
            timestamp: frame.timestamp,
            payload_type,
        }
    }
}

/// Frame-accumulating encoder adapter around an [`EncoderBackend`].
pub struct LyraEncoder<B: EncoderBackend> {
    backend: B,
    assembler: FrameAssembler<i16>,
    sample_rate_hz: u32,
    num_channels: usize,
    bitrate: u32,
    dtx: bool,
    payload_type: u8,
    num_10ms_frames_per_packet: u32,
}

impl<B: EncoderBackend> LyraEncoder<B> {
    /// Create an encoder at the default 16 kHz rate.
    pub fn new(config: &EncoderConfig) -> Result<Self> {
        Self::with_sample_rate(config, DEFAULT_SAMPLE_RATE_HZ)
    }

    pub fn with_sample_rate(config: &EncoderConfig, sample_rate_hz: u32) -> Result<Self> {
        config.validate()?;
        if sample_rate_hz == 0 {
            anyhow::bail!("Sample rate must be larger than 0 Hz");
        }

        let backend = B::create(&BackendParams {
            sample_rate_hz,
            num_channels: config.num_channels,
            bitrate: config.bitrate,
            dtx: config.dtx,
            model_path: config.model_path.clone(),
        })
        .context("Failed to create Lyra encoder backend")?;

        let full_frame_samples =
            config.num_channels * (config.frame_size_ms * sample_rate_hz / 1000) as usize;

        Ok(Self {
            backend,
            assembler: FrameAssembler::new(full_frame_samples, config.num_channels),
            sample_rate_hz,
            num_channels: config.num_channels,
            bitrate: config.bitrate,
            dtx: config.dtx,
            payload_type: config.payload_type,
            num_10ms_frames_per_packet: config.frame_size_ms / 10,
        })
    }

    /// Feed a chunk of interleaved PCM stamped with its RTP timestamp.
    ///
    /// Returns `Ok(None)` while a frame is still filling up, and after a
    /// DTX-suppressed frame. The backend sees exactly one full frame per
    /// invocation.
    pub fn encode(&mut self, rtp_timestamp: u32, pcm: &[i16]) -> Result<Option<LyraPacket>> {
        self.assembler.push(rtp_timestamp, pcm);
        let Some((timestamp, frame)) = self.assembler.pop_frame() else {
            return Ok(None);
        };

        let payload = self
            .backend
            .encode(&frame)
            .context("Lyra encode failed")?;
        if payload.is_empty() {
            trace!(timestamp, "Frame suppressed (DTX)");
            return Ok(None);
        }

        Ok(Some(LyraPacket {
            payload,
            timestamp,
            payload_type: self.payload_type,
        }))
    }

    /// Discard any partially accumulated frame.
    pub fn reset(&mut self) {
        self.assembler.reset();
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    pub fn num_10ms_frames_in_next_packet(&self) -> u32 {
        self.num_10ms_frames_per_packet
    }

    pub fn max_10ms_frames_in_a_packet(&self) -> u32 {
        self.num_10ms_frames_per_packet
    }

    pub fn target_bitrate(&self) -> u32 {
        self.bitrate
    }

    pub fn dtx_enabled(&self) -> bool {
        self.dtx
    }

    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    /// Packets are fixed-duration: minimum and maximum are the same.
    pub fn frame_length_range(&self) -> (Duration, Duration) {
        let length = Duration::from_millis(u64::from(self.num_10ms_frames_per_packet) * 10);
        (length, length)
    }
}

struct EncoderNodeState<B: EncoderBackend> {
    encoder: LyraEncoder<B>,
    rtp_timestamp: u32,
}

/// Pipeline node that accumulates PCM buffers and emits Lyra packets.
///
/// Input: AudioBuffer<Sample> (PCM samples)
/// Output: LyraPacket (compressed payload)
pub struct LyraEncoderNode<Sample, const CHANNELS: usize, const SAMPLE_RATE: u32, B: EncoderBackend>
{
    state: Mutex<EncoderNodeState<B>>,
    _marker: PhantomData<Sample>,
}

impl<Sample: AudioSample, const CHANNELS: usize, const SAMPLE_RATE: u32, B: EncoderBackend>
    LyraEncoderNode<Sample, CHANNELS, SAMPLE_RATE, B>
{
    pub fn new(config: &EncoderConfig) -> Result<Self> {
        if config.num_channels != CHANNELS {
            anyhow::bail!(
                "Config has {} channels but node carries {}",
                config.num_channels,
                CHANNELS
            );
        }
        Ok(Self {
            state: Mutex::new(EncoderNodeState {
                encoder: LyraEncoder::with_sample_rate(config, SAMPLE_RATE)?,
                rtp_timestamp: 0,
            }),
            _marker: PhantomData,
        })
    }
}

impl<Sample: AudioSample, const CHANNELS: usize, const SAMPLE_RATE: u32, B: EncoderBackend> Node
    for LyraEncoderNode<Sample, CHANNELS, SAMPLE_RATE, B>
{
    type Input = AudioBuffer<Sample, CHANNELS, SAMPLE_RATE>;
    type Output = LyraPacket;

    fn process(&self, input: Self::Input) -> Option<Self::Output> {
        let pcm_i16: Vec<i16> = input
            .data()
            .iter()
            .map(|s| i16::from_f64_normalized(s.to_f64_normalized()))
            .collect();
        let samples_per_channel = (pcm_i16.len() / CHANNELS) as u32;

        let mut state = self.state.lock().unwrap();
        let timestamp = state.rtp_timestamp;
        state.rtp_timestamp = timestamp.wrapping_add(samples_per_channel);

        match state.encoder.encode(timestamp, &pcm_i16) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Lyra encoding failed: {}", e);
                None
            }
        }
    }
}
