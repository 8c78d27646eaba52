use anyhow::{Context, Result};
use rkyv::{Archive, Deserialize, Serialize};

/// A type-safe audio buffer with compile-time channel count and sample rate.
///
/// This structure ensures that audio processing logic (like channel iteration)
/// is checked at compile time and can be heavily optimized by the compiler.
#[derive(Archive, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[rkyv(compare(PartialEq))]
pub struct AudioBuffer<Sample, const CHANNELS: usize, const SAMPLE_RATE: u32> {
    data: Vec<Sample>,
}

impl<Sample, const CHANNELS: usize, const SAMPLE_RATE: u32>
    AudioBuffer<Sample, CHANNELS, SAMPLE_RATE>
{
    /// Create a new audio buffer from raw interleaved samples.
    ///
    /// Returns an error if the data length is not a multiple of the channel count.
    pub fn new(data: Vec<Sample>) -> Result<Self> {
        if !data.is_empty() && data.len() % CHANNELS != 0 {
            anyhow::bail!(
                "Data length {} must be a multiple of channels {}",
                data.len(),
                CHANNELS
            );
        }
        Ok(Self { data })
    }

    /// Returns an iterator over the samples of a specific channel.
    pub fn iter_channel(&self, channel_idx: usize) -> impl Iterator<Item = &Sample> {
        assert!(
            channel_idx < CHANNELS,
            "Channel index {} out of bounds (max {})",
            channel_idx,
            CHANNELS - 1
        );
        self.data.iter().skip(channel_idx).step_by(CHANNELS)
    }

    /// Returns the number of samples per channel.
    pub fn samples_per_channel(&self) -> usize {
        self.data.len() / CHANNELS
    }

    /// Returns the number of channels.
    pub const fn channels(&self) -> usize {
        CHANNELS
    }

    /// Returns the sample rate.
    pub const fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    /// Access the underlying raw sample data.
    pub fn data(&self) -> &[Sample] {
        &self.data
    }

    /// Access the underlying raw sample data mutably.
    pub fn data_mut(&mut self) -> &mut [Sample] {
        &mut self.data
    }

    /// Consumes the buffer and returns the raw vector.
    pub fn into_inner(self) -> Vec<Sample> {
        self.data
    }
}

/// A compressed audio frame for network transmission.
///
/// Carries one encoded codec packet together with the metadata a receiver
/// needs for ordering and playout scheduling.
#[derive(Archive, Deserialize, Serialize, Debug, Clone, PartialEq)]
#[rkyv(compare(PartialEq))]
pub struct EncodedFrame {
    /// Monotonic sequence number for packet ordering and loss detection
    pub sequence_number: u64,

    /// RTP timestamp of the first PCM sample that went into the payload
    pub timestamp: u32,

    /// Encoded codec payload
    pub payload: Vec<u8>,
}

impl EncodedFrame {
    pub fn new(sequence_number: u64, timestamp: u32, payload: Vec<u8>) -> Self {
        Self {
            sequence_number,
            timestamp,
            payload,
        }
    }

    /// Serialize the frame using rkyv
    pub fn serialize(&self) -> Result<Vec<u8>> {
        rkyv::to_bytes::<rkyv::rancor::Error>(self)
            .map(|bytes| bytes.to_vec())
            .context("Serialization error")
    }

    /// Deserialize a frame from bytes using rkyv
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        rkyv::from_bytes::<EncodedFrame, rkyv::rancor::Error>(bytes)
            .context("Deserialization error")
    }
}
