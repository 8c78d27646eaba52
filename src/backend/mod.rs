//! The opaque codec backend contract.
//!
//! The actual Lyra implementation (feature extraction, entropy coding, neural
//! vocoder inference) is an external library. This crate only ever talks to
//! it through the two traits below, which mirror the library's surface:
//! `Create`, `Encode` on the encode side; `Create`, `SetEncodedPacket`,
//! `DecodeSamples` on the decode side.
//!
//! [`passthrough`] provides a dependency-free reference backend so the
//! adapters can be wired and tested without model weights.

use std::path::PathBuf;

use anyhow::Result;

pub mod passthrough;

pub use passthrough::{PassthroughDecoder, PassthroughEncoder};

/// Parameters handed to a backend at creation time.
#[derive(Debug, Clone)]
pub struct BackendParams {
    pub sample_rate_hz: u32,
    pub num_channels: usize,
    /// Target bitrate in bits per second.
    pub bitrate: u32,
    /// Discontinuous transmission: suppress packets during silence.
    pub dtx: bool,
    /// Directory holding the model weights.
    pub model_path: PathBuf,
}

/// Encode side of the external codec library.
pub trait EncoderBackend: Send + Sized {
    /// Construct an encoder for the given parameters.
    ///
    /// Fails if the parameters are outside what the backend supports or the
    /// model weights cannot be loaded.
    fn create(params: &BackendParams) -> Result<Self>;

    /// Encode exactly one frame of interleaved PCM.
    ///
    /// With DTX enabled the backend may return an empty packet for a silent
    /// frame, meaning "transmit nothing".
    fn encode(&mut self, pcm: &[i16]) -> Result<Vec<u8>>;
}

/// Decode side of the external codec library.
pub trait DecoderBackend: Send + Sized {
    /// Construct a decoder for the given parameters.
    fn create(params: &BackendParams) -> Result<Self>;

    /// Hand the decoder the next encoded packet.
    fn set_encoded_packet(&mut self, packet: &[u8]) -> Result<()>;

    /// Produce `count` interleaved PCM samples.
    ///
    /// Callable without a pending packet, in which case the backend generates
    /// concealment output (comfort noise for DTX gaps, or packet-loss
    /// concealment).
    fn decode_samples(&mut self, count: usize) -> Result<Vec<i16>>;
}
