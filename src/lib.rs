//! Lyra speech codec adapters for real-time audio pipelines.
//!
//! Lyra itself (feature extraction, entropy coding, neural vocoder) lives in
//! an external library reached through the [`backend`] traits. This crate is
//! the glue around it:
//!
//! - [`backend`] - The opaque codec contract plus a byte-per-sample
//!   pass-through backend for wiring and tests
//! - [`codec`] - Encoder/decoder adapters, SDP format negotiation, and the
//!   codec registry
//! - [`audio`] - PCM buffer types, the frame assembler, and the encoded
//!   network frame
//! - [`pipeline`] - The [`Node`](pipeline::Node) trait the adapters plug into

pub mod audio;
pub mod backend;
pub mod codec;
pub mod pipeline;

pub use audio::frame::{AudioBuffer, EncodedFrame};
pub use audio::sample::AudioSample;
pub use backend::{BackendParams, DecoderBackend, EncoderBackend};
pub use codec::decoder::{LyraDecoder, LyraDecoderNode};
pub use codec::encoder::{LyraEncoder, LyraEncoderNode, LyraPacket};
pub use pipeline::Node;
