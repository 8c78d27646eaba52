//! Audio data types and buffering for the codec path.
//!
//! # Data Types
//! - [`AudioSample`] - Trait for audio sample types (i16, f32)
//! - [`frame::AudioBuffer`] - A buffer of audio samples (raw PCM data)
//! - [`frame::EncodedFrame`] - A compressed payload with sequence number for
//!   network transport
//!
//! # Buffers
//! - [`buffers::FrameAssembler`] - Accumulates PCM chunks into exact
//!   fixed-size codec frames

pub mod buffers;
pub mod frame;
pub mod sample;

pub use buffers::FrameAssembler;
pub use frame::{AudioBuffer, EncodedFrame};
pub use sample::AudioSample;
