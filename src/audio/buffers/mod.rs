//! Audio buffering for the encode path.
//!
//! - [`FrameAssembler`] - Accumulates PCM chunks into exact fixed-size codec
//!   frames

pub mod frame_assembler;

pub use frame_assembler::FrameAssembler;
