//! Core pipeline trait.
//!
//! This module defines the fundamental abstraction for audio processing:
//!
//! - [`Node`] - A processing unit that transforms input data to output data
//!
//! The codec adapters ([`LyraEncoderNode`](crate::codec::encoder::LyraEncoderNode),
//! [`LyraDecoderNode`](crate::codec::decoder::LyraDecoderNode)) implement this
//! trait so a host pipeline can treat them like any other stage.

/// A processing node that transforms input to output.
///
/// Nodes are the building blocks of pipelines. They receive input data,
/// process it, and optionally produce output data.
pub trait Node: Send + Sync {
    type Input;
    type Output;

    /// Process input data and optionally produce output.
    ///
    /// Returns `None` if the node is buffering data and not ready to emit
    /// output yet, or if the input was dropped after a logged failure.
    fn process(&self, input: Self::Input) -> Option<Self::Output>;
}
