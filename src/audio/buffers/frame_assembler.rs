//! Accumulates PCM samples into exact fixed-size codec frames.
//!
//! Lyra consumes whole frames (e.g. 640 samples for 40 ms of 16 kHz mono),
//! while a host pipeline typically delivers audio in 10 ms chunks. The
//! assembler buffers incoming chunks and hands out exactly one frame's worth
//! of samples once enough have arrived, remembering the RTP timestamp of the
//! first buffered sample so the eventual packet can be stamped with it.

/// Fixed-size frame accumulation buffer.
///
/// `frame_samples` counts interleaved samples across all channels; the
/// channel count is needed to advance the per-channel RTP timestamp when a
/// frame is drained while more samples remain pending.
pub struct FrameAssembler<Sample> {
    pending: Vec<Sample>,
    frame_samples: usize,
    channels: usize,
    first_timestamp: u32,
}

impl<Sample: Copy> FrameAssembler<Sample> {
    pub fn new(frame_samples: usize, channels: usize) -> Self {
        assert!(frame_samples > 0, "frame size must be non-zero");
        assert!(channels > 0, "channel count must be non-zero");
        assert_eq!(
            frame_samples % channels,
            0,
            "frame size must be a whole number of sample groups"
        );
        Self {
            pending: Vec::with_capacity(frame_samples),
            frame_samples,
            channels,
            first_timestamp: 0,
        }
    }

    /// Append a chunk of interleaved samples.
    ///
    /// `timestamp` is the RTP timestamp of `samples[0]`; it is recorded only
    /// when the pending buffer is empty, so a frame always carries the
    /// timestamp of its first sample.
    pub fn push(&mut self, timestamp: u32, samples: &[Sample]) {
        if self.pending.is_empty() {
            self.first_timestamp = timestamp;
        }
        self.pending.extend_from_slice(samples);
    }

    /// Drain one full frame if enough samples are buffered.
    ///
    /// Returns the frame together with the RTP timestamp of its first sample.
    /// Leftover samples stay pending and their timestamp is advanced by one
    /// frame's per-channel duration.
    pub fn pop_frame(&mut self) -> Option<(u32, Vec<Sample>)> {
        if self.pending.len() < self.frame_samples {
            return None;
        }
        let frame: Vec<Sample> = self.pending.drain(..self.frame_samples).collect();
        let timestamp = self.first_timestamp;
        self.first_timestamp =
            timestamp.wrapping_add((self.frame_samples / self.channels) as u32);
        Some((timestamp, frame))
    }

    /// Number of samples currently buffered.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Interleaved samples per frame.
    pub fn frame_samples(&self) -> usize {
        self.frame_samples
    }

    /// Discard any buffered samples.
    pub fn reset(&mut self) {
        self.pending.clear();
    }
}
