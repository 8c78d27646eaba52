//! Negotiated audio format and codec capability types.
//!
//! These are the value objects exchanged with the host's negotiation layer:
//! an already-parsed rtpmap entry plus its fmtp parameters, and the
//! capability record a codec advertises about itself. SDP parsing itself is
//! the host's business.

use std::collections::BTreeMap;

use super::{BITRATE_BPS, DEFAULT_FRAME_SIZE_MS, DEFAULT_SAMPLE_RATE_HZ, SDP_NAME};

/// An audio format as negotiated in SDP (one rtpmap entry with its fmtp
/// parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdpAudioFormat {
    /// Codec name as it appears in the rtpmap (matched case-insensitively).
    pub name: String,
    pub clockrate_hz: u32,
    pub num_channels: usize,
    /// fmtp key/value parameters.
    pub parameters: BTreeMap<String, String>,
}

impl SdpAudioFormat {
    pub fn new(name: impl Into<String>, clockrate_hz: u32, num_channels: usize) -> Self {
        Self {
            name: name.into(),
            clockrate_hz,
            num_channels,
            parameters: BTreeMap::new(),
        }
    }

    /// The canonical Lyra advertisement: lyra/16000/1 with a 40 ms minimum
    /// packet time and DTX off.
    pub fn lyra() -> Self {
        let mut format = Self::new(SDP_NAME, DEFAULT_SAMPLE_RATE_HZ, 1);
        format
            .parameters
            .insert("minptime".to_string(), DEFAULT_FRAME_SIZE_MS.to_string());
        format
            .parameters
            .insert("usedtx".to_string(), "0".to_string());
        format
    }

    /// Codec names compare case-insensitively per RFC 4566.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Look up an fmtp parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(String::as_str)
    }
}

/// What a codec is capable of, as advertised to the negotiation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioCodecInfo {
    pub sample_rate_hz: u32,
    pub num_channels: usize,
    pub default_bitrate_bps: u32,
}

impl AudioCodecInfo {
    pub fn lyra() -> Self {
        Self {
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            num_channels: 1,
            default_bitrate_bps: BITRATE_BPS,
        }
    }
}

/// A supported codec: the format it negotiates under plus its capabilities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioCodecSpec {
    pub format: SdpAudioFormat,
    pub info: AudioCodecInfo,
}
