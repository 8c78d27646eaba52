//! Codec registration: format negotiation, capability advertisement, and
//! adapter factories.
//!
//! This is the surface a host's codec factory talks to. Negotiation works on
//! already-parsed [`SdpAudioFormat`]s; construction validates the config,
//! creates the backend, and wires the adapter, so an adapter that exists
//! always has a live backend behind it.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Result;
use tracing::debug;

use super::decoder::{DecoderConfig, LyraDecoder};
use super::encoder::{EncoderConfig, LyraEncoder};
use super::sdp::{AudioCodecInfo, AudioCodecSpec, SdpAudioFormat};
use super::{DEFAULT_SAMPLE_RATE_HZ, SDP_NAME};
use crate::backend::{DecoderBackend, EncoderBackend};

static DEFAULT_MODEL_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Set the process-wide default location of the Lyra model weights.
///
/// Configs built by [`Default`] or by the `sdp_to_*` functions pick this up.
/// Can be set once; later calls fail.
pub fn set_default_model_path(path: impl Into<PathBuf>) -> Result<()> {
    let path = path.into();
    DEFAULT_MODEL_PATH
        .set(path)
        .map_err(|rejected| anyhow::anyhow!("Model path already set (rejected {:?})", rejected))
}

/// The process-wide default model path, if one has been set.
pub fn default_model_path() -> Option<&'static Path> {
    DEFAULT_MODEL_PATH.get().map(PathBuf::as_path)
}

/// Derive an encoder config from a negotiated format.
///
/// Lyra only comes in one shape: 16 kHz clockrate, mono encode. The `usedtx`
/// fmtp parameter is honored when present; everything else about the format
/// maps to the canonical config.
pub fn sdp_to_encoder_config(format: &SdpAudioFormat) -> Option<EncoderConfig> {
    if !format.matches_name(SDP_NAME)
        || format.clockrate_hz != DEFAULT_SAMPLE_RATE_HZ
        || format.num_channels < 1
    {
        debug!(
            "Rejecting encoder format {}/{}/{}",
            format.name, format.clockrate_hz, format.num_channels
        );
        return None;
    }

    let dtx = format.param("usedtx") == Some("1");
    Some(EncoderConfig {
        num_channels: 1,
        dtx,
        ..EncoderConfig::default()
    })
}

/// Derive a decoder config from a negotiated format.
///
/// The decoder follows the remote's channel count; everything else is the
/// canonical config.
pub fn sdp_to_decoder_config(format: &SdpAudioFormat) -> Option<DecoderConfig> {
    if !format.matches_name(SDP_NAME) || format.num_channels < 1 {
        debug!(
            "Rejecting decoder format {}/{}/{}",
            format.name, format.clockrate_hz, format.num_channels
        );
        return None;
    }

    Some(DecoderConfig {
        num_channels: format.num_channels,
        ..DecoderConfig::default()
    })
}

/// Advertise the encode capability.
pub fn append_supported_encoders(specs: &mut Vec<AudioCodecSpec>) {
    specs.push(AudioCodecSpec {
        format: SdpAudioFormat::lyra(),
        info: AudioCodecInfo::lyra(),
    });
}

/// Advertise the decode capability.
pub fn append_supported_decoders(specs: &mut Vec<AudioCodecSpec>) {
    specs.push(AudioCodecSpec {
        format: SdpAudioFormat::lyra(),
        info: AudioCodecInfo::lyra(),
    });
}

/// Capability record for a validated encoder config.
pub fn query_audio_encoder(config: &EncoderConfig) -> Result<AudioCodecInfo> {
    config.validate()?;
    Ok(AudioCodecInfo::lyra())
}

/// Build an encoder adapter over backend `B` for a validated config.
pub fn make_audio_encoder<B: EncoderBackend>(
    config: &EncoderConfig,
    payload_type: u8,
) -> Result<LyraEncoder<B>> {
    let config = EncoderConfig {
        payload_type,
        ..config.clone()
    };
    LyraEncoder::new(&config)
}

/// Build a decoder adapter over backend `B` for a validated config.
pub fn make_audio_decoder<B: DecoderBackend>(config: &DecoderConfig) -> Result<LyraDecoder<B>> {
    LyraDecoder::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{PassthroughDecoder, PassthroughEncoder};
    use crate::codec::DEFAULT_PAYLOAD_TYPE;

    fn encoder_config() -> EncoderConfig {
        EncoderConfig {
            model_path: PathBuf::from("model_coeffs"),
            ..Default::default()
        }
    }

    fn decoder_config() -> DecoderConfig {
        DecoderConfig {
            model_path: PathBuf::from("model_coeffs"),
            ..Default::default()
        }
    }

    #[test]
    fn test_encoder_negotiation_accepts_lyra() {
        let config = sdp_to_encoder_config(&SdpAudioFormat::lyra()).unwrap();
        assert_eq!(config.num_channels, 1);
        assert_eq!(config.frame_size_ms, 40);
        assert_eq!(config.bitrate, 3000);
        assert!(!config.dtx);
    }

    #[test]
    fn test_encoder_negotiation_rejects_mismatches() {
        let wrong_rate = SdpAudioFormat::new("lyra", 48000, 1);
        assert!(sdp_to_encoder_config(&wrong_rate).is_none());

        let wrong_name = SdpAudioFormat::new("opus", 16000, 1);
        assert!(sdp_to_encoder_config(&wrong_name).is_none());

        let no_channels = SdpAudioFormat::new("lyra", 16000, 0);
        assert!(sdp_to_encoder_config(&no_channels).is_none());
    }

    #[test]
    fn test_encoder_negotiation_honors_usedtx() {
        let mut format = SdpAudioFormat::lyra();
        format
            .parameters
            .insert("usedtx".to_string(), "1".to_string());

        let config = sdp_to_encoder_config(&format).unwrap();
        assert!(config.dtx);
    }

    #[test]
    fn test_decoder_negotiation_follows_channels() {
        let format = SdpAudioFormat::new("lyra", 16000, 2);
        let config = sdp_to_decoder_config(&format).unwrap();
        assert_eq!(config.num_channels, 2);

        assert!(sdp_to_decoder_config(&SdpAudioFormat::new("opus", 16000, 1)).is_none());
    }

    #[test]
    fn test_capability_advertisement() {
        let mut specs = Vec::new();
        append_supported_encoders(&mut specs);
        append_supported_decoders(&mut specs);

        assert_eq!(specs.len(), 2);
        for spec in &specs {
            assert!(spec.format.matches_name("lyra"));
            assert_eq!(spec.info.sample_rate_hz, 16000);
            assert_eq!(spec.info.default_bitrate_bps, 3000);
        }
    }

    #[test]
    fn test_query_requires_valid_config() {
        let info = query_audio_encoder(&encoder_config()).unwrap();
        assert_eq!(info.num_channels, 1);

        let mut broken = encoder_config();
        broken.bitrate = 9000;
        assert!(query_audio_encoder(&broken).is_err());
    }

    #[test]
    fn test_factories_wire_adapters() {
        let encoder =
            make_audio_encoder::<PassthroughEncoder>(&encoder_config(), DEFAULT_PAYLOAD_TYPE)
                .unwrap();
        assert_eq!(encoder.payload_type(), DEFAULT_PAYLOAD_TYPE);

        let decoder = make_audio_decoder::<PassthroughDecoder>(&decoder_config()).unwrap();
        assert_eq!(decoder.sample_rate_hz(), 16000);
    }

    #[test]
    fn test_factory_rejects_invalid_config() {
        let mut config = encoder_config();
        config.frame_size_ms = 35;
        assert!(make_audio_encoder::<PassthroughEncoder>(&config, DEFAULT_PAYLOAD_TYPE).is_err());
    }

    #[test]
    fn test_default_model_path_set_once() {
        // The global is process-wide; this is the only test that touches it.
        assert!(set_default_model_path("model_coeffs").is_ok());
        assert_eq!(
            default_model_path(),
            Some(Path::new("model_coeffs"))
        );
        assert!(set_default_model_path("elsewhere").is_err());
    }
}
