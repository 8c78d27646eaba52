use anyhow::{Context, Result};
use tracing::{error, info};

use lyra_rtc::backend::{PassthroughDecoder, PassthroughEncoder};
use lyra_rtc::codec::registry::{
    append_supported_encoders, make_audio_decoder, make_audio_encoder, sdp_to_decoder_config,
    sdp_to_encoder_config, set_default_model_path,
};
use lyra_rtc::codec::DEFAULT_PAYLOAD_TYPE;
use lyra_rtc::{EncodedFrame, LyraPacket};

const SAMPLE_RATE_HZ: u32 = 16000;
const CHUNK_SAMPLES: usize = 160; // 10 ms of mono PCM

/// One second of a 440 Hz tone.
fn sine_pcm() -> Vec<i16> {
    (0..SAMPLE_RATE_HZ as usize)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE_HZ as f64;
            ((t * 440.0 * 2.0 * std::f64::consts::PI).sin() * 8000.0) as i16
        })
        .collect()
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    if let Err(e) = run() {
        error!("Demo error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let model_path = std::env::args().nth(1).unwrap_or_else(|| "model_coeffs".to_string());
    set_default_model_path(model_path)?;

    let mut specs = Vec::new();
    append_supported_encoders(&mut specs);
    for spec in &specs {
        info!(
            "Advertising {}/{}/{} at {} bps",
            spec.format.name,
            spec.format.clockrate_hz,
            spec.format.num_channels,
            spec.info.default_bitrate_bps
        );
    }

    let format = specs[0].format.clone();
    let encoder_config =
        sdp_to_encoder_config(&format).context("Canonical format rejected by encoder")?;
    let decoder_config =
        sdp_to_decoder_config(&format).context("Canonical format rejected by decoder")?;

    let mut encoder =
        make_audio_encoder::<PassthroughEncoder>(&encoder_config, DEFAULT_PAYLOAD_TYPE)?;
    let mut decoder = make_audio_decoder::<PassthroughDecoder>(&decoder_config)?;

    let pcm = sine_pcm();
    let mut sequence_number = 0u64;
    let mut timestamp = 0u32;
    let mut packets = 0usize;
    let mut payload_bytes = 0usize;
    let mut decoded_samples = 0usize;

    for chunk in pcm.chunks(CHUNK_SAMPLES) {
        let packet = encoder.encode(timestamp, chunk)?;
        timestamp = timestamp.wrapping_add(chunk.len() as u32);

        let Some(packet) = packet else { continue };

        // Over the wire and back.
        let wire = packet.to_frame(sequence_number).serialize()?;
        sequence_number += 1;

        let frame = EncodedFrame::deserialize(&wire)?;
        let received = LyraPacket::from_frame(frame, DEFAULT_PAYLOAD_TYPE);

        packets += 1;
        payload_bytes += received.payload.len();
        decoded_samples += decoder.decode(&received.payload)?.len();
    }

    // A lost packet is concealed from the decoder alone.
    decoded_samples += decoder.decode_missing()?.len();

    info!(
        "Encoded {} packets ({} payload bytes), decoded {} samples (incl. one concealed frame)",
        packets, payload_bytes, decoded_samples
    );
    Ok(())
}
