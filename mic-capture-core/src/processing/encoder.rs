//! Final payload assembly: captured chunks in, one [`EncodedRecord`] out.
//!
//! Encoding never fails. The WAV branch recovers from decode errors by
//! delivering the captured container untouched, and every other branch is a
//! relabeling pass over bytes the recorder already produced.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;

use crate::models::audio::DecodedAudio;
use crate::models::config::AudioFormat;
use crate::models::error::CaptureError;
use crate::models::record::{next_record_id, EncodedRecord};
use crate::processing::mime::{fallback_blob_mime, format_from_mime};
use crate::processing::wav;
use crate::traits::decoder::AudioDecoder;

/// Nominal bytes-per-sample reported on passthrough branches, where the
/// payload is a compressed container and no PCM width actually exists.
const NOMINAL_SAMPLE_WIDTH: u16 = 2;

/// Produce the final record for one completed capture.
///
/// `recorder_mime` is the mime the recorder actually negotiated, when it
/// exposes one; the reported `format` is re-derived from it rather than
/// trusted from the request, since recorder construction may have fallen back
/// to a different codec.
///
/// The WAV branch decodes through a fresh context (the capture context may
/// already be torn down by now) and re-encodes the PCM as float WAV with the
/// decoder's authoritative sample rate. If the decode fails, the captured
/// bytes ship as-is under their re-derived format, with the context's nominal
/// rate as the best remaining estimate.
pub fn encode(
    chunks: &[Bytes],
    requested: AudioFormat,
    recorder_mime: Option<&str>,
    context_sample_rate: u32,
    decoder: &dyn AudioDecoder,
) -> EncodedRecord {
    let blob = assemble(chunks);
    let mime = recorder_mime
        .filter(|m| !m.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| fallback_blob_mime(requested).to_owned());

    if requested == AudioFormat::Wav {
        match decode_to_pcm(decoder, &blob) {
            Ok(pcm) => {
                let payload = wav::encode_float_wav(&pcm);
                return finish(
                    AudioFormat::Wav,
                    None,
                    &payload,
                    pcm.sample_rate,
                    wav::FLOAT_SAMPLE_WIDTH,
                );
            }
            Err(e) => {
                log::warn!("wav decode failed, delivering captured container as-is: {e}");
            }
        }
    }

    let format = format_from_mime(&mime);
    let container = (format == AudioFormat::Aac).then(|| mime.clone());
    finish(
        format,
        container,
        &blob,
        context_sample_rate,
        NOMINAL_SAMPLE_WIDTH,
    )
}

fn assemble(chunks: &[Bytes]) -> Vec<u8> {
    let total = chunks.iter().map(Bytes::len).sum();
    let mut blob = Vec::with_capacity(total);
    for chunk in chunks {
        blob.extend_from_slice(chunk);
    }
    blob
}

/// Run one decode through a context that is closed on every outcome.
fn decode_to_pcm(decoder: &dyn AudioDecoder, blob: &[u8]) -> Result<DecodedAudio, CaptureError> {
    let mut context = decoder.open_context()?;
    let decoded = context.decode(blob);
    context.close();
    decoded
}

fn finish(
    format: AudioFormat,
    container: Option<String>,
    payload: &[u8],
    sample_rate: u32,
    sample_width: u16,
) -> EncodedRecord {
    let record = EncodedRecord {
        id: next_record_id(),
        format,
        container,
        audio_base64: STANDARD.encode(payload),
        sample_rate,
        sample_width,
    };
    log::debug!(
        "encoded record id={} format={} payload_bytes={}",
        record.id,
        record.format,
        payload.len(),
    );
    record
}
