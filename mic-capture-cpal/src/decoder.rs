//! hound-backed decoder provider for the WAV finalization branch.

use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use mic_capture_core::{AudioDecoder, CaptureError, DecodeContext, DecodedAudio};

/// Decoder provider that understands WAV containers and nothing else.
///
/// Anything the capture produced in another container fails with
/// [`CaptureError::DecodeFailed`], which drives the core's passthrough
/// fallback on the WAV branch.
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn open_context(&self) -> Result<Box<dyn DecodeContext>, CaptureError> {
        Ok(Box::new(HoundContext { closed: false }))
    }
}

/// Single-use decode context.
struct HoundContext {
    closed: bool,
}

impl DecodeContext for HoundContext {
    fn decode(&mut self, data: &[u8]) -> Result<DecodedAudio, CaptureError> {
        if self.closed {
            return Err(CaptureError::ContextFailed("decode context closed".into()));
        }
        let reader = WavReader::new(Cursor::new(data))
            .map_err(|e| CaptureError::DecodeFailed(e.to_string()))?;
        let spec = reader.spec();

        let samples = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<Vec<f32>, _>>()
                .map_err(|e| CaptureError::DecodeFailed(e.to_string()))?,
            SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<Vec<f32>, _>>()
                    .map_err(|e| CaptureError::DecodeFailed(e.to_string()))?
            }
        };

        Ok(DecodedAudio {
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        })
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
