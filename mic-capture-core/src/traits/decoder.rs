use crate::models::audio::DecodedAudio;
use crate::models::error::CaptureError;

/// Provider of decode contexts for the WAV finalization branch.
///
/// The encoder opens a fresh context per decode and closes it on every path,
/// success or failure. The capture context may already be torn down by
/// finalization time, so it is never reused here.
pub trait AudioDecoder: Send + Sync {
    fn open_context(&self) -> Result<Box<dyn DecodeContext>, CaptureError>;
}

/// A single-use decoding context.
pub trait DecodeContext: Send {
    /// Decode an opaque container into PCM with the container's own
    /// (authoritative) sample rate.
    fn decode(&mut self, data: &[u8]) -> Result<DecodedAudio, CaptureError>;

    /// Release the context. Best-effort: failures are logged by the
    /// implementation, never propagated.
    fn close(&mut self);
}
