use thiserror::Error;

/// Errors that can occur while driving a capture pipeline.
///
/// Only `DeviceUnavailable` and `ContextFailed` ever abort a start attempt.
/// The remaining variants are recovered internally: an unsupported mime falls
/// back to a default-options recorder, a runtime fault is logged and the
/// session continues, and a failed decode degrades to passthrough delivery.
/// No variant is ever handed to the delivery sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Permission denied, or no usable input device was found.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The recorder provider rejected the preferred container mime.
    #[error("recorder rejected mime {0:?}")]
    RecorderUnsupported(String),

    /// Device or encoder fault reported while a session was active.
    #[error("recorder runtime error: {0}")]
    RecorderRuntime(String),

    /// The assembled container could not be decoded to PCM.
    #[error("audio decode failed: {0}")]
    DecodeFailed(String),

    /// The processing context could not be created, resumed, or closed.
    #[error("audio context error: {0}")]
    ContextFailed(String),

    /// A start request arrived while a capture was already in flight.
    #[error("a capture session is already active")]
    SessionActive,
}
