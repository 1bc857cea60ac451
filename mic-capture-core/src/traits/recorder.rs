use crossbeam_channel::Sender;

use crate::graph::MonoStream;
use crate::models::error::CaptureError;
use crate::models::events::RecorderEvent;

/// Construction options for a platform recorder.
///
/// `Default` means "platform's choice": no preferred mime, no bitrate tuning.
/// The session only fills the bitrate fields when a preferred mime was
/// resolved, so fallback recorders run untuned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecorderOptions {
    /// Preferred container mime, e.g. `audio/webm;codecs=opus`.
    pub mime_type: Option<String>,

    /// Target audio bitrate in bits per second.
    pub audio_bits_per_second: Option<u32>,

    /// Target overall bitrate in bits per second.
    pub bits_per_second: Option<u32>,
}

/// Factory for platform recorders.
pub trait RecorderProvider: Send + Sync {
    /// Whether the platform can encode into the given container mime.
    fn is_mime_supported(&self, mime: &str) -> bool;

    /// Construct a recorder bound to `stream`, emitting events into `events`.
    ///
    /// A capability mismatch with `options.mime_type` fails with
    /// [`CaptureError::RecorderUnsupported`]; the session retries with
    /// default options before giving up.
    fn create_recorder(
        &self,
        stream: MonoStream,
        options: RecorderOptions,
        events: Sender<RecorderEvent>,
    ) -> Result<Box<dyn Recorder>, CaptureError>;
}

/// A recorder bound to one mono stream.
///
/// Implementations emit zero or more [`RecorderEvent::Data`] slices followed
/// by exactly one [`RecorderEvent::Stopped`] once stopped (or once the stream
/// ends on its own). A recorder that never emits `Stopped` wedges its
/// session; there is deliberately no timeout on the consuming side.
pub trait Recorder: Send {
    /// Begin encoding. Called once, immediately after construction.
    fn start(&mut self) -> Result<(), CaptureError>;

    /// Request stop and flush. Must be a no-op when not actively recording:
    /// never errors, never restarts capture.
    fn stop(&mut self);

    /// Whether the recorder is actively recording.
    fn is_active(&self) -> bool;

    /// The container mime actually negotiated at construction, if the
    /// platform can report one.
    fn mime_type(&self) -> Option<String>;
}
