use bytes::Bytes;

use super::error::CaptureError;

/// Events a platform recorder emits while bound to a capture session.
///
/// Events travel over a bounded channel and are consumed on the controller's
/// thread in arrival order; that order is what makes the final blob a faithful
/// concatenation of the emitted data slices.
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// An encoded container slice. Empty slices are dropped by the session.
    Data(Bytes),

    /// A mid-session device or encoder fault. Logged, never fatal.
    Error(CaptureError),

    /// The recorder finished flushing. No further `Data` follows; the chunk
    /// sequence freezes when the session observes this.
    Stopped,
}
