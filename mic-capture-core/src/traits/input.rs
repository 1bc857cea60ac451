use std::time::Duration;

use crate::models::audio::{FrameRead, StreamConstraints, TrackSettings};
use crate::models::error::CaptureError;

/// Lifecycle state of a processing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    /// Created but not yet producing; must be resumed before routing.
    Suspended,
    Running,
    Closed,
}

/// Interface to the platform's audio input system.
///
/// Implemented by:
/// - `CpalInputProvider` (native, via cpal)
/// - mock providers in the test suite
///
/// Any provider that can hand out a stream-like handle with inspectable
/// negotiated settings, plus a processing context, is sufficient.
pub trait InputDeviceProvider: Send + Sync {
    /// Acquire a raw input stream under the given constraints.
    ///
    /// Permission denial and missing hardware both surface as
    /// [`CaptureError::DeviceUnavailable`].
    fn acquire_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn InputStream>, CaptureError>;

    /// Create a processing context for routing the acquired stream.
    fn create_context(&self) -> Result<Box<dyn SignalContext>, CaptureError>;
}

/// A live, device-backed input stream.
///
/// Frames are pulled, not pushed: device backends pump their callback data
/// into an internal queue and hand it out here, so consumers control pacing.
pub trait InputStream: Send + Sync {
    /// The settings the device negotiated for this stream.
    fn settings(&self) -> TrackSettings;

    /// Pull the next interleaved frame, waiting at most `timeout`.
    fn next_frame(&self, timeout: Duration) -> FrameRead;

    /// Stop every track backing this stream. Further pulls return
    /// [`FrameRead::Ended`]. Called once during graph teardown.
    fn stop_tracks(&self) -> Result<(), CaptureError>;
}

/// A processing context owned by one audio graph.
pub trait SignalContext: Send {
    fn state(&self) -> ContextState;

    /// Nominal sample rate of the context. Used as the reported record rate
    /// on branches where no decode produces an authoritative one.
    fn sample_rate(&self) -> u32;

    /// Bring a suspended context to `Running`. Must not silently drop audio:
    /// the graph builder resumes before wiring any route.
    fn resume(&mut self) -> Result<(), CaptureError>;

    /// Close the context, releasing platform resources. Closing an already
    /// closed context is a no-op.
    fn close(&mut self) -> Result<(), CaptureError>;
}
