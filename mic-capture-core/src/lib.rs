//! # mic-capture-core
//!
//! Platform-agnostic microphone capture pipeline.
//!
//! Builds a mono signal graph over an input device, records it through a
//! platform recorder, and finalizes each capture into one base64-encoded
//! [`EncodedRecord`] handed to a host sink. Platform backends implement the
//! provider traits and plug into the generic [`CaptureController`].
//!
//! ## Architecture
//!
//! ```text
//! mic-capture-core (this crate)
//! ├── traits/       ← InputDeviceProvider, RecorderProvider, AudioDecoder, RecordSink
//! ├── models/       ← CaptureError, CaptureConfig, EncodedRecord, recorder events
//! ├── graph/        ← mono signal graph builder (pass-through / split-left routing)
//! ├── processing/   ← mime tables, WAV container writing, record encoding
//! ├── session/      ← CaptureSession, CaptureController (state machine)
//! └── view.rs       ← host-facing control description
//! ```

pub mod graph;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;
pub mod view;

// Re-export key types at crate root for convenience.
pub use graph::{AudioGraphHandle, MonoStream};
pub use models::audio::{
    AudioFrame, DecodedAudio, FrameRead, StreamConstraints, TrackSettings, FRAME_PULL_INTERVAL,
};
pub use models::config::{AudioFormat, CaptureConfig};
pub use models::error::CaptureError;
pub use models::events::RecorderEvent;
pub use models::record::EncodedRecord;
pub use session::capture::{CaptureSession, TARGET_BITRATE};
pub use session::controller::{CaptureController, CapturePhase};
pub use traits::decoder::{AudioDecoder, DecodeContext};
pub use traits::input::{ContextState, InputDeviceProvider, InputStream, SignalContext};
pub use traits::recorder::{Recorder, RecorderOptions, RecorderProvider};
pub use traits::sink::RecordSink;
pub use view::{render_target, TargetView};
