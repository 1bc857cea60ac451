use std::fmt;

use serde::{Deserialize, Serialize};

/// Target output format for a capture session.
///
/// Drives both the preferred recorder mime and the finalization branch: `Wav`
/// takes the decode-and-re-encode path, `Webm` and `Aac` are passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Webm,
    Wav,
    Aac,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Wav => "wav",
            Self::Aac => "aac",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable per-session configuration supplied by the host.
///
/// Only `format` participates in core invariants; the prompts and the width
/// flag exist for the host-embedding button and are consumed by
/// [`crate::view::render_target`] alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Requested output format (default: webm).
    pub format: AudioFormat,

    /// Button label while idle.
    pub start_prompt: String,

    /// Button label while recording.
    pub stop_prompt: String,

    /// Whether the host button stretches to its container width. UI-only.
    pub use_container_width: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::Webm,
            start_prompt: "Start recording".into(),
            stop_prompt: "Stop recording".into(),
            use_container_width: false,
        }
    }
}

impl CaptureConfig {
    pub fn with_format(format: AudioFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }
}
