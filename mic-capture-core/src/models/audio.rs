use std::time::Duration;

/// Constraints passed to the input device provider when acquiring a stream.
///
/// Adaptive enhancement (echo cancellation, noise suppression, automatic
/// gain) is disabled for capture so the encoder sees a clean signal. Backends
/// that cannot toggle a flag treat it as a hint and document what they
/// actually guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    /// Requested channel count, `None` for the device default.
    pub channel_count: Option<u16>,
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl StreamConstraints {
    /// The constraint set used for every capture: mono hint, all adaptive
    /// enhancement off.
    pub fn clean_capture() -> Self {
        Self {
            channel_count: Some(1),
            echo_cancellation: false,
            noise_suppression: false,
            auto_gain_control: false,
        }
    }
}

/// Settings the device actually negotiated for an acquired stream.
///
/// `channel_count` is what the device *reports*, which the graph builder uses
/// to pick a routing branch; individual frames may still disagree with it on
/// misbehaving hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSettings {
    pub channel_count: u16,
    pub sample_rate: u32,
}

/// One interleaved buffer of samples as delivered by an input stream.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// Interleaved f32 samples, `channels` per sample frame.
    pub samples: Vec<f32>,
    pub channels: u16,
}

impl AudioFrame {
    pub fn mono(samples: Vec<f32>) -> Self {
        Self {
            samples,
            channels: 1,
        }
    }

    /// Number of sample frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }
}

/// Outcome of pulling on an input stream.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameRead {
    Frame(AudioFrame),
    /// Nothing arrived within the pull deadline; the stream is still live.
    TimedOut,
    /// The stream has no more data (tracks stopped or device went away).
    Ended,
}

/// How long recorders wait on a single pull before re-checking their state.
pub const FRAME_PULL_INTERVAL: Duration = Duration::from_millis(50);

/// Raw PCM produced by a decode context, with the authoritative sample rate
/// the decoder established from the container itself.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Interleaved f32 samples in `[-1.0, 1.0]`.
    pub samples: Vec<f32>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl DecodedAudio {
    pub fn frame_count(&self) -> usize {
        self.samples.len() / usize::from(self.channels.max(1))
    }
}
