//! Mono signal graph: wires a raw device stream into a mono-locked
//! destination.
//!
//! The builder inspects the *reported* channel layout once, at build time,
//! and commits to one of two routes:
//!
//! ```text
//! reported mono:    [source] ──────────────────────────→ [destination]
//! reported stereo:  [source] → [splitter] → [gain L=1.0] → [destination]
//! ```
//!
//! The stereo route taps the left channel alone; the right channel is
//! discarded outright, never averaged into the output. The destination is
//! locked to a single output channel regardless of what the device actually
//! delivers, so the emitted stream is unambiguously mono even when hardware
//! reports one layout and produces another.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::models::audio::{AudioFrame, FrameRead, StreamConstraints, TrackSettings};
use crate::models::error::CaptureError;
use crate::traits::input::{ContextState, InputDeviceProvider, InputStream, SignalContext};

/// Routing strategy between source and destination. Exactly one variant is
/// active per graph, chosen once at build time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MonoRoute {
    /// Reported-mono input wired straight through, no synthetic mixing.
    PassThrough,

    /// Input split into discrete channels; channel 0 alone feeds the
    /// destination through a unity gain stage.
    SplitLeft { gain: f32 },
}

impl MonoRoute {
    fn apply(&self, frame: AudioFrame) -> AudioFrame {
        match *self {
            MonoRoute::PassThrough => frame,
            MonoRoute::SplitLeft { gain } => {
                let stride = usize::from(frame.channels.max(1));
                let left = frame
                    .samples
                    .iter()
                    .step_by(stride)
                    .map(|sample| sample * gain)
                    .collect();
                AudioFrame::mono(left)
            }
        }
    }
}

/// The destination leg of the graph.
///
/// Configured for exactly one output channel, explicit channel-count mode,
/// and speakers interpretation, independent of host or device defaults. A
/// frame that is still multi-channel when it arrives here (a pass-through
/// route fed by a device that reported mono but delivers more) is collapsed
/// with the standard speakers downmix.
struct MonoDestination;

impl MonoDestination {
    const CHANNEL_COUNT: u16 = 1;

    fn emit(frame: AudioFrame) -> Vec<f32> {
        if frame.channels <= 1 {
            frame.samples
        } else {
            speakers_collapse(&frame.samples, usize::from(frame.channels))
        }
    }
}

/// Speakers-interpretation collapse: average the channels of each interleaved
/// frame.
fn speakers_collapse(samples: &[f32], channels: usize) -> Vec<f32> {
    let frame_count = samples.len() / channels;
    let scale = 1.0 / channels as f32;
    let mut mono = Vec::with_capacity(frame_count);
    for frame in 0..frame_count {
        let mut sum = 0.0f32;
        for ch in 0..channels {
            sum += samples[frame * channels + ch];
        }
        mono.push(sum * scale);
    }
    mono
}

/// Connection from the raw source into the destination. Severed on teardown,
/// after which every pull reports the stream as ended.
struct SourceLink {
    stream: Arc<dyn InputStream>,
    connected: AtomicBool,
}

/// Cheap-to-clone view of the graph's mono output, handed to recorders.
///
/// Pulling routes one raw frame through the active route and the mono-locked
/// destination, yielding a single-channel frame.
#[derive(Clone)]
pub struct MonoStream {
    link: Arc<SourceLink>,
    route: MonoRoute,
    sample_rate: u32,
}

impl MonoStream {
    /// Pull the next mono frame, waiting at most `timeout` for the device.
    pub fn pull(&self, timeout: Duration) -> FrameRead {
        if !self.link.connected.load(Ordering::Acquire) {
            return FrameRead::Ended;
        }
        match self.link.stream.next_frame(timeout) {
            FrameRead::Frame(frame) => {
                let routed = self.route.apply(frame);
                FrameRead::Frame(AudioFrame::mono(MonoDestination::emit(routed)))
            }
            other => other,
        }
    }

    /// Device sample rate of the frames this stream emits.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Always 1: the destination is mono-locked.
    pub fn channel_count(&self) -> u16 {
        MonoDestination::CHANNEL_COUNT
    }
}

/// An assembled graph: raw stream, processing context, and the active route.
///
/// Exclusively owned by the capture that created it and destroyed exactly
/// once via [`AudioGraphHandle::teardown`].
pub struct AudioGraphHandle {
    link: Arc<SourceLink>,
    context: Box<dyn SignalContext>,
    route: MonoRoute,
    settings: TrackSettings,
}

impl AudioGraphHandle {
    /// The mono output stream recorders bind to.
    pub fn mono_stream(&self) -> MonoStream {
        MonoStream {
            link: Arc::clone(&self.link),
            route: self.route,
            sample_rate: self.settings.sample_rate,
        }
    }

    /// Nominal rate of the processing context, reported on record branches
    /// where no decode supplies an authoritative one.
    pub fn context_sample_rate(&self) -> u32 {
        self.context.sample_rate()
    }

    pub(crate) fn route(&self) -> MonoRoute {
        self.route
    }

    /// Tear the graph down: sever the source connection, stop every device
    /// track, close the context if not already closed.
    ///
    /// Every step is best-effort and isolated: a failure is logged and never
    /// blocks the remaining steps or propagates. Consuming `self` makes a
    /// second teardown unrepresentable; the controller invokes this exactly
    /// once per build, on success and error paths alike.
    pub fn teardown(mut self) {
        self.link.connected.store(false, Ordering::Release);
        if let Err(e) = self.link.stream.stop_tracks() {
            log::warn!("teardown: failed to stop input tracks: {e}");
        }
        if self.context.state() != ContextState::Closed {
            if let Err(e) = self.context.close() {
                log::warn!("teardown: failed to close processing context: {e}");
            }
        }
    }
}

/// Build the mono signal graph for one capture.
///
/// Acquires the raw stream, creates the processing context (resuming it if it
/// starts suspended, so the first audio is not dropped), then picks the route
/// from the reported channel count: 1 means pass-through; stereo or unknown
/// counts take the split-left branch.
///
/// If anything fails after the stream was acquired, the partially built graph
/// is dismantled before returning, so no device handle leaks on error paths.
pub fn build(
    provider: &dyn InputDeviceProvider,
    constraints: &StreamConstraints,
) -> Result<AudioGraphHandle, CaptureError> {
    let stream: Arc<dyn InputStream> = Arc::from(provider.acquire_stream(constraints)?);

    let mut context = match provider.create_context() {
        Ok(context) => context,
        Err(e) => {
            abort_build(&stream, None);
            return Err(e);
        }
    };
    if context.state() == ContextState::Suspended {
        if let Err(e) = context.resume() {
            abort_build(&stream, Some(context.as_mut()));
            return Err(e);
        }
    }

    let settings = stream.settings();
    let route = if settings.channel_count == 1 {
        MonoRoute::PassThrough
    } else {
        MonoRoute::SplitLeft { gain: 1.0 }
    };
    log::debug!(
        "mono graph built: reported_channels={} device_rate={} route={route:?}",
        settings.channel_count,
        settings.sample_rate,
    );

    Ok(AudioGraphHandle {
        link: Arc::new(SourceLink {
            stream,
            connected: AtomicBool::new(true),
        }),
        context,
        route,
        settings,
    })
}

/// Best-effort dismantling of a graph that failed mid-build.
fn abort_build(stream: &Arc<dyn InputStream>, context: Option<&mut dyn SignalContext>) {
    if let Err(e) = stream.stop_tracks() {
        log::warn!("aborted build: failed to stop input tracks: {e}");
    }
    if let Some(context) = context {
        if context.state() != ContextState::Closed {
            if let Err(e) = context.close() {
                log::warn!("aborted build: failed to close processing context: {e}");
            }
        }
    }
}
