//! One recorder bound to one mono stream, accumulating encoded chunks.

use bytes::Bytes;
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use uuid::Uuid;

use crate::graph::MonoStream;
use crate::models::config::AudioFormat;
use crate::models::error::CaptureError;
use crate::models::events::RecorderEvent;
use crate::processing::mime::preferred_mime;
use crate::traits::recorder::{Recorder, RecorderOptions, RecorderProvider};

/// Target bitrate in bits per second, applied to both the audio and overall
/// budgets whenever a preferred mime was successfully negotiated. Keeps
/// payload size predictable across platforms.
pub const TARGET_BITRATE: u32 = 128_000;

/// Capacity of the recorder event channel. A recorder blocks briefly when the
/// session lags this far behind rather than queueing without bound.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// An active capture: a started recorder plus the chunks it has emitted.
///
/// Chunks are append-only while the recorder runs and frozen once it reports
/// stopped. Exactly one session exists per controller at a time; the
/// controller's state machine enforces that.
pub struct CaptureSession {
    id: Uuid,
    recorder: Box<dyn Recorder>,
    events: Receiver<RecorderEvent>,
    chunks: Vec<Bytes>,
    stopped: bool,
}

impl CaptureSession {
    /// Construct a recorder over `stream` for the requested format and start
    /// it.
    ///
    /// Resolves a preferred mime from the format first (none for WAV, which
    /// is synthesized later from decoded PCM). If the provider rejects the
    /// preferred mime at construction time, retries once with default
    /// options; that fallback recorder runs without bitrate tuning.
    pub fn start(
        provider: &dyn RecorderProvider,
        stream: MonoStream,
        format: AudioFormat,
    ) -> Result<Self, CaptureError> {
        let (tx, rx) = bounded(EVENT_CHANNEL_CAPACITY);

        let mut recorder = match preferred_mime(provider, format) {
            Some(mime) => {
                let options = RecorderOptions {
                    mime_type: Some(mime.clone()),
                    audio_bits_per_second: Some(TARGET_BITRATE),
                    bits_per_second: Some(TARGET_BITRATE),
                };
                match provider.create_recorder(stream.clone(), options, tx.clone()) {
                    Ok(recorder) => recorder,
                    Err(CaptureError::RecorderUnsupported(reason)) => {
                        log::warn!(
                            "preferred mime {mime:?} rejected ({reason}); \
                             retrying with platform defaults"
                        );
                        provider.create_recorder(stream, RecorderOptions::default(), tx)?
                    }
                    Err(e) => return Err(e),
                }
            }
            None => provider.create_recorder(stream, RecorderOptions::default(), tx)?,
        };

        recorder.start()?;

        let id = Uuid::new_v4();
        log::info!(
            "capture session {id} started: requested={format} negotiated={:?}",
            recorder.mime_type(),
        );
        Ok(Self {
            id,
            recorder,
            events: rx,
            chunks: Vec::new(),
            stopped: false,
        })
    }

    /// Drain whatever the recorder has emitted so far, without blocking.
    ///
    /// Returns `true` once the recorder has signaled that it stopped on its
    /// own, which tells the controller to begin finalization.
    pub fn drain_pending(&mut self) -> bool {
        loop {
            match self.events.try_recv() {
                Ok(event) => self.absorb(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.mark_channel_closed();
                    break;
                }
            }
        }
        self.stopped
    }

    /// Stop the recorder, block until it confirms, and freeze the chunks.
    ///
    /// Returns the accumulated chunks in emission order plus the mime the
    /// recorder actually negotiated. There is no timeout here; a recorder
    /// that never confirms its stop parks the caller indefinitely.
    pub fn finish(mut self) -> (Vec<Bytes>, Option<String>) {
        if self.recorder.is_active() {
            self.recorder.stop();
        }
        while !self.stopped {
            match self.events.recv() {
                Ok(event) => self.absorb(event),
                Err(_) => self.mark_channel_closed(),
            }
        }
        log::info!(
            "capture session {} finished with {} chunk(s)",
            self.id,
            self.chunks.len(),
        );
        (self.chunks, self.recorder.mime_type())
    }

    // --- Internal helpers ---

    fn absorb(&mut self, event: RecorderEvent) {
        match event {
            RecorderEvent::Data(chunk) => {
                // Empty slices and post-stop stragglers never join the blob.
                if !chunk.is_empty() && !self.stopped {
                    self.chunks.push(chunk);
                }
            }
            RecorderEvent::Error(e) => {
                log::warn!("capture session {}: recorder reported {e}; continuing", self.id);
            }
            RecorderEvent::Stopped => self.stopped = true,
        }
    }

    fn mark_channel_closed(&mut self) {
        if !self.stopped {
            log::warn!(
                "capture session {}: recorder went away without a stop signal",
                self.id,
            );
            self.stopped = true;
        }
    }
}
