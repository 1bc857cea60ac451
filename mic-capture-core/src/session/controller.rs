//! The capture controller: the one state machine that wires the graph,
//! session, encoder, and delivery sink together.

use std::sync::Arc;

use crate::graph::{self, AudioGraphHandle};
use crate::models::audio::StreamConstraints;
use crate::models::config::CaptureConfig;
use crate::models::error::CaptureError;
use crate::models::record::EncodedRecord;
use crate::processing::encoder;
use crate::session::capture::CaptureSession;
use crate::traits::decoder::AudioDecoder;
use crate::traits::input::InputDeviceProvider;
use crate::traits::recorder::RecorderProvider;
use crate::traits::sink::RecordSink;
use crate::view::{render_target, TargetView};

/// Externally visible lifecycle phase of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    Recording,
    Finalizing,
}

/// Transient per-capture resources, alive only while recording. Dismantled
/// completely before the controller returns to idle.
struct ActiveCapture {
    graph: AudioGraphHandle,
    session: CaptureSession,
}

enum ControllerState {
    Idle,
    Recording(ActiveCapture),
    Finalizing,
}

/// Orchestrates one capture at a time: graph build, session, encode,
/// delivery, teardown.
///
/// ```text
/// [InputDeviceProvider] → [mono graph] → [RecorderProvider/Recorder]
///                                              │ chunks
///                                              ▼
///                       [encoder] → EncodedRecord → [RecordSink]
/// ```
///
/// All mutable cross-step state lives here; the collaborators are stateless
/// factories from the controller's point of view.
pub struct CaptureController {
    inputs: Arc<dyn InputDeviceProvider>,
    recorders: Arc<dyn RecorderProvider>,
    decoder: Arc<dyn AudioDecoder>,
    sink: Arc<dyn RecordSink>,
    config: CaptureConfig,
    state: ControllerState,
}

impl CaptureController {
    pub fn new(
        inputs: Arc<dyn InputDeviceProvider>,
        recorders: Arc<dyn RecorderProvider>,
        decoder: Arc<dyn AudioDecoder>,
        sink: Arc<dyn RecordSink>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            inputs,
            recorders,
            decoder,
            sink,
            config,
            state: ControllerState::Idle,
        }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn phase(&self) -> CapturePhase {
        match self.state {
            ControllerState::Idle => CapturePhase::Idle,
            ControllerState::Recording(_) => CapturePhase::Recording,
            ControllerState::Finalizing => CapturePhase::Finalizing,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, ControllerState::Recording(_))
    }

    /// Visual description of the capture control for the current phase.
    pub fn view(&self) -> TargetView {
        render_target(&self.config, self.is_recording())
    }

    /// Begin a capture. Transitions: idle → recording.
    ///
    /// Rejected with [`CaptureError::SessionActive`] unless idle; no state
    /// permits a second concurrent graph or session. A device or recorder
    /// failure leaves the controller idle with nothing created, so the next
    /// start attempt begins from a clean slate.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if !matches!(self.state, ControllerState::Idle) {
            return Err(CaptureError::SessionActive);
        }

        let graph = match graph::build(self.inputs.as_ref(), &StreamConstraints::clean_capture()) {
            Ok(graph) => graph,
            Err(e) => {
                log::error!("could not open an input stream: {e}");
                return Err(e);
            }
        };

        let session = match CaptureSession::start(
            self.recorders.as_ref(),
            graph.mono_stream(),
            self.config.format,
        ) {
            Ok(session) => session,
            Err(e) => {
                log::error!("recorder could not be started: {e}");
                graph.teardown();
                return Err(e);
            }
        };

        self.state = ControllerState::Recording(ActiveCapture { graph, session });
        Ok(())
    }

    /// Stop an active capture and finalize it. Transitions: recording →
    /// finalizing → idle.
    ///
    /// Returns the record that was delivered to the sink, or `None` when
    /// nothing was recording. Stopping an idle controller is a no-op, never
    /// an error, and never produces a second record.
    pub fn stop(&mut self) -> Option<EncodedRecord> {
        let previous = std::mem::replace(&mut self.state, ControllerState::Finalizing);
        let active = match previous {
            ControllerState::Recording(active) => active,
            other => {
                self.state = other;
                return None;
            }
        };

        let record = self.finalize(active);
        self.state = ControllerState::Idle;
        Some(record)
    }

    /// Poll recorder events for an active capture.
    ///
    /// Drains pending data into the session and, when the platform signals
    /// that the recorder completed on its own, runs the same finalization as
    /// an explicit [`stop`](Self::stop), returning the delivered record.
    pub fn process_events(&mut self) -> Option<EncodedRecord> {
        let ControllerState::Recording(active) = &mut self.state else {
            return None;
        };
        if active.session.drain_pending() {
            log::debug!("recorder completed on its own; finalizing");
            return self.stop();
        }
        None
    }

    // --- Internal helpers ---

    /// Encode, deliver, dismantle. Teardown runs after delivery on every
    /// path, decode fallback included.
    fn finalize(&self, active: ActiveCapture) -> EncodedRecord {
        let ActiveCapture { graph, session } = active;
        let context_rate = graph.context_sample_rate();
        let (chunks, recorder_mime) = session.finish();

        let record = encoder::encode(
            &chunks,
            self.config.format,
            recorder_mime.as_deref(),
            context_rate,
            self.decoder.as_ref(),
        );
        self.sink.deliver(&record);
        graph.teardown();
        record
    }
}
