//! Mock collaborators for driving the capture pipeline end to end.
//!
//! The input side replays scripted frames, the recorder captures the mono
//! stream as raw little-endian f32 bytes, and the decoder parses those bytes
//! back into PCM, so tests can follow samples from the device all the way
//! into the delivered record.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use crossbeam_channel::Sender;
use parking_lot::Mutex;

use mic_capture_core::{
    AudioDecoder, AudioFrame, CaptureConfig, CaptureController, CaptureError, ContextState,
    DecodeContext, DecodedAudio, EncodedRecord, FrameRead, InputDeviceProvider, InputStream,
    MonoStream, RecordSink, Recorder, RecorderEvent, RecorderOptions, RecorderProvider,
    SignalContext, StreamConstraints, TrackSettings,
};

/// Observable device-side state, shared between the provider and the test.
pub struct DeviceState {
    pub tracks_live: AtomicBool,
    pub context_state: Mutex<ContextState>,
    pub resumes: AtomicUsize,
}

pub struct MockInputProvider {
    state: Arc<DeviceState>,
    channel_count: u16,
    device_rate: u32,
    context_rate: u32,
    start_suspended: bool,
    fail_acquire: bool,
    frames: Mutex<Option<VecDeque<AudioFrame>>>,
}

impl MockInputProvider {
    pub fn new(channel_count: u16, frames: Vec<AudioFrame>) -> Self {
        Self {
            state: Arc::new(DeviceState {
                tracks_live: AtomicBool::new(false),
                context_state: Mutex::new(ContextState::Running),
                resumes: AtomicUsize::new(0),
            }),
            channel_count,
            device_rate: 48_000,
            context_rate: 48_000,
            start_suspended: false,
            fail_acquire: false,
            frames: Mutex::new(Some(frames.into())),
        }
    }

    pub fn unavailable() -> Self {
        let mut provider = Self::new(1, Vec::new());
        provider.fail_acquire = true;
        provider
    }

    /// Hand out a context that starts suspended, as first-gesture contexts do.
    pub fn suspended(mut self) -> Self {
        self.start_suspended = true;
        self
    }

    pub fn state(&self) -> Arc<DeviceState> {
        Arc::clone(&self.state)
    }
}

impl InputDeviceProvider for MockInputProvider {
    fn acquire_stream(
        &self,
        _constraints: &StreamConstraints,
    ) -> Result<Box<dyn InputStream>, CaptureError> {
        if self.fail_acquire {
            return Err(CaptureError::DeviceUnavailable("permission denied".into()));
        }
        let frames = self
            .frames
            .lock()
            .take()
            .expect("mock stream acquired more than once");
        self.state.tracks_live.store(true, Ordering::SeqCst);
        Ok(Box::new(MockInputStream {
            state: Arc::clone(&self.state),
            settings: TrackSettings {
                channel_count: self.channel_count,
                sample_rate: self.device_rate,
            },
            frames: Mutex::new(frames),
        }))
    }

    fn create_context(&self) -> Result<Box<dyn SignalContext>, CaptureError> {
        *self.state.context_state.lock() = if self.start_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        Ok(Box::new(MockSignalContext {
            state: Arc::clone(&self.state),
            rate: self.context_rate,
        }))
    }
}

struct MockInputStream {
    state: Arc<DeviceState>,
    settings: TrackSettings,
    frames: Mutex<VecDeque<AudioFrame>>,
}

impl InputStream for MockInputStream {
    fn settings(&self) -> TrackSettings {
        self.settings
    }

    fn next_frame(&self, _timeout: Duration) -> FrameRead {
        if !self.state.tracks_live.load(Ordering::SeqCst) {
            return FrameRead::Ended;
        }
        match self.frames.lock().pop_front() {
            Some(frame) => FrameRead::Frame(frame),
            None => FrameRead::Ended,
        }
    }

    fn stop_tracks(&self) -> Result<(), CaptureError> {
        self.state.tracks_live.store(false, Ordering::SeqCst);
        Ok(())
    }
}

struct MockSignalContext {
    state: Arc<DeviceState>,
    rate: u32,
}

impl SignalContext for MockSignalContext {
    fn state(&self) -> ContextState {
        *self.state.context_state.lock()
    }

    fn sample_rate(&self) -> u32 {
        self.rate
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        self.state.resumes.fetch_add(1, Ordering::SeqCst);
        *self.state.context_state.lock() = ContextState::Running;
        Ok(())
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        *self.state.context_state.lock() = ContextState::Closed;
        Ok(())
    }
}

/// Recorder backend that captures the mono stream as raw f32 LE bytes.
pub struct MockRecorderProvider {
    pub supported: Vec<String>,
    pub reject_preferred: bool,
    pub fail_create: Option<CaptureError>,
    /// Mime reported when constructed without a preferred one.
    pub default_mime: Option<String>,
    /// Emit everything plus the stop signal as soon as the stream ends,
    /// modeling a recorder that completes on its own.
    pub auto_stop: bool,
    pub chunk_size: usize,
    pub captured_options: Mutex<Vec<RecorderOptions>>,
}

impl MockRecorderProvider {
    pub fn supporting(mimes: &[&str]) -> Self {
        Self {
            supported: mimes.iter().map(|m| m.to_string()).collect(),
            reject_preferred: false,
            fail_create: None,
            default_mime: None,
            auto_stop: false,
            chunk_size: 64,
            captured_options: Mutex::new(Vec::new()),
        }
    }
}

impl RecorderProvider for MockRecorderProvider {
    fn is_mime_supported(&self, mime: &str) -> bool {
        self.supported.iter().any(|m| m == mime)
    }

    fn create_recorder(
        &self,
        stream: MonoStream,
        options: RecorderOptions,
        events: Sender<RecorderEvent>,
    ) -> Result<Box<dyn Recorder>, CaptureError> {
        if let Some(e) = &self.fail_create {
            return Err(e.clone());
        }
        if self.reject_preferred && options.mime_type.is_some() {
            self.captured_options.lock().push(options);
            return Err(CaptureError::RecorderUnsupported(
                "mime not constructible".into(),
            ));
        }
        let mime = options.mime_type.clone().or_else(|| self.default_mime.clone());
        self.captured_options.lock().push(options);
        Ok(Box::new(MockRecorder {
            stream,
            events: Some(events),
            mime,
            chunk_size: self.chunk_size,
            auto_stop: self.auto_stop,
            active: false,
            captured: Vec::new(),
        }))
    }
}

struct MockRecorder {
    stream: MonoStream,
    events: Option<Sender<RecorderEvent>>,
    mime: Option<String>,
    chunk_size: usize,
    auto_stop: bool,
    active: bool,
    captured: Vec<u8>,
}

impl MockRecorder {
    fn flush(&mut self) {
        let Some(tx) = self.events.take() else { return };
        for chunk in self.captured.chunks(self.chunk_size.max(1)) {
            tx.send(RecorderEvent::Data(Bytes::copy_from_slice(chunk)))
                .unwrap();
        }
        tx.send(RecorderEvent::Stopped).unwrap();
    }
}

impl Recorder for MockRecorder {
    fn start(&mut self) -> Result<(), CaptureError> {
        // Scripted fixtures are finite: drain the whole stream up front.
        loop {
            match self.stream.pull(Duration::from_millis(1)) {
                FrameRead::Frame(frame) => {
                    for sample in &frame.samples {
                        self.captured.extend_from_slice(&sample.to_le_bytes());
                    }
                }
                FrameRead::TimedOut | FrameRead::Ended => break,
            }
        }
        if self.auto_stop {
            self.flush();
        } else {
            self.active = true;
        }
        Ok(())
    }

    fn stop(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        self.flush();
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn mime_type(&self) -> Option<String> {
        self.mime.clone()
    }
}

/// Decoder that reads raw f32 LE bytes back into mono PCM at its own rate.
pub struct MockDecoder {
    pub native_rate: u32,
    pub fail: bool,
    pub contexts_closed: Arc<AtomicUsize>,
}

impl MockDecoder {
    pub fn pcm(native_rate: u32) -> Self {
        Self {
            native_rate,
            fail: false,
            contexts_closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing() -> Self {
        let mut decoder = Self::pcm(48_000);
        decoder.fail = true;
        decoder
    }
}

impl AudioDecoder for MockDecoder {
    fn open_context(&self) -> Result<Box<dyn DecodeContext>, CaptureError> {
        Ok(Box::new(MockDecodeContext {
            rate: self.native_rate,
            fail: self.fail,
            closed: Arc::clone(&self.contexts_closed),
        }))
    }
}

struct MockDecodeContext {
    rate: u32,
    fail: bool,
    closed: Arc<AtomicUsize>,
}

impl DecodeContext for MockDecodeContext {
    fn decode(&mut self, blob: &[u8]) -> Result<DecodedAudio, CaptureError> {
        if self.fail {
            return Err(CaptureError::DecodeFailed("scripted failure".into()));
        }
        if blob.len() % 4 != 0 {
            return Err(CaptureError::DecodeFailed("truncated sample data".into()));
        }
        let samples = blob
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(DecodedAudio {
            samples,
            channels: 1,
            sample_rate: self.rate,
        })
    }

    fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct CollectingSink {
    pub delivered: Mutex<Vec<EncodedRecord>>,
}

impl RecordSink for CollectingSink {
    fn deliver(&self, record: &EncodedRecord) {
        self.delivered.lock().push(record.clone());
    }
}

/// A controller wired to mock collaborators, with handles kept for
/// post-condition checks.
pub struct TestFixture {
    pub device: Arc<DeviceState>,
    pub recorders: Arc<MockRecorderProvider>,
    pub decoder: Arc<MockDecoder>,
    pub sink: Arc<CollectingSink>,
    pub controller: CaptureController,
}

impl TestFixture {
    pub fn new(
        config: CaptureConfig,
        inputs: MockInputProvider,
        recorders: MockRecorderProvider,
        decoder: MockDecoder,
    ) -> Self {
        let device = inputs.state();
        let recorders = Arc::new(recorders);
        let decoder = Arc::new(decoder);
        let sink = Arc::new(CollectingSink::default());
        let controller = CaptureController::new(
            Arc::new(inputs),
            Arc::clone(&recorders) as Arc<dyn RecorderProvider>,
            Arc::clone(&decoder) as Arc<dyn AudioDecoder>,
            Arc::clone(&sink) as Arc<dyn RecordSink>,
            config,
        );
        Self {
            device,
            recorders,
            decoder,
            sink,
            controller,
        }
    }

    pub fn delivered(&self) -> Vec<EncodedRecord> {
        self.sink.delivered.lock().clone()
    }
}

// --- Sample and payload helpers ---

pub fn mono_frame(samples: &[f32]) -> AudioFrame {
    AudioFrame::mono(samples.to_vec())
}

/// Interleave equal-length channel slices into one stereo frame.
pub fn stereo_frame(left: &[f32], right: &[f32]) -> AudioFrame {
    assert_eq!(left.len(), right.len());
    AudioFrame {
        samples: left.iter().zip(right).flat_map(|(l, r)| [*l, *r]).collect(),
        channels: 2,
    }
}

pub fn le_bytes(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn payload_bytes(record: &EncodedRecord) -> Vec<u8> {
    STANDARD
        .decode(&record.audio_base64)
        .expect("payload is valid base64")
}

/// Pull the sample rate and f32 samples back out of a float WAV container.
pub fn parse_float_wav(bytes: &[u8]) -> (u32, Vec<f32>) {
    assert_eq!(&bytes[..4], b"RIFF", "missing RIFF magic");
    assert_eq!(&bytes[8..12], b"WAVE", "missing WAVE form type");
    let rate = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
    let samples = bytes[44..]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    (rate, samples)
}
