//! WAV chunk recorder: this backend's native "codec" is 16-bit PCM WAV.
//!
//! The recorder pulls mono frames from the graph on its own thread while
//! active. On stop it writes the accumulated PCM into one in-memory WAV blob
//! via hound and emits it as a single data chunk followed by the stop signal,
//! like a platform recorder running without a timeslice.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use crossbeam_channel::Sender;
use hound::{SampleFormat, WavSpec, WavWriter};
use parking_lot::Mutex;

use mic_capture_core::{
    CaptureError, FrameRead, MonoStream, Recorder, RecorderEvent, RecorderOptions,
    RecorderProvider, FRAME_PULL_INTERVAL,
};

/// The only container mime this backend can encode.
pub const WAV_MIME: &str = "audio/wav";

/// Recorder factory whose capability table is exactly one entry. Every
/// webm/aac candidate probes as unsupported, so requests for those formats
/// take the core's default-options fallback and the delivered format is
/// re-derived from the WAV mime downstream.
pub struct WavRecorderProvider;

impl RecorderProvider for WavRecorderProvider {
    fn is_mime_supported(&self, mime: &str) -> bool {
        mime.eq_ignore_ascii_case(WAV_MIME)
    }

    fn create_recorder(
        &self,
        stream: MonoStream,
        options: RecorderOptions,
        events: Sender<RecorderEvent>,
    ) -> Result<Box<dyn Recorder>, CaptureError> {
        if let Some(mime) = &options.mime_type {
            if !self.is_mime_supported(mime) {
                return Err(CaptureError::RecorderUnsupported(mime.clone()));
            }
        }
        if options.audio_bits_per_second.is_some() || options.bits_per_second.is_some() {
            // PCM has no bitrate knob; the rate follows from the sample rate.
            log::debug!("ignoring bitrate tuning for PCM WAV recorder");
        }
        Ok(Box::new(WavChunkRecorder {
            stream: Some(stream),
            events: Some(events),
            active: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }))
    }
}

/// One recording run over a mono stream.
pub struct WavChunkRecorder {
    stream: Option<MonoStream>,
    events: Option<Sender<RecorderEvent>>,
    active: Arc<AtomicBool>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl Recorder for WavChunkRecorder {
    fn start(&mut self) -> Result<(), CaptureError> {
        let stream = self.stream.take().ok_or_else(|| {
            CaptureError::RecorderRuntime("recorder started more than once".into())
        })?;
        let events = self.events.take().ok_or_else(|| {
            CaptureError::RecorderRuntime("recorder started more than once".into())
        })?;

        self.active.store(true, Ordering::Release);
        let active = Arc::clone(&self.active);
        let handle = thread::Builder::new()
            .name("wav-chunk-recorder".into())
            .spawn(move || record_loop(stream, events, active))
            .map_err(|e| {
                self.active.store(false, Ordering::Release);
                CaptureError::RecorderRuntime(format!("failed to spawn recorder thread: {e}"))
            })?;
        *self.handle.lock() = Some(handle);
        Ok(())
    }

    fn stop(&mut self) {
        // Safe on a never-started or already-stopped recorder: flipping the
        // flag a second time changes nothing, and the thread (if any) emits
        // its one stop signal on the way out.
        self.active.store(false, Ordering::Release);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn mime_type(&self) -> Option<String> {
        Some(WAV_MIME.to_owned())
    }
}

impl Drop for WavChunkRecorder {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

/// Recording thread body: accumulate mono PCM until stopped or the stream
/// ends, then flush one WAV blob and the stop signal.
fn record_loop(stream: MonoStream, events: Sender<RecorderEvent>, active: Arc<AtomicBool>) {
    let sample_rate = stream.sample_rate();
    let mut samples: Vec<f32> = Vec::new();

    while active.load(Ordering::Acquire) {
        match stream.pull(FRAME_PULL_INTERVAL) {
            FrameRead::Frame(frame) => samples.extend_from_slice(&frame.samples),
            FrameRead::TimedOut => continue,
            FrameRead::Ended => break,
        }
    }
    // Drain whatever the device delivered before the stop landed.
    while let FrameRead::Frame(frame) = stream.pull(Duration::ZERO) {
        samples.extend_from_slice(&frame.samples);
    }
    active.store(false, Ordering::Release);

    if samples.is_empty() {
        log::info!("wav recorder stopped with no captured audio");
    } else {
        match encode_pcm16_wav(&samples, sample_rate) {
            Ok(blob) => {
                log::info!(
                    "wav recorder stopped: {} sample(s) at {sample_rate} Hz, {} byte blob",
                    samples.len(),
                    blob.len(),
                );
                let _ = events.send(RecorderEvent::Data(Bytes::from(blob)));
            }
            Err(e) => {
                let _ = events.send(RecorderEvent::Error(CaptureError::RecorderRuntime(
                    format!("wav encoding failed: {e}"),
                )));
            }
        }
    }
    let _ = events.send(RecorderEvent::Stopped);
}

/// Write mono f32 PCM as an in-memory 16-bit integer WAV container.
pub fn encode_pcm16_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let quantized = (sample.clamp(-1.0, 1.0) * 32_767.0).round() as i16;
            writer.write_sample(quantized)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}
