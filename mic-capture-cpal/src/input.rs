//! cpal-backed input device provider.
//!
//! `cpal::Stream` is not `Send`, so the stream is built, played, and dropped
//! on a dedicated pump thread. The stream callback converts whatever sample
//! format the device delivers to interleaved f32 and pushes frames into a
//! bounded channel; [`CpalInputStream`] hands them out from the consumer
//! side. Stopping the tracks flips a shared flag, the thread drops the
//! stream, and the channel disconnecting is what marks the stream ended.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, StreamConfig};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use mic_capture_core::{
    AudioFrame, CaptureError, ContextState, FrameRead, InputDeviceProvider, InputStream,
    SignalContext, StreamConstraints, TrackSettings,
};

/// Frames buffered between the device callback and the consumer. At the
/// typical callback cadence this is several seconds of headroom; beyond it
/// the callback drops frames rather than blocking the audio thread.
const FRAME_CHANNEL_CAPACITY: usize = 256;

/// How often the pump thread re-checks the stop flag.
const PUMP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Input provider over the host's default (or a named) cpal input device.
///
/// The constraint flags are honored as hints: cpal shared-mode input streams
/// carry no echo cancellation, noise suppression, or automatic gain, so the
/// disable-enhancement request is satisfied by construction. The mono channel
/// hint is likewise advisory; the device's negotiated channel count is
/// reported truthfully and the core's graph does the downmixing.
#[derive(Debug, Default)]
pub struct CpalInputProvider {
    device_name: Option<String>,
}

impl CpalInputProvider {
    /// Capture from a specific input device by name instead of the default.
    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            device_name: Some(name.into()),
        }
    }

    /// Whether any usable input device is present.
    pub fn is_available(&self) -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    fn open_device(&self) -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        match &self.device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or_else(|| {
                    CaptureError::DeviceUnavailable(format!("input device {name:?} not found"))
                }),
            None => host.default_input_device().ok_or_else(|| {
                CaptureError::DeviceUnavailable("no default input device".into())
            }),
        }
    }
}

impl InputDeviceProvider for CpalInputProvider {
    fn acquire_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn InputStream>, CaptureError> {
        let device = self.open_device()?;
        let device_name = device.name().unwrap_or_else(|_| "unknown".into());

        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;
        let settings = TrackSettings {
            channel_count: supported.channels(),
            sample_rate: supported.sample_rate().0,
        };
        log::info!(
            "input stream on {device_name:?}: {} Hz, {} channel(s), {:?} \
             (constraints: {constraints:?})",
            settings.sample_rate,
            settings.channel_count,
            supported.sample_format(),
        );

        let (frame_tx, frame_rx) = bounded(FRAME_CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = bounded::<Result<(), CaptureError>>(1);
        let running = Arc::new(AtomicBool::new(true));

        let handle = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("cpal-input-pump".into())
                .spawn(move || pump_loop(device, supported, running, frame_tx, ready_tx))
                .map_err(|e| {
                    CaptureError::DeviceUnavailable(format!("failed to spawn pump thread: {e}"))
                })?
        };

        // The thread reports once the stream is actually playing; a build or
        // play failure surfaces here as the acquire error.
        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = handle.join();
                return Err(e);
            }
            Err(_) => {
                let _ = handle.join();
                return Err(CaptureError::DeviceUnavailable(
                    "input pump thread died before the stream started".into(),
                ));
            }
        }

        Ok(Box::new(CpalInputStream {
            settings,
            frames: frame_rx,
            running,
            handle: Mutex::new(Some(handle)),
        }))
    }

    fn create_context(&self) -> Result<Box<dyn SignalContext>, CaptureError> {
        let device = self.open_device()?;
        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::ContextFailed(e.to_string()))?;
        // cpal has no suspended state, so the context starts out running.
        Ok(Box::new(CpalSignalContext {
            state: ContextState::Running,
            sample_rate: supported.sample_rate().0,
        }))
    }
}

/// Consumer side of the pump thread's frame channel.
pub struct CpalInputStream {
    settings: TrackSettings,
    frames: Receiver<AudioFrame>,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl InputStream for CpalInputStream {
    fn settings(&self) -> TrackSettings {
        self.settings
    }

    fn next_frame(&self, timeout: Duration) -> FrameRead {
        match self.frames.recv_timeout(timeout) {
            Ok(frame) => FrameRead::Frame(frame),
            Err(RecvTimeoutError::Timeout) => {
                if self.running.load(Ordering::Acquire) {
                    FrameRead::TimedOut
                } else {
                    FrameRead::Ended
                }
            }
            Err(RecvTimeoutError::Disconnected) => FrameRead::Ended,
        }
    }

    fn stop_tracks(&self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                return Err(CaptureError::DeviceUnavailable(
                    "input pump thread panicked".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Drop for CpalInputStream {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

/// Thin state holder standing in for a processing context; the real routing
/// happens in the core's graph.
struct CpalSignalContext {
    state: ContextState,
    sample_rate: u32,
}

impl SignalContext for CpalSignalContext {
    fn state(&self) -> ContextState {
        self.state
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn resume(&mut self) -> Result<(), CaptureError> {
        if self.state == ContextState::Closed {
            return Err(CaptureError::ContextFailed("context already closed".into()));
        }
        self.state = ContextState::Running;
        Ok(())
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        self.state = ContextState::Closed;
        Ok(())
    }
}

/// Body of the pump thread: build the stream in the device's native sample
/// format, play it, then idle until the stop flag flips. Dropping the stream
/// drops the callback's sender, which is what disconnects the frame channel.
fn pump_loop(
    device: cpal::Device,
    supported: cpal::SupportedStreamConfig,
    running: Arc<AtomicBool>,
    frame_tx: Sender<AudioFrame>,
    ready_tx: Sender<Result<(), CaptureError>>,
) {
    let format = supported.sample_format();
    let config: StreamConfig = supported.into();
    let channels = config.channels;
    let dropped = Arc::new(AtomicUsize::new(0));

    let stream = match build_stream(&device, &config, format, channels, frame_tx, &dropped) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(CaptureError::DeviceUnavailable(e.to_string())));
        return;
    }
    let _ = ready_tx.send(Ok(()));

    while running.load(Ordering::Acquire) {
        thread::sleep(PUMP_POLL_INTERVAL);
    }

    if let Err(e) = stream.pause() {
        log::debug!("failed to pause input stream: {e}");
    }
    drop(stream);

    let dropped = dropped.load(Ordering::Relaxed);
    if dropped > 0 {
        log::warn!("input pump dropped {dropped} frame(s) on a full channel");
    }
}

fn build_stream(
    device: &cpal::Device,
    config: &StreamConfig,
    format: SampleFormat,
    channels: u16,
    frame_tx: Sender<AudioFrame>,
    dropped: &Arc<AtomicUsize>,
) -> Result<cpal::Stream, CaptureError> {
    let err_fn = |err| log::warn!("input stream error: {err}");

    let stream = match format {
        SampleFormat::F32 => {
            let push = pusher(frame_tx, channels, dropped, |s: f32| s);
            device.build_input_stream(config, move |data: &[f32], _| push(data), err_fn, None)
        }
        SampleFormat::I16 => {
            let push = pusher(frame_tx, channels, dropped, |s: i16| {
                f32::from(s) / 32_768.0
            });
            device.build_input_stream(config, move |data: &[i16], _| push(data), err_fn, None)
        }
        SampleFormat::U16 => {
            let push = pusher(frame_tx, channels, dropped, |s: u16| {
                (f32::from(s) - 32_768.0) / 32_768.0
            });
            device.build_input_stream(config, move |data: &[u16], _| push(data), err_fn, None)
        }
        other => {
            return Err(CaptureError::DeviceUnavailable(format!(
                "unsupported input sample format {other:?}"
            )))
        }
    };
    stream.map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))
}

/// Build the callback-side frame pusher for one sample type. Frames are
/// dropped, never blocked on, when the consumer falls behind: stalling the
/// device callback thread is worse than a gap in the capture.
fn pusher<T: Copy>(
    frame_tx: Sender<AudioFrame>,
    channels: u16,
    dropped: &Arc<AtomicUsize>,
    convert: impl Fn(T) -> f32,
) -> impl Fn(&[T]) {
    let dropped = Arc::clone(dropped);
    move |data: &[T]| {
        if data.is_empty() {
            return;
        }
        let frame = AudioFrame {
            samples: data.iter().map(|&s| convert(s)).collect(),
            channels,
        };
        if frame_tx.try_send(frame).is_err() {
            dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}
