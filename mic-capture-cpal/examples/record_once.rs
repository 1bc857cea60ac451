//! Records a few seconds from the default microphone and prints the
//! delivered record as JSON.
//!
//! ```text
//! RUST_LOG=debug cargo run --example record_once -- wav
//! ```
//!
//! The optional argument picks the requested format (`wav`, `webm`, `aac`);
//! with this backend's WAV-only recorder, webm/aac requests demonstrate the
//! fallback paths and come back re-derived as `webm`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use mic_capture_core::{
    AudioFormat, CaptureConfig, CaptureController, EncodedRecord, RecordSink,
};
use mic_capture_cpal::{CpalInputProvider, WavDecoder, WavRecorderProvider};

const CAPTURE_SECONDS: u64 = 3;

struct StdoutSink;

impl RecordSink for StdoutSink {
    fn deliver(&self, record: &EncodedRecord) {
        match serde_json::to_string_pretty(record) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("could not serialize record: {e}"),
        }
    }
}

fn main() {
    env_logger::init();

    let format = match std::env::args().nth(1).as_deref() {
        Some("webm") => AudioFormat::Webm,
        Some("aac") => AudioFormat::Aac,
        _ => AudioFormat::Wav,
    };

    let inputs = CpalInputProvider::default();
    if !inputs.is_available() {
        eprintln!("no input device available");
        std::process::exit(1);
    }

    let mut controller = CaptureController::new(
        Arc::new(inputs),
        Arc::new(WavRecorderProvider),
        Arc::new(WavDecoder),
        Arc::new(StdoutSink),
        CaptureConfig::with_format(format),
    );

    eprintln!("recording {CAPTURE_SECONDS}s from the default microphone as {format}...");
    if let Err(e) = controller.start() {
        eprintln!("could not start capture: {e}");
        std::process::exit(1);
    }

    for _ in 0..(CAPTURE_SECONDS * 10) {
        thread::sleep(Duration::from_millis(100));
        // Drains recorder events; also finalizes early if the device ends the
        // stream on its own.
        if controller.process_events().is_some() {
            return;
        }
    }
    controller.stop();
}
