//! # mic-capture-cpal
//!
//! Native backend for [`mic_capture_core`], built on [cpal] for microphone
//! input and [hound] for WAV container I/O.
//!
//! The platform's "default codec" here is 16-bit PCM WAV: the recorder
//! provider supports only the `audio/wav` mime, so webm/aac requests exercise
//! the core's fallback and format-re-derivation paths end to end.
//!
//! [cpal]: https://docs.rs/cpal
//! [hound]: https://docs.rs/hound

pub mod decoder;
pub mod input;
pub mod recorder;

pub use decoder::WavDecoder;
pub use input::CpalInputProvider;
pub use recorder::{WavRecorderProvider, WAV_MIME};
