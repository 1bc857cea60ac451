use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::config::AudioFormat;

/// The single self-describing payload a completed session delivers.
///
/// Serializes to the wire shape the receiving process expects; `container` is
/// omitted entirely unless the resolved format is `aac`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedRecord {
    /// Time-derived identifier, strictly increasing within a process so a
    /// receiver can tell repeated captures apart even inside one millisecond.
    pub id: u64,

    /// Resolved output format. Derived from the actual recorder mime on the
    /// passthrough branches, so it can differ from the requested format.
    pub format: AudioFormat,

    /// The literal negotiated container mime. Present iff `format` is `aac`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    /// Standard base64 of the raw container bytes. Empty when the session
    /// captured no data.
    pub audio_base64: String,

    /// Decoded (authoritative) rate on the WAV success path; the capture
    /// context's nominal rate everywhere else.
    pub sample_rate: u32,

    /// Bytes per sample: 4 only on the WAV decode-success path, else 2.
    pub sample_width: u16,
}

/// Issue the next record identifier.
///
/// Starts from the current epoch milliseconds and bumps past the previous
/// value when the clock has not advanced (or moved backwards), so ids from
/// one process never repeat or decrease.
pub(crate) fn next_record_id() -> u64 {
    static LAST_ID: AtomicU64 = AtomicU64::new(0);

    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let mut prev = LAST_ID.load(Ordering::Relaxed);
    loop {
        let id = now.max(prev + 1);
        match LAST_ID.compare_exchange_weak(prev, id, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return id,
            Err(actual) => prev = actual,
        }
    }
}
