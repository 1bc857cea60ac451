//! Container mime tables and format derivation.
//!
//! The preferred-mime candidates are tried in order against the platform's
//! capability probe; the first supported one wins. Deriving the reported
//! format back from the mime the recorder actually negotiated keeps the
//! output truthful when construction fell back to a different codec.

use crate::models::config::AudioFormat;
use crate::traits::recorder::RecorderProvider;

/// Opus-in-WebM first, plain WebM second.
const WEBM_CANDIDATES: &[&str] = &["audio/webm;codecs=opus", "audio/webm"];

/// AAC-in-MP4 codec-string variants in descending specificity, then the
/// generic AAC mime.
const AAC_CANDIDATES: &[&str] = &[
    "audio/mp4;codecs=mp4a.40.2",
    "audio/mp4;codecs=aac",
    "audio/mp4",
    "audio/aac",
];

/// Resolve the preferred recorder mime for a requested format.
///
/// `Wav` resolves to `None` on purpose: WAV is synthesized later from decoded
/// PCM, so any intermediate codec the platform picks is fine.
pub fn preferred_mime(provider: &dyn RecorderProvider, format: AudioFormat) -> Option<String> {
    let candidates: &[&str] = match format {
        AudioFormat::Wav => return None,
        AudioFormat::Webm => WEBM_CANDIDATES,
        AudioFormat::Aac => AAC_CANDIDATES,
    };
    candidates
        .iter()
        .find(|mime| provider.is_mime_supported(mime))
        .map(|mime| (*mime).to_string())
}

/// The blob mime used when the recorder cannot report its negotiated one.
pub fn fallback_blob_mime(format: AudioFormat) -> &'static str {
    match format {
        AudioFormat::Aac => "audio/mp4",
        _ => "audio/webm",
    }
}

/// Derive the reported output format from an actual container mime.
///
/// An MP4/AAC marker resolves to aac; WebM markers and anything unrecognized
/// both resolve to webm rather than trusting the format that was originally
/// requested.
pub fn format_from_mime(mime: &str) -> AudioFormat {
    let mime = mime.to_ascii_lowercase();
    if mime.contains("mp4") || mime.contains("aac") {
        AudioFormat::Aac
    } else {
        AudioFormat::Webm
    }
}
