//! Canonical WAV container encoding for the decode-success path.
//!
//! Emits 32-bit IEEE-float WAV (format code 3) with the standard 44-byte
//! RIFF header, which is what gives the WAV branch its 4-byte sample width.

use crate::models::audio::DecodedAudio;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// WAVE format code for IEEE float PCM.
const FORMAT_IEEE_FLOAT: u16 = 3;

/// Bytes per sample in the emitted container.
pub const FLOAT_SAMPLE_WIDTH: u16 = 4;

/// Generate the 44-byte header for a float32 WAV file.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    file size - 8 (36 + data_size)
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (format chunk size)
/// [20-21]  3 (IEEE float format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * 4
/// [32-33]  block_align = channels * 4
/// [34-35]  32 (bits per sample)
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn float_wav_header(sample_rate: u32, channels: u16, data_size: u32) -> [u8; WAV_HEADER_SIZE] {
    let bytes_per_sample = u32::from(FLOAT_SAMPLE_WIDTH);
    let byte_rate = sample_rate * u32::from(channels) * bytes_per_sample;
    let block_align = channels * FLOAT_SAMPLE_WIDTH;
    let chunk_size = 36 + data_size;

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&FORMAT_IEEE_FLOAT.to_le_bytes());
    header[22..24].copy_from_slice(&channels.to_le_bytes());
    header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&32u16.to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    header
}

/// Encode decoded PCM into a complete float32 WAV container.
pub fn encode_float_wav(pcm: &DecodedAudio) -> Vec<u8> {
    let channels = pcm.channels.max(1);
    let data_size = (pcm.samples.len() * usize::from(FLOAT_SAMPLE_WIDTH)) as u32;

    let mut wav = Vec::with_capacity(WAV_HEADER_SIZE + data_size as usize);
    wav.extend_from_slice(&float_wav_header(pcm.sample_rate, channels, data_size));
    for &sample in &pcm.samples {
        wav.extend_from_slice(&sample.to_le_bytes());
    }
    wav
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn decoded(samples: Vec<f32>, channels: u16, sample_rate: u32) -> DecodedAudio {
        DecodedAudio {
            samples,
            channels,
            sample_rate,
        }
    }

    #[test]
    fn header_is_44_bytes_with_riff_magic() {
        let header = float_wav_header(48_000, 1, 0);
        assert_eq!(header.len(), WAV_HEADER_SIZE);
        assert_eq!(&header[0..4], b"RIFF");
        assert_eq!(&header[8..12], b"WAVE");
        assert_eq!(&header[12..16], b"fmt ");
        assert_eq!(&header[36..40], b"data");
    }

    #[test]
    fn header_declares_ieee_float() {
        let header = float_wav_header(48_000, 1, 0);
        assert_eq!(u16::from_le_bytes([header[20], header[21]]), 3);
        assert_eq!(u16::from_le_bytes([header[34], header[35]]), 32);
    }

    #[test]
    fn header_mono_48khz_fields() {
        let header = float_wav_header(48_000, 1, 960);

        assert_eq!(u16::from_le_bytes([header[22], header[23]]), 1);

        let sample_rate = u32::from_le_bytes([header[24], header[25], header[26], header[27]]);
        assert_eq!(sample_rate, 48_000);

        let byte_rate = u32::from_le_bytes([header[28], header[29], header[30], header[31]]);
        assert_eq!(byte_rate, 192_000); // 48000 * 1 * 4

        let block_align = u16::from_le_bytes([header[32], header[33]]);
        assert_eq!(block_align, 4);

        let data_size = u32::from_le_bytes([header[40], header[41], header[42], header[43]]);
        assert_eq!(data_size, 960);

        let chunk_size = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        assert_eq!(chunk_size, 36 + 960);
    }

    #[test]
    fn round_trip_preserves_rate_and_sample_count() {
        let samples: Vec<f32> = (0..480).map(|i| (i as f32 / 480.0) - 0.5).collect();
        let pcm = decoded(samples.clone(), 1, 44_100);

        let wav = encode_float_wav(&pcm);
        assert_eq!(wav.len(), WAV_HEADER_SIZE + samples.len() * 4);

        // Decode the container back by hand.
        let rate = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);
        assert_eq!(rate, 44_100);

        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]) as usize;
        assert_eq!(data_size / 4, samples.len());

        let body = &wav[WAV_HEADER_SIZE..];
        let restored: Vec<f32> = body
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(restored, samples);
    }

    #[test]
    fn stereo_pcm_keeps_interleaving() {
        let pcm = decoded(vec![0.1, -0.1, 0.2, -0.2], 2, 22_050);
        let wav = encode_float_wav(&pcm);

        assert_eq!(u16::from_le_bytes([wav[22], wav[23]]), 2);
        let block_align = u16::from_le_bytes([wav[32], wav[33]]);
        assert_eq!(block_align, 8);

        let first = f32::from_le_bytes([wav[44], wav[45], wav[46], wav[47]]);
        let second = f32::from_le_bytes([wav[48], wav[49], wav[50], wav[51]]);
        assert_relative_eq!(first, 0.1f32);
        assert_relative_eq!(second, -0.1f32);
    }

    #[test]
    fn empty_pcm_yields_header_only() {
        let pcm = decoded(Vec::new(), 1, 48_000);
        let wav = encode_float_wav(&pcm);
        assert_eq!(wav.len(), WAV_HEADER_SIZE);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 0);
    }
}
