use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::capture_buffer::PcmFormat;

/// Result returned when a raw recording has been converted to WAV.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub wav_path: PathBuf,
    pub format: PcmFormat,
    /// Length of the `data` chunk in bytes.
    pub data_length: u32,
    pub duration_secs: f64,
    /// SHA-256 hex digest of the complete WAV file.
    pub checksum: String,
}

/// Metadata stored alongside a converted recording as a JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_path: String,
    pub format: PcmFormat,
    pub data_length: u32,
    pub duration_secs: f64,
    pub checksum: String,
    pub created_at: String,
}

impl RecordingMetadata {
    pub fn from_conversion(result: &ConversionResult) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: result.wav_path.to_string_lossy().into_owned(),
            format: result.format,
            data_length: result.data_length,
            duration_secs: result.duration_secs,
            checksum: result.checksum.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Playback duration in seconds of `byte_len` bytes of PCM in `format`.
pub fn pcm_duration_secs(byte_len: u64, format: &PcmFormat) -> f64 {
    let byte_rate = format.byte_rate();
    if byte_rate == 0 {
        return 0.0;
    }
    byte_len as f64 / byte_rate as f64
}

/// Format a duration as zero-padded `mm:ss`.
///
/// Minutes are not wrapped at an hour, so 61 minutes renders as `61:00`.
pub fn format_duration(millis: u64) -> String {
    let total_secs = millis / 1000;
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
