//! Raw PCM to WAV container conversion.
//!
//! The sample data is already little-endian 16-bit, so conversion is a
//! header followed by a verbatim copy. Structurally invalid input is an
//! error here, unlike in the recorder.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::capture_buffer::PcmFormat;
use crate::models::error::CaptureError;
use crate::models::recording_info::{pcm_duration_secs, ConversionResult};
use crate::processing::wav_format::{WavHeader, WAV_HEADER_SIZE};
use crate::storage::naming;

/// Wrap `raw` 16-bit PCM bytes in a RIFF/WAVE container.
pub fn convert_bytes(raw: &[u8], format: PcmFormat) -> Result<Vec<u8>, CaptureError> {
    let data_length = validate(raw, &format)?;

    let mut wav = Vec::with_capacity(WAV_HEADER_SIZE + raw.len());
    wav.extend_from_slice(&WavHeader::new(format, data_length).to_bytes());
    wav.extend_from_slice(raw);
    Ok(wav)
}

/// Convert the raw PCM file at `src` into a WAV file at `dst`.
///
/// The input is fully validated before `dst` is created, so invalid input
/// never leaves a partial output file behind.
pub fn convert_file(src: &Path, dst: &Path, format: PcmFormat) -> Result<ConversionResult, CaptureError> {
    let raw = std::fs::read(src)
        .map_err(|e| CaptureError::StorageError(format!("failed to read {}: {}", src.display(), e)))?;
    let wav = convert_bytes(&raw, format)?;

    let mut file = File::create(dst)
        .map_err(|e| CaptureError::StorageError(format!("failed to create {}: {}", dst.display(), e)))?;
    file.write_all(&wav)
        .map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;
    file.flush().map_err(|e| CaptureError::StorageError(e.to_string()))?;

    log::info!("Converted {} ({} bytes) to {}", src.display(), raw.len(), dst.display());

    Ok(ConversionResult {
        wav_path: dst.to_path_buf(),
        format,
        data_length: raw.len() as u32,
        duration_secs: pcm_duration_secs(raw.len() as u64, &format),
        checksum: sha256_hex(&wav),
    })
}

/// Convert a file written by the recorder, taking the format from its name.
///
/// The WAV file is written next to the source with a `.wav` extension.
pub fn convert_recording(src: &Path) -> Result<ConversionResult, CaptureError> {
    let file_name = src
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CaptureError::InvalidInput(format!("no file name in {}", src.display())))?;
    let (_, format) = naming::parse_recording_file_name(file_name)?;
    convert_file(src, &wav_path_for(src), format)
}

/// `foo.pcm` → `foo.wav`.
pub fn wav_path_for(src: &Path) -> PathBuf {
    src.with_extension("wav")
}

fn validate(raw: &[u8], format: &PcmFormat) -> Result<u32, CaptureError> {
    if format.bit_depth != 16 {
        return Err(CaptureError::UnsupportedFormat(format.bit_depth));
    }
    format.validate().map_err(CaptureError::InvalidInput)?;
    if raw.len() % 2 != 0 {
        return Err(CaptureError::InvalidInput(format!(
            "{} bytes is not a whole number of 16-bit samples",
            raw.len()
        )));
    }
    u32::try_from(raw.len())
        .ok()
        .filter(|len| len.checked_add(36).is_some())
        .ok_or_else(|| CaptureError::InvalidInput(format!("{} bytes exceeds the WAV size limit", raw.len())))
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{:02x}", b)).collect()
}
