//! Raw recording file names.
//!
//! Files are named `<unix-epoch-millis>_16bits_<rate>Hz_<mono|stereo>.pcm` so
//! that an external player (or `convert_recording`) can recover the format.

use std::path::{Path, PathBuf};

use crate::models::capture_buffer::{PcmFormat, PCM_16_BIT};
use crate::models::error::CaptureError;

pub const RAW_EXTENSION: &str = "pcm";

pub fn recording_file_name(epoch_millis: i64, format: &PcmFormat) -> String {
    format!(
        "{}_{}bits_{}Hz_{}.{}",
        epoch_millis,
        PCM_16_BIT,
        format.sample_rate,
        format.channel_label(),
        RAW_EXTENSION
    )
}

/// Path for a new recording under `root`, stamped with the current time.
pub fn new_recording_path(root: &Path, format: &PcmFormat) -> PathBuf {
    root.join(recording_file_name(chrono::Utc::now().timestamp_millis(), format))
}

/// Recover the timestamp and format from a name built by `recording_file_name`.
pub fn parse_recording_file_name(name: &str) -> Result<(i64, PcmFormat), CaptureError> {
    let invalid = || CaptureError::InvalidInput(format!("not a recording file name: {}", name));

    let stem = name
        .strip_suffix(RAW_EXTENSION)
        .and_then(|s| s.strip_suffix('.'))
        .ok_or_else(invalid)?;
    let parts: Vec<&str> = stem.split('_').collect();
    let [millis, bits, rate, layout] = parts.as_slice() else {
        return Err(invalid());
    };

    let epoch_millis = millis.parse::<i64>().map_err(|_| invalid())?;
    let bit_depth = bits
        .strip_suffix("bits")
        .and_then(|b| b.parse::<u16>().ok())
        .ok_or_else(invalid)?;
    let sample_rate = rate
        .strip_suffix("Hz")
        .and_then(|r| r.parse::<u32>().ok())
        .ok_or_else(invalid)?;
    let channels = match *layout {
        "mono" => 1,
        "stereo" => 2,
        _ => return Err(invalid()),
    };

    Ok((epoch_millis, PcmFormat::new(sample_rate, channels, bit_depth)))
}
