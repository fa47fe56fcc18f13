/// Size cap on a single raw recording file: roughly 10 minutes of mono
/// 16-bit audio at 48 kHz.
pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 58_348_800;

/// Configuration for a `PcmFileRecorder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderConfiguration {
    /// Writes stop once this many bytes have gone into the current file.
    ///
    /// Checked before each buffer is written, so a file can end up to one
    /// buffer larger than the cap.
    pub max_file_size_bytes: u64,
}

impl RecorderConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_file_size_bytes == 0 {
            return Err("max file size must be positive".into());
        }
        Ok(())
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
        }
    }
}
