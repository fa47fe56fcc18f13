use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;

/// Append-only raw PCM file with a soft size cap.
///
/// The cap is checked before each write and a payload is always written
/// whole, so the file may exceed `max_bytes` by at most one payload.
/// One writer corresponds to one file lifetime: its byte counter starts at
/// zero on open and goes away with it.
#[derive(Debug)]
pub struct RawPcmWriter {
    file_path: PathBuf,
    file: Option<File>,
    bytes_written: u64,
    max_bytes: u64,
}

impl RawPcmWriter {
    /// Create (or truncate) the file at `file_path`.
    pub fn create(file_path: PathBuf, max_bytes: u64) -> Result<Self, CaptureError> {
        let file = File::create(&file_path)
            .map_err(|e| CaptureError::StorageError(format!("failed to create {}: {}", file_path.display(), e)))?;
        Ok(Self {
            file_path,
            file: Some(file),
            bytes_written: 0,
            max_bytes,
        })
    }

    /// Append `data` if the cap has not been reached yet.
    ///
    /// Returns `Ok(false)` when the payload was dropped because of the cap.
    pub fn append(&mut self, data: &[u8]) -> Result<bool, CaptureError> {
        if self.is_full() {
            return Ok(false);
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| CaptureError::StorageError("file is not open".into()))?;
        file.write_all(data)
            .map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;
        self.bytes_written += data.len() as u64;
        Ok(true)
    }

    /// Flush and release the file handle. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<(), CaptureError> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };
        file.flush().map_err(|e| CaptureError::StorageError(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_full(&self) -> bool {
        self.bytes_written >= self.max_bytes
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}
