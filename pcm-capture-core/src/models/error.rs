use thiserror::Error;

/// Errors that can occur while recording or converting PCM audio.
///
/// The recorder only ever surfaces `StorageUnavailable`; everything it hits
/// after `start()` is logged and swallowed. Conversion propagates all of them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("storage unavailable")]
    StorageUnavailable,

    #[error("unsupported format: {0} bits per sample")]
    UnsupportedFormat(u16),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
