//! # pcm-capture-core
//!
//! Records raw 16-bit PCM capture buffers to size-capped files, and wraps
//! raw PCM in WAV containers.
//!
//! Platform capture layers implement `CaptureSource` and deliver buffers to
//! a `PcmFileRecorder` through the `SamplesReadyCallback` trait. Storage is
//! abstracted by `StorageVolume`.
//!
//! ## Architecture
//!
//! ```text
//! pcm-capture-core (this crate)
//! ├── traits/       ← CaptureSource, SamplesReadyCallback, StorageVolume
//! ├── models/       ← CaptureError, CaptureBuffer, PcmFormat, RecorderState, etc.
//! ├── processing/   ← WAV header, PCM → WAV conversion
//! ├── session/      ← PcmFileRecorder, SerialWorker
//! └── storage/      ← RawPcmWriter, file naming, metadata sidecars
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::capture_buffer::{CaptureBuffer, PcmFormat};
pub use models::config::{RecorderConfiguration, DEFAULT_MAX_FILE_SIZE_BYTES};
pub use models::error::CaptureError;
pub use models::recording_info::{ConversionResult, RecordingMetadata};
pub use models::state::RecorderState;
pub use processing::pcm_to_wav::{convert_bytes, convert_file, convert_recording};
pub use processing::wav_format::WavHeader;
pub use session::recorder::PcmFileRecorder;
pub use traits::capture_source::{CaptureSource, SamplesReadyCallback};
pub use traits::storage::{LocalStorage, StorageVolume};
