use std::sync::Arc;

use crate::models::capture_buffer::{CaptureBuffer, PcmFormat};
use crate::models::error::CaptureError;

/// Receiver of captured audio buffers.
///
/// Called on the capture thread, so implementations must not block on I/O.
pub trait SamplesReadyCallback: Send + Sync {
    fn on_samples_ready(&self, buffer: CaptureBuffer);
}

/// Interface for platform audio capture sources.
pub trait CaptureSource: Send {
    /// Format of the buffers this source delivers.
    fn format(&self) -> PcmFormat;

    /// Start capturing, delivering buffers to `callback` on the source's own thread.
    fn start(&mut self, callback: Arc<dyn SamplesReadyCallback>) -> Result<(), CaptureError>;

    /// Stop capturing. No callbacks are delivered after this returns.
    fn stop(&mut self) -> Result<(), CaptureError>;
}
