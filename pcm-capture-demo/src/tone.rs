//! Synthetic capture source producing a sine tone.
//!
//! Stands in for a platform capture layer: delivers 10 ms buffers of 16-bit
//! PCM on a dedicated thread until stopped.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use pcm_capture_core::{CaptureBuffer, CaptureError, CaptureSource, PcmFormat, SamplesReadyCallback};

const BUFFER_MILLIS: u32 = 10;
const AMPLITUDE: f32 = 0.25;

pub struct ToneSource {
    format: PcmFormat,
    frequency_hz: f32,
    running: Arc<AtomicBool>,
    capture_handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl ToneSource {
    pub fn new(format: PcmFormat, frequency_hz: f32) -> Self {
        Self {
            format,
            frequency_hz,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: Mutex::new(None),
        }
    }
}

impl CaptureSource for ToneSource {
    fn format(&self) -> PcmFormat {
        self.format
    }

    fn start(&mut self, callback: Arc<dyn SamplesReadyCallback>) -> Result<(), CaptureError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CaptureError::ConfigurationFailed("tone source already running".into()));
        }
        self.format.validate().map_err(CaptureError::ConfigurationFailed)?;

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let format = self.format;
        let frequency_hz = self.frequency_hz;

        let handle = thread::Builder::new()
            .name("tone-capture".into())
            .spawn(move || {
                let mut oscillator = Oscillator::new(format, frequency_hz);
                while running.load(Ordering::SeqCst) {
                    callback.on_samples_ready(oscillator.next_buffer());
                    thread::sleep(Duration::from_millis(BUFFER_MILLIS as u64));
                }
            })
            .map_err(|e| {
                self.running.store(false, Ordering::SeqCst);
                CaptureError::ConfigurationFailed(format!("failed to spawn tone thread: {}", e))
            })?;

        *self.capture_handle.lock() = Some(handle);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CaptureError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_handle.lock().take() {
            let _ = handle.join();
        }
        Ok(())
    }
}

impl Drop for ToneSource {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Phase-continuous sine generator.
struct Oscillator {
    format: PcmFormat,
    phase: f32,
    step: f32,
}

impl Oscillator {
    fn new(format: PcmFormat, frequency_hz: f32) -> Self {
        Self {
            format,
            phase: 0.0,
            step: TAU * frequency_hz / format.sample_rate as f32,
        }
    }

    fn next_buffer(&mut self) -> CaptureBuffer {
        let frames = (self.format.sample_rate * BUFFER_MILLIS / 1000) as usize;
        let channels = self.format.channels as usize;
        let mut samples = Vec::with_capacity(frames * channels);
        for _ in 0..frames {
            let value = (self.phase.sin() * AMPLITUDE * i16::MAX as f32) as i16;
            samples.extend(std::iter::repeat(value).take(channels));
            self.phase = (self.phase + self.step) % TAU;
        }
        CaptureBuffer::from_samples(self.format.sample_rate, self.format.channels, &samples)
    }
}
