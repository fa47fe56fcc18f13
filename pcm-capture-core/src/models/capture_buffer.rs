use serde::{Deserialize, Serialize};

/// The only sample depth the recorder accepts.
pub const PCM_16_BIT: u16 = 16;

/// Format parameters of a raw PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PcmFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of interleaved channels (1 = mono, 2 = stereo).
    pub channels: u16,
    /// Bits per sample. Only 16 is accepted by the recorder and converter.
    pub bit_depth: u16,
}

impl PcmFormat {
    pub fn new(sample_rate: u32, channels: u16, bit_depth: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bit_depth,
        }
    }

    /// 16-bit PCM at the given rate and channel count.
    pub fn pcm16(sample_rate: u32, channels: u16) -> Self {
        Self::new(sample_rate, channels, PCM_16_BIT)
    }

    /// Bytes per sample frame across all channels.
    pub fn block_align(&self) -> u16 {
        self.channels.saturating_mul(self.bit_depth) / 8
    }

    /// Bytes per second. Saturates for formats `validate` rejects.
    pub fn byte_rate(&self) -> u32 {
        self.checked_byte_rate().unwrap_or(u32::MAX)
    }

    /// Bytes per second, or `None` if it does not fit the WAV header field.
    pub fn checked_byte_rate(&self) -> Option<u32> {
        self.channels
            .checked_mul(self.bit_depth)
            .and_then(|bits| self.sample_rate.checked_mul(u32::from(bits / 8)))
    }

    /// "mono" or "stereo", as embedded in recording file names.
    pub fn channel_label(&self) -> &'static str {
        if self.channels == 1 {
            "mono"
        } else {
            "stereo"
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.bit_depth != PCM_16_BIT {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        if self.checked_byte_rate().is_none() {
            return Err(format!("sample rate too high: {} Hz", self.sample_rate));
        }
        Ok(())
    }
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self::pcm16(48000, 1)
    }
}

/// One buffer of captured audio, as delivered by a capture source callback.
///
/// The payload holds little-endian 16-bit samples, interleaved when stereo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureBuffer {
    pub sample_rate: u32,
    pub channel_count: u16,
    pub bits_per_sample: u16,
    pub payload: Vec<u8>,
}

impl CaptureBuffer {
    pub fn new(format: PcmFormat, payload: Vec<u8>) -> Self {
        Self {
            sample_rate: format.sample_rate,
            channel_count: format.channels,
            bits_per_sample: format.bit_depth,
            payload,
        }
    }

    /// Build a 16-bit buffer from signed samples.
    pub fn from_samples(sample_rate: u32, channel_count: u16, samples: &[i16]) -> Self {
        let payload = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        Self::new(PcmFormat::pcm16(sample_rate, channel_count), payload)
    }

    pub fn format(&self) -> PcmFormat {
        PcmFormat::new(self.sample_rate, self.channel_count, self.bits_per_sample)
    }

    pub fn is_pcm16(&self) -> bool {
        self.bits_per_sample == PCM_16_BIT
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
