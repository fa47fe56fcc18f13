//! RIFF/WAVE header serialization.
//!
//! Only the canonical 44-byte PCM layout is produced and understood:
//!
//! ```text
//! [0-3]    "RIFF"
//! [4-7]    chunk size = 36 + data_length
//! [8-11]   "WAVE"
//! [12-15]  "fmt "
//! [16-19]  16 (PCM format chunk size)
//! [20-21]  1 (PCM format code)
//! [22-23]  channels
//! [24-27]  sample_rate
//! [28-31]  byte_rate = sample_rate * block_align
//! [32-33]  block_align = channels * bit_depth / 8
//! [34-35]  bit_depth
//! [36-39]  "data"
//! [40-43]  data_length
//! ```

use crate::models::capture_buffer::PcmFormat;
use crate::models::error::CaptureError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

const FMT_CHUNK_SIZE: u32 = 16;
const PCM_FORMAT_CODE: u16 = 1;

/// Header fields of a PCM WAV file. Everything else in the header is constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub format: PcmFormat,
    pub data_length: u32,
}

impl WavHeader {
    pub fn new(format: PcmFormat, data_length: u32) -> Self {
        Self { format, data_length }
    }

    /// RIFF chunk size (file size minus the 8-byte RIFF preamble).
    pub fn chunk_size(&self) -> u32 {
        36 + self.data_length
    }

    pub fn to_bytes(&self) -> [u8; WAV_HEADER_SIZE] {
        let format = &self.format;
        let mut header = [0u8; WAV_HEADER_SIZE];

        // RIFF chunk descriptor
        header[0..4].copy_from_slice(b"RIFF");
        header[4..8].copy_from_slice(&self.chunk_size().to_le_bytes());
        header[8..12].copy_from_slice(b"WAVE");

        // fmt sub-chunk
        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&FMT_CHUNK_SIZE.to_le_bytes());
        header[20..22].copy_from_slice(&PCM_FORMAT_CODE.to_le_bytes());
        header[22..24].copy_from_slice(&format.channels.to_le_bytes());
        header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&format.byte_rate().to_le_bytes());
        header[32..34].copy_from_slice(&format.block_align().to_le_bytes());
        header[34..36].copy_from_slice(&format.bit_depth.to_le_bytes());

        // data sub-chunk
        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&self.data_length.to_le_bytes());

        header
    }

    /// Parse a canonical 44-byte PCM header from the start of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, CaptureError> {
        if bytes.len() < WAV_HEADER_SIZE {
            return Err(CaptureError::InvalidInput(format!(
                "WAV header needs {} bytes, got {}",
                WAV_HEADER_SIZE,
                bytes.len()
            )));
        }
        if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
            return Err(CaptureError::InvalidInput("missing RIFF/WAVE magic".into()));
        }
        if &bytes[12..16] != b"fmt " || &bytes[36..40] != b"data" {
            return Err(CaptureError::InvalidInput("unexpected chunk layout".into()));
        }
        if read_u16(bytes, 20) != PCM_FORMAT_CODE {
            return Err(CaptureError::InvalidInput("not a PCM WAV file".into()));
        }

        let format = PcmFormat::new(read_u32(bytes, 24), read_u16(bytes, 22), read_u16(bytes, 34));
        Ok(Self::new(format, read_u32(bytes, 40)))
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}
