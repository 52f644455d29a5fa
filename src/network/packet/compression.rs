use log::trace;
use crate::network::packet::packet_error::PacketError;

pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Payload compression used for packets flagged `compressed`.
pub trait Compressor: Send + Sync {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, PacketError>;

    /// Size the data claims to decompress to, read without decompressing it.
    fn decompressed_size(&self, data: &[u8]) -> Result<u64, PacketError>;

    /// Decompresses into exactly `expected_size` bytes.
    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, PacketError>;
}

#[derive(Debug, Clone, Copy)]
pub struct ZstdCompressor {
    level: i32,
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }

    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl Compressor for ZstdCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, PacketError> {
        let compressed = zstd::bulk::compress(data, self.level)
            .map_err(|e| PacketError::Compression(e.to_string()))?;
        trace!("Compressed {} bytes into {}", data.len(), compressed.len());
        Ok(compressed)
    }

    fn decompressed_size(&self, data: &[u8]) -> Result<u64, PacketError> {
        match zstd::zstd_safe::get_frame_content_size(data) {
            Ok(Some(size)) => Ok(size),
            Ok(None) => Err(PacketError::Compression("zstd frame does not declare its content size".into())),
            Err(_) => Err(PacketError::Compression("invalid zstd frame header".into())),
        }
    }

    fn decompress(&self, data: &[u8], expected_size: usize) -> Result<Vec<u8>, PacketError> {
        let decompressed = zstd::bulk::decompress(data, expected_size)
            .map_err(|e| PacketError::Compression(e.to_string()))?;
        if decompressed.len() != expected_size {
            return Err(PacketError::Compression(format!(
                "decompressed {} bytes but the frame declared {}",
                decompressed.len(),
                expected_size
            )));
        }
        Ok(decompressed)
    }
}
