use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;
use log::debug;
use crate::network::packet::compression::Compressor;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::packet::{Packet, PacketInfo};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::packet_registry::PacketRegistry;
use crate::network::packet::HEADER_SIZE;

/// A frame header that passed validation against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: usize,
    pub info: PacketInfo,
}

/// Validates and decodes frames from an untrusted peer.
pub struct PacketDecoder<'r> {
    registry: &'r PacketRegistry,
    compressor: Arc<dyn Compressor>,
}

impl<'r> PacketDecoder<'r> {
    pub fn new(registry: &'r PacketRegistry, compressor: Arc<dyn Compressor>) -> Self {
        Self { registry, compressor }
    }

    /// Checks the id and declared length before any payload byte is read.
    pub fn decode_header(&self, header: [u8; HEADER_SIZE]) -> Result<FrameHeader, PacketError> {
        let length = i32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let id = i32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        let entry = self.registry.lookup_by_id(id).ok_or(PacketError::UnknownPacketId { id })?;
        let info = entry.info;
        if entry.factory.is_none() {
            return Err(PacketError::InstantiationFailure { id, name: info.name });
        }

        if length < 0 {
            return Err(PacketError::NegativeLength { name: info.name, length });
        }
        if length as u32 > info.max_size {
            return Err(PacketError::LengthExceedsMax { name: info.name, length: length as usize, max: info.max_size });
        }

        Ok(FrameHeader { length: length as usize, info })
    }

    pub fn decode_payload(&self, header: &FrameHeader, payload: &[u8]) -> Result<Box<dyn Packet>, PacketError> {
        let start_time = Instant::now();
        let info = &header.info;

        if payload.len() < header.length {
            return Err(PacketError::Eof { field: "payload" });
        }
        if payload.len() > header.length {
            return Err(PacketError::TrailingBytes { name: info.name, count: payload.len() - header.length });
        }

        let mut packet = self
            .registry
            .instantiate(info.id)
            .ok_or(PacketError::InstantiationFailure { id: info.id, name: info.name })?;

        if header.length == 0 {
            return Ok(packet);
        }

        let data = if info.compressed {
            let size = self.compressor.decompressed_size(payload)?;
            if size > info.max_size as u64 {
                return Err(PacketError::DecompressedSizeExceedsMax { name: info.name, size, max: info.max_size });
            }
            Cow::Owned(self.compressor.decompress(payload, size as usize)?)
        } else {
            Cow::Borrowed(payload)
        };

        let needed = info.variable_block_start as usize;
        if data.len() < needed {
            return Err(PacketError::BufferTooSmall { name: info.name, needed, available: data.len() });
        }

        let mut reader = FrameReader::new(&data);
        packet.deserialize(&mut reader)?;

        debug!("Decoded Packet {} (0x{:02X}) in {:?}", info.name, info.id, start_time.elapsed());
        Ok(packet)
    }

    /// Decodes one complete in-memory frame.
    pub fn decode(&self, frame: &[u8]) -> Result<Box<dyn Packet>, PacketError> {
        let (header, payload) = frame
            .split_first_chunk::<HEADER_SIZE>()
            .ok_or(PacketError::Eof { field: "header" })?;
        let header = self.decode_header(*header)?;
        self.decode_payload(&header, payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use crate::network::packet::compression::ZstdCompressor;
    use crate::network::packet::packet_encoder::PacketEncoder;
    use crate::network::packet::test_support::{frame, test_registry, Blob, Empty, Note, Pinned};

    /// Claims a huge decompressed size and records whether decompression ran.
    struct ClaimsHuge {
        decompressed: AtomicBool,
    }

    impl Compressor for ClaimsHuge {
        fn compress(&self, data: &[u8]) -> Result<Vec<u8>, PacketError> {
            Ok(data.to_vec())
        }

        fn decompressed_size(&self, _: &[u8]) -> Result<u64, PacketError> {
            Ok(1 << 40)
        }

        fn decompress(&self, data: &[u8], _: usize) -> Result<Vec<u8>, PacketError> {
            self.decompressed.store(true, Ordering::SeqCst);
            Ok(data.to_vec())
        }
    }

    fn decoder(registry: &PacketRegistry) -> PacketDecoder<'_> {
        PacketDecoder::new(registry, Arc::new(ZstdCompressor::default()))
    }

    #[test]
    fn test_unknown_id() {
        let registry = test_registry();
        assert!(matches!(
            decoder(&registry).decode(&frame(0, 12345, &[])),
            Err(PacketError::UnknownPacketId { id: 12345 })
        ));
    }

    #[test]
    fn test_length_checked_in_header() {
        let registry = test_registry();
        let decoder = decoder(&registry);

        let mut header = [0u8; HEADER_SIZE];
        header[..4].copy_from_slice(&257i32.to_le_bytes());
        header[4..].copy_from_slice(&90i32.to_le_bytes());
        assert!(matches!(
            decoder.decode_header(header),
            Err(PacketError::LengthExceedsMax { name: "Note", length: 257, max: 256 })
        ));

        header[..4].copy_from_slice(&(-5i32).to_le_bytes());
        assert!(matches!(decoder.decode_header(header), Err(PacketError::NegativeLength { length: -5, .. })));
    }

    #[test]
    fn test_empty_payload_yields_defaults() {
        let registry = test_registry();
        let packet = decoder(&registry).decode(&frame(0, 92, &[])).unwrap();
        assert_eq!(packet.downcast_ref::<Empty>(), Some(&Empty));

        let note = decoder(&registry).decode(&frame(0, 90, &[])).unwrap();
        assert_eq!(note.downcast_ref::<Note>(), Some(&Note::default()));
    }

    #[test]
    fn test_outbound_only_cannot_be_decoded() {
        let registry = test_registry();
        assert!(matches!(
            decoder(&registry).decode(&frame(0, 93, &[])),
            Err(PacketError::InstantiationFailure { id: 93, name: "Pinned" })
        ));
        let _ = Pinned::default();
    }

    #[test]
    fn test_outbound_only_rejected_in_header() {
        let registry = test_registry();
        let mut header = [0u8; HEADER_SIZE];
        header[..4].copy_from_slice(&8i32.to_le_bytes());
        header[4..].copy_from_slice(&93i32.to_le_bytes());
        assert!(matches!(
            decoder(&registry).decode_header(header),
            Err(PacketError::InstantiationFailure { id: 93, name: "Pinned" })
        ));

        // length is not consulted once the id is known to be outbound only
        header[..4].copy_from_slice(&i32::MAX.to_le_bytes());
        assert!(matches!(
            decoder(&registry).decode_header(header),
            Err(PacketError::InstantiationFailure { id: 93, .. })
        ));
    }

    #[test]
    fn test_short_and_trailing_frames() {
        let registry = test_registry();
        let decoder = decoder(&registry);

        assert!(matches!(decoder.decode(&[1, 0, 0]), Err(PacketError::Eof { field: "header" })));

        let mut short = frame(4, 92, &[]);
        short.extend_from_slice(&[0, 0]);
        assert!(matches!(decoder.decode(&short), Err(PacketError::Eof { field: "payload" })));

        let mut long = frame(0, 92, &[]);
        long.push(0);
        assert!(matches!(decoder.decode(&long), Err(PacketError::TrailingBytes { count: 1, .. })));
    }

    #[test]
    fn test_payload_smaller_than_layout() {
        let registry = test_registry();
        assert!(matches!(
            decoder(&registry).decode(&frame(3, 90, &[0, 0, 0])),
            Err(PacketError::BufferTooSmall { name: "Note", .. })
        ));
    }

    #[test]
    fn test_compressed_round_trip() {
        let registry = test_registry();
        let compressor: Arc<dyn Compressor> = Arc::new(ZstdCompressor::default());
        let blob = Blob { data: vec![9; 150] };

        let bytes = PacketEncoder::new(&registry, compressor.clone()).encode(&blob).unwrap();
        let decoded = PacketDecoder::new(&registry, compressor).decode(&bytes).unwrap();
        assert_eq!(decoded.downcast_ref::<Blob>(), Some(&blob));
    }

    #[test]
    fn test_decompression_bomb_rejected_before_decompressing() {
        let registry = test_registry();
        let compressor = Arc::new(ClaimsHuge { decompressed: AtomicBool::new(false) });
        let decoder = PacketDecoder::new(&registry, compressor.clone());

        let result = decoder.decode(&frame(8, 91, &[0x28, 0xB5, 0x2F, 0xFD, 0, 0, 0, 0]));
        assert!(matches!(
            result,
            Err(PacketError::DecompressedSizeExceedsMax { name: "Blob", size, max: 210 }) if size == 1 << 40
        ));
        assert!(!compressor.decompressed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_zstd_declared_size_over_max() {
        let registry = test_registry();
        let decoder = PacketDecoder::new(&registry, Arc::new(ZstdCompressor::default()));

        // magic, single segment descriptor with a 4 byte content size of
        // 1_000_000, then an empty raw last block
        let payload = [0x28, 0xB5, 0x2F, 0xFD, 0xA0, 0x40, 0x42, 0x0F, 0x00, 0x01, 0x00, 0x00];
        assert!(matches!(
            decoder.decode(&frame(payload.len() as i32, 91, &payload)),
            Err(PacketError::DecompressedSizeExceedsMax { name: "Blob", size: 1_000_000, max: 210 })
        ));

        let zeros = zstd::bulk::compress(&[0u8; 100_000], 3).unwrap();
        assert!(zeros.len() <= 210);
        assert!(matches!(
            decoder.decode(&frame(zeros.len() as i32, 91, &zeros)),
            Err(PacketError::DecompressedSizeExceedsMax { name: "Blob", size: 100_000, max: 210 })
        ));
    }
}
