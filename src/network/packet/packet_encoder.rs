use std::sync::Arc;
use std::time::Instant;
use log::debug;
use crate::network::packet::compression::Compressor;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::Packet;
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::packet_registry::PacketRegistry;
use crate::network::packet::HEADER_SIZE;

const DEFAULT_PAYLOAD_CAPACITY: usize = 512;

/// Turns packets into `[length][id][payload]` frames.
pub struct PacketEncoder<'r> {
    registry: &'r PacketRegistry,
    compressor: Arc<dyn Compressor>,
}

impl<'r> PacketEncoder<'r> {
    pub fn new(registry: &'r PacketRegistry, compressor: Arc<dyn Compressor>) -> Self {
        Self { registry, compressor }
    }

    #[inline]
    pub fn encode(&self, packet: &dyn Packet) -> Result<Vec<u8>, PacketError> {
        let mut out = Vec::new();
        self.encode_into(packet, &mut out)?;
        Ok(out)
    }

    /// Appends one frame to `out`. Nothing is appended on error.
    pub fn encode_into(&self, packet: &dyn Packet, out: &mut Vec<u8>) -> Result<(), PacketError> {
        let start_time = Instant::now();
        let info = self
            .registry
            .lookup_for(packet)
            .ok_or(PacketError::UnregisteredType { type_name: packet.type_name() })?;

        let capacity = packet.compute_size().unwrap_or(DEFAULT_PAYLOAD_CAPACITY);
        let mut writer = FrameWriter::with_capacity(capacity);
        packet.serialize(&mut writer)?;
        let mut payload = writer.into_inner();

        let max = info.max_size;
        if payload.len() > max as usize {
            return Err(PacketError::LengthExceedsMax { name: info.name, length: payload.len(), max });
        }

        if info.compressed && !payload.is_empty() {
            let uncompressed = payload.len();
            payload = self.compressor.compress(&payload)?;
            if payload.len() > max as usize {
                return Err(PacketError::LengthExceedsMax { name: info.name, length: payload.len(), max });
            }
            debug!("Compressed Packet {} from {} to {} bytes", info.name, uncompressed, payload.len());
        }

        let length = i32::try_from(payload.len()).map_err(|_| PacketError::Overflow { field: "length" })?;

        out.reserve(HEADER_SIZE + payload.len());
        out.extend_from_slice(&length.to_le_bytes());
        out.extend_from_slice(&info.id.to_le_bytes());
        out.extend_from_slice(&payload);

        debug!("Encoded Packet {} (0x{:02X}) in {:?}", info.name, info.id, start_time.elapsed());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::packet::compression::ZstdCompressor;
    use crate::network::packet::test_support::{test_registry, Blob, Note, Unregistered};

    fn encoder(registry: &PacketRegistry) -> PacketEncoder<'_> {
        PacketEncoder::new(registry, Arc::new(ZstdCompressor::default()))
    }

    #[test]
    fn test_header_layout() {
        let registry = test_registry();
        let frame = encoder(&registry).encode(&Note::default()).unwrap();

        let length = i32::from_le_bytes(frame[0..4].try_into().unwrap());
        let id = i32::from_le_bytes(frame[4..8].try_into().unwrap());
        assert_eq!(id, 90);
        assert_eq!(length as usize, frame.len() - HEADER_SIZE);
    }

    #[test]
    fn test_unregistered_type() {
        let registry = test_registry();
        assert!(matches!(
            encoder(&registry).encode(&Unregistered),
            Err(PacketError::UnregisteredType { .. })
        ));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let registry = test_registry();
        let note = Note { body: Some("x".repeat(300)), ..Default::default() };
        let mut out = vec![0xAA];
        assert!(matches!(
            encoder(&registry).encode_into(&note, &mut out),
            Err(PacketError::LengthExceedsMax { name: "Note", max: 256, .. })
        ));
        assert_eq!(out, vec![0xAA]);
    }

    #[test]
    fn test_compressed_size_is_checked() {
        let registry = test_registry();

        // 200 repeated bytes shrink well below the ceiling
        let compressible = Blob { data: vec![1; 200] };
        let frame = encoder(&registry).encode(&compressible).unwrap();
        assert!(frame.len() - HEADER_SIZE < 100);

        let mut state = 0x1234_5678u32;
        let noisy: Vec<u8> = (0..200)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();
        assert!(matches!(
            encoder(&registry).encode(&Blob { data: noisy }),
            Err(PacketError::LengthExceedsMax { name: "Blob", .. })
        ));
    }
}
