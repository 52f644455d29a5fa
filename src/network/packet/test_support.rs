//! Small packets shared by the codec unit tests.

use uuid::Uuid;
use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, PacketInfo, PacketType, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::packet_registry::{PacketRegistry, RegistryError};
use crate::register_packets;

/// Six optional fields: three fixed, three variable.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Note {
    pub name: Option<String>,
    pub body: Option<String>,
    pub author: Option<Uuid>,
    pub rating: Option<f32>,
    pub tags: Option<Vec<String>>,
    pub pinned_at: Option<i64>,
}

impl Note {
    pub const NAME: u64 = 1;
    pub const BODY: u64 = 2;
    pub const AUTHOR: u64 = 4;
    pub const RATING: u64 = 8;
    pub const TAGS: u64 = 16;
    pub const PINNED_AT: u64 = 32;
}

impl PacketType for Note {
    const INFO: PacketInfo = PacketInfo {
        id: 90,
        name: "Note",
        compressed: false,
        null_bits_size: 1,
        fixed_block_size: 28,
        variable_field_count: 3,
        variable_block_start: 41,
        max_size: 256,
    };
}

impl Serialize for Note {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::NAME, self.name.is_some())?;
        bits.set_if(Self::BODY, self.body.is_some())?;
        bits.set_if(Self::AUTHOR, self.author.is_some())?;
        bits.set_if(Self::RATING, self.rating.is_some())?;
        bits.set_if(Self::TAGS, self.tags.is_some())?;
        bits.set_if(Self::PINNED_AT, self.pinned_at.is_some())?;
        writer.write_bits(&bits);

        writer.write_opt(self.author.as_ref());
        writer.write_opt(self.rating.as_ref());
        writer.write_opt(self.pinned_at.as_ref());

        let mut offsets = writer.reserve_offsets::<3>();
        offsets.write_opt_string(self.name.as_deref(), 64, "name")?;
        offsets.write_opt_string(self.body.as_deref(), 4096, "body")?;
        offsets.write_opt_array(self.tags.as_deref(), 16, "tags", |w, tag| w.write_var_string(tag, 32, "tag"))?;
        offsets.finish()
    }
}

impl Deserialize for Note {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.author = reader.read_opt(bits.is_set(Self::AUTHOR), "author")?;
        self.rating = reader.read_opt(bits.is_set(Self::RATING), "rating")?;
        self.pinned_at = reader.read_opt(bits.is_set(Self::PINNED_AT), "pinned_at")?;

        let [name, body, tags] = reader.read_offsets::<3>()?;
        self.name = reader.read_opt_var_string(bits.is_set(Self::NAME), name, 64, "name")?;
        self.body = reader.read_opt_var_string(bits.is_set(Self::BODY), body, 4096, "body")?;
        self.tags = reader.read_opt_array(bits.is_set(Self::TAGS), tags, 16, "tags", |r| r.read_var_string(32, "tag"))?;
        Ok(())
    }
}

/// Compressed packet with a single byte array.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl PacketType for Blob {
    const INFO: PacketInfo = PacketInfo {
        id: 91,
        name: "Blob",
        compressed: true,
        null_bits_size: 0,
        fixed_block_size: 0,
        variable_field_count: 1,
        variable_block_start: 4,
        max_size: 210,
    };
}

impl Serialize for Blob {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut offsets = writer.reserve_offsets::<1>();
        offsets.write_bytes(&self.data, 1024, "data")?;
        offsets.finish()
    }
}

impl Deserialize for Blob {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let [data] = reader.read_offsets::<1>()?;
        self.data = reader.read_var_bytes_at(data, 1024, "data")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Empty;

impl PacketType for Empty {
    const INFO: PacketInfo = PacketInfo {
        id: 92,
        name: "Empty",
        compressed: false,
        null_bits_size: 0,
        fixed_block_size: 0,
        variable_field_count: 0,
        variable_block_start: 0,
        max_size: 16,
    };
}

impl Serialize for Empty {
    fn serialize(&self, _: &mut FrameWriter) -> Result<(), PacketError> {
        Ok(())
    }

    fn compute_size(&self) -> Option<usize> {
        Some(0)
    }
}

impl Deserialize for Empty {
    fn deserialize(&mut self, _: &mut FrameReader<'_>) -> Result<(), PacketError> {
        Ok(())
    }
}

/// Registered for sending only.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pinned {
    pub at: i64,
}

impl PacketType for Pinned {
    const INFO: PacketInfo = PacketInfo {
        id: 93,
        name: "Pinned",
        compressed: false,
        null_bits_size: 0,
        fixed_block_size: 8,
        variable_field_count: 0,
        variable_block_start: 8,
        max_size: 8,
    };
}

impl Serialize for Pinned {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        writer.write_i64(self.at);
        Ok(())
    }
}

impl Deserialize for Pinned {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        self.at = reader.read_i64("at")?;
        Ok(())
    }
}

/// Never registered.
#[derive(Debug, Default)]
pub struct Unregistered;

impl Serialize for Unregistered {
    fn serialize(&self, _: &mut FrameWriter) -> Result<(), PacketError> {
        Ok(())
    }
}

impl Deserialize for Unregistered {
    fn deserialize(&mut self, _: &mut FrameReader<'_>) -> Result<(), PacketError> {
        Ok(())
    }
}

fn build_registry() -> Result<PacketRegistry, RegistryError> {
    let mut registry = PacketRegistry::new();
    register_packets!(registry; Note, Blob, Empty; outbound: Pinned);
    Ok(registry)
}

pub fn test_registry() -> PacketRegistry {
    build_registry().expect("test packets have valid layouts")
}

/// Builds a frame with an arbitrary declared length.
pub fn frame(length: i32, id: i32, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + payload.len());
    out.extend_from_slice(&length.to_le_bytes());
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(payload);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::network::packet::compression::ZstdCompressor;
    use crate::network::packet::packet_decoder::PacketDecoder;
    use crate::network::packet::packet_encoder::PacketEncoder;
    use crate::network::packet::HEADER_SIZE;

    fn round_trip(note: &Note) -> (Vec<u8>, Note) {
        let registry = test_registry();
        let compressor = Arc::new(ZstdCompressor::default());
        let bytes = PacketEncoder::new(&registry, compressor.clone()).encode(note).unwrap();
        let decoded = PacketDecoder::new(&registry, compressor).decode(&bytes).unwrap();
        let decoded = decoded.downcast::<Note>().unwrap();
        (bytes[HEADER_SIZE..].to_vec(), *decoded)
    }

    fn note_with(mask: u64) -> Note {
        Note {
            name: (mask & Note::NAME != 0).then(|| "a".to_string()),
            body: (mask & Note::BODY != 0).then(|| "body text".to_string()),
            author: (mask & Note::AUTHOR != 0).then(|| Uuid::from_u128(0x1234)),
            rating: (mask & Note::RATING != 0).then_some(4.5),
            tags: (mask & Note::TAGS != 0).then(|| vec!["x".to_string(), String::new(), "zz".to_string()]),
            pinned_at: (mask & Note::PINNED_AT != 0).then_some(-9),
        }
    }

    #[test]
    fn test_every_presence_combination_round_trips() {
        for mask in 0..64u64 {
            let note = note_with(mask);
            let (payload, decoded) = round_trip(&note);
            assert_eq!(decoded, note, "mask {mask:#08b}");
            assert_eq!(payload[0] as u64, mask, "bitmap for mask {mask:#08b}");
        }
    }

    #[test]
    fn test_fixed_block_is_stable() {
        let (none, _) = round_trip(&note_with(0));
        let (fixed_only, _) = round_trip(&note_with(Note::AUTHOR | Note::RATING | Note::PINNED_AT));
        assert_eq!(none.len(), 41);
        assert_eq!(fixed_only.len(), 41);
        assert!(none[1..29].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_offsets_point_at_their_fields() {
        let (payload, _) = round_trip(&note_with(Note::BODY | Note::TAGS));
        let slot = |i: usize| i32::from_le_bytes(payload[29 + i * 4..33 + i * 4].try_into().unwrap());

        assert_eq!(slot(0), -1);
        assert_eq!(slot(1), 0);
        assert_eq!(payload[41], "body text".len() as u8);
        assert_eq!(slot(2), 1 + "body text".len() as i32);
        assert_eq!(payload[41 + slot(2) as usize], 3);
    }

    #[test]
    fn test_single_optional_string() {
        let note = Note { name: Some("a".into()), ..Default::default() };
        let (payload, decoded) = round_trip(&note);

        assert_eq!(decoded.name.as_deref(), Some("a"));
        assert_eq!(decoded, Note { name: Some("a".into()), ..Default::default() });
        assert_eq!(BitField::from_byte(payload[0]).count(), 1);
        assert_eq!(&payload[41..], &[1, b'a']);
    }
}
