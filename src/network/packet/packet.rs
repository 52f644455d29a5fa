use std::any::Any;
use std::fmt::Debug;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet_error::PacketError;

/// Width of one offset table entry.
pub const OFFSET_SLOT_WIDTH: u32 = 4;

/// Identity and layout of a packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketInfo {
    pub id: i32,
    pub name: &'static str,
    pub compressed: bool,
    pub null_bits_size: u8,
    pub fixed_block_size: u32,
    pub variable_field_count: u32,
    pub variable_block_start: u32,
    /// Ceiling on the payload as sent, after compression for compressed packets.
    pub max_size: u32,
}

impl PacketInfo {
    /// Checks the layout arithmetic, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        let expected = self.null_bits_size as u64
            + self.fixed_block_size as u64
            + self.variable_field_count as u64 * OFFSET_SLOT_WIDTH as u64;
        if self.variable_block_start as u64 != expected {
            return Err(format!(
                "variable block starts at {} but bitmap + fixed block + offsets = {}",
                self.variable_block_start, expected
            ));
        }
        if self.max_size < self.fixed_block_size {
            return Err(format!(
                "max size {} is smaller than the fixed block ({} bytes)",
                self.max_size, self.fixed_block_size
            ));
        }
        if self.null_bits_size as usize > crate::network::packet::bit_field::BitField::MAX_BYTES {
            return Err(format!("null bit field of {} bytes is too large", self.null_bits_size));
        }
        Ok(())
    }
}

pub trait Serialize {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError>;

    /// Exact or upper bound size of the serialized form, used to presize buffers.
    fn compute_size(&self) -> Option<usize> {
        None
    }
}

pub trait Deserialize {
    /// Populates a default constructed value from the reader.
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError>;
}

/// A record that can travel as the payload of a frame.
pub trait Packet: Serialize + Deserialize + Debug + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn type_name(&self) -> &'static str;
}

impl<T> Packet for T
where
    T: Serialize + Deserialize + Debug + Send + Sync + 'static,
{
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl dyn Packet {
    pub fn downcast_ref<T: Packet>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast<T: Packet>(self: Box<Self>) -> Result<Box<T>, Box<dyn Any>> {
        self.into_any().downcast::<T>()
    }
}

/// A packet with a static descriptor, registrable in the packet registry.
pub trait PacketType: Packet {
    const INFO: PacketInfo;
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: PacketInfo = PacketInfo {
        id: 7,
        name: "Valid",
        compressed: false,
        null_bits_size: 1,
        fixed_block_size: 4,
        variable_field_count: 2,
        variable_block_start: 13,
        max_size: 1024,
    };

    #[test]
    fn test_validate_layout() {
        assert!(VALID.validate().is_ok());

        let bad_start = PacketInfo { variable_block_start: 12, ..VALID };
        assert!(bad_start.validate().unwrap_err().contains("variable block"));

        let bad_max = PacketInfo { max_size: 3, ..VALID };
        assert!(bad_max.validate().unwrap_err().contains("max size"));

        let bad_bits = PacketInfo { null_bits_size: 9, variable_block_start: 21, ..VALID };
        assert!(bad_bits.validate().unwrap_err().contains("null bit field"));
    }
}
