use num_enum::{IntoPrimitive, TryFromPrimitive};
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, PacketInfo, PacketType, Serialize};
use crate::network::packet::packet_error::PacketError;

/// Latency check. The last measured round trips ride along so both sides
/// share the same view.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Ping {
    pub id: i32,
    pub sent_at_millis: i64,
    pub last_ping_raw: i32,
    pub last_ping_direct: i32,
    pub last_ping_tick: i32,
}

impl PacketType for Ping {
    const INFO: PacketInfo = PacketInfo {
        id: 2,
        name: "Ping",
        compressed: false,
        null_bits_size: 0,
        fixed_block_size: 24,
        variable_field_count: 0,
        variable_block_start: 24,
        max_size: 24,
    };
}

impl Serialize for Ping {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        writer.write_i32(self.id);
        writer.write_i64(self.sent_at_millis);
        writer.write_i32(self.last_ping_raw);
        writer.write_i32(self.last_ping_direct);
        writer.write_i32(self.last_ping_tick);
        Ok(())
    }

    fn compute_size(&self) -> Option<usize> {
        Some(Self::INFO.fixed_block_size as usize)
    }
}

impl Deserialize for Ping {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        self.id = reader.read_i32("id")?;
        self.sent_at_millis = reader.read_i64("sent_at_millis")?;
        self.last_ping_raw = reader.read_i32("last_ping_raw")?;
        self.last_ping_direct = reader.read_i32("last_ping_direct")?;
        self.last_ping_tick = reader.read_i32("last_ping_tick")?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PongType {
    #[default]
    Raw,
    Direct,
    Tick,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Pong {
    pub id: i32,
    pub sent_at_millis: i64,
    pub kind: PongType,
    pub packet_queue_size: i16,
}

impl PacketType for Pong {
    const INFO: PacketInfo = PacketInfo {
        id: 3,
        name: "Pong",
        compressed: false,
        null_bits_size: 0,
        fixed_block_size: 15,
        variable_field_count: 0,
        variable_block_start: 15,
        max_size: 15,
    };
}

impl Serialize for Pong {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        writer.write_i32(self.id);
        writer.write_i64(self.sent_at_millis);
        writer.write_enum(self.kind);
        writer.write_i16(self.packet_queue_size);
        Ok(())
    }

    fn compute_size(&self) -> Option<usize> {
        Some(Self::INFO.fixed_block_size as usize)
    }
}

impl Deserialize for Pong {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        self.id = reader.read_i32("id")?;
        self.sent_at_millis = reader.read_i64("sent_at_millis")?;
        self.kind = reader.read_enum("kind")?;
        self.packet_queue_size = reader.read_i16("packet_queue_size")?;
        Ok(())
    }
}
