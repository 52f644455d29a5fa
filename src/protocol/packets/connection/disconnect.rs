use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;
use crate::network::packet::bit_field::BitField;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, PacketInfo, PacketType, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::var_int::var_bytes_size;

pub const MAX_REASON_LEN: usize = 4096;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Disconnect {
    pub reason: Option<String>,
    pub cause: DisconnectCause,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive, Display)]
#[repr(u8)]
pub enum DisconnectCause {
    #[default]
    Disconnect,
    Crash,
}

impl Disconnect {
    const REASON: u64 = 1;
}

impl PacketType for Disconnect {
    const INFO: PacketInfo = PacketInfo {
        id: 1,
        name: "Disconnect",
        compressed: false,
        null_bits_size: 1,
        fixed_block_size: 1,
        variable_field_count: 1,
        variable_block_start: 6,
        max_size: 4_104,
    };
}

impl Serialize for Disconnect {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        let mut bits = BitField::new(1);
        bits.set_if(Self::REASON, self.reason.is_some())?;
        writer.write_bits(&bits);
        writer.write_enum(self.cause);

        let mut offsets = writer.reserve_offsets::<1>();
        offsets.write_opt_string(self.reason.as_deref(), MAX_REASON_LEN, "reason")?;
        offsets.finish()
    }

    fn compute_size(&self) -> Option<usize> {
        let reason = self.reason.as_ref().map_or(0, |r| var_bytes_size(r.len()));
        Some(Self::INFO.variable_block_start as usize + reason)
    }
}

impl Deserialize for Disconnect {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        let bits = reader.read_bits(1)?;
        self.cause = reader.read_enum("cause")?;
        let [reason] = reader.read_offsets::<1>()?;
        self.reason = reader.read_opt_var_string(bits.is_set(Self::REASON), reason, MAX_REASON_LEN, "reason")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::network::packet::compression::ZstdCompressor;
    use crate::network::packet::packet_decoder::PacketDecoder;
    use crate::protocol::default_registry;
    use crate::protocol::packets::{test_encode, test_packet};

    #[test]
    fn test_disconnect() {
        let packet = Disconnect { reason: Some("test".to_string()), cause: DisconnectCause::Crash };
        let decoded = test_packet(&packet);
        assert_eq!(decoded, packet);
        assert_eq!(decoded.cause.to_string(), "Crash");
    }

    #[test]
    fn test_without_reason() {
        let packet = Disconnect::default();
        let frame = test_encode(&packet);
        assert_eq!(&frame[8..], &[0, 0, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(test_packet(&packet), packet);
    }

    #[test]
    fn test_unknown_cause() {
        let registry = default_registry().unwrap();
        let decoder = PacketDecoder::new(&registry, Arc::new(ZstdCompressor::default()));
        let mut frame = test_encode(&Disconnect::default());
        frame[9] = 7;
        assert!(matches!(
            decoder.decode(&frame),
            Err(PacketError::InvalidEnumValue { field: "cause", value: 7 })
        ));
    }
}
