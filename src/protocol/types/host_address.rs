use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet::{Deserialize, Serialize};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::var_int::var_bytes_size;

pub const MAX_HOST_LEN: usize = 256;

/// Port followed by the host name, with the single variable field written inline.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HostAddress {
    pub host: String,
    pub port: i16,
}

impl Serialize for HostAddress {
    fn serialize(&self, writer: &mut FrameWriter) -> Result<(), PacketError> {
        writer.write_i16(self.port);
        writer.write_var_string(&self.host, MAX_HOST_LEN, "host")
    }

    fn compute_size(&self) -> Option<usize> {
        Some(2 + var_bytes_size(self.host.len()))
    }
}

impl Deserialize for HostAddress {
    fn deserialize(&mut self, reader: &mut FrameReader<'_>) -> Result<(), PacketError> {
        self.port = reader.read_i16("port")?;
        self.host = reader.read_var_string(MAX_HOST_LEN, "host")?;
        Ok(())
    }
}
