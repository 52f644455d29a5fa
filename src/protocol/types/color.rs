use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::packet_field::PacketField;

/// 24-bit RGB colour.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

impl PacketField for Color {
    const SIZE: usize = 3;

    fn encode(&self, writer: &mut FrameWriter) {
        writer.write_fixed_array(&[self.red, self.green, self.blue]);
    }

    fn decode(reader: &mut FrameReader<'_>, field: &'static str) -> Result<Self, PacketError> {
        let bytes = reader.read_fixed_array(Self::SIZE, field)?;
        Ok(Self::rgb(bytes[0], bytes[1], bytes[2]))
    }
}
