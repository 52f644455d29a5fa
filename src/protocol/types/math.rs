use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::packet_field::PacketField;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vector3f {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3f {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl PacketField for Vector3f {
    const SIZE: usize = 12;

    fn encode(&self, writer: &mut FrameWriter) {
        writer.write_f32(self.x);
        writer.write_f32(self.y);
        writer.write_f32(self.z);
    }

    fn decode(reader: &mut FrameReader<'_>, _field: &'static str) -> Result<Self, PacketError> {
        Ok(Self {
            x: reader.read_f32("x")?,
            y: reader.read_f32("y")?,
            z: reader.read_f32("z")?,
        })
    }
}

/// A near/far distance pair, e.g. fog bounds.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct NearFar {
    pub near: f32,
    pub far: f32,
}

impl PacketField for NearFar {
    const SIZE: usize = 8;

    fn encode(&self, writer: &mut FrameWriter) {
        writer.write_f32(self.near);
        writer.write_f32(self.far);
    }

    fn decode(reader: &mut FrameReader<'_>, _field: &'static str) -> Result<Self, PacketError> {
        Ok(Self {
            near: reader.read_f32("near")?,
            far: reader.read_f32("far")?,
        })
    }
}
