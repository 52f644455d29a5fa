use uuid::Uuid;
use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet_error::PacketError;

/// A value with a fixed encoded width that lives in a record's fixed block.
///
/// When an optional field of this type is absent, `SIZE` zero bytes take its place.
pub trait PacketField: Sized {
    const SIZE: usize;

    fn encode(&self, writer: &mut FrameWriter);

    fn decode(reader: &mut FrameReader<'_>, field: &'static str) -> Result<Self, PacketError>;
}

macro_rules! le_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl PacketField for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn encode(&self, writer: &mut FrameWriter) {
                    writer.write_fixed_array(&self.to_le_bytes());
                }

                #[inline]
                fn decode(reader: &mut FrameReader<'_>, field: &'static str) -> Result<Self, PacketError> {
                    let bytes = reader.read_fixed_array(Self::SIZE, field)?;
                    let mut array = [0u8; std::mem::size_of::<$ty>()];
                    array.copy_from_slice(bytes);
                    Ok(<$ty>::from_le_bytes(array))
                }
            }
        )*
    };
}

le_field!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl PacketField for bool {
    const SIZE: usize = 1;

    #[inline]
    fn encode(&self, writer: &mut FrameWriter) {
        writer.write_u8(*self as u8);
    }

    #[inline]
    fn decode(reader: &mut FrameReader<'_>, field: &'static str) -> Result<Self, PacketError> {
        Ok(reader.read_u8(field)? != 0)
    }
}

impl PacketField for Uuid {
    const SIZE: usize = 16;

    #[inline]
    fn encode(&self, writer: &mut FrameWriter) {
        writer.write_uuid(*self);
    }

    #[inline]
    fn decode(reader: &mut FrameReader<'_>, field: &'static str) -> Result<Self, PacketError> {
        reader.read_uuid(field)
    }
}
