use crate::network::packet::frame_reader::FrameReader;
use crate::network::packet::frame_writer::FrameWriter;
use crate::network::packet::packet_error::PacketError;

/// A closed family of record types sent behind a varint type tag.
///
/// Implementations are generated by [`variant_family!`](crate::variant_family).
pub trait VariantFamily: Sized {
    /// Family name used in errors.
    const FAMILY: &'static str;

    fn type_tag(&self) -> i32;

    /// Writes the concrete variant without its tag.
    fn serialize_variant(&self, writer: &mut FrameWriter) -> Result<(), PacketError>;

    /// Reads the concrete variant selected by `tag`. Unknown tags fail with
    /// [`PacketError::UnsupportedVariantTag`].
    fn deserialize_variant(tag: i32, reader: &mut FrameReader<'_>) -> Result<Self, PacketError>;
}
