use std::fmt::Debug;
use num_enum::{TryFromPrimitive, TryFromPrimitiveError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("Unknown packet id {id} (0x{id:02X})")]
    UnknownPacketId { id: i32 },

    #[error("Packet {name} has a payload of {length} bytes which exceeds the max {max} bytes")]
    LengthExceedsMax { name: &'static str, length: usize, max: u32 },

    #[error("Packet {name} would decompress to {size} bytes which exceeds the max {max} bytes")]
    DecompressedSizeExceedsMax { name: &'static str, size: u64, max: u32 },

    #[error("Packet {name} (0x{id:02X}) cannot be instantiated for decoding")]
    InstantiationFailure { id: i32, name: &'static str },

    #[error("Type {type_name} is not a registered packet")]
    UnregisteredType { type_name: &'static str },

    #[error("Unsupported {family} type tag {tag}")]
    UnsupportedVariantTag { family: &'static str, tag: i32 },

    #[error("String in '{field}' too long: {len} bytes exceeds max {max} bytes")]
    StringTooLong { field: &'static str, len: usize, max: usize },

    #[error("EOF while reading '{field}'")]
    Eof { field: &'static str },

    #[error("VarInt overflow in '{field}'")]
    VarIntOverflow { field: &'static str },

    #[error("VarInt in '{field}' cannot encode negative value {value}")]
    NegativeVarInt { field: &'static str, value: i32 },

    #[error("Invalid UTF-8 in field '{field}'")]
    InvalidUtf8 { field: &'static str },

    #[error("Invalid enum value in '{field}': got {value}")]
    InvalidEnumValue { field: &'static str, value: i64 },

    #[error("Negative offset in '{field}': offset {offset} is invalid for a present field")]
    NegativeOffset { field: &'static str, offset: i32 },

    #[error("Out of bounds reading '{field}': position {position} but only {available} bytes available")]
    OutOfBounds { field: &'static str, position: usize, available: usize },

    #[error("Negative length {length} for packet {name}")]
    NegativeLength { name: &'static str, length: i32 },

    #[error("Collection in '{field}' too large: {count} entries exceeds max {max}")]
    CollectionTooLarge { field: &'static str, count: usize, max: usize },

    #[error("Duplicate key in '{field}'")]
    DuplicateKey { field: &'static str },

    #[error("Buffer too small for {name}: needs at least {needed} bytes, got {available}")]
    BufferTooSmall { name: &'static str, needed: usize, available: usize },

    #[error("{count} trailing bytes after packet {name}")]
    TrailingBytes { name: &'static str, count: usize },

    #[error("Null bit field of {size} bytes exceeds the max of {max} bytes")]
    BitFieldTooLarge { size: usize, max: usize },

    #[error("Null bit mask {mask:#x} does not fit a {size} byte bit field")]
    BitOutOfRange { mask: u64, size: usize },

    #[error("Recorded {count} offsets but the table has {expected} slots")]
    OffsetCountMismatch { count: usize, expected: usize },

    #[error("Encoding overflow in field '{field}'")]
    Overflow { field: &'static str },

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out waiting for a packet")]
    Timeout,

    #[error("Connection lost")]
    ConnectionLost,
}

impl PacketError {
    /// True when the error was caused by bytes sent by the peer, as opposed to a
    /// local mistake or a transport condition.
    pub fn is_protocol_violation(&self) -> bool {
        !matches!(
            self,
            Self::UnregisteredType { .. }
                | Self::OffsetCountMismatch { .. }
                | Self::BitOutOfRange { .. }
                | Self::Overflow { .. }
                | Self::Io(_)
                | Self::Timeout
                | Self::ConnectionLost
        )
    }
}

impl<T> From<TryFromPrimitiveError<T>> for PacketError
where
    T: TryFromPrimitive,
    T::Primitive: Into<i64>,
{
    fn from(err: TryFromPrimitiveError<T>) -> Self {
        PacketError::InvalidEnumValue {
            field: T::NAME,
            value: err.number.into(),
        }
    }
}
