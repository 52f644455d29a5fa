pub mod bit_field;
pub mod buffer_pool;
pub mod compression;
pub mod frame_reader;
pub mod frame_writer;
pub mod packet;
pub mod packet_decoder;
pub mod packet_encoder;
pub mod packet_error;
pub mod packet_field;
pub mod packet_io;
pub mod packet_macros;
pub mod packet_registry;
pub mod polymorphic;
pub mod var_int;

#[cfg(test)]
pub(crate) mod test_support;

/// `[length: i32 LE][id: i32 LE]`
pub const HEADER_SIZE: usize = 8;

/// Default ceiling for variable strings and byte arrays.
pub const MAX_STRING_LEN: usize = 4_096_000;

/// Default ceiling for array and dictionary entry counts.
pub const MAX_COLLECTION_LEN: usize = 4_096_000;
