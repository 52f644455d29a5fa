use crate::network::packet::packet_error::PacketError;

/// A varint never needs more than 5 bytes for a non-negative i32.
pub const MAX_VAR_INT_BYTES: usize = 5;

#[inline]
pub fn var_int_size(value: i32) -> usize {
    match value as u32 {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

/// Encoded size of a varint length prefix followed by `len` bytes.
#[inline]
pub fn var_bytes_size(len: usize) -> usize {
    var_int_size(len.min(i32::MAX as usize) as i32) + len
}

#[inline]
pub fn write_var_int(buf: &mut Vec<u8>, value: i32, field: &'static str) -> Result<(), PacketError> {
    if value < 0 {
        return Err(PacketError::NegativeVarInt { field, value });
    }

    let mut value = value as u32;
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;

        if value == 0 {
            buf.push(byte);
            return Ok(());
        }

        buf.push(byte | 0x80);
    }
}

/// Reads a varint starting at `pos`, returning the value and the position after it.
#[inline]
pub fn read_var_int_at(buf: &[u8], mut pos: usize, field: &'static str) -> Result<(i32, usize), PacketError> {
    let mut value = 0u32;

    for i in 0..MAX_VAR_INT_BYTES {
        let Some(&byte) = buf.get(pos) else {
            return Err(PacketError::Eof { field });
        };
        pos += 1;

        // the fifth byte may only carry the top 3 bits of a positive i32
        if i == MAX_VAR_INT_BYTES - 1 && byte & 0xF8 != 0 {
            return Err(PacketError::VarIntOverflow { field });
        }

        value |= ((byte & 0x7F) as u32) << (7 * i);

        if byte & 0x80 == 0 {
            return Ok((value as i32, pos));
        }
    }

    Err(PacketError::VarIntOverflow { field })
}
