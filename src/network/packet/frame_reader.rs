use std::hash::Hash;
use ahash::{HashMap, HashMapExt};
use num_enum::TryFromPrimitive;
use uuid::Uuid;
use crate::network::packet::bit_field::BitField;
use crate::network::packet::packet::Deserialize;
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::packet_field::PacketField;
use crate::network::packet::polymorphic::VariantFamily;
use crate::network::packet::var_int::read_var_int_at;

/// Upper bound on the memory reserved up front for a decoded collection. Larger
/// collections grow as their items are actually read.
const MAX_PREALLOC_BYTES: usize = 64 * 1024;

/// Initial capacity for `count` items of `T` with `remaining` payload bytes
/// left. Every item takes at least one byte on the wire.
#[inline]
fn prealloc_capacity<T>(count: usize, remaining: usize) -> usize {
    count
        .min(remaining)
        .min(MAX_PREALLOC_BYTES / std::mem::size_of::<T>().max(1))
}

/// Bounds checked little-endian read cursor over a decoded payload.
///
/// Offset table entries are resolved against the variable block start of the
/// record currently being read. Nested reads save and restore that anchor, and
/// the reader remembers the furthest byte touched so a sequentially read record
/// with its own variable block can be skipped past in full.
#[derive(Debug)]
pub struct FrameReader<'a> {
    buf: &'a [u8],
    pos: usize,
    variable_block_start: usize,
    extent: usize,
}

impl<'a> FrameReader<'a> {
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, variable_block_start: 0, extent: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Furthest byte read so far.
    #[inline]
    pub fn extent(&self) -> usize {
        self.extent.max(self.pos)
    }

    #[inline]
    pub fn variable_block_start(&self) -> usize {
        self.variable_block_start
    }

    #[inline]
    pub fn set_variable_block_start(&mut self, pos: usize) {
        self.variable_block_start = pos;
    }

    #[inline]
    pub fn seek_to(&mut self, pos: usize, field: &'static str) -> Result<(), PacketError> {
        if pos > self.buf.len() {
            return Err(PacketError::OutOfBounds { field, position: pos, available: self.buf.len() });
        }
        self.pos = pos;
        Ok(())
    }

    #[inline]
    pub fn skip(&mut self, len: usize, field: &'static str) -> Result<(), PacketError> {
        self.take(len, field).map(|_| ())
    }

    #[inline]
    fn take(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], PacketError> {
        let end = self.pos.checked_add(len).ok_or(PacketError::Eof { field })?;
        if end > self.buf.len() {
            return Err(PacketError::Eof { field });
        }
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        self.extent = self.extent.max(end);
        Ok(slice)
    }

    #[inline]
    pub fn read_fixed_array(&mut self, len: usize, field: &'static str) -> Result<&'a [u8], PacketError> {
        self.take(len, field)
    }

    #[inline]
    fn read_array_of<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], PacketError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N, field)?);
        Ok(array)
    }

    #[inline]
    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, PacketError> {
        Ok(self.take(1, field)?[0])
    }

    #[inline]
    pub fn read_i8(&mut self, field: &'static str) -> Result<i8, PacketError> {
        Ok(self.read_u8(field)? as i8)
    }

    #[inline]
    pub fn read_bool(&mut self, field: &'static str) -> Result<bool, PacketError> {
        Ok(self.read_u8(field)? != 0)
    }

    #[inline]
    pub fn read_u16(&mut self, field: &'static str) -> Result<u16, PacketError> {
        self.read_array_of(field).map(u16::from_le_bytes)
    }

    #[inline]
    pub fn read_i16(&mut self, field: &'static str) -> Result<i16, PacketError> {
        self.read_array_of(field).map(i16::from_le_bytes)
    }

    #[inline]
    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, PacketError> {
        self.read_array_of(field).map(u32::from_le_bytes)
    }

    #[inline]
    pub fn read_i32(&mut self, field: &'static str) -> Result<i32, PacketError> {
        self.read_array_of(field).map(i32::from_le_bytes)
    }

    #[inline]
    pub fn read_u64(&mut self, field: &'static str) -> Result<u64, PacketError> {
        self.read_array_of(field).map(u64::from_le_bytes)
    }

    #[inline]
    pub fn read_i64(&mut self, field: &'static str) -> Result<i64, PacketError> {
        self.read_array_of(field).map(i64::from_le_bytes)
    }

    #[inline]
    pub fn read_f32(&mut self, field: &'static str) -> Result<f32, PacketError> {
        self.read_array_of(field).map(f32::from_le_bytes)
    }

    #[inline]
    pub fn read_f64(&mut self, field: &'static str) -> Result<f64, PacketError> {
        self.read_array_of(field).map(f64::from_le_bytes)
    }

    /// Reads a `#[repr(u8)]` enum, rejecting unknown discriminants.
    #[inline]
    pub fn read_enum<E>(&mut self, field: &'static str) -> Result<E, PacketError>
    where
        E: TryFromPrimitive<Primitive = u8>,
    {
        let value = self.read_u8(field)?;
        E::try_from_primitive(value).map_err(|_| PacketError::InvalidEnumValue { field, value: value as i64 })
    }

    #[inline]
    pub fn read_uuid(&mut self, field: &'static str) -> Result<Uuid, PacketError> {
        self.read_array_of(field).map(Uuid::from_bytes)
    }

    /// Reads a zero padded string of exactly `len` bytes.
    #[inline]
    pub fn read_fixed_string(&mut self, len: usize, field: &'static str) -> Result<String, PacketError> {
        let bytes = self.take(len, field)?;
        let end = memchr::memchr(0, bytes).unwrap_or(len);
        String::from_utf8(bytes[..end].to_vec()).map_err(|_| PacketError::InvalidUtf8 { field })
    }

    #[inline]
    pub fn read_bits(&mut self, size: usize) -> Result<BitField, PacketError> {
        if size > BitField::MAX_BYTES {
            return Err(PacketError::BitFieldTooLarge { size, max: BitField::MAX_BYTES });
        }
        BitField::from_bytes(self.take(size, "null_bits")?)
    }

    /// Reads an offset table and anchors the variable block right after it.
    #[inline]
    pub fn read_offsets<const N: usize>(&mut self) -> Result<[i32; N], PacketError> {
        let mut offsets = [0i32; N];
        for offset in &mut offsets {
            *offset = self.read_i32("offsets")?;
        }
        self.variable_block_start = self.pos;
        Ok(offsets)
    }

    #[inline]
    pub fn read_var_int(&mut self, field: &'static str) -> Result<i32, PacketError> {
        let (value, next) = read_var_int_at(self.buf, self.pos, field)?;
        self.pos = next;
        self.extent = self.extent.max(next);
        Ok(value)
    }

    #[inline]
    fn read_count(&mut self, max: usize, field: &'static str) -> Result<usize, PacketError> {
        let count = self.read_var_int(field)?;
        if count < 0 {
            return Err(PacketError::NegativeVarInt { field, value: count });
        }
        let count = count as usize;
        if count > max {
            return Err(PacketError::CollectionTooLarge { field, count, max });
        }
        Ok(count)
    }

    #[inline]
    pub fn read_var_string(&mut self, max: usize, field: &'static str) -> Result<String, PacketError> {
        let len = self.read_var_int(field)?;
        if len < 0 {
            return Err(PacketError::NegativeVarInt { field, value: len });
        }
        let len = len as usize;
        if len > max {
            return Err(PacketError::StringTooLong { field, len, max });
        }
        let bytes = self.take(len, field)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| PacketError::InvalidUtf8 { field })
    }

    #[inline]
    pub fn read_var_bytes(&mut self, max: usize, field: &'static str) -> Result<Vec<u8>, PacketError> {
        let len = self.read_count(max, field)?;
        Ok(self.take(len, field)?.to_vec())
    }

    #[inline]
    pub fn read_fixed<T: PacketField>(&mut self, field: &'static str) -> Result<T, PacketError> {
        T::decode(self, field)
    }

    /// Reads the value when present, otherwise skips its `T::SIZE` placeholder.
    #[inline]
    pub fn read_opt<T: PacketField>(&mut self, present: bool, field: &'static str) -> Result<Option<T>, PacketError> {
        if present {
            T::decode(self, field).map(Some)
        } else {
            self.skip(T::SIZE, field)?;
            Ok(None)
        }
    }

    /// Reads a nested record in place. The cursor ends after the furthest byte
    /// the record used and the caller's anchor is kept.
    pub fn read_object<T: Deserialize + Default>(&mut self) -> Result<T, PacketError> {
        let saved_anchor = self.variable_block_start;
        let saved_extent = self.extent;
        self.extent = self.pos;

        let mut value = T::default();
        let result = value.deserialize(self);

        let end = self.extent.max(self.pos);
        self.pos = end;
        self.extent = saved_extent.max(end);
        self.variable_block_start = saved_anchor;
        result.map(|_| value)
    }

    /// Reads the type tag then the matching variant.
    #[inline]
    pub fn read_tagged<F: VariantFamily>(&mut self) -> Result<F, PacketError> {
        let tag = self.read_var_int(F::FAMILY)?;
        F::deserialize_variant(tag, self)
    }

    pub fn read_array<T>(
        &mut self,
        max: usize,
        field: &'static str,
        mut read_item: impl FnMut(&mut Self) -> Result<T, PacketError>,
    ) -> Result<Vec<T>, PacketError> {
        let count = self.read_count(max, field)?;
        let mut items = Vec::with_capacity(prealloc_capacity::<T>(count, self.remaining()));
        for _ in 0..count {
            items.push(read_item(self)?);
        }
        Ok(items)
    }

    pub fn read_dictionary<K, V>(
        &mut self,
        max: usize,
        field: &'static str,
        mut read_key: impl FnMut(&mut Self) -> Result<K, PacketError>,
        mut read_value: impl FnMut(&mut Self) -> Result<V, PacketError>,
    ) -> Result<HashMap<K, V>, PacketError>
    where
        K: Eq + Hash,
    {
        let count = self.read_count(max, field)?;
        let mut map = HashMap::with_capacity(prealloc_capacity::<(K, V)>(count, self.remaining()));
        for _ in 0..count {
            let key = read_key(self)?;
            let value = read_value(self)?;
            if map.insert(key, value).is_some() {
                return Err(PacketError::DuplicateKey { field });
            }
        }
        Ok(map)
    }

    #[inline]
    fn resolve_offset(&self, offset: i32, field: &'static str) -> Result<usize, PacketError> {
        if offset < 0 {
            return Err(PacketError::NegativeOffset { field, offset });
        }
        let position = self.variable_block_start + offset as usize;
        if position > self.buf.len() {
            return Err(PacketError::OutOfBounds { field, position, available: self.buf.len() });
        }
        Ok(position)
    }

    /// Runs `read` at `variable_block_start + offset`, then restores the cursor and anchor.
    pub fn read_at<R>(
        &mut self,
        offset: i32,
        field: &'static str,
        read: impl FnOnce(&mut Self) -> Result<R, PacketError>,
    ) -> Result<R, PacketError> {
        let target = self.resolve_offset(offset, field)?;
        let saved_pos = self.pos;
        let saved_anchor = self.variable_block_start;

        self.pos = target;
        let result = read(self);

        self.pos = saved_pos;
        self.variable_block_start = saved_anchor;
        result
    }

    #[inline]
    fn read_opt_at<R>(
        &mut self,
        present: bool,
        offset: i32,
        field: &'static str,
        read: impl FnOnce(&mut Self) -> Result<R, PacketError>,
    ) -> Result<Option<R>, PacketError> {
        if present {
            self.read_at(offset, field, read).map(Some)
        } else {
            Ok(None)
        }
    }

    #[inline]
    pub fn read_var_string_at(&mut self, offset: i32, max: usize, field: &'static str) -> Result<String, PacketError> {
        self.read_at(offset, field, |r| r.read_var_string(max, field))
    }

    #[inline]
    pub fn read_opt_var_string(
        &mut self,
        present: bool,
        offset: i32,
        max: usize,
        field: &'static str,
    ) -> Result<Option<String>, PacketError> {
        self.read_opt_at(present, offset, field, |r| r.read_var_string(max, field))
    }

    #[inline]
    pub fn read_var_bytes_at(&mut self, offset: i32, max: usize, field: &'static str) -> Result<Vec<u8>, PacketError> {
        self.read_at(offset, field, |r| r.read_var_bytes(max, field))
    }

    #[inline]
    pub fn read_opt_var_bytes(
        &mut self,
        present: bool,
        offset: i32,
        max: usize,
        field: &'static str,
    ) -> Result<Option<Vec<u8>>, PacketError> {
        self.read_opt_at(present, offset, field, |r| r.read_var_bytes(max, field))
    }

    #[inline]
    pub fn read_field_at<T: PacketField>(&mut self, offset: i32, field: &'static str) -> Result<T, PacketError> {
        self.read_at(offset, field, |r| T::decode(r, field))
    }

    #[inline]
    pub fn read_opt_field<T: PacketField>(
        &mut self,
        present: bool,
        offset: i32,
        field: &'static str,
    ) -> Result<Option<T>, PacketError> {
        self.read_opt_at(present, offset, field, |r| T::decode(r, field))
    }

    #[inline]
    pub fn read_object_at<T: Deserialize + Default>(&mut self, offset: i32, field: &'static str) -> Result<T, PacketError> {
        self.read_at(offset, field, |r| r.read_object())
    }

    #[inline]
    pub fn read_opt_object<T: Deserialize + Default>(
        &mut self,
        present: bool,
        offset: i32,
        field: &'static str,
    ) -> Result<Option<T>, PacketError> {
        self.read_opt_at(present, offset, field, |r| r.read_object())
    }

    #[inline]
    pub fn read_tagged_at<F: VariantFamily>(&mut self, offset: i32) -> Result<F, PacketError> {
        self.read_at(offset, F::FAMILY, |r| r.read_tagged())
    }

    #[inline]
    pub fn read_opt_tagged<F: VariantFamily>(&mut self, present: bool, offset: i32) -> Result<Option<F>, PacketError> {
        self.read_opt_at(present, offset, F::FAMILY, |r| r.read_tagged())
    }

    #[inline]
    pub fn read_array_at<T>(
        &mut self,
        offset: i32,
        max: usize,
        field: &'static str,
        read_item: impl FnMut(&mut Self) -> Result<T, PacketError>,
    ) -> Result<Vec<T>, PacketError> {
        self.read_at(offset, field, |r| r.read_array(max, field, read_item))
    }

    #[inline]
    pub fn read_opt_array<T>(
        &mut self,
        present: bool,
        offset: i32,
        max: usize,
        field: &'static str,
        read_item: impl FnMut(&mut Self) -> Result<T, PacketError>,
    ) -> Result<Option<Vec<T>>, PacketError> {
        self.read_opt_at(present, offset, field, |r| r.read_array(max, field, read_item))
    }

    #[inline]
    pub fn read_dictionary_at<K: Eq + Hash, V>(
        &mut self,
        offset: i32,
        max: usize,
        field: &'static str,
        read_key: impl FnMut(&mut Self) -> Result<K, PacketError>,
        read_value: impl FnMut(&mut Self) -> Result<V, PacketError>,
    ) -> Result<HashMap<K, V>, PacketError> {
        self.read_at(offset, field, |r| r.read_dictionary(max, field, read_key, read_value))
    }

    #[inline]
    pub fn read_opt_dictionary<K: Eq + Hash, V>(
        &mut self,
        present: bool,
        offset: i32,
        max: usize,
        field: &'static str,
        read_key: impl FnMut(&mut Self) -> Result<K, PacketError>,
        read_value: impl FnMut(&mut Self) -> Result<V, PacketError>,
    ) -> Result<Option<HashMap<K, V>>, PacketError> {
        self.read_opt_at(present, offset, field, |r| r.read_dictionary(max, field, read_key, read_value))
    }
}
