use uuid::Uuid;
use crate::network::packet::bit_field::BitField;
use crate::network::packet::packet::{Serialize, OFFSET_SLOT_WIDTH};
use crate::network::packet::packet_error::PacketError;
use crate::network::packet::packet_field::PacketField;
use crate::network::packet::polymorphic::VariantFamily;
use crate::network::packet::var_int::write_var_int;

const SLOT_WIDTH: usize = OFFSET_SLOT_WIDTH as usize;

/// Byte index of a reserved offset slot inside a [`FrameWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetSlot(usize);

impl OffsetSlot {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Append-only little-endian write cursor.
#[derive(Debug, Default)]
pub struct FrameWriter {
    buf: Vec<u8>,
}

impl FrameWriter {
    #[inline]
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::with_capacity(capacity) }
    }

    /// Continues writing at the end of an existing buffer, e.g. one taken from a pool.
    #[inline]
    pub fn from_vec(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn write_u8(&mut self, val: u8) {
        self.buf.push(val);
    }

    #[inline]
    pub fn write_i8(&mut self, val: i8) {
        self.buf.push(val as u8);
    }

    #[inline]
    pub fn write_bool(&mut self, val: bool) {
        self.buf.push(val as u8);
    }

    #[inline]
    pub fn write_u16(&mut self, val: u16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_i16(&mut self, val: i16) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_u32(&mut self, val: u32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_i32(&mut self, val: i32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_u64(&mut self, val: u64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_i64(&mut self, val: i64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_f32(&mut self, val: f32) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    #[inline]
    pub fn write_f64(&mut self, val: f64) {
        self.buf.extend_from_slice(&val.to_le_bytes());
    }

    /// Writes a `#[repr(u8)]` enum through its `IntoPrimitive` conversion.
    #[inline]
    pub fn write_enum<E: Into<u8>>(&mut self, val: E) {
        self.buf.push(val.into());
    }

    #[inline]
    pub fn write_uuid(&mut self, uuid: Uuid) {
        self.buf.extend_from_slice(uuid.as_bytes());
    }

    #[inline]
    pub fn write_fixed_array(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    #[inline]
    pub fn write_zero(&mut self, len: usize) {
        self.buf.resize(self.buf.len() + len, 0);
    }

    /// Writes an ASCII string into exactly `len` bytes, padding with zeros.
    #[inline]
    pub fn write_fixed_string(&mut self, s: &str, len: usize, field: &'static str) -> Result<(), PacketError> {
        if s.len() > len {
            return Err(PacketError::StringTooLong { field, len: s.len(), max: len });
        }
        self.buf.extend_from_slice(s.as_bytes());
        self.write_zero(len - s.len());
        Ok(())
    }

    #[inline]
    pub fn write_var_int(&mut self, val: i32, field: &'static str) -> Result<(), PacketError> {
        write_var_int(&mut self.buf, val, field)
    }

    #[inline]
    fn write_len(&mut self, len: usize, field: &'static str) -> Result<(), PacketError> {
        let len = i32::try_from(len).map_err(|_| PacketError::Overflow { field })?;
        self.write_var_int(len, field)
    }

    #[inline]
    pub fn write_var_string(&mut self, s: &str, max: usize, field: &'static str) -> Result<(), PacketError> {
        if s.len() > max {
            return Err(PacketError::StringTooLong { field, len: s.len(), max });
        }
        self.write_len(s.len(), field)?;
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    #[inline]
    pub fn write_var_bytes(&mut self, data: &[u8], max: usize, field: &'static str) -> Result<(), PacketError> {
        if data.len() > max {
            return Err(PacketError::CollectionTooLarge { field, count: data.len(), max });
        }
        self.write_len(data.len(), field)?;
        self.buf.extend_from_slice(data);
        Ok(())
    }

    #[inline]
    pub fn write_bits(&mut self, bits: &BitField) {
        self.buf.extend(bits.to_bytes());
    }

    #[inline]
    pub fn write_fixed<T: PacketField>(&mut self, val: &T) {
        val.encode(self);
    }

    /// Writes the value, or `T::SIZE` zero bytes when absent.
    #[inline]
    pub fn write_opt<T: PacketField>(&mut self, val: Option<&T>) {
        match val {
            Some(v) => v.encode(self),
            None => self.write_zero(T::SIZE),
        }
    }

    #[inline]
    pub fn write_object<T: Serialize>(&mut self, val: &T) -> Result<(), PacketError> {
        val.serialize(self)
    }

    /// Writes the variant's type tag as a varint followed by its payload.
    #[inline]
    pub fn write_tagged<F: VariantFamily>(&mut self, val: &F) -> Result<(), PacketError> {
        self.write_var_int(val.type_tag(), F::FAMILY)?;
        val.serialize_variant(self)
    }

    /// Varint count followed by each item.
    pub fn write_array<T>(
        &mut self,
        items: &[T],
        max: usize,
        field: &'static str,
        mut write_item: impl FnMut(&mut FrameWriter, &T) -> Result<(), PacketError>,
    ) -> Result<(), PacketError> {
        if items.len() > max {
            return Err(PacketError::CollectionTooLarge { field, count: items.len(), max });
        }
        self.write_len(items.len(), field)?;
        for item in items {
            write_item(self, item)?;
        }
        Ok(())
    }

    /// Varint count followed by key, value pairs.
    pub fn write_dictionary<'m, K: 'm, V: 'm, I>(
        &mut self,
        entries: I,
        max: usize,
        field: &'static str,
        mut write_key: impl FnMut(&mut FrameWriter, &K) -> Result<(), PacketError>,
        mut write_value: impl FnMut(&mut FrameWriter, &V) -> Result<(), PacketError>,
    ) -> Result<(), PacketError>
    where
        I: IntoIterator<Item = (&'m K, &'m V)>,
        I::IntoIter: ExactSizeIterator,
    {
        let entries = entries.into_iter();
        if entries.len() > max {
            return Err(PacketError::CollectionTooLarge { field, count: entries.len(), max });
        }
        self.write_len(entries.len(), field)?;
        for (key, value) in entries {
            write_key(self, key)?;
            write_value(self, value)?;
        }
        Ok(())
    }

    /// Appends a placeholder slot holding `-1` and returns its index for patching.
    #[inline]
    pub fn reserve_offset(&mut self) -> OffsetSlot {
        let slot = OffsetSlot(self.buf.len());
        self.buf.extend_from_slice(&(-1i32).to_le_bytes());
        slot
    }

    #[inline]
    pub fn write_offset_at(&mut self, slot: OffsetSlot, value: i32) {
        self.buf[slot.0..slot.0 + SLOT_WIDTH].copy_from_slice(&value.to_le_bytes());
    }

    /// Reserves the offset table of a record with `N` variable fields. The
    /// variable block begins right after the table.
    #[inline]
    pub fn reserve_offsets<const N: usize>(&mut self) -> OffsetReserver<'_, N> {
        let table_start = self.position();
        for _ in 0..N {
            self.reserve_offset();
        }
        let variable_block_start = self.position();
        OffsetReserver { writer: self, table_start, variable_block_start, count: 0 }
    }
}

/// Writes the variable fields of one record in declared order, patching their
/// offsets as it goes.
pub struct OffsetReserver<'w, const N: usize> {
    writer: &'w mut FrameWriter,
    table_start: usize,
    variable_block_start: usize,
    count: usize,
}

impl<'w, const N: usize> OffsetReserver<'w, N> {
    #[inline]
    fn next_slot(&mut self) -> Result<OffsetSlot, PacketError> {
        if self.count >= N {
            return Err(PacketError::OffsetCountMismatch { count: self.count + 1, expected: N });
        }
        let slot = OffsetSlot(self.table_start + self.count * SLOT_WIDTH);
        self.count += 1;
        Ok(slot)
    }

    #[inline]
    fn record_offset(&mut self) -> Result<(), PacketError> {
        let slot = self.next_slot()?;
        let offset = i32::try_from(self.writer.position() - self.variable_block_start)
            .map_err(|_| PacketError::Overflow { field: "offset" })?;
        self.writer.write_offset_at(slot, offset);
        Ok(())
    }

    /// The slot already holds `-1`, so an absent field only consumes it.
    #[inline]
    fn record_none(&mut self) -> Result<(), PacketError> {
        self.next_slot().map(|_| ())
    }

    #[inline]
    fn write_with<V>(
        &mut self,
        val: Option<V>,
        write: impl FnOnce(&mut FrameWriter, V) -> Result<(), PacketError>,
    ) -> Result<(), PacketError> {
        match val {
            Some(v) => {
                self.record_offset()?;
                write(&mut *self.writer, v)
            }
            None => self.record_none(),
        }
    }

    #[inline]
    pub fn variable_block_start(&self) -> usize {
        self.variable_block_start
    }

    #[inline]
    pub fn write_string(&mut self, val: &str, max: usize, field: &'static str) -> Result<(), PacketError> {
        self.write_opt_string(Some(val), max, field)
    }

    #[inline]
    pub fn write_opt_string(&mut self, val: Option<&str>, max: usize, field: &'static str) -> Result<(), PacketError> {
        self.write_with(val, |w, s| w.write_var_string(s, max, field))
    }

    #[inline]
    pub fn write_bytes(&mut self, val: &[u8], max: usize, field: &'static str) -> Result<(), PacketError> {
        self.write_opt_bytes(Some(val), max, field)
    }

    #[inline]
    pub fn write_opt_bytes(&mut self, val: Option<&[u8]>, max: usize, field: &'static str) -> Result<(), PacketError> {
        self.write_with(val, |w, data| w.write_var_bytes(data, max, field))
    }

    #[inline]
    pub fn write_field<T: PacketField>(&mut self, val: &T) -> Result<(), PacketError> {
        self.write_opt_field(Some(val))
    }

    #[inline]
    pub fn write_opt_field<T: PacketField>(&mut self, val: Option<&T>) -> Result<(), PacketError> {
        self.write_with(val, |w, v| {
            v.encode(w);
            Ok(())
        })
    }

    #[inline]
    pub fn write_object<T: Serialize>(&mut self, val: &T) -> Result<(), PacketError> {
        self.write_opt_object(Some(val))
    }

    #[inline]
    pub fn write_opt_object<T: Serialize>(&mut self, val: Option<&T>) -> Result<(), PacketError> {
        self.write_with(val, |w, v| v.serialize(w))
    }

    #[inline]
    pub fn write_tagged<F: VariantFamily>(&mut self, val: &F) -> Result<(), PacketError> {
        self.write_opt_tagged(Some(val))
    }

    #[inline]
    pub fn write_opt_tagged<F: VariantFamily>(&mut self, val: Option<&F>) -> Result<(), PacketError> {
        self.write_with(val, |w, v| w.write_tagged(v))
    }

    #[inline]
    pub fn write_array<T>(
        &mut self,
        items: &[T],
        max: usize,
        field: &'static str,
        write_item: impl FnMut(&mut FrameWriter, &T) -> Result<(), PacketError>,
    ) -> Result<(), PacketError> {
        self.write_opt_array(Some(items), max, field, write_item)
    }

    #[inline]
    pub fn write_opt_array<T>(
        &mut self,
        items: Option<&[T]>,
        max: usize,
        field: &'static str,
        write_item: impl FnMut(&mut FrameWriter, &T) -> Result<(), PacketError>,
    ) -> Result<(), PacketError> {
        self.write_with(items, |w, items| w.write_array(items, max, field, write_item))
    }

    #[inline]
    pub fn write_dictionary<'m, K: 'm, V: 'm, I>(
        &mut self,
        entries: I,
        max: usize,
        field: &'static str,
        write_key: impl FnMut(&mut FrameWriter, &K) -> Result<(), PacketError>,
        write_value: impl FnMut(&mut FrameWriter, &V) -> Result<(), PacketError>,
    ) -> Result<(), PacketError>
    where
        I: IntoIterator<Item = (&'m K, &'m V)>,
        I::IntoIter: ExactSizeIterator,
    {
        self.write_opt_dictionary(Some(entries), max, field, write_key, write_value)
    }

    #[inline]
    pub fn write_opt_dictionary<'m, K: 'm, V: 'm, I>(
        &mut self,
        entries: Option<I>,
        max: usize,
        field: &'static str,
        write_key: impl FnMut(&mut FrameWriter, &K) -> Result<(), PacketError>,
        write_value: impl FnMut(&mut FrameWriter, &V) -> Result<(), PacketError>,
    ) -> Result<(), PacketError>
    where
        I: IntoIterator<Item = (&'m K, &'m V)>,
        I::IntoIter: ExactSizeIterator,
    {
        self.write_with(entries, |w, entries| w.write_dictionary(entries, max, field, write_key, write_value))
    }

    /// Fails unless every reserved slot was accounted for.
    #[inline]
    pub fn finish(self) -> Result<(), PacketError> {
        if self.count != N {
            return Err(PacketError::OffsetCountMismatch { count: self.count, expected: N });
        }
        Ok(())
    }
}
