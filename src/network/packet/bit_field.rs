use crate::network::packet::packet_error::PacketError;

/// Nullability bitmap of a record.
///
/// Each optional field claims the next power of two in serialization order, so
/// field masks are `1, 2, 4, ... 1 << 63`. Logical bit `i` is stored in byte
/// `i / 8` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BitField {
    bits: u64,
    size: u8,
}

impl BitField {
    pub const MAX_BYTES: usize = 8;

    #[inline]
    pub fn new(size: u8) -> Self {
        debug_assert!(size as usize <= Self::MAX_BYTES, "bit field of {size} bytes");
        Self { bits: 0, size: size.min(Self::MAX_BYTES as u8) }
    }

    #[inline]
    pub fn from_byte(byte: u8) -> Self {
        Self { bits: byte as u64, size: 1 }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() > Self::MAX_BYTES {
            return Err(PacketError::BitFieldTooLarge { size: bytes.len(), max: Self::MAX_BYTES });
        }
        let bits = bytes
            .iter()
            .enumerate()
            .fold(0u64, |acc, (i, b)| acc | ((*b as u64) << (i * 8)));
        Ok(Self { bits, size: bytes.len() as u8 })
    }

    /// Capacity in bytes.
    #[inline]
    pub fn size(&self) -> usize {
        self.size as usize
    }

    #[inline]
    fn capacity_mask(&self) -> u64 {
        match self.size {
            8 => u64::MAX,
            n => (1u64 << (n as u32 * 8)) - 1,
        }
    }

    /// Fails when `mask` is not a single bit inside the declared capacity, so a
    /// field is never written with its presence bit lost.
    #[inline]
    pub fn set(&mut self, mask: u64) -> Result<(), PacketError> {
        if !mask.is_power_of_two() || mask & !self.capacity_mask() != 0 {
            return Err(PacketError::BitOutOfRange { mask, size: self.size() });
        }
        self.bits |= mask;
        Ok(())
    }

    #[inline]
    pub fn set_if(&mut self, mask: u64, present: bool) -> Result<(), PacketError> {
        if present {
            self.set(mask)?;
        }
        Ok(())
    }

    #[inline]
    pub fn is_set(&self, mask: u64) -> bool {
        self.bits & mask != 0
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }

    #[inline]
    pub fn byte(&self, index: usize) -> u8 {
        (self.bits >> (index * 8)) as u8
    }

    pub fn to_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.size()).map(|i| self.byte(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_follow_declaration_order() {
        let mut bits = BitField::new(1);
        bits.set(1).unwrap();
        bits.set(4).unwrap();
        assert!(bits.is_set(1));
        assert!(!bits.is_set(2));
        assert!(bits.is_set(4));
        assert_eq!(bits.byte(0), 0b101);
        assert_eq!(bits.count(), 2);
    }

    #[test]
    fn test_multi_byte_layout() {
        let mut bits = BitField::new(2);
        bits.set(1 << 9).unwrap();
        bits.set(1 << 0).unwrap();
        assert_eq!(bits.to_bytes().collect::<Vec<_>>(), vec![0x01, 0x02]);

        let read = BitField::from_bytes(&[0x01, 0x02]).unwrap();
        assert_eq!(read, bits);
        assert!(read.is_set(1 << 9));
        assert!(!read.is_set(1 << 8));
    }

    #[test]
    fn test_from_byte() {
        let bits = BitField::from_byte(0b1000_0001);
        assert_eq!(bits.size(), 1);
        assert!(bits.is_set(1));
        assert!(bits.is_set(128));
    }

    #[test]
    fn test_too_large() {
        assert!(matches!(
            BitField::from_bytes(&[0; 9]),
            Err(PacketError::BitFieldTooLarge { size: 9, max: 8 })
        ));
    }

    #[test]
    fn test_mask_outside_capacity_fails() {
        let mut bits = BitField::new(1);
        assert!(matches!(bits.set(1 << 8), Err(PacketError::BitOutOfRange { mask: 0x100, size: 1 })));
        assert!(matches!(bits.set(3), Err(PacketError::BitOutOfRange { mask: 3, .. })));
        assert!(bits.set_if(1 << 12, false).is_ok());
        assert!(bits.set_if(1 << 12, true).is_err());
        assert_eq!(bits.count(), 0);

        let mut empty = BitField::new(0);
        assert!(empty.set(1).is_err());
    }

    #[test]
    fn test_empty() {
        let bits = BitField::new(0);
        assert_eq!(bits.to_bytes().count(), 0);
        assert!(!bits.is_set(1));
    }
}
