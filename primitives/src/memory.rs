//! Word-addressed view over guest linear memory.
//!
//! The guest owns its memory and may grow it between calls, which
//! invalidates any previously borrowed byte slice. A `MemoryView` therefore
//! only ever borrows the slice for the duration of one host call; it cannot
//! be stored in anything that outlives that borrow.
//!
//! Cells are 32-bit little-endian words. Floats share the same cells,
//! reinterpreted bit-for-bit.

use crate::error::{CodecError, CodecResult};
use crate::types::WORD_SIZE;

/// Call-scoped view of linear memory as an array of 32-bit cells.
#[derive(Debug)]
pub struct MemoryView<'a> {
    bytes: &'a mut [u8],
}

impl<'a> MemoryView<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// Shorter-lived view over the same memory, for nested cursors.
    pub fn reborrow(&mut self) -> MemoryView<'_> {
        MemoryView {
            bytes: &mut *self.bytes,
        }
    }

    /// Number of whole words addressable in this view.
    pub fn len_words(&self) -> usize {
        self.bytes.len() / WORD_SIZE
    }

    fn byte_offset(&self, addr: u32) -> CodecResult<usize> {
        let idx = addr as usize;
        if idx >= self.len_words() {
            return Err(CodecError::OutOfBounds {
                addr: addr as u64,
                len: self.len_words(),
            });
        }
        Ok(idx * WORD_SIZE)
    }

    /// Check that `count` words starting at `addr` are all addressable.
    pub fn check_range(&self, addr: u32, count: usize) -> CodecResult<()> {
        let end = (addr as u64) + count as u64;
        if end > self.len_words() as u64 {
            return Err(CodecError::OutOfBounds {
                addr: end.saturating_sub(1).max(addr as u64),
                len: self.len_words(),
            });
        }
        Ok(())
    }

    pub fn load(&self, addr: u32) -> CodecResult<u32> {
        let off = self.byte_offset(addr)?;
        let mut word = [0u8; WORD_SIZE];
        word.copy_from_slice(&self.bytes[off..off + WORD_SIZE]);
        Ok(u32::from_le_bytes(word))
    }

    pub fn load_i32(&self, addr: u32) -> CodecResult<i32> {
        Ok(self.load(addr)? as i32)
    }

    pub fn load_f32(&self, addr: u32) -> CodecResult<f32> {
        Ok(f32::from_bits(self.load(addr)?))
    }

    pub fn store(&mut self, addr: u32, value: u32) -> CodecResult<()> {
        let off = self.byte_offset(addr)?;
        self.bytes[off..off + WORD_SIZE].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn store_i32(&mut self, addr: u32, value: i32) -> CodecResult<()> {
        self.store(addr, value as u32)
    }

    pub fn store_f32(&mut self, addr: u32, value: f32) -> CodecResult<()> {
        self.store(addr, value.to_bits())
    }

    /// Copy `count` words starting at `addr`.
    pub fn read_words(&self, addr: u32, count: usize) -> CodecResult<Vec<u32>> {
        self.check_range(addr, count)?;
        (0..count).map(|i| self.load(addr + i as u32)).collect()
    }

    /// Raw bytes of `count` words starting at `addr`.
    pub fn read_word_bytes(&self, addr: u32, count: usize) -> CodecResult<Vec<u8>> {
        self.check_range(addr, count)?;
        let start = addr as usize * WORD_SIZE;
        Ok(self.bytes[start..start + count * WORD_SIZE].to_vec())
    }
}

/// Convert a raw guest argument into a word address.
pub fn word_addr(raw: i32) -> CodecResult<u32> {
    u32::try_from(raw).map_err(|_| CodecError::NegativeAddress(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_store_word() {
        let mut bytes = vec![0u8; 16];
        let mut view = MemoryView::new(&mut bytes);
        view.store(2, 0xDEAD_BEEF).unwrap();
        assert_eq!(view.load(2).unwrap(), 0xDEAD_BEEF);
        assert_eq!(&bytes[8..12], &[0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn test_float_shares_storage() {
        let mut bytes = vec![0u8; 8];
        let mut view = MemoryView::new(&mut bytes);
        view.store_f32(1, 1.5).unwrap();
        assert_eq!(view.load(1).unwrap(), 1.5f32.to_bits());
        assert_eq!(view.load_f32(1).unwrap(), 1.5);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut bytes = vec![0u8; 8];
        let mut view = MemoryView::new(&mut bytes);
        assert!(view.load(2).is_err());
        assert!(view.store(2, 1).is_err());
        assert!(view.read_words(1, 2).is_err());
        assert!(view.read_words(0, 2).is_ok());
    }

    #[test]
    fn test_trailing_partial_word_not_addressable() {
        let mut bytes = vec![0u8; 10];
        let view = MemoryView::new(&mut bytes);
        assert_eq!(view.len_words(), 2);
        assert!(view.load(2).is_err());
    }

    #[test]
    fn test_word_addr_rejects_negative() {
        assert_eq!(word_addr(7).unwrap(), 7);
        assert_eq!(word_addr(-1), Err(CodecError::NegativeAddress(-1)));
    }
}
