//! Sequential typed reader/writer over guest linear memory.
//!
//! A `BufferCursor` is created fresh for every transfer between host and
//! guest and discarded afterwards. It tracks a base word address, a running
//! position and a capacity; `position - base <= capacity` holds at all times.
//!
//! Layouts:
//! - int / float: one word each, floats reinterpreted bit-for-bit
//! - string: `[len, reserved, cp0, cp1, ...]`, either referenced by an
//!   address word (address 0 is "") or stored inline at the cursor
//! - color: `[r, g, b, a]`, referenced by an address word (address 0 is
//!   transparent black) or stored inline
//! - enum: index into a fixed table, `-1` for absent
//! - buffer: `[word_count, packed bytes...]`, last word zero-padded
//!
//! Writes are checked against capacity before touching memory, so an
//! overflowing write leaves the guest buffer untouched past the last
//! complete word.

use crate::error::{CodecError, CodecResult};
use crate::memory::MemoryView;
use crate::types::{Color, ENUM_ABSENT, NULL_ADDR, WORD_SIZE};
use crate::wire::{name_index, WireEnum};

/// Offset from a string's address to its first code point.
const STRING_HEADER_WORDS: u32 = 2;

/// Cursor over a region of guest memory.
#[derive(Debug)]
pub struct BufferCursor<'m> {
    memory: MemoryView<'m>,
    base: u32,
    pos: u32,
    capacity: u32,
}

impl<'m> BufferCursor<'m> {
    /// Cursor over `capacity` words starting at `base`.
    pub fn new(memory: MemoryView<'m>, base: u32, capacity: u32) -> Self {
        Self {
            memory,
            base,
            pos: base,
            capacity,
        }
    }

    /// Cursor whose capacity extends to the end of linear memory.
    pub fn unbounded(memory: MemoryView<'m>, base: u32) -> Self {
        let capacity = (memory.len_words() as u64)
            .saturating_sub(base as u64)
            .min(u32::MAX as u64) as u32;
        Self::new(memory, base, capacity)
    }

    /// Words read or written so far.
    pub fn size(&self) -> u32 {
        self.pos - self.base
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn remaining(&self) -> u32 {
        self.capacity - self.size()
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Immutable access to the underlying memory, e.g. for address lookups.
    pub fn memory(&self) -> &MemoryView<'m> {
        &self.memory
    }

    /// Open a cursor on a sub-buffer at `addr`, extending to end of memory.
    ///
    /// The parent cursor is unusable while the child is alive.
    pub fn sub_buffer(&mut self, addr: u32) -> BufferCursor<'_> {
        BufferCursor::unbounded(self.memory.reborrow(), addr)
    }

    fn take_read_slot(&mut self) -> CodecResult<u32> {
        if self.is_exhausted() {
            return Err(CodecError::Exhausted { size: self.size() });
        }
        let addr = self.pos;
        self.pos += 1;
        Ok(addr)
    }

    fn reserve(&mut self, words: u32) -> CodecResult<u32> {
        let required = self.size() as u64 + words as u64;
        if required > self.capacity as u64 {
            return Err(CodecError::Overflow {
                required: required.min(u32::MAX as u64) as u32,
                capacity: self.capacity,
            });
        }
        self.memory.check_range(self.pos, words as usize)?;
        let addr = self.pos;
        self.pos += words;
        Ok(addr)
    }

    // ── Reads ──

    pub fn read(&mut self) -> CodecResult<i32> {
        let addr = self.take_read_slot()?;
        self.memory.load_i32(addr)
    }

    pub fn read_float(&mut self) -> CodecResult<f32> {
        let addr = self.take_read_slot()?;
        self.memory.load_f32(addr)
    }

    /// Any non-zero word is true.
    pub fn read_bool(&mut self) -> CodecResult<bool> {
        Ok(self.read()? != 0)
    }

    /// Read an address word and decode the string stored there.
    pub fn read_string(&mut self) -> CodecResult<String> {
        let addr = self.read()?;
        self.memory.read_string(addr as u32)
    }

    /// Read an address word and decode the color stored there.
    pub fn read_color(&mut self) -> CodecResult<Color> {
        let addr = self.read()?;
        self.memory.read_color(addr as u32)
    }

    /// Decode a string stored inline at the cursor, as `write_string`
    /// lays it out. The reserved word is skipped.
    pub fn read_inline_string(&mut self) -> CodecResult<String> {
        let len = self.read()?;
        let len = u32::try_from(len).map_err(|_| CodecError::NegativeAddress(len))?;
        self.take_read_slot()?;
        if len > self.remaining() {
            return Err(CodecError::Exhausted {
                size: self.size() + self.remaining(),
            });
        }
        let mut out = String::with_capacity(len as usize);
        for _ in 0..len {
            let cp = self.read()? as u32;
            out.push(char::from_u32(cp).ok_or(CodecError::InvalidCodePoint(cp))?);
        }
        Ok(out)
    }

    /// Decode a color stored inline at the cursor.
    pub fn read_inline_color(&mut self) -> CodecResult<Color> {
        Ok(Color::from_words(self.read()?, self.read()?, self.read()?, self.read()?))
    }

    pub fn read_enum<E: WireEnum>(&mut self) -> CodecResult<Option<E>> {
        Ok(E::from_index(self.read()?))
    }

    /// Read an index into an arbitrary name table.
    pub fn read_enum_name(&mut self, table: &[&'static str]) -> CodecResult<Option<&'static str>> {
        let idx = self.read()?;
        Ok(usize::try_from(idx).ok().and_then(|i| table.get(i).copied()))
    }

    /// Read the address of a nested buffer. Zero means "no buffer".
    pub fn read_sub_buffer_addr(&mut self) -> CodecResult<Option<u32>> {
        let addr = self.read()? as u32;
        Ok((addr != NULL_ADDR).then_some(addr))
    }

    /// Read a length-prefixed byte buffer (word count, then packed bytes).
    pub fn read_buffer(&mut self) -> CodecResult<Vec<u8>> {
        let words = self.read()?;
        let words = u32::try_from(words).map_err(|_| CodecError::NegativeAddress(words))?;
        if words > self.remaining() {
            return Err(CodecError::Exhausted {
                size: self.size() + self.remaining(),
            });
        }
        let bytes = self.memory.read_word_bytes(self.pos, words as usize)?;
        self.pos += words;
        Ok(bytes)
    }

    // ── Writes ──

    pub fn write(&mut self, value: i32) -> CodecResult<()> {
        let addr = self.reserve(1)?;
        self.memory.store_i32(addr, value)
    }

    pub fn write_float(&mut self, value: f32) -> CodecResult<()> {
        let addr = self.reserve(1)?;
        self.memory.store_f32(addr, value)
    }

    pub fn write_bool(&mut self, value: bool) -> CodecResult<()> {
        self.write(value as i32)
    }

    pub fn write_enum<E: WireEnum>(&mut self, value: Option<E>) -> CodecResult<()> {
        self.write(value.map_or(ENUM_ABSENT, |v| v.index() as i32))
    }

    /// Write the index of `name` in `table`, or `-1` when it is not listed.
    pub fn write_enum_name(&mut self, name: &str, table: &[&str]) -> CodecResult<()> {
        self.write(name_index(table, name).map_or(ENUM_ABSENT, |i| i as i32))
    }

    /// Write a string inline as `[len, reserved, code points...]`.
    ///
    /// The reserved word is skipped, not cleared: guests keep their own
    /// bookkeeping there.
    pub fn write_string(&mut self, value: &str) -> CodecResult<()> {
        let chars: Vec<u32> = value.chars().map(u32::from).collect();
        let start = self.reserve(STRING_HEADER_WORDS + chars.len() as u32)?;
        self.memory.store(start, chars.len() as u32)?;
        for (i, cp) in chars.iter().enumerate() {
            self.memory.store(start + STRING_HEADER_WORDS + i as u32, *cp)?;
        }
        Ok(())
    }

    /// Write a color inline as `[r, g, b, a]`.
    pub fn write_color(&mut self, color: Color) -> CodecResult<()> {
        let start = self.reserve(4)?;
        for (i, channel) in [color.r, color.g, color.b, color.a].into_iter().enumerate() {
            self.memory.store(start + i as u32, channel as u32)?;
        }
        Ok(())
    }

    /// Write a word count followed by `bytes` packed little-endian.
    pub fn write_buffer(&mut self, bytes: &[u8]) -> CodecResult<()> {
        let words = bytes.len().div_ceil(WORD_SIZE) as u32;
        let start = self.reserve(1 + words)?;
        self.memory.store(start, words)?;
        for (i, chunk) in bytes.chunks(WORD_SIZE).enumerate() {
            let mut word = [0u8; WORD_SIZE];
            word[..chunk.len()].copy_from_slice(chunk);
            self.memory.store(start + 1 + i as u32, u32::from_le_bytes(word))?;
        }
        Ok(())
    }

    /// Write raw words without a length prefix.
    pub fn write_words(&mut self, words: &[u32]) -> CodecResult<()> {
        let start = self.reserve(words.len() as u32)?;
        for (i, w) in words.iter().enumerate() {
            self.memory.store(start + i as u32, *w)?;
        }
        Ok(())
    }
}

// ── Address-based decoding ──

impl MemoryView<'_> {
    /// Decode the string stored at `addr`. Address 0 is the empty string.
    pub fn read_string(&self, addr: u32) -> CodecResult<String> {
        if addr == NULL_ADDR {
            return Ok(String::new());
        }
        let len = self.load(addr)? as usize;
        let first = addr
            .checked_add(STRING_HEADER_WORDS)
            .ok_or(CodecError::OutOfBounds {
                addr: addr as u64 + STRING_HEADER_WORDS as u64,
                len: self.len_words(),
            })?;
        self.check_range(first, len)?;
        let mut out = String::with_capacity(len);
        for i in 0..len as u32 {
            let cp = self.load(first + i)?;
            out.push(char::from_u32(cp).ok_or(CodecError::InvalidCodePoint(cp))?);
        }
        Ok(out)
    }

    /// Decode the color stored at `addr`. Address 0 is transparent black.
    pub fn read_color(&self, addr: u32) -> CodecResult<Color> {
        if addr == NULL_ADDR {
            return Ok(Color::TRANSPARENT);
        }
        self.check_range(addr, 4)?;
        Ok(Color::from_words(
            self.load_i32(addr)?,
            self.load_i32(addr + 1)?,
            self.load_i32(addr + 2)?,
            self.load_i32(addr + 3)?,
        ))
    }
}
