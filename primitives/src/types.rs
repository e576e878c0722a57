//! Core constants and small value types shared across the bridge.

/// Size of one linear-memory cell in bytes. All guest addresses are word addresses.
pub const WORD_SIZE: usize = 4;

/// Size of one wasm memory page in bytes.
pub const PAGE_SIZE: usize = 65_536;

/// Address value the guest uses for "no object".
pub const NULL_ADDR: u32 = 0;

/// Written in place of a keyboard character when the key produced none.
pub const NO_CHAR_SENTINEL: i32 = i32::MIN;

/// Wire value written by `write_enum` for a value that is not in its table.
pub const ENUM_ABSENT: i32 = -1;

/// An RGBA color with 8-bit channels, as stored by the guest (four words).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Fully transparent black; what a null color address decodes to.
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Build a color from four guest words, clamping each into `0..=255`.
    pub fn from_words(r: i32, g: i32, b: i32, a: i32) -> Self {
        let c = |v: i32| v.clamp(0, 255) as u8;
        Self {
            r: c(r),
            g: c(g),
            b: c(b),
            a: c(a),
        }
    }

    /// True when the color would draw anything at all.
    pub fn is_visible(&self) -> bool {
        self.a != 0
    }

    /// Pack as `0xRRGGBBAA`.
    pub fn to_u32(self) -> u32 {
        u32::from_be_bytes([self.r, self.g, self.b, self.a])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_words_clamps() {
        let c = Color::from_words(-5, 300, 128, 255);
        assert_eq!(c, Color::rgba(0, 255, 128, 255));
    }

    #[test]
    fn test_transparent_is_invisible() {
        assert!(!Color::TRANSPARENT.is_visible());
        assert!(Color::rgba(0, 0, 0, 1).is_visible());
    }

    #[test]
    fn test_to_u32() {
        assert_eq!(Color::rgba(0x12, 0x34, 0x56, 0x78).to_u32(), 0x1234_5678);
    }
}
