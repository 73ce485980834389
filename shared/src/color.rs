//! Packed RGBA colors
//!
//! Colors travel as a single `i32` whose little-endian bytes are `r, g, b, a`,
//! the in-memory layout of a 32-bit RGBA color on the native side.

use serde::{Deserialize, Serialize};

/// 8-bit-per-channel color, convertible to and from the packed wire code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorRgba32 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba32 {
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a wire code.
    pub const fn from_code(code: i32) -> Self {
        let [r, g, b, a] = (code as u32).to_le_bytes();
        Self { r, g, b, a }
    }

    /// Pack into the wire code.
    pub const fn code(self) -> i32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a]) as i32
    }
}

impl From<ColorRgba32> for i32 {
    fn from(color: ColorRgba32) -> Self {
        color.code()
    }
}

impl From<i32> for ColorRgba32 {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_red_occupies_the_low_byte() {
        assert_eq!(ColorRgba32::new(0x11, 0, 0, 0).code(), 0x11);
        assert_eq!(ColorRgba32::new(0, 0, 0, 0x80).code(), 0x8000_0000u32 as i32);
    }

    #[test]
    fn test_white_is_all_bits_set() {
        assert_eq!(ColorRgba32::WHITE.code(), -1);
        assert_eq!(ColorRgba32::from_code(-1), ColorRgba32::WHITE);
    }

    #[test]
    fn test_unpack_inverts_pack() {
        let c = ColorRgba32::new(12, 34, 56, 78);
        assert_eq!(ColorRgba32::from(i32::from(c)), c);
    }
}
