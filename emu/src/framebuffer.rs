//! BGR555 color and the per-system framebuffers.
//!
//! Both cores produce 16-bit BGR555 pixels packed as `0b0_bbbbb_ggggg_rrrrr`
//! (bit 15 ignored). The caller converts and scales for the host display.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::bitwise::Bits;

/// GBA display width in pixels.
pub const GBA_WIDTH: usize = 240;
/// GBA display height in pixels.
pub const GBA_HEIGHT: usize = 160;
/// Game Boy display width in pixels.
pub const GB_WIDTH: usize = 160;
/// Game Boy display height in pixels.
pub const GB_HEIGHT: usize = 144;

/// A BGR555 color word.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u16);

impl Color {
    #[must_use]
    pub const fn from_palette_color(value: u16) -> Self {
        Self(value)
    }

    /// Builds a color from 5-bit components.
    #[must_use]
    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        let red: u16 = red.into();
        let green: u16 = green.into();
        let blue: u16 = blue.into();

        Self((blue << 10) | (green << 5) | red)
    }

    #[must_use]
    pub fn red(self) -> u8 {
        self.0.get_bits(0..=4) as u8
    }

    #[must_use]
    pub fn green(self) -> u8 {
        self.0.get_bits(5..=9) as u8
    }

    #[must_use]
    pub fn blue(self) -> u8 {
        self.0.get_bits(10..=14) as u8
    }
}

/// The GBA's 240x160 output frame.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbaFrame {
    #[serde_as(as = "[[_; 240]; 160]")]
    pub pixels: [[Color; GBA_WIDTH]; GBA_HEIGHT],
}

impl Default for GbaFrame {
    fn default() -> Self {
        Self {
            pixels: [[Color::default(); GBA_WIDTH]; GBA_HEIGHT],
        }
    }
}

/// The Game Boy's 160x144 output frame.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbFrame {
    #[serde_as(as = "[[_; 160]; 144]")]
    pub pixels: [[Color; GB_WIDTH]; GB_HEIGHT],
}

impl Default for GbFrame {
    fn default() -> Self {
        Self {
            pixels: [[Color::default(); GB_WIDTH]; GB_HEIGHT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn components_round_trip() {
        let color = Color::from_rgb(3, 17, 30);
        assert_eq!(color.red(), 3);
        assert_eq!(color.green(), 17);
        assert_eq!(color.blue(), 30);
    }

    #[test]
    fn packing_layout() {
        // blue in bits 10-14, green 5-9, red 0-4
        assert_eq!(Color::from_rgb(0b11111, 0, 0).0, 0x001F);
        assert_eq!(Color::from_rgb(0, 0b11111, 0).0, 0x03E0);
        assert_eq!(Color::from_rgb(0, 0, 0b11111).0, 0x7C00);
    }
}
