#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
#[allow(clippy::cast_possible_wrap)]
mod bitwise;

pub mod cartridge;
pub mod framebuffer;
pub mod keypad;

#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_lossless)]
#[allow(clippy::unreadable_literal)]
pub mod gb;

#[allow(clippy::missing_panics_doc)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_lossless)]
#[allow(clippy::large_stack_frames)]
#[allow(clippy::unreadable_literal)]
pub mod gba;

use cartridge::{LoadError, SystemKind, detect_system};
use gb::GameBoy;
use gba::Gba;

/// A loaded console, picked by the ROM's signature bytes.
#[derive(Debug)]
pub enum System {
    GameBoy(Box<GameBoy>),
    GameBoyAdvance(Box<Gba>),
}

impl System {
    /// Detects the target console from the ROM image and builds the
    /// matching core. The GBA needs a BIOS image; the Game Boy does not
    /// (CGB-flagged carts run on the DMG pipeline).
    ///
    /// # Errors
    /// [`LoadError`] on unknown signatures, length violations, or a missing
    /// GBA BIOS.
    pub fn load(rom: &[u8], bios: Option<&[u8]>) -> Result<Self, LoadError> {
        match detect_system(rom)? {
            SystemKind::GameBoy | SystemKind::GameBoyColor => {
                Ok(Self::GameBoy(Box::new(GameBoy::new(rom)?)))
            }
            SystemKind::GameBoyAdvance => {
                let bios = bios.ok_or(LoadError::MissingBios)?;
                Ok(Self::GameBoyAdvance(Box::new(Gba::new(bios, rom)?)))
            }
        }
    }

    /// Runs one frame on whichever core is loaded.
    pub fn run_frame(&mut self) {
        match self {
            Self::GameBoy(gb) => gb.run_frame(),
            Self::GameBoyAdvance(gba) => gba.run_frame(),
        }
    }

    /// Replaces the keypad word (active-low KEYINPUT layout) on either core.
    pub fn set_key_input(&mut self, raw: u16) {
        match self {
            Self::GameBoy(gb) => gb.set_key_input(raw),
            Self::GameBoyAdvance(gba) => gba.set_key_input(raw),
        }
    }
}
