//! Cartridge inspection: system detection, header parsing and BIOS checks.
//!
//! A raw ROM image is classified by signature bytes before any core is built:
//! the GBA BIOS-logo signature sits at offset 0x04, the Game Boy logo at
//! 0x104. Header checksum or CRC mismatches are warnings (real flash carts
//! and homebrew get them wrong all the time); only length violations are
//! fatal, because the cores index into the image directly.

use logger::log;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum Game Pak ROM size (32 MiB).
pub const GBA_ROM_MAX: usize = 0x0200_0000;

/// Size of the GBA BIOS image, exact.
pub const GBA_BIOS_LEN: usize = 0x4000;

/// CRC32 of the official GBA BIOS dump.
pub const GBA_BIOS_CRC: u32 = 0xBAAE_187F;

const GBA_HEADER_LEN: usize = 192;
const GB_HEADER_END: usize = 0x150;

/// Errors that abort a load. Everything else is logged and tolerated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("ROM image is {len} bytes, smaller than the {min}-byte header")]
    RomTooShort { len: usize, min: usize },

    #[error("ROM image is {len} bytes, larger than the {max}-byte limit")]
    RomTooLarge { len: usize, max: usize },

    #[error("BIOS image must be exactly 16384 bytes, got {len}")]
    BiosSize { len: usize },

    #[error("ROM image matches no known system signature")]
    UnknownSystem,

    #[error("a GBA ROM needs a BIOS image")]
    MissingBios,
}

/// Console family a ROM image targets, detected from signature bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemKind {
    /// Original Game Boy (DMG).
    GameBoy,
    /// Game Boy Color, or a DMG cart flagged CGB-aware.
    GameBoyColor,
    /// Game Boy Advance.
    GameBoyAdvance,
}

/// Classifies a raw ROM image by its signature bytes.
///
/// # Errors
/// [`LoadError::UnknownSystem`] when neither signature matches.
pub fn detect_system(rom: &[u8]) -> Result<SystemKind, LoadError> {
    if rom.len() >= 0x08 && rom[0x04..0x08] == [0x24, 0xFF, 0xAE, 0x51] {
        return Ok(SystemKind::GameBoyAdvance);
    }

    if rom.len() >= 0x108 && rom[0x104..0x108] == [0xCE, 0xED, 0x66, 0x66] {
        let cgb_flag = rom.get(0x143).copied().unwrap_or(0);
        return Ok(match cgb_flag {
            0xC0 | 0x80 => SystemKind::GameBoyColor,
            _ => SystemKind::GameBoy,
        });
    }

    Err(LoadError::UnknownSystem)
}

/// Validates a GBA BIOS image: the length is fatal, the CRC is a warning.
///
/// # Errors
/// [`LoadError::BiosSize`] when the image is not exactly 16384 bytes.
pub fn validate_bios(bios: &[u8]) -> Result<[u8; GBA_BIOS_LEN], LoadError> {
    let Ok(image) = <[u8; GBA_BIOS_LEN]>::try_from(bios) else {
        return Err(LoadError::BiosSize { len: bios.len() });
    };

    let crc = crc32(bios);
    if crc != GBA_BIOS_CRC {
        log(format!(
            "BIOS CRC32 mismatch: expected 0x{GBA_BIOS_CRC:08X}, got 0x{crc:08X}"
        ));
    }

    Ok(image)
}

/// The fields of the 192-byte GBA cartridge header the core consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbaHeader {
    /// 32-bit ARM branch opcode, e.g. "B rom_start".
    pub entry_point: [u8; 4],
    /// Uppercase ASCII, max 12 characters.
    pub game_title: String,
    /// Uppercase ASCII, 4 characters.
    pub game_code: String,
    /// Must be 0x96 on licensed carts.
    pub fixed_value: u8,
    /// Header checksum byte at 0xBD.
    pub complement_check: u8,
}

impl GbaHeader {
    /// Parses the header. Checksum and fixed-value mismatches are logged,
    /// not fatal.
    ///
    /// # Errors
    /// Length violations per [`LoadError`].
    pub fn parse(rom: &[u8]) -> Result<Self, LoadError> {
        if rom.len() < GBA_HEADER_LEN {
            return Err(LoadError::RomTooShort {
                len: rom.len(),
                min: GBA_HEADER_LEN,
            });
        }
        if rom.len() > GBA_ROM_MAX {
            return Err(LoadError::RomTooLarge {
                len: rom.len(),
                max: GBA_ROM_MAX,
            });
        }

        let entry_point = rom[0x00..0x04].try_into().unwrap_or_else(|_| unreachable!());
        let game_title = ascii_field(&rom[0xA0..0xAC]);
        let game_code = ascii_field(&rom[0xAC..0xB0]);
        let fixed_value = rom[0xB2];
        let complement_check = rom[0xBD];

        if fixed_value != 0x96 {
            log(format!(
                "header fixed value is 0x{fixed_value:02X}, expected 0x96"
            ));
        }

        let checksum = rom[0xA0..=0xBC]
            .iter()
            .fold(0u8, |acc, &item| acc.wrapping_sub(item))
            .wrapping_sub(0x19);
        if checksum != complement_check {
            log(format!(
                "header checksum mismatch: computed 0x{checksum:02X}, header says 0x{complement_check:02X}"
            ));
        }

        Ok(Self {
            entry_point,
            game_title,
            game_code,
            fixed_value,
            complement_check,
        })
    }
}

/// The fields of the Game Boy cartridge header the core consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbHeader {
    /// Uppercase ASCII title at 0x134, up to 16 characters.
    pub title: String,
    /// Cartridge type byte at 0x147, selects the MBC behavior.
    pub cartridge_type: u8,
    /// ROM size code at 0x148: bank count is `2 << code`.
    pub rom_size_code: u8,
    /// RAM size code at 0x149.
    pub ram_size_code: u8,
}

impl GbHeader {
    /// # Errors
    /// Length violations per [`LoadError`].
    pub fn parse(rom: &[u8]) -> Result<Self, LoadError> {
        if rom.len() < GB_HEADER_END {
            return Err(LoadError::RomTooShort {
                len: rom.len(),
                min: GB_HEADER_END,
            });
        }

        Ok(Self {
            title: ascii_field(&rom[0x134..0x144]),
            cartridge_type: rom[0x147],
            rom_size_code: rom[0x148],
            ram_size_code: rom[0x149],
        })
    }

    /// External cartridge RAM size in bytes.
    #[must_use]
    pub const fn ram_size(&self) -> usize {
        match self.ram_size_code {
            1 => 2 * 1024,
            2 => 8 * 1024,
            3 => 32 * 1024,
            4 => 128 * 1024,
            5 => 64 * 1024,
            _ => 0,
        }
    }

    /// Number of 16 KiB ROM banks the header declares.
    #[must_use]
    pub const fn rom_banks(&self) -> usize {
        2 << self.rom_size_code
    }
}

/// Extracts a fixed ASCII field, trimming trailing NULs. Non-ASCII bytes are
/// replaced so a corrupt header degrades to a mangled title, never an error.
fn ascii_field(bytes: &[u8]) -> String {
    let field: String = bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            }
        })
        .collect();

    if field.contains('?') {
        log(format!("header title field contains non-ASCII bytes: {field:?}"));
    }

    field
}

/// CRC-32 (IEEE, reflected) used for the BIOS fingerprint.
#[must_use]
pub fn crc32(data: &[u8]) -> u32 {
    let mut crc = !0u32;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xEDB8_8320 & mask);
        }
    }
    !crc
}
