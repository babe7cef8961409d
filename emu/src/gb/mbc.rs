//! Game Boy cartridge banking.
//!
//! The cartridge type byte at header offset 0x147 selects one of five MBC
//! behaviors. All of them are driven by writes into ROM address space:
//!
//! | range           | effect                                        |
//! |-----------------|-----------------------------------------------|
//! | `0x0000-0x1FFF` | RAM enable latch (low nibble 0xA enables)     |
//! | `0x2000-0x3FFF` | ROM bank low bits (0 coerced to 1 on MBC1/3)  |
//! | `0x4000-0x5FFF` | RAM bank, or MBC1 ROM bank high bits          |
//! | `0x6000-0x7FFF` | MBC1 mode latch                               |
//!
//! MBC2 deviates: its two registers share `0x0000-0x3FFF` and are told apart
//! by address bit 8, and its RAM is 512 half-bytes on the cartridge itself.
//! MBC3 RTC register selects (0x08-0x0C) are accepted and ignored.

use logger::log;
use serde::{Deserialize, Serialize};

use crate::cartridge::GbHeader;

pub const ROM_BANK_SIZE: usize = 0x4000;
pub const RAM_BANK_SIZE: usize = 0x2000;

/// The banking hardware family, derived from the cartridge type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MbcKind {
    NoMbc,
    Mbc1,
    Mbc2,
    Mbc3,
    Mbc5,
}

impl MbcKind {
    /// Maps the header's cartridge type byte. Unknown types degrade to a
    /// plain ROM with a warning; the game will run as far as it can.
    #[must_use]
    pub fn from_cartridge_type(cartridge_type: u8) -> Self {
        match cartridge_type {
            0x00 | 0x08 | 0x09 => Self::NoMbc,
            0x01..=0x03 => Self::Mbc1,
            0x05 | 0x06 => Self::Mbc2,
            0x0F..=0x13 => Self::Mbc3,
            0x19..=0x1E => Self::Mbc5,
            other => {
                log(format!("unsupported cartridge type 0x{other:02X}, treating as ROM-only"));
                Self::NoMbc
            }
        }
    }
}

/// A cartridge: the ROM image, its external RAM, and the MBC latch state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cartridge {
    rom: Vec<u8>,
    ram: Vec<u8>,
    kind: MbcKind,

    ram_enabled: bool,
    rom_bank: u16,
    ram_bank: u8,
    /// MBC1 mode latch: false = ROM-bank extension, true = RAM-bank select.
    mode: bool,
}

impl Cartridge {
    #[must_use]
    pub fn new(rom: &[u8], header: &GbHeader) -> Self {
        let kind = MbcKind::from_cartridge_type(header.cartridge_type);
        let ram_size = if kind == MbcKind::Mbc2 {
            // 512 half-bytes on the MBC itself
            0x200
        } else {
            header.ram_size()
        };

        Self {
            rom: rom.to_vec(),
            ram: vec![0xFF; ram_size],
            kind,
            ram_enabled: false,
            rom_bank: 1,
            ram_bank: 0,
            mode: false,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> MbcKind {
        self.kind
    }

    /// The bank mapped into the switchable window right now.
    #[must_use]
    pub const fn rom_bank(&self) -> u16 {
        self.rom_bank
    }

    /// Reads ROM space (0x0000-0x7FFF).
    #[must_use]
    pub fn read_rom(&self, address: u16) -> u8 {
        let offset = if address < 0x4000 {
            usize::from(address)
        } else {
            usize::from(self.rom_bank) * ROM_BANK_SIZE + usize::from(address - 0x4000)
        };

        if self.rom.is_empty() {
            0xFF
        } else {
            self.rom[offset % self.rom.len()]
        }
    }

    /// Handles a write into ROM space: every MBC interprets these as latch
    /// updates, a plain ROM ignores them.
    pub fn write_rom(&mut self, address: u16, value: u8) {
        match self.kind {
            MbcKind::NoMbc => (),
            MbcKind::Mbc1 => match address {
                0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
                0x2000..=0x3FFF => {
                    let low = match value & 0x1F {
                        0 => 1,
                        bank => u16::from(bank),
                    };
                    self.rom_bank = (self.rom_bank & 0x60) | low;
                }
                0x4000..=0x5FFF => {
                    if self.mode {
                        self.ram_bank = value & 0x03;
                    } else {
                        self.rom_bank = (self.rom_bank & 0x1F) | (u16::from(value & 0x03) << 5);
                    }
                }
                _ => self.mode = value & 0x01 == 0x01,
            },
            MbcKind::Mbc2 => {
                if address < 0x4000 {
                    // address bit 8 separates the two registers
                    if address & 0x0100 == 0 {
                        self.ram_enabled = value & 0x0F == 0x0A;
                    } else {
                        self.rom_bank = match u16::from(value & 0x0F) {
                            0 => 1,
                            bank => bank,
                        };
                    }
                }
            }
            MbcKind::Mbc3 => match address {
                0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
                0x2000..=0x3FFF => {
                    self.rom_bank = match u16::from(value & 0x7F) {
                        0 => 1,
                        bank => bank,
                    };
                }
                0x4000..=0x5FFF => {
                    // 0x08-0x0C would select RTC registers; not modeled
                    if value <= 0x03 {
                        self.ram_bank = value;
                    }
                }
                _ => (), // RTC latch, not modeled
            },
            MbcKind::Mbc5 => match address {
                0x0000..=0x1FFF => self.ram_enabled = value & 0x0F == 0x0A,
                // bank 0 is selectable on MBC5
                0x2000..=0x2FFF => self.rom_bank = (self.rom_bank & 0x100) | u16::from(value),
                0x3000..=0x3FFF => {
                    self.rom_bank = (self.rom_bank & 0x0FF) | (u16::from(value & 0x01) << 8);
                }
                0x4000..=0x5FFF => self.ram_bank = value & 0x0F,
                _ => (),
            },
        }
    }

    /// Reads external RAM space (0xA000-0xBFFF). Disabled or absent RAM
    /// reads back 0xFF.
    #[must_use]
    pub fn read_ram(&self, address: u16) -> u8 {
        if !self.ram_enabled || self.ram.is_empty() {
            return 0xFF;
        }

        match self.kind {
            // half-byte RAM, mirrored through the whole window
            MbcKind::Mbc2 => self.ram[usize::from(address) % 0x200] | 0xF0,
            _ => {
                let offset =
                    usize::from(self.ram_bank) * RAM_BANK_SIZE + usize::from(address - 0xA000);
                self.ram[offset % self.ram.len()]
            }
        }
    }

    pub fn write_ram(&mut self, address: u16, value: u8) {
        if !self.ram_enabled || self.ram.is_empty() {
            return;
        }

        match self.kind {
            MbcKind::Mbc2 => self.ram[usize::from(address) % 0x200] = value | 0xF0,
            _ => {
                let offset =
                    usize::from(self.ram_bank) * RAM_BANK_SIZE + usize::from(address - 0xA000);
                let len = self.ram.len();
                self.ram[offset % len] = value;
            }
        }
    }
}
