//! The Game Boy memory bus: one 16-bit address space with fixed regions.
//!
//! | range           | contents                          |
//! |-----------------|-----------------------------------|
//! | `0x0000-0x3FFF` | ROM bank 0                        |
//! | `0x4000-0x7FFF` | switchable ROM bank (MBC)         |
//! | `0x8000-0x9FFF` | VRAM                              |
//! | `0xA000-0xBFFF` | external cartridge RAM (MBC)      |
//! | `0xC000-0xDFFF` | WRAM                              |
//! | `0xE000-0xFDFF` | echo of WRAM                      |
//! | `0xFE00-0xFE9F` | OAM                               |
//! | `0xFF00-0xFF7F` | I/O registers                     |
//! | `0xFF80-0xFFFE` | HRAM                              |
//! | `0xFFFF`        | IE                                |
//!
//! Writes into ROM space are MBC latch updates. A write to 0xFF46 performs
//! the OAM DMA copy immediately.

use serde::{Deserialize, Serialize};

use crate::gb::mbc::Cartridge;
use crate::gb::ppu::GbPpu;
use crate::gb::timer::Timer;
use crate::keypad::Keypad;

const WRAM_SIZE: usize = 0x2000;
const HRAM_SIZE: usize = 0x7F;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbBus {
    pub cartridge: Cartridge,
    pub ppu: GbPpu,
    pub timer: Timer,
    pub keypad: Keypad,

    wram: Vec<u8>,
    hram: Vec<u8>,

    /// P1 select bits as last written (bits 4-5).
    p1_select: u8,
    serial_data: u8,
    serial_control: u8,

    /// Interrupt Enable mask (0xFFFF).
    pub interrupt_enable: u8,
    /// Interrupt Flag latches (0xFF0F).
    pub interrupt_flag: u8,
}

impl GbBus {
    #[must_use]
    pub fn new(cartridge: Cartridge) -> Self {
        Self {
            cartridge,
            ppu: GbPpu::default(),
            timer: Timer::default(),
            keypad: Keypad::default(),
            wram: vec![0; WRAM_SIZE],
            hram: vec![0; HRAM_SIZE],
            p1_select: 0x30,
            serial_data: 0,
            serial_control: 0,
            interrupt_enable: 0,
            interrupt_flag: 0,
        }
    }

    /// Advances the peripherals by the cycle cost of one instruction and
    /// latches their interrupt requests into IF.
    pub fn tick(&mut self, cycles: u8) {
        let video = self.ppu.clock(cycles);
        if video.vblank {
            self.interrupt_flag |= 0b0000_0001;
        }
        if video.stat {
            self.interrupt_flag |= 0b0000_0010;
        }

        if self.timer.clock(cycles) {
            self.interrupt_flag |= 0b0000_0100;
        }
    }

    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        match address {
            0x0000..=0x7FFF => self.cartridge.read_rom(address),
            0x8000..=0x9FFF => self.ppu.vram[usize::from(address - 0x8000)],
            0xA000..=0xBFFF => self.cartridge.read_ram(address),
            0xC000..=0xDFFF => self.wram[usize::from(address - 0xC000)],
            // echo RAM mirrors WRAM
            0xE000..=0xFDFF => self.wram[usize::from(address - 0xE000)],
            0xFE00..=0xFE9F => self.ppu.oam[usize::from(address - 0xFE00)],
            0xFEA0..=0xFEFF => 0xFF,
            0xFF00..=0xFF7F => self.read_io(address),
            0xFF80..=0xFFFE => self.hram[usize::from(address - 0xFF80)],
            0xFFFF => self.interrupt_enable,
        }
    }

    pub fn write(&mut self, address: u16, value: u8) {
        match address {
            0x0000..=0x7FFF => self.cartridge.write_rom(address, value),
            0x8000..=0x9FFF => self.ppu.vram[usize::from(address - 0x8000)] = value,
            0xA000..=0xBFFF => self.cartridge.write_ram(address, value),
            0xC000..=0xDFFF => self.wram[usize::from(address - 0xC000)] = value,
            0xE000..=0xFDFF => self.wram[usize::from(address - 0xE000)] = value,
            0xFE00..=0xFE9F => self.ppu.oam[usize::from(address - 0xFE00)] = value,
            0xFEA0..=0xFEFF => (),
            0xFF00..=0xFF7F => self.write_io(address, value),
            0xFF80..=0xFFFE => self.hram[usize::from(address - 0xFF80)] = value,
            0xFFFF => self.interrupt_enable = value,
        }
    }

    fn read_io(&self, address: u16) -> u8 {
        match address {
            0xFF00 => self.keypad.p1(self.p1_select),
            0xFF01 => self.serial_data,
            0xFF02 => self.serial_control | 0x7E,
            0xFF04..=0xFF07 => self.timer.read(address),
            0xFF0F => 0xE0 | self.interrupt_flag,
            0xFF46 => 0xFF, // OAM DMA source is write-only
            0xFF40..=0xFF4B => self.ppu.read_register(address),
            _ => 0xFF,
        }
    }

    fn write_io(&mut self, address: u16, value: u8) {
        match address {
            0xFF00 => self.p1_select = value & 0x30,
            0xFF01 => self.serial_data = value,
            0xFF02 => self.serial_control = value & 0x81,
            0xFF04..=0xFF07 => self.timer.write(address, value),
            0xFF0F => self.interrupt_flag = value & 0x1F,
            0xFF46 => self.oam_dma(value),
            0xFF40..=0xFF4B => self.ppu.write_register(address, value),
            _ => (),
        }
    }

    /// OAM DMA: copies 160 bytes from `source << 8` into OAM. The copy is
    /// immediate; the bus-stealing window is not modeled.
    fn oam_dma(&mut self, source: u8) {
        let base = u16::from(source) << 8;
        for i in 0..OAM_DMA_LEN {
            let byte = self.read(base + i);
            self.ppu.oam[usize::from(i)] = byte;
        }
    }
}

const OAM_DMA_LEN: u16 = 160;
