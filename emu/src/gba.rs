//! The Game Boy Advance system: CPU, bus and PPU glued together by the
//! event scheduler.
//!
//! The frame loop alternates between draining due events and executing CPU
//! instructions. All events with timestamps at or before the current cycle
//! fire before the CPU runs past that point; handlers may schedule follow-up
//! events (HBlank-start schedules HBlank-end, HBlank-end schedules the next
//! HBlank-start), and a frame ends when the FrameComplete event fires.
//! While the CPU is halted, time jumps straight to the next event instead
//! of single-stepping.

pub mod bus;
pub mod cpu;
pub mod io_registers;
pub mod ppu;
pub mod scheduler;

use serde::{Deserialize, Serialize};

use crate::cartridge::{GbaHeader, LoadError, validate_bios};
use crate::framebuffer::GbaFrame;
use crate::gba::bus::Bus;
use crate::gba::cpu::Arm7tdmi;
use crate::gba::io_registers::Interrupt;
use crate::gba::ppu::{TOTAL_SCANLINES, VISIBLE_SCANLINES};
use crate::gba::scheduler::{
    CYCLES_PER_FRAME, CYCLES_PER_SCANLINE, Event, EventKind, Scheduler, VISIBLE_DOT_CYCLES,
};

/// Cycles spent inside HBlank on every scanline.
const HBLANK_CYCLES: u64 = CYCLES_PER_SCANLINE - VISIBLE_DOT_CYCLES;

/// The complete Game Boy Advance system.
#[derive(Debug, Serialize, Deserialize)]
pub struct Gba {
    pub cpu: Arm7tdmi,

    /// Parsed cartridge header with game metadata.
    pub cartridge_header: GbaHeader,

    pub scheduler: Scheduler,
}

impl Gba {
    /// Builds a GBA from a BIOS image and a cartridge ROM. Length errors are
    /// fatal; checksum mismatches are logged and tolerated.
    ///
    /// # Errors
    /// [`LoadError`] when the BIOS is not 16384 bytes or the ROM length is
    /// out of bounds.
    pub fn new(bios: &[u8], cartridge: &[u8]) -> Result<Self, LoadError> {
        let bios = validate_bios(bios)?;
        let cartridge_header = GbaHeader::parse(cartridge)?;

        Ok(Self {
            cpu: Arm7tdmi::new(Bus::new(bios, cartridge)),
            cartridge_header,
            scheduler: Scheduler::new(),
        })
    }

    /// Replaces the whole keypad word (active-low KEYINPUT layout).
    pub fn set_key_input(&mut self, raw: u16) {
        self.cpu.bus.keypad.set_key_input(raw);
    }

    /// The last composed frame.
    #[must_use]
    pub const fn frame(&self) -> &GbaFrame {
        &self.cpu.bus.ppu.frame
    }

    /// Runs the emulator until the current frame is complete. The caller
    /// polls its own quit signal between frames.
    pub fn run_frame(&mut self) {
        loop {
            while let Some(event) = self.scheduler.pop_due() {
                if self.handle_event(event) {
                    return;
                }
            }

            if self.cpu.halted {
                // nothing to execute: jump straight to the next event
                if let Some(timestamp) = self.scheduler.next_timestamp() {
                    self.scheduler.fast_forward(timestamp);
                }
                if self.cpu.bus.io.pending_enabled_interrupt() {
                    self.cpu.halted = false;
                }
            } else {
                let cycles = self.cpu.step();
                self.scheduler.advance(cycles);

                if self.cpu.bus.io.take_halt_request() {
                    self.cpu.halted = true;
                }
            }
        }
    }

    /// Fires one event. Returns true when the frame is over.
    fn handle_event(&mut self, event: Event) -> bool {
        match event.kind {
            EventKind::HBlankStart => {
                let bus = &mut self.cpu.bus;
                bus.ppu.render_scanline(&bus.io);
                bus.io.set_hblank_flag(true);

                if bus.io.hblank_irq_enabled() {
                    bus.io.raise_interrupt(Interrupt::HBlank);
                }

                self.scheduler.schedule_absolute(
                    EventKind::HBlankEnd,
                    event.timestamp + HBLANK_CYCLES,
                    0,
                );
                false
            }
            EventKind::HBlankEnd => {
                self.advance_scanline();
                self.scheduler.schedule_absolute(
                    EventKind::HBlankStart,
                    event.timestamp + VISIBLE_DOT_CYCLES,
                    0,
                );
                false
            }
            // timers and DMA exist on the wire but are stub peripherals
            EventKind::TimerOverflow(_) | EventKind::Dma(_) => false,
            EventKind::FrameComplete => {
                self.scheduler.schedule_absolute(
                    EventKind::FrameComplete,
                    event.timestamp + CYCLES_PER_FRAME,
                    0,
                );
                true
            }
        }
    }

    /// Scanline rollover: VCOUNT advance, VBlank entry, VCOUNT match, and
    /// the affine reference re-latch at frame wrap.
    fn advance_scanline(&mut self) {
        let bus = &mut self.cpu.bus;
        bus.io.set_hblank_flag(false);

        bus.io.vcount += 1;
        if bus.io.vcount == TOTAL_SCANLINES {
            bus.io.vcount = 0;
            bus.io.set_vblank_flag(false);
            bus.ppu.latch_affine_references(&bus.io);
        }

        if bus.io.vcount == VISIBLE_SCANLINES {
            bus.io.set_vblank_flag(true);
            if bus.io.vblank_irq_enabled() {
                bus.io.raise_interrupt(Interrupt::VBlank);
            }
        }

        let matched = bus.io.vcount == bus.io.vcount_setting();
        bus.io.set_vcount_flag(matched);
        if matched && bus.io.vcount_irq_enabled() {
            bus.io.raise_interrupt(Interrupt::VCount);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::cartridge::GBA_BIOS_LEN;

    fn test_rom() -> Vec<u8> {
        let mut rom = vec![0u8; 0x200];
        rom[0x04..0x08].copy_from_slice(&[0x24, 0xFF, 0xAE, 0x51]);
        rom[0xA0..0xA4].copy_from_slice(b"TEST");
        rom[0xB2] = 0x96;
        let checksum = rom[0xA0..=0xBC]
            .iter()
            .fold(0u8, |acc, &item| acc.wrapping_sub(item))
            .wrapping_sub(0x19);
        rom[0xBD] = checksum;
        rom
    }

    fn test_gba() -> Gba {
        Gba::new(&[0u8; GBA_BIOS_LEN], &test_rom()).unwrap()
    }

    #[test]
    fn construction_parses_header() {
        let gba = test_gba();
        assert_eq!(gba.cartridge_header.game_title, "TEST");
    }

    #[test]
    fn bad_bios_length_is_fatal() {
        let result = Gba::new(&[0u8; 100], &test_rom());
        assert_eq!(result.unwrap_err(), LoadError::BiosSize { len: 100 });
    }

    #[test]
    fn frame_advances_one_frame_of_cycles() {
        let mut gba = test_gba();

        gba.run_frame();
        assert!(gba.scheduler.current_cycles() >= CYCLES_PER_FRAME);
        assert!(gba.scheduler.current_cycles() < 2 * CYCLES_PER_FRAME);

        let after_first = gba.scheduler.current_cycles();
        gba.run_frame();
        assert!(gba.scheduler.current_cycles() >= after_first + CYCLES_PER_FRAME);
    }

    #[test]
    fn halted_cpu_fast_forwards_to_frame_end() {
        let mut gba = test_gba();
        gba.cpu.halted = true;

        gba.run_frame();

        // no instruction ran, time still reached the frame boundary
        assert_eq!(gba.cpu.cycles, 0);
        assert!(gba.scheduler.current_cycles() >= CYCLES_PER_FRAME);
    }

    #[test]
    fn frame_skeleton_stays_scheduled() {
        let mut gba = test_gba();
        gba.cpu.halted = true;

        gba.run_frame();

        // the terminator was rescheduled for the next frame
        let next = gba.scheduler.peek().unwrap();
        assert!(next.timestamp > gba.scheduler.current_cycles() || next.kind != EventKind::FrameComplete);
    }

    #[test]
    fn vblank_interrupt_raised_when_enabled() {
        let mut gba = test_gba();
        gba.cpu.halted = true;
        // DISPSTAT: VBlank IRQ enable
        gba.cpu.bus.io.write_half(0x004, 1 << 3);

        gba.run_frame();

        assert!(gba.cpu.bus.io.interrupt_request & 1 != 0);
    }

    #[test]
    fn vcount_match_interrupt() {
        let mut gba = test_gba();
        gba.cpu.halted = true;
        // match at line 42, VCOUNT IRQ enable
        gba.cpu.bus.io.write_half(0x004, (42 << 8) | (1 << 5));

        gba.run_frame();

        assert!(gba.cpu.bus.io.interrupt_request & (1 << 2) != 0);
    }

    #[test]
    fn halt_wakes_on_pending_enabled_interrupt() {
        let mut gba = test_gba();
        gba.cpu.halted = true;
        gba.cpu.bus.io.write_half(0x200, 1); // IE: VBlank
        gba.cpu.bus.io.write_half(0x004, 1 << 3); // DISPSTAT VBlank IRQ

        gba.run_frame();

        // VBlank fired mid-frame and the halt was released
        assert!(!gba.cpu.halted);
        assert!(gba.cpu.cycles > 0);
    }
}
