//! The ARM7TDMI register file: 37 physical 32-bit slots.
//!
//! One physical storage with mode-indexed access, matching the hardware:
//! r0-r7 and r15 are shared by every mode, FIQ banks r8-r12, and each
//! exception mode banks its own r13/r14. CPSR and the five SPSRs occupy the
//! remaining slots. A logical register number (0-15) plus the current mode
//! selects a physical slot through [`RegisterFile::physical_index`], which is
//! a pure function of the mode — mode transitions never copy register
//! values around, they just change which slots the indices resolve to.
//!
//! ```text
//! slot  0-7    r0-r7                 shared
//! slot  8-12   r8-r12                all modes except FIQ
//! slot 13-17   r8_fiq-r12_fiq
//! slot 18-29   r13/r14 per bank      usr/sys, fiq, irq, svc, abt, und
//! slot 30      r15
//! slot 31      CPSR
//! slot 32-36   SPSR                  fiq, irq, svc, abt, und
//! ```

use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use crate::gba::cpu::psr::{Mode, Psr};

/// Stack Pointer register index.
pub const REG_SP: u32 = 13;

/// Link Register index (return address for subroutines).
pub const REG_LR: u32 = 14;

/// Program Counter register index.
pub const REG_PC: u32 = 15;

const SLOT_PC: usize = 30;
const SLOT_CPSR: usize = 31;
const SLOT_SPSR_BASE: usize = 31; // + bank index 1..=5

/// Register banks in slot-layout order. User and System share a bank.
const fn bank_index(mode: Mode) -> usize {
    match mode {
        Mode::User | Mode::System => 0,
        Mode::Fiq => 1,
        Mode::Irq => 2,
        Mode::Supervisor => 3,
        Mode::Abort => 4,
        Mode::Undefined => 5,
    }
}

const BANK_COUNT: usize = 6;

/// logical register -> physical slot, per bank
const PHYSICAL_INDEX: [[usize; 16]; BANK_COUNT] = {
    let mut map = [[0usize; 16]; BANK_COUNT];
    let mut bank = 0;
    while bank < BANK_COUNT {
        let mut reg = 0;
        while reg < 16 {
            map[bank][reg] = match reg {
                0..=7 => reg,
                8..=12 => {
                    if bank == 1 {
                        reg + 5 // FIQ r8-r12 live at 13-17
                    } else {
                        reg
                    }
                }
                13 | 14 => 18 + bank * 2 + (reg - 13),
                _ => SLOT_PC,
            };
            reg += 1;
        }
        bank += 1;
    }
    map
};

/// The 37-slot physical register file.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterFile {
    #[serde_as(as = "[_; 37]")]
    slots: [u32; 37],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self { slots: [0; 37] }
    }
}

impl RegisterFile {
    /// The physical slot a logical register resolves to in `mode`.
    #[must_use]
    pub const fn physical_index(mode: Mode, reg: u32) -> usize {
        PHYSICAL_INDEX[bank_index(mode)][(reg & 0xF) as usize]
    }

    /// Reads a logical register as seen from `mode`. r15 reads return the
    /// raw stored PC; the CPU layer adds the pipeline offset.
    #[must_use]
    pub const fn register_at(&self, mode: Mode, reg: u32) -> u32 {
        self.slots[Self::physical_index(mode, reg)]
    }

    pub const fn set_register_at(&mut self, mode: Mode, reg: u32, value: u32) {
        self.slots[Self::physical_index(mode, reg)] = value;
    }

    /// The stored program counter, without any pipeline offset.
    #[must_use]
    pub const fn program_counter(&self) -> u32 {
        self.slots[SLOT_PC]
    }

    pub const fn set_program_counter(&mut self, value: u32) {
        self.slots[SLOT_PC] = value;
    }

    pub const fn advance_program_counter(&mut self, bytes: u32) {
        self.slots[SLOT_PC] = self.slots[SLOT_PC].wrapping_add(bytes);
    }

    #[must_use]
    pub fn cpsr(&self) -> Psr {
        Psr::from(self.slots[SLOT_CPSR])
    }

    pub fn set_cpsr(&mut self, psr: Psr) {
        self.slots[SLOT_CPSR] = psr.into();
    }

    /// The SPSR of `mode`. User and System have none: reading SPSR there
    /// returns CPSR, which is what MRS observes on hardware.
    #[must_use]
    pub fn spsr(&self, mode: Mode) -> Psr {
        if mode.has_spsr() {
            Psr::from(self.slots[SLOT_SPSR_BASE + bank_index(mode)])
        } else {
            self.cpsr()
        }
    }

    /// Writes the SPSR of `mode`. Dropped in User/System, which have none.
    pub fn set_spsr(&mut self, mode: Mode, psr: Psr) {
        if mode.has_spsr() {
            self.slots[SLOT_SPSR_BASE + bank_index(mode)] = psr.into();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ALL_MODES: [Mode; 7] = [
        Mode::User,
        Mode::Fiq,
        Mode::Irq,
        Mode::Supervisor,
        Mode::Abort,
        Mode::Undefined,
        Mode::System,
    ];

    #[test]
    fn low_registers_are_shared() {
        let mut regs = RegisterFile::default();

        regs.set_register_at(Mode::User, 3, 0xCAFE);
        for mode in ALL_MODES {
            assert_eq!(regs.register_at(mode, 3), 0xCAFE);
        }
    }

    #[test]
    fn fiq_banks_r8_to_r12() {
        let mut regs = RegisterFile::default();

        regs.set_register_at(Mode::User, 10, 0x1111);
        regs.set_register_at(Mode::Fiq, 10, 0x2222);

        assert_eq!(regs.register_at(Mode::User, 10), 0x1111);
        assert_eq!(regs.register_at(Mode::Fiq, 10), 0x2222);
        assert_eq!(regs.register_at(Mode::Irq, 10), 0x1111);
    }

    #[test]
    fn sp_lr_banked_per_mode() {
        let mut regs = RegisterFile::default();

        for (i, mode) in ALL_MODES.into_iter().enumerate() {
            regs.set_register_at(mode, REG_SP, 0x1000 + i as u32);
        }

        // User and System share a bank; every exception mode has its own
        assert_eq!(
            regs.register_at(Mode::User, REG_SP),
            regs.register_at(Mode::System, REG_SP)
        );
        assert_eq!(regs.register_at(Mode::Fiq, REG_SP), 0x1001);
        assert_eq!(regs.register_at(Mode::Irq, REG_SP), 0x1002);
        assert_eq!(regs.register_at(Mode::Supervisor, REG_SP), 0x1003);
        assert_eq!(regs.register_at(Mode::Abort, REG_SP), 0x1004);
        assert_eq!(regs.register_at(Mode::Undefined, REG_SP), 0x1005);
    }

    #[test]
    fn banked_values_survive_mode_round_trips() {
        let mut regs = RegisterFile::default();

        // write in every mode, then read everything back: intervening
        // writes in other modes must not leak across banks
        for (i, mode) in ALL_MODES.into_iter().enumerate() {
            for reg in 0..16u32 {
                regs.set_register_at(mode, reg, (i as u32) << 16 | reg);
            }
        }

        for (i, mode) in ALL_MODES.into_iter().enumerate() {
            for reg in 0..16u32 {
                let expected = regs.register_at(
                    mode,
                    reg,
                );
                // the slot another mode maps to the same physical index
                // must hold the same value: pure-function mapping
                let slot = RegisterFile::physical_index(mode, reg);
                for other in ALL_MODES {
                    if RegisterFile::physical_index(other, reg) == slot {
                        assert_eq!(regs.register_at(other, reg), expected);
                    }
                }
                let _ = i;
            }
        }

        // r15 was last written by System's loop iteration (value 6<<16|15)
        assert_eq!(regs.program_counter(), 6 << 16 | 15);
    }

    #[test]
    fn spsr_reads_cpsr_in_user_and_system() {
        let mut regs = RegisterFile::default();

        let mut cpsr = Psr::from(Mode::System);
        cpsr.set_carry_flag(true);
        regs.set_cpsr(cpsr);

        assert_eq!(regs.spsr(Mode::User), cpsr);
        assert_eq!(regs.spsr(Mode::System), cpsr);

        let saved = Psr::from(Mode::Irq);
        regs.set_spsr(Mode::Irq, saved);
        assert_eq!(regs.spsr(Mode::Irq), saved);
        // writing a User SPSR is dropped
        regs.set_spsr(Mode::User, saved);
        assert_eq!(regs.spsr(Mode::User), cpsr);
    }

    #[test]
    fn mapping_is_stable() {
        // spot-check the documented slot layout
        assert_eq!(RegisterFile::physical_index(Mode::User, 0), 0);
        assert_eq!(RegisterFile::physical_index(Mode::Fiq, 8), 13);
        assert_eq!(RegisterFile::physical_index(Mode::User, 13), 18);
        assert_eq!(RegisterFile::physical_index(Mode::Fiq, 13), 20);
        assert_eq!(RegisterFile::physical_index(Mode::Undefined, 14), 29);
        for mode in ALL_MODES {
            assert_eq!(RegisterFile::physical_index(mode, 15), 30);
        }
    }
}
