//! The ARM7TDMI processor core.
//!
//! The CPU runs one of two instruction sets selected by CPSR.T: 32-bit ARM
//! or 16-bit Thumb. There is no modeled pipeline buffer; the pipeline is
//! visible only through PC reads (stored PC + 8 in ARM, + 4 in Thumb) and
//! through the `pipeline_valid` flag: an instruction that writes r15 clears
//! it, which skips the post-instruction PC advance.
//!
//! Exception entry saves CPSR into the target mode's SPSR, switches mode,
//! masks IRQ, forces ARM state and jumps to the vector:
//!
//! | exception   | vector | mode       | LR holds              |
//! |-------------|--------|------------|-----------------------|
//! | Undefined   | 0x04   | Undefined  | next instruction      |
//! | SWI         | 0x08   | Supervisor | next instruction      |
//! | Data abort  | 0x10   | Abort      | faulting + 8          |
//! | IRQ         | 0x18   | IRQ        | interrupted + 4       |

pub mod alu;
pub mod condition;
pub mod psr;
pub mod registers;

mod arm;
mod thumb;

use serde::{Deserialize, Serialize};

use crate::gba::bus::Bus;

use self::condition::{Condition, can_execute};
use self::psr::{CpuState, Mode, Psr};
use self::registers::{REG_LR, REG_PC, RegisterFile};

/// Exception causes this core can raise while executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    UndefinedInstruction,
    SoftwareInterrupt,
    DataAbort,
    Irq,
}

impl Exception {
    const fn vector(self) -> u32 {
        match self {
            Self::UndefinedInstruction => 0x04,
            Self::SoftwareInterrupt => 0x08,
            Self::DataAbort => 0x10,
            Self::Irq => 0x18,
        }
    }

    const fn target_mode(self) -> Mode {
        match self {
            Self::UndefinedInstruction => Mode::Undefined,
            Self::SoftwareInterrupt => Mode::Supervisor,
            Self::DataAbort => Mode::Abort,
            Self::Irq => Mode::Irq,
        }
    }

    /// What LR must hold, as an offset from the interrupted instruction.
    const fn link_offset(self, state: CpuState) -> u32 {
        match (self, state) {
            (Self::UndefinedInstruction | Self::SoftwareInterrupt, CpuState::Thumb) => 2,
            (Self::UndefinedInstruction | Self::SoftwareInterrupt | Self::Irq, CpuState::Arm)
            | (Self::Irq, CpuState::Thumb) => 4,
            (Self::DataAbort, _) => 8,
        }
    }
}

/// The ARM7TDMI CPU with its bus connection.
#[derive(Debug, Serialize, Deserialize)]
pub struct Arm7tdmi {
    pub bus: Bus,
    pub registers: RegisterFile,

    /// While set, the frame loop skips instruction execution and advances
    /// time straight to the next scheduled event.
    pub halted: bool,

    /// Monotonic tick counter, never reset.
    pub cycles: u64,

    /// Cleared when the executing instruction writes r15; gates the default
    /// post-instruction PC advance.
    pipeline_valid: bool,
}

impl Default for Arm7tdmi {
    fn default() -> Self {
        Self::new(Bus::default())
    }
}

impl Arm7tdmi {
    /// A CPU in the post-reset state: Supervisor mode, ARM state, IRQ and
    /// FIQ masked, PC at the reset vector.
    #[must_use]
    pub fn new(bus: Bus) -> Self {
        let mut registers = RegisterFile::default();

        let mut cpsr = Psr::from(Mode::Supervisor);
        cpsr.set_irq_disable(true);
        cpsr.set_fiq_disable(true);
        registers.set_cpsr(cpsr);

        Self {
            bus,
            registers,
            halted: false,
            cycles: 0,
            pipeline_valid: true,
        }
    }

    #[must_use]
    pub fn cpsr(&self) -> Psr {
        self.registers.cpsr()
    }

    pub fn set_cpsr(&mut self, psr: Psr) {
        self.registers.set_cpsr(psr);
    }

    #[must_use]
    pub fn cpu_state(&self) -> CpuState {
        self.cpsr().cpu_state()
    }

    /// Reads a logical register. r15 returns the stored PC plus the
    /// pipeline depth: + 8 in ARM state, + 4 in Thumb.
    #[must_use]
    pub fn read_register(&self, reg: u32) -> u32 {
        if reg == REG_PC {
            self.registers
                .program_counter()
                .wrapping_add(self.cpu_state().pc_read_offset())
        } else {
            self.registers.register_at(self.cpsr().mode(), reg)
        }
    }

    /// Writes a logical register. Writing r15 aligns the value to the
    /// instruction width and invalidates the pipeline, so the instruction's
    /// default PC advance is skipped.
    pub fn write_register(&mut self, reg: u32, value: u32) {
        if reg == REG_PC {
            let aligned = match self.cpu_state() {
                CpuState::Arm => value & !0b11,
                CpuState::Thumb => value & !0b1,
            };
            self.registers.set_program_counter(aligned);
            self.pipeline_valid = false;
        } else {
            self.registers.set_register_at(self.cpsr().mode(), reg, value);
        }
    }

    /// Enters an exception: SPSR capture, mode switch, IRQ mask, ARM state,
    /// LR fixup, jump to the vector.
    pub fn exception(&mut self, kind: Exception) {
        let old_cpsr = self.cpsr();
        let target = kind.target_mode();

        self.registers.set_spsr(target, old_cpsr);

        let link = self
            .registers
            .program_counter()
            .wrapping_add(kind.link_offset(old_cpsr.cpu_state()));
        self.registers.set_register_at(target, REG_LR, link);

        let mut cpsr = old_cpsr;
        cpsr.set_mode(target);
        cpsr.set_irq_disable(true);
        cpsr.set_cpu_state(CpuState::Arm);
        self.set_cpsr(cpsr);

        self.registers.set_program_counter(kind.vector());
        self.pipeline_valid = false;
    }

    /// Restores CPSR from the current mode's SPSR: the return-from-exception
    /// idiom (`MOVS pc`, `SUBS pc`, LDM with the S bit).
    pub fn restore_cpsr_from_spsr(&mut self) {
        let spsr = self.registers.spsr(self.cpsr().mode());
        self.set_cpsr(spsr);
    }

    /// Executes one instruction (or takes a pending interrupt) and returns
    /// its cycle cost.
    pub fn step(&mut self) -> u64 {
        // a pending enabled interrupt preempts the next fetch
        if self.bus.io.irq_line() && !self.cpsr().irq_disable() {
            self.exception(Exception::Irq);
        }

        self.pipeline_valid = true;

        match self.cpu_state() {
            CpuState::Arm => {
                let pc = self.registers.program_counter() & !0b11;
                self.bus.set_current_pc(pc);
                let opcode = self.bus.read_word(pc);
                self.bus.set_prefetch_shadow(opcode);

                let condition = Condition::from(opcode >> 28);
                if can_execute(self.cpsr(), condition) {
                    arm::dispatch(self, opcode);
                }
            }
            CpuState::Thumb => {
                let pc = self.registers.program_counter() & !0b1;
                self.bus.set_current_pc(pc);
                let opcode = self.bus.read_half_word(pc);
                // open-bus reads in Thumb see the halfword in both lanes
                self.bus
                    .set_prefetch_shadow(u32::from(opcode) << 16 | u32::from(opcode));

                thumb::dispatch(self, opcode);
            }
        }

        if self.pipeline_valid {
            self.registers
                .advance_program_counter(self.cpu_state().instruction_width());
        }

        let cost = self.bus.take_cycles().max(1);
        self.cycles += cost;
        cost
    }
}
