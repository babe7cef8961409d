//! Program Status Registers (CPSR and SPSR).
//!
//! ```text
//! 31 30 29 28        8 7 6 5 4   0
//! ┌──┬──┬──┬──┬────────┬─┬─┬─┬─────┐
//! │N │Z │C │V │Reserved│I│F│T│Mode │
//! └──┴──┴──┴──┴────────┴─┴─┴─┴─────┘
//! ```
//!
//! The condition flags (bits 28-31) always reflect the last flag-updating
//! operation. The T bit selects ARM or Thumb state and is only ever changed
//! through `BX` or exception entry/return. Every exception mode has an SPSR
//! that captures CPSR at entry; User and System have none.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;
use crate::gba::cpu::alu::ArithmeticOpResult;

/// One of the seven ARM7TDMI operating modes, as encoded in CPSR bits 4-0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// The normal program execution state.
    User = 0b10000,

    /// Fast interrupt, with its own r8-r14.
    Fiq = 0b10001,

    /// General-purpose interrupt handling.
    Irq = 0b10010,

    /// Protected mode for the operating system; entered on SWI and reset.
    Supervisor = 0b10011,

    /// Entered after a data abort or prefetch abort.
    Abort = 0b10111,

    /// Entered when an undefined instruction is executed.
    Undefined = 0b11011,

    /// A privileged mode sharing the User register view.
    System = 0b11111,
}

impl Mode {
    /// Whether this mode has a saved program status register.
    #[must_use]
    pub const fn has_spsr(self) -> bool {
        !matches!(self, Self::User | Self::System)
    }
}

impl From<Mode> for u32 {
    fn from(mode: Mode) -> Self {
        mode as Self
    }
}

impl TryFrom<u32> for Mode {
    type Error = u32;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits & 0b11111 {
            0b10000 => Ok(Self::User),
            0b10001 => Ok(Self::Fiq),
            0b10010 => Ok(Self::Irq),
            0b10011 => Ok(Self::Supervisor),
            0b10111 => Ok(Self::Abort),
            0b11011 => Ok(Self::Undefined),
            0b11111 => Ok(Self::System),
            other => Err(other),
        }
    }
}

/// The CPU instruction-set state, held in CPSR bit 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    /// 32-bit instructions.
    Arm,
    /// 16-bit instructions.
    Thumb,
}

impl CpuState {
    /// Instruction width in bytes: the default PC advance per instruction.
    #[must_use]
    pub const fn instruction_width(self) -> u32 {
        match self {
            Self::Arm => 4,
            Self::Thumb => 2,
        }
    }

    /// Pipeline depth in bytes: what reading r15 adds to the stored PC.
    #[must_use]
    pub const fn pc_read_offset(self) -> u32 {
        match self {
            Self::Arm => 8,
            Self::Thumb => 4,
        }
    }
}

impl From<bool> for CpuState {
    fn from(t_bit: bool) -> Self {
        if t_bit { Self::Thumb } else { Self::Arm }
    }
}

/// A program status register (CPSR or SPSR) wrapping the raw word with
/// typed accessors for each field.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr(u32);

impl Psr {
    /// N => Bit 31, (0=Not Signed, 1=Signed)
    #[must_use]
    pub fn sign_flag(self) -> bool {
        self.0.get_bit(31)
    }

    /// Z => Bit 30, (0=Not Zero, 1=Zero)
    #[must_use]
    pub fn zero_flag(self) -> bool {
        self.0.get_bit(30)
    }

    /// C => Bit 29, (0=Borrow/No Carry, 1=Carry/No Borrow)
    #[must_use]
    pub fn carry_flag(self) -> bool {
        self.0.get_bit(29)
    }

    /// V => Bit 28, (0=No Overflow, 1=Overflow)
    #[must_use]
    pub fn overflow_flag(self) -> bool {
        self.0.get_bit(28)
    }

    /// I => Bit 7, (0=Enable, 1=Disable)
    #[must_use]
    pub fn irq_disable(self) -> bool {
        self.0.get_bit(7)
    }

    /// F => Bit 6, (0=Enable, 1=Disable)
    #[must_use]
    pub fn fiq_disable(self) -> bool {
        self.0.get_bit(6)
    }

    /// T => Bit 5, (0=ARM, 1=Thumb)
    #[must_use]
    pub fn state_bit(self) -> bool {
        self.0.get_bit(5)
    }

    /// The N/Z/C/V flags packed as `N<<3 | Z<<2 | C<<1 | V`, the key layout
    /// of the condition lookup table.
    #[must_use]
    pub fn flags_nibble(self) -> u8 {
        self.0.get_bits(28..=31) as u8
    }

    /// M4-M0 => Bits 4-0. Invalid encodings fall back to Supervisor; the
    /// BIOS writes mode 0 into SPSR during boot.
    #[must_use]
    pub fn mode(self) -> Mode {
        Mode::try_from(self.0).unwrap_or(Mode::Supervisor)
    }

    #[must_use]
    pub fn cpu_state(self) -> CpuState {
        self.state_bit().into()
    }

    pub fn set_sign_flag(&mut self, value: bool) {
        self.0.set_bit(31, value);
    }

    pub fn set_zero_flag(&mut self, value: bool) {
        self.0.set_bit(30, value);
    }

    pub fn set_carry_flag(&mut self, value: bool) {
        self.0.set_bit(29, value);
    }

    pub fn set_overflow_flag(&mut self, value: bool) {
        self.0.set_bit(28, value);
    }

    /// Applies the N/Z/C/V results of an ALU operation in one go.
    pub fn set_flags(&mut self, result: &ArithmeticOpResult) {
        self.set_sign_flag(result.sign);
        self.set_zero_flag(result.zero);
        self.set_carry_flag(result.carry);
        self.set_overflow_flag(result.overflow);
    }

    pub fn set_irq_disable(&mut self, value: bool) {
        self.0.set_bit(7, value);
    }

    pub fn set_fiq_disable(&mut self, value: bool) {
        self.0.set_bit(6, value);
    }

    pub fn set_state_bit(&mut self, value: bool) {
        self.0.set_bit(5, value);
    }

    pub fn set_cpu_state(&mut self, state: CpuState) {
        self.set_state_bit(matches!(state, CpuState::Thumb));
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.0.set_bits(0..=4, mode as u32);
    }
}

impl From<Mode> for Psr {
    fn from(mode: Mode) -> Self {
        let mut psr = Self(0);
        psr.set_mode(mode);
        psr
    }
}

impl From<u32> for Psr {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<Psr> for u32 {
    fn from(psr: Psr) -> Self {
        psr.0
    }
}
