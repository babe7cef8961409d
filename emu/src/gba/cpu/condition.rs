//! ARM conditional execution.
//!
//! Every ARM instruction carries a 4-bit condition in bits 31-28; Thumb
//! conditional branches reuse the same encoding. Rather than re-deriving the
//! flag formula per instruction, a 256-entry table keyed by
//! `(cond << 4) | N<<3|Z<<2|C<<1|V` answers "does this condition pass with
//! these flags" with a single load. Code 0xE is always true; 0xF is reserved
//! on paper but executes as always-true on ARMv4T.

use serde::{Deserialize, Serialize};

use crate::gba::cpu::psr::Psr;

/// Condition codes for conditional execution.
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Condition {
    /// Equal (Z=1)
    EQ = 0x0,
    /// Not equal (Z=0)
    NE = 0x1,
    /// Unsigned higher or same (C=1)
    CS = 0x2,
    /// Unsigned lower (C=0)
    CC = 0x3,
    /// Negative (N=1)
    MI = 0x4,
    /// Positive or zero (N=0)
    PL = 0x5,
    /// Overflow (V=1)
    VS = 0x6,
    /// No overflow (V=0)
    VC = 0x7,
    /// Unsigned higher (C=1 and Z=0)
    HI = 0x8,
    /// Unsigned lower or same (C=0 or Z=1)
    LS = 0x9,
    /// Signed greater or equal (N=V)
    GE = 0xA,
    /// Signed less than (N!=V)
    LT = 0xB,
    /// Signed greater than (Z=0 and N=V)
    GT = 0xC,
    /// Signed less or equal (Z=1 or N!=V)
    LE = 0xD,
    /// Always
    AL = 0xE,
    /// Reserved encoding, executes as always on ARMv4T
    NV = 0xF,
}

impl From<u32> for Condition {
    fn from(cond: u32) -> Self {
        match cond & 0xF {
            0x0 => Self::EQ,
            0x1 => Self::NE,
            0x2 => Self::CS,
            0x3 => Self::CC,
            0x4 => Self::MI,
            0x5 => Self::PL,
            0x6 => Self::VS,
            0x7 => Self::VC,
            0x8 => Self::HI,
            0x9 => Self::LS,
            0xA => Self::GE,
            0xB => Self::LT,
            0xC => Self::GT,
            0xD => Self::LE,
            0xE => Self::AL,
            _ => Self::NV,
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::EQ => "EQ",
            Self::NE => "NE",
            Self::CS => "CS",
            Self::CC => "CC",
            Self::MI => "MI",
            Self::PL => "PL",
            Self::VS => "VS",
            Self::VC => "VC",
            Self::HI => "HI",
            Self::LS => "LS",
            Self::GE => "GE",
            Self::LT => "LT",
            Self::GT => "GT",
            Self::LE => "LE",
            Self::AL => "AL",
            Self::NV => "NV",
        };
        f.write_str(name)
    }
}

/// Direct formula: does `cond` pass with the flags packed as
/// `N<<3 | Z<<2 | C<<1 | V`?
const fn passes(cond: u8, nzcv: u8) -> bool {
    let n = nzcv & 0b1000 != 0;
    let z = nzcv & 0b0100 != 0;
    let c = nzcv & 0b0010 != 0;
    let v = nzcv & 0b0001 != 0;

    match cond & 0xF {
        0x0 => z,
        0x1 => !z,
        0x2 => c,
        0x3 => !c,
        0x4 => n,
        0x5 => !n,
        0x6 => v,
        0x7 => !v,
        0x8 => c && !z,
        0x9 => !c || z,
        0xA => n == v,
        0xB => n != v,
        0xC => !z && (n == v),
        0xD => z || (n != v),
        // AL, and the reserved NV which ARMv4T executes unconditionally
        _ => true,
    }
}

/// The 256-entry lookup: index is `(cond << 4) | flags_nibble`.
pub static CONDITION_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut key = 0;
    while key < 256 {
        table[key] = passes((key >> 4) as u8, (key & 0xF) as u8);
        key += 1;
    }
    table
};

/// Whether an instruction with the given condition executes under `cpsr`.
#[must_use]
pub fn can_execute(cpsr: Psr, cond: Condition) -> bool {
    CONDITION_TABLE[((cond as usize) << 4) | cpsr.flags_nibble() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Reference implementation written against the flag definitions,
    /// independent of the table builder.
    fn reference(cond: Condition, n: bool, z: bool, c: bool, v: bool) -> bool {
        match cond {
            Condition::EQ => z,
            Condition::NE => !z,
            Condition::CS => c,
            Condition::CC => !c,
            Condition::MI => n,
            Condition::PL => !n,
            Condition::VS => v,
            Condition::VC => !v,
            Condition::HI => c && !z,
            Condition::LS => !c || z,
            Condition::GE => n == v,
            Condition::LT => n != v,
            Condition::GT => !z && (n == v),
            Condition::LE => z || (n != v),
            Condition::AL | Condition::NV => true,
        }
    }

    #[test]
    fn table_matches_formula_for_all_keys() {
        for key in 0..256usize {
            let cond = Condition::from((key >> 4) as u32);
            let nzcv = key & 0xF;
            let expected = reference(
                cond,
                nzcv & 0b1000 != 0,
                nzcv & 0b0100 != 0,
                nzcv & 0b0010 != 0,
                nzcv & 0b0001 != 0,
            );

            assert_eq!(CONDITION_TABLE[key], expected, "key 0x{key:02X} ({cond})");
        }
    }

    #[test]
    fn can_execute_reads_cpsr_flags() {
        let mut cpsr = Psr::default();
        cpsr.set_zero_flag(true);

        assert!(can_execute(cpsr, Condition::EQ));
        assert!(!can_execute(cpsr, Condition::NE));
        assert!(can_execute(cpsr, Condition::AL));
        assert!(can_execute(cpsr, Condition::NV));
    }

    #[test]
    fn signed_comparisons() {
        // N=1, V=0: less-than holds
        let mut cpsr = Psr::default();
        cpsr.set_sign_flag(true);

        assert!(can_execute(cpsr, Condition::LT));
        assert!(!can_execute(cpsr, Condition::GE));
        assert!(can_execute(cpsr, Condition::LE));
        assert!(!can_execute(cpsr, Condition::GT));

        // N=1, V=1: greater-or-equal holds again
        cpsr.set_overflow_flag(true);
        assert!(can_execute(cpsr, Condition::GE));
        assert!(can_execute(cpsr, Condition::GT));
    }
}
