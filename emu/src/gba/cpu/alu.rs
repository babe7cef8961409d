//! The barrel shifter and the ALU arithmetic helpers.
//!
//! ARM's second operand passes through the barrel shifter before the ALU.
//! The shift-by-immediate encodings reuse amount 0 for special operations
//! (`LSR #0` means `LSR #32`, `ASR #0` means `ASR #32`, `ROR #0` is RRX),
//! while shift-by-register takes the amount from a register's low byte with
//! no special zero encoding and clamps amounts of 32 and above per type.
//! Logical operations take their carry from the shifter; arithmetic
//! operations take it from the add/subtract itself.

use serde::{Deserialize, Serialize};

use crate::bitwise::Bits;

/// The four barrel shifter operations, as encoded in bits 6-5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftKind {
    Lsl = 0b00,
    Lsr = 0b01,
    Asr = 0b10,
    Ror = 0b11,
}

impl From<u32> for ShiftKind {
    fn from(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Self::Lsl,
            0b01 => Self::Lsr,
            0b10 => Self::Asr,
            _ => Self::Ror,
        }
    }
}

/// Result of a shifter or ALU operation together with the flags it produces.
/// `carry` is the shifter carry-out for shifts and logical ops, the unsigned
/// carry/no-borrow for arithmetic; `overflow` is signed overflow and is only
/// meaningful for arithmetic.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArithmeticOpResult {
    pub result: u32,
    pub carry: bool,
    pub overflow: bool,
    pub sign: bool,
    pub zero: bool,
}

impl ArithmeticOpResult {
    /// Builds a logical-op result: N/Z from the value, C supplied by the
    /// shifter, V untouched (callers keep the old V).
    #[must_use]
    pub const fn logical(result: u32, carry: bool, overflow: bool) -> Self {
        Self {
            result,
            carry,
            overflow,
            sign: (result as i32) < 0,
            zero: result == 0,
        }
    }
}

/// A shift with an amount taken from an immediate field (0-31). Amount 0
/// selects the special encodings.
#[must_use]
pub fn shift_immediate(kind: ShiftKind, amount: u32, rm: u32, carry: bool) -> ArithmeticOpResult {
    match (kind, amount) {
        // LSL #0: value passes through, carry untouched
        (ShiftKind::Lsl, 0) => ArithmeticOpResult {
            result: rm,
            carry,
            ..Default::default()
        },
        // LSR #0 encodes LSR #32
        (ShiftKind::Lsr, 0) => shift_by(ShiftKind::Lsr, 32, rm, carry),
        // ASR #0 encodes ASR #32
        (ShiftKind::Asr, 0) => shift_by(ShiftKind::Asr, 32, rm, carry),
        // ROR #0 encodes RRX: one-bit rotate through carry
        (ShiftKind::Ror, 0) => ArithmeticOpResult {
            result: (rm >> 1) | (u32::from(carry) << 31),
            carry: rm.get_bit(0),
            ..Default::default()
        },
        _ => shift_by(kind, amount, rm, carry),
    }
}

/// A shift with an amount taken from a register's low byte (0-255). Amount 0
/// passes the value through with carry untouched; there are no special zero
/// encodings in register form.
#[must_use]
pub fn shift_register(kind: ShiftKind, amount: u32, rm: u32, carry: bool) -> ArithmeticOpResult {
    if amount == 0 {
        return ArithmeticOpResult {
            result: rm,
            carry,
            ..Default::default()
        };
    }

    shift_by(kind, amount, rm, carry)
}

/// A shift by an explicit non-zero amount, with the over-31 clamping rules.
fn shift_by(kind: ShiftKind, amount: u32, rm: u32, carry: bool) -> ArithmeticOpResult {
    match kind {
        ShiftKind::Lsl => match amount {
            // shift in u64 so amount 32 is well-defined
            1..=32 => {
                let wide = u64::from(rm) << amount;
                ArithmeticOpResult {
                    result: wide as u32,
                    carry: wide.get_bit(32),
                    ..Default::default()
                }
            }
            _ => ArithmeticOpResult::default(),
        },
        ShiftKind::Lsr => match amount {
            1..=32 => {
                let wide = u64::from(rm) << 1 >> amount;
                ArithmeticOpResult {
                    result: (wide >> 1) as u32,
                    carry: wide.get_bit(0),
                    ..Default::default()
                }
            }
            _ => ArithmeticOpResult::default(),
        },
        ShiftKind::Asr => match amount {
            1..=31 => ArithmeticOpResult {
                result: ((rm as i32) >> amount) as u32,
                carry: rm.get_bit((amount - 1) as u8),
                ..Default::default()
            },
            // ASR #32 and beyond replicate the sign bit everywhere
            _ => ArithmeticOpResult {
                result: ((rm as i32) >> 31) as u32,
                carry: rm.get_bit(31),
                ..Default::default()
            },
        },
        ShiftKind::Ror => {
            // ROR by n > 32 equals ROR by n mod 32, with multiples of 32
            // behaving as ROR #32
            let amount = match amount % 32 {
                0 => 32,
                reduced => reduced,
            };

            if amount == 32 {
                ArithmeticOpResult {
                    result: rm,
                    carry: rm.get_bit(31),
                    ..Default::default()
                }
            } else {
                ArithmeticOpResult {
                    result: rm.rotate_right(amount),
                    carry: rm.get_bit((amount - 1) as u8),
                    ..Default::default()
                }
            }
        }
    }
}

/// Rotates the 8-bit data-processing immediate right by twice its 4-bit
/// rotate field. A non-zero rotation updates the shifter carry from bit 31
/// of the result; rotation 0 leaves the carry untouched.
#[must_use]
pub fn rotate_immediate(base: u32, rotate_twice: u32, carry: bool) -> ArithmeticOpResult {
    let result = base.rotate_right(rotate_twice);
    ArithmeticOpResult {
        result,
        carry: if rotate_twice == 0 {
            carry
        } else {
            result.get_bit(31)
        },
        ..Default::default()
    }
}

#[must_use]
pub fn add(a: u32, b: u32) -> ArithmeticOpResult {
    let (result, carry) = a.overflowing_add(b);
    ArithmeticOpResult {
        result,
        carry,
        overflow: (a as i32).overflowing_add(b as i32).1,
        sign: (result as i32) < 0,
        zero: result == 0,
    }
}

#[must_use]
pub fn adc(a: u32, b: u32, carry_in: bool) -> ArithmeticOpResult {
    let c = u32::from(carry_in);
    let first = add(a, b);
    let second = add(first.result, c);

    ArithmeticOpResult {
        result: second.result,
        carry: first.carry || second.carry,
        overflow: first.overflow != second.overflow,
        sign: second.sign,
        zero: second.zero,
    }
}

#[must_use]
pub fn sub(a: u32, b: u32) -> ArithmeticOpResult {
    let result = a.wrapping_sub(b);
    ArithmeticOpResult {
        result,
        // C means "no borrow" on ARM subtraction
        carry: a >= b,
        overflow: (a as i32).overflowing_sub(b as i32).1,
        sign: (result as i32) < 0,
        zero: result == 0,
    }
}

#[must_use]
pub fn sbc(a: u32, b: u32, carry_in: bool) -> ArithmeticOpResult {
    // SBC computes a - b - (1 - C)
    let borrow = u32::from(!carry_in);
    let first = sub(a, b);
    let second = sub(first.result, borrow);

    ArithmeticOpResult {
        result: second.result,
        carry: first.carry && second.carry,
        overflow: first.overflow != second.overflow,
        sign: second.sign,
        zero: second.zero,
    }
}
