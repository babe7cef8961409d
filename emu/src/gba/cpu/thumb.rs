//! The Thumb (16-bit) instruction set, formats 1-19 of ARMv4T.
//!
//! Decode goes through a 256-entry table indexed by the opcode's upper byte,
//! built once at first use. Formats 7 and 8 (load/store with register
//! offset, plain and sign-extending) share one handler that sub-decodes on
//! bit 9. POP {..., PC} keeps the ARMv4T behavior of staying in Thumb state;
//! only BX switches instruction sets.

use once_cell::sync::Lazy;

use crate::bitwise::{Bits, sign_extend};

use super::alu::{self, ArithmeticOpResult, ShiftKind};
use super::condition::{Condition, can_execute};
use super::registers::{REG_LR, REG_PC, REG_SP};
use super::{Arm7tdmi, Exception};

pub type ThumbHandler = fn(&mut Arm7tdmi, u16);

pub fn dispatch(cpu: &mut Arm7tdmi, opcode: u16) {
    DISPATCH_TABLE[usize::from(opcode >> 8)](cpu, opcode);
}

static DISPATCH_TABLE: Lazy<Box<[ThumbHandler; 256]>> = Lazy::new(|| {
    let mut table = vec![undefined as ThumbHandler; 256];
    for (top, slot) in table.iter_mut().enumerate() {
        *slot = classify(top as u16);
    }

    table
        .into_boxed_slice()
        .try_into()
        .unwrap_or_else(|_| unreachable!())
});

/// Picks the handler for an opcode upper byte.
fn classify(top: u16) -> ThumbHandler {
    if top == 0b1101_1111 {
        software_interrupt
    } else if top == 0b1011_0000 {
        adjust_stack_pointer
    } else if top >> 3 == 0b00011 {
        add_subtract
    } else if top >> 5 == 0b000 {
        move_shifted_register
    } else if top >> 5 == 0b001 {
        immediate_operation
    } else if top >> 2 == 0b01_0000 {
        alu_operation
    } else if top >> 2 == 0b01_0001 {
        hi_register_op
    } else if top >> 3 == 0b01001 {
        pc_relative_load
    } else if top >> 4 == 0b0101 {
        register_offset_load_store
    } else if top >> 5 == 0b011 {
        immediate_offset_load_store
    } else if top >> 4 == 0b1000 {
        halfword_immediate_load_store
    } else if top >> 4 == 0b1001 {
        sp_relative_load_store
    } else if top >> 4 == 0b1010 {
        load_address
    } else if top >> 4 == 0b1011 && (top >> 1) & 0b11 == 0b10 {
        push_pop
    } else if top >> 4 == 0b1100 {
        multiple_load_store
    } else if top >> 4 == 0b1101 {
        conditional_branch
    } else if top >> 3 == 0b11100 {
        unconditional_branch
    } else if top >> 4 == 0b1111 {
        long_branch_with_link
    } else {
        undefined
    }
}

fn undefined(cpu: &mut Arm7tdmi, _opcode: u16) {
    cpu.exception(Exception::UndefinedInstruction);
}

fn software_interrupt(cpu: &mut Arm7tdmi, _opcode: u16) {
    cpu.exception(Exception::SoftwareInterrupt);
}

fn set_flags(cpu: &mut Arm7tdmi, result: &ArithmeticOpResult) {
    let mut cpsr = cpu.cpsr();
    cpsr.set_flags(result);
    cpu.set_cpsr(cpsr);
}

/// Format 1: LSL/LSR/ASR rd, rs, #imm5.
fn move_shifted_register(cpu: &mut Arm7tdmi, opcode: u16) {
    let kind = match opcode.get_bits(11..=12) {
        0 => ShiftKind::Lsl,
        1 => ShiftKind::Lsr,
        _ => ShiftKind::Asr,
    };
    let amount = u32::from(opcode.get_bits(6..=10));
    let source = cpu.read_register(u32::from(opcode.get_bits(3..=5)));
    let rd = u32::from(opcode.get_bits(0..=2));

    let mut result = alu::shift_immediate(kind, amount, source, cpu.cpsr().carry_flag());
    result.sign = (result.result as i32) < 0;
    result.zero = result.result == 0;
    result.overflow = cpu.cpsr().overflow_flag();

    cpu.write_register(rd, result.result);
    set_flags(cpu, &result);
}

/// Format 2: ADD/SUB rd, rs, rn or #imm3.
fn add_subtract(cpu: &mut Arm7tdmi, opcode: u16) {
    let operand = if opcode.get_bit(10) {
        u32::from(opcode.get_bits(6..=8))
    } else {
        cpu.read_register(u32::from(opcode.get_bits(6..=8)))
    };
    let source = cpu.read_register(u32::from(opcode.get_bits(3..=5)));
    let rd = u32::from(opcode.get_bits(0..=2));

    let result = if opcode.get_bit(9) {
        alu::sub(source, operand)
    } else {
        alu::add(source, operand)
    };

    cpu.write_register(rd, result.result);
    set_flags(cpu, &result);
}

/// Format 3: MOV/CMP/ADD/SUB rd, #imm8.
fn immediate_operation(cpu: &mut Arm7tdmi, opcode: u16) {
    let rd = u32::from(opcode.get_bits(8..=10));
    let immediate = u32::from(opcode.get_bits(0..=7));
    let current = cpu.read_register(rd);

    match opcode.get_bits(11..=12) {
        0 => {
            // MOV: N/Z from the value, C/V untouched
            let result = ArithmeticOpResult::logical(
                immediate,
                cpu.cpsr().carry_flag(),
                cpu.cpsr().overflow_flag(),
            );
            cpu.write_register(rd, result.result);
            set_flags(cpu, &result);
        }
        1 => set_flags(cpu, &alu::sub(current, immediate)),
        2 => {
            let result = alu::add(current, immediate);
            cpu.write_register(rd, result.result);
            set_flags(cpu, &result);
        }
        _ => {
            let result = alu::sub(current, immediate);
            cpu.write_register(rd, result.result);
            set_flags(cpu, &result);
        }
    }
}

/// Format 4: the register-to-register ALU operations.
fn alu_operation(cpu: &mut Arm7tdmi, opcode: u16) {
    let rs = cpu.read_register(u32::from(opcode.get_bits(3..=5)));
    let rd_index = u32::from(opcode.get_bits(0..=2));
    let rd = cpu.read_register(rd_index);

    let carry = cpu.cpsr().carry_flag();
    let overflow = cpu.cpsr().overflow_flag();
    let logical = |value: u32| ArithmeticOpResult::logical(value, carry, overflow);
    let shifted = |kind: ShiftKind| {
        let mut result = alu::shift_register(kind, rs & 0xFF, rd, carry);
        result.sign = (result.result as i32) < 0;
        result.zero = result.result == 0;
        result.overflow = overflow;
        result
    };

    let (result, write) = match opcode.get_bits(6..=9) {
        0x0 => (logical(rd & rs), true),            // AND
        0x1 => (logical(rd ^ rs), true),            // EOR
        0x2 => (shifted(ShiftKind::Lsl), true),     // LSL
        0x3 => (shifted(ShiftKind::Lsr), true),     // LSR
        0x4 => (shifted(ShiftKind::Asr), true),     // ASR
        0x5 => (alu::adc(rd, rs, carry), true),     // ADC
        0x6 => (alu::sbc(rd, rs, carry), true),     // SBC
        0x7 => (shifted(ShiftKind::Ror), true),     // ROR
        0x8 => (logical(rd & rs), false),           // TST
        0x9 => (alu::sub(0, rs), true),             // NEG
        0xA => (alu::sub(rd, rs), false),           // CMP
        0xB => (alu::add(rd, rs), false),           // CMN
        0xC => (logical(rd | rs), true),            // ORR
        0xD => {
            // MUL updates N/Z only
            let product = rd.wrapping_mul(rs);
            (logical(product), true)
        }
        0xE => (logical(rd & !rs), true),           // BIC
        _ => (logical(!rs), true),                  // MVN
    };

    if write {
        cpu.write_register(rd_index, result.result);
    }
    set_flags(cpu, &result);
}

/// Format 5: ADD/CMP/MOV on the full register file, and BX.
fn hi_register_op(cpu: &mut Arm7tdmi, opcode: u16) {
    let rs_index = u32::from(opcode.get_bits(3..=6));
    let rd_index = u32::from(opcode.get_bits(0..=2)) | (u32::from(opcode.get_bit(7)) << 3);

    // a PC operand participates with bit 0 clear
    let rs = cpu.read_register(rs_index) & if rs_index == REG_PC { !1 } else { !0 };

    match opcode.get_bits(8..=9) {
        0 => {
            let rd = cpu.read_register(rd_index);
            cpu.write_register(rd_index, rd.wrapping_add(rs));
        }
        1 => {
            let rd = cpu.read_register(rd_index);
            set_flags(cpu, &alu::sub(rd, rs));
        }
        2 => cpu.write_register(rd_index, rs),
        _ => {
            // BX: the only Thumb instruction that can leave Thumb state
            let target = cpu.read_register(rs_index);
            let mut cpsr = cpu.cpsr();
            cpsr.set_cpu_state(target.get_bit(0).into());
            cpu.set_cpsr(cpsr);
            cpu.write_register(REG_PC, target);
        }
    }
}

/// Format 6: LDR rd, [PC, #imm8 * 4].
fn pc_relative_load(cpu: &mut Arm7tdmi, opcode: u16) {
    let rd = u32::from(opcode.get_bits(8..=10));
    let offset = u32::from(opcode.get_bits(0..=7)) * 4;
    let address = (cpu.read_register(REG_PC) & !0b11).wrapping_add(offset);

    let value = cpu.bus.read_word(address);
    cpu.write_register(rd, value);
}

/// Formats 7 and 8 combined: load/store with a register offset, with bit 9
/// selecting the sign-extending/halfword family.
fn register_offset_load_store(cpu: &mut Arm7tdmi, opcode: u16) {
    let offset = cpu.read_register(u32::from(opcode.get_bits(6..=8)));
    let base = cpu.read_register(u32::from(opcode.get_bits(3..=5)));
    let rd = u32::from(opcode.get_bits(0..=2));
    let address = base.wrapping_add(offset);

    if opcode.get_bit(9) {
        // STRH / LDRSB / LDRH / LDRSH
        match opcode.get_bits(10..=11) {
            0b00 => {
                let value = cpu.read_register(rd);
                cpu.bus.write_half_word(address & !1, value as u16);
            }
            0b01 => {
                let value = sign_extend(u32::from(cpu.bus.read_byte(address)), 8);
                cpu.write_register(rd, value);
            }
            0b10 => {
                let value = u32::from(cpu.bus.read_half_word(address & !1))
                    .rotate_right((address & 1) * 8);
                cpu.write_register(rd, value);
            }
            _ => {
                let value = if address & 1 == 1 {
                    sign_extend(u32::from(cpu.bus.read_byte(address)), 8)
                } else {
                    sign_extend(u32::from(cpu.bus.read_half_word(address)), 16)
                };
                cpu.write_register(rd, value);
            }
        }
    } else {
        // STR / STRB / LDR / LDRB
        match opcode.get_bits(10..=11) {
            0b00 => {
                let value = cpu.read_register(rd);
                cpu.bus.write_word(address & !3, value);
            }
            0b01 => {
                let value = cpu.read_register(rd);
                cpu.bus.write_byte(address, value as u8);
            }
            0b10 => {
                let value = cpu
                    .bus
                    .read_word(address & !3)
                    .rotate_right((address & 3) * 8);
                cpu.write_register(rd, value);
            }
            _ => {
                let value = u32::from(cpu.bus.read_byte(address));
                cpu.write_register(rd, value);
            }
        }
    }
}

/// Format 9: load/store word or byte with a 5-bit immediate offset.
fn immediate_offset_load_store(cpu: &mut Arm7tdmi, opcode: u16) {
    let byte = opcode.get_bit(12);
    let load = opcode.get_bit(11);
    let imm = u32::from(opcode.get_bits(6..=10));
    let base = cpu.read_register(u32::from(opcode.get_bits(3..=5)));
    let rd = u32::from(opcode.get_bits(0..=2));

    let address = base.wrapping_add(if byte { imm } else { imm * 4 });

    match (load, byte) {
        (false, false) => {
            let value = cpu.read_register(rd);
            cpu.bus.write_word(address & !3, value);
        }
        (false, true) => {
            let value = cpu.read_register(rd);
            cpu.bus.write_byte(address, value as u8);
        }
        (true, false) => {
            let value = cpu
                .bus
                .read_word(address & !3)
                .rotate_right((address & 3) * 8);
            cpu.write_register(rd, value);
        }
        (true, true) => {
            let value = u32::from(cpu.bus.read_byte(address));
            cpu.write_register(rd, value);
        }
    }
}

/// Format 10: load/store halfword with a 5-bit immediate offset.
fn halfword_immediate_load_store(cpu: &mut Arm7tdmi, opcode: u16) {
    let load = opcode.get_bit(11);
    let offset = u32::from(opcode.get_bits(6..=10)) * 2;
    let base = cpu.read_register(u32::from(opcode.get_bits(3..=5)));
    let rd = u32::from(opcode.get_bits(0..=2));
    let address = base.wrapping_add(offset);

    if load {
        let value =
            u32::from(cpu.bus.read_half_word(address & !1)).rotate_right((address & 1) * 8);
        cpu.write_register(rd, value);
    } else {
        let value = cpu.read_register(rd);
        cpu.bus.write_half_word(address & !1, value as u16);
    }
}

/// Format 11: load/store word relative to SP.
fn sp_relative_load_store(cpu: &mut Arm7tdmi, opcode: u16) {
    let load = opcode.get_bit(11);
    let rd = u32::from(opcode.get_bits(8..=10));
    let offset = u32::from(opcode.get_bits(0..=7)) * 4;
    let address = cpu.read_register(REG_SP).wrapping_add(offset);

    if load {
        let value = cpu
            .bus
            .read_word(address & !3)
            .rotate_right((address & 3) * 8);
        cpu.write_register(rd, value);
    } else {
        let value = cpu.read_register(rd);
        cpu.bus.write_word(address & !3, value);
    }
}

/// Format 12: rd = PC-aligned or SP, plus an immediate.
fn load_address(cpu: &mut Arm7tdmi, opcode: u16) {
    let rd = u32::from(opcode.get_bits(8..=10));
    let offset = u32::from(opcode.get_bits(0..=7)) * 4;

    let base = if opcode.get_bit(11) {
        cpu.read_register(REG_SP)
    } else {
        cpu.read_register(REG_PC) & !0b11
    };

    cpu.write_register(rd, base.wrapping_add(offset));
}

/// Format 13: SP += or -= imm7 * 4.
fn adjust_stack_pointer(cpu: &mut Arm7tdmi, opcode: u16) {
    let offset = u32::from(opcode.get_bits(0..=6)) * 4;
    let sp = cpu.read_register(REG_SP);

    let new_sp = if opcode.get_bit(7) {
        sp.wrapping_sub(offset)
    } else {
        sp.wrapping_add(offset)
    };

    cpu.write_register(REG_SP, new_sp);
}

/// Format 14: PUSH {rlist, LR} / POP {rlist, PC}.
fn push_pop(cpu: &mut Arm7tdmi, opcode: u16) {
    let pop = opcode.get_bit(11);
    let with_link = opcode.get_bit(8);
    let rlist = opcode.get_bits(0..=7);
    let count = u32::from(rlist.count_ones()) + u32::from(with_link);

    if pop {
        // LDMIA sp!: lowest register at the lowest address
        let mut address = cpu.read_register(REG_SP);
        for reg in 0..8u32 {
            if rlist.get_bit(reg as u8) {
                let value = cpu.bus.read_word(address & !3);
                cpu.write_register(reg, value);
                address = address.wrapping_add(4);
            }
        }
        if with_link {
            // ARMv4T POP {PC} stays in Thumb; write_register clears bit 0
            let value = cpu.bus.read_word(address & !3);
            cpu.write_register(REG_PC, value);
            address = address.wrapping_add(4);
        }
        cpu.write_register(REG_SP, address);
    } else {
        // STMDB sp!
        let base = cpu.read_register(REG_SP).wrapping_sub(count * 4);
        let mut address = base;
        for reg in 0..8u32 {
            if rlist.get_bit(reg as u8) {
                let value = cpu.read_register(reg);
                cpu.bus.write_word(address & !3, value);
                address = address.wrapping_add(4);
            }
        }
        if with_link {
            let value = cpu.read_register(REG_LR);
            cpu.bus.write_word(address & !3, value);
        }
        cpu.write_register(REG_SP, base);
    }
}

/// Format 15: STMIA/LDMIA rb!, {rlist}.
fn multiple_load_store(cpu: &mut Arm7tdmi, opcode: u16) {
    let load = opcode.get_bit(11);
    let rb = u32::from(opcode.get_bits(8..=10));
    let rlist = opcode.get_bits(0..=7);
    let base = cpu.read_register(rb);

    if rlist == 0 {
        // empty register list: r15 alone, base moves by 0x40
        if load {
            let value = cpu.bus.read_word(base & !3);
            cpu.write_register(REG_PC, value);
        } else {
            let value = cpu.read_register(REG_PC).wrapping_add(2);
            cpu.bus.write_word(base & !3, value);
        }
        cpu.write_register(rb, base.wrapping_add(0x40));
        return;
    }

    let count = u32::from(rlist.count_ones());
    let lowest = u32::from(rlist.trailing_zeros());
    let new_base = base.wrapping_add(count * 4);

    let mut address = base;
    for reg in 0..8u32 {
        if !rlist.get_bit(reg as u8) {
            continue;
        }

        if load {
            let value = cpu.bus.read_word(address & !3);
            cpu.write_register(reg, value);
        } else {
            let value = if reg == rb {
                if reg == lowest { base } else { new_base }
            } else {
                cpu.read_register(reg)
            };
            cpu.bus.write_word(address & !3, value);
        }

        address = address.wrapping_add(4);
    }

    // LDMIA with the base in the list: the loaded value wins
    if !(load && rlist.get_bit(rb as u8)) {
        cpu.write_register(rb, new_base);
    }
}

/// Format 16: conditional branch on the shared condition table.
fn conditional_branch(cpu: &mut Arm7tdmi, opcode: u16) {
    let condition = Condition::from(u32::from(opcode.get_bits(8..=11)));

    // 0b1110 is unallocated in this format (0b1111 decodes as SWI)
    if condition == Condition::AL {
        cpu.exception(Exception::UndefinedInstruction);
        return;
    }

    if can_execute(cpu.cpsr(), condition) {
        let offset = sign_extend(u32::from(opcode.get_bits(0..=7)), 8) << 1;
        let target = cpu.read_register(REG_PC).wrapping_add(offset);
        cpu.write_register(REG_PC, target);
    }
}

/// Format 18: unconditional branch, 11-bit halfword offset.
fn unconditional_branch(cpu: &mut Arm7tdmi, opcode: u16) {
    let offset = sign_extend(u32::from(opcode.get_bits(0..=10)), 11) << 1;
    let target = cpu.read_register(REG_PC).wrapping_add(offset);
    cpu.write_register(REG_PC, target);
}

/// Format 19: the two-halfword long BL.
fn long_branch_with_link(cpu: &mut Arm7tdmi, opcode: u16) {
    let offset = u32::from(opcode.get_bits(0..=10));

    if opcode.get_bit(11) {
        // second half: jump, leaving the return address (bit 0 set) in LR
        let target = cpu.read_register(REG_LR).wrapping_add(offset << 1);
        let link = cpu.registers.program_counter().wrapping_add(2) | 1;
        cpu.write_register(REG_LR, link);
        cpu.write_register(REG_PC, target);
    } else {
        // first half: upper offset bits into LR
        let link = cpu
            .read_register(REG_PC)
            .wrapping_add(sign_extend(offset, 11) << 12);
        cpu.write_register(REG_LR, link);
    }
}

#[cfg(test)]
mod tests {
    use super::super::psr::{CpuState, Mode};
    use super::super::tests::cpu_at;
    use super::*;
    use pretty_assertions::assert_eq;

    const IWRAM: u32 = 0x0300_0000;

    fn thumb_cpu() -> Arm7tdmi {
        cpu_at(IWRAM + 0x800, CpuState::Thumb)
    }

    #[test]
    fn move_shifted_sets_flags() {
        let mut cpu = thumb_cpu();
        cpu.write_register(1, 0x8000_0000);

        // LSR r0, r1, #31
        dispatch(&mut cpu, 0x0FC8);
        assert_eq!(cpu.read_register(0), 1);
        assert!(!cpu.cpsr().zero_flag());

        // LSL r0, r1, #1: shifts the sign bit out into C
        dispatch(&mut cpu, 0x0048);
        assert_eq!(cpu.read_register(0), 0);
        assert!(cpu.cpsr().zero_flag());
        assert!(cpu.cpsr().carry_flag());
    }

    #[test]
    fn add_subtract_register_and_immediate() {
        let mut cpu = thumb_cpu();
        cpu.write_register(1, 10);
        cpu.write_register(2, 3);

        // ADD r0, r1, r2
        dispatch(&mut cpu, 0x1888);
        assert_eq!(cpu.read_register(0), 13);

        // SUB r0, r1, #2
        dispatch(&mut cpu, 0x1E88);
        assert_eq!(cpu.read_register(0), 8);
        assert!(cpu.cpsr().carry_flag());
    }

    #[test]
    fn immediate_mov_cmp_add_sub() {
        let mut cpu = thumb_cpu();

        // MOV r0, #42
        dispatch(&mut cpu, 0x202A);
        assert_eq!(cpu.read_register(0), 42);

        // ADD r0, #8
        dispatch(&mut cpu, 0x3008);
        assert_eq!(cpu.read_register(0), 50);

        // SUB r0, #50
        dispatch(&mut cpu, 0x3832);
        assert!(cpu.cpsr().zero_flag());

        // CMP r0, #1 -> borrow
        dispatch(&mut cpu, 0x2801);
        assert!(!cpu.cpsr().carry_flag());
        assert_eq!(cpu.read_register(0), 0, "CMP writes no result");
    }

    #[test]
    fn alu_adc_neg_mul() {
        let mut cpu = thumb_cpu();
        let mut cpsr = cpu.cpsr();
        cpsr.set_carry_flag(true);
        cpu.set_cpsr(cpsr);
        cpu.write_register(0, 5);
        cpu.write_register(1, 2);

        // ADC r0, r1: 5 + 2 + 1
        dispatch(&mut cpu, 0x4148);
        assert_eq!(cpu.read_register(0), 8);

        // NEG r0, r1
        dispatch(&mut cpu, 0x4248);
        assert_eq!(cpu.read_register(0), 0xFFFF_FFFE);
        assert!(cpu.cpsr().sign_flag());

        // MUL r0, r1
        dispatch(&mut cpu, 0x4348);
        assert_eq!(cpu.read_register(0), 0xFFFF_FFFC);
    }

    #[test]
    fn alu_register_shift_by_32_clamps() {
        let mut cpu = thumb_cpu();
        cpu.write_register(0, 0x0000_0001);
        cpu.write_register(1, 32);

        // LSL r0, r1
        dispatch(&mut cpu, 0x4088);
        assert_eq!(cpu.read_register(0), 0);
        assert!(cpu.cpsr().carry_flag(), "bit 0 went out last");
    }

    #[test]
    fn hi_register_add_and_mov() {
        let mut cpu = thumb_cpu();
        cpu.write_register(1, 5);
        cpu.registers
            .set_register_at(Mode::Supervisor, 9, 1000);

        // ADD r1, r9
        dispatch(&mut cpu, 0x4449);
        assert_eq!(cpu.read_register(1), 1005);

        // MOV r8, r1
        dispatch(&mut cpu, 0x4688);
        assert_eq!(cpu.read_register(8), 1005);
    }

    #[test]
    fn hi_register_cmp_sets_flags() {
        let mut cpu = thumb_cpu();
        cpu.write_register(0, 10);
        cpu.registers.set_register_at(Mode::Supervisor, 8, 10);

        // CMP r0, r8
        dispatch(&mut cpu, 0x4540);
        assert!(cpu.cpsr().zero_flag());
    }

    #[test]
    fn bx_to_arm() {
        let mut cpu = thumb_cpu();
        cpu.write_register(2, 0x0800_0000);

        // BX r2
        dispatch(&mut cpu, 0x4710);

        assert_eq!(cpu.cpu_state(), CpuState::Arm);
        assert_eq!(cpu.registers.program_counter(), 0x0800_0000);
    }

    #[test]
    fn pc_relative_load_word_aligns() {
        let mut cpu = cpu_at(IWRAM + 0x102, CpuState::Thumb);
        // PC reads 0x106, word-aligned 0x104; + 4 = 0x108
        cpu.bus.write_word(IWRAM + 0x108, 0x4242_4242);

        // LDR r0, [PC, #4]
        dispatch(&mut cpu, 0x4801);
        assert_eq!(cpu.read_register(0), 0x4242_4242);
    }

    #[test]
    fn register_offset_word_and_signed() {
        let mut cpu = thumb_cpu();
        cpu.bus.write_half_word(IWRAM + 0x10, 0x80FE);
        cpu.write_register(1, IWRAM);
        cpu.write_register(2, 0x10);

        // LDRH r0, [r1, r2]
        dispatch(&mut cpu, 0x5A88);
        assert_eq!(cpu.read_register(0), 0x80FE);

        // LDSH r0, [r1, r2]
        dispatch(&mut cpu, 0x5E88);
        assert_eq!(cpu.read_register(0), 0xFFFF_80FE);

        // LDSB r0, [r1, r2]
        dispatch(&mut cpu, 0x5688);
        assert_eq!(cpu.read_register(0), 0xFFFF_FFFE);

        // STR r3, [r1, r2]
        cpu.write_register(3, 0x1357_9BDF);
        dispatch(&mut cpu, 0x508B);
        assert_eq!(cpu.bus.read_word(IWRAM + 0x10), 0x1357_9BDF);
    }

    #[test]
    fn thumb_ldrh_odd_address_rotates() {
        let mut cpu = thumb_cpu();
        cpu.bus.write_half_word(IWRAM + 0x100, 0xCDAB);
        cpu.write_register(1, IWRAM);
        cpu.write_register(2, 0x101);

        // LDRH r0, [r1, r2]
        dispatch(&mut cpu, 0x5A88);
        assert_eq!(cpu.read_register(0), 0xAB00_00CD);
    }

    #[test]
    fn immediate_offset_word_scaling() {
        let mut cpu = thumb_cpu();
        cpu.write_register(1, IWRAM);
        cpu.write_register(0, 0xFEED_BEEF);

        // STR r0, [r1, #12] (imm5 = 3)
        dispatch(&mut cpu, 0x60C8);
        assert_eq!(cpu.bus.read_word(IWRAM + 12), 0xFEED_BEEF);

        // LDR r2, [r1, #12]
        dispatch(&mut cpu, 0x68CA);
        assert_eq!(cpu.read_register(2), 0xFEED_BEEF);

        // STRB r0, [r1, #1]
        dispatch(&mut cpu, 0x7048);
        assert_eq!(cpu.bus.read_byte(IWRAM + 1), 0xEF);
    }

    #[test]
    fn sp_relative_round_trip() {
        let mut cpu = thumb_cpu();
        cpu.write_register(13, IWRAM + 0x200);
        cpu.write_register(0, 0x7777);

        // STR r0, [SP, #8]
        dispatch(&mut cpu, 0x9002);
        // LDR r1, [SP, #8]
        dispatch(&mut cpu, 0x9902);

        assert_eq!(cpu.read_register(1), 0x7777);
    }

    #[test]
    fn load_address_pc_and_sp() {
        let mut cpu = cpu_at(IWRAM + 0x102, CpuState::Thumb);
        cpu.write_register(13, 0x0300_0800);

        // ADD r0, PC, #16: (0x106 & !3) + 16
        dispatch(&mut cpu, 0xA004);
        assert_eq!(cpu.read_register(0), IWRAM + 0x104 + 16);

        // ADD r1, SP, #8
        dispatch(&mut cpu, 0xA902);
        assert_eq!(cpu.read_register(1), 0x0300_0808);
    }

    #[test]
    fn stack_pointer_adjustment() {
        let mut cpu = thumb_cpu();
        cpu.write_register(13, 0x0300_0100);

        // ADD SP, #40
        dispatch(&mut cpu, 0xB00A);
        assert_eq!(cpu.read_register(13), 0x0300_0128);

        // SUB SP, #40
        dispatch(&mut cpu, 0xB08A);
        assert_eq!(cpu.read_register(13), 0x0300_0100);
    }

    #[test]
    fn push_pop_round_trip() {
        let mut cpu = thumb_cpu();
        cpu.write_register(13, IWRAM + 0x400);
        cpu.write_register(0, 0xAAAA);
        cpu.write_register(1, 0xBBBB);
        cpu.write_register(14, 0xCCCC);

        // PUSH {r0, r1, LR}
        dispatch(&mut cpu, 0xB503);
        assert_eq!(cpu.read_register(13), IWRAM + 0x400 - 12);

        cpu.write_register(0, 0);
        cpu.write_register(1, 0);

        // POP {r0, r1}
        dispatch(&mut cpu, 0xBC03);
        assert_eq!(cpu.read_register(0), 0xAAAA);
        assert_eq!(cpu.read_register(1), 0xBBBB);
        assert_eq!(cpu.read_register(13), IWRAM + 0x400 - 4);
    }

    #[test]
    fn pop_pc_stays_thumb() {
        // SP at 0x03000100 holding 0x08001000
        let mut cpu = thumb_cpu();
        cpu.write_register(13, 0x0300_0100);
        cpu.bus.write_word(0x0300_0100, 0x0800_1000);

        // POP {PC}
        dispatch(&mut cpu, 0xBD00);

        assert_eq!(cpu.cpu_state(), CpuState::Thumb);
        assert_eq!(cpu.registers.program_counter(), 0x0800_1000);
        assert_eq!(cpu.read_register(13), 0x0300_0104);
    }

    #[test]
    fn stmia_and_ldmia() {
        let mut cpu = thumb_cpu();
        cpu.write_register(0, IWRAM + 0x40);
        cpu.write_register(1, 0x11);
        cpu.write_register(2, 0x22);

        // STMIA r0!, {r1, r2}
        dispatch(&mut cpu, 0xC006);
        assert_eq!(cpu.read_register(0), IWRAM + 0x48);
        assert_eq!(cpu.bus.read_word(IWRAM + 0x40), 0x11);
        assert_eq!(cpu.bus.read_word(IWRAM + 0x44), 0x22);

        cpu.write_register(0, IWRAM + 0x40);
        cpu.write_register(1, 0);
        cpu.write_register(2, 0);

        // LDMIA r0!, {r1, r2}
        dispatch(&mut cpu, 0xC806);
        assert_eq!(cpu.read_register(1), 0x11);
        assert_eq!(cpu.read_register(2), 0x22);
        assert_eq!(cpu.read_register(0), IWRAM + 0x48);
    }

    #[test]
    fn stmia_empty_list_stores_pc_plus_six() {
        let mut cpu = cpu_at(IWRAM + 0x200 - 0x100, CpuState::Thumb);
        // keep the executing address away from the store target
        cpu.registers.set_program_counter(IWRAM + 0x700);
        cpu.write_register(0, IWRAM + 0x200);

        // STMIA r0!, {}
        dispatch(&mut cpu, 0xC000);

        assert_eq!(cpu.bus.read_word(IWRAM + 0x200), IWRAM + 0x700 + 6);
        assert_eq!(cpu.read_register(0), IWRAM + 0x240);
    }

    #[test]
    fn conditional_branch_taken_and_not() {
        let mut cpu = cpu_at(IWRAM + 0x100, CpuState::Thumb);
        let mut cpsr = cpu.cpsr();
        cpsr.set_zero_flag(true);
        cpu.set_cpsr(cpsr);

        // BNE +4: not taken
        dispatch(&mut cpu, 0xD102);
        assert_eq!(cpu.registers.program_counter(), IWRAM + 0x100);

        // BEQ +4: taken, target = PC+4 + 4
        dispatch(&mut cpu, 0xD002);
        assert_eq!(cpu.registers.program_counter(), IWRAM + 0x108);
    }

    #[test]
    fn conditional_branch_backward() {
        let mut cpu = cpu_at(IWRAM + 0x100, CpuState::Thumb);
        let mut cpsr = cpu.cpsr();
        cpsr.set_carry_flag(true);
        cpu.set_cpsr(cpsr);

        // BCS -8 (offset 0xFC = -4 halfwords)
        dispatch(&mut cpu, 0xD2FC);
        assert_eq!(cpu.registers.program_counter(), IWRAM + 0x104 - 8);
    }

    #[test]
    fn unconditional_branch() {
        let mut cpu = cpu_at(IWRAM + 0x100, CpuState::Thumb);

        // B +20
        dispatch(&mut cpu, 0xE00A);
        assert_eq!(cpu.registers.program_counter(), IWRAM + 0x104 + 20);
    }

    #[test]
    fn long_branch_with_link_pair() {
        let mut cpu = cpu_at(0x0800_0100, CpuState::Thumb);

        // BL first half, offset 1 -> LR = PC+4 + (1 << 12)
        dispatch(&mut cpu, 0xF001);
        assert_eq!(cpu.read_register(14), 0x0800_0104 + 0x1000);

        // pretend the pipeline advanced to the second halfword
        cpu.registers.set_program_counter(0x0800_0102);

        // BL second half, offset 4 -> target = LR + 8
        dispatch(&mut cpu, 0xF804);

        assert_eq!(cpu.registers.program_counter(), 0x0800_110C);
        // return address points past the pair, bit 0 set
        assert_eq!(cpu.read_register(14), 0x0800_0105);
    }

    #[test]
    fn thumb_swi_vector() {
        let mut cpu = cpu_at(IWRAM, CpuState::Thumb);

        dispatch(&mut cpu, 0xDF05);

        assert_eq!(cpu.cpsr().mode(), Mode::Supervisor);
        assert_eq!(cpu.cpu_state(), CpuState::Arm);
        assert_eq!(cpu.registers.program_counter(), 0x08);
        assert_eq!(cpu.registers.register_at(Mode::Supervisor, 14), IWRAM + 2);
    }

    #[test]
    fn unallocated_condition_is_undefined() {
        let mut cpu = cpu_at(IWRAM, CpuState::Thumb);

        // format 16 with cond = 1110
        dispatch(&mut cpu, 0xDE00);
        assert_eq!(cpu.cpsr().mode(), Mode::Undefined);
    }
}
