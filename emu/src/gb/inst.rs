//! The SM83 instruction set: a 256-entry table of function pointers plus the
//! 256-entry CB-prefix table of rotate/shift/bit operations.
//!
//! Each entry carries its handler, the base T-cycle cost and a mnemonic.
//! Conditional branches are tabled at their untaken cost and add the extra
//! cycles themselves when taken. The CB table's costs include the prefix
//! fetch, so the dispatcher adds nothing on top.

use super::cpu::Sm83;

/// The opcode that introduces the extended (CB) table.
pub const PREFIX: u8 = 0xCB;

pub type OpHandler = fn(&mut Sm83);
pub type Instruction = (OpHandler, u8, &'static str);

// ---------------------------------------------------------------------------
// arithmetic helpers
// ---------------------------------------------------------------------------

fn add_a(cpu: &mut Sm83, value: u8) {
    let a = cpu.a;
    let result = a.wrapping_add(value);

    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry((a & 0x0F) + (value & 0x0F) > 0x0F);
    cpu.set_carry(u16::from(a) + u16::from(value) > 0xFF);
    cpu.a = result;
}

fn adc_a(cpu: &mut Sm83, value: u8) {
    let a = cpu.a;
    let carry = u8::from(cpu.carry());
    let result = a.wrapping_add(value).wrapping_add(carry);

    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry((a & 0x0F) + (value & 0x0F) + carry > 0x0F);
    cpu.set_carry(u16::from(a) + u16::from(value) + u16::from(carry) > 0xFF);
    cpu.a = result;
}

fn sub_a(cpu: &mut Sm83, value: u8) {
    let a = cpu.a;
    let result = a.wrapping_sub(value);

    cpu.set_zero(result == 0);
    cpu.set_sub(true);
    cpu.set_half_carry(a & 0x0F < value & 0x0F);
    cpu.set_carry(a < value);
    cpu.a = result;
}

fn sbc_a(cpu: &mut Sm83, value: u8) {
    let a = cpu.a;
    let carry = u8::from(cpu.carry());
    let result = a.wrapping_sub(value).wrapping_sub(carry);

    cpu.set_zero(result == 0);
    cpu.set_sub(true);
    cpu.set_half_carry(a & 0x0F < (value & 0x0F) + carry);
    cpu.set_carry(u16::from(a) < u16::from(value) + u16::from(carry));
    cpu.a = result;
}

fn and_a(cpu: &mut Sm83, value: u8) {
    cpu.a &= value;
    let zero = cpu.a == 0;
    cpu.set_zero(zero);
    cpu.set_sub(false);
    cpu.set_half_carry(true);
    cpu.set_carry(false);
}

fn xor_a(cpu: &mut Sm83, value: u8) {
    cpu.a ^= value;
    let zero = cpu.a == 0;
    cpu.set_zero(zero);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(false);
}

fn or_a(cpu: &mut Sm83, value: u8) {
    cpu.a |= value;
    let zero = cpu.a == 0;
    cpu.set_zero(zero);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(false);
}

fn cp_a(cpu: &mut Sm83, value: u8) {
    let a = cpu.a;
    cpu.set_zero(a == value);
    cpu.set_sub(true);
    cpu.set_half_carry(a & 0x0F < value & 0x0F);
    cpu.set_carry(a < value);
}

fn inc_u8(cpu: &mut Sm83, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(value & 0x0F == 0x0F);
    result
}

fn dec_u8(cpu: &mut Sm83, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    cpu.set_zero(result == 0);
    cpu.set_sub(true);
    cpu.set_half_carry(value & 0x0F == 0x00);
    result
}

fn add_hl(cpu: &mut Sm83, value: u16) {
    let hl = cpu.hl();
    cpu.set_sub(false);
    cpu.set_half_carry((hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
    cpu.set_carry(u32::from(hl) + u32::from(value) > 0xFFFF);
    cpu.set_hl(hl.wrapping_add(value));
}

/// SP + signed immediate, shared by ADD SP and LD HL, SP+i8. The flags come
/// from unsigned byte arithmetic on the low byte.
fn sp_plus_i8(cpu: &mut Sm83) -> u16 {
    let offset = cpu.read_u8();
    let sp = cpu.sp;

    cpu.set_zero(false);
    cpu.set_sub(false);
    cpu.set_half_carry((sp & 0x0F) + u16::from(offset & 0x0F) > 0x0F);
    cpu.set_carry((sp & 0xFF) + u16::from(offset) > 0xFF);

    sp.wrapping_add(offset as i8 as i16 as u16)
}

// rotate/shift helpers, shared between the A-register forms and the CB grid

fn rlc_value(cpu: &mut Sm83, value: u8) -> u8 {
    let result = value.rotate_left(1);
    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(value & 0x80 != 0);
    result
}

fn rrc_value(cpu: &mut Sm83, value: u8) -> u8 {
    let result = value.rotate_right(1);
    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(value & 0x01 != 0);
    result
}

fn rl_value(cpu: &mut Sm83, value: u8) -> u8 {
    let result = (value << 1) | u8::from(cpu.carry());
    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(value & 0x80 != 0);
    result
}

fn rr_value(cpu: &mut Sm83, value: u8) -> u8 {
    let result = (value >> 1) | (u8::from(cpu.carry()) << 7);
    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(value & 0x01 != 0);
    result
}

fn sla_value(cpu: &mut Sm83, value: u8) -> u8 {
    let result = value << 1;
    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(value & 0x80 != 0);
    result
}

fn sra_value(cpu: &mut Sm83, value: u8) -> u8 {
    let result = (value >> 1) | (value & 0x80);
    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(value & 0x01 != 0);
    result
}

fn swap_value(cpu: &mut Sm83, value: u8) -> u8 {
    let result = value.rotate_left(4);
    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(false);
    result
}

fn srl_value(cpu: &mut Sm83, value: u8) -> u8 {
    let result = value >> 1;
    cpu.set_zero(result == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(value & 0x01 != 0);
    result
}

fn bit_test(cpu: &mut Sm83, bit: u8, value: u8) {
    cpu.set_zero(value & (1 << bit) == 0);
    cpu.set_sub(false);
    cpu.set_half_carry(true);
}

// control-flow helpers

fn jr_conditional(cpu: &mut Sm83, taken: bool) {
    let offset = cpu.read_u8() as i8;
    if taken {
        cpu.pc = cpu.pc.wrapping_add(offset as i16 as u16);
        cpu.cycles += 4;
    }
}

fn jp_conditional(cpu: &mut Sm83, taken: bool) {
    let target = cpu.read_u16();
    if taken {
        cpu.pc = target;
        cpu.cycles += 4;
    }
}

fn call_conditional(cpu: &mut Sm83, taken: bool) {
    let target = cpu.read_u16();
    if taken {
        let pc = cpu.pc;
        cpu.push_word(pc);
        cpu.pc = target;
        cpu.cycles += 12;
    }
}

fn ret_conditional(cpu: &mut Sm83, taken: bool) {
    if taken {
        cpu.pc = cpu.pop_word();
        cpu.cycles += 12;
    }
}

fn rst(cpu: &mut Sm83, vector: u16) {
    let pc = cpu.pc;
    cpu.push_word(pc);
    cpu.pc = vector;
}

// ---------------------------------------------------------------------------
// handler generators
// ---------------------------------------------------------------------------

macro_rules! ld_r_r {
    ($($name:ident: $dst:ident, $src:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { cpu.$dst = cpu.$src; })+
    };
}

macro_rules! ld_r_mhl {
    ($($name:ident: $dst:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { cpu.$dst = cpu.read_hl(); })+
    };
}

macro_rules! ld_mhl_r {
    ($($name:ident: $src:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { let value = cpu.$src; cpu.write_hl(value); })+
    };
}

macro_rules! ld_r_u8 {
    ($($name:ident: $dst:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { cpu.$dst = cpu.read_u8(); })+
    };
}

macro_rules! inc_dec_r {
    ($($name:ident: $helper:ident, $reg:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { let value = cpu.$reg; cpu.$reg = $helper(cpu, value); })+
    };
}

macro_rules! inc_dec_16 {
    ($($name:ident: $get:ident, $set:ident, $delta:expr;)+) => {
        $(fn $name(cpu: &mut Sm83) {
            let value = cpu.$get().wrapping_add_signed($delta);
            cpu.$set(value);
        })+
    };
}

macro_rules! alu_r {
    ($($name:ident: $helper:ident, $src:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { let value = cpu.$src; $helper(cpu, value); })+
    };
}

macro_rules! alu_mhl {
    ($($name:ident: $helper:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { let value = cpu.read_hl(); $helper(cpu, value); })+
    };
}

macro_rules! alu_u8 {
    ($($name:ident: $helper:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { let value = cpu.read_u8(); $helper(cpu, value); })+
    };
}

// 0x40-0x7F: the LD register grid
ld_r_r! {
    ld_b_b: b, b; ld_b_c: b, c; ld_b_d: b, d; ld_b_e: b, e;
    ld_b_h: b, h; ld_b_l: b, l; ld_b_a: b, a;
    ld_c_b: c, b; ld_c_c: c, c; ld_c_d: c, d; ld_c_e: c, e;
    ld_c_h: c, h; ld_c_l: c, l; ld_c_a: c, a;
    ld_d_b: d, b; ld_d_c: d, c; ld_d_d: d, d; ld_d_e: d, e;
    ld_d_h: d, h; ld_d_l: d, l; ld_d_a: d, a;
    ld_e_b: e, b; ld_e_c: e, c; ld_e_d: e, d; ld_e_e: e, e;
    ld_e_h: e, h; ld_e_l: e, l; ld_e_a: e, a;
    ld_h_b: h, b; ld_h_c: h, c; ld_h_d: h, d; ld_h_e: h, e;
    ld_h_h: h, h; ld_h_l: h, l; ld_h_a: h, a;
    ld_l_b: l, b; ld_l_c: l, c; ld_l_d: l, d; ld_l_e: l, e;
    ld_l_h: l, h; ld_l_l: l, l; ld_l_a: l, a;
    ld_a_b: a, b; ld_a_c: a, c; ld_a_d: a, d; ld_a_e: a, e;
    ld_a_h: a, h; ld_a_l: a, l; ld_a_a: a, a;
}

ld_r_mhl! {
    ld_b_mhl: b; ld_c_mhl: c; ld_d_mhl: d; ld_e_mhl: e;
    ld_h_mhl: h; ld_l_mhl: l; ld_a_mhl: a;
}

ld_mhl_r! {
    ld_mhl_b: b; ld_mhl_c: c; ld_mhl_d: d; ld_mhl_e: e;
    ld_mhl_h: h; ld_mhl_l: l; ld_mhl_a: a;
}

ld_r_u8! {
    ld_b_u8: b; ld_c_u8: c; ld_d_u8: d; ld_e_u8: e;
    ld_h_u8: h; ld_l_u8: l; ld_a_u8: a;
}

inc_dec_r! {
    inc_b: inc_u8, b; inc_c: inc_u8, c; inc_d: inc_u8, d; inc_e: inc_u8, e;
    inc_h: inc_u8, h; inc_l: inc_u8, l; inc_a: inc_u8, a;
    dec_b: dec_u8, b; dec_c: dec_u8, c; dec_d: dec_u8, d; dec_e: dec_u8, e;
    dec_h: dec_u8, h; dec_l: dec_u8, l; dec_a: dec_u8, a;
}

inc_dec_16! {
    inc_bc: bc, set_bc, 1; inc_de: de, set_de, 1; inc_hl: hl, set_hl, 1;
    dec_bc: bc, set_bc, -1; dec_de: de, set_de, -1; dec_hl: hl, set_hl, -1;
}

// 0x80-0xBF: the ALU grid
alu_r! {
    add_a_b: add_a, b; add_a_c: add_a, c; add_a_d: add_a, d; add_a_e: add_a, e;
    add_a_h: add_a, h; add_a_l: add_a, l; add_a_a: add_a, a;
    adc_a_b: adc_a, b; adc_a_c: adc_a, c; adc_a_d: adc_a, d; adc_a_e: adc_a, e;
    adc_a_h: adc_a, h; adc_a_l: adc_a, l; adc_a_a: adc_a, a;
    sub_a_b: sub_a, b; sub_a_c: sub_a, c; sub_a_d: sub_a, d; sub_a_e: sub_a, e;
    sub_a_h: sub_a, h; sub_a_l: sub_a, l; sub_a_a: sub_a, a;
    sbc_a_b: sbc_a, b; sbc_a_c: sbc_a, c; sbc_a_d: sbc_a, d; sbc_a_e: sbc_a, e;
    sbc_a_h: sbc_a, h; sbc_a_l: sbc_a, l; sbc_a_a: sbc_a, a;
    and_a_b: and_a, b; and_a_c: and_a, c; and_a_d: and_a, d; and_a_e: and_a, e;
    and_a_h: and_a, h; and_a_l: and_a, l; and_a_a: and_a, a;
    xor_a_b: xor_a, b; xor_a_c: xor_a, c; xor_a_d: xor_a, d; xor_a_e: xor_a, e;
    xor_a_h: xor_a, h; xor_a_l: xor_a, l; xor_a_a: xor_a, a;
    or_a_b: or_a, b; or_a_c: or_a, c; or_a_d: or_a, d; or_a_e: or_a, e;
    or_a_h: or_a, h; or_a_l: or_a, l; or_a_a: or_a, a;
    cp_a_b: cp_a, b; cp_a_c: cp_a, c; cp_a_d: cp_a, d; cp_a_e: cp_a, e;
    cp_a_h: cp_a, h; cp_a_l: cp_a, l; cp_a_a: cp_a, a;
}

alu_mhl! {
    add_a_mhl: add_a; adc_a_mhl: adc_a; sub_a_mhl: sub_a; sbc_a_mhl: sbc_a;
    and_a_mhl: and_a; xor_a_mhl: xor_a; or_a_mhl: or_a; cp_a_mhl: cp_a;
}

alu_u8! {
    add_a_u8: add_a; adc_a_u8: adc_a; sub_a_u8: sub_a; sbc_a_u8: sbc_a;
    and_a_u8: and_a; xor_a_u8: xor_a; or_a_u8: or_a; cp_a_u8: cp_a;
}

// ---------------------------------------------------------------------------
// irregular handlers
// ---------------------------------------------------------------------------

fn nop(_cpu: &mut Sm83) {}

fn illegal(cpu: &mut Sm83) {
    logger::log(format!(
        "illegal opcode executed at 0x{:04X}",
        cpu.pc.wrapping_sub(1)
    ));
}

/// Entry 0xCB is never dispatched through the table; the clock routine
/// resolves the second byte against [`EXTENDED`] itself.
fn prefix_stub(_cpu: &mut Sm83) {}

fn stop(cpu: &mut Sm83) {
    // STOP is a two-byte instruction; skip the pad byte
    let _ = cpu.read_u8();
    cpu.stopped = true;
}

fn halt(cpu: &mut Sm83) {
    cpu.halted = true;
}

fn di(cpu: &mut Sm83) {
    cpu.disable_ime();
}

fn ei(cpu: &mut Sm83) {
    cpu.enable_ime_delayed();
}

fn ld_bc_u16(cpu: &mut Sm83) {
    let value = cpu.read_u16();
    cpu.set_bc(value);
}

fn ld_de_u16(cpu: &mut Sm83) {
    let value = cpu.read_u16();
    cpu.set_de(value);
}

fn ld_hl_u16(cpu: &mut Sm83) {
    let value = cpu.read_u16();
    cpu.set_hl(value);
}

fn ld_sp_u16(cpu: &mut Sm83) {
    cpu.sp = cpu.read_u16();
}

fn ld_mbc_a(cpu: &mut Sm83) {
    cpu.bus.write(cpu.bc(), cpu.a);
}

fn ld_mde_a(cpu: &mut Sm83) {
    cpu.bus.write(cpu.de(), cpu.a);
}

fn ld_a_mbc(cpu: &mut Sm83) {
    cpu.a = cpu.bus.read(cpu.bc());
}

fn ld_a_mde(cpu: &mut Sm83) {
    cpu.a = cpu.bus.read(cpu.de());
}

fn ld_mhli_a(cpu: &mut Sm83) {
    let value = cpu.a;
    cpu.write_hl(value);
    let hl = cpu.hl().wrapping_add(1);
    cpu.set_hl(hl);
}

fn ld_mhld_a(cpu: &mut Sm83) {
    let value = cpu.a;
    cpu.write_hl(value);
    let hl = cpu.hl().wrapping_sub(1);
    cpu.set_hl(hl);
}

fn ld_a_mhli(cpu: &mut Sm83) {
    cpu.a = cpu.read_hl();
    let hl = cpu.hl().wrapping_add(1);
    cpu.set_hl(hl);
}

fn ld_a_mhld(cpu: &mut Sm83) {
    cpu.a = cpu.read_hl();
    let hl = cpu.hl().wrapping_sub(1);
    cpu.set_hl(hl);
}

fn ld_mu16_sp(cpu: &mut Sm83) {
    let address = cpu.read_u16();
    cpu.bus.write(address, cpu.sp as u8);
    cpu.bus.write(address.wrapping_add(1), (cpu.sp >> 8) as u8);
}

fn ld_mu16_a(cpu: &mut Sm83) {
    let address = cpu.read_u16();
    cpu.bus.write(address, cpu.a);
}

fn ld_a_mu16(cpu: &mut Sm83) {
    let address = cpu.read_u16();
    cpu.a = cpu.bus.read(address);
}

fn ldh_mu8_a(cpu: &mut Sm83) {
    let offset = cpu.read_u8();
    cpu.bus.write(0xFF00 | u16::from(offset), cpu.a);
}

fn ldh_a_mu8(cpu: &mut Sm83) {
    let offset = cpu.read_u8();
    cpu.a = cpu.bus.read(0xFF00 | u16::from(offset));
}

fn ld_mc_a(cpu: &mut Sm83) {
    cpu.bus.write(0xFF00 | u16::from(cpu.c), cpu.a);
}

fn ld_a_mc(cpu: &mut Sm83) {
    cpu.a = cpu.bus.read(0xFF00 | u16::from(cpu.c));
}

fn ld_mhl_u8(cpu: &mut Sm83) {
    let value = cpu.read_u8();
    cpu.write_hl(value);
}

fn inc_sp(cpu: &mut Sm83) {
    cpu.sp = cpu.sp.wrapping_add(1);
}

fn dec_sp(cpu: &mut Sm83) {
    cpu.sp = cpu.sp.wrapping_sub(1);
}

fn inc_mhl(cpu: &mut Sm83) {
    let value = cpu.read_hl();
    let value = inc_u8(cpu, value);
    cpu.write_hl(value);
}

fn dec_mhl(cpu: &mut Sm83) {
    let value = cpu.read_hl();
    let value = dec_u8(cpu, value);
    cpu.write_hl(value);
}

fn add_hl_bc(cpu: &mut Sm83) {
    let value = cpu.bc();
    add_hl(cpu, value);
}

fn add_hl_de(cpu: &mut Sm83) {
    let value = cpu.de();
    add_hl(cpu, value);
}

fn add_hl_hl(cpu: &mut Sm83) {
    let value = cpu.hl();
    add_hl(cpu, value);
}

fn add_hl_sp(cpu: &mut Sm83) {
    let value = cpu.sp;
    add_hl(cpu, value);
}

fn add_sp_i8(cpu: &mut Sm83) {
    cpu.sp = sp_plus_i8(cpu);
}

fn ld_hl_sp_i8(cpu: &mut Sm83) {
    let value = sp_plus_i8(cpu);
    cpu.set_hl(value);
}

fn ld_sp_hl(cpu: &mut Sm83) {
    cpu.sp = cpu.hl();
}

// the A-register rotates clear Z unconditionally

fn rlca(cpu: &mut Sm83) {
    let value = cpu.a;
    cpu.a = rlc_value(cpu, value);
    cpu.set_zero(false);
}

fn rrca(cpu: &mut Sm83) {
    let value = cpu.a;
    cpu.a = rrc_value(cpu, value);
    cpu.set_zero(false);
}

fn rla(cpu: &mut Sm83) {
    let value = cpu.a;
    cpu.a = rl_value(cpu, value);
    cpu.set_zero(false);
}

fn rra(cpu: &mut Sm83) {
    let value = cpu.a;
    cpu.a = rr_value(cpu, value);
    cpu.set_zero(false);
}

/// Decimal-adjusts A after a BCD addition or subtraction, driven by the
/// N/H/C flags the arithmetic left behind.
fn daa(cpu: &mut Sm83) {
    let mut a = cpu.a;
    let mut carry = cpu.carry();

    if cpu.sub() {
        if cpu.carry() {
            a = a.wrapping_sub(0x60);
        }
        if cpu.half_carry() {
            a = a.wrapping_sub(0x06);
        }
    } else {
        if cpu.carry() || a > 0x99 {
            a = a.wrapping_add(0x60);
            carry = true;
        }
        if cpu.half_carry() || a & 0x0F > 0x09 {
            a = a.wrapping_add(0x06);
        }
    }

    cpu.a = a;
    cpu.set_zero(a == 0);
    cpu.set_half_carry(false);
    cpu.set_carry(carry);
}

fn cpl(cpu: &mut Sm83) {
    cpu.a = !cpu.a;
    cpu.set_sub(true);
    cpu.set_half_carry(true);
}

fn scf(cpu: &mut Sm83) {
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(true);
}

fn ccf(cpu: &mut Sm83) {
    let carry = cpu.carry();
    cpu.set_sub(false);
    cpu.set_half_carry(false);
    cpu.set_carry(!carry);
}

fn jr_i8(cpu: &mut Sm83) {
    jr_conditional(cpu, true);
    cpu.cycles -= 4; // unconditional cost is already in the table
}

fn jr_nz_i8(cpu: &mut Sm83) {
    let taken = !cpu.zero();
    jr_conditional(cpu, taken);
}

fn jr_z_i8(cpu: &mut Sm83) {
    let taken = cpu.zero();
    jr_conditional(cpu, taken);
}

fn jr_nc_i8(cpu: &mut Sm83) {
    let taken = !cpu.carry();
    jr_conditional(cpu, taken);
}

fn jr_c_i8(cpu: &mut Sm83) {
    let taken = cpu.carry();
    jr_conditional(cpu, taken);
}

fn jp_u16(cpu: &mut Sm83) {
    cpu.pc = cpu.read_u16();
}

fn jp_hl(cpu: &mut Sm83) {
    cpu.pc = cpu.hl();
}

fn jp_nz_u16(cpu: &mut Sm83) {
    let taken = !cpu.zero();
    jp_conditional(cpu, taken);
}

fn jp_z_u16(cpu: &mut Sm83) {
    let taken = cpu.zero();
    jp_conditional(cpu, taken);
}

fn jp_nc_u16(cpu: &mut Sm83) {
    let taken = !cpu.carry();
    jp_conditional(cpu, taken);
}

fn jp_c_u16(cpu: &mut Sm83) {
    let taken = cpu.carry();
    jp_conditional(cpu, taken);
}

fn call_u16(cpu: &mut Sm83) {
    let target = cpu.read_u16();
    let pc = cpu.pc;
    cpu.push_word(pc);
    cpu.pc = target;
}

fn call_nz_u16(cpu: &mut Sm83) {
    let taken = !cpu.zero();
    call_conditional(cpu, taken);
}

fn call_z_u16(cpu: &mut Sm83) {
    let taken = cpu.zero();
    call_conditional(cpu, taken);
}

fn call_nc_u16(cpu: &mut Sm83) {
    let taken = !cpu.carry();
    call_conditional(cpu, taken);
}

fn call_c_u16(cpu: &mut Sm83) {
    let taken = cpu.carry();
    call_conditional(cpu, taken);
}

fn ret(cpu: &mut Sm83) {
    cpu.pc = cpu.pop_word();
}

fn reti(cpu: &mut Sm83) {
    cpu.pc = cpu.pop_word();
    cpu.enable_ime();
}

fn ret_nz(cpu: &mut Sm83) {
    let taken = !cpu.zero();
    ret_conditional(cpu, taken);
}

fn ret_z(cpu: &mut Sm83) {
    let taken = cpu.zero();
    ret_conditional(cpu, taken);
}

fn ret_nc(cpu: &mut Sm83) {
    let taken = !cpu.carry();
    ret_conditional(cpu, taken);
}

fn ret_c(cpu: &mut Sm83) {
    let taken = cpu.carry();
    ret_conditional(cpu, taken);
}

fn rst_00(cpu: &mut Sm83) {
    rst(cpu, 0x00);
}

fn rst_08(cpu: &mut Sm83) {
    rst(cpu, 0x08);
}

fn rst_10(cpu: &mut Sm83) {
    rst(cpu, 0x10);
}

fn rst_18(cpu: &mut Sm83) {
    rst(cpu, 0x18);
}

fn rst_20(cpu: &mut Sm83) {
    rst(cpu, 0x20);
}

fn rst_28(cpu: &mut Sm83) {
    rst(cpu, 0x28);
}

fn rst_30(cpu: &mut Sm83) {
    rst(cpu, 0x30);
}

fn rst_38(cpu: &mut Sm83) {
    rst(cpu, 0x38);
}

fn push_bc(cpu: &mut Sm83) {
    let value = cpu.bc();
    cpu.push_word(value);
}

fn push_de(cpu: &mut Sm83) {
    let value = cpu.de();
    cpu.push_word(value);
}

fn push_hl(cpu: &mut Sm83) {
    let value = cpu.hl();
    cpu.push_word(value);
}

fn push_af(cpu: &mut Sm83) {
    let value = cpu.af();
    cpu.push_word(value);
}

fn pop_bc(cpu: &mut Sm83) {
    let value = cpu.pop_word();
    cpu.set_bc(value);
}

fn pop_de(cpu: &mut Sm83) {
    let value = cpu.pop_word();
    cpu.set_de(value);
}

fn pop_hl(cpu: &mut Sm83) {
    let value = cpu.pop_word();
    cpu.set_hl(value);
}

fn pop_af(cpu: &mut Sm83) {
    let value = cpu.pop_word();
    cpu.set_af(value);
}

// ---------------------------------------------------------------------------
// the CB grid
// ---------------------------------------------------------------------------

macro_rules! cb_r {
    ($($name:ident: $op:ident, $reg:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { let value = cpu.$reg; cpu.$reg = $op(cpu, value); })+
    };
}

macro_rules! cb_mhl {
    ($($name:ident: $op:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) {
            let value = cpu.read_hl();
            let value = $op(cpu, value);
            cpu.write_hl(value);
        })+
    };
}

macro_rules! bit_r {
    ($($name:ident: $bit:expr, $reg:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { let value = cpu.$reg; bit_test(cpu, $bit, value); })+
    };
}

macro_rules! bit_mhl {
    ($($name:ident: $bit:expr;)+) => {
        $(fn $name(cpu: &mut Sm83) { let value = cpu.read_hl(); bit_test(cpu, $bit, value); })+
    };
}

macro_rules! res_r {
    ($($name:ident: $bit:expr, $reg:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { cpu.$reg &= !(1 << $bit); })+
    };
}

macro_rules! res_mhl {
    ($($name:ident: $bit:expr;)+) => {
        $(fn $name(cpu: &mut Sm83) {
            let value = cpu.read_hl() & !(1 << $bit);
            cpu.write_hl(value);
        })+
    };
}

macro_rules! set_r {
    ($($name:ident: $bit:expr, $reg:ident;)+) => {
        $(fn $name(cpu: &mut Sm83) { cpu.$reg |= 1 << $bit; })+
    };
}

macro_rules! set_mhl {
    ($($name:ident: $bit:expr;)+) => {
        $(fn $name(cpu: &mut Sm83) {
            let value = cpu.read_hl() | (1 << $bit);
            cpu.write_hl(value);
        })+
    };
}

cb_r! {
    rlc_b: rlc_value, b; rlc_c: rlc_value, c; rlc_d: rlc_value, d; rlc_e: rlc_value, e;
    rlc_h: rlc_value, h; rlc_l: rlc_value, l; rlc_a: rlc_value, a;
    rrc_b: rrc_value, b; rrc_c: rrc_value, c; rrc_d: rrc_value, d; rrc_e: rrc_value, e;
    rrc_h: rrc_value, h; rrc_l: rrc_value, l; rrc_a: rrc_value, a;
    rl_b: rl_value, b; rl_c: rl_value, c; rl_d: rl_value, d; rl_e: rl_value, e;
    rl_h: rl_value, h; rl_l: rl_value, l; rl_a: rl_value, a;
    rr_b: rr_value, b; rr_c: rr_value, c; rr_d: rr_value, d; rr_e: rr_value, e;
    rr_h: rr_value, h; rr_l: rr_value, l; rr_a: rr_value, a;
    sla_b: sla_value, b; sla_c: sla_value, c; sla_d: sla_value, d; sla_e: sla_value, e;
    sla_h: sla_value, h; sla_l: sla_value, l; sla_a: sla_value, a;
    sra_b: sra_value, b; sra_c: sra_value, c; sra_d: sra_value, d; sra_e: sra_value, e;
    sra_h: sra_value, h; sra_l: sra_value, l; sra_a: sra_value, a;
    swap_b: swap_value, b; swap_c: swap_value, c; swap_d: swap_value, d; swap_e: swap_value, e;
    swap_h: swap_value, h; swap_l: swap_value, l; swap_a: swap_value, a;
    srl_b: srl_value, b; srl_c: srl_value, c; srl_d: srl_value, d; srl_e: srl_value, e;
    srl_h: srl_value, h; srl_l: srl_value, l; srl_a: srl_value, a;
}

cb_mhl! {
    rlc_mhl: rlc_value; rrc_mhl: rrc_value; rl_mhl: rl_value; rr_mhl: rr_value;
    sla_mhl: sla_value; sra_mhl: sra_value; swap_mhl: swap_value; srl_mhl: srl_value;
}

bit_r! {
    bit_0_b: 0, b; bit_0_c: 0, c; bit_0_d: 0, d; bit_0_e: 0, e;
    bit_0_h: 0, h; bit_0_l: 0, l; bit_0_a: 0, a;
    bit_1_b: 1, b; bit_1_c: 1, c; bit_1_d: 1, d; bit_1_e: 1, e;
    bit_1_h: 1, h; bit_1_l: 1, l; bit_1_a: 1, a;
    bit_2_b: 2, b; bit_2_c: 2, c; bit_2_d: 2, d; bit_2_e: 2, e;
    bit_2_h: 2, h; bit_2_l: 2, l; bit_2_a: 2, a;
    bit_3_b: 3, b; bit_3_c: 3, c; bit_3_d: 3, d; bit_3_e: 3, e;
    bit_3_h: 3, h; bit_3_l: 3, l; bit_3_a: 3, a;
    bit_4_b: 4, b; bit_4_c: 4, c; bit_4_d: 4, d; bit_4_e: 4, e;
    bit_4_h: 4, h; bit_4_l: 4, l; bit_4_a: 4, a;
    bit_5_b: 5, b; bit_5_c: 5, c; bit_5_d: 5, d; bit_5_e: 5, e;
    bit_5_h: 5, h; bit_5_l: 5, l; bit_5_a: 5, a;
    bit_6_b: 6, b; bit_6_c: 6, c; bit_6_d: 6, d; bit_6_e: 6, e;
    bit_6_h: 6, h; bit_6_l: 6, l; bit_6_a: 6, a;
    bit_7_b: 7, b; bit_7_c: 7, c; bit_7_d: 7, d; bit_7_e: 7, e;
    bit_7_h: 7, h; bit_7_l: 7, l; bit_7_a: 7, a;
}

bit_mhl! {
    bit_0_mhl: 0; bit_1_mhl: 1; bit_2_mhl: 2; bit_3_mhl: 3;
    bit_4_mhl: 4; bit_5_mhl: 5; bit_6_mhl: 6; bit_7_mhl: 7;
}

res_r! {
    res_0_b: 0, b; res_0_c: 0, c; res_0_d: 0, d; res_0_e: 0, e;
    res_0_h: 0, h; res_0_l: 0, l; res_0_a: 0, a;
    res_1_b: 1, b; res_1_c: 1, c; res_1_d: 1, d; res_1_e: 1, e;
    res_1_h: 1, h; res_1_l: 1, l; res_1_a: 1, a;
    res_2_b: 2, b; res_2_c: 2, c; res_2_d: 2, d; res_2_e: 2, e;
    res_2_h: 2, h; res_2_l: 2, l; res_2_a: 2, a;
    res_3_b: 3, b; res_3_c: 3, c; res_3_d: 3, d; res_3_e: 3, e;
    res_3_h: 3, h; res_3_l: 3, l; res_3_a: 3, a;
    res_4_b: 4, b; res_4_c: 4, c; res_4_d: 4, d; res_4_e: 4, e;
    res_4_h: 4, h; res_4_l: 4, l; res_4_a: 4, a;
    res_5_b: 5, b; res_5_c: 5, c; res_5_d: 5, d; res_5_e: 5, e;
    res_5_h: 5, h; res_5_l: 5, l; res_5_a: 5, a;
    res_6_b: 6, b; res_6_c: 6, c; res_6_d: 6, d; res_6_e: 6, e;
    res_6_h: 6, h; res_6_l: 6, l; res_6_a: 6, a;
    res_7_b: 7, b; res_7_c: 7, c; res_7_d: 7, d; res_7_e: 7, e;
    res_7_h: 7, h; res_7_l: 7, l; res_7_a: 7, a;
}

res_mhl! {
    res_0_mhl: 0; res_1_mhl: 1; res_2_mhl: 2; res_3_mhl: 3;
    res_4_mhl: 4; res_5_mhl: 5; res_6_mhl: 6; res_7_mhl: 7;
}

set_r! {
    set_0_b: 0, b; set_0_c: 0, c; set_0_d: 0, d; set_0_e: 0, e;
    set_0_h: 0, h; set_0_l: 0, l; set_0_a: 0, a;
    set_1_b: 1, b; set_1_c: 1, c; set_1_d: 1, d; set_1_e: 1, e;
    set_1_h: 1, h; set_1_l: 1, l; set_1_a: 1, a;
    set_2_b: 2, b; set_2_c: 2, c; set_2_d: 2, d; set_2_e: 2, e;
    set_2_h: 2, h; set_2_l: 2, l; set_2_a: 2, a;
    set_3_b: 3, b; set_3_c: 3, c; set_3_d: 3, d; set_3_e: 3, e;
    set_3_h: 3, h; set_3_l: 3, l; set_3_a: 3, a;
    set_4_b: 4, b; set_4_c: 4, c; set_4_d: 4, d; set_4_e: 4, e;
    set_4_h: 4, h; set_4_l: 4, l; set_4_a: 4, a;
    set_5_b: 5, b; set_5_c: 5, c; set_5_d: 5, d; set_5_e: 5, e;
    set_5_h: 5, h; set_5_l: 5, l; set_5_a: 5, a;
    set_6_b: 6, b; set_6_c: 6, c; set_6_d: 6, d; set_6_e: 6, e;
    set_6_h: 6, h; set_6_l: 6, l; set_6_a: 6, a;
    set_7_b: 7, b; set_7_c: 7, c; set_7_d: 7, d; set_7_e: 7, e;
    set_7_h: 7, h; set_7_l: 7, l; set_7_a: 7, a;
}

set_mhl! {
    set_0_mhl: 0; set_1_mhl: 1; set_2_mhl: 2; set_3_mhl: 3;
    set_4_mhl: 4; set_5_mhl: 5; set_6_mhl: 6; set_7_mhl: 7;
}

// ---------------------------------------------------------------------------
// the tables
// ---------------------------------------------------------------------------

pub const INSTRUCTIONS: [Instruction; 256] = [
    // 0x0 opcodes
    (nop, 4, "NOP"),
    (ld_bc_u16, 12, "LD BC, u16"),
    (ld_mbc_a, 8, "LD [BC], A"),
    (inc_bc, 8, "INC BC"),
    (inc_b, 4, "INC B"),
    (dec_b, 4, "DEC B"),
    (ld_b_u8, 8, "LD B, u8"),
    (rlca, 4, "RLCA"),
    (ld_mu16_sp, 20, "LD [u16], SP"),
    (add_hl_bc, 8, "ADD HL, BC"),
    (ld_a_mbc, 8, "LD A, [BC]"),
    (dec_bc, 8, "DEC BC"),
    (inc_c, 4, "INC C"),
    (dec_c, 4, "DEC C"),
    (ld_c_u8, 8, "LD C, u8"),
    (rrca, 4, "RRCA"),
    // 0x1 opcodes
    (stop, 4, "STOP"),
    (ld_de_u16, 12, "LD DE, u16"),
    (ld_mde_a, 8, "LD [DE], A"),
    (inc_de, 8, "INC DE"),
    (inc_d, 4, "INC D"),
    (dec_d, 4, "DEC D"),
    (ld_d_u8, 8, "LD D, u8"),
    (rla, 4, "RLA"),
    (jr_i8, 12, "JR i8"),
    (add_hl_de, 8, "ADD HL, DE"),
    (ld_a_mde, 8, "LD A, [DE]"),
    (dec_de, 8, "DEC DE"),
    (inc_e, 4, "INC E"),
    (dec_e, 4, "DEC E"),
    (ld_e_u8, 8, "LD E, u8"),
    (rra, 4, "RRA"),
    // 0x2 opcodes
    (jr_nz_i8, 8, "JR NZ, i8"),
    (ld_hl_u16, 12, "LD HL, u16"),
    (ld_mhli_a, 8, "LD [HL+], A"),
    (inc_hl, 8, "INC HL"),
    (inc_h, 4, "INC H"),
    (dec_h, 4, "DEC H"),
    (ld_h_u8, 8, "LD H, u8"),
    (daa, 4, "DAA"),
    (jr_z_i8, 8, "JR Z, i8"),
    (add_hl_hl, 8, "ADD HL, HL"),
    (ld_a_mhli, 8, "LD A, [HL+]"),
    (dec_hl, 8, "DEC HL"),
    (inc_l, 4, "INC L"),
    (dec_l, 4, "DEC L"),
    (ld_l_u8, 8, "LD L, u8"),
    (cpl, 4, "CPL"),
    // 0x3 opcodes
    (jr_nc_i8, 8, "JR NC, i8"),
    (ld_sp_u16, 12, "LD SP, u16"),
    (ld_mhld_a, 8, "LD [HL-], A"),
    (inc_sp, 8, "INC SP"),
    (inc_mhl, 12, "INC [HL]"),
    (dec_mhl, 12, "DEC [HL]"),
    (ld_mhl_u8, 12, "LD [HL], u8"),
    (scf, 4, "SCF"),
    (jr_c_i8, 8, "JR C, i8"),
    (add_hl_sp, 8, "ADD HL, SP"),
    (ld_a_mhld, 8, "LD A, [HL-]"),
    (dec_sp, 8, "DEC SP"),
    (inc_a, 4, "INC A"),
    (dec_a, 4, "DEC A"),
    (ld_a_u8, 8, "LD A, u8"),
    (ccf, 4, "CCF"),
    // 0x4 opcodes
    (ld_b_b, 4, "LD B, B"),
    (ld_b_c, 4, "LD B, C"),
    (ld_b_d, 4, "LD B, D"),
    (ld_b_e, 4, "LD B, E"),
    (ld_b_h, 4, "LD B, H"),
    (ld_b_l, 4, "LD B, L"),
    (ld_b_mhl, 8, "LD B, [HL]"),
    (ld_b_a, 4, "LD B, A"),
    (ld_c_b, 4, "LD C, B"),
    (ld_c_c, 4, "LD C, C"),
    (ld_c_d, 4, "LD C, D"),
    (ld_c_e, 4, "LD C, E"),
    (ld_c_h, 4, "LD C, H"),
    (ld_c_l, 4, "LD C, L"),
    (ld_c_mhl, 8, "LD C, [HL]"),
    (ld_c_a, 4, "LD C, A"),
    // 0x5 opcodes
    (ld_d_b, 4, "LD D, B"),
    (ld_d_c, 4, "LD D, C"),
    (ld_d_d, 4, "LD D, D"),
    (ld_d_e, 4, "LD D, E"),
    (ld_d_h, 4, "LD D, H"),
    (ld_d_l, 4, "LD D, L"),
    (ld_d_mhl, 8, "LD D, [HL]"),
    (ld_d_a, 4, "LD D, A"),
    (ld_e_b, 4, "LD E, B"),
    (ld_e_c, 4, "LD E, C"),
    (ld_e_d, 4, "LD E, D"),
    (ld_e_e, 4, "LD E, E"),
    (ld_e_h, 4, "LD E, H"),
    (ld_e_l, 4, "LD E, L"),
    (ld_e_mhl, 8, "LD E, [HL]"),
    (ld_e_a, 4, "LD E, A"),
    // 0x6 opcodes
    (ld_h_b, 4, "LD H, B"),
    (ld_h_c, 4, "LD H, C"),
    (ld_h_d, 4, "LD H, D"),
    (ld_h_e, 4, "LD H, E"),
    (ld_h_h, 4, "LD H, H"),
    (ld_h_l, 4, "LD H, L"),
    (ld_h_mhl, 8, "LD H, [HL]"),
    (ld_h_a, 4, "LD H, A"),
    (ld_l_b, 4, "LD L, B"),
    (ld_l_c, 4, "LD L, C"),
    (ld_l_d, 4, "LD L, D"),
    (ld_l_e, 4, "LD L, E"),
    (ld_l_h, 4, "LD L, H"),
    (ld_l_l, 4, "LD L, L"),
    (ld_l_mhl, 8, "LD L, [HL]"),
    (ld_l_a, 4, "LD L, A"),
    // 0x7 opcodes
    (ld_mhl_b, 8, "LD [HL], B"),
    (ld_mhl_c, 8, "LD [HL], C"),
    (ld_mhl_d, 8, "LD [HL], D"),
    (ld_mhl_e, 8, "LD [HL], E"),
    (ld_mhl_h, 8, "LD [HL], H"),
    (ld_mhl_l, 8, "LD [HL], L"),
    (halt, 4, "HALT"),
    (ld_mhl_a, 8, "LD [HL], A"),
    (ld_a_b, 4, "LD A, B"),
    (ld_a_c, 4, "LD A, C"),
    (ld_a_d, 4, "LD A, D"),
    (ld_a_e, 4, "LD A, E"),
    (ld_a_h, 4, "LD A, H"),
    (ld_a_l, 4, "LD A, L"),
    (ld_a_mhl, 8, "LD A, [HL]"),
    (ld_a_a, 4, "LD A, A"),
    // 0x8 opcodes
    (add_a_b, 4, "ADD A, B"),
    (add_a_c, 4, "ADD A, C"),
    (add_a_d, 4, "ADD A, D"),
    (add_a_e, 4, "ADD A, E"),
    (add_a_h, 4, "ADD A, H"),
    (add_a_l, 4, "ADD A, L"),
    (add_a_mhl, 8, "ADD A, [HL]"),
    (add_a_a, 4, "ADD A, A"),
    (adc_a_b, 4, "ADC A, B"),
    (adc_a_c, 4, "ADC A, C"),
    (adc_a_d, 4, "ADC A, D"),
    (adc_a_e, 4, "ADC A, E"),
    (adc_a_h, 4, "ADC A, H"),
    (adc_a_l, 4, "ADC A, L"),
    (adc_a_mhl, 8, "ADC A, [HL]"),
    (adc_a_a, 4, "ADC A, A"),
    // 0x9 opcodes
    (sub_a_b, 4, "SUB A, B"),
    (sub_a_c, 4, "SUB A, C"),
    (sub_a_d, 4, "SUB A, D"),
    (sub_a_e, 4, "SUB A, E"),
    (sub_a_h, 4, "SUB A, H"),
    (sub_a_l, 4, "SUB A, L"),
    (sub_a_mhl, 8, "SUB A, [HL]"),
    (sub_a_a, 4, "SUB A, A"),
    (sbc_a_b, 4, "SBC A, B"),
    (sbc_a_c, 4, "SBC A, C"),
    (sbc_a_d, 4, "SBC A, D"),
    (sbc_a_e, 4, "SBC A, E"),
    (sbc_a_h, 4, "SBC A, H"),
    (sbc_a_l, 4, "SBC A, L"),
    (sbc_a_mhl, 8, "SBC A, [HL]"),
    (sbc_a_a, 4, "SBC A, A"),
    // 0xA opcodes
    (and_a_b, 4, "AND A, B"),
    (and_a_c, 4, "AND A, C"),
    (and_a_d, 4, "AND A, D"),
    (and_a_e, 4, "AND A, E"),
    (and_a_h, 4, "AND A, H"),
    (and_a_l, 4, "AND A, L"),
    (and_a_mhl, 8, "AND A, [HL]"),
    (and_a_a, 4, "AND A, A"),
    (xor_a_b, 4, "XOR A, B"),
    (xor_a_c, 4, "XOR A, C"),
    (xor_a_d, 4, "XOR A, D"),
    (xor_a_e, 4, "XOR A, E"),
    (xor_a_h, 4, "XOR A, H"),
    (xor_a_l, 4, "XOR A, L"),
    (xor_a_mhl, 8, "XOR A, [HL]"),
    (xor_a_a, 4, "XOR A, A"),
    // 0xB opcodes
    (or_a_b, 4, "OR A, B"),
    (or_a_c, 4, "OR A, C"),
    (or_a_d, 4, "OR A, D"),
    (or_a_e, 4, "OR A, E"),
    (or_a_h, 4, "OR A, H"),
    (or_a_l, 4, "OR A, L"),
    (or_a_mhl, 8, "OR A, [HL]"),
    (or_a_a, 4, "OR A, A"),
    (cp_a_b, 4, "CP A, B"),
    (cp_a_c, 4, "CP A, C"),
    (cp_a_d, 4, "CP A, D"),
    (cp_a_e, 4, "CP A, E"),
    (cp_a_h, 4, "CP A, H"),
    (cp_a_l, 4, "CP A, L"),
    (cp_a_mhl, 8, "CP A, [HL]"),
    (cp_a_a, 4, "CP A, A"),
    // 0xC opcodes
    (ret_nz, 8, "RET NZ"),
    (pop_bc, 12, "POP BC"),
    (jp_nz_u16, 12, "JP NZ, u16"),
    (jp_u16, 16, "JP u16"),
    (call_nz_u16, 12, "CALL NZ, u16"),
    (push_bc, 16, "PUSH BC"),
    (add_a_u8, 8, "ADD A, u8"),
    (rst_00, 16, "RST 00h"),
    (ret_z, 8, "RET Z"),
    (ret, 16, "RET"),
    (jp_z_u16, 12, "JP Z, u16"),
    (prefix_stub, 4, "PREFIX CB"),
    (call_z_u16, 12, "CALL Z, u16"),
    (call_u16, 24, "CALL u16"),
    (adc_a_u8, 8, "ADC A, u8"),
    (rst_08, 16, "RST 08h"),
    // 0xD opcodes
    (ret_nc, 8, "RET NC"),
    (pop_de, 12, "POP DE"),
    (jp_nc_u16, 12, "JP NC, u16"),
    (illegal, 4, "! UNIMP !"),
    (call_nc_u16, 12, "CALL NC, u16"),
    (push_de, 16, "PUSH DE"),
    (sub_a_u8, 8, "SUB A, u8"),
    (rst_10, 16, "RST 10h"),
    (ret_c, 8, "RET C"),
    (reti, 16, "RETI"),
    (jp_c_u16, 12, "JP C, u16"),
    (illegal, 4, "! UNIMP !"),
    (call_c_u16, 12, "CALL C, u16"),
    (illegal, 4, "! UNIMP !"),
    (sbc_a_u8, 8, "SBC A, u8"),
    (rst_18, 16, "RST 18h"),
    // 0xE opcodes
    (ldh_mu8_a, 12, "LDH [u8], A"),
    (pop_hl, 12, "POP HL"),
    (ld_mc_a, 8, "LD [C], A"),
    (illegal, 4, "! UNIMP !"),
    (illegal, 4, "! UNIMP !"),
    (push_hl, 16, "PUSH HL"),
    (and_a_u8, 8, "AND A, u8"),
    (rst_20, 16, "RST 20h"),
    (add_sp_i8, 16, "ADD SP, i8"),
    (jp_hl, 4, "JP HL"),
    (ld_mu16_a, 16, "LD [u16], A"),
    (illegal, 4, "! UNIMP !"),
    (illegal, 4, "! UNIMP !"),
    (illegal, 4, "! UNIMP !"),
    (xor_a_u8, 8, "XOR A, u8"),
    (rst_28, 16, "RST 28h"),
    // 0xF opcodes
    (ldh_a_mu8, 12, "LDH A, [u8]"),
    (pop_af, 12, "POP AF"),
    (ld_a_mc, 8, "LD A, [C]"),
    (di, 4, "DI"),
    (illegal, 4, "! UNIMP !"),
    (push_af, 16, "PUSH AF"),
    (or_a_u8, 8, "OR A, u8"),
    (rst_30, 16, "RST 30h"),
    (ld_hl_sp_i8, 12, "LD HL, SP + i8"),
    (ld_sp_hl, 8, "LD SP, HL"),
    (ld_a_mu16, 16, "LD A, [u16]"),
    (ei, 4, "EI"),
    (illegal, 4, "! UNIMP !"),
    (illegal, 4, "! UNIMP !"),
    (cp_a_u8, 8, "CP A, u8"),
    (rst_38, 16, "RST 38h"),
];

pub const EXTENDED: [Instruction; 256] = [
    // 0x0 opcodes
    (rlc_b, 8, "RLC B"),
    (rlc_c, 8, "RLC C"),
    (rlc_d, 8, "RLC D"),
    (rlc_e, 8, "RLC E"),
    (rlc_h, 8, "RLC H"),
    (rlc_l, 8, "RLC L"),
    (rlc_mhl, 16, "RLC [HL]"),
    (rlc_a, 8, "RLC A"),
    (rrc_b, 8, "RRC B"),
    (rrc_c, 8, "RRC C"),
    (rrc_d, 8, "RRC D"),
    (rrc_e, 8, "RRC E"),
    (rrc_h, 8, "RRC H"),
    (rrc_l, 8, "RRC L"),
    (rrc_mhl, 16, "RRC [HL]"),
    (rrc_a, 8, "RRC A"),
    // 0x1 opcodes
    (rl_b, 8, "RL B"),
    (rl_c, 8, "RL C"),
    (rl_d, 8, "RL D"),
    (rl_e, 8, "RL E"),
    (rl_h, 8, "RL H"),
    (rl_l, 8, "RL L"),
    (rl_mhl, 16, "RL [HL]"),
    (rl_a, 8, "RL A"),
    (rr_b, 8, "RR B"),
    (rr_c, 8, "RR C"),
    (rr_d, 8, "RR D"),
    (rr_e, 8, "RR E"),
    (rr_h, 8, "RR H"),
    (rr_l, 8, "RR L"),
    (rr_mhl, 16, "RR [HL]"),
    (rr_a, 8, "RR A"),
    // 0x2 opcodes
    (sla_b, 8, "SLA B"),
    (sla_c, 8, "SLA C"),
    (sla_d, 8, "SLA D"),
    (sla_e, 8, "SLA E"),
    (sla_h, 8, "SLA H"),
    (sla_l, 8, "SLA L"),
    (sla_mhl, 16, "SLA [HL]"),
    (sla_a, 8, "SLA A"),
    (sra_b, 8, "SRA B"),
    (sra_c, 8, "SRA C"),
    (sra_d, 8, "SRA D"),
    (sra_e, 8, "SRA E"),
    (sra_h, 8, "SRA H"),
    (sra_l, 8, "SRA L"),
    (sra_mhl, 16, "SRA [HL]"),
    (sra_a, 8, "SRA A"),
    // 0x3 opcodes
    (swap_b, 8, "SWAP B"),
    (swap_c, 8, "SWAP C"),
    (swap_d, 8, "SWAP D"),
    (swap_e, 8, "SWAP E"),
    (swap_h, 8, "SWAP H"),
    (swap_l, 8, "SWAP L"),
    (swap_mhl, 16, "SWAP [HL]"),
    (swap_a, 8, "SWAP A"),
    (srl_b, 8, "SRL B"),
    (srl_c, 8, "SRL C"),
    (srl_d, 8, "SRL D"),
    (srl_e, 8, "SRL E"),
    (srl_h, 8, "SRL H"),
    (srl_l, 8, "SRL L"),
    (srl_mhl, 16, "SRL [HL]"),
    (srl_a, 8, "SRL A"),
    // 0x4 opcodes
    (bit_0_b, 8, "BIT 0, B"),
    (bit_0_c, 8, "BIT 0, C"),
    (bit_0_d, 8, "BIT 0, D"),
    (bit_0_e, 8, "BIT 0, E"),
    (bit_0_h, 8, "BIT 0, H"),
    (bit_0_l, 8, "BIT 0, L"),
    (bit_0_mhl, 12, "BIT 0, [HL]"),
    (bit_0_a, 8, "BIT 0, A"),
    (bit_1_b, 8, "BIT 1, B"),
    (bit_1_c, 8, "BIT 1, C"),
    (bit_1_d, 8, "BIT 1, D"),
    (bit_1_e, 8, "BIT 1, E"),
    (bit_1_h, 8, "BIT 1, H"),
    (bit_1_l, 8, "BIT 1, L"),
    (bit_1_mhl, 12, "BIT 1, [HL]"),
    (bit_1_a, 8, "BIT 1, A"),
    // 0x5 opcodes
    (bit_2_b, 8, "BIT 2, B"),
    (bit_2_c, 8, "BIT 2, C"),
    (bit_2_d, 8, "BIT 2, D"),
    (bit_2_e, 8, "BIT 2, E"),
    (bit_2_h, 8, "BIT 2, H"),
    (bit_2_l, 8, "BIT 2, L"),
    (bit_2_mhl, 12, "BIT 2, [HL]"),
    (bit_2_a, 8, "BIT 2, A"),
    (bit_3_b, 8, "BIT 3, B"),
    (bit_3_c, 8, "BIT 3, C"),
    (bit_3_d, 8, "BIT 3, D"),
    (bit_3_e, 8, "BIT 3, E"),
    (bit_3_h, 8, "BIT 3, H"),
    (bit_3_l, 8, "BIT 3, L"),
    (bit_3_mhl, 12, "BIT 3, [HL]"),
    (bit_3_a, 8, "BIT 3, A"),
    // 0x6 opcodes
    (bit_4_b, 8, "BIT 4, B"),
    (bit_4_c, 8, "BIT 4, C"),
    (bit_4_d, 8, "BIT 4, D"),
    (bit_4_e, 8, "BIT 4, E"),
    (bit_4_h, 8, "BIT 4, H"),
    (bit_4_l, 8, "BIT 4, L"),
    (bit_4_mhl, 12, "BIT 4, [HL]"),
    (bit_4_a, 8, "BIT 4, A"),
    (bit_5_b, 8, "BIT 5, B"),
    (bit_5_c, 8, "BIT 5, C"),
    (bit_5_d, 8, "BIT 5, D"),
    (bit_5_e, 8, "BIT 5, E"),
    (bit_5_h, 8, "BIT 5, H"),
    (bit_5_l, 8, "BIT 5, L"),
    (bit_5_mhl, 12, "BIT 5, [HL]"),
    (bit_5_a, 8, "BIT 5, A"),
    // 0x7 opcodes
    (bit_6_b, 8, "BIT 6, B"),
    (bit_6_c, 8, "BIT 6, C"),
    (bit_6_d, 8, "BIT 6, D"),
    (bit_6_e, 8, "BIT 6, E"),
    (bit_6_h, 8, "BIT 6, H"),
    (bit_6_l, 8, "BIT 6, L"),
    (bit_6_mhl, 12, "BIT 6, [HL]"),
    (bit_6_a, 8, "BIT 6, A"),
    (bit_7_b, 8, "BIT 7, B"),
    (bit_7_c, 8, "BIT 7, C"),
    (bit_7_d, 8, "BIT 7, D"),
    (bit_7_e, 8, "BIT 7, E"),
    (bit_7_h, 8, "BIT 7, H"),
    (bit_7_l, 8, "BIT 7, L"),
    (bit_7_mhl, 12, "BIT 7, [HL]"),
    (bit_7_a, 8, "BIT 7, A"),
    // 0x8 opcodes
    (res_0_b, 8, "RES 0, B"),
    (res_0_c, 8, "RES 0, C"),
    (res_0_d, 8, "RES 0, D"),
    (res_0_e, 8, "RES 0, E"),
    (res_0_h, 8, "RES 0, H"),
    (res_0_l, 8, "RES 0, L"),
    (res_0_mhl, 16, "RES 0, [HL]"),
    (res_0_a, 8, "RES 0, A"),
    (res_1_b, 8, "RES 1, B"),
    (res_1_c, 8, "RES 1, C"),
    (res_1_d, 8, "RES 1, D"),
    (res_1_e, 8, "RES 1, E"),
    (res_1_h, 8, "RES 1, H"),
    (res_1_l, 8, "RES 1, L"),
    (res_1_mhl, 16, "RES 1, [HL]"),
    (res_1_a, 8, "RES 1, A"),
    // 0x9 opcodes
    (res_2_b, 8, "RES 2, B"),
    (res_2_c, 8, "RES 2, C"),
    (res_2_d, 8, "RES 2, D"),
    (res_2_e, 8, "RES 2, E"),
    (res_2_h, 8, "RES 2, H"),
    (res_2_l, 8, "RES 2, L"),
    (res_2_mhl, 16, "RES 2, [HL]"),
    (res_2_a, 8, "RES 2, A"),
    (res_3_b, 8, "RES 3, B"),
    (res_3_c, 8, "RES 3, C"),
    (res_3_d, 8, "RES 3, D"),
    (res_3_e, 8, "RES 3, E"),
    (res_3_h, 8, "RES 3, H"),
    (res_3_l, 8, "RES 3, L"),
    (res_3_mhl, 16, "RES 3, [HL]"),
    (res_3_a, 8, "RES 3, A"),
    // 0xA opcodes
    (res_4_b, 8, "RES 4, B"),
    (res_4_c, 8, "RES 4, C"),
    (res_4_d, 8, "RES 4, D"),
    (res_4_e, 8, "RES 4, E"),
    (res_4_h, 8, "RES 4, H"),
    (res_4_l, 8, "RES 4, L"),
    (res_4_mhl, 16, "RES 4, [HL]"),
    (res_4_a, 8, "RES 4, A"),
    (res_5_b, 8, "RES 5, B"),
    (res_5_c, 8, "RES 5, C"),
    (res_5_d, 8, "RES 5, D"),
    (res_5_e, 8, "RES 5, E"),
    (res_5_h, 8, "RES 5, H"),
    (res_5_l, 8, "RES 5, L"),
    (res_5_mhl, 16, "RES 5, [HL]"),
    (res_5_a, 8, "RES 5, A"),
    // 0xB opcodes
    (res_6_b, 8, "RES 6, B"),
    (res_6_c, 8, "RES 6, C"),
    (res_6_d, 8, "RES 6, D"),
    (res_6_e, 8, "RES 6, E"),
    (res_6_h, 8, "RES 6, H"),
    (res_6_l, 8, "RES 6, L"),
    (res_6_mhl, 16, "RES 6, [HL]"),
    (res_6_a, 8, "RES 6, A"),
    (res_7_b, 8, "RES 7, B"),
    (res_7_c, 8, "RES 7, C"),
    (res_7_d, 8, "RES 7, D"),
    (res_7_e, 8, "RES 7, E"),
    (res_7_h, 8, "RES 7, H"),
    (res_7_l, 8, "RES 7, L"),
    (res_7_mhl, 16, "RES 7, [HL]"),
    (res_7_a, 8, "RES 7, A"),
    // 0xC opcodes
    (set_0_b, 8, "SET 0, B"),
    (set_0_c, 8, "SET 0, C"),
    (set_0_d, 8, "SET 0, D"),
    (set_0_e, 8, "SET 0, E"),
    (set_0_h, 8, "SET 0, H"),
    (set_0_l, 8, "SET 0, L"),
    (set_0_mhl, 16, "SET 0, [HL]"),
    (set_0_a, 8, "SET 0, A"),
    (set_1_b, 8, "SET 1, B"),
    (set_1_c, 8, "SET 1, C"),
    (set_1_d, 8, "SET 1, D"),
    (set_1_e, 8, "SET 1, E"),
    (set_1_h, 8, "SET 1, H"),
    (set_1_l, 8, "SET 1, L"),
    (set_1_mhl, 16, "SET 1, [HL]"),
    (set_1_a, 8, "SET 1, A"),
    // 0xD opcodes
    (set_2_b, 8, "SET 2, B"),
    (set_2_c, 8, "SET 2, C"),
    (set_2_d, 8, "SET 2, D"),
    (set_2_e, 8, "SET 2, E"),
    (set_2_h, 8, "SET 2, H"),
    (set_2_l, 8, "SET 2, L"),
    (set_2_mhl, 16, "SET 2, [HL]"),
    (set_2_a, 8, "SET 2, A"),
    (set_3_b, 8, "SET 3, B"),
    (set_3_c, 8, "SET 3, C"),
    (set_3_d, 8, "SET 3, D"),
    (set_3_e, 8, "SET 3, E"),
    (set_3_h, 8, "SET 3, H"),
    (set_3_l, 8, "SET 3, L"),
    (set_3_mhl, 16, "SET 3, [HL]"),
    (set_3_a, 8, "SET 3, A"),
    // 0xE opcodes
    (set_4_b, 8, "SET 4, B"),
    (set_4_c, 8, "SET 4, C"),
    (set_4_d, 8, "SET 4, D"),
    (set_4_e, 8, "SET 4, E"),
    (set_4_h, 8, "SET 4, H"),
    (set_4_l, 8, "SET 4, L"),
    (set_4_mhl, 16, "SET 4, [HL]"),
    (set_4_a, 8, "SET 4, A"),
    (set_5_b, 8, "SET 5, B"),
    (set_5_c, 8, "SET 5, C"),
    (set_5_d, 8, "SET 5, D"),
    (set_5_e, 8, "SET 5, E"),
    (set_5_h, 8, "SET 5, H"),
    (set_5_l, 8, "SET 5, L"),
    (set_5_mhl, 16, "SET 5, [HL]"),
    (set_5_a, 8, "SET 5, A"),
    // 0xF opcodes
    (set_6_b, 8, "SET 6, B"),
    (set_6_c, 8, "SET 6, C"),
    (set_6_d, 8, "SET 6, D"),
    (set_6_e, 8, "SET 6, E"),
    (set_6_h, 8, "SET 6, H"),
    (set_6_l, 8, "SET 6, L"),
    (set_6_mhl, 16, "SET 6, [HL]"),
    (set_6_a, 8, "SET 6, A"),
    (set_7_b, 8, "SET 7, B"),
    (set_7_c, 8, "SET 7, C"),
    (set_7_d, 8, "SET 7, D"),
    (set_7_e, 8, "SET 7, E"),
    (set_7_h, 8, "SET 7, H"),
    (set_7_l, 8, "SET 7, L"),
    (set_7_mhl, 16, "SET 7, [HL]"),
    (set_7_a, 8, "SET 7, A"),
];
