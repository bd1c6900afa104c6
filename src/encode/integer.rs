//! Integer arithmetic, data movement, and register-width ALU ops.
//!
//! The register-register forms all share one shape: `[REX.W + R/B]
//! opcode ModR/M(mode=11, reg, rm)`. MOV/ADD/SUB/AND/OR/XOR/CMP/TEST/XCHG
//! put the destination in `rm` and the source in `reg`; IMUL reverses
//! that (destination in `reg`) because the ISA only defines the
//! `r, r/m` direction for it.

use crate::bits::{modrm_byte, Mode};
use crate::buffer::Buffer;
use crate::registers::Gpr;
use crate::rex::Rex;

fn emit_rr(buf: &mut Buffer, opcode: u8, reg: Gpr, rm: Gpr) {
    let rex = Rex::for_rr64(reg.is_extended(), rm.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(opcode);
    buf.push_u8(modrm_byte(Mode::Direct, reg.index(), rm.index()));
}

/// `MOV dst, src` — `0x89 ModR/M(reg=src, rm=dst)`.
pub fn mov(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_rr(buf, 0x89, src, dst);
}

/// `ADD dst, src` — `0x01 ModR/M(reg=src, rm=dst)`.
pub fn add(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_rr(buf, 0x01, src, dst);
}

/// `SUB dst, src` — `0x29 ModR/M(reg=src, rm=dst)`.
pub fn sub(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_rr(buf, 0x29, src, dst);
}

/// `AND dst, src` — `0x21 ModR/M(reg=src, rm=dst)`.
pub fn and(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_rr(buf, 0x21, src, dst);
}

/// `OR dst, src` — `0x09 ModR/M(reg=src, rm=dst)`.
pub fn or(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_rr(buf, 0x09, src, dst);
}

/// `XOR dst, src` — `0x31 ModR/M(reg=src, rm=dst)`.
pub fn xor(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_rr(buf, 0x31, src, dst);
}

/// `CMP dst, src` — `0x39 ModR/M(reg=src, rm=dst)`.
pub fn cmp(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_rr(buf, 0x39, src, dst);
}

/// `TEST dst, src` — `0x85 ModR/M(reg=src, rm=dst)`.
pub fn test(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_rr(buf, 0x85, src, dst);
}

/// `XCHG dst, src` — `0x87 ModR/M(reg=src, rm=dst)`.
pub fn xchg(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_rr(buf, 0x87, src, dst);
}

/// `IMUL dst, src` — `0x0F 0xAF ModR/M(reg=dst, rm=src)`. The only
/// reg-reg form here where the destination sits in the `reg` field.
pub fn imul(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    let rex = Rex::for_rr64(dst.is_extended(), src.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(0xAF);
    buf.push_u8(modrm_byte(Mode::Direct, dst.index(), src.index()));
}

/// `MOV dst, imm64` — `0xB8+rd` followed by the full 8-byte immediate.
pub fn mov_imm64(buf: &mut Buffer, dst: Gpr, imm: u64) {
    let rex = Rex::for_rd64(dst.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0xB8 + (dst.index() & 0b111));
    buf.push_u64_le(imm);
}

/// `MOV dst, imm32` (sign-extended) — `0xC7 /0 ModR/M` then a 4-byte
/// immediate.
pub fn mov_imm32(buf: &mut Buffer, dst: Gpr, imm: i32) {
    let rex = Rex::for_rm64(dst.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0xC7);
    buf.push_u8(modrm_byte(Mode::Direct, 0, dst.index()));
    buf.push_i32_le(imm);
}

fn emit_imm32(buf: &mut Buffer, digit: u8, dst: Gpr, imm: i32) {
    let rex = Rex::for_rm64(dst.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x81);
    buf.push_u8(modrm_byte(Mode::Direct, digit, dst.index()));
    buf.push_i32_le(imm);
}

/// `ADD dst, imm32` — `0x81 /0`. Always the 32-bit immediate form, even
/// when the value would fit in 8 bits; this keeps the encoder
/// deterministic and leaves nothing else for shortening to find.
pub fn add_imm32(buf: &mut Buffer, dst: Gpr, imm: i32) {
    emit_imm32(buf, 0, dst, imm);
}

/// `OR dst, imm32` — `0x81 /1`.
pub fn or_imm32(buf: &mut Buffer, dst: Gpr, imm: i32) {
    emit_imm32(buf, 1, dst, imm);
}

/// `AND dst, imm32` — `0x81 /4`.
pub fn and_imm32(buf: &mut Buffer, dst: Gpr, imm: i32) {
    emit_imm32(buf, 4, dst, imm);
}

/// `SUB dst, imm32` — `0x81 /5`.
pub fn sub_imm32(buf: &mut Buffer, dst: Gpr, imm: i32) {
    emit_imm32(buf, 5, dst, imm);
}

/// `XOR dst, imm32` — `0x81 /6`.
pub fn xor_imm32(buf: &mut Buffer, dst: Gpr, imm: i32) {
    emit_imm32(buf, 6, dst, imm);
}

/// `CMP dst, imm32` — `0x81 /7`.
pub fn cmp_imm32(buf: &mut Buffer, dst: Gpr, imm: i32) {
    emit_imm32(buf, 7, dst, imm);
}

fn emit_f7(buf: &mut Buffer, digit: u8, rm: Gpr) {
    let rex = Rex::for_rm64(rm.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0xF7);
    buf.push_u8(modrm_byte(Mode::Direct, digit, rm.index()));
}

fn emit_ff(buf: &mut Buffer, digit: u8, rm: Gpr) {
    let rex = Rex::for_rm64(rm.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0xFF);
    buf.push_u8(modrm_byte(Mode::Direct, digit, rm.index()));
}

/// `MUL rm` — `0xF7 /4`. Implicit `RDX:RAX` destination, per the ISA.
pub fn mul(buf: &mut Buffer, rm: Gpr) {
    emit_f7(buf, 4, rm);
}

/// `DIV rm` — `0xF7 /6`.
pub fn div(buf: &mut Buffer, rm: Gpr) {
    emit_f7(buf, 6, rm);
}

/// `IDIV rm` — `0xF7 /7`.
pub fn idiv(buf: &mut Buffer, rm: Gpr) {
    emit_f7(buf, 7, rm);
}

/// `NEG rm` — `0xF7 /3`.
pub fn neg(buf: &mut Buffer, rm: Gpr) {
    emit_f7(buf, 3, rm);
}

/// `NOT rm` — `0xF7 /2`.
pub fn not(buf: &mut Buffer, rm: Gpr) {
    emit_f7(buf, 2, rm);
}

/// `INC rm` — `0xFF /0`.
pub fn inc(buf: &mut Buffer, rm: Gpr) {
    emit_ff(buf, 0, rm);
}

/// `DEC rm` — `0xFF /1`.
pub fn dec(buf: &mut Buffer, rm: Gpr) {
    emit_ff(buf, 1, rm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{R8, R9, RAX, RBX};

    #[test]
    fn mov_reg_reg() {
        let mut buf = Buffer::new();
        mov(&mut buf, RAX, RBX);
        assert_eq!(buf.format_hex(), "48 89 D8");
    }

    #[test]
    fn mov_reg_reg_extended() {
        let mut buf = Buffer::new();
        mov(&mut buf, R8, R9);
        assert_eq!(buf.format_hex(), "4D 89 C8");
    }

    #[test]
    fn mov_imm64_value() {
        let mut buf = Buffer::new();
        mov_imm64(&mut buf, RAX, 42);
        assert_eq!(buf.format_hex(), "48 B8 2A 00 00 00 00 00 00 00");
    }

    #[test]
    fn add_then_ret_byte_count() {
        let mut buf = Buffer::new();
        add(&mut buf, RAX, RBX);
        assert_eq!(buf.format_hex(), "48 01 D8");
    }

    #[test]
    fn imul_reverses_operand_order() {
        let mut buf = Buffer::new();
        imul(&mut buf, RAX, RBX);
        assert_eq!(buf.format_hex(), "48 0F AF C3");
    }

    #[test]
    fn arith_imm32_always_full_width() {
        let mut buf = Buffer::new();
        add_imm32(&mut buf, RAX, 1);
        assert_eq!(buf.format_hex(), "48 81 C0 01 00 00 00");
    }
}
