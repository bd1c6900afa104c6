//! x87 FPU stack instructions.
//!
//! No REX prefix exists for x87 — the stack registers are never extended
//! and operand size is fixed by the FPU's own 80-bit internal format.

use crate::bits::{modrm_byte, Mode};
use crate::buffer::Buffer;
use crate::registers::St;

fn emit_d8(buf: &mut Buffer, digit: u8, st: St) {
    buf.push_u8(0xD8);
    buf.push_u8(modrm_byte(Mode::Direct, digit, st.index()));
}

/// `FADD ST, ST(i)` — `0xD8 /0`.
pub fn fadd(buf: &mut Buffer, st: St) {
    emit_d8(buf, 0, st);
}

/// `FMUL ST, ST(i)` — `0xD8 /1`.
pub fn fmul(buf: &mut Buffer, st: St) {
    emit_d8(buf, 1, st);
}

/// `FCOM ST(i)` — `0xD8 /2`.
pub fn fcom(buf: &mut Buffer, st: St) {
    emit_d8(buf, 2, st);
}

/// `FCOMP ST(i)` — `0xD8 /3`.
pub fn fcomp(buf: &mut Buffer, st: St) {
    emit_d8(buf, 3, st);
}

/// `FSUB ST, ST(i)` — `0xD8 /4`.
pub fn fsub(buf: &mut Buffer, st: St) {
    emit_d8(buf, 4, st);
}

/// `FDIV ST, ST(i)` — `0xD8 /6`.
pub fn fdiv(buf: &mut Buffer, st: St) {
    emit_d8(buf, 6, st);
}

/// `FLD ST(i)` — `0xD9 /0`.
pub fn fld(buf: &mut Buffer, st: St) {
    buf.push_u8(0xD9);
    buf.push_u8(modrm_byte(Mode::Direct, 0, st.index()));
}

/// `FST ST(i)` — `0xDD /2`.
pub fn fst(buf: &mut Buffer, st: St) {
    buf.push_u8(0xDD);
    buf.push_u8(modrm_byte(Mode::Direct, 2, st.index()));
}

/// `FSTP ST(i)` — `0xDD /3`.
pub fn fstp(buf: &mut Buffer, st: St) {
    buf.push_u8(0xDD);
    buf.push_u8(modrm_byte(Mode::Direct, 3, st.index()));
}

/// `FSIN` — `0xD9 0xFE`.
pub fn fsin(buf: &mut Buffer) {
    buf.push_bytes(&[0xD9, 0xFE]);
}

/// `FCOS` — `0xD9 0xFF`.
pub fn fcos(buf: &mut Buffer) {
    buf.push_bytes(&[0xD9, 0xFF]);
}

/// `FSQRT` — `0xD9 0xFA`.
pub fn fsqrt(buf: &mut Buffer) {
    buf.push_bytes(&[0xD9, 0xFA]);
}

/// `FABS` — `0xD9 0xE1`.
pub fn fabs(buf: &mut Buffer) {
    buf.push_bytes(&[0xD9, 0xE1]);
}

/// `FCHS` — `0xD9 0xE0`.
pub fn fchs(buf: &mut Buffer) {
    buf.push_bytes(&[0xD9, 0xE0]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::ST1;

    #[test]
    fn fld_st1() {
        let mut buf = Buffer::new();
        fld(&mut buf, ST1);
        assert_eq!(buf.format_hex(), "D9 C1");
    }

    #[test]
    fn fadd_st1() {
        let mut buf = Buffer::new();
        fadd(&mut buf, ST1);
        assert_eq!(buf.format_hex(), "D8 C1");
    }

    #[test]
    fn zero_operand_forms() {
        let mut buf = Buffer::new();
        fsqrt(&mut buf);
        fabs(&mut buf);
        fchs(&mut buf);
        assert_eq!(buf.format_hex(), "D9 FA D9 E1 D9 E0");
    }
}
