//! Bit-scan and bit-test instructions.

use crate::bits::{modrm_byte, Mode};
use crate::buffer::Buffer;
use crate::registers::Gpr;
use crate::rex::Rex;

fn emit_0f(buf: &mut Buffer, opcode: u8, reg: Gpr, rm: Gpr) {
    let rex = Rex::for_rr64(reg.is_extended(), rm.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(opcode);
    buf.push_u8(modrm_byte(Mode::Direct, reg.index(), rm.index()));
}

/// `BSF dst, src` — `0x0F 0xBC ModR/M(reg=dst, rm=src)`.
pub fn bsf(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_0f(buf, 0xBC, dst, src);
}

/// `BSR dst, src` — `0x0F 0xBD ModR/M(reg=dst, rm=src)`.
pub fn bsr(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    emit_0f(buf, 0xBD, dst, src);
}

fn emit_bt(buf: &mut Buffer, digit: u8, rm: Gpr, bit_index: u8) {
    let rex = Rex::for_rm64(rm.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(0xBA);
    buf.push_u8(modrm_byte(Mode::Direct, digit, rm.index()));
    buf.push_u8(bit_index);
}

/// `BT rm, imm8` — `0x0F 0xBA /4`.
pub fn bt(buf: &mut Buffer, rm: Gpr, bit_index: u8) {
    emit_bt(buf, 4, rm, bit_index);
}

/// `BTS rm, imm8` — `0x0F 0xBA /5`.
pub fn bts(buf: &mut Buffer, rm: Gpr, bit_index: u8) {
    emit_bt(buf, 5, rm, bit_index);
}

/// `BTR rm, imm8` — `0x0F 0xBA /6`.
pub fn btr(buf: &mut Buffer, rm: Gpr, bit_index: u8) {
    emit_bt(buf, 6, rm, bit_index);
}

/// `BTC rm, imm8` — `0x0F 0xBA /7`.
pub fn btc(buf: &mut Buffer, rm: Gpr, bit_index: u8) {
    emit_bt(buf, 7, rm, bit_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{RAX, RBX};

    #[test]
    fn bsf_reg_reg() {
        let mut buf = Buffer::new();
        bsf(&mut buf, RAX, RBX);
        assert_eq!(buf.format_hex(), "48 0F BC C3");
    }

    #[test]
    fn bt_imm8() {
        let mut buf = Buffer::new();
        bt(&mut buf, RAX, 3);
        assert_eq!(buf.format_hex(), "48 0F BA E0 03");
    }
}
