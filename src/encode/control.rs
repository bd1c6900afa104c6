//! Stack, control-transfer, and miscellaneous fixed-encoding instructions
//! that carry no operand beyond (at most) a single register or immediate.

use crate::bits::{modrm_byte, Mode};
use crate::buffer::Buffer;
use crate::registers::Gpr;
use crate::rex::Rex;

/// `PUSH reg` — `[REX.B?] 0x50+rd`. Operand size is already 64-bit by
/// default in long mode; no `REX.W`.
pub fn push(buf: &mut Buffer, reg: Gpr) {
    let rex = Rex::for_rd_extend_only(reg.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x50 + (reg.index() & 0b111));
}

/// `POP reg` — `[REX.B?] 0x58+rd`. Same operand-size note as [`push`].
pub fn pop(buf: &mut Buffer, reg: Gpr) {
    let rex = Rex::for_rd_extend_only(reg.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x58 + (reg.index() & 0b111));
}

/// `INT3` — `0xCC`.
pub fn int3(buf: &mut Buffer) {
    buf.push_u8(0xCC);
}

/// `INT imm8` — `0xCD ib`.
pub fn int(buf: &mut Buffer, imm8: u8) {
    buf.push_u8(0xCD);
    buf.push_u8(imm8);
}

/// `SYSCALL` — `0x0F 0x05`.
pub fn syscall(buf: &mut Buffer) {
    buf.push_bytes(&[0x0F, 0x05]);
}

/// `RET` — `0xC3`.
pub fn ret(buf: &mut Buffer) {
    buf.push_u8(0xC3);
}

/// `NOP` — `0x90`.
pub fn nop(buf: &mut Buffer) {
    buf.push_u8(0x90);
}

/// `PAUSE` — `0xF3 0x90`. No REX.
pub fn pause(buf: &mut Buffer) {
    buf.push_bytes(&[0xF3, 0x90]);
}

/// The Intel-recommended multi-byte NOP encodings for lengths 1..=9,
/// indexed by `len - 1`.
const NOP_FORMS: [&[u8]; 9] = [
    &[0x90],
    &[0x66, 0x90],
    &[0x0F, 0x1F, 0x00],
    &[0x0F, 0x1F, 0x40, 0x00],
    &[0x0F, 0x1F, 0x44, 0x00, 0x00],
    &[0x66, 0x0F, 0x1F, 0x44, 0x00, 0x00],
    &[0x0F, 0x1F, 0x80, 0x00, 0x00, 0x00, 0x00],
    &[0x0F, 0x1F, 0x84, 0x00, 0x00, 0x00, 0x00, 0x00],
    &[0x66, 0x0F, 0x1F, 0x84, 0x00, 0x00, 0x00, 0x00, 0x00],
];

/// Emits `n` bytes of padding as a minimal sequence of NOP instructions,
/// using the largest Intel-recommended single-instruction form (up to 9
/// bytes) repeatedly, with a final instruction covering any remainder.
pub fn nop_n(buf: &mut Buffer, mut n: usize) {
    while n > 9 {
        buf.push_bytes(NOP_FORMS[8]);
        n -= 9;
    }
    if n > 0 {
        buf.push_bytes(NOP_FORMS[n - 1]);
    }
}

/// `JMP reg` (indirect, through a register) — `[REX.B?] 0xFF /4`, no
/// `REX.W` (a near indirect jump is always 64-bit in long mode). Never
/// tracked as a pending branch: the target isn't a label, and there is
/// nothing for resolution or shortening to do.
pub fn jmp_indirect(buf: &mut Buffer, reg: Gpr) {
    let rex = Rex::for_rd_extend_only(reg.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0xFF);
    buf.push_u8(modrm_byte(Mode::Direct, 4, reg.index()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{R8, RAX};

    #[test]
    fn push_pop_low_register() {
        let mut buf = Buffer::new();
        push(&mut buf, RAX);
        pop(&mut buf, RAX);
        assert_eq!(buf.format_hex(), "50 58");
    }

    #[test]
    fn push_extended_register_needs_rex_b() {
        let mut buf = Buffer::new();
        push(&mut buf, R8);
        assert_eq!(buf.format_hex(), "41 50");
    }

    #[test]
    fn nop_n_uses_single_form_up_to_nine() {
        let mut buf = Buffer::new();
        nop_n(&mut buf, 5);
        assert_eq!(buf.format_hex(), "0F 1F 44 00 00");
    }

    #[test]
    fn nop_n_composes_past_nine() {
        let mut buf = Buffer::new();
        nop_n(&mut buf, 11);
        assert_eq!(buf.len(), 11);
        assert_eq!(&buf.bytes()[0..9], NOP_FORMS[8]);
        assert_eq!(&buf.bytes()[9..11], NOP_FORMS[1]);
    }

    #[test]
    fn jmp_indirect_is_never_pending() {
        let mut buf = Buffer::new();
        jmp_indirect(&mut buf, RAX);
        assert_eq!(buf.format_hex(), "FF E0");
        assert!(buf.pending_branches().is_empty());
    }
}
