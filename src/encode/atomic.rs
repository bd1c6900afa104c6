//! `LOCK`-prefixed read-modify-write instructions, fences, and prefetch
//! hints.
//!
//! Each atomic variant here is the non-atomic base encoding with
//! `0xF0` prepended, matching how the ISA itself defines atomicity as a
//! prefix rather than a separate opcode.

use crate::bits::{modrm_byte, Mode};
use crate::buffer::Buffer;
use crate::registers::Gpr;
use crate::rex::Rex;

const LOCK: u8 = 0xF0;

/// `LOCK CMPXCHG dst, src` — `0x0F 0xB1 ModR/M(reg=src, rm=dst)`.
/// Implicit `RAX` compare operand, per the ISA.
pub fn lock_cmpxchg(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    buf.push_u8(LOCK);
    let rex = Rex::for_rr64(src.is_extended(), dst.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(0xB1);
    buf.push_u8(modrm_byte(Mode::Direct, src.index(), dst.index()));
}

/// `LOCK XADD dst, src` — `0x0F 0xC1 ModR/M(reg=src, rm=dst)`.
pub fn lock_xadd(buf: &mut Buffer, dst: Gpr, src: Gpr) {
    buf.push_u8(LOCK);
    let rex = Rex::for_rr64(src.is_extended(), dst.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(0xC1);
    buf.push_u8(modrm_byte(Mode::Direct, src.index(), dst.index()));
}

/// `LOCK CMPXCHG8B rm` — `0x0F 0xC7 /1`. Implicit `EDX:EAX`/`ECX:EBX`
/// operands, per the ISA. No REX.W: that bit is reserved for the
/// 16-byte variant this crate does not emit.
pub fn lock_cmpxchg8b(buf: &mut Buffer, rm: Gpr) {
    buf.push_u8(LOCK);
    let rex = Rex::for_rm_extend_only(rm.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(0xC7);
    buf.push_u8(modrm_byte(Mode::Direct, 1, rm.index()));
}

/// `MFENCE` — `0x0F 0xAE 0xF0`. No REX.
pub fn mfence(buf: &mut Buffer) {
    buf.push_bytes(&[0x0F, 0xAE, 0xF0]);
}

/// `SFENCE` — `0x0F 0xAE 0xF8`. No REX.
pub fn sfence(buf: &mut Buffer) {
    buf.push_bytes(&[0x0F, 0xAE, 0xF8]);
}

/// `LFENCE` — `0x0F 0xAE 0xE8`. No REX.
pub fn lfence(buf: &mut Buffer) {
    buf.push_bytes(&[0x0F, 0xAE, 0xE8]);
}

/// `CLFLUSH rm` — `0x0F 0xAE /7`. No operand-size meaning, so no REX.W.
pub fn clflush(buf: &mut Buffer, rm: Gpr) {
    let rex = Rex::for_rm_extend_only(rm.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(0xAE);
    buf.push_u8(modrm_byte(Mode::Direct, 7, rm.index()));
}

/// `CLFLUSHOPT rm` — `0x66 0x0F 0xAE /7`, the same encoding as
/// [`clflush`] with the mandatory `0x66` prefix that distinguishes it.
pub fn clflushopt(buf: &mut Buffer, rm: Gpr) {
    buf.push_u8(0x66);
    clflush(buf, rm);
}

fn emit_prefetch(buf: &mut Buffer, digit: u8, rm: Gpr) {
    let rex = Rex::for_rm_extend_only(rm.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(0x18);
    buf.push_u8(modrm_byte(Mode::Direct, digit, rm.index()));
}

/// `PREFETCHT0 rm` — `0x0F 0x18 /1`.
pub fn prefetcht0(buf: &mut Buffer, rm: Gpr) {
    emit_prefetch(buf, 1, rm);
}

/// `PREFETCHT1 rm` — `0x0F 0x18 /2`.
pub fn prefetcht1(buf: &mut Buffer, rm: Gpr) {
    emit_prefetch(buf, 2, rm);
}

/// `PREFETCHT2 rm` — `0x0F 0x18 /3`.
pub fn prefetcht2(buf: &mut Buffer, rm: Gpr) {
    emit_prefetch(buf, 3, rm);
}

/// `PREFETCHNTA rm` — `0x0F 0x18 /0`.
pub fn prefetchnta(buf: &mut Buffer, rm: Gpr) {
    emit_prefetch(buf, 0, rm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{RAX, RBX};

    #[test]
    fn lock_cmpxchg_has_lock_prefix() {
        let mut buf = Buffer::new();
        lock_cmpxchg(&mut buf, RAX, RBX);
        assert_eq!(buf.format_hex(), "F0 48 0F B1 D8");
    }

    #[test]
    fn fences_need_no_rex() {
        let mut buf = Buffer::new();
        mfence(&mut buf);
        sfence(&mut buf);
        lfence(&mut buf);
        assert_eq!(buf.format_hex(), "0F AE F0 0F AE F8 0F AE E8");
    }

    #[test]
    fn clflush_needs_no_rex_for_a_low_register() {
        let mut buf = Buffer::new();
        clflush(&mut buf, RAX);
        assert_eq!(buf.format_hex(), "0F AE F8");
    }

    #[test]
    fn clflushopt_adds_66_prefix_over_clflush() {
        let mut buf = Buffer::new();
        clflush(&mut buf, RAX);
        let plain_len = buf.len();
        clflushopt(&mut buf, RAX);
        assert_eq!(buf.len() - plain_len, 4);
        assert_eq!(buf.bytes()[plain_len as usize], 0x66);
    }
}
