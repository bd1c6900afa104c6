//! Label-based branch emission: the primary surface that participates in
//! [`Buffer::resolve_all`] and [`Buffer::shorten`].
//!
//! Every function here writes the long (32-bit displacement) form with a
//! zero placeholder and records a pending branch; the placeholder is
//! never read before `resolve_all`/`shorten` patches it. A second,
//! explicitly lower-level surface — `emit_call_rel32`/`emit_jmp_rel32`/
//! `emit_jcc_rel32` — writes a caller-supplied displacement verbatim and
//! registers nothing; treat it as an escape hatch, not the normal path.

use crate::branch::{BranchKind, LabelId};
use crate::buffer::Buffer;

fn emit_long(buf: &mut Buffer, target: LabelId, kind: BranchKind) {
    let site = buf.len();
    let (opcode0, opcode1) = kind.long_opcode();
    buf.push_u8(opcode0);
    if let Some(opcode1) = opcode1 {
        buf.push_u8(opcode1);
    }
    buf.push_i32_le(0);
    buf.record_pending_branch(site, target, kind, kind.long_len());
}

/// `CALL target` — `0xE8` + 4-byte placeholder. Never shortens.
pub fn emit_call(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Call);
}

/// `JMP target` — `0xE9` + 4-byte placeholder.
pub fn emit_jmp(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Jmp);
}

/// `JE target` — `0x0F 0x84` + 4-byte placeholder.
pub fn emit_je(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Je);
}

/// `JNE target` — `0x0F 0x85` + 4-byte placeholder.
pub fn emit_jne(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Jne);
}

/// `JG target` — `0x0F 0x8F` + 4-byte placeholder.
pub fn emit_jg(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Jg);
}

/// `JL target` — `0x0F 0x8C` + 4-byte placeholder.
pub fn emit_jl(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Jl);
}

/// `JGE target` — `0x0F 0x8D` + 4-byte placeholder.
pub fn emit_jge(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Jge);
}

/// `JLE target` — `0x0F 0x8E` + 4-byte placeholder.
pub fn emit_jle(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Jle);
}

/// `JA target` — `0x0F 0x87` + 4-byte placeholder.
pub fn emit_ja(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Ja);
}

/// `JB target` — `0x0F 0x82` + 4-byte placeholder.
pub fn emit_jb(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Jb);
}

/// `JAE target` — `0x0F 0x83` + 4-byte placeholder.
pub fn emit_jae(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Jae);
}

/// `JBE target` — `0x0F 0x86` + 4-byte placeholder.
pub fn emit_jbe(buf: &mut Buffer, target: LabelId) {
    emit_long(buf, target, BranchKind::Jbe);
}

/// Escape hatch: `CALL` with a caller-computed `rel32`, written verbatim.
/// Registers no pending branch; `resolve_all`/`shorten` never touch it.
pub fn emit_call_rel32(buf: &mut Buffer, rel32: i32) {
    buf.push_u8(0xE8);
    buf.push_i32_le(rel32);
}

/// Escape hatch: `JMP` with a caller-computed `rel32`, written verbatim.
pub fn emit_jmp_rel32(buf: &mut Buffer, rel32: i32) {
    buf.push_u8(0xE9);
    buf.push_i32_le(rel32);
}

/// Escape hatch: `Jcc` with a caller-computed `rel32`, written verbatim,
/// using `kind`'s long-form opcode. Passing [`BranchKind::Call`] or
/// [`BranchKind::Jmp`] works too but [`emit_call_rel32`]/[`emit_jmp_rel32`]
/// read better at the call site.
pub fn emit_jcc_rel32(buf: &mut Buffer, kind: BranchKind, rel32: i32) {
    let (opcode0, opcode1) = kind.long_opcode();
    buf.push_u8(opcode0);
    if let Some(opcode1) = opcode1 {
        buf.push_u8(opcode1);
    }
    buf.push_i32_le(rel32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_jmp_records_pending_branch() {
        let mut buf = Buffer::new();
        let l = buf.new_label();
        emit_jmp(&mut buf, l);
        assert_eq!(buf.format_hex(), "E9 00 00 00 00");
        assert_eq!(buf.pending_branches().len(), 1);
        assert_eq!(buf.pending_branches()[0].kind, BranchKind::Jmp);
        assert_eq!(buf.pending_branches()[0].len, 5);
    }

    #[test]
    fn emit_je_is_six_bytes_long_form() {
        let mut buf = Buffer::new();
        let l = buf.new_label();
        emit_je(&mut buf, l);
        assert_eq!(buf.format_hex(), "0F 84 00 00 00 00");
        assert_eq!(buf.pending_branches()[0].len, 6);
    }

    #[test]
    fn rel32_escape_hatch_registers_nothing() {
        let mut buf = Buffer::new();
        emit_jmp_rel32(&mut buf, -5);
        assert_eq!(buf.format_hex(), "E9 FB FF FF FF");
        assert!(buf.pending_branches().is_empty());
    }
}
