//! Scalar SSE floating-point instructions.
//!
//! The `F3`/`F2` mandatory prefix selects single- vs double-precision for
//! an otherwise identical opcode; none of these need `REX.W` on their own
//! (XMM operand width is fixed), except the GPR↔XMM conversions, which
//! carry `REX.W` to pick a 64-bit GPR operand.

use crate::buffer::Buffer;
use crate::registers::{Gpr, Xmm};
use crate::rex::Rex;

fn emit_xx(buf: &mut Buffer, prefix: Option<u8>, opcode: u8, dst: Xmm, src: Xmm) {
    if let Some(p) = prefix {
        buf.push_u8(p);
    }
    let rex = Rex::for_rr_extend_only(dst.is_extended(), src.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(opcode);
    buf.push_u8(crate::bits::modrm_byte(crate::bits::Mode::Direct, dst.index(), src.index()));
}

/// `MOVSS dst, src` — `0xF3 0x0F 0x10`.
pub fn movss(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF3), 0x10, dst, src);
}

/// `MOVSD dst, src` — `0xF2 0x0F 0x10`.
pub fn movsd(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF2), 0x10, dst, src);
}

/// `ADDSS dst, src` — `0xF3 0x0F 0x58`.
pub fn addss(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF3), 0x58, dst, src);
}

/// `ADDSD dst, src` — `0xF2 0x0F 0x58`.
pub fn addsd(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF2), 0x58, dst, src);
}

/// `SUBSS dst, src` — `0xF3 0x0F 0x5C`.
pub fn subss(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF3), 0x5C, dst, src);
}

/// `SUBSD dst, src` — `0xF2 0x0F 0x5C`.
pub fn subsd(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF2), 0x5C, dst, src);
}

/// `MULSS dst, src` — `0xF3 0x0F 0x59`.
pub fn mulss(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF3), 0x59, dst, src);
}

/// `MULSD dst, src` — `0xF2 0x0F 0x59`.
pub fn mulsd(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF2), 0x59, dst, src);
}

/// `DIVSS dst, src` — `0xF3 0x0F 0x5E`.
pub fn divss(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF3), 0x5E, dst, src);
}

/// `DIVSD dst, src` — `0xF2 0x0F 0x5E`.
pub fn divsd(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF2), 0x5E, dst, src);
}

/// `SQRTSS dst, src` — `0xF3 0x0F 0x51`.
pub fn sqrtss(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF3), 0x51, dst, src);
}

/// `SQRTSD dst, src` — `0xF2 0x0F 0x51`.
pub fn sqrtsd(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF2), 0x51, dst, src);
}

/// `COMISS dst, src` — `0x0F 0x2F`, no mandatory prefix.
pub fn comiss(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, None, 0x2F, dst, src);
}

/// `COMISD dst, src` — `0x66 0x0F 0x2F`.
pub fn comisd(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0x66), 0x2F, dst, src);
}

/// `CVTSS2SD dst, src` — `0xF3 0x0F 0x5A`.
pub fn cvtss2sd(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF3), 0x5A, dst, src);
}

/// `CVTSD2SS dst, src` — `0xF2 0x0F 0x5A`.
pub fn cvtsd2ss(buf: &mut Buffer, dst: Xmm, src: Xmm) {
    emit_xx(buf, Some(0xF2), 0x5A, dst, src);
}

fn emit_gpr_to_xmm(buf: &mut Buffer, prefix: u8, opcode: u8, dst: Xmm, src: Gpr) {
    buf.push_u8(prefix);
    let rex = Rex::for_rr64(dst.is_extended(), src.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(opcode);
    buf.push_u8(crate::bits::modrm_byte(crate::bits::Mode::Direct, dst.index(), src.index()));
}

/// `CVTSI2SS dst, src` — `0xF3 [REX.W] 0x0F 0x2A`. `REX.W` is always set:
/// this crate's `Gpr` only names 64-bit registers.
pub fn cvtsi2ss(buf: &mut Buffer, dst: Xmm, src: Gpr) {
    emit_gpr_to_xmm(buf, 0xF3, 0x2A, dst, src);
}

/// `CVTSI2SD dst, src` — `0xF2 [REX.W] 0x0F 0x2A`.
pub fn cvtsi2sd(buf: &mut Buffer, dst: Xmm, src: Gpr) {
    emit_gpr_to_xmm(buf, 0xF2, 0x2A, dst, src);
}

fn emit_xmm_to_gpr(buf: &mut Buffer, prefix: u8, opcode: u8, dst: Gpr, src: Xmm) {
    buf.push_u8(prefix);
    let rex = Rex::for_rr64(dst.is_extended(), src.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    buf.push_u8(0x0F);
    buf.push_u8(opcode);
    buf.push_u8(crate::bits::modrm_byte(crate::bits::Mode::Direct, dst.index(), src.index()));
}

/// `CVTSS2SI dst, src` — `0xF3 REX.W 0x0F 0x2D`. `REX.W` always set for a
/// 64-bit destination.
pub fn cvtss2si(buf: &mut Buffer, dst: Gpr, src: Xmm) {
    emit_xmm_to_gpr(buf, 0xF3, 0x2D, dst, src);
}

/// `CVTSD2SI dst, src` — `0xF2 REX.W 0x0F 0x2D`.
pub fn cvtsd2si(buf: &mut Buffer, dst: Gpr, src: Xmm) {
    emit_xmm_to_gpr(buf, 0xF2, 0x2D, dst, src);
}
