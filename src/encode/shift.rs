//! Shift and rotate instructions.
//!
//! A count of exactly 1 uses the one-operand form (`0xD1`); every other
//! count uses the imm8 form (`0xC1`, count byte). The ISA only defines
//! counts `0..=63` for a 64-bit operand; anything else is a caller bug
//! caught here rather than silently masked.

use crate::bits::{modrm_byte, Mode};
use crate::buffer::Buffer;
use crate::error::EmitError;
use crate::registers::Gpr;
use crate::rex::Rex;

fn emit(buf: &mut Buffer, digit: u8, rm: Gpr, count: u8) -> Result<(), EmitError> {
    if count > 63 {
        return Err(EmitError::InvalidShiftCount { count });
    }
    let rex = Rex::for_rm64(rm.is_extended());
    if let Some(byte) = rex.encode() {
        buf.push_u8(byte);
    }
    if count == 1 {
        buf.push_u8(0xD1);
        buf.push_u8(modrm_byte(Mode::Direct, digit, rm.index()));
    } else {
        buf.push_u8(0xC1);
        buf.push_u8(modrm_byte(Mode::Direct, digit, rm.index()));
        buf.push_u8(count);
    }
    Ok(())
}

/// `SHL rm, count` — `/4`.
///
/// # Errors
///
/// Returns [`EmitError::InvalidShiftCount`] if `count` is outside `0..=63`.
pub fn shl(buf: &mut Buffer, rm: Gpr, count: u8) -> Result<(), EmitError> {
    emit(buf, 4, rm, count)
}

/// `SHR rm, count` — `/5`.
///
/// # Errors
///
/// Returns [`EmitError::InvalidShiftCount`] if `count` is outside `0..=63`.
pub fn shr(buf: &mut Buffer, rm: Gpr, count: u8) -> Result<(), EmitError> {
    emit(buf, 5, rm, count)
}

/// `SAL rm, count` — `/6`, a distinct digit from `SHL`'s `/4` even though
/// the two are the same operation on this ISA.
///
/// # Errors
///
/// Returns [`EmitError::InvalidShiftCount`] if `count` is outside `0..=63`.
pub fn sal(buf: &mut Buffer, rm: Gpr, count: u8) -> Result<(), EmitError> {
    emit(buf, 6, rm, count)
}

/// `SAR rm, count` — `/7`.
///
/// # Errors
///
/// Returns [`EmitError::InvalidShiftCount`] if `count` is outside `0..=63`.
pub fn sar(buf: &mut Buffer, rm: Gpr, count: u8) -> Result<(), EmitError> {
    emit(buf, 7, rm, count)
}

/// `ROL rm, count` — `/0`.
///
/// # Errors
///
/// Returns [`EmitError::InvalidShiftCount`] if `count` is outside `0..=63`.
pub fn rol(buf: &mut Buffer, rm: Gpr, count: u8) -> Result<(), EmitError> {
    emit(buf, 0, rm, count)
}

/// `ROR rm, count` — `/1`.
///
/// # Errors
///
/// Returns [`EmitError::InvalidShiftCount`] if `count` is outside `0..=63`.
pub fn ror(buf: &mut Buffer, rm: Gpr, count: u8) -> Result<(), EmitError> {
    emit(buf, 1, rm, count)
}

/// `RCL rm, count` — `/2`.
///
/// # Errors
///
/// Returns [`EmitError::InvalidShiftCount`] if `count` is outside `0..=63`.
pub fn rcl(buf: &mut Buffer, rm: Gpr, count: u8) -> Result<(), EmitError> {
    emit(buf, 2, rm, count)
}

/// `RCR rm, count` — `/3`.
///
/// # Errors
///
/// Returns [`EmitError::InvalidShiftCount`] if `count` is outside `0..=63`.
pub fn rcr(buf: &mut Buffer, rm: Gpr, count: u8) -> Result<(), EmitError> {
    emit(buf, 3, rm, count)
}
