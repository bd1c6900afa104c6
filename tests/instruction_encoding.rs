#[cfg(test)]
mod util;

use x64emit::encode::{atomic, bitops, control, integer, shift, sse, x87};
use x64emit::registers::{R8, R9, RAX, RBX, RCX, ST1, XMM0, XMM1};
use util::hex_of;

#[test]
fn mov_reg_reg() {
    assert_eq!(hex_of(|b| integer::mov(b, RAX, RBX)), "48 89 D8");
    assert_eq!(hex_of(|b| integer::mov(b, R8, R9)), "4D 89 C8");
}

#[test]
fn mov_imm64() {
    assert_eq!(
        hex_of(|b| integer::mov_imm64(b, RAX, 42)),
        "48 B8 2A 00 00 00 00 00 00 00"
    );
}

#[test]
fn add_then_ret() {
    assert_eq!(
        hex_of(|b| {
            integer::add(b, RAX, RBX);
            control::ret(b);
        }),
        "48 01 D8 C3"
    );
}

#[test]
fn arithmetic_reg_reg_table() {
    assert_eq!(hex_of(|b| integer::sub(b, RAX, RBX)), "48 29 D8");
    assert_eq!(hex_of(|b| integer::and(b, RAX, RBX)), "48 21 D8");
    assert_eq!(hex_of(|b| integer::or(b, RAX, RBX)), "48 09 D8");
    assert_eq!(hex_of(|b| integer::xor(b, RAX, RBX)), "48 31 D8");
    assert_eq!(hex_of(|b| integer::cmp(b, RAX, RBX)), "48 39 D8");
    assert_eq!(hex_of(|b| integer::test(b, RAX, RBX)), "48 85 D8");
    assert_eq!(hex_of(|b| integer::xchg(b, RAX, RBX)), "48 87 D8");
}

#[test]
fn imul_and_bitscan_put_dst_in_reg_field() {
    assert_eq!(hex_of(|b| integer::imul(b, RAX, RBX)), "48 0F AF C3");
    assert_eq!(hex_of(|b| bitops::bsf(b, RAX, RBX)), "48 0F BC C3");
    assert_eq!(hex_of(|b| bitops::bsr(b, RAX, RBX)), "48 0F BD C3");
}

#[test]
fn imm32_group_opcodes() {
    assert_eq!(hex_of(|b| integer::add_imm32(b, RCX, -1)), "48 81 C1 FF FF FF FF");
    assert_eq!(hex_of(|b| integer::cmp_imm32(b, RCX, 0)), "48 81 F9 00 00 00 00");
}

#[test]
fn unary_group_opcodes() {
    assert_eq!(hex_of(|b| integer::not(b, RAX)), "48 F7 D0");
    assert_eq!(hex_of(|b| integer::neg(b, RAX)), "48 F7 D8");
    assert_eq!(hex_of(|b| integer::mul(b, RAX)), "48 F7 E0");
    assert_eq!(hex_of(|b| integer::div(b, RAX)), "48 F7 F0");
    assert_eq!(hex_of(|b| integer::idiv(b, RAX)), "48 F7 F8");
    assert_eq!(hex_of(|b| integer::inc(b, RAX)), "48 FF C0");
    assert_eq!(hex_of(|b| integer::dec(b, RAX)), "48 FF C8");
}

#[test]
fn shift_by_one_vs_by_n() {
    assert_eq!(hex_of(|b| shift::shl(b, RAX, 1).unwrap()), "48 D1 E0");
    assert_eq!(hex_of(|b| shift::shr(b, RAX, 5).unwrap()), "48 C1 E8 05");
    assert_eq!(hex_of(|b| shift::rol(b, RAX, 1).unwrap()), "48 D1 C0");
}

#[test]
fn shift_count_out_of_range_is_rejected() {
    let mut buf = x64emit::Buffer::new();
    let err = shift::sar(&mut buf, RAX, 200).unwrap_err();
    assert_eq!(err, x64emit::EmitError::InvalidShiftCount { count: 200 });
}

#[test]
fn bit_test_family() {
    assert_eq!(hex_of(|b| bitops::bt(b, RAX, 0)), "48 0F BA E0 00");
    assert_eq!(hex_of(|b| bitops::bts(b, RAX, 1)), "48 0F BA E8 01");
    assert_eq!(hex_of(|b| bitops::btr(b, RAX, 2)), "48 0F BA F0 02");
    assert_eq!(hex_of(|b| bitops::btc(b, RAX, 3)), "48 0F BA F8 03");
}

#[test]
fn atomic_lock_prefix_and_fences() {
    assert_eq!(hex_of(|b| atomic::lock_cmpxchg(b, RAX, RBX)), "F0 48 0F B1 D8");
    assert_eq!(hex_of(|b| atomic::lock_xadd(b, RAX, RBX)), "F0 48 0F C1 D8");
    assert_eq!(hex_of(atomic::mfence), "0F AE F0");
    assert_eq!(hex_of(atomic::sfence), "0F AE F8");
    assert_eq!(hex_of(atomic::lfence), "0F AE E8");
}

#[test]
fn prefetch_hints() {
    assert_eq!(hex_of(|b| atomic::prefetchnta(b, RAX)), "0F 18 C0");
    assert_eq!(hex_of(|b| atomic::prefetcht0(b, RAX)), "0F 18 C8");
}

#[test]
fn sse_scalar_arithmetic() {
    assert_eq!(hex_of(|b| sse::addss(b, XMM0, XMM1)), "F3 0F 58 C1");
    assert_eq!(hex_of(|b| sse::addsd(b, XMM0, XMM1)), "F2 0F 58 C1");
    assert_eq!(hex_of(|b| sse::divss(b, XMM0, XMM1)), "F3 0F 5E C1");
    assert_eq!(hex_of(|b| sse::sqrtsd(b, XMM0, XMM1)), "F2 0F 51 C1");
}

#[test]
fn sse_conversions_carry_rex_w() {
    assert_eq!(hex_of(|b| sse::cvtsi2sd(b, XMM0, RAX)), "F2 48 0F 2A C0");
    assert_eq!(hex_of(|b| sse::cvtsd2si(b, RAX, XMM0)), "F2 48 0F 2D C0");
}

#[test]
fn x87_stack_forms() {
    assert_eq!(hex_of(|b| x87::fld(b, ST1)), "D9 C1");
    assert_eq!(hex_of(|b| x87::fstp(b, ST1)), "DD D9");
    assert_eq!(hex_of(x87::fsqrt), "D9 FA");
    assert_eq!(hex_of(x87::fchs), "D9 E0");
}

#[test]
fn control_misc() {
    assert_eq!(hex_of(control::ret), "C3");
    assert_eq!(hex_of(control::nop), "90");
    assert_eq!(hex_of(control::syscall), "0F 05");
    assert_eq!(hex_of(control::int3), "CC");
    assert_eq!(hex_of(|b| control::int(b, 0x80)), "CD 80");
    assert_eq!(hex_of(|b| control::push(b, RAX)), "50");
    assert_eq!(hex_of(|b| control::pop(b, RAX)), "58");
}
