mod util;

use x64emit::encode::{branch, control, integer};
use x64emit::registers::{RAX, RBX};
use util::hex_of;

#[test]
fn mov_reg_reg() {
    assert_eq!(hex_of(|b| integer::mov(b, RAX, RBX)), "48 89 D8");
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
fn short_jump_after_shortening() {
    let mut buf = x64emit::Buffer::new();
    let l = buf.new_label();
    branch::emit_jmp(&mut buf, l);
    control::nop(&mut buf);
    control::nop(&mut buf);
    control::nop(&mut buf);
    buf.define_label(l).unwrap();
    control::ret(&mut buf);
    buf.resolve_all().unwrap();
    buf.shorten().unwrap();
    assert_eq!(buf.format_hex(), "EB 03 90 90 90 C3");
}

#[test]
fn long_jump_no_shortening_possible() {
    let mut buf = x64emit::Buffer::new();
    let l = buf.new_label();
    branch::emit_jmp(&mut buf, l);
    for _ in 0..200 {
        control::nop(&mut buf);
    }
    buf.define_label(l).unwrap();
    control::ret(&mut buf);
    buf.resolve_all().unwrap();
    buf.shorten().unwrap();

    let mut expected = vec![0xE9, 0xC8, 0x00, 0x00, 0x00];
    expected.extend(std::iter::repeat(0x90).take(200));
    expected.push(0xC3);
    assert_eq!(buf.bytes(), expected.as_slice());
    assert_eq!(buf.len() as usize, 206);
}

#[test]
fn conditional_short_jump() {
    let mut buf = x64emit::Buffer::new();
    integer::cmp(&mut buf, RAX, RBX);
    let l = buf.new_label();
    branch::emit_jg(&mut buf, l);
    integer::mov(&mut buf, RAX, RBX);
    buf.define_label(l).unwrap();
    control::ret(&mut buf);
    buf.resolve_all().unwrap();
    buf.shorten().unwrap();
    assert_eq!(buf.format_hex(), "48 39 D8 7F 03 48 89 D8 C3");
}
