//! x86-64 register definitions.
//!
//! Registers with index ≥ 8 require a REX prefix to reach; see
//! [`crate::rex`] for how that prefix gets computed from the operands of
//! a given instruction.

use std::fmt;

/// One of the 16 general-purpose 64-bit registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Gpr(pub(crate) u8);

impl Gpr {
    /// Raw 4-bit register index (0..15).
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Whether encoding this register requires a REX extension bit.
    pub(crate) const fn is_extended(self) -> bool {
        self.0 >= 8
    }
}

/// Accumulator, also the implicit operand of a few string/I/O instructions.
pub const RAX: Gpr = Gpr(0);
/// Counter, used as the shift/rotate count register by `SHL/SHR/...`.
pub const RCX: Gpr = Gpr(1);
/// Data register, paired with `RAX` for wide multiply/divide results.
pub const RDX: Gpr = Gpr(2);
/// Base register.
pub const RBX: Gpr = Gpr(3);
/// Stack pointer.
pub const RSP: Gpr = Gpr(4);
/// Frame/base pointer (by convention).
pub const RBP: Gpr = Gpr(5);
/// Source index.
pub const RSI: Gpr = Gpr(6);
/// Destination index.
pub const RDI: Gpr = Gpr(7);
/// General-purpose register 8.
pub const R8: Gpr = Gpr(8);
/// General-purpose register 9.
pub const R9: Gpr = Gpr(9);
/// General-purpose register 10.
pub const R10: Gpr = Gpr(10);
/// General-purpose register 11.
pub const R11: Gpr = Gpr(11);
/// General-purpose register 12.
pub const R12: Gpr = Gpr(12);
/// General-purpose register 13.
pub const R13: Gpr = Gpr(13);
/// General-purpose register 14.
pub const R14: Gpr = Gpr(14);
/// General-purpose register 15.
pub const R15: Gpr = Gpr(15);

const GPR_NAMES: [&str; 16] = [
    "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi", "r8", "r9", "r10", "r11", "r12",
    "r13", "r14", "r15",
];

impl fmt::Display for Gpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(GPR_NAMES[self.0 as usize])
    }
}

/// One of the 16 SSE registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Xmm(pub(crate) u8);

impl Xmm {
    /// Raw 4-bit register index (0..15).
    pub const fn index(self) -> u8 {
        self.0
    }

    pub(crate) const fn is_extended(self) -> bool {
        self.0 >= 8
    }
}

pub const XMM0: Xmm = Xmm(0);
pub const XMM1: Xmm = Xmm(1);
pub const XMM2: Xmm = Xmm(2);
pub const XMM3: Xmm = Xmm(3);
pub const XMM4: Xmm = Xmm(4);
pub const XMM5: Xmm = Xmm(5);
pub const XMM6: Xmm = Xmm(6);
pub const XMM7: Xmm = Xmm(7);
pub const XMM8: Xmm = Xmm(8);
pub const XMM9: Xmm = Xmm(9);
pub const XMM10: Xmm = Xmm(10);
pub const XMM11: Xmm = Xmm(11);
pub const XMM12: Xmm = Xmm(12);
pub const XMM13: Xmm = Xmm(13);
pub const XMM14: Xmm = Xmm(14);
pub const XMM15: Xmm = Xmm(15);

impl fmt::Display for Xmm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "xmm{}", self.0)
    }
}

/// One of the 8 x87 FPU stack registers. No REX extension exists for x87.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct St(pub(crate) u8);

impl St {
    /// Raw 3-bit register index (0..7).
    pub const fn index(self) -> u8 {
        self.0
    }
}

pub const ST0: St = St(0);
pub const ST1: St = St(1);
pub const ST2: St = St(2);
pub const ST3: St = St(3);
pub const ST4: St = St(4);
pub const ST5: St = St(5);
pub const ST6: St = St(6);
pub const ST7: St = St(7);

impl fmt::Display for St {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "st{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_boundary() {
        assert!(!RDI.is_extended());
        assert!(R8.is_extended());
        assert!(!XMM7.is_extended());
        assert!(XMM8.is_extended());
    }

    #[test]
    fn display() {
        assert_eq!(RAX.to_string(), "rax");
        assert_eq!(R15.to_string(), "r15");
        assert_eq!(XMM9.to_string(), "xmm9");
        assert_eq!(ST3.to_string(), "st3");
    }
}
