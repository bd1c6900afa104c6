//! ELF-64 object-file collaborator.
//!
//! This module is not part of the core emitter: it consumes the byte
//! buffers and label/branch metadata the core produces and turns them
//! into a relocatable ELF64 object, per the collaborator contract in the
//! design notes. Nothing in `branch`, `buffer`, or `encode` depends on
//! anything here.

pub mod elf;

pub use elf::{
    ObjectError, Relocation, RelocationKind, Section, Symbol, SymbolBinding, SymbolType,
    write_relocatable_object,
};
