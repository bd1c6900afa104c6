#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod branch;
pub mod buffer;
pub mod encode;
pub mod error;
pub mod registers;

pub(crate) mod bits;
pub(crate) mod rex;

#[cfg(feature = "elf")]
pub mod object;

pub use branch::{BranchKind, LabelId, PendingBranch};
pub use buffer::Buffer;
pub use error::EmitError;
