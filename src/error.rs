//! The error taxonomy for every fallible operation in this crate.
//!
//! Every variant here is a caller bug, not a transient condition: none is
//! recoverable by retrying the same call.

use core::fmt;
use std::error::Error;

use crate::branch::LabelId;

/// A request this crate refuses to carry out, because doing so would
/// silently produce incorrect machine code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    /// [`Buffer::resolve_all`](crate::buffer::Buffer::resolve_all) or
    /// [`Buffer::shorten`](crate::buffer::Buffer::shorten) found a pending
    /// branch whose target label was never defined.
    UndefinedLabel {
        /// The label that was referenced but never defined.
        label: LabelId,
        /// The byte offset of the branch that references it.
        site: u32,
    },
    /// [`Buffer::define_label`](crate::buffer::Buffer::define_label) was
    /// called twice for the same label id.
    DuplicateLabel {
        /// The label id that already has a definition.
        label: LabelId,
    },
    /// An in-place patch targeted bytes beyond the buffer's current length.
    PatchOutOfRange {
        /// The requested patch offset.
        offset: u32,
        /// The number of bytes the patch would have written.
        len: u32,
        /// The buffer's length at the time of the request.
        buffer_len: u32,
    },
    /// A shift/rotate count fell outside the valid `0..=63` range.
    InvalidShiftCount {
        /// The rejected count.
        count: u8,
    },
    /// The branch-shortening fixed-point loop hit its iteration cap while
    /// still finding branches to shrink. Shortening is monotone and should
    /// always converge well before the cap; hitting it means the pending
    /// branch table or label table is inconsistent.
    ShorteningDidNotConverge {
        /// The iteration cap that was reached.
        iterations: u32,
    },
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmitError::UndefinedLabel { label, site } => write!(
                f,
                "branch at offset {site} targets label {label:?}, which was never defined"
            ),
            EmitError::DuplicateLabel { label } => {
                write!(f, "label {label:?} was already defined")
            }
            EmitError::PatchOutOfRange {
                offset,
                len,
                buffer_len,
            } => write!(
                f,
                "patch of {len} byte(s) at offset {offset} falls outside the buffer (length {buffer_len})"
            ),
            EmitError::InvalidShiftCount { count } => {
                write!(f, "shift count {count} is outside the valid range 0..=63")
            }
            EmitError::ShorteningDidNotConverge { iterations } => write!(
                f,
                "branch shortening did not reach a fixed point after {iterations} iterations"
            ),
        }
    }
}

impl Error for EmitError {}
