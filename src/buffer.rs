//! The append-only byte buffer every emit operation writes into.
//!
//! `Buffer` is the sole mutable resource in this crate: every emit
//! function takes `&mut Buffer` explicitly, and a buffer never reaches
//! across threads or carries any other hidden state. See [`crate::branch`]
//! for the label table and pending-branch list it also carries.

use crate::branch::PendingBranch;
use crate::error::EmitError;

/// A growable sequence of machine-code bytes, plus the label table and
/// pending-branch list the branch engine needs.
#[derive(Debug, Default)]
pub struct Buffer {
    pub(crate) code: Vec<u8>,
    /// Indexed by [`crate::branch::LabelId`]; `None` until defined.
    pub(crate) labels: Vec<Option<u32>>,
    pub(crate) pending: Vec<PendingBranch>,
}

impl Buffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for at least `capacity` bytes
    /// before the first reallocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::with_capacity(capacity),
            labels: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Current length in bytes.
    #[must_use]
    pub fn len(&self) -> u32 {
        self.code.len() as u32
    }

    /// Whether no bytes have been emitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// The assembled bytes so far.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.code
    }

    /// Space-separated uppercase hex pairs, in byte order. Used for
    /// diagnostics, not for any code path that feeds back into assembly.
    #[must_use]
    pub fn format_hex(&self) -> String {
        let mut out = String::with_capacity(self.code.len() * 3);
        for (i, byte) in self.code.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(&format!("{byte:02X}"));
        }
        out
    }

    pub(crate) fn push_u8(&mut self, byte: u8) {
        self.code.push(byte);
    }

    pub(crate) fn push_bytes(&mut self, bytes: &[u8]) {
        self.code.extend_from_slice(bytes);
    }

    pub(crate) fn push_u16_le(&mut self, value: u16) {
        self.push_bytes(&value.to_le_bytes());
    }

    pub(crate) fn push_u32_le(&mut self, value: u32) {
        self.push_bytes(&value.to_le_bytes());
    }

    pub(crate) fn push_u64_le(&mut self, value: u64) {
        self.push_bytes(&value.to_le_bytes());
    }

    pub(crate) fn push_i32_le(&mut self, value: i32) {
        self.push_bytes(&value.to_le_bytes());
    }

    pub(crate) fn push_i64_le(&mut self, value: i64) {
        self.push_bytes(&value.to_le_bytes());
    }

    /// Overwrites `bytes.len()` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::PatchOutOfRange`] if `[offset, offset + bytes.len())`
    /// is not wholly within the buffer's current length. This is always a
    /// caller bug — there is no recovery short of fixing the call site.
    pub(crate) fn patch_bytes(&mut self, offset: u32, bytes: &[u8]) -> Result<(), EmitError> {
        let start = offset as usize;
        let end = start + bytes.len();
        if end > self.code.len() {
            return Err(EmitError::PatchOutOfRange {
                offset,
                len: bytes.len() as u32,
                buffer_len: self.code.len() as u32,
            });
        }
        self.code[start..end].copy_from_slice(bytes);
        Ok(())
    }

    pub(crate) fn patch_i32_le(&mut self, offset: u32, value: i32) -> Result<(), EmitError> {
        self.patch_bytes(offset, &value.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_lengths_sum() {
        let mut buf = Buffer::new();
        buf.push_u8(1);
        buf.push_u16_le(2);
        buf.push_u32_le(3);
        buf.push_u64_le(4);
        assert_eq!(buf.len(), 1 + 2 + 4 + 8);
    }

    #[test]
    fn format_hex_is_uppercase_and_space_separated() {
        let mut buf = Buffer::new();
        buf.push_bytes(&[0x48, 0x89, 0xD8, 0xC3]);
        assert_eq!(buf.format_hex(), "48 89 D8 C3");
    }

    #[test]
    fn patch_in_range_succeeds() {
        let mut buf = Buffer::new();
        buf.push_u32_le(0);
        buf.patch_i32_le(0, -1).unwrap();
        assert_eq!(buf.bytes(), [0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn patch_out_of_range_fails_loudly() {
        let mut buf = Buffer::new();
        buf.push_u8(0);
        let err = buf.patch_i32_le(0, 0).unwrap_err();
        assert_eq!(
            err,
            EmitError::PatchOutOfRange {
                offset: 0,
                len: 4,
                buffer_len: 1
            }
        );
    }
}
