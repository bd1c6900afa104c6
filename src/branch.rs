//! The label table and branch fix-up / shortening engine.
//!
//! A label id is an opaque handle into a flat table; a pending branch is a
//! plain tuple of primitives. Neither needs graph-shaped ownership — see
//! the design notes for why an arena-plus-index beats a linked structure
//! here.

use log::{debug, trace};

use crate::buffer::Buffer;
use crate::error::EmitError;

/// Safety net for the shortening fixed-point loop. Termination is
/// guaranteed by monotonicity (each pass only shrinks), not by this cap;
/// hitting it is a logic-bug diagnostic, not a recovery mechanism.
const MAX_SHORTEN_PASSES: u32 = 10;

/// Opaque handle naming a branch destination within one [`Buffer`].
///
/// Allocated by [`Buffer::new_label`], bound to a byte offset by
/// [`Buffer::define_label`], and referenced by zero or more branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LabelId(pub(crate) u32);

/// The branch instructions this crate can emit against a [`LabelId`].
///
/// Determines opcode selection, instruction length, and whether a short
/// (2-byte) form exists at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Call,
    Jmp,
    Je,
    Jne,
    Jg,
    Jl,
    Jge,
    Jle,
    Ja,
    Jb,
    Jae,
    Jbe,
}

impl BranchKind {
    /// Byte length of the long (32-bit displacement) form: 5 for
    /// `CALL`/`JMP`, 6 for the conditional jumps (two opcode bytes).
    pub(crate) const fn long_len(self) -> u8 {
        match self {
            BranchKind::Call | BranchKind::Jmp => 5,
            _ => 6,
        }
    }

    /// Opcode byte(s) of the long form: one byte for `CALL`/`JMP`, two
    /// (`0x0F`, secondary) for conditional jumps.
    pub(crate) const fn long_opcode(self) -> (u8, Option<u8>) {
        match self {
            BranchKind::Call => (0xE8, None),
            BranchKind::Jmp => (0xE9, None),
            BranchKind::Je => (0x0F, Some(0x84)),
            BranchKind::Jne => (0x0F, Some(0x85)),
            BranchKind::Jg => (0x0F, Some(0x8F)),
            BranchKind::Jl => (0x0F, Some(0x8C)),
            BranchKind::Jge => (0x0F, Some(0x8D)),
            BranchKind::Jle => (0x0F, Some(0x8E)),
            BranchKind::Ja => (0x0F, Some(0x87)),
            BranchKind::Jb => (0x0F, Some(0x82)),
            BranchKind::Jae => (0x0F, Some(0x83)),
            BranchKind::Jbe => (0x0F, Some(0x86)),
        }
    }

    /// Whether this kind has a 2-byte short form at all. `CALL` never
    /// shortens, regardless of distance.
    pub(crate) const fn supports_short(self) -> bool {
        !matches!(self, BranchKind::Call)
    }

    /// Opcode byte of the short form, when one exists.
    pub(crate) const fn short_opcode(self) -> Option<u8> {
        match self {
            BranchKind::Call => None,
            BranchKind::Jmp => Some(0xEB),
            BranchKind::Je => Some(0x74),
            BranchKind::Jne => Some(0x75),
            BranchKind::Jg => Some(0x7F),
            BranchKind::Jl => Some(0x7C),
            BranchKind::Jge => Some(0x7D),
            BranchKind::Jle => Some(0x7E),
            BranchKind::Ja => Some(0x77),
            BranchKind::Jb => Some(0x72),
            BranchKind::Jae => Some(0x73),
            BranchKind::Jbe => Some(0x76),
        }
    }
}

/// A branch whose displacement could not be computed at emit time because
/// its target label was not yet defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingBranch {
    /// Offset of the branch's first opcode byte.
    pub site: u32,
    /// The label this branch targets.
    pub target: LabelId,
    /// Which branch instruction this is.
    pub kind: BranchKind,
    /// Current encoded length: 5 or 6 before shortening, 2 after.
    pub len: u8,
}

impl Buffer {
    /// Allocates a new, as-yet-undefined label. Does not modify the byte
    /// stream.
    #[must_use]
    pub fn new_label(&mut self) -> LabelId {
        let id = LabelId(self.labels.len() as u32);
        self.labels.push(None);
        id
    }

    /// Binds `label` to the current buffer length.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::DuplicateLabel`] if `label` already has a
    /// definition. It is not an error to define a label before any branch
    /// references it.
    pub fn define_label(&mut self, label: LabelId) -> Result<(), EmitError> {
        let slot = &mut self.labels[label.0 as usize];
        if slot.is_some() {
            return Err(EmitError::DuplicateLabel { label });
        }
        *slot = Some(self.code.len() as u32);
        Ok(())
    }

    /// The offset `label` is bound to, if it has been defined.
    #[must_use]
    pub fn label_offset(&self, label: LabelId) -> Option<u32> {
        self.labels.get(label.0 as usize).copied().flatten()
    }

    /// All currently-defined labels, as `(id, offset)` pairs.
    pub fn labels(&self) -> impl Iterator<Item = (LabelId, u32)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(id, off)| off.map(|o| (LabelId(id as u32), o)))
    }

    /// The branches still waiting on label resolution or shortening.
    #[must_use]
    pub fn pending_branches(&self) -> &[PendingBranch] {
        &self.pending
    }

    pub(crate) fn record_pending_branch(&mut self, site: u32, target: LabelId, kind: BranchKind, len: u8) {
        self.pending.push(PendingBranch {
            site,
            target,
            kind,
            len,
        });
    }

    /// Patches every pending branch's displacement field in place, without
    /// changing any branch's length (no shortening).
    ///
    /// For each branch, `distance = target_offset - (site_offset + len)` is
    /// written as a little-endian signed 32-bit integer into the four bytes
    /// immediately before `site_offset + len`.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::UndefinedLabel`] if any pending branch targets
    /// a label with no definition.
    pub fn resolve_all(&mut self) -> Result<(), EmitError> {
        for i in 0..self.pending.len() {
            let pb = self.pending[i];
            let target_offset = self.label_offset(pb.target).ok_or(EmitError::UndefinedLabel {
                label: pb.target,
                site: pb.site,
            })?;
            let distance = target_offset as i64 - (pb.site + u32::from(pb.len)) as i64;
            trace!(
                "resolve_all: {:?} at {} -> label at {} (distance {})",
                pb.kind, pb.site, target_offset, distance
            );
            let patch_at = pb.site + u32::from(pb.len) - 4;
            self.patch_i32_le(patch_at, distance as i32)?;
        }
        Ok(())
    }

    /// Runs the branch-shortening fixed-point loop: rewrites every
    /// `CALL`/`JMP`/`Jcc` whose target now falls within `[-128, 127]` of
    /// the next instruction into its 2-byte short form, shifting trailing
    /// bytes down and repeating until nothing changes.
    ///
    /// Each pass recomputes every branch's bytes from the label table
    /// directly, so it doubles as full resolution: there is no need to
    /// call [`Buffer::resolve_all`] first, though doing so is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`EmitError::UndefinedLabel`] if any pending branch targets
    /// an undefined label, or [`EmitError::ShorteningDidNotConverge`] if
    /// the iteration cap is reached while a pass still reports a change —
    /// a logic-bug diagnostic that should never fire given the pending
    /// branch and label tables are internally consistent.
    pub fn shorten(&mut self) -> Result<(), EmitError> {
        for pb in &self.pending {
            if self.label_offset(pb.target).is_none() {
                return Err(EmitError::UndefinedLabel {
                    label: pb.target,
                    site: pb.site,
                });
            }
        }

        for iteration in 1..=MAX_SHORTEN_PASSES {
            let changed = self.shorten_pass();
            debug!("shorten: pass {iteration} changed={changed}");
            if !changed {
                return Ok(());
            }
        }
        Err(EmitError::ShorteningDidNotConverge {
            iterations: MAX_SHORTEN_PASSES,
        })
    }

    /// One left-to-right copy pass. Returns whether any branch's length
    /// changed.
    fn shorten_pass(&mut self) -> bool {
        let old = std::mem::take(&mut self.code);
        let mut new_code = Vec::with_capacity(old.len());
        let mut changed = false;

        let mut label_events: Vec<(u32, usize)> = self
            .labels
            .iter()
            .enumerate()
            .filter_map(|(id, off)| off.map(|o| (o, id)))
            .collect();
        label_events.sort_by_key(|&(offset, _)| offset);
        let mut next_label = 0usize;

        let mut cursor = 0u32;
        let flush_labels_at =
            |cursor: u32, next_label: &mut usize, labels: &mut [Option<u32>], new_len: u32| {
                while *next_label < label_events.len() && label_events[*next_label].0 == cursor {
                    labels[label_events[*next_label].1] = Some(new_len);
                    *next_label += 1;
                }
            };

        for i in 0..self.pending.len() {
            let site = self.pending[i].site;
            while cursor < site {
                flush_labels_at(cursor, &mut next_label, &mut self.labels, new_code.len() as u32);
                new_code.push(old[cursor as usize]);
                cursor += 1;
            }
            flush_labels_at(cursor, &mut next_label, &mut self.labels, new_code.len() as u32);

            let kind = self.pending[i].kind;
            let old_len = self.pending[i].len;
            let target = self.pending[i].target;
            let target_offset = self
                .label_offset(target)
                .expect("checked by caller before the shortening loop starts");
            let new_site = new_code.len() as u32;

            // A forward branch's own shrink moves everything between it and
            // its target down, including the target itself. The label table
            // still holds last pass's offset, so assume the shrink and check
            // whether that assumption is self-consistent before committing
            // to it; a backward target was already flushed to its new
            // offset earlier in this same pass and needs no such guess.
            let short_target_offset = if target_offset > site {
                target_offset.saturating_sub(u32::from(old_len) - 2)
            } else {
                target_offset
            };

            let mut shortened = false;
            if kind.supports_short() {
                let distance = short_target_offset as i64 - (new_site + 2) as i64;
                if (-128..=127).contains(&distance) {
                    new_code.push(kind.short_opcode().expect("supports_short implies an opcode"));
                    new_code.push(distance as i8 as u8);
                    shortened = true;
                }
            }
            let new_len = if shortened {
                2
            } else {
                let long_len = kind.long_len();
                let distance = target_offset as i64 - (new_site + u32::from(long_len)) as i64;
                let (opcode0, opcode1) = kind.long_opcode();
                new_code.push(opcode0);
                if let Some(opcode1) = opcode1 {
                    new_code.push(opcode1);
                }
                new_code.extend_from_slice(&(distance as i32).to_le_bytes());
                long_len
            };

            if new_len != old_len {
                changed = true;
                // A `Call` never takes `shortened = true` above, so this
                // can't fire for a kind with no short form at all.
                debug_assert!(kind.supports_short() || new_len == old_len);
            }
            self.pending[i].site = new_site;
            self.pending[i].len = new_len;
            cursor += u32::from(old_len);
        }

        while cursor < old.len() as u32 {
            flush_labels_at(cursor, &mut next_label, &mut self.labels, new_code.len() as u32);
            new_code.push(old[cursor as usize]);
            cursor += 1;
        }
        flush_labels_at(cursor, &mut next_label, &mut self.labels, new_code.len() as u32);

        self.code = new_code;
        changed
    }
}
