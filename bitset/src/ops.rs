//! Merge-join algorithms over two [Blocks] sequences.
//!
//! Every binary operation walks both sequences with one cursor each, ordered by offset. Blocks at
//! the same offset are combined with the operation's bitwise combinator; a block present on only
//! one side is carried into the result when the operation keeps that side. Results never contain
//! empty blocks, so none of these functions materialize intermediate dense arrays.

use crate::{Block, Blocks};
use core::cmp::Ordering;

/// A binary set operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    Union,
    Intersection,
    Difference,
    SymmetricDifference,
}

impl Op {
    /// Combines the masks of two blocks at the same offset.
    #[inline]
    const fn combine(self, a: u64, b: u64) -> u64 {
        match self {
            Self::Union => a | b,
            Self::Intersection => a & b,
            Self::Difference => a & !b,
            Self::SymmetricDifference => a ^ b,
        }
    }

    /// Returns true if blocks only present on the left are part of the result.
    #[inline]
    const fn keeps_left(self) -> bool {
        !matches!(self, Self::Intersection)
    }

    /// Returns true if blocks only present on the right are part of the result.
    #[inline]
    const fn keeps_right(self) -> bool {
        matches!(self, Self::Union | Self::SymmetricDifference)
    }

    /// Upper bound on the number of blocks in the result.
    #[inline]
    fn max_blocks(self, left: usize, right: usize) -> usize {
        match self {
            Self::Union | Self::SymmetricDifference => left + right,
            Self::Intersection => left.min(right),
            Self::Difference => left,
        }
    }
}

/// Computes `a <op> b` as a new sequence.
pub(crate) fn merge(op: Op, a: &Blocks, b: &Blocks) -> Blocks {
    let (a, b) = (a.as_slice(), b.as_slice());
    let mut result = Blocks::with_capacity(op.max_blocks(a.len(), b.len()));

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (left, right) = (a[i], b[j]);
        match left.offset().cmp(&right.offset()) {
            Ordering::Less => {
                if op.keeps_left() {
                    result.push(left);
                }
                i += 1;
            }
            Ordering::Greater => {
                if op.keeps_right() {
                    result.push(right);
                }
                j += 1;
            }
            Ordering::Equal => {
                let bits = op.combine(left.bits(), right.bits());
                result.push(Block::new(left.offset(), bits));
                i += 1;
                j += 1;
            }
        }
    }

    // At most one side has a tail left
    if op.keeps_left() {
        result.extend_from_slice(&a[i..]);
    }
    if op.keeps_right() {
        result.extend_from_slice(&b[j..]);
    }
    result
}

/// Computes the number of members of `a <op> b` without constructing it.
pub(crate) fn cardinality(op: Op, a: &Blocks, b: &Blocks) -> u64 {
    let (a, b) = (a.as_slice(), b.as_slice());
    let mut count = 0;

    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (left, right) = (a[i], b[j]);
        match left.offset().cmp(&right.offset()) {
            Ordering::Less => {
                if op.keeps_left() {
                    count += left.count();
                }
                i += 1;
            }
            Ordering::Greater => {
                if op.keeps_right() {
                    count += right.count();
                }
                j += 1;
            }
            Ordering::Equal => {
                let bits = op.combine(left.bits(), right.bits());
                count += Block::new(left.offset(), bits).count();
                i += 1;
                j += 1;
            }
        }
    }

    if op.keeps_left() {
        count += a[i..].iter().map(Block::count).sum::<u64>();
    }
    if op.keeps_right() {
        count += b[j..].iter().map(Block::count).sum::<u64>();
    }
    count
}

/// Replaces `a` with `a <op> b`, reusing its storage.
pub(crate) fn merge_in_place(op: Op, a: &mut Blocks, b: &Blocks) {
    let b = b.as_slice();

    if !op.keeps_right() {
        // Only blocks of `a` can survive: combine matches in place and zero the unmatched blocks
        // of an intersection
        let mut j = 0;
        for block in a.storage_mut().iter_mut() {
            while j < b.len() && b[j].offset() < block.offset() {
                j += 1;
            }
            if j < b.len() && b[j].offset() == block.offset() {
                block.set_bits(op.combine(block.bits(), b[j].bits()));
                j += 1;
            } else if !op.keeps_left() {
                block.set_bits(0);
            }
        }
        a.prune();
        return;
    }

    // Count the blocks only present in `b`, which the result must make room for
    let missing = {
        let current = a.as_slice();
        let (mut i, mut missing) = (0, 0);
        for right in b {
            while i < current.len() && current[i].offset() < right.offset() {
                i += 1;
            }
            if i == current.len() || current[i].offset() != right.offset() {
                missing += 1;
            }
        }
        missing
    };

    // Grow, then merge from the back so no unread block of `a` is overwritten
    let storage = a.storage_mut();
    let len = storage.len();
    storage.resize(len + missing, Block::default());
    let (mut i, mut j, mut k) = (len, b.len(), len + missing);
    while j > 0 {
        k -= 1;
        let right = b[j - 1];
        match (i > 0).then(|| storage[i - 1].offset().cmp(&right.offset())) {
            Some(Ordering::Greater) => {
                storage[k] = storage[i - 1];
                i -= 1;
            }
            Some(Ordering::Equal) => {
                let left = storage[i - 1];
                storage[k] = Block::new(left.offset(), op.combine(left.bits(), right.bits()));
                i -= 1;
                j -= 1;
            }
            Some(Ordering::Less) | None => {
                storage[k] = right;
                j -= 1;
            }
        }
    }
    debug_assert_eq!(i, k, "unmerged prefix of `a` must already be in place");
    a.prune();
}

/// Returns true if `a` contains every member of `b` and at least one member `b` lacks.
pub(crate) fn is_strict_superset(a: &Blocks, b: &Blocks) -> bool {
    let (a, b) = (a.as_slice(), b.as_slice());
    if a.len() < b.len() {
        return false;
    }

    let mut extra = false;
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let (left, right) = (a[i], b[j]);
        match left.offset().cmp(&right.offset()) {
            Ordering::Less => {
                extra = true;
                i += 1;
            }
            Ordering::Equal => {
                if right.bits() & !left.bits() != 0 {
                    return false;
                }
                extra |= left.bits() != right.bits();
                i += 1;
                j += 1;
            }
            // `b` has a block `a` lacks
            Ordering::Greater => return false,
        }
    }

    // `a` was exhausted before `b`
    if j < b.len() {
        return false;
    }
    extra || i < a.len()
}
