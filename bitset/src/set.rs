//! The [SparseBitSet] type.

use crate::{
    ops::{self, Op},
    word::{self, FULL_WORD, WORD_BITS},
    Block, Blocks, Error,
};
use commonware_codec::FixedSize;
use core::{
    fmt::{self, Formatter, Write as _},
    iter::FusedIterator,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Sub, SubAssign},
};

/// Fraction (as a divisor) of a size hint's 64-wide chunks expected to be populated.
const BIT_DENSITY_DIVISOR: u64 = 10;

/// Upper bound on the number of blocks preallocated from a size hint.
const MAX_PREALLOCATED_BLOCKS: u64 = 1024;

/// A set of non-negative integers optimized for sparse membership.
///
/// Members are stored as a sorted sequence of `(offset, bits)` [Block]s, one per populated
/// 64-wide chunk of the domain, so memory is proportional to the number of populated chunks
/// rather than to the largest member. Membership lookups are logarithmic in the number of
/// populated blocks and all binary operations are linear merges of the two block sequences.
///
/// Mutators that cannot fail return `&mut Self` so calls can be chained. [Self::flip] can fail
/// and returns a [Result], so a chain only continues on success.
///
/// The set is plain owned data: share it across threads behind a lock, or give each worker its
/// own clone and merge the results.
///
/// # Example
///
/// ```
/// use commonware_bitset::SparseBitSet;
///
/// let mut set = SparseBitSet::new();
/// set.set(1).set(3).set(3);
/// assert_eq!(set.count(), 2);
/// assert!(!set.test(2));
/// assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3]);
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct SparseBitSet {
    blocks: Blocks,
}

impl SparseBitSet {
    /// Creates an empty set.
    #[inline]
    pub const fn new() -> Self {
        Self {
            blocks: Blocks::new(),
        }
    }

    /// Creates an empty set sized for a domain of roughly `size_hint` integers.
    ///
    /// A hint of `0` yields an ordinary empty set.
    pub fn with_size_hint(size_hint: u64) -> Self {
        let capacity = (size_hint / WORD_BITS / BIT_DENSITY_DIVISOR).min(MAX_PREALLOCATED_BLOCKS);
        Self {
            blocks: Blocks::with_capacity(capacity as usize),
        }
    }

    /// Returns the underlying block sequence.
    #[inline]
    pub fn blocks(&self) -> &Blocks {
        &self.blocks
    }

    /// Returns the number of populated 64-wide chunks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    // ---------- Point operations ----------

    /// Returns true if `n` is a member.
    #[inline]
    pub fn test(&self, n: u64) -> bool {
        self.blocks.test_bit(n)
    }

    /// Adds `n` to the set.
    #[inline]
    pub fn set(&mut self, n: u64) -> &mut Self {
        self.blocks.set_bit(n);
        self
    }

    /// Removes `n` from the set. Removing a non-member is a no-op.
    #[inline]
    pub fn clear(&mut self, n: u64) -> &mut Self {
        self.blocks.clear_bit(n);
        self
    }

    /// Adds `n` if `value` is true, removes it otherwise.
    #[inline]
    pub fn set_to(&mut self, n: u64, value: bool) -> &mut Self {
        if value {
            self.set(n)
        } else {
            self.clear(n)
        }
    }

    /// Toggles membership of `n`.
    ///
    /// Flipping only works within populated chunks: if no member shares `n`'s 64-wide chunk,
    /// this returns [Error::ItemNotFound] and leaves the set unchanged.
    #[inline]
    pub fn flip(&mut self, n: u64) -> Result<&mut Self, Error> {
        self.blocks.flip_bit(n)?;
        Ok(self)
    }

    /// Removes every member.
    #[inline]
    pub fn clear_all(&mut self) -> &mut Self {
        self.blocks.clear();
        self
    }

    // ---------- Queries ----------

    /// Returns the lowest member greater than or equal to `n`.
    pub fn next_set(&self, n: u64) -> Option<u64> {
        let (offset, bit) = word::split(n);
        let blocks = self.blocks.as_slice();
        let next = match self.blocks.search(offset) {
            Ok(index) => {
                let remaining = blocks[index].bits() & (FULL_WORD << bit);
                if remaining != 0 {
                    return Some(word::combine(offset, word::trailing_zeros(remaining)));
                }
                index + 1
            }
            Err(index) => index,
        };
        blocks
            .get(next)
            .map(|block| word::combine(block.offset(), word::trailing_zeros(block.bits())))
    }

    /// Returns an iterator over the members in increasing order.
    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        self.iter_from(0)
    }

    /// Returns an iterator over the members greater than or equal to `start`, in increasing
    /// order.
    #[inline]
    pub fn iter_from(&self, start: u64) -> Iter<'_> {
        Iter {
            set: self,
            next: Some(start),
        }
    }

    /// Returns the smallest member.
    pub fn min(&self) -> Option<u64> {
        self.blocks
            .first()
            .map(|block| word::combine(block.offset(), word::trailing_zeros(block.bits())))
    }

    /// Returns the largest member.
    pub fn max(&self) -> Option<u64> {
        self.blocks
            .last()
            .map(|block| word::combine(block.offset(), word::highest_bit(block.bits())))
    }

    /// Returns the number of members.
    #[inline]
    pub fn cardinality(&self) -> u64 {
        self.blocks.iter().map(Block::count).sum()
    }

    /// Alias for [Self::cardinality].
    #[inline]
    pub fn count(&self) -> u64 {
        self.cardinality()
    }

    /// Returns true if the set has no members.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Alias for [Self::is_empty].
    #[inline]
    pub fn none(&self) -> bool {
        self.is_empty()
    }

    /// Returns true if the set has at least one member.
    #[inline]
    pub fn any(&self) -> bool {
        !self.is_empty()
    }

    /// Returns true if every integer from `0` up to and including the largest member is a
    /// member. The empty set vacuously satisfies this.
    pub fn all(&self) -> bool {
        let Some((last, rest)) = self.blocks.as_slice().split_last() else {
            return true;
        };
        for (expected, block) in (0u64..).zip(rest) {
            if block.offset() != expected || block.bits() != FULL_WORD {
                return false;
            }
        }

        // The final block must hold a contiguous run starting at bit 0
        last.offset() == rest.len() as u64 && last.bits() & last.bits().wrapping_add(1) == 0
    }

    /// Returns true if every member of `other` is a member of `self`.
    pub fn is_superset(&self, other: &Self) -> bool {
        other.is_empty() || ops::cardinality(Op::Difference, &other.blocks, &self.blocks) == 0
    }

    /// Returns true if `self` is a superset of `other` with at least one additional member.
    ///
    /// Equal sets are not strict supersets of each other.
    pub fn is_strict_superset(&self, other: &Self) -> bool {
        ops::is_strict_superset(&self.blocks, &other.blocks)
    }

    /// Overwrites `dst` with the contents of `self`, reusing its allocation.
    ///
    /// Returns the number of bytes of block data copied.
    pub fn copy_into(&self, dst: &mut Self) -> usize {
        dst.blocks.clone_from(&self.blocks);
        self.blocks.len() * Block::SIZE
    }

    // ---------- Set algebra ----------

    /// Returns the members of `self` that are not members of `other`.
    pub fn difference(&self, other: &Self) -> Self {
        self.merge(Op::Difference, other)
    }

    /// Removes the members of `other` from `self`.
    pub fn in_place_difference(&mut self, other: &Self) -> &mut Self {
        self.merge_in_place(Op::Difference, other)
    }

    /// Returns the size of [Self::difference] without constructing it.
    pub fn difference_cardinality(&self, other: &Self) -> u64 {
        ops::cardinality(Op::Difference, &self.blocks, &other.blocks)
    }

    /// Returns the members common to `self` and `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        self.merge(Op::Intersection, other)
    }

    /// Keeps only the members of `self` that are also members of `other`.
    pub fn in_place_intersection(&mut self, other: &Self) -> &mut Self {
        self.merge_in_place(Op::Intersection, other)
    }

    /// Returns the size of [Self::intersection] without constructing it.
    pub fn intersection_cardinality(&self, other: &Self) -> u64 {
        ops::cardinality(Op::Intersection, &self.blocks, &other.blocks)
    }

    /// Returns the members of either `self` or `other`.
    pub fn union(&self, other: &Self) -> Self {
        self.merge(Op::Union, other)
    }

    /// Adds the members of `other` to `self`.
    pub fn in_place_union(&mut self, other: &Self) -> &mut Self {
        self.merge_in_place(Op::Union, other)
    }

    /// Returns the size of [Self::union] without constructing it.
    pub fn union_cardinality(&self, other: &Self) -> u64 {
        ops::cardinality(Op::Union, &self.blocks, &other.blocks)
    }

    /// Returns the members of exactly one of `self` and `other`.
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        self.merge(Op::SymmetricDifference, other)
    }

    /// Replaces `self` with the members of exactly one of `self` and `other`.
    pub fn in_place_symmetric_difference(&mut self, other: &Self) -> &mut Self {
        self.merge_in_place(Op::SymmetricDifference, other)
    }

    /// Returns the size of [Self::symmetric_difference] without constructing it.
    pub fn symmetric_difference_cardinality(&self, other: &Self) -> u64 {
        ops::cardinality(Op::SymmetricDifference, &self.blocks, &other.blocks)
    }

    /// Returns the integers in `[0, max)` that are not members, where `max` is the largest
    /// member.
    ///
    /// The set is unbounded above, so the complement is taken relative to the largest member
    /// only. This makes the operation lossy: `s.complement().complement()` generally differs from
    /// `s` (for example, the complement of `{0, 5}` is `{1, 2, 3, 4}`, whose complement is
    /// `{0}`). The empty set complements to the empty set.
    pub fn complement(&self) -> Self {
        let Some((last, rest)) = self.blocks.as_slice().split_last() else {
            return Self::new();
        };

        let mut blocks = Blocks::new();
        let mut next = 0;
        for block in rest {
            for offset in next..block.offset() {
                blocks.push(Block::new(offset, FULL_WORD));
            }
            blocks.push(Block::new(block.offset(), !block.bits()));
            next = block.offset() + 1;
        }
        for offset in next..last.offset() {
            blocks.push(Block::new(offset, FULL_WORD));
        }

        // Only bits below the largest member belong to the bounded domain
        let high = word::highest_bit(last.bits());
        let below = match high {
            0 => 0,
            _ => word::mask_through(high - 1),
        };
        blocks.push(Block::new(last.offset(), !last.bits() & below));
        Self { blocks }
    }

    fn merge(&self, op: Op, other: &Self) -> Self {
        Self {
            blocks: ops::merge(op, &self.blocks, &other.blocks),
        }
    }

    fn merge_in_place(&mut self, op: Op, other: &Self) -> &mut Self {
        ops::merge_in_place(op, &mut self.blocks, &other.blocks);
        self
    }
}

// ---------- Conversions ----------

impl From<Blocks> for SparseBitSet {
    fn from(blocks: Blocks) -> Self {
        Self { blocks }
    }
}

impl From<SparseBitSet> for Blocks {
    fn from(set: SparseBitSet) -> Self {
        set.blocks
    }
}

impl FromIterator<u64> for SparseBitSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<u64> for SparseBitSet {
    fn extend<I: IntoIterator<Item = u64>>(&mut self, iter: I) {
        for n in iter {
            self.set(n);
        }
    }
}

// ---------- Debug ----------

impl fmt::Debug for SparseBitSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        // For very large sets, only show a preview
        const MAX_DISPLAY: usize = 64;

        f.write_str("SparseBitSet{")?;
        let mut members = self.iter();
        for (i, n) in members.by_ref().take(MAX_DISPLAY).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{n}")?;
        }
        if members.next().is_some() {
            f.write_str(", ...")?;
        }
        f.write_char('}')
    }
}

// ---------- Operators ----------

impl BitOr for &SparseBitSet {
    type Output = SparseBitSet;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitAnd for &SparseBitSet {
    type Output = SparseBitSet;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.intersection(rhs)
    }
}

impl BitXor for &SparseBitSet {
    type Output = SparseBitSet;

    fn bitxor(self, rhs: Self) -> Self::Output {
        self.symmetric_difference(rhs)
    }
}

impl Sub for &SparseBitSet {
    type Output = SparseBitSet;

    fn sub(self, rhs: Self) -> Self::Output {
        self.difference(rhs)
    }
}

impl BitOrAssign<&SparseBitSet> for SparseBitSet {
    fn bitor_assign(&mut self, rhs: &SparseBitSet) {
        self.in_place_union(rhs);
    }
}

impl BitAndAssign<&SparseBitSet> for SparseBitSet {
    fn bitand_assign(&mut self, rhs: &SparseBitSet) {
        self.in_place_intersection(rhs);
    }
}

impl BitXorAssign<&SparseBitSet> for SparseBitSet {
    fn bitxor_assign(&mut self, rhs: &SparseBitSet) {
        self.in_place_symmetric_difference(rhs);
    }
}

impl SubAssign<&SparseBitSet> for SparseBitSet {
    fn sub_assign(&mut self, rhs: &SparseBitSet) {
        self.in_place_difference(rhs);
    }
}

// ---------- Iterator ----------

/// Iterator over the members of a [SparseBitSet] in increasing order.
///
/// Each step is a [SparseBitSet::next_set] query from just past the previous member, so the
/// iterator holds no cursor into the block sequence.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    set: &'a SparseBitSet,

    /// Position to resume the search from, or `None` once exhausted.
    next: Option<u64>,
}

impl Iterator for Iter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        let found = self.set.next_set(self.next?);
        self.next = found.and_then(|n| n.checked_add(1));
        found
    }
}

impl FusedIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a SparseBitSet {
    type Item = u64;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "arbitrary")]
impl arbitrary::Arbitrary<'_> for SparseBitSet {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        // Keep offsets clustered so that generated sets overlap
        const MAX_OFFSET: u64 = 1024;

        let num_blocks: usize = u.int_in_range(0..=64)?;
        let mut set = Self::new();
        for _ in 0..num_blocks {
            let offset = u.int_in_range(0..=MAX_OFFSET)?;
            let bits: u64 = u.arbitrary()?;
            if bits == 0 {
                continue;
            }
            let block = Self::from(
                Blocks::try_from(vec![Block::new(offset, bits)])
                    .map_err(|_| arbitrary::Error::IncorrectFormat)?,
            );
            set.in_place_union(&block);
        }
        Ok(set)
    }
}
