//! Ordered sequence of [Block]s backing a [crate::SparseBitSet].
//!
//! # Invariants
//!
//! - Offsets are strictly increasing (no duplicates).
//! - No stored block has an empty mask.
//!
//! Memory is therefore proportional to the number of populated 64-wide chunks of the domain, not
//! to the size of the domain itself.

use crate::{word, Block, Error};
use core::slice;

/// A sorted, offset-unique sequence of non-empty [Block]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Blocks(Vec<Block>);

impl Blocks {
    /// Creates an empty sequence.
    #[inline]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates an empty sequence with room for `capacity` blocks.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Returns the number of populated blocks.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if no block is populated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the blocks in offset order.
    #[inline]
    pub fn as_slice(&self) -> &[Block] {
        &self.0
    }

    /// Returns an iterator over the blocks in offset order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Block> {
        self.0.iter()
    }

    /// Returns the block with the lowest offset.
    #[inline]
    pub fn first(&self) -> Option<&Block> {
        self.0.first()
    }

    /// Returns the block with the highest offset.
    #[inline]
    pub fn last(&self) -> Option<&Block> {
        self.0.last()
    }

    /// Removes every block.
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Locates the block at `offset`.
    ///
    /// Returns `Ok(index)` if it exists, or `Err(index)` with the position a block at `offset`
    /// would have to be inserted at to keep the sequence sorted.
    #[inline]
    pub fn search(&self, offset: u64) -> Result<usize, usize> {
        self.0.binary_search_by_key(&offset, Block::offset)
    }

    /// Returns the block at `offset`, if populated.
    #[inline]
    pub fn get(&self, offset: u64) -> Option<&Block> {
        self.search(offset).ok().map(|index| &self.0[index])
    }

    /// Sets the bit at `position`, creating its block if needed.
    pub fn set_bit(&mut self, position: u64) {
        let (offset, bit) = word::split(position);
        match self.search(offset) {
            Ok(index) => self.0[index].set(bit),
            Err(index) => self.0.insert(index, Block::single(offset, bit)),
        }
    }

    /// Clears the bit at `position`, dropping its block if it becomes empty.
    ///
    /// Clearing a bit whose block is absent is a no-op.
    pub fn clear_bit(&mut self, position: u64) {
        let (offset, bit) = word::split(position);
        let Ok(index) = self.search(offset) else {
            return;
        };
        let block = &mut self.0[index];
        block.clear(bit);
        if block.is_empty() {
            self.0.remove(index);
        }
    }

    /// Flips the bit at `position`, dropping its block if it becomes empty.
    ///
    /// Flipping never creates a block: if no block covers `position`, this fails with
    /// [Error::ItemNotFound] and the sequence is left untouched.
    pub fn flip_bit(&mut self, position: u64) -> Result<(), Error> {
        let (offset, bit) = word::split(position);
        let index = self
            .search(offset)
            .map_err(|_| Error::ItemNotFound(position))?;
        let block = &mut self.0[index];
        block.flip(bit);
        if block.is_empty() {
            self.0.remove(index);
        }
        Ok(())
    }

    /// Returns true if the bit at `position` is set.
    pub fn test_bit(&self, position: u64) -> bool {
        let (offset, bit) = word::split(position);
        self.get(offset).is_some_and(|block| block.test(bit))
    }

    /// Inserts `block` at `index`.
    ///
    /// Fails with [Error::InvalidIndex] if `index > len`, and with [Error::InvalidBlock] if the
    /// block is empty or its offset does not fall strictly between its new neighbours.
    pub fn insert(&mut self, index: usize, block: Block) -> Result<(), Error> {
        if index > self.0.len() {
            return Err(Error::InvalidIndex(index));
        }
        if block.is_empty() {
            return Err(Error::InvalidBlock(block.offset()));
        }
        let after_prev = index == 0 || self.0[index - 1].offset() < block.offset();
        let before_next = index == self.0.len() || block.offset() < self.0[index].offset();
        if !after_prev || !before_next {
            return Err(Error::InvalidBlock(block.offset()));
        }
        self.0.insert(index, block);
        Ok(())
    }

    /// Removes and returns the block at `index`.
    ///
    /// Fails with [Error::InvalidIndex] if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Result<Block, Error> {
        if index >= self.0.len() {
            return Err(Error::InvalidIndex(index));
        }
        Ok(self.0.remove(index))
    }

    /// Removes every block whose mask is empty.
    #[inline]
    pub(crate) fn prune(&mut self) {
        self.0.retain(|block| !block.is_empty());
    }

    /// Appends `block` if it is non-empty.
    ///
    /// The caller must append in strictly increasing offset order.
    #[inline]
    pub(crate) fn push(&mut self, block: Block) {
        if let Some(last) = self.0.last() {
            debug_assert!(
                last.offset() < block.offset(),
                "blocks must be appended in increasing offset order"
            );
        }
        if !block.is_empty() {
            self.0.push(block);
        }
    }

    /// Appends every non-empty block of `blocks`, which must follow the current last offset.
    #[inline]
    pub(crate) fn extend_from_slice(&mut self, blocks: &[Block]) {
        for &block in blocks {
            self.push(block);
        }
    }

    /// Returns mutable access to the underlying storage.
    ///
    /// Callers must restore the invariants (typically via [Self::prune]) before returning.
    #[inline]
    pub(crate) fn storage_mut(&mut self) -> &mut Vec<Block> {
        &mut self.0
    }
}

impl TryFrom<Vec<Block>> for Blocks {
    type Error = Error;

    /// Adopts `blocks` after checking that they are non-empty and strictly increasing by offset.
    fn try_from(blocks: Vec<Block>) -> Result<Self, Self::Error> {
        for (i, block) in blocks.iter().enumerate() {
            if block.is_empty() || (i > 0 && blocks[i - 1].offset() >= block.offset()) {
                return Err(Error::InvalidBlock(block.offset()));
            }
        }
        Ok(Self(blocks))
    }
}

impl<'a> IntoIterator for &'a Blocks {
    type Item = &'a Block;
    type IntoIter = slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::collections::BTreeSet;

    fn assert_invariants(blocks: &Blocks) {
        for block in blocks {
            assert!(
                !block.is_empty(),
                "empty block at offset {}",
                block.offset()
            );
        }
        for pair in blocks.as_slice().windows(2) {
            assert!(pair[0].offset() < pair[1].offset());
        }
    }

    #[test]
    fn test_set_bit_keeps_order() {
        let mut blocks = Blocks::new();
        blocks.set_bit(1000);
        blocks.set_bit(5);
        blocks.set_bit(200);
        blocks.set_bit(6);
        assert_invariants(&blocks);

        let offsets: Vec<_> = blocks.iter().map(Block::offset).collect();
        assert_eq!(offsets, vec![0, 3, 15]);
        assert_eq!(blocks.get(0).unwrap().bits(), 0b110_0000);
    }

    #[test]
    fn test_zero_is_a_member() {
        let mut blocks = Blocks::new();
        assert!(!blocks.test_bit(0));
        blocks.set_bit(0);
        assert!(blocks.test_bit(0));
        blocks.clear_bit(0);
        assert!(!blocks.test_bit(0));
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_clear_bit_prunes() {
        let mut blocks = Blocks::new();
        blocks.set_bit(64);
        blocks.set_bit(65);
        blocks.set_bit(300);

        blocks.clear_bit(64);
        assert_eq!(blocks.len(), 2);
        blocks.clear_bit(65);
        assert_eq!(blocks.len(), 1);
        assert!(blocks.get(1).is_none());

        // Absent block is a no-op
        blocks.clear_bit(10_000);
        assert_eq!(blocks.len(), 1);
        assert_invariants(&blocks);
    }

    #[test]
    fn test_flip_bit() {
        let mut blocks = Blocks::new();
        assert!(matches!(blocks.flip_bit(7), Err(Error::ItemNotFound(7))));
        assert!(blocks.is_empty());

        blocks.set_bit(3);
        blocks.flip_bit(7).unwrap();
        assert!(blocks.test_bit(7));
        blocks.flip_bit(3).unwrap();
        assert!(!blocks.test_bit(3));

        // Emptying the block removes it
        blocks.flip_bit(7).unwrap();
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_insert_and_remove() {
        let mut blocks = Blocks::new();
        blocks.insert(0, Block::new(5, 1)).unwrap();
        blocks.insert(0, Block::new(1, 1)).unwrap();
        blocks.insert(2, Block::new(9, 1)).unwrap();
        blocks.insert(2, Block::new(7, 1)).unwrap();
        let offsets: Vec<_> = blocks.iter().map(Block::offset).collect();
        assert_eq!(offsets, vec![1, 5, 7, 9]);

        assert!(matches!(
            blocks.insert(9, Block::new(20, 1)),
            Err(Error::InvalidIndex(9))
        ));
        assert!(matches!(
            blocks.insert(1, Block::new(6, 1)),
            Err(Error::InvalidBlock(6))
        ));
        assert!(matches!(
            blocks.insert(1, Block::new(1, 1)),
            Err(Error::InvalidBlock(1))
        ));
        assert!(matches!(
            blocks.insert(4, Block::new(10, 0)),
            Err(Error::InvalidBlock(10))
        ));

        assert_eq!(blocks.remove(0).unwrap(), Block::new(1, 1));
        assert_eq!(blocks.remove(2).unwrap(), Block::new(9, 1));
        assert!(matches!(blocks.remove(2), Err(Error::InvalidIndex(2))));
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn test_prune() {
        let blocks = vec![Block::new(0, 1), Block::new(1, 2), Block::new(2, 4)];
        let mut blocks = Blocks::try_from(blocks).unwrap();
        for block in blocks.storage_mut().iter_mut().step_by(2) {
            block.set_bits(0);
        }
        blocks.prune();
        assert_eq!(blocks.as_slice(), &[Block::new(1, 2)]);
    }

    #[test]
    fn test_try_from_rejects_invalid() {
        assert!(Blocks::try_from(Vec::new()).unwrap().is_empty());
        assert!(matches!(
            Blocks::try_from(vec![Block::new(2, 1), Block::new(2, 4)]),
            Err(Error::InvalidBlock(2))
        ));
        assert!(matches!(
            Blocks::try_from(vec![Block::new(3, 1), Block::new(2, 4)]),
            Err(Error::InvalidBlock(2))
        ));
        assert!(matches!(
            Blocks::try_from(vec![Block::new(3, 0)]),
            Err(Error::InvalidBlock(3))
        ));
    }

    #[test]
    fn test_random_against_model() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut blocks = Blocks::new();
        let mut model = BTreeSet::new();
        for _ in 0..5_000 {
            let position = rng.gen_range(0..4_096u64);
            match rng.gen_range(0..3) {
                0 => {
                    blocks.set_bit(position);
                    model.insert(position);
                }
                1 => {
                    blocks.clear_bit(position);
                    model.remove(&position);
                }
                _ => {
                    let (offset, _) = word::split(position);
                    match blocks.flip_bit(position) {
                        Ok(()) => {
                            if !model.remove(&position) {
                                model.insert(position);
                            }
                        }
                        Err(Error::ItemNotFound(p)) => {
                            assert_eq!(p, position);
                            assert!(model.range(offset * 64..offset * 64 + 64).next().is_none());
                        }
                        Err(err) => panic!("unexpected error: {err}"),
                    }
                }
            }
        }
        assert_invariants(&blocks);
        for position in 0..4_096 {
            assert_eq!(blocks.test_bit(position), model.contains(&position));
        }
    }
}
