//! The atomic storage unit of a [crate::SparseBitSet].

use crate::word;
use bytes::{Buf, BufMut};
use commonware_codec::{Error as CodecError, FixedSize, Read, ReadExt, Write};

/// Membership of the 64 integers `[offset * 64, offset * 64 + 64)`.
///
/// Bit `k` of the mask denotes membership of `offset * 64 + k`. A [Block] on its own may have an
/// empty mask, but a [crate::Blocks] sequence never stores one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Block {
    offset: u64,
    bits: u64,
}

impl Block {
    /// Creates a block at `offset` holding `bits`.
    #[inline]
    pub const fn new(offset: u64, bits: u64) -> Self {
        Self { offset, bits }
    }

    /// Creates a block at `offset` with only `bit` set.
    #[inline]
    pub const fn single(offset: u64, bit: u32) -> Self {
        Self {
            offset,
            bits: 1 << bit,
        }
    }

    /// Returns the index of the 64-wide chunk this block covers.
    #[inline]
    pub const fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns the membership mask.
    #[inline]
    pub const fn bits(&self) -> u64 {
        self.bits
    }

    /// Returns true if no bit is set.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns the number of set bits.
    #[inline]
    pub const fn count(&self) -> u64 {
        word::popcount(self.bits) as u64
    }

    /// Returns the first integer covered by this block.
    #[inline]
    pub const fn start(&self) -> u64 {
        word::combine(self.offset, 0)
    }

    /// Sets `bit`.
    #[inline]
    pub fn set(&mut self, bit: u32) {
        self.bits |= 1 << bit;
    }

    /// Clears `bit`.
    #[inline]
    pub fn clear(&mut self, bit: u32) {
        self.bits &= !(1 << bit);
    }

    /// Toggles `bit`.
    #[inline]
    pub fn flip(&mut self, bit: u32) {
        self.bits ^= 1 << bit;
    }

    /// Returns true if `bit` is set.
    #[inline]
    pub const fn test(&self, bit: u32) -> bool {
        self.bits & (1 << bit) != 0
    }

    /// Replaces the membership mask.
    #[inline]
    pub(crate) fn set_bits(&mut self, bits: u64) {
        self.bits = bits;
    }
}

impl Write for Block {
    fn write(&self, buf: &mut impl BufMut) {
        self.offset.write(buf);
        self.bits.write(buf);
    }
}

impl Read for Block {
    type Cfg = ();

    fn read_cfg(buf: &mut impl Buf, _: &()) -> Result<Self, CodecError> {
        let offset = u64::read(buf)?;
        let bits = u64::read(buf)?;
        Ok(Self { offset, bits })
    }
}

impl FixedSize for Block {
    const SIZE: usize = u64::SIZE * 2;
}
