//! Primitives over the 64-bit words that back each [crate::Block].
//!
//! Both primitives are branch-free and run in constant time: [popcount] is a SWAR (SIMD within a
//! register) reduction and [trailing_zeros] is a de Bruijn perfect-hash lookup.

/// Number of bits in a word.
pub const WORD_BITS: u64 = u64::BITS as u64;

/// Number of bits to shift a position right by to obtain its block offset.
pub(crate) const LOG2_WORD_BITS: u32 = 6;

/// Mask selecting the in-word bit of a position.
pub(crate) const BIT_MASK: u64 = WORD_BITS - 1;

/// Word with all bits set.
pub const FULL_WORD: u64 = u64::MAX;

/// Multiplier whose top 6 bits are distinct for every power of two.
const DE_BRUIJN_MULTIPLIER: u64 = 0x03f7_9d71_b4ca_8b09;

/// Maps the top 6 bits of `(1 << k) * DE_BRUIJN_MULTIPLIER` back to `k`.
const DE_BRUIJN_TABLE: [u8; 64] = [
    0, 1, 56, 2, 57, 49, 28, 3, 61, 58, 42, 50, 38, 29, 17, 4, //
    62, 47, 59, 36, 45, 43, 51, 22, 53, 39, 33, 30, 24, 18, 12, 5, //
    63, 55, 48, 27, 60, 41, 37, 16, 46, 35, 44, 21, 52, 32, 23, 11, //
    54, 26, 40, 15, 34, 20, 31, 10, 25, 14, 19, 9, 13, 8, 7, 6, //
];

/// Returns the number of set bits in `word` (its Hamming weight).
#[inline]
pub const fn popcount(word: u64) -> u32 {
    // Count bits in each 2-bit field, then each nibble, then each byte
    let mut x = word - ((word >> 1) & 0x5555_5555_5555_5555);
    x = ((x >> 2) & 0x3333_3333_3333_3333) + (x & 0x3333_3333_3333_3333);
    x = (x + (x >> 4)) & 0x0f0f_0f0f_0f0f_0f0f;

    // Sum all bytes into the top byte
    (x.wrapping_mul(0x0101_0101_0101_0101) >> 56) as u32
}

/// Returns the index of the lowest set bit in `word`.
///
/// `word` must be nonzero. The result for `0` is unspecified (debug builds panic).
#[inline]
pub const fn trailing_zeros(word: u64) -> u32 {
    debug_assert!(word != 0, "trailing_zeros of an empty word");
    let lowest = word & word.wrapping_neg();
    DE_BRUIJN_TABLE[(lowest.wrapping_mul(DE_BRUIJN_MULTIPLIER) >> 58) as usize] as u32
}

/// Returns the index of the highest set bit in a nonzero `word`.
#[inline]
pub(crate) const fn highest_bit(word: u64) -> u32 {
    debug_assert!(word != 0, "highest_bit of an empty word");
    u64::BITS - 1 - word.leading_zeros()
}

/// Returns a word with bits `[0, n]` set.
#[inline]
pub(crate) const fn mask_through(n: u32) -> u64 {
    FULL_WORD >> (u64::BITS - 1 - n)
}

/// Splits a position into its block offset and the bit index within that block.
#[inline]
pub(crate) const fn split(position: u64) -> (u64, u32) {
    (position >> LOG2_WORD_BITS, (position & BIT_MASK) as u32)
}

/// Combines a block offset and bit index into a position.
#[inline]
pub(crate) const fn combine(offset: u64, bit: u32) -> u64 {
    (offset << LOG2_WORD_BITS) | bit as u64
}
