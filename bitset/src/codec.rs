//! Binary encoding of a [SparseBitSet].
//!
//! # Format
//!
//! ```text
//! +-------------+----------------+--------------+----------------+--------------+-----
//! | len: u32 BE | offset_0: u64  | bits_0: u64  | offset_1: u64  | bits_1: u64  | ...
//! +-------------+----------------+--------------+----------------+--------------+-----
//! ```
//!
//! `len` is the number of bytes of block data that follow (16 per block). Blocks are written in
//! increasing offset order and decoding rejects any other order, as well as empty masks, so a
//! decoded set always upholds the [crate::Blocks] invariants.

use crate::{Block, Blocks, Error, SparseBitSet};
use bytes::{Buf, BufMut};
use commonware_codec::{
    Decode, Encode, EncodeSize, Error as CodecError, FixedSize, RangeCfg, Read, ReadExt, Write,
};
use std::io::{self, Read as _};
use tracing::{debug, warn};

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = u32::SIZE;

/// Largest number of blocks the length prefix can describe.
pub const MAX_BLOCKS: usize = u32::MAX as usize / Block::SIZE;

/// Validates a length prefix against `range`, returning the number of blocks it describes.
fn blocks_in(len: u32, range: &RangeCfg) -> Result<usize, CodecError> {
    let len = len as usize;
    if len % Block::SIZE != 0 {
        return Err(CodecError::Invalid(
            "SparseBitSet",
            "length not a multiple of block size",
        ));
    }
    let num_blocks = len / Block::SIZE;
    if !range.contains(&num_blocks) {
        return Err(CodecError::InvalidLength(num_blocks));
    }
    Ok(num_blocks)
}

impl Write for SparseBitSet {
    /// # Panics
    ///
    /// Panics if the set has more than [MAX_BLOCKS] blocks.
    fn write(&self, buf: &mut impl BufMut) {
        let len = self.blocks().len() * Block::SIZE;
        u32::try_from(len)
            .expect("block data exceeds length prefix")
            .write(buf);
        for block in self.blocks() {
            block.write(buf);
        }
    }
}

impl Read for SparseBitSet {
    /// Bounds the number of blocks accepted, limiting the memory allocated for untrusted input.
    type Cfg = RangeCfg;

    fn read_cfg(buf: &mut impl Buf, range: &Self::Cfg) -> Result<Self, CodecError> {
        let num_blocks = blocks_in(u32::read(buf)?, range)?;
        if buf.remaining() < num_blocks * Block::SIZE {
            return Err(CodecError::EndOfBuffer);
        }

        let mut blocks = Vec::with_capacity(num_blocks);
        for _ in 0..num_blocks {
            blocks.push(Block::read(buf)?);
        }
        let blocks = Blocks::try_from(blocks)
            .map_err(|_| CodecError::Invalid("SparseBitSet", "blocks not sorted or empty"))?;
        Ok(Self::from(blocks))
    }
}

impl EncodeSize for SparseBitSet {
    fn encode_size(&self) -> usize {
        LENGTH_PREFIX_SIZE + self.blocks().len() * Block::SIZE
    }
}

impl SparseBitSet {
    /// Returns the number of bytes [Self::write_to] produces for this set.
    #[inline]
    pub fn binary_storage_size(&self) -> usize {
        self.encode_size()
    }

    /// Serializes the set to `writer`, returning the number of bytes written.
    pub fn write_to<W: io::Write>(&self, writer: &mut W) -> Result<usize, Error> {
        let num_blocks = self.num_blocks();
        if num_blocks > MAX_BLOCKS {
            return Err(Error::TooLarge(num_blocks));
        }

        let encoded = self.encode();
        writer.write_all(&encoded)?;
        debug!(blocks = num_blocks, bytes = encoded.len(), "wrote set");
        Ok(encoded.len())
    }

    /// Replaces the contents of the set with a set deserialized from `reader`, returning the
    /// number of bytes read.
    ///
    /// `range` bounds the number of blocks accepted. On error the set is left unchanged.
    pub fn read_from<R: io::Read>(
        &mut self,
        reader: &mut R,
        range: &RangeCfg,
    ) -> Result<usize, Error> {
        let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
        reader.read_exact(&mut prefix)?;
        let len = u32::from_be_bytes(prefix);
        let num_blocks = blocks_in(len, range).inspect_err(|err| {
            warn!(len, ?err, "rejected length prefix");
        })?;

        // Grow the frame only as body bytes arrive and decode it before replacing the set
        let mut frame = prefix.to_vec();
        reader.by_ref().take(len as u64).read_to_end(&mut frame)?;
        let size = frame.len();
        if size != LENGTH_PREFIX_SIZE + num_blocks * Block::SIZE {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        *self = Self::decode_cfg(frame.as_slice(), range)?;

        debug!(blocks = num_blocks, bytes = size, "read set");
        Ok(size)
    }
}
