/// Errors that can occur when mutating or (de)serializing a [crate::SparseBitSet].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A block sequence splice addressed an index past its end.
    #[error("invalid block index: {0}")]
    InvalidIndex(usize),

    /// A block was empty or would break the ordering of the sequence.
    #[error("invalid block at offset {0}")]
    InvalidBlock(u64),

    /// No populated block covers the position.
    #[error("no block covers position {0}")]
    ItemNotFound(u64),

    /// The set has more blocks than the length prefix can describe.
    #[error("too many blocks to encode: {0}")]
    TooLarge(usize),

    /// Encoded data was malformed.
    #[error("codec error: {0}")]
    Codec(#[from] commonware_codec::Error),

    /// The underlying stream failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
