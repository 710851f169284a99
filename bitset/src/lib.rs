//! Store sparse sets of non-negative integers as ordered runs of 64-bit blocks.
//!
//! A [SparseBitSet] only allocates storage for the 64-wide windows that contain at least one
//! member, so memory grows with the number of populated windows rather than with the largest
//! member. Set algebra (union, intersection, difference and symmetric difference) runs as a
//! single merge over both operands and is offered in three forms: producing a new set, updating
//! the receiver in place, and returning only the cardinality of the result.
//!
//! # Example
//!
//! ```rust
//! use commonware_bitset::SparseBitSet;
//!
//! let mut odds: SparseBitSet = (1..100).step_by(2).collect();
//! let evens: SparseBitSet = (0..100).step_by(2).collect();
//!
//! assert_eq!(odds.intersection_cardinality(&evens), 0);
//! odds.in_place_union(&evens);
//! assert_eq!(odds.cardinality(), 100);
//! assert!(odds.is_superset(&evens));
//! ```
//!
//! # Status
//!
//! `commonware-bitset` is **ALPHA** software and is not yet recommended for production use.
//! Developers should expect breaking changes and occasional instability.

#![doc(
    html_logo_url = "https://commonware.xyz/imgs/rustdoc_logo.svg",
    html_favicon_url = "https://commonware.xyz/favicon.ico"
)]

mod block;
pub use block::Block;
mod blocks;
pub use blocks::Blocks;
pub mod codec;
mod error;
pub use error::Error;
mod ops;
mod set;
pub use set::{Iter, SparseBitSet};
pub mod word;
