#![no_main]

use commonware_bitset::SparseBitSet;
use commonware_codec::{Decode, Encode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (SparseBitSet, &[u8])| {
    let (set, data) = input;

    let encoded = set.encode();
    let decoded = SparseBitSet::decode_cfg(encoded, &(..).into()).unwrap();
    assert_eq!(decoded, set);

    // Arbitrary bytes either decode to a set that re-encodes identically or are rejected.
    if let Ok(decoded) = SparseBitSet::decode_cfg(data, &(..=1 << 16).into()) {
        assert_eq!(decoded.encode().as_ref(), data);
    }
});
