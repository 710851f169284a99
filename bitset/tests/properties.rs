use commonware_bitset::SparseBitSet;
use commonware_codec::{Decode, Encode};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeSet;

fn random_set(rng: &mut StdRng, size: usize, max: u64) -> SparseBitSet {
    (0..size).map(|_| rng.gen_range(0..max)).collect()
}

fn pairs() -> Vec<(SparseBitSet, SparseBitSet)> {
    let mut rng = StdRng::seed_from_u64(0);
    let mut pairs = vec![
        (SparseBitSet::new(), SparseBitSet::new()),
        (SparseBitSet::new(), (0..100).collect()),
        ((0..100).collect(), (50..150).collect()),
        ((0..64).collect(), (64..128).collect()),
    ];
    for size in [1, 10, 100, 1000] {
        for max in [64, 1 << 10, 1 << 20, u64::MAX] {
            let a = random_set(&mut rng, size, max);
            let b = random_set(&mut rng, size, max);
            pairs.push((a, b));
        }
    }
    pairs
}

#[test]
fn test_codec_roundtrip() {
    for (a, b) in pairs() {
        for set in [a, b] {
            let encoded = set.encode();
            assert_eq!(encoded.len(), set.binary_storage_size());
            let decoded = SparseBitSet::decode_cfg(encoded, &(..).into()).unwrap();
            assert_eq!(decoded, set);

            let mut buf = Vec::new();
            let written = set.write_to(&mut buf).unwrap();
            assert_eq!(written, buf.len());
            let mut read = SparseBitSet::new();
            let consumed = read.read_from(&mut buf.as_slice(), &(..).into()).unwrap();
            assert_eq!(consumed, written);
            assert_eq!(read, set);
        }
    }
}

#[test]
fn test_commutativity() {
    for (a, b) in pairs() {
        assert_eq!(a.union(&b), b.union(&a));
        assert_eq!(a.intersection(&b), b.intersection(&a));
        assert_eq!(a.symmetric_difference(&b), b.symmetric_difference(&a));
        if a != b {
            assert_ne!(a.difference(&b), b.difference(&a));
        }
    }
}

#[test]
fn test_cardinality_consistency() {
    for (a, b) in pairs() {
        assert_eq!(a.union_cardinality(&b), a.union(&b).cardinality());
        assert_eq!(
            a.intersection_cardinality(&b),
            a.intersection(&b).cardinality()
        );
        assert_eq!(a.difference_cardinality(&b), a.difference(&b).cardinality());
        assert_eq!(
            a.symmetric_difference_cardinality(&b),
            a.symmetric_difference(&b).cardinality()
        );
    }
}

#[test]
fn test_in_place_matches_pure() {
    for (a, b) in pairs() {
        let mut c = a.clone();
        c.in_place_union(&b);
        assert_eq!(c, a.union(&b));

        let mut c = a.clone();
        c.in_place_intersection(&b);
        assert_eq!(c, a.intersection(&b));

        let mut c = a.clone();
        c.in_place_difference(&b);
        assert_eq!(c, a.difference(&b));

        let mut c = a.clone();
        c.in_place_symmetric_difference(&b);
        assert_eq!(c, a.symmetric_difference(&b));
    }
}

#[test]
fn test_idempotence() {
    for (a, _) in pairs() {
        assert_eq!(a.union(&a), a);
        assert_eq!(a.intersection(&a), a);
        assert!(a.difference(&a).is_empty());
        assert!(a.symmetric_difference(&a).is_empty());
    }
}

#[test]
fn test_iteration_completeness() {
    for (a, b) in pairs() {
        for set in [a, b] {
            let members: Vec<u64> = set.iter().collect();
            assert_eq!(members.len() as u64, set.cardinality());
            assert!(members.windows(2).all(|w| w[0] < w[1]));
            assert!(members.iter().all(|n| set.test(*n)));
        }
    }
}

#[test]
fn test_matches_btreeset() {
    for (a, b) in pairs() {
        let x: BTreeSet<u64> = a.iter().collect();
        let y: BTreeSet<u64> = b.iter().collect();
        let members = |set: SparseBitSet| set.iter().collect::<BTreeSet<_>>();
        assert_eq!(members(a.union(&b)), &x | &y);
        assert_eq!(members(a.intersection(&b)), &x & &y);
        assert_eq!(members(a.difference(&b)), &x - &y);
        assert_eq!(members(a.symmetric_difference(&b)), &x ^ &y);
        assert_eq!(a.is_superset(&b), x.is_superset(&y));
    }
}

#[test]
fn test_odds_and_evens() {
    let mut odds = SparseBitSet::new();
    for n in (1..=97).step_by(2) {
        odds.set(n);
    }
    let mut evens = SparseBitSet::new();
    for n in (0..=98).step_by(2) {
        evens.set(n);
    }
    for n in 100..200 {
        evens.set(n);
    }

    assert_eq!(odds.cardinality(), 49);
    assert_eq!(evens.cardinality(), 150);
    assert_eq!(odds.intersection_cardinality(&evens), 0);
    assert_eq!(odds.union_cardinality(&evens), 199);
    assert_eq!(odds.symmetric_difference_cardinality(&evens), 199);
    assert_eq!(evens.difference_cardinality(&odds), 150);
    assert_eq!(odds.union(&evens), evens.union(&odds));

    let union = &odds | &evens;
    assert!(!union.test(99));
    assert_eq!(
        union.iter().collect::<Vec<_>>(),
        (0..200u64).filter(|n| *n != 99).collect::<Vec<_>>()
    );
}

#[test]
fn test_superset_scenario() {
    let c: SparseBitSet = (0..200).collect();
    let a: SparseBitSet = (0..100).collect();
    assert!(c.is_superset(&a));
    assert!(c.is_strict_superset(&a));
    assert!(!a.is_superset(&c));
    assert!(c.is_superset(&c));
    assert!(!c.is_strict_superset(&c));
}
