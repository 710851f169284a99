#![no_main]

use arbitrary::Arbitrary;
use commonware_bitset::SparseBitSet;
use libfuzzer_sys::fuzz_target;
use std::collections::BTreeSet;

// Members are `u16` so that complements stay small.
#[derive(Arbitrary, Debug)]
enum Operation {
    Set(bool, u16),
    Clear(bool, u16),
    SetTo(bool, u16, bool),
    Flip(bool, u16),
    ClearAll(bool),
    NextSet(bool, u16),
    Union,
    Intersection,
    Difference,
    SymmetricDifference,
    Superset,
    Complement(bool),
    CopyInto,
}

fn check(set: &SparseBitSet, model: &BTreeSet<u64>) {
    assert_eq!(set.cardinality(), model.len() as u64);
    assert_eq!(set.min(), model.first().copied());
    assert_eq!(set.max(), model.last().copied());
    assert!(set.iter().eq(model.iter().copied()));
}

fn fuzz(ops: Vec<Operation>) {
    let mut sets = [SparseBitSet::new(), SparseBitSet::new()];
    let mut models = [BTreeSet::new(), BTreeSet::new()];

    for op in ops {
        match op {
            Operation::Set(which, n) => {
                let (i, n) = (which as usize, n as u64);
                sets[i].set(n);
                models[i].insert(n);
            }

            Operation::Clear(which, n) => {
                let (i, n) = (which as usize, n as u64);
                sets[i].clear(n);
                models[i].remove(&n);
            }

            Operation::SetTo(which, n, value) => {
                let (i, n) = (which as usize, n as u64);
                sets[i].set_to(n, value);
                if value {
                    models[i].insert(n);
                } else {
                    models[i].remove(&n);
                }
            }

            Operation::Flip(which, n) => {
                let (i, n) = (which as usize, n as u64);
                let populated = models[i].range(n & !63..(n | 63) + 1).next().is_some();
                match sets[i].flip(n) {
                    Ok(_) => {
                        assert!(populated);
                        if !models[i].remove(&n) {
                            models[i].insert(n);
                        }
                    }
                    Err(_) => assert!(!populated),
                }
            }

            Operation::ClearAll(which) => {
                let i = which as usize;
                sets[i].clear_all();
                models[i].clear();
                assert!(sets[i].is_empty());
            }

            Operation::NextSet(which, n) => {
                let (i, n) = (which as usize, n as u64);
                assert_eq!(sets[i].next_set(n), models[i].range(n..).next().copied());
            }

            Operation::Union => {
                let expected: BTreeSet<u64> = &models[0] | &models[1];
                assert_eq!(
                    sets[0].union_cardinality(&sets[1]),
                    expected.len() as u64
                );
                let [a, b] = &mut sets;
                a.in_place_union(b);
                models[0] = expected;
            }

            Operation::Intersection => {
                let expected: BTreeSet<u64> = &models[0] & &models[1];
                assert_eq!(
                    sets[0].intersection_cardinality(&sets[1]),
                    expected.len() as u64
                );
                let [a, b] = &mut sets;
                a.in_place_intersection(b);
                models[0] = expected;
            }

            Operation::Difference => {
                let expected: BTreeSet<u64> = &models[0] - &models[1];
                assert_eq!(
                    sets[0].difference_cardinality(&sets[1]),
                    expected.len() as u64
                );
                let [a, b] = &mut sets;
                a.in_place_difference(b);
                models[0] = expected;
            }

            Operation::SymmetricDifference => {
                let expected: BTreeSet<u64> = &models[0] ^ &models[1];
                let result = sets[0].symmetric_difference(&sets[1]);
                assert_eq!(result.cardinality(), expected.len() as u64);
                assert_eq!(result, sets[1].symmetric_difference(&sets[0]));
                let [a, b] = &mut sets;
                a.in_place_symmetric_difference(b);
                assert_eq!(*a, result);
                models[0] = expected;
            }

            Operation::Superset => {
                assert_eq!(
                    sets[0].is_superset(&sets[1]),
                    models[0].is_superset(&models[1])
                );
                assert_eq!(
                    sets[0].is_strict_superset(&sets[1]),
                    models[0].is_superset(&models[1]) && models[0] != models[1]
                );
            }

            Operation::Complement(which) => {
                let i = which as usize;
                let expected: BTreeSet<u64> = match models[i].last() {
                    Some(max) => (0..*max).filter(|n| !models[i].contains(n)).collect(),
                    None => BTreeSet::new(),
                };
                check(&sets[i].complement(), &expected);
            }

            Operation::CopyInto => {
                let [a, b] = &mut sets;
                a.copy_into(b);
                models[1] = models[0].clone();
            }
        }

        for (set, model) in sets.iter().zip(models.iter()) {
            check(set, model);
        }
    }
}

fuzz_target!(|ops: Vec<Operation>| {
    fuzz(ops);
});
