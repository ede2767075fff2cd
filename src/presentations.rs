//! A small library of ready-made presentations, useful as demo inputs and
//! as reference points with independently known congruence counts.

use crate::search::presentation::Presentation;

/// The free monoid on one generator (the natural numbers under addition).
pub fn free_monogenic() -> Presentation {
    Presentation::new(1).with_empty_word(true)
}

/// One idempotent generator: `aa = a`.
pub fn idempotent_monogenic() -> Presentation {
    Presentation::new(1)
        .with_empty_word(true)
        .with_rule(vec![0, 0], vec![0])
}

/// The cyclic group of order `m` as a monoid: one generator with
/// `a^m = empty`. Its right congruences correspond to subgroups, so the
/// number of congruences of index at most `m` is the number of divisors
/// of `m`.
///
/// # Panics
///
/// Panics if `m == 0`.
pub fn cyclic_group(m: u32) -> Presentation {
    assert!(m > 0);
    Presentation::new(1)
        .with_empty_word(true)
        .with_rule(vec![0; m as usize], vec![])
}

/// The partition monoid of degree 2, as a semigroup presentation on four
/// generators with generator 0 presented as the identity element.
pub fn partition_monoid_2() -> Presentation {
    Presentation::new(4)
        .with_empty_word(false)
        .with_rule(vec![0, 0], vec![0])
        .with_rule(vec![0, 1], vec![1])
        .with_rule(vec![0, 2], vec![2])
        .with_rule(vec![0, 3], vec![3])
        .with_rule(vec![1, 0], vec![1])
        .with_rule(vec![2, 0], vec![2])
        .with_rule(vec![3, 0], vec![3])
        .with_rule(vec![1, 1], vec![0])
        .with_rule(vec![1, 3], vec![3])
        .with_rule(vec![2, 2], vec![2])
        .with_rule(vec![3, 1], vec![3])
        .with_rule(vec![3, 3], vec![3])
        .with_rule(vec![2, 3, 2], vec![2])
        .with_rule(vec![3, 2, 3], vec![3])
        .with_rule(vec![1, 2, 1, 2], vec![2, 1, 2])
        .with_rule(vec![2, 1, 2, 1], vec![2, 1, 2])
}
