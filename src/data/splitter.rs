// ============================================================
// Layer 4 — Train/Test Splitter
// ============================================================
// Every user history p[0..n] is walked once. Position i
// (1 <= i < n) becomes one prediction target with p[..i] as its
// history:
//
//   i = 1 .. n-2  → Train (the "past" of the user)
//   i = n-1       → Test  (the most recent event)
//
// So each user with n >= 2 reviews contributes exactly one
// test target, and all earlier suffix positions go to training.
//
// After building, both sets are shuffled with a seeded RNG so
// users are interleaved but the build stays reproducible.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.

use rand::seq::SliceRandom;
use rand::Rng;

/// Which set a prediction target belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

/// Target positions of a history of length `len`, with their split.
///
/// # Example
/// ```ignore
/// let splits: Vec<_> = split_positions(4).collect();
/// // [(1, Train), (2, Train), (3, Test)]
/// ```
pub fn split_positions(len: usize) -> impl Iterator<Item = (usize, Split)> {
    (1..len).map(move |i| {
        let split = if i == len - 1 { Split::Test } else { Split::Train };
        (i, split)
    })
}

/// Shuffle the training and test sets in place with the same RNG.
pub fn shuffle_sets<T, U, R: Rng + ?Sized>(train: &mut [T], test: &mut [U], rng: &mut R) {
    train.shuffle(rng);
    test.shuffle(rng);

    tracing::debug!(
        "Shuffled {} training and {} test examples",
        train.len(),
        test.len(),
    );
}
