// ============================================================
// Layer 4 — Dataset Builder
// ============================================================
// Pure functions from grouped reviews to example sets:
//
//   reviews ──group_by_user──▶ UserHistory (sorted by time)
//           ──build_examples─▶ train_set + test_set
//
// Users with fewer than two reviews are skipped. For every
// other user with items p[0..n] and review days t[0..n], one
// negative neg[i] is drawn per target position i (see splitter):
//
//   history = p[..i]
//   recency = gap.bucketize(t[..i], t[i])
//   Train → (u, history, recency, p[i],   1)
//           (u, history, recency, neg[i], 0)
//   Test  → (u, history, recency, (p[i], neg[i]))
//
// Negatives come from NegativeSampler, which rejects items in
// the user's positive set and is bounded: after `max_attempts`
// random draws it falls back to a linear scan, and errors only
// when the user has reviewed every item.

use std::collections::{BTreeMap, HashSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::gap::{to_days, GapTable};
use crate::data::splitter::{split_positions, Split};
use crate::domain::error::DataError;
use crate::domain::example::{EvalExample, ItemId, TrainExample, UserId};
use crate::domain::review::Review;

pub const DEFAULT_MAX_NEG_ATTEMPTS: usize = 1000;

// ─── UserHistory ──────────────────────────────────────────────────────────────
/// All reviews of one user, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserHistory {
    pub user_id: UserId,
    pub items:   Vec<ItemId>,
    /// Review time in whole days, aligned with `items`
    pub days:    Vec<i64>,
}

/// Group reviews per user. Users come out in ascending id order and
/// each history is sorted by timestamp, ties kept in input order.
pub fn group_by_user(reviews: &[Review]) -> Vec<UserHistory> {
    let mut by_user: BTreeMap<UserId, Vec<&Review>> = BTreeMap::new();
    for review in reviews {
        by_user.entry(review.user_id).or_default().push(review);
    }

    by_user
        .into_iter()
        .map(|(user_id, mut rows)| {
            // stable: equal timestamps keep file order
            rows.sort_by_key(|r| r.timestamp);
            UserHistory {
                user_id,
                items: rows.iter().map(|r| r.item_id).collect(),
                days:  rows.iter().map(|r| to_days(r.timestamp)).collect(),
            }
        })
        .collect()
}

// ─── NegativeSampler ──────────────────────────────────────────────────────────
/// Draws item ids a user has not interacted with.
pub struct NegativeSampler {
    rng:          StdRng,
    item_count:   u32,
    max_attempts: usize,
}

impl NegativeSampler {
    pub fn new(seed: u64, item_count: u32, max_attempts: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            item_count,
            max_attempts,
        }
    }

    /// Uniform draw from `0..item_count` outside `positives`.
    pub fn sample(
        &mut self,
        user_id:   UserId,
        positives: &HashSet<ItemId>,
    ) -> Result<ItemId, DataError> {
        let exhausted = DataError::NegativeSamplingExhausted {
            user_id,
            item_count: self.item_count,
        };
        if self.item_count == 0 {
            return Err(exhausted);
        }

        for _ in 0..self.max_attempts {
            let candidate = self.rng.gen_range(0..self.item_count);
            if !positives.contains(&candidate) {
                return Ok(candidate);
            }
        }

        // Dense positive set: scan the catalogue from a random start.
        let n     = self.item_count as u64;
        let start = self.rng.gen_range(0..n);
        tracing::debug!(
            "User {} hit {} rejected draws, scanning for a negative",
            user_id,
            self.max_attempts,
        );
        (0..n)
            .map(|k| ((start + k) % n) as ItemId)
            .find(|candidate| !positives.contains(candidate))
            .ok_or(exhausted)
    }

    /// The sampler's RNG, reused for shuffling so one seed drives a build.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

// ─── build_examples ───────────────────────────────────────────────────────────
/// Output of one dataset build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltExamples {
    pub train_set: Vec<TrainExample>,
    pub test_set:  Vec<EvalExample>,
}

/// Expand grouped histories into training pairs and evaluation records.
pub fn build_examples(
    groups:  &[UserHistory],
    gaps:    &GapTable,
    sampler: &mut NegativeSampler,
) -> Result<BuiltExamples, DataError> {
    let mut built = BuiltExamples::default();

    for user in groups {
        // a single review has no target position
        if user.items.len() < 2 {
            continue;
        }
        let positives: HashSet<ItemId> = user.items.iter().copied().collect();

        for (i, split) in split_positions(user.items.len()) {
            let history      = user.items[..i].to_vec();
            let history_time = gaps.bucketize(&user.days[..i], user.days[i]);
            let negative     = sampler.sample(user.user_id, &positives)?;

            match split {
                Split::Train => {
                    built.train_set.push(TrainExample::new(
                        user.user_id, history.clone(), history_time.clone(), user.items[i], 1,
                    ));
                    built.train_set.push(TrainExample::new(
                        user.user_id, history, history_time, negative, 0,
                    ));
                }
                Split::Test => {
                    built.test_set.push(EvalExample::new(
                        user.user_id, history, history_time, user.items[i], negative,
                    ));
                }
            }
        }
    }

    tracing::debug!(
        "Built {} training and {} test examples from {} users",
        built.train_set.len(),
        built.test_set.len(),
        groups.len(),
    );
    Ok(built)
}
