// ============================================================
// Layer 4 — Batch Iterators
// ============================================================
// Walks a flat example list in order and yields one collated
// batch per step:
//
//   batch k = examples[k * B .. min((k + 1) * B, N)]
//
// giving ceil(N / B) batches, the last one possibly shorter.
// No example is dropped, duplicated or reordered.
//
// Each step yields `(cursor, batch)` where `cursor` is the
// number of batches produced so far (1 for the first batch).
// Once every example has been consumed the iterator returns
// `None`, and keeps returning `None`; it never yields an empty
// batch. A pass cannot be rewound: build a new iterator for
// the next epoch.
//
// A batch that breaks the data contract (empty history,
// missing embedding row, ...) is yielded as `Some(Err(..))`.
// The cursor still advances past it.

use std::iter::FusedIterator;

use crate::data::batch::Collate;
use crate::data::embeddings::{ImageTable, TextTable};
use crate::domain::error::DataError;
use crate::domain::example::{EvalExample, TrainExample};

/// Lazy, single-pass batch sequence over borrowed examples and tables.
#[derive(Debug, Clone)]
pub struct BatchIter<'a, E> {
    examples:    &'a [E],
    batch_size:  usize,
    num_batches: usize,
    cursor:      usize,
    images:      &'a ImageTable,
    texts:       &'a TextTable,
}

/// Binary-labelled training batches.
pub type TrainBatches<'a> = BatchIter<'a, TrainExample>;

/// Positive/negative evaluation batches.
pub type EvalBatches<'a> = BatchIter<'a, EvalExample>;

impl<'a, E: Collate> BatchIter<'a, E> {
    /// Start a fresh pass. `batch_size` must be at least 1; an empty
    /// example list is allowed and yields no batches.
    pub fn new(
        examples:   &'a [E],
        batch_size: usize,
        images:     &'a ImageTable,
        texts:      &'a TextTable,
    ) -> Result<Self, DataError> {
        if batch_size == 0 {
            return Err(DataError::InvalidBatchSize);
        }
        Ok(Self {
            examples,
            batch_size,
            num_batches: examples.len().div_ceil(batch_size),
            cursor: 0,
            images,
            texts,
        })
    }

    /// Total number of batches in this pass.
    pub fn num_batches(&self) -> usize {
        self.num_batches
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor == self.num_batches
    }
}

impl<'a, E: Collate> Iterator for BatchIter<'a, E> {
    type Item = Result<(usize, E::Batch), DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_exhausted() {
            return None;
        }

        let start = self.cursor * self.batch_size;
        let end   = (start + self.batch_size).min(self.examples.len());
        self.cursor += 1;

        tracing::debug!(
            "Collating batch {}/{} (examples {}..{})",
            self.cursor,
            self.num_batches,
            start,
            end,
        );

        let batch = E::collate(&self.examples[start..end], self.images, self.texts);
        Some(batch.map(|b| (self.cursor, b)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.num_batches - self.cursor;
        (remaining, Some(remaining))
    }
}

impl<'a, E: Collate> ExactSizeIterator for BatchIter<'a, E> {}

impl<'a, E: Collate> FusedIterator for BatchIter<'a, E> {}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batch::tests::tables;

    fn train_examples(n: usize) -> Vec<TrainExample> {
        (0..n)
            .map(|i| {
                let len = i % 3 + 1;
                let history: Vec<u32> = (0..len).map(|l| ((i + l) % 9 + 1) as u32).collect();
                TrainExample::new(i as u32, history, vec![1; len], 5, (i % 2) as u8)
            })
            .collect()
    }

    #[test]
    fn test_batch_count_is_ceiling() {
        let (images, texts) = tables();
        for n in 0..12 {
            let examples = train_examples(n);
            for b in 1..6 {
                let iter = TrainBatches::new(&examples, b, &images, &texts).unwrap();
                assert_eq!(iter.num_batches(), n.div_ceil(b));
                assert_eq!(iter.len(), n.div_ceil(b));
                assert_eq!(iter.count(), n.div_ceil(b));
            }
        }
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        let (images, texts) = tables();
        let mut iter = TrainBatches::new(&[], 4, &images, &texts).unwrap();
        assert!(iter.is_exhausted());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let (images, texts) = tables();
        let examples = train_examples(3);
        assert_eq!(
            TrainBatches::new(&examples, 0, &images, &texts).err(),
            Some(DataError::InvalidBatchSize)
        );
    }

    #[test]
    fn test_last_batch_is_short_then_exhausted() {
        let (images, texts) = tables();
        let examples = train_examples(5);
        let mut iter = TrainBatches::new(&examples, 2, &images, &texts).unwrap();

        let sizes: Vec<(usize, usize)> = iter
            .by_ref()
            .map(|r| r.unwrap())
            .map(|(cursor, batch)| (cursor, batch.user_ids.len()))
            .collect();

        assert_eq!(sizes, vec![(1, 2), (2, 2), (3, 1)]);
        assert!(iter.next().is_none());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_rows_reproduce_input_order() {
        let (images, texts) = tables();
        let examples = train_examples(11);
        let iter = TrainBatches::new(&examples, 4, &images, &texts).unwrap();

        let mut rebuilt = Vec::new();
        for item in iter {
            let (_, batch) = item.unwrap();
            let h = &batch.history;
            for row in 0..batch.user_ids.len() {
                let len = h.sequence_lengths[row];
                assert!(h.items_row(row)[len..].iter().all(|&x| x == 0));
                assert!(h.recency_row(row)[len..].iter().all(|&x| x == 0));
                rebuilt.push(TrainExample::new(
                    batch.user_ids[row],
                    h.items_row(row)[..len].to_vec(),
                    h.recency_row(row)[..len].to_vec(),
                    batch.label_items[row],
                    batch.labels[row],
                ));
            }
        }
        assert_eq!(rebuilt, examples);
    }

    #[test]
    fn test_max_len_is_local_to_each_batch() {
        let (images, texts) = tables();
        let examples = vec![
            TrainExample::new(0, vec![1], vec![0], 2, 1),
            TrainExample::new(0, vec![1], vec![0], 2, 0),
            TrainExample::new(1, vec![1, 2, 3, 4], vec![0; 4], 5, 1),
        ];
        let max_lens: Vec<usize> = TrainBatches::new(&examples, 2, &images, &texts)
            .unwrap()
            .map(|r| r.unwrap().1.history.max_sl)
            .collect();
        assert_eq!(max_lens, vec![1, 4]);
    }

    #[test]
    fn test_rebuilding_is_deterministic() {
        let (images, texts) = tables();
        let examples = train_examples(7);
        let first: Vec<_> = TrainBatches::new(&examples, 3, &images, &texts)
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        let second: Vec<_> = TrainBatches::new(&examples, 3, &images, &texts)
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_eval_labels_stay_aligned_with_rows() {
        let (images, texts) = tables();
        let examples = vec![
            EvalExample::new(0, vec![1, 2], vec![1, 0], 4, 6),
            EvalExample::new(1, vec![5], vec![0], 7, 3),
            EvalExample::new(2, vec![8, 9, 1], vec![2, 1, 0], 2, 1),
        ];
        let batches: Vec<_> = EvalBatches::new(&examples, 2, &images, &texts)
            .unwrap()
            .map(|r| r.unwrap().1)
            .collect();

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].positive_items, vec![4, 7]);
        assert_eq!(batches[0].negative_items, vec![6, 3]);
        assert_eq!(batches[0].history.items_row(1), &[5, 0]);
        assert_eq!(batches[1].positive_items, vec![2]);
        assert_eq!(batches[1].negative_items, vec![1]);
        assert_eq!(batches[1].history.items_row(0), &[8, 9, 1]);
    }

    #[test]
    fn test_bad_batch_is_reported_and_iteration_continues() {
        let (images, texts) = tables();
        let examples = vec![
            TrainExample::new(0, vec![1], vec![0], 2, 1),
            TrainExample::new(1, vec![], vec![], 2, 0),
            TrainExample::new(2, vec![3], vec![0], 2, 1),
        ];
        let results: Vec<_> = TrainBatches::new(&examples, 1, &images, &texts)
            .unwrap()
            .collect();
        assert!(results[0].is_ok());
        assert_eq!(results[1], Err(DataError::EmptyHistory { user_id: 1 }));
        assert!(results[2].is_ok());
    }
}
