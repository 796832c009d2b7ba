// ============================================================
// Layer 3 — Example Records
// ============================================================
// The two record shapes the batching core consumes:
//
//   TrainExample: (user, history, recency, label_item, label)
//   EvalExample:  (user, history, recency, (positive, negative))
//
// `history` and `history_time` are aligned index-for-index and
// are never empty once an example reaches the batcher.
//
// Item id 0 is not a valid item inside a padded batch: padding
// is written as 0, so consumers must read `sequence_lengths`
// to know which positions are real.

use serde::{Deserialize, Serialize};

use crate::domain::error::DataError;
use crate::domain::traits::HistoryRecord;

/// Dense item identifier. 0 doubles as the padding value in
/// batches, so row validity comes from the sequence length only.
pub type ItemId = u32;

/// Dense user identifier. Not unique within a batch.
pub type UserId = u32;

/// A binary-labelled training example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainExample {
    pub user_id:      UserId,
    /// Items interacted with before `label_item`, oldest first
    pub history:      Vec<ItemId>,
    /// Recency code per history position (see `GapTable`)
    pub history_time: Vec<u32>,
    pub label_item:   ItemId,
    /// 1 when `label_item` is the true next item, 0 for a sampled negative
    pub label:        u8,
}

impl TrainExample {
    pub fn new(
        user_id:      UserId,
        history:      Vec<ItemId>,
        history_time: Vec<u32>,
        label_item:   ItemId,
        label:        u8,
    ) -> Self {
        Self { user_id, history, history_time, label_item, label }
    }

    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

/// An evaluation example: one true next item ranked against one
/// sampled negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalExample {
    pub user_id:       UserId,
    pub history:       Vec<ItemId>,
    pub history_time:  Vec<u32>,
    pub positive_item: ItemId,
    pub negative_item: ItemId,
}

impl EvalExample {
    pub fn new(
        user_id:       UserId,
        history:       Vec<ItemId>,
        history_time:  Vec<u32>,
        positive_item: ItemId,
        negative_item: ItemId,
    ) -> Self {
        Self { user_id, history, history_time, positive_item, negative_item }
    }
}

impl HistoryRecord for TrainExample {
    fn user_id(&self) -> UserId { self.user_id }
    fn history(&self) -> &[ItemId] { &self.history }
    fn history_time(&self) -> &[u32] { &self.history_time }
}

impl HistoryRecord for EvalExample {
    fn user_id(&self) -> UserId { self.user_id }
    fn history(&self) -> &[ItemId] { &self.history }
    fn history_time(&self) -> &[u32] { &self.history_time }
}

/// Check the two structural invariants every record must hold.
pub fn validate_record<R: HistoryRecord + ?Sized>(record: &R) -> Result<(), DataError> {
    let history = record.history().len();
    let recency = record.history_time().len();

    if history == 0 {
        return Err(DataError::EmptyHistory { user_id: record.user_id() });
    }
    if history != recency {
        return Err(DataError::LengthMismatch {
            user_id: record.user_id(),
            history,
            recency,
        });
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_record_passes() {
        let ex = TrainExample::new(1, vec![4, 5], vec![2, 0], 9, 1);
        assert!(validate_record(&ex).is_ok());
        assert!(ex.is_positive());
    }

    #[test]
    fn test_empty_history_is_rejected() {
        let ex = EvalExample::new(3, vec![], vec![], 7, 2);
        assert_eq!(
            validate_record(&ex),
            Err(DataError::EmptyHistory { user_id: 3 })
        );
    }

    #[test]
    fn test_misaligned_recency_is_rejected() {
        let ex = TrainExample::new(2, vec![1, 2, 3], vec![0, 1], 4, 0);
        assert_eq!(
            validate_record(&ex),
            Err(DataError::LengthMismatch { user_id: 2, history: 3, recency: 2 })
        );
    }
}
