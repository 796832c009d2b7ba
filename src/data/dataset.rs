use serde::{Deserialize, Serialize};

use crate::data::embeddings::{EmbeddingLookup, ImageTable, TextTable};
use crate::data::gap::GapTable;
use crate::data::iterator::{EvalBatches, TrainBatches};
use crate::domain::error::DataError;
use crate::domain::example::{validate_record, EvalExample, TrainExample};
use crate::domain::traits::HistoryRecord;

/// Sizes of the id spaces the dataset was built over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorpusCounts {
    pub user_count:     u32,
    pub item_count:     u32,
    pub category_count: u32,
}

/// Everything a built dataset persists, in store order:
/// train set, test set, category list, counts, image table, text table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetBundle {
    pub train_set: Vec<TrainExample>,
    pub test_set:  Vec<EvalExample>,
    /// item id → category id
    pub cate_list: Vec<u32>,
    pub counts:    CorpusCounts,
    pub images:    ImageTable,
    pub texts:     TextTable,
}

impl DatasetBundle {
    /// Check every example and that both tables resolve every item
    /// id referenced anywhere in the examples.
    pub fn validate(&self) -> Result<(), DataError> {
        self.images.matrix.check_shape()?;
        self.texts.matrix.check_shape()?;

        let train = self.train_set.iter().map(|e| (e as &dyn HistoryRecord, [e.label_item, e.label_item]));
        let test  = self.test_set.iter().map(|e| (e as &dyn HistoryRecord, [e.positive_item, e.negative_item]));

        for (record, targets) in train.chain(test) {
            validate_record(record)?;
            for &item in record.history().iter().chain(targets.iter()) {
                self.images.lookup(item)?;
                self.texts.lookup(item)?;
            }
        }
        Ok(())
    }

    /// Check every recency code against the gap table the set was built with.
    pub fn check_recency(&self, gaps: &GapTable) -> Result<(), DataError> {
        let classes = gaps.num_classes();
        let train   = self.train_set.iter().map(|e| e as &dyn HistoryRecord);
        let test    = self.test_set.iter().map(|e| e as &dyn HistoryRecord);

        for record in train.chain(test) {
            if let Some(&code) = record.history_time().iter().find(|&&c| c as usize >= classes) {
                return Err(DataError::RecencyOutOfRange {
                    user_id: record.user_id(),
                    code,
                    classes,
                });
            }
        }
        Ok(())
    }

    /// A fresh pass over the training set.
    pub fn train_batches(&self, batch_size: usize) -> Result<TrainBatches<'_>, DataError> {
        TrainBatches::new(&self.train_set, batch_size, &self.images, &self.texts)
    }

    /// A fresh pass over the test set.
    pub fn eval_batches(&self, batch_size: usize) -> Result<EvalBatches<'_>, DataError> {
        EvalBatches::new(&self.test_set, batch_size, &self.images, &self.texts)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::batch::tests::tables;

    pub(crate) fn bundle() -> DatasetBundle {
        let (images, texts) = tables();
        DatasetBundle {
            train_set: vec![
                TrainExample::new(0, vec![1, 2], vec![1, 0], 3, 1),
                TrainExample::new(0, vec![1, 2], vec![1, 0], 8, 0),
                TrainExample::new(1, vec![4], vec![2], 5, 1),
            ],
            test_set: vec![
                EvalExample::new(0, vec![1, 2, 3], vec![2, 1, 0], 4, 9),
                EvalExample::new(1, vec![4, 5], vec![1, 0], 6, 7),
            ],
            cate_list: vec![0, 1, 1, 2, 0, 1, 2, 0, 1, 2],
            counts: CorpusCounts { user_count: 2, item_count: 10, category_count: 3 },
            images,
            texts,
        }
    }

    #[test]
    fn test_valid_bundle_passes() {
        assert!(bundle().validate().is_ok());
    }

    #[test]
    fn test_unknown_target_item_fails() {
        let mut b = bundle();
        b.test_set[1].negative_item = 77;
        assert_eq!(b.validate(), Err(DataError::MissingImageRow { item: 77 }));
    }

    #[test]
    fn test_misaligned_example_fails() {
        let mut b = bundle();
        b.train_set[2].history_time.push(0);
        assert!(matches!(b.validate(), Err(DataError::LengthMismatch { .. })));
    }

    #[test]
    fn test_recency_codes_within_gap_table() {
        let b = bundle();
        assert!(b.check_recency(&GapTable::default()).is_ok());
        // codes in the fixture reach 2, so three classes are enough
        assert!(b.check_recency(&GapTable::new(vec![2, 4]).unwrap()).is_ok());
    }

    #[test]
    fn test_recency_code_out_of_range_fails() {
        let mut b = bundle();
        b.test_set[1].history_time[0] = 99;
        assert_eq!(
            b.check_recency(&GapTable::default()),
            Err(DataError::RecencyOutOfRange { user_id: 1, code: 99, classes: 13 })
        );
        // a narrower table rejects codes the default would accept
        assert_eq!(
            bundle().check_recency(&GapTable::new(vec![2]).unwrap()),
            Err(DataError::RecencyOutOfRange { user_id: 1, code: 2, classes: 2 })
        );
    }

    #[test]
    fn test_batch_passes_cover_both_sets() {
        let b = bundle();
        assert_eq!(b.train_batches(2).unwrap().count(), 2);
        assert_eq!(b.eval_batches(2).unwrap().count(), 1);
        assert!(b.train_batches(0).is_err());
    }
}
