// ============================================================
// Layer 4 — Batch Collation
// ============================================================
// Stacks a slice of variable-length examples into one batch of
// fixed-shape, row-major host buffers.
//
// How padding works here:
//   max_sl = longest history in THIS batch (not global)
//
//   history  [batch_len, max_sl]           left-aligned, 0-filled
//   recency  [batch_len, max_sl]           same layout
//   image    [batch_len, max_sl, img_dim]  gathered per position
//   text     [batch_len, max_sl, txt_dim]  gathered per position
//
//   Example, max_sl = 4:
//     row 0: [12, 40,  7,  3]   sequence_lengths[0] = 4
//     row 1: [ 5, 18,  0,  0]   sequence_lengths[1] = 2
//
// `sequence_lengths` is the single source of truth for which
// positions are real. Padded positions hold 0 ids, 0 codes and
// zero embedding vectors.

use crate::data::embeddings::{EmbeddingLookup, ImageTable, TextTable};
use crate::domain::error::DataError;
use crate::domain::example::{validate_record, EvalExample, ItemId, TrainExample, UserId};
use crate::domain::traits::HistoryRecord;

// ─── PaddedHistory ────────────────────────────────────────────────────────────
/// The history part shared by training and evaluation batches.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddedHistory {
    pub batch_len:        usize,
    pub max_sl:           usize,
    /// Shape [batch_len, max_sl]
    pub items:            Vec<ItemId>,
    /// Shape [batch_len, max_sl]
    pub recency:          Vec<u32>,
    /// True (unpadded) length of every row
    pub sequence_lengths: Vec<usize>,
    pub image_dim:        usize,
    /// Shape [batch_len, max_sl, image_dim]
    pub image_embeddings: Vec<f32>,
    pub text_dim:         usize,
    /// Shape [batch_len, max_sl, text_dim]
    pub text_embeddings:  Vec<f32>,
}

impl PaddedHistory {
    /// Pad `records` to the batch-local maximum length and gather
    /// image/text embeddings for every real position.
    ///
    /// Every record is validated first; an empty or misaligned
    /// history aborts the whole batch.
    pub fn collate<R: HistoryRecord>(
        records: &[R],
        images:  &ImageTable,
        texts:   &TextTable,
    ) -> Result<Self, DataError> {
        for record in records {
            validate_record(record)?;
        }

        let batch_len = records.len();
        let max_sl    = records.iter().map(|r| r.history().len()).max().unwrap_or(0);
        let image_dim = images.dim();
        let text_dim  = texts.dim();

        let mut items            = vec![0; batch_len * max_sl];
        let mut recency          = vec![0; batch_len * max_sl];
        let mut image_embeddings = vec![0.0; batch_len * max_sl * image_dim];
        let mut text_embeddings  = vec![0.0; batch_len * max_sl * text_dim];
        let mut sequence_lengths = Vec::with_capacity(batch_len);

        for (row, record) in records.iter().enumerate() {
            let history = record.history();
            let offset  = row * max_sl;

            items[offset..offset + history.len()].copy_from_slice(history);
            recency[offset..offset + history.len()].copy_from_slice(record.history_time());
            sequence_lengths.push(history.len());

            for (l, &item) in history.iter().enumerate() {
                let pos = offset + l;
                image_embeddings[pos * image_dim..(pos + 1) * image_dim]
                    .copy_from_slice(images.lookup(item)?);
                text_embeddings[pos * text_dim..(pos + 1) * text_dim]
                    .copy_from_slice(texts.lookup(item)?);
            }
        }

        Ok(Self {
            batch_len,
            max_sl,
            items,
            recency,
            sequence_lengths,
            image_dim,
            image_embeddings,
            text_dim,
            text_embeddings,
        })
    }

    /// Full padded row `row` of item ids (length `max_sl`).
    pub fn items_row(&self, row: usize) -> &[ItemId] {
        &self.items[row * self.max_sl..(row + 1) * self.max_sl]
    }

    pub fn recency_row(&self, row: usize) -> &[u32] {
        &self.recency[row * self.max_sl..(row + 1) * self.max_sl]
    }

    /// Image vector at (row, position).
    pub fn image_at(&self, row: usize, pos: usize) -> &[f32] {
        let start = (row * self.max_sl + pos) * self.image_dim;
        &self.image_embeddings[start..start + self.image_dim]
    }

    /// Text vector at (row, position).
    pub fn text_at(&self, row: usize, pos: usize) -> &[f32] {
        let start = (row * self.max_sl + pos) * self.text_dim;
        &self.text_embeddings[start..start + self.text_dim]
    }

    /// Number of non-padded positions in the batch.
    pub fn valid_positions(&self) -> usize {
        self.sequence_lengths.iter().sum()
    }

    /// Fraction of [batch_len, max_sl] cells that are padding.
    pub fn padding_ratio(&self) -> f64 {
        let cells = self.batch_len * self.max_sl;
        if cells == 0 {
            return 0.0;
        }
        1.0 - self.valid_positions() as f64 / cells as f64
    }
}

// ─── TrainBatch ───────────────────────────────────────────────────────────────
/// One training batch: binary-labelled target items plus history.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainBatch {
    pub user_ids:    Vec<UserId>,
    pub label_items: Vec<ItemId>,
    pub labels:      Vec<u8>,
    pub history:     PaddedHistory,
}

// ─── EvalBatch ────────────────────────────────────────────────────────────────
/// One evaluation batch: a positive and a negative target per row.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalBatch {
    pub user_ids:       Vec<UserId>,
    pub positive_items: Vec<ItemId>,
    pub negative_items: Vec<ItemId>,
    pub history:        PaddedHistory,
}

// ─── Collate ──────────────────────────────────────────────────────────────────
/// Record types that know how to stack themselves into a batch.
pub trait Collate: HistoryRecord + Sized {
    type Batch;

    fn collate(records: &[Self], images: &ImageTable, texts: &TextTable)
        -> Result<Self::Batch, DataError>;

    /// Rows in a built batch.
    fn batch_len(batch: &Self::Batch) -> usize;

    /// Padded history of a built batch.
    fn padded_history(batch: &Self::Batch) -> &PaddedHistory;
}

impl Collate for TrainExample {
    type Batch = TrainBatch;

    fn collate(records: &[Self], images: &ImageTable, texts: &TextTable)
        -> Result<TrainBatch, DataError>
    {
        let history = PaddedHistory::collate(records, images, texts)?;
        Ok(TrainBatch {
            user_ids:    records.iter().map(|r| r.user_id).collect(),
            label_items: records.iter().map(|r| r.label_item).collect(),
            labels:      records.iter().map(|r| r.label).collect(),
            history,
        })
    }

    fn batch_len(batch: &TrainBatch) -> usize {
        batch.user_ids.len()
    }

    fn padded_history(batch: &TrainBatch) -> &PaddedHistory {
        &batch.history
    }
}

impl Collate for EvalExample {
    type Batch = EvalBatch;

    fn collate(records: &[Self], images: &ImageTable, texts: &TextTable)
        -> Result<EvalBatch, DataError>
    {
        let history = PaddedHistory::collate(records, images, texts)?;
        Ok(EvalBatch {
            user_ids:       records.iter().map(|r| r.user_id).collect(),
            positive_items: records.iter().map(|r| r.positive_item).collect(),
            negative_items: records.iter().map(|r| r.negative_item).collect(),
            history,
        })
    }

    fn batch_len(batch: &EvalBatch) -> usize {
        batch.user_ids.len()
    }

    fn padded_history(batch: &EvalBatch) -> &PaddedHistory {
        &batch.history
    }
}
