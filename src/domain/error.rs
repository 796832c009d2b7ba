// ============================================================
// Layer 3 — Data Contract Errors
// ============================================================
// Every way an example, an embedding table or a build step can
// violate the batching contract. These are reported to the
// caller and never silently coerced into something valid.

use thiserror::Error;

use crate::domain::example::{ItemId, UserId};

/// Errors raised by the dataset builder and the batching core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    /// A record with no prior interactions reached the batcher.
    #[error("example for user {user_id} has an empty history")]
    EmptyHistory { user_id: UserId },

    /// History and recency sequences are not aligned.
    #[error(
        "example for user {user_id} has {history} history items but {recency} recency codes"
    )]
    LengthMismatch {
        user_id: UserId,
        history: usize,
        recency: usize,
    },

    /// The image index map has no entry for this item.
    #[error("item {item} has no entry in the image index map")]
    MissingImageRow { item: ItemId },

    /// The item resolves to a row outside the embedding matrix.
    #[error("item {item} maps to row {row}, but the embedding matrix has {rows} rows")]
    MissingEmbeddingRow { item: ItemId, row: usize, rows: usize },

    /// Flat embedding data does not divide into rows of `dim`.
    #[error("embedding matrix holds {len} values, not a multiple of dim {dim}")]
    EmbeddingShape { dim: usize, len: usize },

    #[error("batch size must be at least 1")]
    InvalidBatchSize,

    /// The user's positive set covers the whole item catalogue.
    #[error("user {user_id} has reviewed all {item_count} items; no negative item exists")]
    NegativeSamplingExhausted { user_id: UserId, item_count: u32 },

    /// A recency code lies outside the gap table's class range.
    #[error("example for user {user_id} has recency code {code}, but the gap table has {classes} classes")]
    RecencyOutOfRange {
        user_id: UserId,
        code:    u32,
        classes: usize,
    },

    /// A value does not fit the i32 element type of Burn Int tensors.
    #[error("value {value} exceeds the i32 range of an Int tensor")]
    TensorIntOverflow { value: u64 },

    #[error("gap table must be non-empty and strictly ascending, got {0:?}")]
    InvalidGapTable(Vec<i64>),
}
