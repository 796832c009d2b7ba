// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The seams the rest of the pipeline programs against:
//
//   - ReviewSource:  anything that can hand over raw reviews
//                    (JSON-lines file today)
//   - HistoryRecord: anything the batcher can pad, i.e. a
//                    user id plus aligned history/recency slices

use anyhow::Result;

use crate::domain::example::{ItemId, UserId};
use crate::domain::review::Review;

// ─── ReviewSource ─────────────────────────────────────────────────────────────
/// Any component that can load remapped reviews.
///
/// Implementations:
///   - ReviewLoader → reads a JSON-lines file
pub trait ReviewSource {
    /// Load every review available from this source, in file order.
    fn load_all(&self) -> Result<Vec<Review>>;
}

// ─── HistoryRecord ────────────────────────────────────────────────────────────
/// A record carrying a user's interaction history.
///
/// Implementations:
///   - TrainExample
///   - EvalExample
pub trait HistoryRecord {
    fn user_id(&self) -> UserId;

    /// Item ids, oldest first
    fn history(&self) -> &[ItemId];

    /// Recency codes aligned with `history()`
    fn history_time(&self) -> &[u32];
}
