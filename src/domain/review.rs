// ============================================================
// Layer 3 — Review Domain Type
// ============================================================
// A single interaction between a user and an item, after the
// upstream remapping step has turned string ids into dense
// integers. Timestamps are unix seconds.

use serde::{Deserialize, Serialize};

use crate::domain::example::{ItemId, UserId};

/// One remapped review loaded from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub user_id:   UserId,
    pub item_id:   ItemId,
    /// Unix time in seconds
    pub timestamp: i64,
}

impl Review {
    pub fn new(user_id: UserId, item_id: ItemId, timestamp: i64) -> Self {
        Self { user_id, item_id, timestamp }
    }
}
