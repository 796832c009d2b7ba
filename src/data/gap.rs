// ============================================================
// Layer 4 — Gap Table / Temporal Bucketizer
// ============================================================
// Turns absolute review days into categorical recency codes.
//
// For each history day `t` and the day of the predicted event
// `cur_t`:
//
//   rel  = cur_t - t + 1
//   code = |{ g in gaps : g <= rel }|
//
// With the default doubling table [2, 4, 8, ..., 4096]:
//   rel = 1        → code 0   (same day)
//   rel in [2, 4)  → code 1
//   rel in [4, 8)  → code 2
//   ...
//   rel >= 4096    → code 12  (= number of boundaries)
//
// A history day after `cur_t` gives rel <= 0 and therefore
// code 0. Input is expected to be chronological, so this is
// not treated specially.

use serde::{Deserialize, Serialize};

use crate::domain::error::DataError;

/// Doubling day boundaries used when no table is configured.
pub const DEFAULT_GAPS: [i64; 12] = [2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048, 4096];

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Strictly ascending time-distance boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct GapTable {
    boundaries: Vec<i64>,
}

impl GapTable {
    /// Build a table, rejecting empty or non-ascending boundaries.
    pub fn new(boundaries: Vec<i64>) -> Result<Self, DataError> {
        let ascending = boundaries.windows(2).all(|w| w[0] < w[1]);
        if boundaries.is_empty() || !ascending {
            return Err(DataError::InvalidGapTable(boundaries));
        }
        Ok(Self { boundaries })
    }

    /// Number of distinct codes this table can produce (`0..=len`).
    pub fn num_classes(&self) -> usize {
        self.boundaries.len() + 1
    }

    /// Code for a single relative time: the count of boundaries <= `rel`.
    pub fn code(&self, rel: i64) -> u32 {
        // Boundaries are sorted, so the count is a partition point.
        self.boundaries.partition_point(|&g| g <= rel) as u32
    }

    /// Bucketize a whole history against the time of the predicted event.
    pub fn bucketize(&self, hist_t: &[i64], cur_t: i64) -> Vec<u32> {
        hist_t
            .iter()
            .map(|&abs_time| self.code(cur_t.saturating_sub(abs_time).saturating_add(1)))
            .collect()
    }
}

impl Default for GapTable {
    fn default() -> Self {
        Self { boundaries: DEFAULT_GAPS.to_vec() }
    }
}

impl TryFrom<Vec<i64>> for GapTable {
    type Error = DataError;

    fn try_from(boundaries: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(boundaries)
    }
}

impl From<GapTable> for Vec<i64> {
    fn from(table: GapTable) -> Self {
        table.boundaries
    }
}

/// Convert unix seconds to whole days.
pub fn to_days(timestamp: i64) -> i64 {
    timestamp.div_euclid(SECONDS_PER_DAY)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_boundaries_not_exceeding_rel() {
        let gap = GapTable::new(vec![2, 4, 8, 16]).unwrap();
        // rel = [2, 5, 11, 51]
        assert_eq!(gap.bucketize(&[99, 96, 90, 50], 100), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_same_day_is_code_zero() {
        let gap = GapTable::default();
        assert_eq!(gap.bucketize(&[100], 100), vec![0]);
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let gap = GapTable::default();
        assert_eq!(gap.code(1), 0);
        assert_eq!(gap.code(2), 1);
        assert_eq!(gap.code(3), 1);
        assert_eq!(gap.code(4), 2);
        assert_eq!(gap.code(4096), 12);
        assert_eq!(gap.code(1_000_000), 12);
    }

    #[test]
    fn test_future_event_maps_to_zero() {
        let gap = GapTable::default();
        assert_eq!(gap.bucketize(&[150, 101], 100), vec![0, 0]);
    }

    #[test]
    fn test_extreme_times_do_not_overflow() {
        let gap = GapTable::default();
        assert_eq!(gap.bucketize(&[i64::MIN], i64::MAX), vec![12]);
        assert_eq!(gap.bucketize(&[i64::MAX], i64::MIN), vec![0]);
    }

    #[test]
    fn test_num_classes() {
        assert_eq!(GapTable::default().num_classes(), 13);
    }

    #[test]
    fn test_rejects_invalid_tables() {
        assert!(GapTable::new(vec![]).is_err());
        assert!(GapTable::new(vec![2, 2, 4]).is_err());
        assert!(GapTable::new(vec![8, 4]).is_err());
    }

    #[test]
    fn test_serde_validates_boundaries() {
        let json = serde_json::to_string(&GapTable::default()).unwrap();
        let back: GapTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GapTable::default());
        assert!(serde_json::from_str::<GapTable>("[4, 2]").is_err());
    }

    #[test]
    fn test_seconds_to_days() {
        assert_eq!(to_days(0), 0);
        assert_eq!(to_days(86_399), 0);
        assert_eq!(to_days(86_400), 1);
        assert_eq!(to_days(-1), -1);
    }
}
