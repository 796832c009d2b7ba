// ============================================================
// Layer 5 — Batch Statistics Logger
// ============================================================
// Records one CSV row per produced batch so padding overhead
// can be inspected after a pass:
//
//   split,batch,rows,max_sl,valid_positions,padding_ratio
//   train,1,32,41,512,0.610518
//   train,2,32,17,301,0.446691
//   ...
//
// Output file: <dir>/batch_stats.csv, appended across runs.

use anyhow::Result;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::data::batch::PaddedHistory;

/// One row of per-batch statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStats {
    /// "train" or "test"
    pub split:           String,
    /// 1-based batch cursor
    pub batch:           usize,
    pub rows:            usize,
    pub max_sl:          usize,
    pub valid_positions: usize,
    pub padding_ratio:   f64,
}

impl BatchStats {
    pub fn from_history(split: &str, batch: usize, history: &PaddedHistory) -> Self {
        Self {
            split:           split.to_string(),
            batch,
            rows:            history.batch_len,
            max_sl:          history.max_sl,
            valid_positions: history.valid_positions(),
            padding_ratio:   history.padding_ratio(),
        }
    }
}

/// Appends batch statistics to a CSV file.
pub struct BatchStatsLogger {
    csv_path: PathBuf,
}

impl BatchStatsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join("batch_stats.csv");
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)?;
            writeln!(f, "split,batch,rows,max_sl,valid_positions,padding_ratio")?;
            tracing::debug!("Created batch stats CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, s: &BatchStats) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{},{},{},{},{:.6}",
            s.split,
            s.batch,
            s.rows,
            s.max_sl,
            s.valid_positions,
            s.padding_ratio,
        )?;
        Ok(())
    }
}
