// ============================================================
// Layer 2 — BatchesUseCase
// ============================================================
// Loads a built dataset and runs one full pass over the train
// and test sets, exactly as a training loop would consume them:
//
//   DatasetStore::load  →  BatchIter  →  TensorBatcher
//
// No model is involved; the pass checks that every batch can be
// materialised and reports its shapes.

use anyhow::{Context, Result};
use burn::backend::NdArray;
use serde::{Deserialize, Serialize};

use crate::data::batch::{Collate, EvalBatch, TrainBatch};
use crate::data::batcher::TensorBatcher;
use crate::data::dataset::DatasetBundle;
use crate::data::iterator::BatchIter;
use crate::domain::error::DataError;
use crate::infra::metrics::{BatchStats, BatchStatsLogger};
use crate::infra::store::DatasetStore;

type PassBackend = NdArray;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchesConfig {
    pub dataset_dir: String,
    pub batch_size:  usize,
    /// Append per-batch rows to <dataset_dir>/batch_stats.csv
    pub stats:       bool,
}

impl Default for BatchesConfig {
    fn default() -> Self {
        Self {
            dataset_dir: "dataset".to_string(),
            batch_size:  32,
            stats:       false,
        }
    }
}

/// Totals for one pass over one split.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassSummary {
    pub batches:         usize,
    pub rows:            usize,
    pub longest_history: usize,
    pub valid_positions: usize,
    pub padded_cells:    usize,
}

impl PassSummary {
    fn record(&mut self, rows: usize, max_sl: usize, valid: usize) {
        self.batches         += 1;
        self.rows            += rows;
        self.longest_history  = self.longest_history.max(max_sl);
        self.valid_positions += valid;
        self.padded_cells    += rows * max_sl - valid;
    }
}

pub struct BatchesUseCase {
    config: BatchesConfig,
}

impl BatchesUseCase {
    pub fn new(config: BatchesConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<(PassSummary, PassSummary)> {
        let cfg    = &self.config;
        let store  = DatasetStore::new(&cfg.dataset_dir)?;
        let bundle = store.load()?;

        let logger = if cfg.stats {
            Some(BatchStatsLogger::new(store.dir())?)
        } else {
            None
        };

        run_pass(&bundle, cfg.batch_size, logger.as_ref())
    }
}

/// One pass over both splits, converting every batch to tensors.
pub fn run_pass(
    bundle:     &DatasetBundle,
    batch_size: usize,
    logger:     Option<&BatchStatsLogger>,
) -> Result<(PassSummary, PassSummary)> {
    let batcher = TensorBatcher::<PassBackend>::new(Default::default());

    let train = drain("train", bundle.train_batches(batch_size)?, logger, |b: &TrainBatch| {
        Ok(batcher.train(b)?.history.items.dims())
    })?;
    let test = drain("test", bundle.eval_batches(batch_size)?, logger, |b: &EvalBatch| {
        Ok(batcher.eval(b)?.history.items.dims())
    })?;

    tracing::info!(
        "Train pass: {} batches, {} rows; test pass: {} batches, {} rows",
        train.batches,
        train.rows,
        test.batches,
        test.rows
    );
    Ok((train, test))
}

fn drain<E, F>(
    split:     &str,
    batches:   BatchIter<'_, E>,
    logger:    Option<&BatchStatsLogger>,
    to_tensor: F,
) -> Result<PassSummary>
where
    E: Collate,
    F: Fn(&E::Batch) -> Result<[usize; 2], DataError>,
{
    let mut summary = PassSummary::default();

    for step in batches {
        let (cursor, batch) = step.with_context(|| format!("Cannot build {split} batch"))?;
        let history = E::padded_history(&batch);

        let dims = to_tensor(&batch)
            .with_context(|| format!("Cannot convert {split} batch {cursor} to tensors"))?;
        debug_assert_eq!(dims, [E::batch_len(&batch), history.max_sl]);

        summary.record(history.batch_len, history.max_sl, history.valid_positions());
        if let Some(logger) = logger {
            logger.log(&BatchStats::from_history(split, cursor, history))?;
        }
    }

    Ok(summary)
}
