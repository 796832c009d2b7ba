// ============================================================
// Layer 2 — BuildUseCase
// ============================================================
// Orchestrates a dataset build in order:
//
//   Step 1: Load reviews and category list     (Layer 4 - data)
//   Step 2: Load image and text tables         (Layer 4 - data)
//   Step 3: Group reviews per user             (Layer 4 - data)
//   Step 4: Build train/test examples          (Layer 4 - data)
//   Step 5: Shuffle both sets                  (Layer 4 - data)
//   Step 6: Assemble and validate the bundle   (Layer 4 - data)
//   Step 7: Save bundle and config             (Layer 5 - infra)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data::{
    builder::{build_examples, group_by_user, NegativeSampler, DEFAULT_MAX_NEG_ATTEMPTS},
    dataset::{CorpusCounts, DatasetBundle},
    embeddings::{ImageTable, TextTable},
    gap::{GapTable, DEFAULT_GAPS},
    loader::{load_categories, load_json, ReviewLoader},
    splitter::shuffle_sets,
};
use crate::domain::review::Review;
use crate::domain::traits::ReviewSource;
use crate::infra::store::DatasetStore;

// ─── Build Configuration ──────────────────────────────────────────────────────
// Persisted next to the dataset so a build can be traced and repeated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    pub reviews_path:     String,
    pub categories_path:  String,
    pub images_path:      String,
    pub texts_path:       String,
    pub out_dir:          String,
    pub seed:             u64,
    pub max_neg_attempts: usize,
    pub shuffle:          bool,
    /// Recency boundaries in days
    pub gaps:             Vec<i64>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            reviews_path:     "raw_data/reviews.jsonl".to_string(),
            categories_path:  "raw_data/categories.json".to_string(),
            images_path:      "raw_data/image_table.json".to_string(),
            texts_path:       "raw_data/text_table.json".to_string(),
            out_dir:          "dataset".to_string(),
            seed:             1234,
            max_neg_attempts: DEFAULT_MAX_NEG_ATTEMPTS,
            shuffle:          true,
            gaps:             DEFAULT_GAPS.to_vec(),
        }
    }
}

// ─── BuildUseCase ─────────────────────────────────────────────────────────────
pub struct BuildUseCase {
    config: BuildConfig,
}

impl BuildUseCase {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Run the full build and persist the result.
    pub fn execute(&self) -> Result<DatasetBundle> {
        let cfg = &self.config;

        // ── Step 1: Reviews and categories ────────────────────────────────────
        let reviews   = ReviewLoader::new(&cfg.reviews_path).load_all()?;
        let cate_list = load_categories(Path::new(&cfg.categories_path))?;

        // ── Step 2: Embedding tables ──────────────────────────────────────────
        let images: ImageTable = load_json(Path::new(&cfg.images_path))?;
        let texts:  TextTable  = load_json(Path::new(&cfg.texts_path))?;

        // ── Steps 3-6 ─────────────────────────────────────────────────────────
        let bundle = assemble(cfg, &reviews, cate_list, images, texts)?;

        // ── Step 7: Persist ───────────────────────────────────────────────────
        let store = DatasetStore::new(&cfg.out_dir)?;
        store.save_config(cfg)?;
        store.save(&bundle)?;

        Ok(bundle)
    }
}

/// Build and validate a bundle from already-loaded inputs.
pub fn assemble(
    cfg:       &BuildConfig,
    reviews:   &[Review],
    cate_list: Vec<u32>,
    images:    ImageTable,
    texts:     TextTable,
) -> Result<DatasetBundle> {
    let gaps = GapTable::new(cfg.gaps.clone())?;

    let groups = group_by_user(reviews);
    tracing::info!("Grouped reviews into {} user histories", groups.len());

    let counts = CorpusCounts {
        user_count:     u32::try_from(groups.len()).context("Too many users for u32 ids")?,
        item_count:     u32::try_from(cate_list.len()).context("Too many items for u32 ids")?,
        category_count: cate_list.iter().max().map_or(0, |&c| c + 1),
    };

    let mut sampler = NegativeSampler::new(cfg.seed, counts.item_count, cfg.max_neg_attempts);
    let mut built   = build_examples(&groups, &gaps, &mut sampler)?;

    if cfg.shuffle {
        shuffle_sets(&mut built.train_set, &mut built.test_set, sampler.rng_mut());
    }

    tracing::info!(
        "Built {} training and {} test examples",
        built.train_set.len(),
        built.test_set.len()
    );

    let bundle = DatasetBundle {
        train_set: built.train_set,
        test_set:  built.test_set,
        cate_list,
        counts,
        images,
        texts,
    };
    bundle.validate().context("Built dataset does not match its embedding tables")?;

    Ok(bundle)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batch::tests::tables;

    const DAY: i64 = 86_400;

    fn reviews() -> Vec<Review> {
        vec![
            Review::new(0, 1, 0),
            Review::new(0, 2, 2 * DAY),
            Review::new(0, 3, 5 * DAY),
            Review::new(1, 4, DAY),
            Review::new(1, 5, 9 * DAY),
            Review::new(2, 6, 0),
        ]
    }

    #[test]
    fn test_assemble_counts_and_sizes() {
        let (images, texts) = tables();
        let cfg    = BuildConfig::default();
        let bundle = assemble(&cfg, &reviews(), vec![0, 1, 2, 0, 1, 2, 0, 1, 2, 0], images, texts).unwrap();

        assert_eq!(bundle.counts, CorpusCounts { user_count: 3, item_count: 10, category_count: 3 });
        // user 0: target 1 train (x2), target 2 test; user 1: one test
        assert_eq!(bundle.train_set.len(), 2);
        assert_eq!(bundle.test_set.len(), 2);
    }

    #[test]
    fn test_assemble_is_seed_deterministic() {
        let cfg = BuildConfig::default();
        let (i1, t1) = tables();
        let (i2, t2) = tables();
        let cates = vec![0; 10];
        let a = assemble(&cfg, &reviews(), cates.clone(), i1, t1).unwrap();
        let b = assemble(&cfg, &reviews(), cates, i2, t2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_assemble_rejects_item_outside_tables() {
        let (images, texts) = tables();
        let cfg = BuildConfig::default();
        let mut rows = reviews();
        rows.push(Review::new(2, 42, DAY));
        assert!(assemble(&cfg, &rows, vec![0; 10], images, texts).is_err());
    }

    #[test]
    fn test_assemble_rejects_bad_gaps() {
        let (images, texts) = tables();
        let cfg = BuildConfig { gaps: vec![4, 2], ..BuildConfig::default() };
        assert!(assemble(&cfg, &reviews(), vec![0; 10], images, texts).is_err());
    }
}
