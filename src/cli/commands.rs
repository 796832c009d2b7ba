// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Three subcommands:
//
//   build-dataset  reviews + tables → dataset bundle
//   embed-text     descriptions + word vectors → text table
//   batches        dataset bundle → one batching pass
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    batches_use_case::BatchesConfig,
    build_use_case::BuildConfig,
    embed_use_case::EmbedConfig,
};
use crate::data::builder::DEFAULT_MAX_NEG_ATTEMPTS;
use crate::data::gap::DEFAULT_GAPS;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build train/test examples from remapped reviews
    BuildDataset(BuildArgs),

    /// Precompute text embeddings for item descriptions
    EmbedText(EmbedArgs),

    /// Run one batching pass over a built dataset
    Batches(BatchesArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// JSON-lines file of {"user_id", "item_id", "timestamp"} rows
    #[arg(long, default_value = "raw_data/reviews.jsonl")]
    pub reviews: String,

    /// JSON array mapping item id → category id
    #[arg(long, default_value = "raw_data/categories.json")]
    pub categories: String,

    /// Serialised image table (index map + matrix)
    #[arg(long, default_value = "raw_data/image_table.json")]
    pub images: String,

    /// Serialised text table, e.g. written by `embed-text`
    #[arg(long, default_value = "raw_data/text_table.json")]
    pub texts: String,

    /// Directory for dataset.json and build_config.json
    #[arg(long, default_value = "dataset")]
    pub out_dir: String,

    /// Seed for negative sampling and shuffling
    #[arg(long, default_value_t = 1234)]
    pub seed: u64,

    /// Random draws per negative before falling back to a scan
    #[arg(long, default_value_t = DEFAULT_MAX_NEG_ATTEMPTS)]
    pub max_neg_attempts: usize,

    /// Keep train/test sets in user order instead of shuffling
    #[arg(long)]
    pub no_shuffle: bool,

    /// Recency boundaries in days, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_GAPS)]
    pub gaps: Vec<i64>,
}

impl From<BuildArgs> for BuildConfig {
    fn from(a: BuildArgs) -> Self {
        BuildConfig {
            reviews_path:     a.reviews,
            categories_path:  a.categories,
            images_path:      a.images,
            texts_path:       a.texts,
            out_dir:          a.out_dir,
            seed:             a.seed,
            max_neg_attempts: a.max_neg_attempts,
            shuffle:          !a.no_shuffle,
            gaps:             a.gaps,
        }
    }
}

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Word vectors in fastText .vec text format
    #[arg(long)]
    pub vectors: String,

    /// JSON array of item descriptions, index = item id
    #[arg(long, default_value = "raw_data/descriptions.json")]
    pub descriptions: String,

    /// Where to write the text table
    #[arg(long, default_value = "raw_data/text_table.json")]
    pub out: String,

    /// Only load the first N word vectors
    #[arg(long)]
    pub max_words: Option<usize>,
}

impl From<EmbedArgs> for EmbedConfig {
    fn from(a: EmbedArgs) -> Self {
        EmbedConfig {
            vectors_path:      a.vectors,
            descriptions_path: a.descriptions,
            out_path:          a.out,
            max_words:         a.max_words,
        }
    }
}

#[derive(Args, Debug)]
pub struct BatchesArgs {
    /// Directory written by `build-dataset`
    #[arg(long, default_value = "dataset")]
    pub dataset_dir: String,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Append per-batch statistics to batch_stats.csv
    #[arg(long)]
    pub stats: bool,
}

impl From<BatchesArgs> for BatchesConfig {
    fn from(a: BatchesArgs) -> Self {
        BatchesConfig {
            dataset_dir: a.dataset_dir,
            batch_size:  a.batch_size,
            stats:       a.stats,
        }
    }
}
