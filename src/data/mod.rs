// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw review rows to model-ready batches.
//
//   reviews.jsonl
//       │
//       ▼
//   ReviewLoader       → remapped (user, item, timestamp) rows
//       │
//       ▼
//   group_by_user      → per-user histories, oldest first
//       │
//       ▼
//   build_examples     → train/test examples, recency codes
//       │                via GapTable, negatives via
//       │                NegativeSampler
//       ▼
//   DatasetBundle      → examples + category list + counts +
//       │                image/text embedding tables
//       ▼
//   BatchIter          → padded host batches, one per step
//       │
//       ▼
//   TensorBatcher      → Burn tensors
//
// Item descriptions take a side path: Preprocessor cleans them
// and SentenceEmbedder averages word vectors into a TextTable.

/// Reads reviews, category lists and serialised tables
pub mod loader;

/// Time-gap boundaries and recency bucketing
pub mod gap;

/// Suffix train/test split and seeded shuffling
pub mod splitter;

/// Per-user grouping, negative sampling and example building
pub mod builder;

/// Image/text embedding matrices addressed by item id
pub mod embeddings;

/// Persisted dataset bundle
pub mod dataset;

/// Padding and embedding gather for one batch
pub mod batch;

/// Lazy single-pass batch iterators
pub mod iterator;

/// Burn tensor conversion
pub mod batcher;

/// Description cleaning and stop-word removal
pub mod preprocessor;

/// Word-vector sentence embeddings
pub mod text_embedder;
