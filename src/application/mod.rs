// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: each use case wires loaders,
// builders and stores together for one CLI command. No data
// math lives here.

/// Reviews → train/test examples → persisted dataset bundle
pub mod build_use_case;

/// Item descriptions → averaged word vectors → text table
pub mod embed_use_case;

/// Dataset bundle → one pass of batches → shape summary
pub mod batches_use_case;
