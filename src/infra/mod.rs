// ============================================================
// Layer 5 — Infrastructure Layer
// ============================================================
// File-backed concerns used by the application layer:
//
//   store.rs   : dataset bundle and build config persistence
//                (JSON via serde_json)
//
//   metrics.rs : per-batch padding statistics appended to a
//                CSV file

/// Dataset bundle and build config persistence
pub mod store;

/// Batch statistics CSV logger
pub mod metrics;
