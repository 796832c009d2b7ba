// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe what the system works with:
// raw reviews, training/evaluation examples and the errors
// raised when one of them breaks its contract.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

/// One remapped review row: (user, item, timestamp)
pub mod review;

/// Training and evaluation example records
pub mod example;

/// Contract-violation errors shared by the data pipeline
pub mod error;

/// Core abstractions (traits) that other layers implement
pub mod traits;
