// ============================================================
// seqrec-data — library root
// ============================================================
// Layer map:
//
//   cli          → argument parsing, subcommand routing
//   application  → use cases (build, embed, batches)
//   domain       → records, contracts, errors
//   data         → builder, embedding tables, batching core
//   infra        → dataset store, batch statistics

pub mod application;
pub mod cli;
pub mod data;
pub mod domain;
pub mod infra;
