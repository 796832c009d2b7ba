// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case in Layer 2. Nothing is computed here.

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{BatchesArgs, BuildArgs, Commands, EmbedArgs};

#[derive(Parser, Debug)]
#[command(
    name = "seqrec-data",
    version,
    about = "Build sequential-recommendation datasets and materialise padded batches."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::BuildDataset(args) => run_build(args),
            Commands::EmbedText(args)    => run_embed(args),
            Commands::Batches(args)      => run_batches(args),
        }
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    use crate::application::build_use_case::BuildUseCase;

    tracing::info!("Building dataset from '{}'", args.reviews);
    let out_dir = args.out_dir.clone();
    let bundle  = BuildUseCase::new(args.into()).execute()?;

    println!(
        "Dataset written to '{}': {} train / {} test examples, {} users, {} items.",
        out_dir,
        bundle.train_set.len(),
        bundle.test_set.len(),
        bundle.counts.user_count,
        bundle.counts.item_count,
    );
    Ok(())
}

fn run_embed(args: EmbedArgs) -> Result<()> {
    use crate::application::embed_use_case::EmbedUseCase;

    let out   = args.out.clone();
    let table = EmbedUseCase::new(args.into()).execute()?;

    println!(
        "Text table written to '{}': {} rows of dim {}.",
        out,
        table.matrix.rows(),
        table.matrix.dim(),
    );
    Ok(())
}

fn run_batches(args: BatchesArgs) -> Result<()> {
    use crate::application::batches_use_case::BatchesUseCase;

    let batch_size    = args.batch_size;
    let (train, test) = BatchesUseCase::new(args.into()).execute()?;

    for (split, s) in [("train", &train), ("test", &test)] {
        let cells = s.valid_positions + s.padded_cells;
        let padding = if cells > 0 { s.padded_cells as f64 / cells as f64 } else { 0.0 };
        println!(
            "{:<5} | batch_size={} | batches={} | rows={} | longest={} | padding={:.1}%",
            split, batch_size, s.batches, s.rows, s.longest_history, padding * 100.0,
        );
    }
    Ok(())
}
