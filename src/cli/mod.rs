// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All pipeline logic is delegated to Layer 2 (application).
//
// Four commands are supported:
//   1. `build`      - stroke files → flat train/test artifacts
//   2. `cut`        - one split → padded, normalised tensor
//   3. `plot`       - one sample → HTML figure
//   4. `check-mask` - count mask value collisions in a split
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::{bail, Result};
use clap::Parser;
use commands::{BuildArgs, CheckMaskArgs, Commands, CutArgs, PlotArgs};

use crate::application::{
    build_corpus_use_case::BuildCorpusUseCase,
    check_mask_use_case::CheckMaskUseCase,
    cut_use_case::CutUseCase,
    plot_use_case::PlotUseCase,
};

#[derive(Parser, Debug)]
#[command(
    name = "stroke-corpus",
    version,
    about = "Turn pen-stroke recordings into a padded tensor corpus, and draw samples back."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route the subcommand to its use case. Only this layer prints.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Build(args)     => run_build(args),
            Commands::Cut(args)       => run_cut(args),
            Commands::Plot(args)      => run_plot(args),
            Commands::CheckMask(args) => run_check_mask(args),
        }
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    tracing::info!("Building corpus from: {}", args.root_dir.display());
    let target  = args.target_dir.clone();
    let summary = BuildCorpusUseCase::new(args.into()).execute()?;
    println!(
        "Built {} train and {} test samples in '{}'.",
        summary.train_samples,
        summary.test_samples,
        target.display()
    );
    Ok(())
}

fn run_cut(args: CutArgs) -> Result<()> {
    let outcome = CutUseCase::new(args.into()).execute()?;
    println!(
        "Cut {} samples into '{}' (stats: '{}').",
        outcome.sample_count,
        outcome.tensor_path.display(),
        outcome.record_path.display()
    );
    Ok(())
}

fn run_plot(args: PlotArgs) -> Result<()> {
    let outcome = PlotUseCase::new(args.try_into()?).execute()?;
    println!(
        "Drew sample {} ({} strokes) to '{}'.",
        outcome.index,
        outcome.strokes,
        outcome.output.display()
    );
    Ok(())
}

fn run_check_mask(args: CheckMaskArgs) -> Result<()> {
    let mask_value = args.mask_value;
    let hits = CheckMaskUseCase::new(args.into()).execute()?;
    if hits > 0 {
        bail!("Mask value {mask_value} collides with {hits} real rows");
    }
    println!("Mask value {mask_value} is safe to use.");
    Ok(())
}
