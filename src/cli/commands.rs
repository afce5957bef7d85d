// ============================================================
// Layer 1 - CLI Commands and Arguments
// ============================================================
// Defines the four subcommands: `build`, `cut`, `plot` and
// `check-mask`, and all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use anyhow::anyhow;
use clap::{ArgGroup, Args, Subcommand};
use std::path::PathBuf;

use crate::application::{
    build_corpus_use_case::BuildCorpusConfig,
    check_mask_use_case::CheckMaskConfig,
    config::PipelineConfig,
    cut_use_case::CutConfig,
    plot_use_case::{PlotConfig, PlotSource},
};
use crate::domain::sample::Split;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract every stroke file under a root into train/test artifacts
    Build(BuildArgs),

    /// Cut, normalise and pad one split into a [cut_len, N, 3] tensor
    Cut(CutArgs),

    /// Render one sample of a split or a cut tensor to HTML
    Plot(PlotArgs),

    /// Count rows of a split that collide with a mask value
    CheckMask(CheckMaskArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Root of the stroke file tree (e.g. lineStrokes/)
    #[arg(long)]
    pub root_dir: PathBuf,

    /// Text file listing test-split directory names, one per line
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Where the .npy artifacts are written
    #[arg(long, default_value = "corpus")]
    pub target_dir: PathBuf,

    /// Clip bound for per-axis pen offsets
    #[arg(long, default_value_t = 300)]
    pub max_dist: i32,

    /// Fill gaps between distant points (not supported)
    #[arg(long)]
    pub interpolate: bool,

    /// Extract files on all cores
    #[arg(long)]
    pub parallel: bool,
}

impl From<BuildArgs> for BuildCorpusConfig {
    fn from(a: BuildArgs) -> Self {
        BuildCorpusConfig {
            root_dir:   a.root_dir,
            manifest:   a.manifest,
            target_dir: a.target_dir,
            parallel:   a.parallel,
            pipeline:   PipelineConfig {
                max_dist:    a.max_dist,
                interpolate: a.interpolate,
                ..PipelineConfig::default()
            },
        }
    }
}

#[derive(Args, Debug)]
pub struct CutArgs {
    /// Directory holding the built artifacts
    #[arg(long, default_value = "corpus")]
    pub source_dir: PathBuf,

    /// Which split to cut (train or test)
    #[arg(long, default_value = "train")]
    pub split: Split,

    /// Where the tensor and its stats are written
    #[arg(long, default_value = "corpus")]
    pub target_dir: PathBuf,

    /// Time steps kept per sample
    #[arg(long, default_value_t = 500)]
    pub cut_len: usize,

    /// Pad with zeros instead of the mask value
    #[arg(long)]
    pub no_mask: bool,

    /// Padding sentinel, must not occur in real rows
    #[arg(long, default_value_t = 500.0)]
    pub mask_value: f32,

    /// Keep raw offsets instead of standardising x and y
    #[arg(long)]
    pub no_normalize: bool,
}

impl From<CutArgs> for CutConfig {
    fn from(a: CutArgs) -> Self {
        CutConfig {
            source_dir: a.source_dir,
            split:      a.split,
            target_dir: a.target_dir,
            pipeline:   PipelineConfig {
                cut_len:    a.cut_len,
                mask:       !a.no_mask,
                mask_value: a.mask_value,
                normalize:  !a.no_normalize,
                ..PipelineConfig::default()
            },
        }
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["tensor", "source_dir"])))]
pub struct PlotArgs {
    /// A cut tensor (.npy) written by `cut`
    #[arg(long)]
    pub tensor: Option<PathBuf>,

    /// A directory of built artifacts
    #[arg(long)]
    pub source_dir: Option<PathBuf>,

    /// Split to read from --source-dir
    #[arg(long, default_value = "train")]
    pub split: Split,

    /// Sample to draw; random when omitted
    #[arg(long)]
    pub index: Option<usize>,

    /// HTML file to write
    #[arg(long, default_value = "plot.html")]
    pub output: PathBuf,

    /// First row the running sum is applied to
    #[arg(long, default_value_t = 2)]
    pub accumulate_from: usize,

    /// Pad value of a tensor that has no stats record
    #[arg(long, default_value_t = 500.0)]
    pub mask_value: f32,
}

impl TryFrom<PlotArgs> for PlotConfig {
    type Error = anyhow::Error;

    fn try_from(a: PlotArgs) -> anyhow::Result<Self> {
        let source = match (a.tensor, a.source_dir) {
            (Some(path), _)   => PlotSource::Tensor(path),
            (None, Some(dir)) => PlotSource::Corpus { dir, split: a.split },
            (None, None)      => return Err(anyhow!("Either --tensor or --source-dir is required")),
        };
        Ok(PlotConfig {
            source,
            index:           a.index,
            output:          a.output,
            accumulate_from: a.accumulate_from,
            mask_value:      a.mask_value,
        })
    }
}

#[derive(Args, Debug)]
pub struct CheckMaskArgs {
    /// Directory holding the built artifacts
    #[arg(long, default_value = "corpus")]
    pub source_dir: PathBuf,

    /// Which split to scan
    #[arg(long, default_value = "train")]
    pub split: Split,

    /// Candidate mask value
    #[arg(long, default_value_t = 500.0)]
    pub mask_value: f32,
}

impl From<CheckMaskArgs> for CheckMaskConfig {
    fn from(a: CheckMaskArgs) -> Self {
        CheckMaskConfig {
            source_dir: a.source_dir,
            split:      a.split,
            mask_value: a.mask_value,
        }
    }
}
