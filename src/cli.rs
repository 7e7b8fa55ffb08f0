use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "kira-smncnv",
    version,
    about = "Adaptive SMN1/SMN2 exon copy-number calling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Run(RunArgs),
    Thresholds(ThresholdsArgs),
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, help = "Per-exon depth table (TSV, optionally .gz)")]
    pub depth: PathBuf,

    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, help = "Threshold store directory (default: <out>/thresholds)")]
    pub threshold_dir: Option<PathBuf>,

    #[arg(long, help = "MLPA ground-truth table used to calibrate thresholds")]
    pub truth: Option<PathBuf>,

    #[arg(long, help = "Fallback region read counts (TSV)")]
    pub region_counts: Option<PathBuf>,

    #[arg(long, default_value_t = 10.0, help = "Minimum mean depth for a usable exon")]
    pub min_depth: f64,

    #[arg(long, default_value_t = false)]
    pub no_fallback: bool,

    #[arg(long, default_value_t = false)]
    pub force_retrain: bool,

    #[arg(long, default_value_t = 0, help = "Number of threads (0 = auto)")]
    pub threads: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long, default_value_t = false)]
    pub tsv: bool,
}

#[derive(Debug, Args)]
pub struct ThresholdsArgs {
    #[command(subcommand)]
    pub command: ThresholdsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThresholdsCommand {
    Show(ThresholdsShowArgs),
}

#[derive(Debug, Args)]
pub struct ThresholdsShowArgs {
    #[arg(long)]
    pub threshold_dir: PathBuf,

    #[arg(long, help = "Show a specific version instead of the current one")]
    pub version: Option<u32>,

    #[arg(long, default_value_t = false, help = "List every stored version")]
    pub history: bool,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, help = "Per-exon depth table (TSV, optionally .gz)")]
    pub depth: PathBuf,

    #[arg(long)]
    pub truth: Option<PathBuf>,

    #[arg(long)]
    pub region_counts: Option<PathBuf>,
}
