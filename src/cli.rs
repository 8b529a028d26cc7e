use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

/// Parcel zoning classifier CLI (argument schema only)
#[derive(Parser, Debug)]
#[command(name = "zonewise", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify parcels against the base zoning map and overlay districts
    Classify(ClassifyArgs),

    /// Print a quick structural summary of one geometry layer
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Job configuration file (JSON): layer paths, overlay list, field names
    #[arg(value_hint = ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output directory for the detail and summary tables
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub out: PathBuf,

    /// Join the whole parcel set against each overlay layer at once
    #[arg(long)]
    pub bulk: bool,

    /// Overwrite output files if they already exist (off by default)
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Geometry layer to summarize (.geojson, .json, or .shp)
    #[arg(value_hint = ValueHint::FilePath)]
    pub layer: PathBuf,
}
