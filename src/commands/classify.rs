use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::{Cli, ClassifyArgs};
use crate::config::JobConfig;
use crate::io::{read_layer, write_detail_csv, write_summary_csv};
use crate::proj::reproject_layer;
use crate::zoning::{
    MatchStrategy, OverlayLayer, RunStats, ZoneResolver, aggregate, classify_parcels,
};

const DETAIL_FILE: &str = "parcel_zoning_overlay_results.csv";
const SUMMARY_FILE: &str = "parcel_zoning_overlay_results_summary.csv";

pub fn run(_cli: &Cli, args: &ClassifyArgs) -> Result<()> {
    if args.out == Path::new("-") {
        bail!("stdout is not supported.");
    }
    let config = JobConfig::from_path(&args.config)?;
    let strategy = if args.bulk { MatchStrategy::Bulk } else { MatchStrategy::PerParcel };

    let detail_path = args.out.join(DETAIL_FILE);
    let summary_path = args.out.join(SUMMARY_FILE);
    if !args.force && (detail_path.exists() || summary_path.exists()) {
        bail!("Output files already exist in {} (use --force)", args.out.display());
    }

    let stats = execute(&config, &args.out, strategy)?;
    info!(
        classified = stats.classified,
        unzoned = stats.unzoned,
        skipped = stats.skipped,
        "classification complete"
    );
    println!("Wrote results -> {}", detail_path.display());
    println!("Wrote summary -> {}", summary_path.display());
    Ok(())
}

/// Full pipeline: load + reproject layers, build indices, classify,
/// aggregate, write both tables. Returns the run tallies.
pub fn execute(config: &JobConfig, out_dir: &Path, strategy: MatchStrategy) -> Result<RunStats> {
    let start = Instant::now();
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let mut parcels = read_layer(&config.parcels, "parcels")?;
    reproject_layer(&mut parcels, config.source_epsg, config.target_epsg)?;
    info!(records = parcels.len(), "loaded parcel layer");
    if parcels.is_empty() {
        bail!("Parcel layer is empty: {}", config.parcels.display());
    }

    let mut zoning = read_layer(&config.zoning, "zoning_base")?;
    reproject_layer(&mut zoning, config.source_epsg, config.target_epsg)?;
    info!(records = zoning.len(), "loaded base zoning layer");
    if zoning.is_empty() {
        bail!("Base zoning layer is empty: {}", config.zoning.display());
    }

    let mut overlays = Vec::with_capacity(config.overlays.len());
    for source in &config.overlays {
        let mut layer = read_layer(&source.path, &source.code)?;
        reproject_layer(&mut layer, config.source_epsg, config.target_epsg)?;
        info!(overlay = %source.code, records = layer.len(), "loaded overlay layer");
        overlays.push(OverlayLayer::new(source.code.clone(), layer.into_geoms()));
    }

    let resolver = ZoneResolver::new(&zoning, &config.fields.zone_code);
    let (rows, stats) = classify_parcels(&parcels, &resolver, &overlays, &config.fields, strategy);
    let (detail, summary) = aggregate(rows);

    let overlay_codes: Vec<String> = overlays.iter().map(|l| l.code.clone()).collect();
    write_detail_csv(&detail, &overlay_codes, &config.fields, &out_dir.join(DETAIL_FILE))?;
    write_summary_csv(&summary, &out_dir.join(SUMMARY_FILE))?;

    info!(elapsed = ?start.elapsed(), "pipeline finished");
    Ok(stats)
}
