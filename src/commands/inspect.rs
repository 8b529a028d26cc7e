use std::collections::BTreeMap;

use anyhow::Result;
use geo::BoundingRect;

use crate::cli::{Cli, InspectArgs};
use crate::io::read_layer;

/// Print a quick structural summary of one layer: record count, bounds, and
/// the attribute columns of the first record.
pub fn run(_cli: &Cli, args: &InspectArgs) -> Result<()> {
    let layer = read_layer(&args.layer, "layer")?;

    println!("Number of records: {}", layer.len());

    let mut ring_counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for record in &layer.records {
        let k = match record.geom.0.len() {
            0 => "empty",
            1 => "single polygon",
            _ => "multi polygon",
        };
        *ring_counts.entry(k).or_default() += 1;
    }
    println!("Geometry mix:");
    for (k, v) in ring_counts {
        println!("  - {}: {}", k, v);
    }

    let bounds = layer
        .geoms()
        .filter_map(|g| g.bounding_rect())
        .reduce(|acc, rect| {
            geo::Rect::new(
                geo::Coord {
                    x: acc.min().x.min(rect.min().x),
                    y: acc.min().y.min(rect.min().y),
                },
                geo::Coord {
                    x: acc.max().x.max(rect.max().x),
                    y: acc.max().y.max(rect.max().y),
                },
            )
        });
    if let Some(rect) = bounds {
        println!(
            "Bounds: ({}, {}) - ({}, {})",
            rect.min().x,
            rect.min().y,
            rect.max().x,
            rect.max().y
        );
    }

    if let Some(record) = layer.records.first() {
        let columns: BTreeMap<_, _> = record.attrs.iter().collect();
        println!("Attribute columns:");
        for (field, value) in columns {
            println!("  - {} ({})", field, value);
        }
    }
    Ok(())
}
