//! Detail and summary table writing.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{Column, CsvWriter, NamedFrom}, series::Series};

use crate::config::FieldNames;
use crate::zoning::{Classification, SummaryRow};

/// Write a DataFrame to a CSV file.
fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::csv] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("[io::csv] Failed to write CSV to {:?}", path))
}

/// Write the detail table: one row per classified parcel. Overlay columns
/// carry the overlay's own code when matched, else an empty cell, in
/// declaration order.
pub fn write_detail_csv(
    rows: &[Classification],
    overlay_codes: &[String],
    fields: &FieldNames,
    path: &Path,
) -> Result<()> {
    let mut columns: Vec<Column> = Vec::with_capacity(overlay_codes.len() + 5);
    columns.push(
        Series::new(
            fields.parcel_id.as_str().into(),
            rows.iter().map(|r| r.parcel_id.clone()).collect::<Vec<_>>(),
        )
        .into(),
    );
    columns.push(
        Series::new(
            fields.zone_code.as_str().into(),
            rows.iter().map(|r| r.zone.clone()).collect::<Vec<_>>(),
        )
        .into(),
    );
    // Unmatched cells are None: polars renders null as a bare empty cell,
    // while an empty String would come out quoted ("").
    for (i, code) in overlay_codes.iter().enumerate() {
        let cells: Vec<Option<String>> =
            rows.iter().map(|r| r.flags[i].then(|| code.clone())).collect();
        columns.push(Series::new(code.as_str().into(), cells).into());
    }
    columns.push(
        Series::new(
            fields.muni_code.as_str().into(),
            rows.iter()
                .map(|r| (!r.muni_code.is_empty()).then(|| r.muni_code.clone()))
                .collect::<Vec<Option<String>>>(),
        )
        .into(),
    );
    columns.push(
        Series::new("area_sqft".into(), rows.iter().map(|r| r.area_sqft).collect::<Vec<f64>>())
            .into(),
    );
    columns.push(
        Series::new(
            "zoning_summary".into(),
            rows.iter().map(|r| r.label.clone()).collect::<Vec<_>>(),
        )
        .into(),
    );

    let mut df = DataFrame::new(columns)?;
    write_csv(&mut df, path)
}

/// Write the summary table: one row per distinct composite label.
pub fn write_summary_csv(rows: &[SummaryRow], path: &Path) -> Result<()> {
    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
    let counts: Vec<u32> = rows.iter().map(|r| r.count).collect();
    let areas: Vec<f64> = rows.iter().map(|r| r.area_sqft).collect();

    let mut df = DataFrame::new(vec![
        Series::new("zoning_summary".into(), labels).into(),
        Series::new("count".into(), counts).into(),
        Series::new("total_area_sqft".into(), areas).into(),
    ])?;

    write_csv(&mut df, path)
}
