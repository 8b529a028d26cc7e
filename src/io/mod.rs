mod csv;
mod geojson;
mod shp;

use std::path::Path;

use anyhow::{Result, bail};

use crate::layer::GeomLayer;

pub use csv::{write_detail_csv, write_summary_csv};
pub use geojson::read_geojson_layer;
pub use shp::read_shapefile_layer;

/// Read a named polygon layer, dispatching on the file extension.
pub fn read_layer(path: &Path, name: &str) -> Result<GeomLayer> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("geojson") | Some("json") => read_geojson_layer(path, name),
        Some("shp") => read_shapefile_layer(path, name),
        _ => bail!("Unsupported layer format: {}", path.display()),
    }
}
