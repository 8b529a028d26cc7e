use std::fs;
use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result, anyhow};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;
use tracing::warn;

use crate::layer::{GeomLayer, LayerRecord};

/// Read a GeoJSON FeatureCollection into a layer. Polygon and MultiPolygon
/// features are kept with their properties; features with other geometry
/// types are skipped with a warning (per-record anomaly, not an input error).
pub fn read_geojson_layer(path: &Path, name: &str) -> Result<GeomLayer> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read layer file: {}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Failed to parse GeoJSON: {}", path.display()))?;

    let features = value["features"]
        .as_array()
        .ok_or_else(|| anyhow!("{}: not a GeoJSON FeatureCollection", path.display()))?;

    let mut records = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let geometry = &feature["geometry"];
        let geom = match geometry["type"].as_str() {
            Some("Polygon") => {
                let coords = geometry["coordinates"]
                    .as_array()
                    .ok_or_else(|| anyhow!("feature {idx}: Polygon without coordinates"))?;
                MultiPolygon(vec![parse_polygon_coords(coords)?])
            }
            Some("MultiPolygon") => {
                let coords = geometry["coordinates"]
                    .as_array()
                    .ok_or_else(|| anyhow!("feature {idx}: MultiPolygon without coordinates"))?;
                parse_multipolygon_coords(coords)?
            }
            other => {
                warn!(layer = name, feature = idx, geometry = ?other, "skipping non-polygon feature");
                continue;
            }
        };
        let attrs = feature["properties"]
            .as_object()
            .map(flatten_properties)
            .unwrap_or_default();
        records.push(LayerRecord::new(geom, attrs));
    }

    Ok(GeomLayer::new(name, records))
}

/// Scalar properties become strings; null and nested values are dropped.
fn flatten_properties(map: &serde_json::Map<String, Value>) -> AHashMap<String, String> {
    map.iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => return None,
            };
            Some((key.clone(), text))
        })
        .collect()
}

/// GeoJSON MultiPolygon coordinates: an array of polygons, each an array of
/// rings (first exterior, rest holes).
fn parse_multipolygon_coords(coords: &[Value]) -> Result<MultiPolygon<f64>> {
    let polygons = coords
        .iter()
        .filter_map(|polygon| polygon.as_array())
        .map(|rings| parse_polygon_coords(rings))
        .collect::<Result<Vec<_>>>()?;
    Ok(MultiPolygon(polygons))
}

fn parse_polygon_coords(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut parsed = rings.iter().filter_map(|ring| ring.as_array());
    let exterior = match parsed.next() {
        Some(ring) => parse_ring_coords(ring)?,
        None => return Err(anyhow!("Polygon without an exterior ring")),
    };
    let interiors = parsed
        .map(|ring| parse_ring_coords(ring))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

/// Parse one ring: [[x, y], [x, y], ...], closing it if the source left the
/// first coordinate off the end.
fn parse_ring_coords(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());
    for pair in coords {
        if let Some(pair) = pair.as_array() {
            if pair.len() >= 2 {
                let x = pair[0]
                    .as_f64()
                    .ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
                let y = pair[1]
                    .as_f64()
                    .ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
                points.push(Coord { x, y });
            }
        }
    }
    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }
    Ok(LineString(points))
}
