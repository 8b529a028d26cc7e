use std::path::Path;

use ahash::AHashMap;
use anyhow::{Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use shapefile::{PolygonRing, Shape, dbase::FieldValue};
use tracing::warn;

use crate::layer::{GeomLayer, LayerRecord};

/// Read a shapefile (plus its dbf attribute table) into a layer. Non-polygon
/// shapes are skipped with a warning.
pub fn read_shapefile_layer(path: &Path, name: &str) -> Result<GeomLayer> {
    let mut reader = shapefile::Reader::from_path(path)
        .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

    let mut records = Vec::with_capacity(reader.shape_count()?);
    for (idx, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .with_context(|| format!("{}: error reading shape+record {idx}", path.display()))?;
        let geom = match shape {
            Shape::Polygon(p) => shp_to_geo(&p),
            other => {
                warn!(layer = name, record = idx, shape = %other.shapetype(), "skipping non-polygon shape");
                continue;
            }
        };

        let mut attrs = AHashMap::new();
        for (field, value) in record {
            if let Some(text) = field_to_string(value) {
                attrs.insert(field, text);
            }
        }
        records.push(LayerRecord::new(geom, attrs));
    }

    Ok(GeomLayer::new(name, records))
}

fn field_to_string(value: FieldValue) -> Option<String> {
    match value {
        FieldValue::Character(v) => v,
        FieldValue::Numeric(v) => v.map(|n| n.to_string()),
        FieldValue::Float(v) => v.map(|n| n.to_string()),
        FieldValue::Integer(n) => Some(n.to_string()),
        FieldValue::Double(n) => Some(n.to_string()),
        FieldValue::Logical(v) => v.map(|b| b.to_string()),
        FieldValue::Date(v) => {
            v.map(|d| format!("{:04}-{:02}-{:02}", d.year(), d.month(), d.day()))
        }
        _ => None,
    }
}

/// Convert a shapefile polygon to geo::MultiPolygon. Shapefiles store rings
/// flat, each outer ring followed by its holes; regroup them accordingly.
fn shp_to_geo(p: &shapefile::Polygon) -> MultiPolygon<f64> {
    fn close_ring(ring: &[shapefile::Point]) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> =
            ring.iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect();
        if let Some(&first) = coords.first() {
            if coords[coords.len() - 1] != first {
                coords.push(first);
            }
        }
        LineString(coords)
    }

    let mut polys: Vec<Polygon<f64>> = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes: Vec<LineString<f64>> = Vec::new();

    for ring in p.rings() {
        match ring {
            PolygonRing::Outer(points) => {
                if let Some(ext) = exterior.take() {
                    polys.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
                exterior = Some(close_ring(points));
            }
            // Holes before any outer ring have nothing to attach to; drop them.
            PolygonRing::Inner(points) => {
                if exterior.is_some() {
                    holes.push(close_ring(points));
                }
            }
        }
    }
    if let Some(ext) = exterior {
        polys.push(Polygon::new(ext, holes));
    }

    MultiPolygon(polys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shapefile::Point;

    #[test]
    fn rings_regroup_into_polygons_with_holes() {
        let shp_poly = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 10.0),
                Point::new(10.0, 10.0),
                Point::new(10.0, 0.0),
                Point::new(0.0, 0.0),
            ]),
            PolygonRing::Inner(vec![
                Point::new(2.0, 2.0),
                Point::new(4.0, 2.0),
                Point::new(4.0, 4.0),
                Point::new(2.0, 4.0),
                Point::new(2.0, 2.0),
            ]),
            PolygonRing::Outer(vec![
                Point::new(20.0, 0.0),
                Point::new(20.0, 5.0),
                Point::new(25.0, 5.0),
                Point::new(25.0, 0.0),
                Point::new(20.0, 0.0),
            ]),
        ]);
        let mp = shp_to_geo(&shp_poly);
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert_eq!(mp.0[1].interiors().len(), 0);
    }

    #[test]
    fn open_rings_are_closed() {
        let shp_poly = shapefile::Polygon::with_rings(vec![PolygonRing::Outer(vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 0.0),
        ])]);
        let mp = shp_to_geo(&shp_poly);
        let exterior = mp.0[0].exterior();
        assert_eq!(exterior.0.first(), exterior.0.last());
    }
}
