use ahash::AHashMap;
use geo::MultiPolygon;

/// One record of a geometry layer: a shape plus its attribute row.
#[derive(Debug, Clone)]
pub struct LayerRecord {
    pub geom: MultiPolygon<f64>,
    pub attrs: AHashMap<String, String>,
}

impl LayerRecord {
    pub fn new(geom: MultiPolygon<f64>, attrs: AHashMap<String, String>) -> Self {
        Self { geom, attrs }
    }
}

/// A named in-memory geometry layer. All records share one planar CRS;
/// reprojection happens at load time, before any indexing or intersection test.
#[derive(Debug, Clone)]
pub struct GeomLayer {
    pub name: String,
    pub records: Vec<LayerRecord>,
}

impl GeomLayer {
    pub fn new(name: impl Into<String>, records: Vec<LayerRecord>) -> Self {
        Self { name: name.into(), records }
    }

    #[inline] pub fn len(&self) -> usize { self.records.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Attribute of record `idx`, or `default` when the field is absent or empty.
    pub fn attr_or<'a>(&'a self, idx: usize, field: &str, default: &'a str) -> &'a str {
        match self.records[idx].attrs.get(field) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }

    /// Record identifier: the configured id field, falling back to the row index.
    pub fn record_id(&self, idx: usize, field: &str) -> String {
        match self.records[idx].attrs.get(field) {
            Some(value) if !value.is_empty() => value.clone(),
            _ => idx.to_string(),
        }
    }

    pub fn geoms(&self) -> impl Iterator<Item = &MultiPolygon<f64>> {
        self.records.iter().map(|r| &r.geom)
    }

    pub fn into_geoms(self) -> Vec<MultiPolygon<f64>> {
        self.records.into_iter().map(|r| r.geom).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, Rect};

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        let rect = Rect::new(Coord { x, y }, Coord { x: x + size, y: y + size });
        MultiPolygon(vec![rect.to_polygon()])
    }

    #[test]
    fn record_id_falls_back_to_row_index() {
        let mut attrs = AHashMap::new();
        attrs.insert("MAPBLOCKLO".to_string(), "12-A-100".to_string());
        let layer = GeomLayer::new("parcels", vec![
            LayerRecord::new(square(0.0, 0.0, 1.0), attrs),
            LayerRecord::new(square(2.0, 0.0, 1.0), AHashMap::new()),
        ]);
        assert_eq!(layer.record_id(0, "MAPBLOCKLO"), "12-A-100");
        assert_eq!(layer.record_id(1, "MAPBLOCKLO"), "1");
    }

    #[test]
    fn attr_or_treats_empty_as_absent() {
        let mut attrs = AHashMap::new();
        attrs.insert("zon_new".to_string(), String::new());
        let layer = GeomLayer::new("zoning", vec![LayerRecord::new(square(0.0, 0.0, 1.0), attrs)]);
        assert_eq!(layer.attr_or(0, "zon_new", "Unknown"), "Unknown");
    }
}
