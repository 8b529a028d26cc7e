use geo::{BoundingRect, Intersects, MultiPolygon};

use crate::index::SpatialIndex;
use crate::layer::GeomLayer;

/// Zone code reported when the base record intersects but carries no code.
pub const UNKNOWN_ZONE: &str = "Unknown";

/// Resolves a parcel to its base zoning district by first true intersection.
///
/// Candidates come back from the index in ascending record order, so the
/// tie-break between overlapping zone polygons (digitization slivers) is
/// stable across runs: the lowest-indexed intersecting record wins. This is a
/// documented first-match policy, not a geometric-dominance rule.
pub struct ZoneResolver<'a> {
    layer: &'a GeomLayer,
    index: SpatialIndex,
    zone_field: &'a str,
}

impl<'a> ZoneResolver<'a> {
    pub fn new(layer: &'a GeomLayer, zone_field: &'a str) -> Self {
        let index = SpatialIndex::build(layer.geoms());
        Self { layer, index, zone_field }
    }

    /// Zone code of the first base record truly intersecting the parcel, or
    /// `None` when the parcel is unzoned and must be dropped from all output.
    pub fn resolve(&self, parcel: &MultiPolygon<f64>) -> Option<&'a str> {
        let rect = parcel.bounding_rect()?;
        for idx in self.index.query(rect) {
            if self.layer.records[idx].geom.intersects(parcel) {
                return Some(self.layer.attr_or(idx, self.zone_field, UNKNOWN_ZONE));
            }
        }
        None
    }
}
