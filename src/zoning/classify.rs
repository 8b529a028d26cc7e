use geo::{Area, BoundingRect};
use tracing::warn;

use crate::config::FieldNames;
use crate::layer::GeomLayer;

use super::{OverlayLayer, ZoneResolver, composite_label, match_overlays, match_overlays_bulk};

/// Planar areas are computed in square meters (EPSG:3857 and friends) and
/// reported in square feet.
pub const SQ_FT_PER_SQ_M: f64 = 10.763_910_416_709_722;

/// Fully classified parcel row, one per parcel that resolved to a base zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub parcel_id: String,
    pub muni_code: String,
    pub zone: String,
    pub area_sqft: f64,
    /// One flag per overlay layer, in declaration order.
    pub flags: Vec<bool>,
    /// Composite label, e.g. "R1-FP-HO".
    pub label: String,
}

/// How overlay membership is computed; both strategies yield identical flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Test each parcel against each overlay layer's index.
    PerParcel,
    /// Join the whole parcel set against each overlay layer at once.
    Bulk,
}

/// Per-run tallies reported once at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub classified: usize,
    /// Parcels intersecting no base zone polygon; excluded by design.
    pub unzoned: usize,
    /// Parcels skipped for per-record anomalies (empty geometry).
    pub skipped: usize,
}

/// Classify every parcel: resolve its base zone, match overlays, compute its
/// area, and build the composite label. Unzoned parcels are dropped (a
/// filter, not an error); anomalous records are skipped with a warning.
pub fn classify_parcels(
    parcels: &GeomLayer,
    resolver: &ZoneResolver<'_>,
    overlays: &[OverlayLayer],
    fields: &FieldNames,
    strategy: MatchStrategy,
) -> (Vec<Classification>, RunStats) {
    let bulk_flags = match strategy {
        MatchStrategy::PerParcel => None,
        MatchStrategy::Bulk => {
            let geoms: Vec<_> = parcels.geoms().cloned().collect();
            Some(match_overlays_bulk(&geoms, overlays))
        }
    };

    let mut rows = Vec::with_capacity(parcels.len());
    let mut stats = RunStats::default();

    for (idx, record) in parcels.records.iter().enumerate() {
        let parcel_id = parcels.record_id(idx, &fields.parcel_id);

        if record.geom.bounding_rect().is_none() {
            warn!(parcel = %parcel_id, "skipping parcel with empty geometry");
            stats.skipped += 1;
            continue;
        }

        let Some(zone) = resolver.resolve(&record.geom) else {
            stats.unzoned += 1;
            continue;
        };

        let flags = match &bulk_flags {
            Some(table) => table[idx].clone(),
            None => match_overlays(&record.geom, overlays),
        };
        let matched = flags
            .iter()
            .zip(overlays)
            .filter_map(|(&hit, layer)| hit.then_some(layer.code.as_str()));
        let label = composite_label(zone, matched);

        rows.push(Classification {
            parcel_id,
            muni_code: parcels.attr_or(idx, &fields.muni_code, "").to_string(),
            zone: zone.to_string(),
            area_sqft: record.geom.unsigned_area() * SQ_FT_PER_SQ_M,
            flags,
            label,
        });
        stats.classified += 1;
    }

    (rows, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::LayerRecord;
    use ahash::AHashMap;
    use geo::{Coord, MultiPolygon, Rect};

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        let rect = Rect::new(Coord { x, y }, Coord { x: x + size, y: y + size });
        MultiPolygon(vec![rect.to_polygon()])
    }

    fn parcel(id: &str, x: f64, y: f64, size: f64) -> LayerRecord {
        let mut attrs = AHashMap::new();
        attrs.insert("MAPBLOCKLO".to_string(), id.to_string());
        attrs.insert("MUNICODE".to_string(), "829".to_string());
        LayerRecord::new(square(x, y, size), attrs)
    }

    fn zone_layer() -> GeomLayer {
        let mut attrs = AHashMap::new();
        attrs.insert("zon_new".to_string(), "R1".to_string());
        GeomLayer::new("zoning", vec![LayerRecord::new(square(0.0, 0.0, 100.0), attrs)])
    }

    fn run(strategy: MatchStrategy) -> (Vec<Classification>, RunStats) {
        let parcels = GeomLayer::new(
            "parcels",
            vec![
                parcel("12-A-100", 1.0, 1.0, 2.0),
                parcel("12-A-101", 50.0, 50.0, 2.0),
                parcel("99-Z-999", 500.0, 500.0, 2.0), // unzoned
                LayerRecord::new(MultiPolygon(vec![]), AHashMap::new()), // anomalous
            ],
        );
        let zoning = zone_layer();
        let overlays = vec![
            OverlayLayer::new("IZ", vec![square(200.0, 200.0, 10.0)]),
            OverlayLayer::new("FP", vec![square(0.0, 0.0, 10.0)]),
            OverlayLayer::new("HO", vec![square(0.0, 0.0, 60.0)]),
        ];
        let resolver = ZoneResolver::new(&zoning, "zon_new");
        let fields = FieldNames::default();
        classify_parcels(&parcels, &resolver, &overlays, &fields, strategy)
    }

    #[test]
    fn classification_labels_and_stats() {
        let (rows, stats) = run(MatchStrategy::PerParcel);
        assert_eq!(stats, RunStats { classified: 2, unzoned: 1, skipped: 1 });
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].parcel_id, "12-A-100");
        assert_eq!(rows[0].label, "R1-FP-HO");
        assert_eq!(rows[1].label, "R1-HO");
        assert_eq!(rows[0].muni_code, "829");
        let expected = 4.0 * SQ_FT_PER_SQ_M;
        assert!((rows[0].area_sqft - expected).abs() < 1e-9);
    }

    #[test]
    fn bulk_strategy_produces_identical_rows() {
        let (per_parcel, stats_a) = run(MatchStrategy::PerParcel);
        let (bulk, stats_b) = run(MatchStrategy::Bulk);
        assert_eq!(per_parcel, bulk);
        assert_eq!(stats_a, stats_b);
    }
}
