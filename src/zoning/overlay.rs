use geo::{BoundingRect, Intersects, MultiPolygon};

use crate::index::SpatialIndex;

/// One overlay district layer: a short code plus its polygons and a prebuilt
/// bounding-box index. Membership is boolean per parcel; partial-area
/// semantics are out of scope.
#[derive(Debug, Clone)]
pub struct OverlayLayer {
    pub code: String,
    geoms: Vec<MultiPolygon<f64>>,
    index: SpatialIndex,
}

impl OverlayLayer {
    pub fn new(code: impl Into<String>, geoms: Vec<MultiPolygon<f64>>) -> Self {
        let index = SpatialIndex::build(&geoms);
        Self { code: code.into(), geoms, index }
    }

    #[inline] pub fn len(&self) -> usize { self.geoms.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.geoms.is_empty() }

    /// True iff the parcel truly intersects any polygon of this layer.
    pub fn matches(&self, parcel: &MultiPolygon<f64>) -> bool {
        let Some(rect) = parcel.bounding_rect() else { return false };
        self.index
            .query(rect)
            .into_iter()
            .any(|idx| self.geoms[idx].intersects(parcel))
    }
}

/// Per-parcel form: one flag per overlay layer, in declaration order. A pure
/// function of (parcel, layers); no shared accumulator.
pub fn match_overlays(parcel: &MultiPolygon<f64>, layers: &[OverlayLayer]) -> Vec<bool> {
    layers.iter().map(|layer| layer.matches(parcel)).collect()
}

/// Bulk form: joins the whole parcel set against each overlay layer at once
/// by querying a parcel-side index with every overlay polygon and marking the
/// parcels it truly intersects. Produces exactly the per-parcel flags.
pub fn match_overlays_bulk(
    parcels: &[MultiPolygon<f64>],
    layers: &[OverlayLayer],
) -> Vec<Vec<bool>> {
    let parcel_index = SpatialIndex::build(parcels);
    let mut flags = vec![vec![false; layers.len()]; parcels.len()];

    for (l, layer) in layers.iter().enumerate() {
        for geom in &layer.geoms {
            let Some(rect) = geom.bounding_rect() else { continue };
            for p in parcel_index.query(rect) {
                if !flags[p][l] && parcels[p].intersects(geom) {
                    flags[p][l] = true;
                }
            }
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, Rect};

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        let rect = Rect::new(Coord { x, y }, Coord { x: x + size, y: y + size });
        MultiPolygon(vec![rect.to_polygon()])
    }

    fn layers() -> Vec<OverlayLayer> {
        vec![
            OverlayLayer::new("IZ", vec![square(100.0, 100.0, 10.0)]),
            OverlayLayer::new("FP", vec![square(0.0, 0.0, 10.0), square(30.0, 0.0, 10.0)]),
            OverlayLayer::new("HO", vec![square(5.0, 5.0, 10.0)]),
        ]
    }

    #[test]
    fn flags_follow_declaration_order() {
        let parcel = square(6.0, 6.0, 2.0); // inside FP and HO, far from IZ
        assert_eq!(match_overlays(&parcel, &layers()), vec![false, true, true]);
    }

    #[test]
    fn layer_with_multiple_polygons_matches_any_of_them() {
        let layers = layers();
        assert!(layers[1].matches(&square(31.0, 1.0, 2.0)));
        assert!(!layers[1].matches(&square(20.0, 20.0, 2.0)));
    }

    #[test]
    fn empty_layer_matches_nothing() {
        let layer = OverlayLayer::new("XX", vec![]);
        assert!(layer.is_empty());
        assert!(!layer.matches(&square(0.0, 0.0, 1.0)));
    }

    #[test]
    fn bulk_form_agrees_with_per_parcel_form() {
        let layers = layers();
        let parcels = vec![
            square(6.0, 6.0, 2.0),
            square(31.0, 1.0, 2.0),
            square(200.0, 200.0, 2.0),
            square(104.0, 104.0, 1.0),
        ];
        let bulk = match_overlays_bulk(&parcels, &layers);
        for (parcel, bulk_flags) in parcels.iter().zip(&bulk) {
            assert_eq!(&match_overlays(parcel, &layers), bulk_flags);
        }
    }
}
