use geo::{BoundingRect, MultiPolygon, Rect};
use rstar::{AABB, RTree, RTreeObject};
use tracing::warn;

#[derive(Debug, Clone)]
struct BoundingBox {
    idx: usize, // index of the corresponding record in the source layer
    bbox: Rect<f64>,
}

impl RTreeObject for BoundingBox {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}

/// Bounding-box index over a polygon collection. Queries return a superset of
/// the truly intersecting records (false positives allowed, never false
/// negatives); callers follow up with an exact intersection test.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    rtree: RTree<BoundingBox>,
}

impl SpatialIndex {
    /// Build from record geometries in layer order. Records with no bounding
    /// rect (empty geometry) are skipped and can never appear as candidates.
    pub fn build<'a>(geoms: impl IntoIterator<Item = &'a MultiPolygon<f64>>) -> Self {
        let boxes = geoms
            .into_iter()
            .enumerate()
            .filter_map(|(idx, geom)| match geom.bounding_rect() {
                Some(bbox) => Some(BoundingBox { idx, bbox }),
                None => {
                    warn!(record = idx, "dropping record with empty geometry from spatial index");
                    None
                }
            })
            .collect();
        Self { rtree: RTree::bulk_load(boxes) }
    }

    /// Candidate record indices whose bounding box overlaps `rect`, sorted
    /// ascending. The sort pins down the first-match tie-break: the
    /// lowest-indexed intersecting record always wins, independent of tree
    /// internals.
    pub fn query(&self, rect: Rect<f64>) -> Vec<usize> {
        let search = AABB::from_corners(rect.min().into(), rect.max().into());
        let mut candidates: Vec<usize> = self
            .rtree
            .locate_in_envelope_intersecting(&search)
            .map(|b| b.idx)
            .collect();
        candidates.sort_unstable();
        candidates
    }

    #[inline] pub fn len(&self) -> usize { self.rtree.size() }

    #[inline] pub fn is_empty(&self) -> bool { self.rtree.size() == 0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        let rect = Rect::new(Coord { x, y }, Coord { x: x + size, y: y + size });
        MultiPolygon(vec![rect.to_polygon()])
    }

    #[test]
    fn empty_index_returns_no_candidates() {
        let geoms: Vec<MultiPolygon<f64>> = Vec::new();
        let index = SpatialIndex::build(&geoms);
        assert!(index.is_empty());
        let query = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 });
        assert!(index.query(query).is_empty());
    }

    #[test]
    fn query_returns_ascending_overlapping_candidates() {
        let geoms = vec![
            square(0.0, 0.0, 2.0),
            square(10.0, 10.0, 2.0),
            square(1.0, 1.0, 2.0),
        ];
        let index = SpatialIndex::build(&geoms);
        let hits = index.query(Rect::new(Coord { x: 0.5, y: 0.5 }, Coord { x: 1.5, y: 1.5 }));
        assert_eq!(hits, vec![0, 2]);
    }

    #[test]
    fn empty_geometry_is_never_a_candidate() {
        let geoms = vec![MultiPolygon(vec![]), square(0.0, 0.0, 2.0)];
        let index = SpatialIndex::build(&geoms);
        assert_eq!(index.len(), 1);
        let hits = index.query(Rect::new(Coord { x: -1.0, y: -1.0 }, Coord { x: 3.0, y: 3.0 }));
        assert_eq!(hits, vec![1]);
    }
}
