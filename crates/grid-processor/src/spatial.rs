//! Nearest-neighbour lookup over scattered source points.
//!
//! Points are indexed in planar (latitude, longitude) degree space. This is
//! a Euclidean approximation that is adequate at the few-kilometre spacing of
//! convection-allowing model grids and is what the distance cutoff is
//! expressed in.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// Result of a nearest-neighbour query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position of the matched point in the source arrays.
    pub index: usize,
    /// Planar distance in degrees.
    pub distance: f64,
}

/// A built nearest-neighbour index.
pub trait SpatialIndex: Send + Sync {
    /// Nearest indexed point to (lat, lon), or `None` if the index is empty.
    fn nearest(&self, lat: f64, lon: f64) -> Option<Neighbor>;

    /// Number of indexed points.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Constructs a [`SpatialIndex`] from source coordinates.
///
/// The resampler receives one of these instead of choosing an index
/// implementation itself.
pub trait SpatialIndexBuilder: Send + Sync {
    /// Implementation name, for logging.
    fn name(&self) -> &'static str;

    /// Index every point with finite coordinates. `lats` and `lons` have the
    /// same length; the returned neighbours refer to positions in them.
    fn build(&self, lats: &[f64], lons: &[f64]) -> Box<dyn SpatialIndex>;
}

/// One source sample in the R-tree.
#[derive(Debug, Clone, Copy)]
struct SourcePoint {
    lat: f64,
    lon: f64,
    index: usize,
}

impl RTreeObject for SourcePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lon])
    }
}

impl PointDistance for SourcePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlon = self.lon - point[1];
        dlat * dlat + dlon * dlon
    }
}

/// R-tree backed index.
pub struct RTreeIndex {
    tree: RTree<SourcePoint>,
}

impl RTreeIndex {
    pub fn new(lats: &[f64], lons: &[f64]) -> Self {
        let points: Vec<SourcePoint> = lats
            .iter()
            .zip(lons)
            .enumerate()
            .filter(|(_, (lat, lon))| lat.is_finite() && lon.is_finite())
            .map(|(index, (&lat, &lon))| SourcePoint { lat, lon, index })
            .collect();

        Self {
            tree: RTree::bulk_load(points),
        }
    }
}

impl SpatialIndex for RTreeIndex {
    fn nearest(&self, lat: f64, lon: f64) -> Option<Neighbor> {
        let query = [lat, lon];
        self.tree.nearest_neighbor(&query).map(|point| Neighbor {
            index: point.index,
            distance: point.distance_2(&query).sqrt(),
        })
    }

    fn len(&self) -> usize {
        self.tree.size()
    }
}

/// Builds [`RTreeIndex`] instances via bulk loading.
#[derive(Debug, Clone, Copy, Default)]
pub struct RTreeIndexBuilder;

impl SpatialIndexBuilder for RTreeIndexBuilder {
    fn name(&self) -> &'static str {
        "rtree"
    }

    fn build(&self, lats: &[f64], lons: &[f64]) -> Box<dyn SpatialIndex> {
        Box::new(RTreeIndex::new(lats, lons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_point() {
        let lats = [40.0, 41.0, 42.0];
        let lons = [-100.0, -100.0, -100.0];
        let index = RTreeIndex::new(&lats, &lons);

        let neighbor = index.nearest(41.2, -100.0).unwrap();
        assert_eq!(neighbor.index, 1);
        assert!((neighbor.distance - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_points_skipped() {
        let lats = [f64::NAN, 10.0];
        let lons = [0.0, 0.0];
        let index = RTreeIndex::new(&lats, &lons);
        assert_eq!(index.len(), 1);
        assert_eq!(index.nearest(0.0, 0.0).unwrap().index, 1);
    }

    #[test]
    fn test_empty_index() {
        let index = RTreeIndexBuilder.build(&[], &[]);
        assert!(index.is_empty());
        assert!(index.nearest(0.0, 0.0).is_none());
    }
}
