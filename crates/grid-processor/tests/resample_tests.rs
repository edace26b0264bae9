//! Integration tests for resampling synthetic model grids.

use grid_processor::{
    NearestNeighborResampler, PassThroughResampler, RTreeIndexBuilder, ResampleError, Resampler,
    ResamplerFactory, SpatialIndex, SpatialIndexBuilder, VectorField,
};
use std::sync::Arc;
use test_utils::{assert_approx_eq, three_by_three_patch, zonal_shear_field, SyntheticField};
use wind_common::{BoundingBox, RegularGrid, ResampleConfig, ResampleMode};

fn to_field(synthetic: SyntheticField) -> VectorField {
    VectorField::new(
        synthetic.width,
        synthetic.height,
        synthetic.u,
        synthetic.v,
        synthetic.lats,
        synthetic.lons,
    )
    .expect("synthetic field has consistent shape")
}

fn nearest() -> NearestNeighborResampler {
    NearestNeighborResampler::new(Arc::new(RTreeIndexBuilder), 0.15)
}

// =============================================================================
// Orientation
// =============================================================================

#[test]
fn test_first_row_matches_northern_source_row() {
    // u runs -20 (south) .. +20 (north)
    let source = to_field(zonal_shear_field(-105.0, 35.0, 0.05, 40, 21, 20.0));
    let target = RegularGrid::new(BoundingBox::new(-105.0, 35.0, -103.05, 36.0), 40, 21);

    let out = nearest().resample(&source, &target).unwrap();

    let (north_u, _, north_valid) = out.get(0, 10).unwrap();
    let (south_u, _, south_valid) = out.get(20, 10).unwrap();
    assert!(north_valid && south_valid);
    assert_approx_eq!(north_u, 20.0, 1e-4);
    assert_approx_eq!(south_u, -20.0, 1e-4);
}

#[test]
fn test_pass_through_agrees_with_reprojection_on_aligned_grid() {
    let synthetic = zonal_shear_field(-105.0, 35.0, 0.05, 8, 6, 10.0);
    let source = to_field(synthetic);
    let target = RegularGrid::new(BoundingBox::new(-105.0, 35.0, -104.65, 35.25), 8, 6);

    let reprojected = nearest().resample(&source, &target).unwrap();
    let flipped = PassThroughResampler.resample(&source, &target).unwrap();

    assert_eq!(reprojected.u, flipped.u);
    assert_eq!(reprojected.valid_mask, flipped.valid_mask);
    assert!(reprojected.reprojected);
    assert!(!flipped.reprojected);
}

// =============================================================================
// Cutoff
// =============================================================================

#[test]
fn test_cells_outside_source_are_invalid_and_zero() {
    let source = to_field(three_by_three_patch());
    let target = RegularGrid::new(BoundingBox::new(-101.0, 37.0, -99.0, 39.0), 41, 41);

    let out = nearest().resample(&source, &target).unwrap();

    assert!(out.valid_count() > 0);
    assert!(out.valid_count() < out.len());
    for i in 0..out.len() {
        if !out.valid_mask[i] {
            assert_eq!(out.u[i], 0.0);
            assert_eq!(out.v[i], 0.0);
        }
    }
    // The far corners are several degrees from the patch
    assert_eq!(out.get(0, 0).map(|c| c.2), Some(false));
    assert_eq!(out.get(40, 40).map(|c| c.2), Some(false));
}

#[test]
fn test_cutoff_boundary() {
    let source = to_field(three_by_three_patch());
    // Single column 0.2 degrees west of the patch, beyond the 0.15 cutoff
    let target = RegularGrid::new(BoundingBox::new(-100.2, 38.0, -100.19, 38.06), 1, 3);
    let out = nearest().resample(&source, &target).unwrap();
    assert_eq!(out.valid_count(), 0);

    let wide = NearestNeighborResampler::new(Arc::new(RTreeIndexBuilder), 0.25);
    let out = wide.resample(&source, &target).unwrap();
    assert_eq!(out.valid_count(), 3);
}

// =============================================================================
// Capability injection
// =============================================================================

/// Linear scan, standing in for an alternative index implementation.
struct BruteForceIndex {
    points: Vec<(f64, f64)>,
}

impl SpatialIndex for BruteForceIndex {
    fn nearest(&self, lat: f64, lon: f64) -> Option<grid_processor::Neighbor> {
        self.points
            .iter()
            .enumerate()
            .map(|(index, (plat, plon))| grid_processor::Neighbor {
                index,
                distance: ((plat - lat).powi(2) + (plon - lon).powi(2)).sqrt(),
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

struct BruteForceBuilder;

impl SpatialIndexBuilder for BruteForceBuilder {
    fn name(&self) -> &'static str {
        "brute-force"
    }

    fn build(&self, lats: &[f64], lons: &[f64]) -> Box<dyn SpatialIndex> {
        Box::new(BruteForceIndex {
            points: lats.iter().copied().zip(lons.iter().copied()).collect(),
        })
    }
}

#[test]
fn test_injected_index_matches_rtree() {
    let source = to_field(zonal_shear_field(-105.0, 35.0, 0.05, 12, 9, 15.0));
    let target = RegularGrid::new(BoundingBox::new(-105.2, 34.8, -104.3, 35.6), 17, 13);

    let rtree = nearest().resample(&source, &target).unwrap();
    let brute = NearestNeighborResampler::new(Arc::new(BruteForceBuilder), 0.15)
        .resample(&source, &target)
        .unwrap();

    assert_eq!(rtree.valid_mask, brute.valid_mask);
    assert_eq!(rtree.u, brute.u);
}

#[test]
fn test_factory_without_index_fails_fast() {
    let factory = ResamplerFactory::new();
    let result = factory.create(&ResampleConfig::default());
    assert!(matches!(result, Err(ResampleError::DependencyUnavailable(_))));

    let factory = ResamplerFactory::new().with_index_builder(Arc::new(BruteForceBuilder));
    assert!(factory.has_spatial_index());
    assert!(factory.create(&ResampleConfig::default()).is_ok());

    let pass_through = ResampleConfig {
        mode: ResampleMode::PassThrough,
        ..Default::default()
    };
    assert!(ResamplerFactory::new().create(&pass_through).is_ok());
}
