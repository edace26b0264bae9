//! Tests for tile range coverage against brute-force enumeration.

use wind_common::tile::{latlon_to_tile, tile_bbox};
use wind_common::{BoundingBox, TileCoord, TileRange};

fn brute_force(bounds: &BoundingBox, zoom: u32) -> Vec<TileCoord> {
    let n = 1u32 << zoom;
    let mut tiles = Vec::new();
    for x in 0..n {
        for y in 0..n {
            let coord = TileCoord::new(zoom, x, y);
            if tile_bbox(&coord).intersects(bounds) {
                tiles.push(coord);
            }
        }
    }
    tiles.sort();
    tiles
}

// ============================================================================
// Coverage
// ============================================================================

#[test]
fn test_range_covers_every_intersecting_tile() {
    let bounds = BoundingBox::new(-134.1, 21.1, -60.9, 52.6);
    for zoom in 0..=6 {
        let range = TileRange::covering(&bounds, zoom);
        let mut in_range: Vec<TileCoord> = range.iter().collect();
        in_range.sort();

        for tile in brute_force(&bounds, zoom) {
            assert!(
                in_range.binary_search(&tile).is_ok(),
                "zoom {} missing {:?}",
                zoom,
                tile
            );
        }
    }
}

#[test]
fn test_range_has_no_extra_tiles_for_interior_bounds() {
    let bounds = BoundingBox::new(-134.1, 21.1, -60.9, 52.6);
    for zoom in 0..=6 {
        let range = TileRange::covering(&bounds, zoom);
        assert_eq!(range.count(), brute_force(&bounds, zoom).len(), "zoom {}", zoom);
    }
}

#[test]
fn test_range_single_tile_at_zoom_zero() {
    let bounds = BoundingBox::new(-10.0, -10.0, 10.0, 10.0);
    let range = TileRange::covering(&bounds, 0);
    assert_eq!(range.iter().collect::<Vec<_>>(), vec![TileCoord::new(0, 0, 0)]);
}

#[test]
fn test_range_world_bounds_clamped() {
    let bounds = BoundingBox::new(-180.0, -90.0, 180.0, 90.0);
    let range = TileRange::covering(&bounds, 2);
    assert_eq!((range.min_x, range.max_x), (0, 3));
    assert_eq!((range.min_y, range.max_y), (0, 3));
    assert_eq!(range.count(), 16);
}

// ============================================================================
// Point lookup
// ============================================================================

#[test]
fn test_northern_point_has_smaller_row() {
    let north = latlon_to_tile(50.0, -100.0, 5);
    let south = latlon_to_tile(25.0, -100.0, 5);
    assert!(north.y < south.y);
}
