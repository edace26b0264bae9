//! Integration tests for tile pyramid generation.

use test_utils::zonal_shear_field;
use tile_pyramid::TilePartitioner;
use wind_codec::raster::CHANNEL_ALPHA;
use wind_codec::EncodedImage;
use wind_common::tile::tile_bbox;
use wind_common::{BoundingBox, EncodingRange, TileCoord};

fn conus() -> BoundingBox {
    BoundingBox::new(-134.1, 21.1, -60.9, 52.6)
}

fn calm_image(width: usize, height: usize) -> EncodedImage {
    let zeros = vec![0.0f32; width * height];
    EncodedImage::encode(width, height, &zeros, &zeros, None, &EncodingRange::default()).unwrap()
}

/// Every tile at `zoom` whose bounds overlap `bounds` with positive area.
fn brute_force_tiles(bounds: &BoundingBox, zoom: u32) -> Vec<TileCoord> {
    let n = 1u32 << zoom;
    let mut coords = Vec::new();
    for x in 0..n {
        for y in 0..n {
            let coord = TileCoord::new(zoom, x, y);
            if tile_bbox(&coord).intersects(bounds) {
                coords.push(coord);
            }
        }
    }
    coords
}

// ============================================================================
// Tile count conservation
// ============================================================================

#[test]
fn test_tile_count_matches_overlapping_tiles() {
    let partitioner = TilePartitioner::new(256, 0, 8).unwrap();

    for bounds in [
        conus(),
        BoundingBox::new(-105.3, 39.5, -104.6, 40.1),
        BoundingBox::new(-10.0, -20.0, 30.0, 15.0),
    ] {
        let plan = partitioner.plan(&bounds, 1799, 1059).unwrap();
        for zoom in 0..=8 {
            let mut planned: Vec<TileCoord> = plan
                .iter()
                .filter(|t| t.coord.z == zoom)
                .map(|t| t.coord)
                .collect();
            planned.sort();
            let len = planned.len();
            planned.dedup();
            assert_eq!(planned.len(), len, "duplicate tiles at zoom {}", zoom);

            let mut expected = brute_force_tiles(&bounds, zoom);
            expected.sort();
            assert_eq!(planned, expected, "zoom {} bounds {:?}", zoom, bounds);
        }
    }
}

#[test]
fn test_partition_renders_every_planned_tile() {
    let partitioner = TilePartitioner::new(64, 0, 4).unwrap();
    let image = calm_image(180, 90);

    let plan = partitioner.plan(&conus(), 180, 90).unwrap();
    let tiles = partitioner.partition(&image, &conus()).unwrap();

    assert_eq!(tiles.len(), plan.len());
    for (tile, planned) in tiles.iter().zip(&plan) {
        assert_eq!(tile.coord, planned.coord);
        assert_eq!(tile.size, 64);
        assert_eq!(tile.pixels.len(), 64 * 64 * 4);
    }
}

// ============================================================================
// Pixel content
// ============================================================================

#[test]
fn test_tiles_inside_valid_raster_are_opaque() {
    let partitioner = TilePartitioner::new(32, 5, 5).unwrap();
    let image = calm_image(360, 200);
    let tiles = partitioner.partition(&image, &conus()).unwrap();

    // A zoom 5 tile over Kansas lies well inside the raster
    let inner = tiles
        .iter()
        .find(|t| {
            let bbox = t.coord.bbox();
            bbox.min_x > -120.0 && bbox.max_x < -75.0 && bbox.min_y > 25.0 && bbox.max_y < 50.0
        })
        .expect("an interior tile");

    for pixel in inner.pixels.chunks_exact(4) {
        assert!(pixel[CHANNEL_ALPHA] >= 254);
        assert!((127..=128).contains(&pixel[0]));
        assert!((127..=128).contains(&pixel[1]));
    }
}

#[test]
fn test_tile_rows_are_north_up() {
    // u = -45 in the south, +45 in the north, rows flipped to north-up
    let field = zonal_shear_field(0.0, 0.0, 1.0, 64, 64, 45.0);
    let flipped_u: Vec<f32> = field
        .u
        .chunks_exact(64)
        .rev()
        .flatten()
        .copied()
        .collect();
    let image = EncodedImage::encode(
        64,
        64,
        &flipped_u,
        &field.v,
        None,
        &EncodingRange::default(),
    )
    .unwrap();

    let bounds = BoundingBox::new(-100.0, 30.0, -90.0, 40.0);
    let partitioner = TilePartitioner::new(16, 0, 0).unwrap();
    let tiles = partitioner.partition(&image, &bounds).unwrap();
    assert_eq!(tiles.len(), 1);

    let pixels = &tiles[0].pixels;
    let top_u = pixels[0];
    let bottom_u = pixels[(15 * 16) * 4];
    assert!(top_u > 200, "top row u byte {}", top_u);
    assert!(bottom_u < 55, "bottom row u byte {}", bottom_u);
}
