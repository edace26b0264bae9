//! Web Mercator (XYZ) tile addressing.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};

/// Latitude limit of the square Web Mercator world.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y), 0 at the north edge
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Relative path of the tile image: `{z}/{x}/{y}.png`.
    pub fn path(&self) -> String {
        format!("{}/{}/{}.png", self.z, self.x, self.y)
    }

    /// Number of tiles along one axis at this tile's zoom.
    pub fn dimension(&self) -> u32 {
        tiles_per_axis(self.z)
    }

    /// Geographic bounds of this tile.
    pub fn bbox(&self) -> BoundingBox {
        tile_bbox(self)
    }
}

/// Inclusive index range of tiles at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub z: u32,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Tiles covering `bounds` at `zoom`, clamped to the valid index space.
    ///
    /// The north-west corner yields the minimum indices and the south-east
    /// corner the maximum ones.
    pub fn covering(bounds: &BoundingBox, zoom: u32) -> Self {
        let nw = latlon_to_tile(bounds.max_y, bounds.min_x, zoom);
        let se = latlon_to_tile(bounds.min_y, bounds.max_x, zoom);
        Self {
            z: zoom,
            min_x: nw.x.min(se.x),
            max_x: nw.x.max(se.x),
            min_y: nw.y.min(se.y),
            max_y: nw.y.max(se.y),
        }
    }

    /// Number of tiles in the range; never zero.
    pub fn count(&self) -> usize {
        ((self.max_x - self.min_x + 1) as usize) * ((self.max_y - self.min_y + 1) as usize)
    }

    /// Row-major iteration over the range (x outer, y inner).
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.min_x..=self.max_x)
            .flat_map(move |x| (self.min_y..=self.max_y).map(move |y| TileCoord::new(self.z, x, y)))
    }
}

fn tiles_per_axis(zoom: u32) -> u32 {
    1u32 << zoom
}

/// Convert lat/lon to the Web Mercator tile containing it.
///
/// Indices are clamped to `[0, 2^zoom - 1]`, so points on or beyond the
/// world edge land in the border tiles.
pub fn latlon_to_tile(lat: f64, lon: f64, zoom: u32) -> TileCoord {
    let n = tiles_per_axis(zoom) as f64;
    let max_index = tiles_per_axis(zoom) as i64 - 1;

    let lat = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = ((lon + 180.0) / 360.0 * n).floor() as i64;
    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / std::f64::consts::PI) / 2.0 * n).floor() as i64;

    TileCoord {
        z: zoom,
        x: x.clamp(0, max_index) as u32,
        y: y.clamp(0, max_index) as u32,
    }
}

/// Convert Web Mercator tile coordinates to lat/lon bounds.
pub fn tile_bbox(coord: &TileCoord) -> BoundingBox {
    let n = tiles_per_axis(coord.z) as f64;

    let lon_min = coord.x as f64 / n * 360.0 - 180.0;
    let lon_max = (coord.x + 1) as f64 / n * 360.0 - 180.0;

    let lat_max = (std::f64::consts::PI * (1.0 - 2.0 * coord.y as f64 / n))
        .sinh()
        .atan()
        .to_degrees();
    let lat_min = (std::f64::consts::PI * (1.0 - 2.0 * (coord.y + 1) as f64 / n))
        .sinh()
        .atan()
        .to_degrees();

    BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
}
