//! Tile pyramid generation.

use crate::error::{Result, TileError};
use crate::window::{pixel_window, TileWindow};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use rayon::prelude::*;
use tracing::{debug, info};
use wind_codec::{create_png, EncodedImage};
use wind_common::{BoundingBox, TileConfig, TileCoord, TileRange};

/// One rendered tile: a `size` x `size` RGBA block of encoded wind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    pub coord: TileCoord,
    pub size: u32,
    pub pixels: Vec<u8>,
}

impl Tile {
    /// Relative path of the tile image: `{z}/{x}/{y}.png`.
    pub fn path(&self) -> String {
        self.coord.path()
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        Ok(create_png(
            &self.pixels,
            self.size as usize,
            self.size as usize,
        )?)
    }
}

/// Cuts encoded rasters into XYZ tiles for a fixed zoom range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePartitioner {
    tile_size: u32,
    min_zoom: u32,
    max_zoom: u32,
}

impl TilePartitioner {
    pub fn new(tile_size: u32, min_zoom: u32, max_zoom: u32) -> Result<Self> {
        if tile_size == 0 {
            return Err(TileError::InvalidTileSize(tile_size));
        }
        if min_zoom > max_zoom || max_zoom > 22 {
            return Err(TileError::InvalidZoomRange {
                min: min_zoom,
                max: max_zoom,
            });
        }
        Ok(Self {
            tile_size,
            min_zoom,
            max_zoom,
        })
    }

    pub fn from_config(config: &TileConfig) -> Result<Self> {
        Self::new(config.tile_size, config.min_zoom, config.max_zoom)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn zoom_range(&self) -> (u32, u32) {
        (self.min_zoom, self.max_zoom)
    }

    /// Every tile overlapping `bounds` together with its pixel window in a
    /// `width` x `height` raster, ordered by zoom, then x, then y.
    ///
    /// Tiles whose clipped window is empty are left out.
    pub fn plan(&self, bounds: &BoundingBox, width: u32, height: u32) -> Result<Vec<TileWindow>> {
        if !bounds.is_valid() {
            return Err(TileError::InvalidBounds(format!("{:?}", bounds)));
        }

        let mut windows = Vec::new();
        for zoom in self.min_zoom..=self.max_zoom {
            let range = TileRange::covering(bounds, zoom);
            let before = windows.len();

            windows.extend(range.iter().filter_map(|coord| {
                pixel_window(&coord.bbox(), bounds, width, height)
                    .map(|window| TileWindow { coord, window })
            }));

            debug!(
                zoom = zoom,
                x_range = ?(range.min_x, range.max_x),
                y_range = ?(range.min_y, range.max_y),
                candidates = range.count(),
                tiles = windows.len() - before,
                "Planned zoom level"
            );
        }
        Ok(windows)
    }

    /// Render the full pyramid for `image`, which covers `bounds`.
    ///
    /// All tiles are rendered before returning, so a failure yields no tiles.
    pub fn partition(&self, image: &EncodedImage, bounds: &BoundingBox) -> Result<Vec<Tile>> {
        let width = image.width() as u32;
        let height = image.height() as u32;
        let windows = self.plan(bounds, width, height)?;

        let raster = RgbaImage::from_raw(width, height, image.pixels().to_vec()).ok_or_else(
            || TileError::Raster(format!("buffer does not hold a {}x{} RGBA image", width, height)),
        )?;

        let tiles: Vec<Tile> = windows
            .par_iter()
            .map(|tile| self.render(&raster, tile))
            .collect();

        info!(
            tiles = tiles.len(),
            min_zoom = self.min_zoom,
            max_zoom = self.max_zoom,
            tile_size = self.tile_size,
            "Partitioned raster into tiles"
        );
        Ok(tiles)
    }

    fn render(&self, raster: &RgbaImage, tile: &TileWindow) -> Tile {
        let w = tile.window;
        let crop = imageops::crop_imm(raster, w.x, w.y, w.width, w.height).to_image();
        let resized = imageops::resize(&crop, self.tile_size, self.tile_size, FilterType::Triangle);
        Tile {
            coord: tile.coord,
            size: self.tile_size,
            pixels: resized.into_raw(),
        }
    }
}

impl Default for TilePartitioner {
    fn default() -> Self {
        Self {
            tile_size: 256,
            min_zoom: 0,
            max_zoom: 6,
        }
    }
}
