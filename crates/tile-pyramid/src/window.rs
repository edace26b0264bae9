//! Mapping tile bounds onto raster pixels.

use wind_common::{BoundingBox, TileCoord};

/// A pixel rectangle inside a raster, `(x, y)` being its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A tile together with the raster window it is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileWindow {
    pub coord: TileCoord,
    pub window: PixelWindow,
}

/// Map `tile` onto the pixels of an `image_width` x `image_height` raster
/// covering `bounds`.
///
/// Longitude and latitude are mapped linearly; row 0 is the northern edge.
/// Left/top edges round down and right/bottom edges round up, so any tile
/// overlapping the raster gets at least one pixel. Windows can therefore be
/// up to one pixel wider or taller per axis than a window with every edge
/// truncated toward zero. Returns `None` when the clipped window is empty.
pub fn pixel_window(
    tile: &BoundingBox,
    bounds: &BoundingBox,
    image_width: u32,
    image_height: u32,
) -> Option<PixelWindow> {
    let width = image_width as f64;
    let height = image_height as f64;
    let x_scale = width / bounds.width();
    let y_scale = height / bounds.height();

    let left = ((tile.min_x - bounds.min_x) * x_scale).floor().clamp(0.0, width);
    let right = ((tile.max_x - bounds.min_x) * x_scale).ceil().clamp(0.0, width);
    let top = ((bounds.max_y - tile.max_y) * y_scale).floor().clamp(0.0, height);
    let bottom = ((bounds.max_y - tile.min_y) * y_scale).ceil().clamp(0.0, height);

    if right <= left || bottom <= top {
        return None;
    }

    Some(PixelWindow {
        x: left as u32,
        y: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster_bounds() -> BoundingBox {
        BoundingBox::new(-120.0, 30.0, -80.0, 50.0)
    }

    #[test]
    fn test_interior_tile() {
        // Quarter of the raster in the north-west
        let tile = BoundingBox::new(-120.0, 40.0, -100.0, 50.0);
        let window = pixel_window(&tile, &raster_bounds(), 400, 200).unwrap();
        assert_eq!(
            window,
            PixelWindow {
                x: 0,
                y: 0,
                width: 200,
                height: 100
            }
        );
    }

    #[test]
    fn test_clipped_to_raster() {
        let tile = BoundingBox::new(-90.0, 20.0, -60.0, 35.0);
        let window = pixel_window(&tile, &raster_bounds(), 400, 200).unwrap();
        assert_eq!(window.x, 300);
        assert_eq!(window.x + window.width, 400);
        assert_eq!(window.y, 150);
        assert_eq!(window.y + window.height, 200);
    }

    #[test]
    fn test_sub_pixel_tile_gets_one_pixel() {
        let tile = BoundingBox::new(-100.03, 40.01, -100.02, 40.02);
        let window = pixel_window(&tile, &raster_bounds(), 400, 200).unwrap();
        assert_eq!((window.width, window.height), (1, 1));
    }

    #[test]
    fn test_fractional_edges_widen_window() {
        // Edges at x 49.5..150.5 and y 49.5..100.5; truncation would give 101 x 51
        let tile = BoundingBox::new(-115.05, 39.95, -104.95, 45.05);
        let window = pixel_window(&tile, &raster_bounds(), 400, 200).unwrap();
        assert_eq!(
            window,
            PixelWindow {
                x: 49,
                y: 49,
                width: 102,
                height: 52
            }
        );
    }

    #[test]
    fn test_outside_raster_is_none() {
        let west = BoundingBox::new(-140.0, 35.0, -125.0, 45.0);
        assert!(pixel_window(&west, &raster_bounds(), 400, 200).is_none());

        // Touching the eastern edge only
        let touching = BoundingBox::new(-80.0, 35.0, -70.0, 45.0);
        assert!(pixel_window(&touching, &raster_bounds(), 400, 200).is_none());
    }
}
