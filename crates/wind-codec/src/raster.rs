//! Encoded wind rasters.

use crate::error::{CodecError, Result};
use crate::png::create_png;
use crate::quantize::{encode_magnitude, encode_scalar, NO_DATA};
use rayon::prelude::*;
use wind_common::EncodingRange;

/// Channel indices within a pixel.
pub const CHANNEL_U: usize = 0;
pub const CHANNEL_V: usize = 1;
pub const CHANNEL_MAGNITUDE: usize = 2;
pub const CHANNEL_ALPHA: usize = 3;

/// A row-major RGBA raster holding one encoded wind vector per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl EncodedImage {
    /// Encode component arrays into a raster.
    ///
    /// A cell is written as [`NO_DATA`] when either component is NaN or when
    /// `valid_mask` marks it invalid; both conditions are honored together.
    pub fn encode(
        width: usize,
        height: usize,
        u: &[f32],
        v: &[f32],
        valid_mask: Option<&[bool]>,
        range: &EncodingRange,
    ) -> Result<Self> {
        let expected = width * height;
        check_len("u", expected, u.len())?;
        check_len("v", expected, v.len())?;
        if let Some(mask) = valid_mask {
            check_len("valid_mask", expected, mask.len())?;
        }

        let mut pixels = vec![0u8; expected * 4];
        pixels
            .par_chunks_mut(4)
            .enumerate()
            .for_each(|(i, pixel)| {
                let (cu, cv) = (u[i], v[i]);
                let masked_out = valid_mask.map(|mask| !mask[i]).unwrap_or(false);

                if masked_out || cu.is_nan() || cv.is_nan() {
                    pixel.copy_from_slice(&NO_DATA);
                } else {
                    pixel[CHANNEL_U] = encode_scalar(cu, range);
                    pixel[CHANNEL_V] = encode_scalar(cv, range);
                    pixel[CHANNEL_MAGNITUDE] = encode_magnitude(cu, cv, range);
                    pixel[CHANNEL_ALPHA] = 255;
                }
            });

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Wrap already-encoded RGBA bytes.
    pub fn from_rgba(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        check_len("pixels", width * height * 4, pixels.len())?;
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw RGBA bytes, row 0 first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// The four bytes of one pixel.
    pub fn pixel(&self, row: usize, col: usize) -> Option<[u8; 4]> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let start = (row * self.width + col) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.pixels[start..start + 4]);
        Some(out)
    }

    /// Extract one channel as a row-major byte plane.
    pub fn channel(&self, index: usize) -> Vec<u8> {
        self.pixels.chunks_exact(4).map(|p| p[index]).collect()
    }

    /// Number of pixels with alpha 255.
    pub fn valid_pixels(&self) -> usize {
        self.pixels
            .chunks_exact(4)
            .filter(|p| p[CHANNEL_ALPHA] == 255)
            .count()
    }

    /// Lossless PNG of the raster.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        create_png(&self.pixels, self.width, self.height)
    }
}

fn check_len(array: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(CodecError::DimensionMismatch {
            array,
            expected,
            actual,
        });
    }
    Ok(())
}
