//! Lossless RGBA PNG encoding.
//!
//! Encoded wind must survive byte-exact, so only truecolor-with-alpha
//! (color type 6) output is produced: no palette reduction, no filtering
//! heuristics that could reorder data.

use crate::error::{CodecError, Result};
use std::io::Write;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Create an RGBA PNG from row-major pixel data (4 bytes per pixel).
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let expected = width * height * 4;
    if pixels.len() != expected {
        return Err(CodecError::DimensionMismatch {
            array: "pixels",
            expected,
            actual: pixels.len(),
        });
    }
    if width == 0 || height == 0 {
        return Err(CodecError::Png(format!(
            "image dimensions must be positive, got {}x{}",
            width, height
        )));
    }

    let mut png = Vec::with_capacity(expected / 2 + 64);
    png.extend_from_slice(&PNG_SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type (RGBA)
    ihdr.push(0); // compression method
    ihdr.push(0); // filter method
    ihdr.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr);

    let idat = deflate_scanlines(pixels, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat);

    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each scanline with filter type 0 and zlib-compress the result.
fn deflate_scanlines(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    let stride = width * 4;
    let mut encoder = flate2::write::ZlibEncoder::new(
        Vec::with_capacity(pixels.len() / 2),
        flate2::Compression::fast(),
    );
    for row in pixels.chunks_exact(stride).take(height) {
        encoder.write_all(&[0])?;
        encoder.write_all(row)?;
    }
    Ok(encoder.finish()?)
}
