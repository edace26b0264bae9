//! Fixed-point encoding of wind vectors into RGBA rasters.
//!
//! Each pixel carries one wind vector in four bytes:
//!
//! | channel | content                                   |
//! |---------|-------------------------------------------|
//! | R       | U component, linear over the range        |
//! | G       | V component, linear over the range        |
//! | B       | speed relative to the range's corner speed |
//! | A       | 255 = data, 0 = no data                   |
//!
//! With the default -50..50 m/s range, byte 128 is calm, 0 is -50 m/s and
//! 255 is +50 m/s.

pub mod error;
pub mod raster;
pub mod png;
pub mod quantize;

pub use error::{CodecError, Result};
pub use raster::EncodedImage;
pub use png::create_png;
pub use quantize::{decode, decode_scalar, encode_magnitude, encode_scalar, NO_DATA};
