//! Extraction of 10 m wind from HRRR GRIB2 messages.

use bytes::Bytes;
use std::io::{Cursor, Read};
use std::sync::{Arc, OnceLock};
use tracing::{debug, instrument};

use grid_processor::VectorField;
use projection::LambertConformal;

use crate::error::{IngestionError, Result};

/// GRIB2 code table 0.0: meteorological products.
pub const DISCIPLINE_METEOROLOGICAL: u8 = 0;
/// Code table 4.1: momentum.
pub const CATEGORY_MOMENTUM: u8 = 2;
/// Code table 4.2: u-component of wind.
pub const PARAMETER_UGRD: u8 = 2;
/// Code table 4.2: v-component of wind.
pub const PARAMETER_VGRD: u8 = 3;
/// Code table 4.5: specified height level above ground (m).
pub const SURFACE_HEIGHT_ABOVE_GROUND: u8 = 103;
pub const WIND_HEIGHT_M: f64 = 10.0;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Which wind component a message holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindComponent {
    U,
    V,
}

impl WindComponent {
    /// Inventory label, as in `.idx` files.
    pub fn label(&self) -> &'static str {
        match self {
            WindComponent::U => "UGRD:10 m above ground",
            WindComponent::V => "VGRD:10 m above ground",
        }
    }
}

/// Classify a message by its product identification.
///
/// `surface` is the first fixed surface as (type, value in its unit).
pub fn classify(
    discipline: u8,
    category: Option<u8>,
    number: Option<u8>,
    surface: Option<(u8, f64)>,
) -> Option<WindComponent> {
    if discipline != DISCIPLINE_METEOROLOGICAL || category != Some(CATEGORY_MOMENTUM) {
        return None;
    }
    match surface {
        Some((SURFACE_HEIGHT_ABOVE_GROUND, height)) if (height - WIND_HEIGHT_M).abs() < 1e-6 => {}
        _ => return None,
    }
    match number {
        Some(PARAMETER_UGRD) => Some(WindComponent::U),
        Some(PARAMETER_VGRD) => Some(WindComponent::V),
        _ => None,
    }
}

/// Decodes 10 m U/V pairs from GRIB2 bytes on a known Lambert grid.
///
/// Grid coordinates are computed once and shared by every decoded field.
pub struct GribWindDecoder {
    projection: LambertConformal,
    coordinates: OnceLock<Arc<(Vec<f64>, Vec<f64>)>>,
}

impl GribWindDecoder {
    pub fn new(projection: LambertConformal) -> Self {
        Self {
            projection,
            coordinates: OnceLock::new(),
        }
    }

    /// Decoder for the HRRR CONUS grid.
    pub fn hrrr() -> Self {
        Self::new(LambertConformal::hrrr())
    }

    pub fn projection(&self) -> &LambertConformal {
        &self.projection
    }

    /// (lats, lons) of every grid cell, row 0 at the first (southern) row.
    pub fn coordinates(&self) -> Arc<(Vec<f64>, Vec<f64>)> {
        self.coordinates
            .get_or_init(|| Arc::new(self.projection.coordinates()))
            .clone()
    }

    /// Decode the U and V messages found in `data` into a field.
    ///
    /// Gzip-compressed input is inflated first. Messages other than 10 m
    /// wind are ignored; the first U and first V win.
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub fn decode(&self, data: &[u8]) -> Result<VectorField> {
        let data = if data.starts_with(&GZIP_MAGIC) {
            decompress_gzip(data)?
        } else {
            Bytes::copy_from_slice(data)
        };

        let grib2 = grib::from_reader(Cursor::new(data))
            .map_err(|e| IngestionError::Decode(format!("invalid GRIB2 stream: {}", e)))?;

        let mut u: Option<Vec<f32>> = None;
        let mut v: Option<Vec<f32>> = None;

        for (index, submessage) in grib2.iter() {
            let prod_def = submessage.prod_def();
            let surface = prod_def.fixed_surfaces().map(|(first, _)| {
                let scale = 10f64.powi(first.scale_factor as i32);
                (first.surface_type, first.scaled_value as f64 / scale)
            });
            let component = classify(
                submessage.indicator().discipline,
                prod_def.parameter_category(),
                prod_def.parameter_number(),
                surface,
            );

            let slot = match component {
                Some(WindComponent::U) if u.is_none() => &mut u,
                Some(WindComponent::V) if v.is_none() => &mut v,
                _ => continue,
            };

            let decoder = grib::Grib2SubmessageDecoder::from(submessage)
                .map_err(|e| IngestionError::Decode(format!("message {:?}: {}", index, e)))?;
            let values: Vec<f32> = decoder
                .dispatch()
                .map_err(|e| IngestionError::Decode(format!("message {:?}: {}", index, e)))?
                .collect();

            debug!(message = ?index, component = ?component, values = values.len(), "Decoded wind message");
            *slot = Some(values);

            if u.is_some() && v.is_some() {
                break;
            }
        }

        let u = u.ok_or_else(|| IngestionError::MissingComponent(WindComponent::U.label().into()))?;
        let v = v.ok_or_else(|| IngestionError::MissingComponent(WindComponent::V.label().into()))?;
        self.build_field(u, v)
    }

    /// Pair decoded component arrays with the grid coordinates.
    pub fn build_field(&self, u: Vec<f32>, v: Vec<f32>) -> Result<VectorField> {
        let (nx, ny) = self.projection.dimensions();
        if u.len() != nx * ny || v.len() != nx * ny {
            return Err(IngestionError::Decode(format!(
                "expected {}x{} = {} values, got u={} v={}",
                nx,
                ny,
                nx * ny,
                u.len(),
                v.len()
            )));
        }

        let coordinates = self.coordinates();
        let (lats, lons) = coordinates.as_ref();
        Ok(VectorField::new(nx, ny, u, v, lats.clone(), lons.clone())?)
    }
}

impl Default for GribWindDecoder {
    fn default() -> Self {
        Self::hrrr()
    }
}

/// Decompress gzip-compressed data.
pub fn decompress_gzip(data: &[u8]) -> Result<Bytes> {
    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| IngestionError::Decode(format!("gzip: {}", e)))?;
    Ok(Bytes::from(decompressed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use projection::LambertParams;
    use std::io::Write;

    fn small_decoder() -> GribWindDecoder {
        let params = LambertParams {
            nx: 4,
            ny: 3,
            ..LambertParams::hrrr()
        };
        GribWindDecoder::new(LambertConformal::new(params).unwrap())
    }

    #[test]
    fn test_classify_wind_messages() {
        let ten_m = Some((SURFACE_HEIGHT_ABOVE_GROUND, 10.0));
        assert_eq!(classify(0, Some(2), Some(2), ten_m), Some(WindComponent::U));
        assert_eq!(classify(0, Some(2), Some(3), ten_m), Some(WindComponent::V));
    }

    #[test]
    fn test_classify_rejects_other_messages() {
        let ten_m = Some((SURFACE_HEIGHT_ABOVE_GROUND, 10.0));
        // 80 m wind
        assert_eq!(classify(0, Some(2), Some(2), Some((103, 80.0))), None);
        // Temperature at 2 m
        assert_eq!(classify(0, Some(0), Some(0), Some((103, 2.0))), None);
        // Wind speed (2/1)
        assert_eq!(classify(0, Some(2), Some(1), ten_m), None);
        // Isobaric surface
        assert_eq!(classify(0, Some(2), Some(2), Some((100, 10.0))), None);
        // Hydrological discipline
        assert_eq!(classify(1, Some(2), Some(2), ten_m), None);
        assert_eq!(classify(0, None, Some(2), ten_m), None);
    }

    #[test]
    fn test_decompress_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"GRIB").unwrap();
        let compressed = encoder.finish().unwrap();

        assert!(compressed.starts_with(&GZIP_MAGIC));
        assert_eq!(decompress_gzip(&compressed).unwrap(), Bytes::from_static(b"GRIB"));
        assert!(decompress_gzip(&[0x1f, 0x8b, 0x00]).is_err());
    }

    #[test]
    fn test_build_field_checks_grid_size() {
        let decoder = small_decoder();
        let field = decoder.build_field(vec![1.0; 12], vec![2.0; 12]).unwrap();
        assert_eq!((field.width(), field.height()), (4, 3));
        // First row sits at the first grid point
        assert!((field.lats()[0] - 21.138123).abs() < 1e-3);

        assert!(matches!(
            decoder.build_field(vec![1.0; 11], vec![2.0; 12]),
            Err(IngestionError::Decode(_))
        ));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let result = small_decoder().decode(b"not a grib file");
        assert!(matches!(result, Err(IngestionError::Decode(_))));
    }
}
