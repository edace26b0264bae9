//! Scalar quantization between m/s and bytes.

use wind_common::EncodingRange;

/// Pixel written for cells without data: calm U/V, zero speed, transparent.
pub const NO_DATA: [u8; 4] = [128, 128, 0, 0];

/// Quantize one component: clamp to the range, then round onto 0..=255.
///
/// Zero maps to 128 for a symmetric range.
#[inline]
pub fn encode_scalar(value: f32, range: &EncodingRange) -> u8 {
    let clipped = value.clamp(range.min, range.max);
    let normalized = (clipped - range.min) / range.span();
    (normalized * 255.0).round() as u8
}

/// Inverse of [`encode_scalar`], exact to within half a step.
#[inline]
pub fn decode_scalar(byte: u8, range: &EncodingRange) -> f32 {
    byte as f32 / 255.0 * range.span() + range.min
}

/// Quantize speed relative to the corner speed `sqrt(2) * max`.
#[inline]
pub fn encode_magnitude(u: f32, v: f32, range: &EncodingRange) -> u8 {
    let speed = (u * u + v * v).sqrt();
    (speed / range.max_speed() * 255.0).clamp(0.0, 255.0).round() as u8
}

/// Decode a whole channel.
pub fn decode(channel: &[u8], range: &EncodingRange) -> Vec<f32> {
    channel.iter().map(|&b| decode_scalar(b, range)).collect()
}
