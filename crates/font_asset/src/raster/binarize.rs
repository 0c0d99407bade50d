use image::GrayImage;

use crate::asset::bitmap::GlyphBitmap;

/// Intensities strictly above this value count as ink.
pub const COVERAGE_THRESHOLD: u8 = 127;

pub fn binarize(pixels: &GrayImage) -> GlyphBitmap {
    let width = to_dimension(pixels.width());
    let height = to_dimension(pixels.height());
    let bits = pixels.pixels().map(|pixel| pixel.0[0] > COVERAGE_THRESHOLD).collect();
    GlyphBitmap::from_bits(width, height, bits)
}

fn to_dimension(value: u32) -> u16 {
    u16::try_from(value)
        .unwrap_or_else(|_| panic!("glyph dimension {value} does not fit the asset format"))
}
