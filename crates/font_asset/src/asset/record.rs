use log::debug;

use super::bitmap::GlyphBitmap;
use super::pack;
use crate::raster::binarize::binarize;
use crate::raster::source::RasterGlyph;

/// Size of the fixed part of a serialized record: five 16-bit fields.
pub const RECORD_HEADER_LEN: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphMetrics {
    pub code_point: char,
    pub width: u16,
    pub height: u16,
    pub x_offset: i16,
    pub y_offset: i16,
}

/// One glyph as it appears in the asset: metrics plus the packed bitmap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRecord {
    metrics: GlyphMetrics,
    packed: Vec<u8>,
}

impl GlyphRecord {
    /// Builds a record from rasterizer output.
    ///
    /// A glyph without ink becomes a blank `point_size` square. Rasterizer output that breaks
    /// the source contract (negative extent, mismatched buffer, values that overflow the format)
    /// panics.
    pub fn build(code_point: char, glyph: &RasterGlyph, point_size: u16) -> Self {
        let bbox = glyph.bbox;
        let x_offset = narrow_offset(bbox.x0, code_point);
        let y_offset = narrow_offset(bbox.y0, code_point);

        let bitmap = if bbox.is_degenerate() {
            assert!(point_size > 0, "fallback glyph for {code_point:?} needs a point size");
            debug!("glyph {code_point:?} has no ink, substituting a {point_size}px square");
            GlyphBitmap::blank(point_size, point_size)
        } else {
            assert!(
                bbox.width() > 0 && bbox.height() > 0,
                "glyph {code_point:?} has negative extent {bbox:?}"
            );
            assert_eq!(
                (glyph.pixels.width(), glyph.pixels.height()),
                (bbox.width() as u32, bbox.height() as u32),
                "pixel buffer for {code_point:?} does not match its bounding box"
            );
            binarize(&glyph.pixels)
        };

        let metrics = GlyphMetrics {
            code_point,
            width: bitmap.width(),
            height: bitmap.height(),
            x_offset,
            y_offset,
        };
        Self::from_bitmap(metrics, &bitmap)
    }

    pub fn from_bitmap(metrics: GlyphMetrics, bitmap: &GlyphBitmap) -> Self {
        assert_eq!((metrics.width, metrics.height), (bitmap.width(), bitmap.height()));
        assert!(metrics.width > 0 && metrics.height > 0, "empty glyph {:?}", metrics.code_point);
        Self { metrics, packed: pack::pack_rows(bitmap) }
    }

    /// Reassembles a record from already packed bytes, as read back from an asset.
    pub(crate) fn from_packed(metrics: GlyphMetrics, packed: Vec<u8>) -> Self {
        debug_assert_eq!(packed.len(), pack::packed_len(metrics.width, metrics.height));
        Self { metrics, packed }
    }

    pub fn metrics(&self) -> &GlyphMetrics {
        &self.metrics
    }

    pub fn code_point(&self) -> char {
        self.metrics.code_point
    }

    pub fn packed(&self) -> &[u8] {
        &self.packed
    }

    pub fn bitmap(&self) -> GlyphBitmap {
        // Records are only constructed with a matching packed length.
        pack::unpack_rows(&self.packed, self.metrics.width, self.metrics.height)
            .unwrap_or_else(|| GlyphBitmap::blank(self.metrics.width, self.metrics.height))
    }

    pub fn serialized_len(&self) -> usize {
        RECORD_HEADER_LEN + self.packed.len()
    }
}

fn narrow_offset(value: i32, code_point: char) -> i16 {
    i16::try_from(value)
        .unwrap_or_else(|_| panic!("offset {value} of glyph {code_point:?} does not fit i16"))
}
