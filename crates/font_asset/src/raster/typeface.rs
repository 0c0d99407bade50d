use std::fs;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};
use image::{GrayImage, Luma};

use super::source::{BoundingBox, GlyphSource, RasterGlyph};
use crate::AssetError;

/// Glyph source backed by a TrueType or OpenType file.
pub struct TypefaceSource {
    font: Font,
    path: PathBuf,
    point_size: u16,
    ascent: i32,
}

impl TypefaceSource {
    pub fn open<P: AsRef<Path>>(path: P, point_size: u16) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|err| AssetError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        Self::from_bytes(path, data, point_size)
    }

    pub fn from_bytes<P: AsRef<Path>>(
        path: P,
        data: Vec<u8>,
        point_size: u16,
    ) -> Result<Self, AssetError> {
        let path = path.as_ref().to_path_buf();
        if point_size == 0 {
            return Err(AssetError::InvalidPointSize(point_size));
        }

        let font = Font::from_bytes(data, FontSettings::default()).map_err(|reason| {
            AssetError::SourceUnavailable { path: path.clone(), reason: reason.to_string() }
        })?;

        // Top of the line box; bitmap rows are measured down from here.
        let ascent = font
            .horizontal_line_metrics(f32::from(point_size))
            .map(|metrics| metrics.ascent.round() as i32)
            .unwrap_or(i32::from(point_size));

        Ok(Self { font, path, point_size, ascent })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GlyphSource for TypefaceSource {
    fn point_size(&self) -> u16 {
        self.point_size
    }

    fn rasterize(&self, ch: char) -> RasterGlyph {
        let (metrics, coverage) = self.font.rasterize(ch, f32::from(self.point_size));
        let width = metrics.width as u32;
        let height = metrics.height as u32;
        let bbox = bbox_from_metrics(
            metrics.xmin,
            metrics.ymin,
            metrics.width,
            metrics.height,
            self.ascent,
        );

        let pixels = GrayImage::from_fn(width, height, |x, y| {
            Luma([coverage[(y * width + x) as usize]])
        });

        RasterGlyph::new(bbox, pixels)
    }
}

/// Converts fontdue placement (ymin measured upwards from the baseline) into a top-down box
/// whose origin is the top of the line at `ascent`.
fn bbox_from_metrics(
    xmin: i32,
    ymin: i32,
    width: usize,
    height: usize,
    ascent: i32,
) -> BoundingBox {
    let (width, height) = (width as i32, height as i32);
    let y0 = ascent - (ymin + height);
    BoundingBox::new(xmin, y0, xmin + width, y0 + height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glyph_on_baseline_hangs_from_ascent() {
        // 'A' in a 16px monospace face: 10x12 ink resting on the baseline.
        assert_eq!(bbox_from_metrics(0, 0, 10, 12, 15), BoundingBox::new(0, 3, 10, 15));
    }

    #[test]
    fn descender_extends_below_baseline() {
        // 'g': 9x13 ink with 4 rows under the baseline.
        assert_eq!(bbox_from_metrics(0, -4, 9, 13, 15), BoundingBox::new(0, 6, 9, 19));
    }

    #[test]
    fn left_bearing_shifts_both_edges() {
        let bbox = bbox_from_metrics(-1, 2, 3, 4, 15);
        assert_eq!(bbox, BoundingBox::new(-1, 9, 2, 13));
        assert_eq!((bbox.width(), bbox.height()), (3, 4));
    }

    #[test]
    fn inkless_glyph_is_degenerate() {
        let bbox = bbox_from_metrics(0, 0, 0, 0, 15);
        assert!(bbox.is_degenerate());
        assert_eq!((bbox.x0, bbox.y0), (0, 15));
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let err = TypefaceSource::open("/nonexistent/typeface.ttf", 16).err().unwrap();
        assert!(matches!(err, AssetError::SourceUnavailable { .. }));
    }

    #[test]
    fn garbage_bytes_are_source_unavailable() {
        let err = TypefaceSource::from_bytes("junk.ttf", vec![0, 1, 2, 3], 16).err().unwrap();
        match err {
            AssetError::SourceUnavailable { path, .. } => assert_eq!(path, Path::new("junk.ttf")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_point_size_is_rejected() {
        let err = TypefaceSource::from_bytes("junk.ttf", Vec::new(), 0).err().unwrap();
        assert!(matches!(err, AssetError::InvalidPointSize(0)));
    }
}
