use image::GrayImage;

/// Ink box reported by a rasterizer, in top-down pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoundingBox {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }

    /// True when the box encloses no pixels at all.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// One rendered glyph: its ink box and a grayscale buffer sized to that box.
#[derive(Clone, Debug)]
pub struct RasterGlyph {
    pub bbox: BoundingBox,
    pub pixels: GrayImage,
}

impl RasterGlyph {
    pub fn new(bbox: BoundingBox, pixels: GrayImage) -> Self {
        Self { bbox, pixels }
    }

    /// Glyph without visible ink, such as a space.
    pub fn empty(x: i32, y: i32) -> Self {
        Self { bbox: BoundingBox::new(x, y, x, y), pixels: GrayImage::new(0, 0) }
    }
}

/// Anything that renders code points at a fixed point size.
pub trait GlyphSource {
    fn point_size(&self) -> u16;
    fn rasterize(&self, ch: char) -> RasterGlyph;
}

impl<S: GlyphSource + ?Sized> GlyphSource for &S {
    fn point_size(&self) -> u16 {
        (**self).point_size()
    }

    fn rasterize(&self, ch: char) -> RasterGlyph {
        (**self).rasterize(ch)
    }
}

impl<S: GlyphSource + ?Sized> GlyphSource for Box<S> {
    fn point_size(&self) -> u16 {
        (**self).point_size()
    }

    fn rasterize(&self, ch: char) -> RasterGlyph {
        (**self).rasterize(ch)
    }
}
