/// Row-major 1-bit coverage mask of a single glyph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphBitmap {
    width: u16,
    height: u16,
    bits: Vec<bool>,
}

impl GlyphBitmap {
    pub fn from_bits(width: u16, height: u16, bits: Vec<bool>) -> Self {
        assert_eq!(usize::from(width) * usize::from(height), bits.len());
        Self { width, height, bits }
    }

    pub fn blank(width: u16, height: u16) -> Self {
        Self::from_bits(width, height, vec![false; usize::from(width) * usize::from(height)])
    }

    pub fn from_fn<F>(width: u16, height: u16, mut f: F) -> Self
    where
        F: FnMut(u16, u16) -> bool,
    {
        let mut bits = Vec::with_capacity(usize::from(width) * usize::from(height));
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self { width, height, bits }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, x: u16, y: u16) -> bool {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.bits[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> + '_ {
        // `chunks` rejects a zero size, and a zero-width bitmap has no bits anyway.
        let width = usize::from(self.width).max(1);
        self.bits.chunks(width)
    }

    pub fn count_set(&self) -> usize {
        self.bits.iter().filter(|&&bit| bit).count()
    }

    /// Text rendering with `#` for ink and `.` for background, one line per row.
    pub fn text_rows(&self) -> impl Iterator<Item = String> + '_ {
        self.rows()
            .map(|row| row.iter().map(|&bit| if bit { '#' } else { '.' }).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_rows_render_ink() {
        let bitmap = GlyphBitmap::from_fn(3, 2, |x, y| x == y);
        let rows: Vec<_> = bitmap.text_rows().collect();
        assert_eq!(rows, vec!["#..", ".#."]);
        assert_eq!(bitmap.count_set(), 2);
    }

    #[test]
    #[should_panic]
    fn mismatched_bits_panic() {
        GlyphBitmap::from_bits(2, 2, vec![true; 3]);
    }
}
