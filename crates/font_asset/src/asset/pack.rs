//! MSB-first row packing of glyph bitmaps.
//!
//! Every row starts on a byte boundary. The unused low bits of a row's last byte are zero, so
//! a row of width `w` always takes `ceil(w / 8)` bytes.

use super::bitmap::GlyphBitmap;

pub fn row_stride(width: u16) -> usize {
    usize::from(width).div_ceil(8)
}

pub fn packed_len(width: u16, height: u16) -> usize {
    row_stride(width) * usize::from(height)
}

pub fn pack_rows(bitmap: &GlyphBitmap) -> Vec<u8> {
    let width = usize::from(bitmap.width());
    let mut packed = Vec::with_capacity(packed_len(bitmap.width(), bitmap.height()));

    for row in bitmap.rows() {
        let mut acc = 0u8;
        for (x, &set) in row.iter().enumerate() {
            if set {
                acc |= 1 << (7 - (x % 8));
            }
            if x % 8 == 7 || x == width - 1 {
                packed.push(acc);
                acc = 0;
            }
        }
    }

    packed
}

/// Inverse of [`pack_rows`]. Returns `None` when `bytes` is not exactly one packed bitmap.
pub fn unpack_rows(bytes: &[u8], width: u16, height: u16) -> Option<GlyphBitmap> {
    if bytes.len() != packed_len(width, height) {
        return None;
    }

    let stride = row_stride(width);
    Some(GlyphBitmap::from_fn(width, height, |x, y| {
        let x = usize::from(x);
        let byte = bytes[usize::from(y) * stride + x / 8];
        byte & (1 << (7 - (x % 8))) != 0
    }))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn full(width: u16, height: u16) -> GlyphBitmap {
        GlyphBitmap::from_fn(width, height, |_, _| true)
    }

    #[test]
    fn byte_aligned_row() {
        assert_eq!(pack_rows(&full(8, 2)), vec![0xff, 0xff]);
    }

    #[test]
    fn partial_bytes_are_zero_padded() {
        assert_eq!(pack_rows(&full(1, 1)), vec![0x80]);
        assert_eq!(pack_rows(&full(7, 1)), vec![0xfe]);
        assert_eq!(pack_rows(&full(9, 1)), vec![0xff, 0x80]);
        assert_eq!(pack_rows(&full(17, 1)), vec![0xff, 0xff, 0x80]);
    }

    #[test]
    fn rows_do_not_share_bytes() {
        // Two rows of width 3: 101 and 011.
        let bitmap = GlyphBitmap::from_bits(3, 2, vec![true, false, true, false, true, true]);
        assert_eq!(pack_rows(&bitmap), vec![0b1010_0000, 0b0110_0000]);
    }

    #[test]
    fn msb_first_within_byte() {
        let bitmap = GlyphBitmap::from_fn(16, 1, |x, _| x == 0 || x == 15);
        assert_eq!(pack_rows(&bitmap), vec![0x80, 0x01]);
    }

    #[test]
    fn output_length_follows_dimensions() {
        for width in 1..=33u16 {
            for height in [1u16, 2, 5] {
                let packed = pack_rows(&GlyphBitmap::blank(width, height));
                assert_eq!(packed.len(), packed_len(width, height));
                assert!(packed.iter().all(|&byte| byte == 0));
            }
        }
    }

    #[test]
    fn unpack_restores_random_bitmaps() {
        let mut rng = StdRng::seed_from_u64(0x464e_5432);
        for _ in 0..200 {
            let width = rng.gen_range(1..=40);
            let height = rng.gen_range(1..=24);
            let bitmap = GlyphBitmap::from_fn(width, height, |_, _| rng.gen_bool(0.5));

            let packed = pack_rows(&bitmap);
            assert_eq!(unpack_rows(&packed, width, height), Some(bitmap));
        }
    }

    #[test]
    fn unpack_ignores_padding_bits() {
        let bitmap = unpack_rows(&[0xff, 0xff], 3, 2).unwrap();
        assert_eq!(bitmap, GlyphBitmap::from_fn(3, 2, |_, _| true));
    }

    #[test]
    fn unpack_rejects_wrong_length() {
        assert_eq!(unpack_rows(&[0xff], 9, 1), None);
        assert_eq!(unpack_rows(&[0xff, 0x00, 0x00], 9, 1), None);
    }
}
