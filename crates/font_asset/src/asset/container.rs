//! The `#FNT` container: a 10-byte header followed by back-to-back glyph records.
//!
//! ```text
//! offset  field        type
//! 0       magic        b"#FNT"
//! 4       version      u16 LE, always 2
//! 6       glyph count  u16 LE
//! 8       point size   u16 LE
//! 10..    records      code point, width, height (u16 LE), x/y offset (i16 LE), packed rows
//! ```

use std::io::{self, Read, Write};

use super::pack;
use super::record::{GlyphMetrics, GlyphRecord, RECORD_HEADER_LEN};
use crate::DecodeError;

pub const MAGIC: [u8; 4] = *b"#FNT";
pub const VERSION: u16 = 2;
pub const HEADER_LEN: usize = 10;

/// A complete font asset for one typeface at one point size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontAsset {
    point_size: u16,
    records: Vec<GlyphRecord>,
}

impl FontAsset {
    pub fn new(point_size: u16, records: Vec<GlyphRecord>) -> Self {
        assert!(
            records.len() <= usize::from(u16::MAX),
            "{} glyphs exceed the container limit",
            records.len()
        );
        for record in &records {
            assert!(
                u16::try_from(u32::from(record.code_point())).is_ok(),
                "code point {:?} does not fit u16",
                record.code_point()
            );
        }
        Self { point_size, records }
    }

    pub fn point_size(&self) -> u16 {
        self.point_size
    }

    pub fn glyph_count(&self) -> u16 {
        // Bounded by the check in `new`.
        self.records.len() as u16
    }

    pub fn records(&self) -> &[GlyphRecord] {
        &self.records
    }

    pub fn glyph(&self, code_point: char) -> Option<&GlyphRecord> {
        self.records.iter().find(|record| record.code_point() == code_point)
    }

    pub fn serialized_len(&self) -> usize {
        HEADER_LEN + self.records.iter().map(GlyphRecord::serialized_len).sum::<usize>()
    }

    /// Writes the asset in a single forward pass and returns the number of bytes written.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<usize> {
        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&MAGIC);
        header[4..6].copy_from_slice(&VERSION.to_le_bytes());
        header[6..8].copy_from_slice(&self.glyph_count().to_le_bytes());
        header[8..10].copy_from_slice(&self.point_size.to_le_bytes());
        writer.write_all(&header)?;

        let mut written = HEADER_LEN;
        for record in &self.records {
            writer.write_all(&encode_record_header(record.metrics()))?;
            writer.write_all(record.packed())?;
            written += record.serialized_len();
        }

        Ok(written)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.serialized_len());
        self.write_to(&mut bytes).expect("writing to a Vec cannot fail");
        bytes
    }

    pub fn read_from<R: Read + ?Sized>(reader: &mut R) -> Result<Self, DecodeError> {
        let mut header = [0u8; HEADER_LEN];
        read_exact(reader, &mut header, "header")?;

        let magic = [header[0], header[1], header[2], header[3]];
        if magic != MAGIC {
            return Err(DecodeError::BadMagic(magic));
        }

        let version = u16::from_le_bytes([header[4], header[5]]);
        if version != VERSION {
            return Err(DecodeError::UnsupportedVersion(version));
        }

        let glyph_count = u16::from_le_bytes([header[6], header[7]]);
        let point_size = u16::from_le_bytes([header[8], header[9]]);

        let mut records = Vec::with_capacity(usize::from(glyph_count));
        for _ in 0..glyph_count {
            let mut raw = [0u8; RECORD_HEADER_LEN];
            read_exact(reader, &mut raw, "glyph header")?;
            let metrics = decode_record_header(raw)?;

            let packed = read_bitmap(reader, pack::packed_len(metrics.width, metrics.height))?;
            records.push(GlyphRecord::from_packed(metrics, packed));
        }

        Ok(Self { point_size, records })
    }

    /// Parses a whole buffer, rejecting bytes left over after the last record.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut cursor = bytes;
        let asset = Self::read_from(&mut cursor)?;
        if !cursor.is_empty() {
            return Err(DecodeError::TrailingBytes(cursor.len()));
        }
        Ok(asset)
    }
}

fn encode_record_header(metrics: &GlyphMetrics) -> [u8; RECORD_HEADER_LEN] {
    let mut raw = [0u8; RECORD_HEADER_LEN];
    raw[0..2].copy_from_slice(&(u32::from(metrics.code_point) as u16).to_le_bytes());
    raw[2..4].copy_from_slice(&metrics.width.to_le_bytes());
    raw[4..6].copy_from_slice(&metrics.height.to_le_bytes());
    raw[6..8].copy_from_slice(&metrics.x_offset.to_le_bytes());
    raw[8..10].copy_from_slice(&metrics.y_offset.to_le_bytes());
    raw
}

fn decode_record_header(raw: [u8; RECORD_HEADER_LEN]) -> Result<GlyphMetrics, DecodeError> {
    let code = u16::from_le_bytes([raw[0], raw[1]]);
    let code_point = char::from_u32(u32::from(code)).ok_or(DecodeError::InvalidCodePoint(code))?;
    let width = u16::from_le_bytes([raw[2], raw[3]]);
    let height = u16::from_le_bytes([raw[4], raw[5]]);
    if width == 0 || height == 0 {
        return Err(DecodeError::ZeroSizedGlyph(code_point));
    }

    Ok(GlyphMetrics {
        code_point,
        width,
        height,
        x_offset: i16::from_le_bytes([raw[6], raw[7]]),
        y_offset: i16::from_le_bytes([raw[8], raw[9]]),
    })
}

/// Reads `len` bitmap bytes without trusting `len` for the allocation up front.
fn read_bitmap<R: Read + ?Sized>(reader: &mut R, len: usize) -> Result<Vec<u8>, DecodeError> {
    let mut packed = Vec::new();
    (&mut *reader).take(len as u64).read_to_end(&mut packed)?;
    if packed.len() != len {
        return Err(DecodeError::Truncated("glyph bitmap"));
    }
    Ok(packed)
}

fn read_exact<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
    section: &'static str,
) -> Result<(), DecodeError> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        io::ErrorKind::UnexpectedEof => DecodeError::Truncated(section),
        _ => DecodeError::Io(err),
    })
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};

    use super::*;
    use crate::raster::source::{BoundingBox, RasterGlyph};

    fn solid(x0: i32, y0: i32, x1: i32, y1: i32) -> RasterGlyph {
        let pixels = GrayImage::from_pixel((x1 - x0) as u32, (y1 - y0) as u32, Luma([255]));
        RasterGlyph::new(BoundingBox::new(x0, y0, x1, y1), pixels)
    }

    fn solid_a() -> FontAsset {
        FontAsset::new(16, vec![GlyphRecord::build('A', &solid(0, 0, 8, 10), 16)])
    }

    #[test]
    fn encodes_single_glyph_example() {
        let mut expected = vec![
            b'#', b'F', b'N', b'T', 0x02, 0x00, 0x01, 0x00, 0x10, 0x00, // header
            0x41, 0x00, 0x08, 0x00, 0x0a, 0x00, 0x00, 0x00, 0x00, 0x00, // record
        ];
        expected.extend_from_slice(&[0xff; 10]);

        let asset = solid_a();
        assert_eq!(asset.to_bytes(), expected);
        assert_eq!(asset.serialized_len(), expected.len());
    }

    #[test]
    fn write_to_reports_length() {
        let asset = solid_a();
        let mut sink = Vec::new();
        assert_eq!(asset.write_to(&mut sink).unwrap(), 30);
        assert_eq!(sink.len(), 30);
    }

    #[test]
    fn negative_offsets_are_twos_complement() {
        let asset = FontAsset::new(8, vec![GlyphRecord::build('j', &solid(-1, -2, 0, -1), 8)]);
        let bytes = asset.to_bytes();
        assert_eq!(&bytes[HEADER_LEN + 6..HEADER_LEN + 10], &[0xff, 0xff, 0xfe, 0xff]);
    }

    #[test]
    fn records_are_contiguous() {
        let narrow = solid(0, 0, 3, 2);
        let wide = RasterGlyph::new(BoundingBox::new(1, 1, 10, 2), GrayImage::new(9, 1));
        let asset = FontAsset::new(
            12,
            vec![GlyphRecord::build('a', &narrow, 12), GlyphRecord::build('b', &wide, 12)],
        );
        let bytes = asset.to_bytes();

        // First record: 10 header bytes plus two 1-byte rows.
        let second = HEADER_LEN + 12;
        assert_eq!(&bytes[second..second + 2], &[b'b', 0x00]);
        assert_eq!(bytes.len(), second + 10 + 2);
    }

    #[test]
    fn decodes_what_it_encodes() {
        let asset = solid_a();
        let decoded = FontAsset::from_bytes(&asset.to_bytes()).unwrap();
        assert_eq!(decoded, asset);
        assert_eq!(decoded.glyph('A').unwrap().bitmap().count_set(), 80);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = solid_a().to_bytes();
        bytes[0] = b'V';
        assert!(matches!(
            FontAsset::from_bytes(&bytes),
            Err(DecodeError::BadMagic(m)) if &m == b"VFNT"
        ));
    }

    #[test]
    fn rejects_other_versions() {
        let mut bytes = solid_a().to_bytes();
        bytes[4] = 1;
        assert!(matches!(FontAsset::from_bytes(&bytes), Err(DecodeError::UnsupportedVersion(1))));
    }

    #[test]
    fn rejects_truncated_bitmap() {
        let bytes = solid_a().to_bytes();
        let result = FontAsset::from_bytes(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(DecodeError::Truncated("glyph bitmap"))));
    }

    #[test]
    fn oversized_glyph_header_without_data_is_truncated() {
        let mut bytes = b"#FNT\x02\x00\x01\x00\x10\x00".to_vec();
        bytes.extend_from_slice(&[b'A', 0x00, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xff; 4]);

        let result = FontAsset::read_from(&mut bytes.as_slice());
        assert!(matches!(result, Err(DecodeError::Truncated("glyph bitmap"))));
    }

    #[test]
    fn to_bytes_matches_write_to() {
        let asset = solid_a();
        let mut sink = Vec::new();
        asset.write_to(&mut sink).unwrap();
        assert_eq!(asset.to_bytes(), sink);
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = solid_a().to_bytes();
        bytes.push(0);
        assert!(matches!(FontAsset::from_bytes(&bytes), Err(DecodeError::TrailingBytes(1))));
    }

    #[test]
    fn rejects_zero_sized_glyph() {
        let mut bytes = solid_a().to_bytes();
        bytes[HEADER_LEN + 2] = 0;
        assert!(matches!(FontAsset::from_bytes(&bytes), Err(DecodeError::ZeroSizedGlyph('A'))));
    }

    #[test]
    fn rejects_surrogate_code_point() {
        let mut bytes = solid_a().to_bytes();
        bytes[HEADER_LEN..HEADER_LEN + 2].copy_from_slice(&0xd800u16.to_le_bytes());
        assert!(matches!(
            FontAsset::from_bytes(&bytes),
            Err(DecodeError::InvalidCodePoint(0xd800))
        ));
    }
}
