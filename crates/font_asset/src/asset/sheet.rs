use image::{GrayImage, Luma};

use super::container::FontAsset;

const PADDING: u32 = 1;
const INK: Luma<u8> = Luma([0]);
const PAPER: Luma<u8> = Luma([255]);

/// Lays every glyph of `asset` out on a grid, `columns` cells wide, for visual inspection.
pub fn contact_sheet(asset: &FontAsset, columns: u32) -> GrayImage {
    let records = asset.records();
    if records.is_empty() {
        return GrayImage::from_pixel(1, 1, PAPER);
    }

    // A row never needs more cells than there are glyphs.
    let columns = columns.clamp(1, records.len() as u32);

    let cell_width =
        records.iter().map(|r| u32::from(r.metrics().width)).max().unwrap_or(0) + 2 * PADDING;
    let cell_height =
        records.iter().map(|r| u32::from(r.metrics().height)).max().unwrap_or(0) + 2 * PADDING;
    let rows = (records.len() as u32).div_ceil(columns);

    let mut sheet = GrayImage::from_pixel(columns * cell_width, rows * cell_height, PAPER);
    for (index, record) in records.iter().enumerate() {
        let index = index as u32;
        let origin_x = (index % columns) * cell_width + PADDING;
        let origin_y = (index / columns) * cell_height + PADDING;

        let bitmap = record.bitmap();
        for (y, row) in bitmap.rows().enumerate() {
            for (x, &set) in row.iter().enumerate() {
                if set {
                    sheet.put_pixel(origin_x + x as u32, origin_y + y as u32, INK);
                }
            }
        }
    }

    sheet
}
