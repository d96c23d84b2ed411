//! # Raster Lines
//!
//! Converts a rendered page into the per-line bit rows a tape printer
//! consumes, one line per feed step.
//!
//! ```text
//!             head (128 pins)
//! ├─ margin ─┼──── print area ────┼─ margin ─┤
//! │ 0 0 0 0  │ page cross-axis ink │ 0 0 0 0  │  ← one line
//! ```
//!
//! - Horizontal pages feed along x, so each line is one pixel column
//!   (y = 0 first).
//! - Vertical pages feed along y, so each line is one pixel row (x = 0 first).
//! - Bits are packed MSB first, 1 = black.
//! - Each packed line is PackBits-encoded independently.

use super::packbits;
use crate::error::LabelError;
use crate::label::Orientation;
use crate::render::RenderedPage;
use crate::render::surface;

/// Pack a row of pixels into bytes, MSB first, `true` = black.
///
/// ```
/// use labelpress::protocol::raster::pack_row;
///
/// let row = vec![true, true, false, false, true, false, true, false];
/// assert_eq!(pack_row(&row), vec![0b11001010]);
///
/// // 12 pixels pack into 2 bytes (4 bits padding)
/// assert_eq!(pack_row(&[true; 12]), vec![0xFF, 0xF0]);
/// ```
pub fn pack_row(pixels: &[bool]) -> Vec<u8> {
    let num_bytes = pixels.len().div_ceil(8);
    let mut bytes = vec![0u8; num_bytes];

    for (i, &pixel) in pixels.iter().enumerate() {
        if pixel {
            let byte_idx = i / 8;
            let bit_idx = 7 - (i % 8); // MSB first
            bytes[byte_idx] |= 1 << bit_idx;
        }
    }

    bytes
}

/// Unpacked head-width lines of `page`, in feed order.
///
/// Fails if the page's cross axis does not match the media print area.
pub fn raster_lines(page: &RenderedPage) -> Result<Vec<Vec<u8>>, LabelError> {
    let media = page.media;
    let (feed_len, cross_len) = match page.orientation {
        Orientation::Horizontal => (page.width, page.height),
        Orientation::Vertical => (page.height, page.width),
    };
    if cross_len != media.print_area_dots {
        return Err(LabelError::Encoding(format!(
            "page cross axis is {} dots but {} prints {}",
            cross_len, media.id, media.print_area_dots
        )));
    }

    let head = media.head_dots() as usize;
    let start = media.margin_start_dots as usize;
    let mut lines = Vec::with_capacity(feed_len as usize);
    let mut bits = vec![false; head];

    for f in 0..feed_len {
        bits.fill(false);
        for c in 0..cross_len {
            let (x, y) = match page.orientation {
                Orientation::Horizontal => (f, c),
                Orientation::Vertical => (c, f),
            };
            bits[start + c as usize] = surface::is_ink(page.surface.get_pixel(x, y));
        }
        lines.push(pack_row(&bits));
    }

    Ok(lines)
}

/// PackBits-encoded lines of `page`, in feed order.
pub fn encode_page(page: &RenderedPage) -> Result<Vec<Vec<u8>>, LabelError> {
    Ok(raster_lines(page)?
        .iter()
        .map(|line| packbits::encode(line))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::{MediaProfile, ResolutionProfile};
    use crate::render::surface::BLACK;

    fn page(width: u32, height: u32, orientation: Orientation) -> RenderedPage {
        RenderedPage {
            surface: surface::blank(width, height),
            width,
            height,
            media: MediaProfile::TZE_12,
            resolution: ResolutionProfile::LOW,
            orientation,
        }
    }

    #[test]
    fn test_blank_page_lines() {
        let p = page(31, 70, Orientation::Horizontal);
        let lines = raster_lines(&p).unwrap();
        assert_eq!(lines.len(), 31);
        assert!(lines.iter().all(|l| l.len() == 16 && l.iter().all(|&b| b == 0)));
        let encoded = encode_page(&p).unwrap();
        assert!(encoded.iter().all(|l| l == &vec![241, 0]));
    }

    #[test]
    fn test_margin_offset() {
        let mut p = page(4, 70, Orientation::Horizontal);
        // First printable pin is head dot 29
        p.surface.put_pixel(2, 0, BLACK);
        let lines = raster_lines(&p).unwrap();
        // dot 29 = byte 3, bit 2 (MSB first)
        assert_eq!(lines[2][3], 0b0000_0100);
        assert!(lines[0].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_vertical_lines_are_rows() {
        let mut p = page(70, 5, Orientation::Vertical);
        p.surface.put_pixel(69, 4, BLACK);
        let lines = raster_lines(&p).unwrap();
        assert_eq!(lines.len(), 5);
        // dot 29 + 69 = 98 = byte 12, bit 5
        assert_eq!(lines[4][12], 0b0010_0000);
    }

    #[test]
    fn test_cross_mismatch_rejected() {
        let p = page(31, 64, Orientation::Horizontal);
        assert!(matches!(raster_lines(&p), Err(LabelError::Encoding(_))));
    }
}
