//! Pixel surface helpers.
//!
//! Pages and sub-rasters are `image::RgbaImage`s. Pages start fully white and
//! only ever receive black ink or pre-rasterized monochrome sub-images, so
//! compositing is binary: a source pixel with alpha ≥ 128 replaces the
//! destination, anything more transparent is skipped.

use image::{Rgba, RgbaImage, imageops::FilterType};

use crate::label::Orientation;

/// Page and sub-raster pixel buffer.
pub type Surface = RgbaImage;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// A fully white, opaque surface. Dimensions are clamped to at least 1.
pub fn blank(width: u32, height: u32) -> Surface {
    RgbaImage::from_pixel(width.max(1), height.max(1), WHITE)
}

/// A fully transparent surface for drawing a single item's ink.
pub fn transparent(width: u32, height: u32) -> Surface {
    RgbaImage::from_pixel(width.max(1), height.max(1), CLEAR)
}

/// Whether a pixel counts as black ink on a white page.
#[inline]
pub fn is_ink(px: &Rgba<u8>) -> bool {
    px[3] >= 128 && (px[0] as u32 + px[1] as u32 + px[2] as u32) < 384
}

#[inline]
fn covers(px: &Rgba<u8>) -> bool {
    px[3] >= 128
}

/// Set a pixel if it is inside the surface.
#[inline]
pub fn put(dst: &mut Surface, x: i64, y: i64, color: Rgba<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < dst.width() as u64 && (y as u64) < dst.height() as u64 {
        dst.put_pixel(x as u32, y as u32, color);
    }
}

/// Composite `src` with its top-left corner at `(x, y)`, clipped to `dst`.
pub fn composite(dst: &mut Surface, src: &Surface, x: i32, y: i32) {
    let (dw, dh) = (dst.width() as i64, dst.height() as i64);
    for (sx, sy, px) in src.enumerate_pixels() {
        if !covers(px) {
            continue;
        }
        let dx = x as i64 + sx as i64;
        let dy = y as i64 + sy as i64;
        if dx < 0 || dy < 0 || dx >= dw || dy >= dh {
            continue;
        }
        dst.put_pixel(dx as u32, dy as u32, Rgba([px[0], px[1], px[2], 255]));
    }
}

/// Axis-aligned size of a `width` x `height` box rotated by `degrees`.
///
/// ```
/// use labelpress::render::surface::rotated_bounds;
///
/// assert_eq!(rotated_bounds(40, 10, 90.0), (10, 40));
/// assert_eq!(rotated_bounds(40, 10, 0.0), (40, 10));
/// ```
pub fn rotated_bounds(width: u32, height: u32, degrees: f32) -> (u32, u32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (w, h) = (width as f32, height as f32);
    let bw = (w * cos.abs() + h * sin.abs()).round().max(1.0);
    let bh = (w * sin.abs() + h * cos.abs()).round().max(1.0);
    (bw as u32, bh as u32)
}

/// Composite `src` rotated clockwise by `degrees` about its own center,
/// with that center placed at `(center_x, center_y)` in `dst`.
///
/// The angle is used as given. Sampling is nearest-neighbour so module
/// edges stay crisp; the painted area is the rotated bounding box.
pub fn composite_rotated(dst: &mut Surface, src: &Surface, center_x: f32, center_y: f32, degrees: f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    let (sw, sh) = (src.width() as f32, src.height() as f32);
    let (bw, bh) = rotated_bounds(src.width(), src.height(), degrees);

    let left = (center_x - bw as f32 / 2.0).floor() as i64 - 1;
    let top = (center_y - bh as f32 / 2.0).floor() as i64 - 1;

    for dy in top..top + bh as i64 + 2 {
        for dx in left..left + bw as i64 + 2 {
            // Inverse rotation of the destination pixel center
            let rx = dx as f32 + 0.5 - center_x;
            let ry = dy as f32 + 0.5 - center_y;
            let sx = rx * cos + ry * sin + sw / 2.0;
            let sy = -rx * sin + ry * cos + sh / 2.0;
            if sx < 0.0 || sy < 0.0 || sx >= sw || sy >= sh {
                continue;
            }
            let px = src.get_pixel(sx as u32, sy as u32);
            if covers(px) {
                put(dst, dx, dy, Rgba([px[0], px[1], px[2], 255]));
            }
        }
    }
}

/// Fill a rectangle, clipped to the surface.
pub fn fill_rect(dst: &mut Surface, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
    for dy in 0..height as i64 {
        for dx in 0..width as i64 {
            put(dst, x as i64 + dx, y as i64 + dy, color);
        }
    }
}

/// Dashed outline drawn in place of content that failed to render.
///
/// Dashes are 4 dots on, 3 dots off, 1 dot thick.
pub fn dashed_rect(dst: &mut Surface, x: i32, y: i32, width: u32, height: u32) {
    const ON: u32 = 4;
    const PERIOD: u32 = 7;
    let (x, y) = (x as i64, y as i64);
    let (w, h) = (width.max(1) as i64, height.max(1) as i64);
    for i in 0..w {
        if (i as u32) % PERIOD < ON {
            put(dst, x + i, y, BLACK);
            put(dst, x + i, y + h - 1, BLACK);
        }
    }
    for j in 0..h {
        if (j as u32) % PERIOD < ON {
            put(dst, x, y + j, BLACK);
            put(dst, x + w - 1, y + j, BLACK);
        }
    }
}

/// Nearest-neighbour resize (no smoothing).
pub fn scale_nearest(src: &Surface, width: u32, height: u32) -> Surface {
    let (width, height) = (width.max(1), height.max(1));
    if src.dimensions() == (width, height) {
        return src.clone();
    }
    image::imageops::resize(src, width, height, FilterType::Nearest)
}

/// Stretch a page along its feed axis to `feed_len` dots (nearest-neighbour).
///
/// Used when the feed resolution differs from the head resolution.
pub fn resample_feed(src: &Surface, orientation: Orientation, feed_len: u32) -> Surface {
    let (w, h) = src.dimensions();
    match orientation {
        Orientation::Horizontal => scale_nearest(src, feed_len, h),
        Orientation::Vertical => scale_nearest(src, w, feed_len),
    }
}

/// Count black ink pixels (test and diagnostics helper).
pub fn ink_count(surface: &Surface) -> usize {
    surface.pixels().filter(|px| is_ink(px)).count()
}
