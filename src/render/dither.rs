//! # Monochrome Conversion
//!
//! This module converts RGBA pixel buffers into pure black/white RGBA
//! suitable for a 1-bit print head.
//!
//! ## Luminance
//!
//! Every mode starts from the same per-pixel value:
//!
//! ```text
//! L  = 0.2126 R + 0.7152 G + 0.0722 B
//! L' = L·α + 255·(1 - α)          (composited over white, α = A / 255)
//! L' = 255 - L'                   (only when `invert` is set)
//! ```
//!
//! ## Modes
//!
//! | Mode | Decision | State |
//! |------|----------|-------|
//! | Threshold | `L' < threshold` → black | none |
//! | Ordered | `L' < threshold + (M[y%4][x%4] - 7.5) · 8` → black | none |
//! | Floyd-Steinberg | `L' < threshold` → black, error diffused | raster order |
//!
//! The ordered matrix is the 4x4 Bayer matrix:
//!
//! ```text
//!     0   1   2   3   (x mod 4)
//!   ┌───┬───┬───┬───┐
//! 0 │ 0 │ 8 │ 2 │10 │
//!   ├───┼───┼───┼───┤
//! 1 │12 │ 4 │14 │ 6 │
//!   ├───┼───┼───┼───┤
//! 2 │ 3 │11 │ 1 │ 9 │
//!   ├───┼───┼───┼───┤
//! 3 │15 │ 7 │13 │ 5 │
//!   └───┴───┴───┴───┘
//! (y mod 4)
//! ```
//!
//! Floyd-Steinberg pushes the quantization error of each pixel onto its
//! unvisited neighbours:
//!
//! ```text
//!          X   7/16
//!   3/16  5/16  1/16
//! ```
//!
//! Threshold and ordered output depends only on the pixel itself, so rows
//! are converted in parallel with rayon. Floyd-Steinberg is a single
//! left-to-right, top-to-bottom pass.
//!
//! All modes output 0 or 255 in every color channel with alpha fixed at 255.
//!
//! ## Usage Example
//!
//! ```
//! use labelpress::render::dither::{convert, DitherMode, DitherOptions};
//!
//! // 2x1 image: one black, one white pixel
//! let pixels = [0, 0, 0, 255, 255, 255, 255, 255];
//! let out = convert(&pixels, 2, 1, &DitherOptions::default());
//! assert_eq!(out, vec![0, 0, 0, 255, 255, 255, 255, 255]);
//!
//! let inverted = DitherOptions { invert: true, ..Default::default() };
//! let out = convert(&pixels, 2, 1, &inverted);
//! assert_eq!(out, vec![255, 255, 255, 255, 0, 0, 0, 255]);
//! ```

use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// 4x4 Bayer matrix, row-major, indexed by `(y mod 4) * 4 + (x mod 4)`.
pub const BAYER4: [u8; 16] = [0, 8, 2, 10, 12, 4, 14, 6, 3, 11, 1, 9, 15, 7, 13, 5];

/// Conversion algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DitherMode {
    #[default]
    Threshold,
    FloydSteinberg,
    Ordered,
}

fn default_threshold() -> u8 {
    128
}

/// Options for [`convert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DitherOptions {
    #[serde(default)]
    pub mode: DitherMode,
    /// Luminance cut-off, 0-255
    #[serde(default = "default_threshold")]
    pub threshold: u8,
    #[serde(default)]
    pub invert: bool,
}

impl Default for DitherOptions {
    fn default() -> Self {
        Self {
            mode: DitherMode::Threshold,
            threshold: default_threshold(),
            invert: false,
        }
    }
}

/// Luminance of one RGBA pixel, composited over white, optionally inverted.
#[inline]
pub fn luminance(px: &[u8], invert: bool) -> f32 {
    let l = 0.2126 * px[0] as f32 + 0.7152 * px[1] as f32 + 0.0722 * px[2] as f32;
    let alpha = px[3] as f32 / 255.0;
    let composited = l * alpha + 255.0 * (1.0 - alpha);
    if invert { 255.0 - composited } else { composited }
}

/// Per-pixel threshold for ordered dithering.
#[inline]
pub fn ordered_threshold(x: usize, y: usize, threshold: u8) -> f32 {
    let m = BAYER4[(y & 3) * 4 + (x & 3)] as f32;
    threshold as f32 + (m - 7.5) * 8.0
}

#[inline]
fn write_mono(out: &mut [u8], black: bool) {
    let v = if black { 0 } else { 255 };
    out[0] = v;
    out[1] = v;
    out[2] = v;
    out[3] = 255;
}

/// Convert an RGBA buffer (`width * height * 4` bytes) to monochrome RGBA.
///
/// Short buffers are treated as white for the missing pixels.
pub fn convert(pixels: &[u8], width: usize, height: usize, options: &DitherOptions) -> Vec<u8> {
    let len = width * height * 4;
    let mut out = vec![255u8; len];
    if len == 0 {
        return out;
    }

    match options.mode {
        DitherMode::Threshold | DitherMode::Ordered => {
            let threshold = options.threshold;
            let mode = options.mode;
            out.par_chunks_mut(width * 4)
                .enumerate()
                .for_each(|(y, row)| {
                    for x in 0..width {
                        let i = (y * width + x) * 4;
                        let Some(px) = pixels.get(i..i + 4) else {
                            write_mono(&mut row[x * 4..x * 4 + 4], false);
                            continue;
                        };
                        let l = luminance(px, options.invert);
                        let t = match mode {
                            DitherMode::Ordered => ordered_threshold(x, y, threshold),
                            _ => threshold as f32,
                        };
                        write_mono(&mut row[x * 4..x * 4 + 4], l < t);
                    }
                });
        }
        DitherMode::FloydSteinberg => {
            let mut lum: Vec<f32> = (0..width * height)
                .map(|i| {
                    pixels
                        .get(i * 4..i * 4 + 4)
                        .map(|px| luminance(px, options.invert))
                        .unwrap_or(255.0)
                })
                .collect();
            floyd_steinberg(&mut lum, width, height, options.threshold as f32);
            for (i, &v) in lum.iter().enumerate() {
                write_mono(&mut out[i * 4..i * 4 + 4], v == 0.0);
            }
        }
    }

    out
}

/// Quantize `lum` in place to 0/255 with Floyd-Steinberg error diffusion.
fn floyd_steinberg(lum: &mut [f32], width: usize, height: usize, threshold: f32) {
    for y in 0..height {
        for x in 0..width {
            let i = y * width + x;
            let old = lum[i];
            let new = if old < threshold { 0.0 } else { 255.0 };
            lum[i] = new;
            let err = old - new;

            if x + 1 < width {
                lum[i + 1] += err * 7.0 / 16.0;
            }
            if y + 1 < height {
                let below = i + width;
                if x > 0 {
                    lum[below - 1] += err * 3.0 / 16.0;
                }
                lum[below] += err * 5.0 / 16.0;
                if x + 1 < width {
                    lum[below + 1] += err * 1.0 / 16.0;
                }
            }
        }
    }
}

/// Convert an [`RgbaImage`] to a monochrome image of the same size.
pub fn convert_image(image: &RgbaImage, options: &DitherOptions) -> RgbaImage {
    let (w, h) = image.dimensions();
    let data = convert(image.as_raw(), w as usize, h as usize, options);
    // Buffer length always matches w * h * 4
    RgbaImage::from_raw(w, h, data).unwrap_or_else(|| RgbaImage::new(w, h))
}

// ============================================================================
// TESTS
// ============================================================================
