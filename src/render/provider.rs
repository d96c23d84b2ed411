//! # Content Providers
//!
//! The render pipeline does not know how to lay out glyphs or encode QR and
//! barcode symbols. It asks a [`ContentProvider`] for metrics and rasters
//! and only decides where they go and how big they are.
//!
//! [`BuiltinProvider`] is the default implementation:
//!
//! | Content | Source |
//! |---------|--------|
//! | Text | Spleen 12x24 bitmap font, scaled nearest-neighbour; or a registered TTF via ab_glyph |
//! | QR | `qrcode` crate, one square cell per module |
//! | Barcode | `barcoders` crate (Code 128 set B, Code 39, EAN-13, EAN-8) |
//!
//! Provider rasters are black ink on either a transparent (text) or white
//! (codes) background. The compositor scales code rasters to their declared
//! box with nearest-neighbour sampling.

use std::collections::HashMap;

use ab_glyph::{Font, FontArc, ScaleFont, point};
use barcoders::sym::code39::Code39;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean8::EAN8;
use barcoders::sym::ean13::EAN13;
use spleen_font::{FONT_12X24, PSF2Font};

use super::surface::{self, BLACK, Surface};
use crate::error::LabelError;
use crate::label::{BarcodeFormat, QrEcLevel};

/// Glyph ink extent relative to the pen origin (y up is negative).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InkBounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

/// Result of measuring one line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextMetrics {
    pub advance_width: f32,
    /// Distance above the baseline (positive)
    pub ascent: f32,
    /// Distance below the baseline (positive)
    pub descent: f32,
    pub ink_bounds: InkBounds,
}

impl TextMetrics {
    /// Height of the rendered line in whole dots.
    #[inline]
    pub fn line_height(&self) -> u32 {
        (self.ascent.ceil() + self.descent.ceil()).max(1.0) as u32
    }
}

/// Text measurement and QR/barcode rasterization.
///
/// Implementations must be pure: the same arguments always give the same
/// result. Every execution context of the worker pool shares one provider.
pub trait ContentProvider: Send + Sync {
    /// Measure a single line of text at `size` dots.
    fn measure_text(&self, text: &str, font: &str, size: f32) -> TextMetrics;

    /// Rasterize a single line of text. The surface is
    /// `ceil(advance) x line_height` with the baseline at `ceil(ascent)`.
    fn render_text(&self, text: &str, font: &str, size: f32, bold: bool) -> Result<Surface, LabelError>;

    /// Rasterize a QR symbol at roughly `size` x `size` dots.
    fn build_qr_surface(&self, data: &str, size: u32, ec_level: QrEcLevel) -> Result<Surface, LabelError>;

    /// Rasterize a 1D barcode at roughly `width` x `height` dots.
    fn build_barcode_surface(
        &self,
        data: &str,
        width: u32,
        height: u32,
        format: BarcodeFormat,
    ) -> Result<Surface, LabelError>;
}

// ============================================================================
// BUILTIN PROVIDER
// ============================================================================

/// Spleen cell size and baseline.
const SPLEEN_W: usize = 12;
const SPLEEN_H: usize = 24;
const SPLEEN_BASELINE: f32 = 19.0;

/// Default provider backed by bitmap/TTF fonts, `qrcode` and `barcoders`.
#[derive(Default, Clone)]
pub struct BuiltinProvider {
    fonts: HashMap<String, FontArc>,
}

impl BuiltinProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TrueType/OpenType font under `name`.
    ///
    /// Items whose `font` matches `name` are measured and rendered with it;
    /// any other name uses the Spleen bitmap font.
    pub fn register_font(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Result<(), LabelError> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| LabelError::ContentProvider(format!("Invalid font: {}", e)))?;
        self.fonts.insert(name.into(), font);
        Ok(())
    }

    fn spleen_metrics(text: &str, size: f32) -> TextMetrics {
        let chars = text.chars().count() as f32;
        let advance = chars * size / 2.0;
        let ascent = size * SPLEEN_BASELINE / SPLEEN_H as f32;
        let descent = size - ascent;
        TextMetrics {
            advance_width: advance,
            ascent,
            descent,
            ink_bounds: InkBounds {
                min_x: 0.0,
                min_y: -ascent,
                max_x: advance,
                max_y: descent,
            },
        }
    }

    fn render_spleen(text: &str, size: f32, bold: bool) -> Result<Surface, LabelError> {
        let metrics = Self::spleen_metrics(text, size);
        let width = metrics.advance_width.ceil().max(1.0) as u32;
        let height = metrics.line_height();
        let mut out = surface::transparent(width, height);

        let cell_w = (size / 2.0).round().max(1.0) as usize;
        let cell_h = size.round().max(1.0) as usize;

        let mut spleen = PSF2Font::new(FONT_12X24)
            .map_err(|_| LabelError::ContentProvider("Failed to load Spleen 12x24".to_string()))?;

        for (i, ch) in text.chars().enumerate() {
            let mut cell = [false; SPLEEN_W * SPLEEN_H];
            let utf8 = ch.to_string();
            match spleen.glyph_for_utf8(utf8.as_bytes()) {
                Some(glyph) => {
                    for (row_y, row) in glyph.enumerate() {
                        for (col_x, on) in row.enumerate() {
                            if row_y < SPLEEN_H && col_x < SPLEEN_W {
                                cell[row_y * SPLEEN_W + col_x] = on;
                            }
                        }
                    }
                }
                // Unknown character: hollow box
                None => {
                    for x in 1..SPLEEN_W - 1 {
                        cell[4 * SPLEEN_W + x] = true;
                        cell[(SPLEEN_H - 3) * SPLEEN_W + x] = true;
                    }
                    for y in 4..SPLEEN_H - 2 {
                        cell[y * SPLEEN_W + 1] = true;
                        cell[y * SPLEEN_W + SPLEEN_W - 2] = true;
                    }
                }
            }

            let origin_x = (i as f32 * size / 2.0).round() as i64;
            for dy in 0..cell_h {
                for dx in 0..cell_w {
                    let sx = dx * SPLEEN_W / cell_w;
                    let sy = dy * SPLEEN_H / cell_h;
                    if cell[sy * SPLEEN_W + sx] {
                        let x = origin_x + dx as i64;
                        surface::put(&mut out, x, dy as i64, BLACK);
                        if bold {
                            surface::put(&mut out, x + 1, dy as i64, BLACK);
                        }
                    }
                }
            }
        }

        Ok(out)
    }

    fn ttf_metrics(font: &FontArc, text: &str, size: f32) -> TextMetrics {
        let scaled = font.as_scaled(size);
        let advance: f32 = text.chars().map(|ch| scaled.h_advance(font.glyph_id(ch))).sum();
        let ascent = scaled.ascent();
        let descent = -scaled.descent();
        TextMetrics {
            advance_width: advance,
            ascent,
            descent,
            ink_bounds: InkBounds {
                min_x: 0.0,
                min_y: -ascent,
                max_x: advance,
                max_y: descent,
            },
        }
    }

    fn render_ttf(font: &FontArc, text: &str, size: f32, bold: bool) -> Surface {
        let metrics = Self::ttf_metrics(font, text, size);
        let width = metrics.advance_width.ceil().max(1.0) as u32;
        let height = metrics.line_height();
        let baseline_y = metrics.ascent.ceil();
        let mut out = surface::transparent(width, height);

        let scaled = font.as_scaled(size);
        let mut caret_x = 0.0f32;
        for ch in text.chars() {
            let glyph_id = font.glyph_id(ch);
            let glyph = glyph_id.with_scale_and_position(size, point(caret_x, baseline_y));
            caret_x += scaled.h_advance(glyph_id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|px, py, coverage| {
                    // Monochrome: half coverage or more is ink
                    if coverage >= 0.5 {
                        let x = px as i64 + bounds.min.x as i64;
                        let y = py as i64 + bounds.min.y as i64;
                        surface::put(&mut out, x, y, BLACK);
                        if bold {
                            surface::put(&mut out, x + 1, y, BLACK);
                        }
                    }
                });
            }
        }

        out
    }
}

impl ContentProvider for BuiltinProvider {
    fn measure_text(&self, text: &str, font: &str, size: f32) -> TextMetrics {
        match self.fonts.get(font) {
            Some(ttf) => Self::ttf_metrics(ttf, text, size),
            None => Self::spleen_metrics(text, size),
        }
    }

    fn render_text(&self, text: &str, font: &str, size: f32, bold: bool) -> Result<Surface, LabelError> {
        match self.fonts.get(font) {
            Some(ttf) => Ok(Self::render_ttf(ttf, text, size, bold)),
            None => Self::render_spleen(text, size, bold),
        }
    }

    fn build_qr_surface(&self, data: &str, size: u32, ec_level: QrEcLevel) -> Result<Surface, LabelError> {
        use qrcode::{EcLevel, QrCode};

        let ec = match ec_level {
            QrEcLevel::L => EcLevel::L,
            QrEcLevel::M => EcLevel::M,
            QrEcLevel::Q => EcLevel::Q,
            QrEcLevel::H => EcLevel::H,
        };

        let code = QrCode::with_error_correction_level(data, ec)
            .map_err(|e| LabelError::ContentProvider(format!("QR code generation failed: {}", e)))?;

        let modules = code.width();
        let cell = (size as usize / modules.max(1)).max(1);
        let edge = (modules * cell) as u32;
        let mut out = surface::blank(edge, edge);

        for qy in 0..modules {
            for qx in 0..modules {
                if code[(qx, qy)] == qrcode::Color::Dark {
                    surface::fill_rect(
                        &mut out,
                        (qx * cell) as i32,
                        (qy * cell) as i32,
                        cell as u32,
                        cell as u32,
                        BLACK,
                    );
                }
            }
        }

        Ok(out)
    }

    fn build_barcode_surface(
        &self,
        data: &str,
        width: u32,
        height: u32,
        format: BarcodeFormat,
    ) -> Result<Surface, LabelError> {
        let encoded = encode_barcode(data, format)?;
        if encoded.is_empty() {
            return Err(LabelError::ContentProvider(format!(
                "{:?} barcode for '{}' has no modules",
                format, data
            )));
        }

        let module_w = (width as usize / encoded.len()).max(1);
        let height = height.max(1);
        let mut out = surface::blank((encoded.len() * module_w) as u32, height);
        for (i, &module) in encoded.iter().enumerate() {
            if module == 1 {
                surface::fill_rect(&mut out, (i * module_w) as i32, 0, module_w as u32, height, BLACK);
            }
        }

        Ok(out)
    }
}

/// Encode barcode data to modules (1 = bar, 0 = space).
fn encode_barcode(data: &str, format: BarcodeFormat) -> Result<Vec<u8>, LabelError> {
    let fail = |e: barcoders::error::Error| {
        LabelError::ContentProvider(format!("Invalid {:?} data '{}': {}", format, data, e))
    };

    match format {
        BarcodeFormat::Code128 => {
            // Character set B covers printable ASCII
            let prefixed = format!("\u{0181}{}", data);
            Ok(Code128::new(&prefixed).map_err(fail)?.encode())
        }
        BarcodeFormat::Code39 => Ok(Code39::new(data).map_err(fail)?.encode()),
        BarcodeFormat::Ean13 => Ok(EAN13::new(data).map_err(fail)?.encode()),
        BarcodeFormat::Ean8 => Ok(EAN8::new(data).map_err(fail)?.encode()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spleen_metrics_scale_with_size() {
        let p = BuiltinProvider::new();
        let m = p.measure_text("abcd", "spleen", 24.0);
        assert_eq!(m.advance_width, 48.0);
        assert_eq!(m.ascent, 19.0);
        assert_eq!(m.descent, 5.0);
        assert_eq!(m.line_height(), 24);

        let small = p.measure_text("abcd", "spleen", 12.0);
        assert_eq!(small.advance_width, 24.0);
    }

    #[test]
    fn test_render_text_has_ink() {
        let p = BuiltinProvider::new();
        let s = p.render_text("Hi", "spleen", 24.0, false).unwrap();
        assert_eq!(s.dimensions(), (24, 24));
        assert!(surface::ink_count(&s) > 0);
    }

    #[test]
    fn test_bold_adds_ink() {
        let p = BuiltinProvider::new();
        let regular = p.render_text("Hi", "spleen", 24.0, false).unwrap();
        let bold = p.render_text("Hi", "spleen", 24.0, true).unwrap();
        assert!(surface::ink_count(&bold) > surface::ink_count(&regular));
    }

    #[test]
    fn test_unknown_font_falls_back() {
        let p = BuiltinProvider::new();
        let a = p.measure_text("xy", "spleen", 20.0);
        let b = p.measure_text("xy", "Helvetica", 20.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_register_invalid_font() {
        let mut p = BuiltinProvider::new();
        assert!(p.register_font("broken", vec![1, 2, 3]).is_err());
    }

    #[test]
    fn test_qr_surface_square() {
        let p = BuiltinProvider::new();
        let s = p.build_qr_surface("https://example.com", 84, QrEcLevel::M).unwrap();
        assert_eq!(s.width(), s.height());
        assert!(s.width() <= 84);
        // Finder pattern corner is dark
        assert!(surface::is_ink(s.get_pixel(0, 0)));
    }

    #[test]
    fn test_barcode_code128() {
        let p = BuiltinProvider::new();
        let s = p
            .build_barcode_surface("Hello", 200, 30, BarcodeFormat::Code128)
            .unwrap();
        assert_eq!(s.height(), 30);
        assert!(surface::ink_count(&s) > 0);
    }

    #[test]
    fn test_barcode_invalid_ean13() {
        let p = BuiltinProvider::new();
        let err = p
            .build_barcode_surface("not digits", 100, 30, BarcodeFormat::Ean13)
            .unwrap_err();
        assert!(matches!(err, LabelError::ContentProvider(_)));
    }
}
