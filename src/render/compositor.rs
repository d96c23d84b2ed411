//! # Page Compositor
//!
//! Paints a [`PageLayout`] onto a white page.
//!
//! | Item | Raster |
//! |------|--------|
//! | Text | One provider raster per line, lines centered in the block |
//! | QR / barcode | Provider raster scaled nearest-neighbour to the declared box, cached |
//! | Image | Decoded source (cached) → resized (smooth or nearest) → monochrome (cached) |
//!
//! Inline image sources are keyed by a hash of their bytes. File sources are
//! keyed by path, size and modification time, so a cached file is never read
//! again until it changes on disk.
//! | Shape | Drawn directly |
//!
//! Rotated items are drawn into their own box first, then composited rotated
//! about the box center. A failing provider (bad barcode data, undecodable
//! image) leaves a dashed outline where the item would be and the rest of the
//! page renders normally.
//!
//! After painting, the page is stretched along the feed axis to the layout's
//! device length.

use std::borrow::Cow;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, imageops::FilterType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cache::BoundedCache;
use super::dither::{self, DitherOptions};
use super::layout::{BlockMetrics, FlowBlock, PageLayout, TextBlock};
use super::provider::ContentProvider;
use super::surface::{self, BLACK, Surface};
use crate::error::LabelError;
use crate::label::{
    BarcodeFormat, ImageItem, ImageSource, ItemKind, LabelItem, QrEcLevel, ShapeItem, ShapeKind,
    TextItem,
};

// ============================================================================
// CACHES
// ============================================================================

/// Per-cache entry limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheCapacities {
    /// Decoded image sources
    pub image_sources: usize,
    /// Resized and dithered image rasters
    pub image_variants: usize,
    /// QR and barcode rasters
    pub codes: usize,
}

impl Default for CacheCapacities {
    fn default() -> Self {
        Self {
            image_sources: 32,
            image_variants: 96,
            codes: 96,
        }
    }
}

/// Key for a rendered image variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub source_hash: u64,
    pub width: u32,
    pub height: u32,
    pub dither: DitherOptions,
    pub smoothing: bool,
}

/// Key for a QR or barcode raster at its final box size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CodeKey {
    Qr {
        data: String,
        size: u32,
        ec_level: QrEcLevel,
    },
    Barcode {
        data: String,
        width: u32,
        height: u32,
        format: BarcodeFormat,
    },
}

/// Sub-raster caches owned by one renderer.
pub struct RenderCaches {
    pub image_sources: BoundedCache<u64, Arc<DynamicImage>>,
    pub image_variants: BoundedCache<VariantKey, Arc<Surface>>,
    pub codes: BoundedCache<CodeKey, Arc<Surface>>,
}

impl RenderCaches {
    pub fn new(capacities: CacheCapacities) -> Self {
        Self {
            image_sources: BoundedCache::new("image_sources", capacities.image_sources),
            image_variants: BoundedCache::new("image_variants", capacities.image_variants),
            codes: BoundedCache::new("codes", capacities.codes),
        }
    }
}

impl Default for RenderCaches {
    fn default() -> Self {
        Self::new(CacheCapacities::default())
    }
}

// ============================================================================
// COMPOSITOR
// ============================================================================

/// Paints laid-out items using a provider and a set of caches.
pub struct PageCompositor<'a> {
    provider: &'a dyn ContentProvider,
    caches: &'a mut RenderCaches,
}

impl<'a> PageCompositor<'a> {
    pub fn new(provider: &'a dyn ContentProvider, caches: &'a mut RenderCaches) -> Self {
        Self { provider, caches }
    }

    /// Paint `items` at the positions in `layout`.
    ///
    /// `layout` must come from laying out the same `items`.
    pub fn compose(&mut self, items: &[LabelItem], layout: &PageLayout) -> Surface {
        let (width, height) = layout.dimensions();
        let mut page = surface::blank(width, height);

        for block in &layout.blocks {
            let Some(item) = items.get(block.item_index) else {
                continue;
            };
            let (x, y, w, h) = block.rect(layout.orientation);

            match self.item_surface(item, block) {
                Ok(sub) => {
                    let degrees = item.rotation_degrees;
                    if degrees != 0.0 && degrees.is_finite() {
                        let cx = x as f32 + w as f32 / 2.0;
                        let cy = y as f32 + h as f32 / 2.0;
                        surface::composite_rotated(&mut page, &sub, cx, cy, degrees);
                    } else {
                        surface::composite(&mut page, &sub, x, y);
                    }
                }
                Err(e) => {
                    warn!(
                        item = block.item_index,
                        kind = item.kind.name(),
                        error = %e,
                        "content provider failed, drawing placeholder"
                    );
                    surface::dashed_rect(&mut page, x, y, w, h);
                }
            }
        }

        if layout.device_length != layout.length {
            debug!(
                from = layout.length,
                to = layout.device_length,
                "resampling feed axis"
            );
            page = surface::resample_feed(&page, layout.orientation, layout.device_length);
        }
        page
    }

    /// Rasterize one item into its unrotated box.
    fn item_surface(&mut self, item: &LabelItem, block: &FlowBlock) -> Result<Surface, LabelError> {
        match (&item.kind, &block.metrics) {
            (ItemKind::Text(text), BlockMetrics::Text(metrics)) => self.text_surface(text, metrics),
            (ItemKind::Qr(qr), BlockMetrics::Qr { size }) => {
                let key = CodeKey::Qr {
                    data: qr.data.clone(),
                    size: *size,
                    ec_level: qr.ec_level,
                };
                let provider = self.provider;
                let raster = self.caches.codes.try_get_or_build(key, || {
                    let built = provider.build_qr_surface(&qr.data, *size, qr.ec_level)?;
                    Ok::<_, LabelError>(Arc::new(surface::scale_nearest(&built, *size, *size)))
                })?;
                Ok(raster.as_ref().clone())
            }
            (ItemKind::Barcode(bc), BlockMetrics::Barcode { width, height }) => {
                let key = CodeKey::Barcode {
                    data: bc.data.clone(),
                    width: *width,
                    height: *height,
                    format: bc.format,
                };
                let provider = self.provider;
                let raster = self.caches.codes.try_get_or_build(key, || {
                    let built = provider.build_barcode_surface(&bc.data, *width, *height, bc.format)?;
                    Ok::<_, LabelError>(Arc::new(surface::scale_nearest(&built, *width, *height)))
                })?;
                Ok(raster.as_ref().clone())
            }
            (ItemKind::Image(img), BlockMetrics::Image { width, height }) => {
                let raster = self.image_surface(img, *width, *height)?;
                Ok(raster.as_ref().clone())
            }
            (ItemKind::Shape(shape), BlockMetrics::Shape { width, height }) => {
                Ok(shape_surface(shape, *width, *height))
            }
            (kind, _) => Err(LabelError::ContentProvider(format!(
                "layout metrics do not match {} item",
                kind.name()
            ))),
        }
    }

    fn text_surface(&self, text: &TextItem, block: &TextBlock) -> Result<Surface, LabelError> {
        let mut out = surface::transparent(block.width, block.height);
        let mut y = 0i32;
        for line in &block.lines {
            if !line.text.is_empty() {
                let raster = self
                    .provider
                    .render_text(&line.text, &text.font, block.font_size, text.bold)?;
                let x = (block.width as i32 - line.advance as i32).div_euclid(2);
                surface::composite(&mut out, &raster, x, y);
            }
            y += (line.height() + block.line_gap) as i32;
        }
        Ok(out)
    }

    fn image_surface(&mut self, img: &ImageItem, width: u32, height: u32) -> Result<Arc<Surface>, LabelError> {
        let source_hash = match &img.source {
            ImageSource::File { path } => file_identity(path)?,
            ImageSource::Inline { bytes } => content_hash(bytes),
        };

        let decoded = self
            .caches
            .image_sources
            .try_get_or_build(source_hash, || {
                let bytes = match &img.source {
                    ImageSource::File { path } => Cow::Owned(std::fs::read(path)?),
                    ImageSource::Inline { bytes } => Cow::Borrowed(bytes.as_slice()),
                };
                image::load_from_memory(&bytes).map(Arc::new).map_err(|e| {
                    LabelError::ContentProvider(format!("Image decode failed: {}", e))
                })
            })?;

        let key = VariantKey {
            source_hash,
            width,
            height,
            dither: img.dither,
            smoothing: img.smoothing,
        };
        let variant = self.caches.image_variants.get_or_build(key, || {
            let filter = if img.smoothing {
                FilterType::Triangle
            } else {
                FilterType::Nearest
            };
            let resized = decoded.resize_exact(width, height, filter).to_rgba8();
            Arc::new(dither::convert_image(&resized, &img.dither))
        });
        Ok(variant)
    }
}

/// Cache key for an image file: path, size and modification time, so a hit
/// never reads the file.
fn file_identity(path: &Path) -> Result<u64, LabelError> {
    let meta = std::fs::metadata(path)?;
    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    meta.len().hash(&mut hasher);
    meta.modified().ok().hash(&mut hasher);
    Ok(hasher.finish())
}

fn content_hash(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

// ============================================================================
// SHAPES
// ============================================================================

fn shape_surface(shape: &ShapeItem, width: u32, height: u32) -> Surface {
    let mut out = surface::transparent(width, height);
    let stroke = shape.stroke.max(1);

    match shape.shape {
        ShapeKind::Rectangle => {
            if shape.fill || stroke * 2 >= width.min(height) {
                surface::fill_rect(&mut out, 0, 0, width, height, BLACK);
            } else {
                let s = stroke;
                surface::fill_rect(&mut out, 0, 0, width, s, BLACK);
                surface::fill_rect(&mut out, 0, (height - s) as i32, width, s, BLACK);
                surface::fill_rect(&mut out, 0, 0, s, height, BLACK);
                surface::fill_rect(&mut out, (width - s) as i32, 0, s, height, BLACK);
            }
        }
        ShapeKind::Ellipse => {
            let (rx, ry) = (width as f32 / 2.0, height as f32 / 2.0);
            let (ix, iy) = (rx - stroke as f32, ry - stroke as f32);
            let hollow = !shape.fill && ix > 0.0 && iy > 0.0;
            for py in 0..height {
                for px in 0..width {
                    let dx = px as f32 + 0.5 - rx;
                    let dy = py as f32 + 0.5 - ry;
                    let outer = (dx / rx).powi(2) + (dy / ry).powi(2) <= 1.0;
                    let inner = hollow && (dx / ix).powi(2) + (dy / iy).powi(2) < 1.0;
                    if outer && !inner {
                        out.put_pixel(px, py, BLACK);
                    }
                }
            }
        }
        ShapeKind::Line => {
            let steps = width.max(height).max(1);
            let half = (stroke / 2) as i32;
            for i in 0..steps {
                let t = if steps > 1 {
                    i as f32 / (steps - 1) as f32
                } else {
                    0.0
                };
                let x = (t * (width - 1) as f32).round() as i32;
                let y = (t * (height - 1) as f32).round() as i32;
                surface::fill_rect(&mut out, x - half, y - half, stroke, stroke, BLACK);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::{MediaProfile, ResolutionProfile};
    use crate::render::layout::{FlowLayoutEngine, LayoutOptions};
    use crate::render::provider::BuiltinProvider;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn compose(items: &[LabelItem], caches: &mut RenderCaches) -> (Surface, PageLayout) {
        let provider = BuiltinProvider::new();
        let options = LayoutOptions {
            feed_pad_start: 0,
            feed_pad_end: 0,
            ..Default::default()
        };
        let layout = FlowLayoutEngine::new(
            &provider,
            MediaProfile::TZE_12,
            ResolutionProfile::LOW,
            options,
        )
        .layout(items);
        let page = PageCompositor::new(&provider, caches).compose(items, &layout);
        (page, layout)
    }

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_empty_page_is_white() {
        let mut caches = RenderCaches::default();
        let (page, _) = compose(&[], &mut caches);
        assert_eq!(page.dimensions(), (31, 70));
        assert_eq!(surface::ink_count(&page), 0);
    }

    #[test]
    fn test_filled_rectangle_position() {
        let mut caches = RenderCaches::default();
        let mut item = LabelItem::shape(ShapeKind::Rectangle, 40, 10);
        if let ItemKind::Shape(s) = &mut item.kind {
            s.fill = true;
        }
        let (page, _) = compose(&[item], &mut caches);
        // 40 wide → min length 31 does not apply; centered at y = 30
        assert_eq!(page.dimensions(), (40, 70));
        assert_eq!(surface::ink_count(&page), 400);
        assert_eq!(*page.get_pixel(0, 30), BLACK);
        assert_eq!(*page.get_pixel(0, 29), surface::WHITE);
    }

    #[test]
    fn test_invalid_barcode_draws_placeholder() {
        let mut caches = RenderCaches::default();
        let items = vec![
            LabelItem::barcode("not digits", BarcodeFormat::Ean13, 60, 20),
            LabelItem::qr("fine", 40),
        ];
        let (page, layout) = compose(&items, &mut caches);
        let (x, y, _, _) = layout.blocks[0].rect(layout.orientation);
        assert_eq!(*page.get_pixel(x as u32, y as u32), BLACK);
        // Placeholder is an outline, its center stays white
        assert_eq!(*page.get_pixel(x as u32 + 30, y as u32 + 10), surface::WHITE);
        // Failure is not cached; the QR is
        assert_eq!(caches.codes.len(), 1);
    }

    #[test]
    fn test_code_raster_cached_across_pages() {
        let mut caches = RenderCaches::default();
        let items = vec![LabelItem::qr("https://example.com", 50)];
        let (first, _) = compose(&items, &mut caches);
        let (second, _) = compose(&items, &mut caches);
        assert_eq!(first, second);
        assert_eq!(caches.codes.len(), 1);
        assert!(surface::ink_count(&first) > 0);
    }

    #[test]
    fn test_image_dithered_and_cached() {
        let mut caches = RenderCaches::default();
        let items = vec![LabelItem::image(
            ImageSource::Inline {
                bytes: png(4, 4, [0, 0, 0, 255]),
            },
            8,
            8,
        )];
        let (page, _) = compose(&items, &mut caches);
        assert_eq!(surface::ink_count(&page), 64);
        assert_eq!(caches.image_sources.len(), 1);
        assert_eq!(caches.image_variants.len(), 1);
    }

    #[test]
    fn test_cached_image_file_not_read_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        let original = png(4, 4, [0, 0, 0, 255]);
        std::fs::write(&path, &original).unwrap();
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        let mut caches = RenderCaches::default();
        let items = vec![LabelItem::image(ImageSource::File { path: path.clone() }, 8, 8)];
        let (first, _) = compose(&items, &mut caches);

        // Same size and timestamp, unreadable bytes: only a cache hit renders it
        let mut file = std::fs::File::options().write(true).open(&path).unwrap();
        std::io::Write::write_all(&mut file, &vec![0u8; original.len()]).unwrap();
        file.set_modified(modified).unwrap();
        drop(file);

        let (second, _) = compose(&items, &mut caches);
        assert_eq!(first, second);
        assert_eq!(caches.image_sources.len(), 1);
    }

    #[test]
    fn test_changed_image_file_decoded_again() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        std::fs::write(&path, png(4, 4, [0, 0, 0, 255])).unwrap();

        let mut caches = RenderCaches::default();
        let items = vec![LabelItem::image(ImageSource::File { path: path.clone() }, 8, 8)];
        let (first, _) = compose(&items, &mut caches);

        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();
        std::fs::write(&path, png(8, 8, [255, 255, 255, 255])).unwrap();
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(modified + std::time::Duration::from_secs(5))
            .unwrap();
        let (second, _) = compose(&items, &mut caches);

        assert_ne!(first, second);
        assert_eq!(caches.image_sources.len(), 2);
    }

    #[test]
    fn test_undecodable_image_placeholder() {
        let mut caches = RenderCaches::default();
        let items = vec![LabelItem::image(
            ImageSource::Inline {
                bytes: b"not an image".to_vec(),
            },
            20,
            20,
        )];
        let (page, _) = compose(&items, &mut caches);
        assert!(surface::ink_count(&page) > 0);
        assert!(caches.image_sources.is_empty());
    }

    #[test]
    fn test_rotation_swaps_extent() {
        let mut caches = RenderCaches::default();
        let mut bar = LabelItem::shape(ShapeKind::Rectangle, 40, 4);
        if let ItemKind::Shape(s) = &mut bar.kind {
            s.fill = true;
        }
        let (flat, _) = compose(&[bar.clone()], &mut caches);
        let (turned, _) = compose(&[bar.with_rotation(90.0)], &mut caches);

        let rows_with_ink = |page: &Surface| {
            (0..page.height())
                .filter(|&y| (0..page.width()).any(|x| surface::is_ink(page.get_pixel(x, y))))
                .count()
        };
        assert_eq!(rows_with_ink(&flat), 4);
        assert_eq!(rows_with_ink(&turned), 40);
    }

    #[test]
    fn test_text_renders_ink() {
        let mut caches = RenderCaches::default();
        let (page, _) = compose(&[LabelItem::text("Hi\nthere", 16.0)], &mut caches);
        assert!(surface::ink_count(&page) > 0);
    }

    #[test]
    fn test_shape_outline_and_line() {
        let rect = shape_surface(
            &ShapeItem {
                shape: ShapeKind::Rectangle,
                width: 10,
                height: 10,
                stroke: 1,
                fill: false,
            },
            10,
            10,
        );
        assert_eq!(surface::ink_count(&rect), 36);

        let rule = shape_surface(
            &ShapeItem {
                shape: ShapeKind::Line,
                width: 10,
                height: 1,
                stroke: 1,
                fill: false,
            },
            10,
            1,
        );
        assert_eq!(surface::ink_count(&rule), 10);
    }

    #[test]
    fn test_high_resolution_page_stretched() {
        let provider = BuiltinProvider::new();
        let mut caches = RenderCaches::default();
        let options = LayoutOptions {
            feed_pad_start: 0,
            feed_pad_end: 0,
            ..Default::default()
        };
        let items = vec![LabelItem::shape(ShapeKind::Rectangle, 90, 10)];
        let layout = FlowLayoutEngine::new(
            &provider,
            MediaProfile::TZE_12,
            ResolutionProfile::HIGH,
            options,
        )
        .layout(&items);
        let page = PageCompositor::new(&provider, &mut caches).compose(&items, &layout);
        assert_eq!(page.dimensions(), (160, 70));
    }
}
