//! # Flow Layout
//!
//! Positions label items one after another along the feed (flow) axis and
//! centers each of them across the tape (cross axis).
//!
//! ## Geometry
//!
//! ```text
//! Horizontal orientation (flow = x, cross = y)
//!
//!  pad_start   span 0      span 1        span 2      pad_end
//! ├────────┼───────────┼────────────┼───────────┼────────┤
//! │        │  ┌─────┐  │            │ ┌───────┐ │        │ ▲
//! │        │  │ A   │  │ ┌────────┐ │ │ QR    │ │        │ │ print area
//! │        │  └─────┘  │ │ text   │ │ │       │ │        │ │ (cross axis)
//! │        │           │ └────────┘ │ └───────┘ │        │ ▼
//! ```
//!
//! - Page length is `pad_start + Σ span + pad_end`, raised to the
//!   resolution's minimum length and to any forced physical length.
//!   Forcing never truncates content.
//! - Every item is centered on the cross axis, then moved by its own
//!   cross-axis offset. Centering rounds toward the start of the axis.
//! - Text shrinks (1 dot per step, never below [`MIN_FONT_SIZE`]) until its
//!   cross-axis extent fits the print area.
//! - Images are scaled down, keeping aspect ratio, so their cross-axis
//!   extent never exceeds the print area.
//! - Zero or negative item sizes are clamped to 1 dot.
//!
//! Layout runs in square head-resolution dots. [`PageLayout::device_length`]
//! is the final length in feed dots after the resolution's feed scaling.

use serde::{Deserialize, Serialize};

use super::provider::ContentProvider;
use crate::label::{ItemKind, LabelItem, Orientation, Positioning, TextItem};
use crate::printer::{MediaProfile, ResolutionProfile};

/// Smallest font size text is shrunk to.
pub const MIN_FONT_SIZE: f32 = 4.0;

/// Extra flow-axis space after each text block in vertical orientation.
pub const VERTICAL_TEXT_PADDING: u32 = 4;

fn default_feed_pad() -> u32 {
    8
}

/// Page-level layout options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    #[serde(default)]
    pub orientation: Orientation,
    /// Blank dots before the first item
    #[serde(default = "default_feed_pad")]
    pub feed_pad_start: u32,
    /// Blank dots after the last item
    #[serde(default = "default_feed_pad")]
    pub feed_pad_end: u32,
    /// Minimum physical length; content longer than this still fits.
    #[serde(default)]
    pub forced_length_mm: Option<f32>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            feed_pad_start: default_feed_pad(),
            feed_pad_end: default_feed_pad(),
            forced_length_mm: None,
        }
    }
}

// ============================================================================
// LAYOUT RECORDS
// ============================================================================

/// One measured line of a text block (whole dots).
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub advance: u32,
    pub ascent: u32,
    pub descent: u32,
}

impl TextLine {
    #[inline]
    pub fn height(&self) -> u32 {
        (self.ascent + self.descent).max(1)
    }
}

/// Measured multi-line text block at its final font size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub font_size: f32,
    pub lines: Vec<TextLine>,
    pub line_gap: u32,
    /// Widest line
    pub width: u32,
    /// Sum of line heights plus gaps
    pub height: u32,
}

/// Kind-specific layout results.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockMetrics {
    Text(TextBlock),
    Image { width: u32, height: u32 },
    Qr { size: u32 },
    Barcode { width: u32, height: u32 },
    Shape { width: u32, height: u32 },
}

impl BlockMetrics {
    /// Drawn box size (width, height).
    pub fn box_size(&self) -> (u32, u32) {
        match self {
            BlockMetrics::Text(t) => (t.width, t.height),
            BlockMetrics::Image { width, height }
            | BlockMetrics::Barcode { width, height }
            | BlockMetrics::Shape { width, height } => (*width, *height),
            BlockMetrics::Qr { size } => (*size, *size),
        }
    }
}

/// Positioned layout record for one item.
///
/// Blocks are produced in item order; the flow cursor never moves backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowBlock {
    /// Index into the item list
    pub item_index: usize,
    /// Flow-axis advance of the cursor
    pub span: u32,
    /// Drawn size along the flow axis
    pub flow_extent: u32,
    /// Drawn size along the cross axis
    pub cross_size: u32,
    /// Box start on the flow axis (offset applied)
    pub flow_pos: i32,
    /// Box start on the cross axis (centered, offset applied)
    pub cross_pos: i32,
    pub positioning: Positioning,
    pub metrics: BlockMetrics,
}

impl FlowBlock {
    /// Box in page coordinates: (x, y, width, height).
    pub fn rect(&self, orientation: Orientation) -> (i32, i32, u32, u32) {
        let (w, h) = self.metrics.box_size();
        match orientation {
            Orientation::Horizontal => (self.flow_pos, self.cross_pos, w, h),
            Orientation::Vertical => (self.cross_pos, self.flow_pos, w, h),
        }
    }
}

/// Result of laying out one page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub orientation: Orientation,
    pub blocks: Vec<FlowBlock>,
    /// Print area width (cross axis)
    pub cross_size: u32,
    /// Page length in layout dots
    pub length: u32,
    /// Page length in feed dots
    pub device_length: u32,
}

impl PageLayout {
    /// Layout-space surface size (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        self.oriented(self.length)
    }

    /// Final page size (width, height) in device dots.
    pub fn device_dimensions(&self) -> (u32, u32) {
        self.oriented(self.device_length)
    }

    fn oriented(&self, length: u32) -> (u32, u32) {
        match self.orientation {
            Orientation::Horizontal => (length, self.cross_size),
            Orientation::Vertical => (self.cross_size, length),
        }
    }
}

/// `feed_pad_start + Σ span + feed_pad_end`, before any minimum.
///
/// ```
/// use labelpress::render::layout::auto_length;
///
/// assert_eq!(auto_length(&[20, 30, 40], 2, 8), 100);
/// assert_eq!(auto_length(&[], 2, 8), 10);
/// ```
pub fn auto_length(spans: &[u32], feed_pad_start: u32, feed_pad_end: u32) -> u32 {
    feed_pad_start + spans.iter().sum::<u32>() + feed_pad_end
}

/// Centered start of a box of `size` inside `limit`, rounded toward zero side.
#[inline]
pub fn center_start(limit: u32, size: u32) -> i32 {
    (limit as i64 - size as i64).div_euclid(2) as i32
}

// ============================================================================
// ENGINE
// ============================================================================

/// Single-pass flow layout over an ordered item list.
pub struct FlowLayoutEngine<'a> {
    provider: &'a dyn ContentProvider,
    media: MediaProfile,
    resolution: ResolutionProfile,
    options: LayoutOptions,
}

impl<'a> FlowLayoutEngine<'a> {
    pub fn new(
        provider: &'a dyn ContentProvider,
        media: MediaProfile,
        resolution: ResolutionProfile,
        options: LayoutOptions,
    ) -> Self {
        Self {
            provider,
            media,
            resolution,
            options,
        }
    }

    /// Lay out `items` in order.
    pub fn layout(&self, items: &[LabelItem]) -> PageLayout {
        let orientation = self.options.orientation;
        let limit = self.media.print_area_dots.max(1);

        let mut blocks = Vec::with_capacity(items.len());
        let mut cursor = self.options.feed_pad_start as i64;
        let mut absolute_end = 0i64;

        for (item_index, item) in items.iter().enumerate() {
            let (metrics, span) = self.measure(item, limit);
            let (w, h) = metrics.box_size();
            let (flow_extent, cross_size) = match orientation {
                Orientation::Horizontal => (w, h),
                Orientation::Vertical => (h, w),
            };
            let (flow_off, cross_off) = item.axis_offsets(orientation);

            let (flow_pos, cross_pos) = match item.position {
                Positioning::Flow => {
                    let flow_pos = cursor + flow_off as i64;
                    cursor += span as i64;
                    (flow_pos, center_start(limit, cross_size) + cross_off)
                }
                Positioning::Absolute => {
                    let flow_pos = flow_off as i64;
                    absolute_end = absolute_end
                        .max(flow_pos + flow_extent as i64 + self.options.feed_pad_end as i64);
                    (flow_pos, cross_off)
                }
            };

            blocks.push(FlowBlock {
                item_index,
                span,
                flow_extent,
                cross_size,
                flow_pos: flow_pos as i32,
                cross_pos,
                positioning: item.position,
                metrics,
            });
        }

        let auto = (cursor + self.options.feed_pad_end as i64).max(absolute_end).max(0) as u32;
        let (length, device_length) = self.final_length(auto);

        PageLayout {
            orientation,
            blocks,
            cross_size: limit,
            length,
            device_length,
        }
    }

    /// Apply feed scaling, minimum length and forced length.
    ///
    /// Returns (layout length, device length).
    fn final_length(&self, auto: u32) -> (u32, u32) {
        let head = self.resolution.dots_per_inch_axis0.max(1) as u64;
        let feed = self.resolution.dots_per_inch_axis1.max(1) as u64;
        let device_auto = (auto as u64 * feed).div_ceil(head) as u32;
        let forced = self
            .options
            .forced_length_mm
            .map(|mm| self.resolution.mm_to_feed_dots(mm))
            .unwrap_or(0);
        let device = device_auto
            .max(self.resolution.min_length_dots)
            .max(forced)
            .max(1);

        let layout = if device == device_auto {
            auto
        } else {
            auto.max((device as u64 * head).div_ceil(feed) as u32)
        };
        (layout.max(1), device)
    }

    /// Kind-specific metrics and the flow-axis span.
    fn measure(&self, item: &LabelItem, limit: u32) -> (BlockMetrics, u32) {
        let orientation = self.options.orientation;
        let flow_of = |w: u32, h: u32| match orientation {
            Orientation::Horizontal => w,
            Orientation::Vertical => h,
        };

        match &item.kind {
            ItemKind::Text(text) => {
                let block = self.fit_text(text, limit);
                let span = match orientation {
                    Orientation::Horizontal => block.width.max(block.height),
                    Orientation::Vertical => block.height + VERTICAL_TEXT_PADDING,
                };
                (BlockMetrics::Text(block), span)
            }
            ItemKind::Image(img) => {
                let (w, h) = fit_cross(clamp_dim(img.width), clamp_dim(img.height), limit, orientation);
                (BlockMetrics::Image { width: w, height: h }, flow_of(w, h))
            }
            ItemKind::Qr(qr) => {
                let size = clamp_dim(qr.size);
                (BlockMetrics::Qr { size }, size)
            }
            ItemKind::Barcode(bc) => {
                let (w, h) = (clamp_dim(bc.width), clamp_dim(bc.height));
                (BlockMetrics::Barcode { width: w, height: h }, flow_of(w, h))
            }
            ItemKind::Shape(shape) => {
                let (w, h) = (clamp_dim(shape.width), clamp_dim(shape.height));
                (BlockMetrics::Shape { width: w, height: h }, flow_of(w, h))
            }
        }
    }

    /// Shrink the font one step at a time until the block's cross-axis
    /// extent fits, returning the first size that does.
    ///
    /// Extent grows with font size, so the first fitting step is found by
    /// bisecting over step counts instead of walking them one by one.
    fn fit_text(&self, text: &TextItem, limit: u32) -> TextBlock {
        let requested = if text.font_size.is_finite() {
            text.font_size.max(MIN_FONT_SIZE)
        } else {
            MIN_FONT_SIZE
        };

        let fits = |block: &TextBlock| {
            let extent = match self.options.orientation {
                Orientation::Horizontal => block.height,
                Orientation::Vertical => block.width,
            };
            extent <= limit || block.font_size <= MIN_FONT_SIZE
        };

        let first = self.measure_text_block(text, requested);
        if fits(&first) {
            return first;
        }

        let size_at =
            |steps: u64| ((requested as f64 - steps as f64) as f32).max(MIN_FONT_SIZE);

        // fits(too_big) is false, fits(fits_at) is true
        let mut too_big = 0u64;
        let mut fits_at = (requested as f64 - MIN_FONT_SIZE as f64).ceil() as u64;
        let mut best = None;
        while fits_at - too_big > 1 {
            let mid = too_big + (fits_at - too_big) / 2;
            let block = self.measure_text_block(text, size_at(mid));
            if fits(&block) {
                fits_at = mid;
                best = Some(block);
            } else {
                too_big = mid;
            }
        }
        best.unwrap_or_else(|| self.measure_text_block(text, size_at(fits_at)))
    }

    fn measure_text_block(&self, text: &TextItem, size: f32) -> TextBlock {
        let lines: Vec<TextLine> = text
            .content
            .split('\n')
            .map(|line| {
                let m = self.provider.measure_text(line, &text.font, size);
                TextLine {
                    text: line.to_string(),
                    advance: m.advance_width.max(0.0).ceil() as u32,
                    ascent: m.ascent.max(0.0).ceil() as u32,
                    descent: m.descent.max(0.0).ceil() as u32,
                }
            })
            .collect();

        let gaps = text.line_gap * (lines.len() as u32).saturating_sub(1);
        let height = lines.iter().map(TextLine::height).sum::<u32>() + gaps;
        let width = lines.iter().map(|l| l.advance).max().unwrap_or(0);

        TextBlock {
            font_size: size,
            lines,
            line_gap: text.line_gap,
            width: width.max(1),
            height: height.max(1),
        }
    }
}

#[inline]
fn clamp_dim(v: i32) -> u32 {
    v.max(1) as u32
}

/// Scale (w, h) down so the cross-axis side fits `limit`, keeping aspect.
fn fit_cross(w: u32, h: u32, limit: u32, orientation: Orientation) -> (u32, u32) {
    let (cross, other) = match orientation {
        Orientation::Horizontal => (h, w),
        Orientation::Vertical => (w, h),
    };
    if cross <= limit {
        return (w, h);
    }
    let scale = limit as f32 / cross as f32;
    let other = ((other as f32 * scale).round() as u32).max(1);
    match orientation {
        Orientation::Horizontal => (other, limit),
        Orientation::Vertical => (limit, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{ImageSource, ShapeKind};
    use crate::render::provider::BuiltinProvider;

    const UNIT: ResolutionProfile = ResolutionProfile {
        name: "unit",
        dots_per_inch_axis0: 180,
        dots_per_inch_axis1: 180,
        min_length_dots: 1,
    };

    fn bars(widths: &[i32]) -> Vec<LabelItem> {
        widths
            .iter()
            .map(|&w| LabelItem::shape(ShapeKind::Rectangle, w, 10))
            .collect()
    }

    fn options(start: u32, end: u32) -> LayoutOptions {
        LayoutOptions {
            feed_pad_start: start,
            feed_pad_end: end,
            ..Default::default()
        }
    }

    #[test]
    fn test_length_is_pads_plus_spans() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, options(2, 8));
        let layout = engine.layout(&bars(&[20, 30, 40]));
        assert_eq!(layout.length, 100);
        assert_eq!(layout.device_length, 100);
        let spans: Vec<u32> = layout.blocks.iter().map(|b| b.span).collect();
        assert_eq!(spans, vec![20, 30, 40]);
    }

    #[test]
    fn test_min_length_floor() {
        let provider = BuiltinProvider::new();
        let res = ResolutionProfile { min_length_dots: 200, ..UNIT };
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, res, options(2, 8));
        assert_eq!(engine.layout(&bars(&[20, 30, 40])).length, 200);
    }

    #[test]
    fn test_empty_items_use_pads_and_minimum() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, options(5, 6));
        let layout = engine.layout(&[]);
        assert!(layout.blocks.is_empty());
        assert_eq!(layout.length, 11);

        let engine = FlowLayoutEngine::new(
            &provider,
            MediaProfile::TZE_12,
            ResolutionProfile::LOW,
            options(5, 6),
        );
        assert_eq!(engine.layout(&[]).length, 31);
    }

    #[test]
    fn test_forced_length_never_truncates() {
        let provider = BuiltinProvider::new();
        let mut opts = options(2, 8);
        // 1 inch = 180 dots
        opts.forced_length_mm = Some(25.4);
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, opts);
        assert_eq!(engine.layout(&bars(&[20])).length, 180);
        assert_eq!(engine.layout(&bars(&[100, 100])).length, 210);
    }

    #[test]
    fn test_cursor_monotonic_and_offsets_do_not_change_spans() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, options(0, 0));
        let items = vec![
            LabelItem::shape(ShapeKind::Rectangle, 10, 10).with_offset(5, 0),
            LabelItem::shape(ShapeKind::Rectangle, 10, 10).with_offset(-3, 0),
        ];
        let layout = engine.layout(&items);
        assert_eq!(layout.blocks[0].flow_pos, 5);
        assert_eq!(layout.blocks[1].flow_pos, 7);
        assert_eq!(layout.length, 20);
    }

    #[test]
    fn test_cross_axis_centering() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, options(0, 0));
        // print area 70: (70 - 11) / 2 = 29.5 → 29
        let layout = engine.layout(&[
            LabelItem::shape(ShapeKind::Rectangle, 10, 11),
            LabelItem::shape(ShapeKind::Rectangle, 10, 10).with_offset(0, 3),
        ]);
        assert_eq!(layout.blocks[0].cross_pos, 29);
        assert_eq!(layout.blocks[1].cross_pos, 33);
    }

    #[test]
    fn test_center_start_oversized() {
        assert_eq!(center_start(70, 75), -3);
        assert_eq!(center_start(70, 70), 0);
    }

    #[test]
    fn test_zero_area_clamped() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, options(0, 0));
        let layout = engine.layout(&[LabelItem::qr("x", 0), LabelItem::shape(ShapeKind::Line, -4, 0)]);
        assert_eq!(layout.blocks[0].metrics, BlockMetrics::Qr { size: 1 });
        assert_eq!(layout.blocks[1].metrics, BlockMetrics::Shape { width: 1, height: 1 });
    }

    #[test]
    fn test_image_scaled_to_print_area() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, options(0, 0));
        let item = LabelItem::image(ImageSource::Inline { bytes: vec![] }, 100, 140);
        let layout = engine.layout(&[item]);
        assert_eq!(layout.blocks[0].metrics, BlockMetrics::Image { width: 50, height: 70 });
        assert_eq!(layout.blocks[0].span, 50);
    }

    #[test]
    fn test_text_span_horizontal() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, options(0, 0));
        // Spleen at 24: 12 dots per char, 24 dots tall
        let layout = engine.layout(&[LabelItem::text("abcd", 24.0), LabelItem::text("a", 24.0)]);
        assert_eq!(layout.blocks[0].span, 48);
        // narrower than tall: span is the block height
        assert_eq!(layout.blocks[1].span, 24);
    }

    #[test]
    fn test_text_shrinks_to_fit() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_6, UNIT, options(0, 0));
        let layout = engine.layout(&[LabelItem::text("Tall", 60.0)]);
        let BlockMetrics::Text(block) = &layout.blocks[0].metrics else {
            panic!("expected text metrics");
        };
        assert!(block.height <= 32);
        assert!(block.font_size < 60.0);
        assert!(block.font_size >= MIN_FONT_SIZE);
    }

    #[test]
    fn test_text_shrink_lands_on_first_fitting_step() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_6, UNIT, options(0, 0));
        let text = TextItem {
            content: "Two\nlines".to_string(),
            font: "spleen".to_string(),
            font_size: 60.5,
            bold: false,
            line_gap: 2,
        };

        let mut size = 60.5;
        let expected = loop {
            let block = engine.measure_text_block(&text, size);
            if block.height <= 32 || size <= MIN_FONT_SIZE {
                break block;
            }
            size = (size - 1.0f32).max(MIN_FONT_SIZE);
        };

        assert_eq!(engine.fit_text(&text, 32), expected);
    }

    #[test]
    fn test_huge_font_size_shrinks_quickly() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, options(0, 0));
        let layout = engine.layout(&[LabelItem::text("Big", 1.0e8)]);
        let BlockMetrics::Text(block) = &layout.blocks[0].metrics else {
            panic!("expected text metrics");
        };
        assert!(block.height <= 70);
        assert!(block.font_size <= 70.0);
        assert!(block.font_size >= MIN_FONT_SIZE);
    }

    #[test]
    fn test_text_never_grows() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_24, UNIT, options(0, 0));
        let layout = engine.layout(&[LabelItem::text("small", 12.0)]);
        let BlockMetrics::Text(block) = &layout.blocks[0].metrics else {
            panic!("expected text metrics");
        };
        assert_eq!(block.font_size, 12.0);
    }

    #[test]
    fn test_multiline_height_with_gap() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_24, UNIT, options(0, 0));
        let mut item = LabelItem::text("one\ntwo\nthree", 24.0);
        if let ItemKind::Text(t) = &mut item.kind {
            t.line_gap = 3;
        }
        let layout = engine.layout(&[item]);
        let BlockMetrics::Text(block) = &layout.blocks[0].metrics else {
            panic!("expected text metrics");
        };
        assert_eq!(block.lines.len(), 3);
        assert_eq!(block.height, 24 * 3 + 3 * 2);
        assert_eq!(block.width, 60);
    }

    #[test]
    fn test_vertical_text_span_padding() {
        let provider = BuiltinProvider::new();
        let opts = LayoutOptions {
            orientation: Orientation::Vertical,
            feed_pad_start: 0,
            feed_pad_end: 0,
            forced_length_mm: None,
        };
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_24, UNIT, opts);
        let layout = engine.layout(&[LabelItem::text("ab", 24.0)]);
        assert_eq!(layout.blocks[0].span, 24 + VERTICAL_TEXT_PADDING);
        assert_eq!(layout.dimensions(), (128, 28));
    }

    #[test]
    fn test_high_resolution_stretches_feed() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(
            &provider,
            MediaProfile::TZE_12,
            ResolutionProfile::HIGH,
            options(0, 0),
        );
        let layout = engine.layout(&bars(&[90]));
        assert_eq!(layout.length, 90);
        assert_eq!(layout.device_length, 160);
        assert_eq!(layout.device_dimensions(), (160, 70));
    }

    #[test]
    fn test_absolute_does_not_advance_cursor() {
        let provider = BuiltinProvider::new();
        let engine = FlowLayoutEngine::new(&provider, MediaProfile::TZE_12, UNIT, options(0, 0));
        let layout = engine.layout(&[
            LabelItem::shape(ShapeKind::Rectangle, 10, 10),
            LabelItem::shape(ShapeKind::Rectangle, 10, 10).with_offset(50, 4).absolute(),
            LabelItem::shape(ShapeKind::Rectangle, 10, 10),
        ]);
        assert_eq!(layout.blocks[1].flow_pos, 50);
        assert_eq!(layout.blocks[1].cross_pos, 4);
        assert_eq!(layout.blocks[2].flow_pos, 10);
        // extended to cover the absolute item
        assert_eq!(layout.length, 60);
    }
}
