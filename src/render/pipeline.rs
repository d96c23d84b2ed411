//! # Render Pipeline
//!
//! [`LabelRenderer`] is the one layout + compositor pair used everywhere:
//! the interactive single-threaded path calls it directly and every worker
//! pool context owns its own instance. Output for the same request is
//! identical on both paths.
//!
//! ```
//! use labelpress::label::LabelItem;
//! use labelpress::printer::{MediaProfile, ResolutionProfile};
//! use labelpress::render::{LabelRenderer, LayoutOptions};
//!
//! let mut renderer = LabelRenderer::builtin();
//! let page = renderer.render(
//!     &[LabelItem::text("Hello", 24.0)],
//!     MediaProfile::TZE_12,
//!     ResolutionProfile::LOW,
//!     &LayoutOptions::default(),
//! );
//! assert_eq!(page.height, 70);
//! ```

use std::sync::Arc;

use tracing::debug;

use super::compositor::{CacheCapacities, PageCompositor, RenderCaches};
use super::layout::{FlowLayoutEngine, LayoutOptions, PageLayout};
use super::provider::{BuiltinProvider, ContentProvider};
use super::surface::Surface;
use crate::error::LabelError;
use crate::label::{LabelItem, Orientation, ParameterValues, apply_parameters};
use crate::printer::{MediaProfile, ResolutionProfile};

/// One page of a batch: an item snapshot plus the parameter row to apply.
#[derive(Debug, Clone)]
pub struct PageRenderRequest {
    pub page_index: usize,
    /// Shared, immutable item snapshot
    pub items: Arc<[LabelItem]>,
    pub media: MediaProfile,
    pub resolution: ResolutionProfile,
    pub options: LayoutOptions,
    pub parameter_values: ParameterValues,
}

impl PageRenderRequest {
    /// One request per parameter row, indexed by row position.
    ///
    /// An empty row list still yields a single page with no substitutions.
    pub fn for_rows(
        items: &[LabelItem],
        media: MediaProfile,
        resolution: ResolutionProfile,
        options: LayoutOptions,
        rows: Vec<ParameterValues>,
    ) -> Vec<Self> {
        let items: Arc<[LabelItem]> = items.into();
        let rows = if rows.is_empty() {
            vec![ParameterValues::new()]
        } else {
            rows
        };
        rows.into_iter()
            .enumerate()
            .map(|(page_index, parameter_values)| Self {
                page_index,
                items: Arc::clone(&items),
                media,
                resolution,
                options,
                parameter_values,
            })
            .collect()
    }
}

/// A rendered page in device dots.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub surface: Surface,
    pub width: u32,
    pub height: u32,
    pub media: MediaProfile,
    pub resolution: ResolutionProfile,
    pub orientation: Orientation,
}

/// Outcome for one page of a batch.
#[derive(Debug)]
pub struct PageRenderResult {
    pub page_index: usize,
    pub outcome: Result<RenderedPage, LabelError>,
}

impl PageRenderResult {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn page(&self) -> Option<&RenderedPage> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&LabelError> {
        self.outcome.as_ref().err()
    }
}

/// Layout + compositor with its private caches.
pub struct LabelRenderer {
    provider: Arc<dyn ContentProvider>,
    caches: RenderCaches,
}

impl LabelRenderer {
    pub fn new(provider: Arc<dyn ContentProvider>) -> Self {
        Self::with_capacities(provider, CacheCapacities::default())
    }

    pub fn with_capacities(provider: Arc<dyn ContentProvider>, capacities: CacheCapacities) -> Self {
        Self {
            provider,
            caches: RenderCaches::new(capacities),
        }
    }

    /// Renderer backed by [`BuiltinProvider`].
    pub fn builtin() -> Self {
        Self::new(Arc::new(BuiltinProvider::new()))
    }

    pub fn provider(&self) -> &Arc<dyn ContentProvider> {
        &self.provider
    }

    pub fn caches(&self) -> &RenderCaches {
        &self.caches
    }

    /// Lay out without painting.
    pub fn layout(
        &self,
        items: &[LabelItem],
        media: MediaProfile,
        resolution: ResolutionProfile,
        options: &LayoutOptions,
    ) -> PageLayout {
        FlowLayoutEngine::new(self.provider.as_ref(), media, resolution, *options).layout(items)
    }

    /// Lay out and paint one page.
    pub fn render(
        &mut self,
        items: &[LabelItem],
        media: MediaProfile,
        resolution: ResolutionProfile,
        options: &LayoutOptions,
    ) -> RenderedPage {
        let layout = self.layout(items, media, resolution, options);
        let surface = PageCompositor::new(self.provider.as_ref(), &mut self.caches).compose(items, &layout);
        let (width, height) = surface.dimensions();
        debug!(
            items = items.len(),
            width,
            height,
            media = media.id,
            resolution = resolution.name,
            "rendered page"
        );
        RenderedPage {
            surface,
            width,
            height,
            media,
            resolution,
            orientation: options.orientation,
        }
    }

    /// Apply the request's parameter row, then render.
    pub fn render_request(&mut self, request: &PageRenderRequest) -> RenderedPage {
        let items = apply_parameters(&request.items, &request.parameter_values);
        self.render(&items, request.media, request.resolution, &request.options)
    }
}

impl Default for LabelRenderer {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::ShapeKind;

    #[test]
    fn test_for_rows_indexes_pages() {
        let rows: Vec<ParameterValues> = (0..3)
            .map(|i| ParameterValues::from([("n".to_string(), i.to_string())]))
            .collect();
        let requests = PageRenderRequest::for_rows(
            &[LabelItem::text("{{n}}", 20.0)],
            MediaProfile::TZE_12,
            ResolutionProfile::LOW,
            LayoutOptions::default(),
            rows,
        );
        let indexes: Vec<usize> = requests.iter().map(|r| r.page_index).collect();
        assert_eq!(indexes, vec![0, 1, 2]);
        assert_eq!(requests[2].parameter_values["n"], "2");
    }

    #[test]
    fn test_for_rows_empty_gives_one_page() {
        let requests = PageRenderRequest::for_rows(
            &[],
            MediaProfile::TZE_12,
            ResolutionProfile::LOW,
            LayoutOptions::default(),
            Vec::new(),
        );
        assert_eq!(requests.len(), 1);
        assert!(requests[0].parameter_values.is_empty());
    }

    #[test]
    fn test_render_reports_device_dimensions() {
        let mut renderer = LabelRenderer::builtin();
        let page = renderer.render(
            &[LabelItem::shape(ShapeKind::Rectangle, 90, 10)],
            MediaProfile::TZE_24,
            ResolutionProfile::HIGH,
            &LayoutOptions {
                feed_pad_start: 0,
                feed_pad_end: 0,
                ..Default::default()
            },
        );
        assert_eq!((page.width, page.height), (160, 128));
        assert_eq!(page.surface.dimensions(), (160, 128));
    }

    #[test]
    fn test_render_request_substitutes_parameters() {
        let mut renderer = LabelRenderer::builtin();
        let request = PageRenderRequest::for_rows(
            &[LabelItem::text("{{word}}", 24.0)],
            MediaProfile::TZE_12,
            ResolutionProfile::LOW,
            LayoutOptions::default(),
            vec![ParameterValues::from([("word".to_string(), "abcdefgh".to_string())])],
        )
        .remove(0);
        let page = renderer.render_request(&request);
        // 8 glyphs at 12 dots + 8 + 8 padding
        assert_eq!(page.width, 112);
    }
}
