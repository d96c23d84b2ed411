//! # Batch Printing
//!
//! Caller-side entry point for multi-page print jobs. A batch whose items
//! all fit the fast path (text, QR and barcode in flow layout, unrotated)
//! goes through the [`WorkerPagePool`]. Anything else is rendered on the
//! caller's single-threaded [`LabelRenderer`], page by page, with the same
//! output.

use std::sync::Arc;

use tracing::info;

use crate::error::LabelError;
use crate::label::check_fast_path;
use crate::pool::{PageRenderer, WorkerPagePool, assign_slots, invalid_page_index};
use crate::render::{
    CacheCapacities, ContentProvider, LabelRenderer, PageRenderRequest, PageRenderResult,
    RenderedPage,
};

impl PageRenderer for LabelRenderer {
    fn render_page(&mut self, request: &PageRenderRequest) -> Result<RenderedPage, LabelError> {
        Ok(self.render_request(request))
    }
}

/// Pool-side renderer that refuses requests outside the fast path.
pub struct FastPathRenderer {
    inner: LabelRenderer,
}

impl FastPathRenderer {
    pub fn new(provider: Arc<dyn ContentProvider>, capacities: CacheCapacities) -> Self {
        Self {
            inner: LabelRenderer::with_capacities(provider, capacities),
        }
    }

    pub fn builtin() -> Self {
        Self {
            inner: LabelRenderer::builtin(),
        }
    }
}

impl PageRenderer for FastPathRenderer {
    fn render_page(&mut self, request: &PageRenderRequest) -> Result<RenderedPage, LabelError> {
        check_fast_path(&request.items)?;
        Ok(self.inner.render_request(request))
    }
}

/// Whether every request in the batch may use the pool.
pub fn is_fast_path_batch(requests: &[PageRenderRequest]) -> bool {
    requests.iter().all(|r| check_fast_path(&r.items).is_ok())
}

/// Render a batch through the pool when eligible, else on `local`.
///
/// Always returns one result per request, ordered by page index.
pub async fn render_batch<R: PageRenderer>(
    pool: &mut WorkerPagePool<R>,
    local: &mut LabelRenderer,
    requests: Vec<PageRenderRequest>,
) -> Vec<PageRenderResult> {
    if let Some(reason) = requests
        .iter()
        .find_map(|r| check_fast_path(&r.items).err())
    {
        info!(pages = requests.len(), %reason, "batch not eligible for pool, rendering locally");
        return render_sequentially(local, &requests);
    }

    pool.render_pages(requests).await
}

/// Render on the caller's renderer, placing each result at its page index.
fn render_sequentially(local: &mut LabelRenderer, requests: &[PageRenderRequest]) -> Vec<PageRenderResult> {
    let total = requests.len();
    let mut slots: Vec<Option<PageRenderResult>> = (0..total).map(|_| None).collect();
    for (assigned, request) in assign_slots(requests).into_iter().zip(requests) {
        match assigned {
            Ok(slot) => {
                slots[slot] = Some(PageRenderResult {
                    page_index: request.page_index,
                    outcome: local.render_page(request),
                });
            }
            Err(slot) => slots[slot] = Some(invalid_page_index(request.page_index, total)),
        }
    }
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::{LabelItem, ShapeKind};
    use crate::printer::{MediaProfile, ResolutionProfile};
    use crate::render::LayoutOptions;

    fn request(items: &[LabelItem]) -> PageRenderRequest {
        PageRenderRequest::for_rows(
            items,
            MediaProfile::TZE_12,
            ResolutionProfile::LOW,
            LayoutOptions::default(),
            Vec::new(),
        )
        .remove(0)
    }

    #[test]
    fn test_fast_path_renderer_rejects_shapes() {
        let mut renderer = FastPathRenderer::builtin();
        let err = renderer
            .render_page(&request(&[LabelItem::shape(ShapeKind::Ellipse, 20, 20)]))
            .unwrap_err();
        assert!(matches!(err, LabelError::UnsupportedLayout(_)));
    }

    #[test]
    fn test_fast_path_matches_local_output() {
        let items = vec![LabelItem::text("Same", 20.0), LabelItem::qr("pixels", 40)];
        let mut fast = FastPathRenderer::builtin();
        let mut local = LabelRenderer::builtin();
        let a = fast.render_page(&request(&items)).unwrap();
        let b = local.render_page(&request(&items)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sequential_results_follow_page_index() {
        let items = [LabelItem::shape(ShapeKind::Rectangle, 20, 10)];
        let mut requests = PageRenderRequest::for_rows(
            &items,
            MediaProfile::TZE_12,
            ResolutionProfile::LOW,
            LayoutOptions::default(),
            vec![Default::default(); 3],
        );
        requests.reverse();

        let mut local = LabelRenderer::builtin();
        let results = render_sequentially(&mut local, &requests);
        let order: Vec<usize> = results.iter().map(|r| r.page_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_is_fast_path_batch() {
        assert!(is_fast_path_batch(&[request(&[LabelItem::text("a", 10.0)])]));
        assert!(!is_fast_path_batch(&[
            request(&[LabelItem::text("a", 10.0)]),
            request(&[LabelItem::text("b", 10.0).with_rotation(15.0)]),
        ]));
    }
}
