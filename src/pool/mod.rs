//! # Worker Page Pool
//!
//! Renders a batch of pages across a small fixed set of execution contexts
//! and returns exactly one result per request, ordered by page index.
//!
//! ## Page Task States
//!
//! ```text
//!              ┌──► Completed
//! Dispatched ──┼──► ResponseError   (page errored, context keeps working)
//!              ├──► Timeout         (page errored, context keeps working)
//!              └──► TransportFailed (context dropped for good,
//!                                    page re-rendered locally or errored)
//! ```
//!
//! ## Scheduling
//!
//! - One driver task per live context pulls the next request from a shared
//!   queue, so a context runs zero or more pages in sequence.
//! - Results are written into a pre-sized slot array at their page index
//!   as they arrive, so neither completion order nor request order affects
//!   output order. Page indexes must be `0..N` without repeats; a request
//!   with an out-of-range or repeated index gets a configuration error in
//!   one of the slots left free.
//! - When a context is lost its page (and any pages nobody was left to
//!   take) go to a local renderer if `local_fallback` is set, otherwise
//!   they are reported as transport errors.
//! - With no contexts at all the pool is degraded and renders every page
//!   sequentially on a local renderer.
//!
//! Local rendering runs on tokio's blocking pool and turns renderer panics
//! into per-page errors.
//!
//! ## Example
//!
//! ```
//! use labelpress::label::LabelItem;
//! use labelpress::pool::{PoolConfig, WorkerPagePool};
//! use labelpress::printer::{MediaProfile, ResolutionProfile};
//! use labelpress::render::{LabelRenderer, LayoutOptions, PageRenderRequest};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut pool = WorkerPagePool::new(PoolConfig::default(), LabelRenderer::builtin);
//! let requests = PageRenderRequest::for_rows(
//!     &[LabelItem::text("Hi", 24.0)],
//!     MediaProfile::TZE_12,
//!     ResolutionProfile::LOW,
//!     LayoutOptions::default(),
//!     Vec::new(),
//! );
//! let results = pool.render_pages(requests).await;
//! assert!(results[0].is_ok());
//! # });
//! ```

mod client;
mod worker;

pub use worker::PageRenderer;

use std::collections::VecDeque;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::LabelError;
use crate::render::{PageRenderRequest, PageRenderResult};
use client::ContextClient;

fn default_contexts() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(4)
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

fn default_local_fallback() -> bool {
    true
}

/// Pool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of execution contexts; 0 means sequential rendering
    #[serde(default = "default_contexts")]
    pub contexts: usize,
    /// Per-request deadline
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Re-render pages of lost contexts locally instead of failing them
    #[serde(default = "default_local_fallback")]
    pub local_fallback: bool,
}

impl PoolConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            contexts: default_contexts(),
            request_timeout_ms: default_request_timeout_ms(),
            local_fallback: default_local_fallback(),
        }
    }
}

type Factory<R> = Arc<dyn Fn() -> R + Send + Sync>;
type Slots = Arc<Mutex<Vec<Option<PageRenderResult>>>>;
type Queue = Arc<Mutex<VecDeque<(usize, PageRenderRequest)>>>;

/// What a driver hands back when its queue runs dry or its context dies.
struct DriverExit {
    client: Option<ContextClient>,
    lost: Option<(usize, PageRenderRequest)>,
}

/// Fixed set of rendering contexts plus a local fallback renderer factory.
pub struct WorkerPagePool<R: PageRenderer> {
    config: PoolConfig,
    factory: Factory<R>,
    contexts: Vec<ContextClient>,
    degraded: bool,
}

impl<R: PageRenderer> WorkerPagePool<R> {
    /// Start `config.contexts` contexts, each with a renderer from `factory`.
    ///
    /// Contexts that fail to start are skipped. If none start, the pool is
    /// degraded to sequential local rendering.
    pub fn new<F>(config: PoolConfig, factory: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        let factory: Factory<R> = Arc::new(factory);
        let mut contexts = Vec::with_capacity(config.contexts);
        for index in 0..config.contexts {
            match worker::spawn_context(index, factory()) {
                Ok(channels) => contexts.push(ContextClient::new(index, channels)),
                Err(e) => warn!(context = index, error = %e, "failed to start context"),
            }
        }

        let degraded = contexts.is_empty();
        if degraded {
            warn!("no execution contexts available, rendering sequentially");
        } else {
            debug!(contexts = contexts.len(), "worker pool started");
        }

        Self {
            config,
            factory,
            contexts,
            degraded,
        }
    }

    /// Whether the pool started without any contexts.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Contexts still usable.
    pub fn available_contexts(&self) -> usize {
        self.contexts.len()
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Render every request; result `i` belongs to page index `i`.
    ///
    /// Never fails as a whole: per-page problems are in each result.
    pub async fn render_pages(&mut self, requests: Vec<PageRenderRequest>) -> Vec<PageRenderResult> {
        let total = requests.len();
        let mut slots: Vec<Option<PageRenderResult>> = (0..total).map(|_| None).collect();
        let mut jobs = Vec::with_capacity(total);
        for (assigned, request) in assign_slots(&requests).into_iter().zip(requests) {
            match assigned {
                Ok(slot) => jobs.push((slot, request)),
                Err(slot) => {
                    warn!(page = request.page_index, total, "invalid page index");
                    slots[slot] = Some(invalid_page_index(request.page_index, total));
                }
            }
        }
        let slots: Slots = Arc::new(Mutex::new(slots));

        let orphans: Vec<(usize, PageRenderRequest)> = if self.degraded {
            jobs.sort_by_key(|(slot, _)| *slot);
            jobs
        } else {
            self.dispatch(jobs, &slots).await
        };

        if !orphans.is_empty() {
            if self.degraded || self.config.local_fallback {
                debug!(pages = orphans.len(), "rendering pages locally");
                let rendered = render_locally(Arc::clone(&self.factory), orphans).await;
                let mut slots = slots.lock().await;
                for (slot, result) in rendered {
                    slots[slot] = Some(result);
                }
            } else {
                let mut slots = slots.lock().await;
                for (slot, request) in orphans {
                    slots[slot] = Some(PageRenderResult {
                        page_index: request.page_index,
                        outcome: Err(LabelError::Transport(
                            "no execution context completed the page".to_string(),
                        )),
                    });
                }
            }
        }

        let slots = std::mem::take(&mut *slots.lock().await);
        let results: Vec<PageRenderResult> = slots
            .into_iter()
            .enumerate()
            .map(|(page_index, slot)| {
                slot.unwrap_or_else(|| PageRenderResult {
                    page_index,
                    outcome: Err(LabelError::Transport("page was never completed".to_string())),
                })
            })
            .collect();

        let failed = results.iter().filter(|r| !r.is_ok()).count();
        info!(pages = total, failed, contexts = self.contexts.len(), "batch rendered");
        results
    }

    /// Fan requests out over the live contexts.
    ///
    /// Returns requests that still need rendering: pages whose context was
    /// lost, plus anything left in the queue once every context is gone.
    async fn dispatch(
        &mut self,
        jobs: Vec<(usize, PageRenderRequest)>,
        slots: &Slots,
    ) -> Vec<(usize, PageRenderRequest)> {
        let queue: Queue = Arc::new(Mutex::new(jobs.into_iter().collect()));
        let timeout = self.config.request_timeout();

        let mut drivers = JoinSet::new();
        for client in self.contexts.drain(..) {
            drivers.spawn(drive(client, Arc::clone(&queue), Arc::clone(slots), timeout));
        }

        let mut orphans = Vec::new();
        while let Some(joined) = drivers.join_next().await {
            match joined {
                Ok(exit) => {
                    if let Some(client) = exit.client {
                        self.contexts.push(client);
                    }
                    orphans.extend(exit.lost);
                }
                Err(e) => warn!(error = %e, "context driver aborted"),
            }
        }
        self.contexts.sort_by_key(ContextClient::index);

        orphans.extend(queue.lock().await.drain(..));
        orphans.sort_by_key(|(slot, _)| *slot);
        orphans
    }
}

/// Result slot for each request.
///
/// When page indexes are `0..N` without repeats every request gets `Ok`
/// with its own index. A request whose index is out of range or already
/// claimed gets `Err` with one of the slots nobody claimed, in request
/// order.
pub(crate) fn assign_slots(requests: &[PageRenderRequest]) -> Vec<Result<usize, usize>> {
    let total = requests.len();
    let mut taken = vec![false; total];
    let claimed: Vec<Option<usize>> = requests
        .iter()
        .map(|r| {
            let i = r.page_index;
            (i < total && !std::mem::replace(&mut taken[i], true)).then_some(i)
        })
        .collect();

    // As many free slots as unclaimed requests
    let mut free = (0..total).filter(|&i| !taken[i]);
    claimed
        .into_iter()
        .map(|claim| claim.ok_or_else(|| free.next().unwrap_or(0)))
        .collect()
}

/// Result for a request whose page index cannot be placed.
pub(crate) fn invalid_page_index(page_index: usize, total: usize) -> PageRenderResult {
    PageRenderResult {
        page_index,
        outcome: Err(LabelError::Config(format!(
            "page index {} is out of range or repeated in a batch of {}",
            page_index, total
        ))),
    }
}

/// Feed one context from the shared queue until it is empty or the context
/// is lost.
async fn drive(mut client: ContextClient, queue: Queue, slots: Slots, timeout: Duration) -> DriverExit {
    loop {
        let Some((slot, request)) = queue.lock().await.pop_front() else {
            return DriverExit {
                client: Some(client),
                lost: None,
            };
        };
        let page_index = request.page_index;

        // Kept for a local retry if the context dies mid-request
        let retry = request.clone();
        let outcome = match client.request(request, timeout).await {
            Err(LabelError::Transport(reason)) => {
                warn!(context = client.index(), page = page_index, %reason, "context lost");
                return DriverExit {
                    client: None,
                    lost: Some((slot, retry)),
                };
            }
            outcome => outcome,
        };

        slots.lock().await[slot] = Some(PageRenderResult { page_index, outcome });
    }
}

/// Render requests one after another on a fresh local renderer.
///
/// A panicking render becomes that page's error and the renderer is
/// replaced before the next page.
async fn render_locally<R: PageRenderer>(
    factory: Factory<R>,
    jobs: Vec<(usize, PageRenderRequest)>,
) -> Vec<(usize, PageRenderResult)> {
    let meta: Vec<(usize, usize)> = jobs.iter().map(|(slot, r)| (*slot, r.page_index)).collect();

    let handle = tokio::task::spawn_blocking(move || {
        let mut renderer = factory();
        let mut out = Vec::with_capacity(jobs.len());
        for (slot, request) in jobs {
            let outcome = match catch_unwind(AssertUnwindSafe(|| renderer.render_page(&request))) {
                Ok(outcome) => outcome,
                Err(payload) => {
                    renderer = factory();
                    Err(LabelError::Transport(format!(
                        "local render panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                }
            };
            out.push((
                slot,
                PageRenderResult {
                    page_index: request.page_index,
                    outcome,
                },
            ));
        }
        out
    });

    match handle.await {
        Ok(out) => out,
        Err(e) => {
            warn!(error = %e, "local renderer task failed");
            meta.into_iter()
                .map(|(slot, page_index)| {
                    (
                        slot,
                        PageRenderResult {
                            page_index,
                            outcome: Err(LabelError::Transport(format!("local render failed: {}", e))),
                        },
                    )
                })
                .collect()
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config: PoolConfig = serde_json::from_str("{}").unwrap();
        assert!(config.contexts >= 1 && config.contexts <= 4);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.local_fallback);
    }

    fn requests_with(indexes: &[usize]) -> Vec<PageRenderRequest> {
        use crate::label::LabelItem;
        use crate::printer::{MediaProfile, ResolutionProfile};
        use crate::render::LayoutOptions;

        let mut requests = PageRenderRequest::for_rows(
            &[LabelItem::text("x", 10.0)],
            MediaProfile::TZE_12,
            ResolutionProfile::LOW,
            LayoutOptions::default(),
            vec![Default::default(); indexes.len()],
        );
        for (request, &index) in requests.iter_mut().zip(indexes) {
            request.page_index = index;
        }
        requests
    }

    #[test]
    fn test_assign_slots_follows_page_index() {
        assert_eq!(assign_slots(&requests_with(&[2, 0, 1])), vec![Ok(2), Ok(0), Ok(1)]);
    }

    #[test]
    fn test_assign_slots_invalid_take_free_slots() {
        // 0 repeated and 7 out of range: slots 1 and 3 are left for them
        assert_eq!(
            assign_slots(&requests_with(&[0, 7, 2, 0])),
            vec![Ok(0), Err(1), Ok(2), Err(3)]
        );
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
