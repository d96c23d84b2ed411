//! Execution context side of the pool.
//!
//! Each context is a named OS thread that owns one [`PageRenderer`] and
//! processes jobs strictly in arrival order. Replies echo the job id so the
//! client can tell a late answer to a timed-out job from the one it is
//! waiting for.
//!
//! A renderer panic ends the thread. Both channel ends it held are dropped,
//! which the client observes as a closed channel (transport failure).

use std::io;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::error::LabelError;
use crate::render::{PageRenderRequest, RenderedPage};

/// Something that can render one page request.
///
/// Implementations own their caches; a context calls them sequentially.
pub trait PageRenderer: Send + 'static {
    fn render_page(&mut self, request: &PageRenderRequest) -> Result<RenderedPage, LabelError>;
}

/// Job sent to a context.
pub(crate) struct RenderJob {
    pub id: u64,
    pub request: PageRenderRequest,
}

/// Reply from a context, correlated by `id`.
pub(crate) struct RenderReply {
    pub id: u64,
    pub outcome: Result<RenderedPage, LabelError>,
}

/// Channel ends held by the client for one context.
pub(crate) struct ContextChannels {
    pub jobs: mpsc::UnboundedSender<RenderJob>,
    pub replies: mpsc::UnboundedReceiver<RenderReply>,
    pub thread: JoinHandle<()>,
}

/// Start context `index` running `renderer`.
pub(crate) fn spawn_context<R: PageRenderer>(index: usize, renderer: R) -> io::Result<ContextChannels> {
    let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
    let (replies_tx, replies_rx) = mpsc::unbounded_channel();

    let thread = thread::Builder::new()
        .name(format!("labelpress-ctx-{}", index))
        .spawn(move || run_context(index, renderer, jobs_rx, replies_tx))?;

    Ok(ContextChannels {
        jobs: jobs_tx,
        replies: replies_rx,
        thread,
    })
}

fn run_context<R: PageRenderer>(
    index: usize,
    mut renderer: R,
    mut jobs: mpsc::UnboundedReceiver<RenderJob>,
    replies: mpsc::UnboundedSender<RenderReply>,
) {
    debug!(context = index, "context started");
    while let Some(job) = jobs.blocking_recv() {
        trace!(context = index, id = job.id, page = job.request.page_index, "rendering");
        let outcome = renderer.render_page(&job.request);
        if replies.send(RenderReply { id: job.id, outcome }).is_err() {
            break;
        }
    }
    debug!(context = index, "context stopped");
}
