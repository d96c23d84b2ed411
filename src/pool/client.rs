//! Client side of one execution context.
//!
//! ```text
//! request(page)            context thread
//!   id = next_id ─── job ──► render
//!   wait until deadline      │
//!     reply.id < id ◄────────┤ (late answer to a timed-out job: dropped)
//!     reply.id == id ◄───────┘ → result
//! ```

use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use tracing::debug;

use super::worker::{ContextChannels, RenderJob};
use crate::error::LabelError;
use crate::render::{PageRenderRequest, RenderedPage};

/// Request/response handle to one context.
pub(crate) struct ContextClient {
    index: usize,
    channels: ContextChannels,
    next_id: u64,
}

impl ContextClient {
    pub fn new(index: usize, channels: ContextChannels) -> Self {
        Self {
            index,
            channels,
            next_id: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Send one request and wait for its reply.
    ///
    /// | Outcome | Error |
    /// |---------|-------|
    /// | Context gone (panic, closed channel) | `Transport` |
    /// | No reply before `timeout` | `Timeout`, context stays usable |
    /// | Renderer returned an error | `Response` wrapping it |
    pub async fn request(
        &mut self,
        request: PageRenderRequest,
        timeout: Duration,
    ) -> Result<RenderedPage, LabelError> {
        let id = self.next_id;
        self.next_id += 1;

        let page = request.page_index;
        self.channels
            .jobs
            .send(RenderJob { id, request })
            .map_err(|_| self.lost("job channel closed"))?;

        let deadline = Instant::now() + timeout;
        loop {
            match timeout_at(deadline, self.channels.replies.recv()).await {
                Ok(Some(reply)) if reply.id == id => {
                    return reply.outcome.map_err(|e| LabelError::Response(Box::new(e)));
                }
                Ok(Some(reply)) => {
                    debug!(context = self.index, stale = reply.id, pending = id, "discarding stale reply");
                }
                Ok(None) => return Err(self.lost("reply channel closed")),
                Err(_) => {
                    debug!(context = self.index, id, page, "request timed out");
                    return Err(LabelError::Timeout(timeout));
                }
            }
        }
    }

    fn lost(&self, reason: &str) -> LabelError {
        let detail = if self.channels.thread.is_finished() {
            "context thread exited"
        } else {
            reason
        };
        LabelError::Transport(format!("context {}: {}", self.index, detail))
    }
}
