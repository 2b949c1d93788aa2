//! Background worker for fire-and-forget async work.
//!
//! The interactive thread is not async. It submits requests through a
//! channel; the worker runs them on the process-wide tokio runtime, each as
//! an independent task whose only error sink is the log. No request outcome
//! ever flows back to the submitter.

use std::sync::{Arc, OnceLock};

use anyhow::{Result, anyhow};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use crate::app::AppContext;
use crate::mentions::{self, MentionJob};

/// The set of requests that can be made to the background worker.
pub enum BackgroundRequest {
    /// Run the mention pipeline for a just-sent chat message.
    ProcessMentions(MentionJob),
}

/// The single global tokio runtime used by all async tasks.
static TOKIO_RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();

/// The sender used by [`submit_request`] to reach the worker.
static REQUEST_SENDER: OnceLock<UnboundedSender<BackgroundRequest>> = OnceLock::new();

/// Returns the process-wide tokio runtime, creating it on first use.
pub fn runtime() -> &'static tokio::runtime::Runtime {
    TOKIO_RUNTIME.get_or_init(|| {
        tokio::runtime::Runtime::new().expect("BUG: failed to create the tokio runtime")
    })
}

/// Starts the background worker on the process-wide runtime. Call once at
/// startup, after the application context has been constructed.
pub fn start(ctx: Arc<AppContext>) -> Result<()> {
    let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
    REQUEST_SENDER
        .set(sender)
        .map_err(|_| anyhow!("background worker already started"))?;
    runtime().spawn(async_worker(receiver, ctx));
    Ok(())
}

/// Submits a request to be executed asynchronously.
///
/// Never fails the caller: requests are fire-and-forget, so a missing or
/// dead worker is logged and the request is dropped.
pub fn submit_request(request: BackgroundRequest) {
    let Some(sender) = REQUEST_SENDER.get() else {
        error!("BUG: background request submitted before the worker was started");
        return;
    };
    if sender.send(request).is_err() {
        error!("BUG: background worker receiver has died; request dropped");
    }
}

async fn async_worker(mut receiver: UnboundedReceiver<BackgroundRequest>, ctx: Arc<AppContext>) {
    debug!("background worker started");
    while let Some(request) = receiver.recv().await {
        match request {
            BackgroundRequest::ProcessMentions(job) => {
                let ctx = Arc::clone(&ctx);
                tokio::spawn(async move {
                    mentions::process_mentions(&ctx.participants, &ctx.notifier, &job).await;
                });
            }
        }
    }
    error!("background worker channel closed unexpectedly");
}
