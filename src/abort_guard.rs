use tokio::task::JoinHandle;

/// Owns a spawned background task and aborts it when dropped.
///
/// Handles such as [`QueueSocket`](crate::QueueSocket) and
/// [`SimulationHandle`](crate::simulator::SimulationHandle) keep one of these
/// so that their task lives exactly as long as the handle does.
#[derive(Debug)]
pub struct AbortGuard {
    handle: Option<JoinHandle<()>>,
}

impl AbortGuard {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Whether the guarded task has already run to completion.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the task to end on its own instead of aborting it.
    pub async fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "background task panicked");
                }
            }
        }
    }
}

impl Drop for AbortGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
