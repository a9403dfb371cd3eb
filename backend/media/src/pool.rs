//! Bounded worker pool for CPU-heavy decode jobs.

use std::sync::Arc;

use gifsmith_core::MediaError;
use tokio::sync::Semaphore;
use tracing::debug;

/// Cloneable handle to a pool of `size` blocking workers.
///
/// A job holds its permit until the blocking closure returns, so abandoning
/// the future (e.g. on a deadline) does not free the slot early.
#[derive(Clone)]
pub struct DecodePool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl DecodePool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Free worker slots right now.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait for a free worker and run `job` on the blocking thread pool.
    pub async fn run<F, T>(&self, job: F) -> Result<T, MediaError>
    where
        F: FnOnce() -> Result<T, MediaError> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| MediaError::Decode("decode pool is closed".into()))?;
        debug!(available = self.available(), "Decode worker acquired");

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            job()
        })
        .await
        .map_err(|e| MediaError::Decode(format!("decode worker failed: {e}")))?
    }
}

impl std::fmt::Debug for DecodePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodePool")
            .field("size", &self.size)
            .field("available", &self.available())
            .finish()
    }
}
