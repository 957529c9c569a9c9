use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// Caps the number of tasks running through it at once.
///
/// Clones share the same pool; build a new dispatcher for an independent limit.
#[derive(Clone)]
pub struct Dispatcher {
    slots: Arc<Semaphore>,
    limit: usize,
}

impl Dispatcher {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            slots: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Wait for a free slot, run `task`, then give the slot back.
    pub async fn run<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        let _permit = self
            .slots
            .acquire()
            .await
            .expect("dispatcher semaphore is never closed");
        task.await
    }
}
