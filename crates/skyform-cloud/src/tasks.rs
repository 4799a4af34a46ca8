//! Bookkeeping for spawned continuations and the failures they produce

use crate::error::CloudError;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

#[derive(Clone, Default)]
pub(crate) struct TaskSet {
    inner: Arc<TaskSetInner>,
}

#[derive(Default)]
struct TaskSetInner {
    handles: Mutex<Vec<JoinHandle<()>>>,
    failures: Mutex<Vec<Arc<CloudError>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TaskSet {
    pub(crate) fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(fut);
        lock(&self.inner.handles).push(handle);
    }

    /// Records a failure once; dependents carrying the same `Arc` are ignored.
    pub(crate) fn record(&self, failure: &Arc<CloudError>) {
        let mut failures = lock(&self.inner.failures);
        if !failures.iter().any(|f| Arc::ptr_eq(f, failure)) {
            failures.push(Arc::clone(failure));
        }
    }

    pub(crate) fn failures(&self) -> Vec<Arc<CloudError>> {
        lock(&self.inner.failures).clone()
    }

    /// Waits for every task, including tasks spawned while draining.
    pub(crate) async fn drain(&self) {
        loop {
            let batch = std::mem::take(&mut *lock(&self.inner.handles));
            if batch.is_empty() {
                break;
            }
            for handle in batch {
                if let Err(e) = handle.await {
                    self.record(&Arc::new(CloudError::TaskPanicked(e.to_string())));
                }
            }
        }
    }
}
