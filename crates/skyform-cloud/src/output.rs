//! Resolve-then-continue values
//!
//! An [`Output`] is a value that becomes known only after the engine has
//! provisioned or looked up the resource it belongs to. Continuations registered
//! with [`Output::apply`] and friends run strictly after their source resolved,
//! and a failing source skips every continuation downstream of it.
//!
//! Outputs are driven eagerly: each one is backed by a task on the tokio runtime
//! tracked by the owning [`Context`], so observers fire even when nothing awaits
//! them. [`Context::finish`] waits for all of them.

use crate::context::Context;
use crate::error::{CloudError, Resolution, Result};
use crate::tasks::TaskSet;
use futures_util::future::{self, BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::oneshot;

pub struct Output<T: Clone> {
    inner: Shared<BoxFuture<'static, Resolution<T>>>,
    tasks: TaskSet,
}

impl<T: Clone> Clone for Output<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            tasks: self.tasks.clone(),
        }
    }
}

impl<T: Clone> fmt::Debug for Output<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.inner.peek() {
            Some(Ok(_)) => "resolved",
            Some(Err(_)) => "failed",
            None => "pending",
        };
        write!(f, "Output({})", state)
    }
}

impl<T> Output<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn spawn<F>(tasks: &TaskSet, fut: F) -> Self
    where
        F: Future<Output = Resolution<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let recorder = tasks.clone();
        tasks.spawn(async move {
            let result = fut.await;
            if let Err(e) = &result {
                recorder.record(e);
            }
            let _ = tx.send(result);
        });

        let inner = async move { rx.await.unwrap_or_else(|_| Err(Arc::new(CloudError::Abandoned))) }
            .boxed()
            .shared();

        Self {
            inner,
            tasks: tasks.clone(),
        }
    }

    /// An output whose value is already known
    pub fn known(ctx: &Context, value: T) -> Self {
        Self {
            inner: future::ready(Ok(value)).boxed().shared(),
            tasks: ctx.tasks().clone(),
        }
    }

    /// Waits for the value
    pub async fn resolve(&self) -> Resolution<T> {
        self.inner.clone().await
    }

    /// The value if it has already resolved
    pub fn peek(&self) -> Option<Resolution<T>> {
        self.inner.peek().cloned()
    }

    pub fn apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        let source = self.clone();
        Output::spawn(&self.tasks, async move { source.resolve().await.map(f) })
    }

    pub fn try_apply<U, F>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let source = self.clone();
        Output::spawn(&self.tasks, async move {
            let value = source.resolve().await?;
            Ok(f(value)?)
        })
    }

    /// Async continuation. Errors it returns, including ones it forwards from
    /// other outputs, fail the resulting output and the run.
    pub fn apply_async<U, F, Fut>(&self, f: F) -> Output<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(T) -> Fut + Send + 'static,
        Fut: Future<Output = Resolution<U>> + Send + 'static,
    {
        let source = self.clone();
        Output::spawn(&self.tasks, async move {
            let value = source.resolve().await?;
            f(value).await
        })
    }

    pub fn zip<U>(&self, other: &Output<U>) -> Output<(T, U)>
    where
        U: Clone + Send + Sync + 'static,
    {
        let (a, b) = (self.clone(), other.clone());
        Output::spawn(&self.tasks, async move {
            let (a, b) = future::join(a.resolve(), b.resolve()).await;
            Ok((a?, b?))
        })
    }

    pub fn zip3<U, V>(&self, b: &Output<U>, c: &Output<V>) -> Output<(T, U, V)>
    where
        U: Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let (a, b, c) = (self.clone(), b.clone(), c.clone());
        Output::spawn(&self.tasks, async move {
            let (a, b, c) = future::join3(a.resolve(), b.resolve(), c.resolve()).await;
            Ok((a?, b?, c?))
        })
    }

    pub fn zip4<U, V, W>(&self, b: &Output<U>, c: &Output<V>, d: &Output<W>) -> Output<(T, U, V, W)>
    where
        U: Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        W: Clone + Send + Sync + 'static,
    {
        let (a, b, c, d) = (self.clone(), b.clone(), c.clone(), d.clone());
        Output::spawn(&self.tasks, async move {
            let (a, b, c, d) =
                future::join4(a.resolve(), b.resolve(), c.resolve(), d.resolve()).await;
            Ok((a?, b?, c?, d?))
        })
    }

    /// Resolves once every output has, preserving order
    pub fn all(ctx: &Context, outputs: Vec<Output<T>>) -> Output<Vec<T>> {
        Output::spawn(ctx.tasks(), async move {
            future::join_all(outputs.iter().map(|o| o.resolve()))
                .await
                .into_iter()
                .collect::<Resolution<Vec<T>>>()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::PreviewEngine;
    use std::sync::Mutex;

    fn context() -> Context {
        Context::new("test", "dev", Arc::new(PreviewEngine::new()))
    }

    #[tokio::test]
    async fn test_apply_chain() {
        let ctx = context();
        let base = Output::known(&ctx, 20);
        let doubled = base.apply(|v| v * 2).apply(|v| v + 2);

        assert_eq!(doubled.resolve().await.unwrap(), 42);
        assert!(ctx.finish().await.is_ok());
    }

    #[tokio::test]
    async fn test_continuation_runs_after_source() {
        let ctx = context();
        let (tx, rx) = oneshot::channel::<String>();
        let order = Arc::new(Mutex::new(Vec::new()));

        let source = Output::spawn(ctx.tasks(), {
            let order = order.clone();
            async move {
                let value = rx.await.unwrap_or_default();
                order.lock().unwrap().push("source");
                Ok(value)
            }
        });
        let observed = source.apply({
            let order = order.clone();
            move |v| {
                order.lock().unwrap().push("continuation");
                v.len()
            }
        });

        tokio::task::yield_now().await;
        assert!(observed.peek().is_none());

        tx.send("vpc-123".to_string()).unwrap();
        assert_eq!(observed.resolve().await.unwrap(), 7);
        assert_eq!(*order.lock().unwrap(), vec!["source", "continuation"]);
    }

    #[tokio::test]
    async fn test_failure_skips_continuations_and_is_reported_once() {
        let ctx = context();
        let ran = Arc::new(Mutex::new(false));

        let failed: Output<String> = Output::known(&ctx, 1).try_apply(|_| {
            Err(CloudError::InvalidConfig("no zones".to_string()))
        });
        let downstream = failed.apply({
            let ran = ran.clone();
            move |v| {
                *ran.lock().unwrap() = true;
                v
            }
        });
        let joined = downstream.zip(&Output::known(&ctx, 3));

        assert!(joined.resolve().await.is_err());
        assert!(!*ran.lock().unwrap());

        match ctx.finish().await {
            Err(CloudError::RunFailed(failures)) => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].to_string().contains("no zones"));
            }
            other => panic!("expected RunFailed, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_all_preserves_order() {
        let ctx = context();
        let outputs = vec![
            Output::known(&ctx, "a").apply(|s| s.to_string()),
            Output::known(&ctx, "b").apply(|s| s.to_string()),
            Output::known(&ctx, "c").apply(|s| s.to_string()),
        ];

        let all = Output::all(&ctx, outputs);
        assert_eq!(all.resolve().await.unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_apply_async_forwards_errors() {
        let ctx = context();
        let out: Output<u32> = Output::known(&ctx, 1).apply_async(|_| async {
            Err(Arc::new(CloudError::InvokeFailed {
                token: "lookup".to_string(),
                message: "denied".to_string(),
            }))
        });

        assert!(out.resolve().await.is_err());
        assert!(ctx.finish().await.is_err());
    }
}
