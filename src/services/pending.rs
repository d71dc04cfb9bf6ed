//! Shareable load future with an observable pending flag.

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};

use crate::error::LoadError;

/// Boxed future producing a load result.
pub type LoadFuture<T> = BoxFuture<'static, Result<T, LoadError>>;

/// A load future that any number of consumers can await, plus a flag that
/// stays `true` until the first settlement.
///
/// Clones share the same underlying computation and flag. The outcome is
/// passed through untouched, failures included.
pub struct PendingState<T: Clone> {
    inner: Shared<LoadFuture<T>>,
    pending: Arc<AtomicBool>,
}

impl<T: Clone> Clone for PendingState<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<T> PendingState<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap a computation. Wrapping an existing `PendingState` returns it
    /// unchanged.
    pub fn wrap(op: impl IntoPendingState<T>) -> Self {
        op.into_pending_state()
    }

    fn observe(op: LoadFuture<T>) -> Self {
        let pending = Arc::new(AtomicBool::new(true));
        let flag = pending.clone();
        let inner = op
            .map(move |result| {
                flag.store(false, Ordering::Release);
                result
            })
            .boxed()
            .shared();
        Self { inner, pending }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Await the outcome without consuming this wrapper.
    pub async fn settled(&self) -> Result<T, LoadError> {
        self.inner.clone().await
    }

    /// Outcome, if the computation has already settled.
    pub fn peek(&self) -> Option<&Result<T, LoadError>> {
        self.inner.peek()
    }

    /// Whether both wrappers share the same computation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Shared::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> Future for PendingState<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = Result<T, LoadError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl<T: Clone> fmt::Debug for PendingState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingState")
            .field("pending", &self.pending.load(Ordering::Acquire))
            .finish()
    }
}

/// Conversion into a [`PendingState`].
pub trait IntoPendingState<T: Clone> {
    fn into_pending_state(self) -> PendingState<T>;
}

impl<T> IntoPendingState<T> for PendingState<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn into_pending_state(self) -> PendingState<T> {
        self
    }
}

impl<T> IntoPendingState<T> for LoadFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn into_pending_state(self) -> PendingState<T> {
        PendingState::observe(self)
    }
}
