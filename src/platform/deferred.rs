//! Deferred requests
//!
//! A [`Deferred`] is a request already running on the tokio runtime. Its
//! outcome, including any API validation error, surfaces only when the
//! handle is resolved. Dropping the handle detaches the request without
//! cancelling it.

use futures::future::{BoxFuture, FutureExt};
use std::future::{Future, IntoFuture};

use crate::error::{PlatformError, Result};
use crate::platform::client::take_field;
use crate::platform::PlatformClient;
use serde_json::Value;

/// Handle to an in-flight request
#[must_use = "a deferred request reports errors only when resolved"]
pub struct Deferred<T> {
    inner: BoxFuture<'static, Result<T>>,
}

impl<T: Send + 'static> Deferred<T> {
    /// Start `future` on the current runtime
    ///
    /// Panics when called outside a tokio runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let handle = tokio::spawn(future);
        Self {
            inner: async move {
                match handle.await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(PlatformError::from(e)),
                }
            }
            .boxed(),
        }
    }

    /// Wait for the request and return its outcome
    pub async fn result(self) -> Result<T> {
        self.inner.await
    }

    /// Chain a fallible projection onto the eventual result
    pub fn map<U, F>(self, f: F) -> Deferred<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Result<U> + Send + 'static,
    {
        let inner = self.inner;
        Deferred {
            inner: async move { f(inner.await?) }.boxed(),
        }
    }
}

impl Deferred<Value> {
    /// Chain a lookup of a top-level JSON field
    pub fn field(self, key: &str) -> Deferred<Value> {
        let key = key.to_string();
        self.map(move |value| take_field(value, &key))
    }
}

impl<T: Send + 'static> IntoFuture for Deferred<T> {
    type Output = Result<T>;
    type IntoFuture = BoxFuture<'static, Result<T>>;

    fn into_future(self) -> Self::IntoFuture {
        self.inner
    }
}

impl PlatformClient {
    /// Issue a request in the background
    ///
    /// ```no_run
    /// # async fn demo(client: voxctl::PlatformClient) -> voxctl::Result<()> {
    /// let pending = client.defer(|c| async move { c.list_data().await });
    /// // ... other work ...
    /// let data = pending.result().await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn defer<T, F, Fut>(&self, f: F) -> Deferred<T>
    where
        T: Send + 'static,
        F: FnOnce(PlatformClient) -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Deferred::spawn(f(self.clone()))
    }
}
