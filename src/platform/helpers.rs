//! Shared helpers for API operations

use chrono::{DateTime, SecondsFormat, Utc};
use futures::stream::{self, StreamExt};
use log::debug;
use std::future::Future;

/// Run `f` over `items` with at most `max_workers` calls in flight
///
/// Results come back in input order regardless of completion order.
/// A `max_workers` of zero is treated as one.
pub async fn map_concurrent<I, T, F, Fut, R>(items: I, max_workers: usize, f: F) -> Vec<R>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = R>,
{
    let workers = max_workers.max(1);
    debug!("Mapping with up to {} concurrent workers", workers);
    stream::iter(items).map(f).buffered(workers).collect().await
}

/// Expiration timestamp in the form the API expects (`YYYY-MM-DDThh:mm:ss.sssZ`)
pub fn format_ttl(ttl: &DateTime<Utc>) -> String {
    ttl.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Turn a per-id failure count into a command result
pub(crate) fn ensure_all_succeeded(
    failures: usize,
    total: usize,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if failures == 0 {
        Ok(())
    } else {
        Err(format!("{} of {} operation(s) failed", failures, total).into())
    }
}
