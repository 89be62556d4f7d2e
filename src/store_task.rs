//! Runs synchronous store queries off the async runtime with a timeout.

use std::time::Duration;

use tokio::{task, time::timeout};

use crate::Error;

/// Run `query` on tokio's blocking thread pool and wait at most `limit` for it.
///
/// `label` names the query in logs and in [Error::Timeout].
///
/// A query that times out keeps running on its thread until it finishes, but
/// its result is dropped.
///
/// # Errors
/// Returns:
/// - the error returned by `query`,
/// - [Error::Timeout] if `query` did not finish within `limit`,
/// - or [Error::AggregationFailure] if the task panicked or was cancelled.
pub(crate) async fn run_store_query<T, F>(
    label: &'static str,
    limit: Duration,
    query: F,
) -> Result<T, Error>
where
    F: FnOnce() -> Result<T, Error> + Send + 'static,
    T: Send + 'static,
{
    match timeout(limit, task::spawn_blocking(query)).await {
        Ok(Ok(result)) => {
            result.inspect_err(|error| tracing::error!("query for {label} failed: {error}"))
        }
        Ok(Err(join_error)) => {
            tracing::error!("query task for {label} did not complete: {join_error}");
            Err(Error::AggregationFailure {
                operation: label,
                cause: Box::new(Error::StoreUnavailable(join_error.to_string())),
            })
        }
        Err(_) => {
            tracing::error!("query for {label} timed out after {limit:?}");
            Err(Error::Timeout(label))
        }
    }
}
