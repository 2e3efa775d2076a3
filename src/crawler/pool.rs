//! Ordered fan-out with first-failure-wins semantics
//!
//! Each future runs as its own task. Results are slotted by position, so the
//! output order matches the input order whatever the completion order. The
//! first real failure cancels the shared token, which stops every sibling
//! fetch, including those running under other pools on the same token.

use crate::ExporterError;
use std::future::Future;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Runs every future concurrently and returns their outputs in input order
///
/// Waits for all tasks before returning, so no task outlives the call.
/// `Cancelled` results never win over a real error; if the token was
/// cancelled elsewhere and nothing here failed, the result is `Cancelled`.
pub async fn run_ordered<T, F, I>(
    futures: I,
    cancel: &CancellationToken,
) -> Result<Vec<T>, ExporterError>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, ExporterError>> + Send + 'static,
    T: Send + 'static,
{
    let mut tasks = JoinSet::new();
    let mut slots: Vec<Option<T>> = Vec::new();

    for (index, future) in futures.into_iter().enumerate() {
        tasks.spawn(async move { (index, future.await) });
        slots.push(None);
    }

    let mut first_error: Option<ExporterError> = None;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(value))) => slots[index] = Some(value),
            Ok((_, Err(ExporterError::Cancelled))) => {}
            Ok((_, Err(error))) => {
                if first_error.is_none() {
                    tracing::debug!("Cancelling sibling tasks after: {}", error);
                    cancel.cancel();
                    first_error = Some(error);
                }
            }
            Err(join_error) if join_error.is_panic() => {
                cancel.cancel();
                std::panic::resume_unwind(join_error.into_panic());
            }
            Err(_) => {}
        }
    }

    if let Some(error) = first_error {
        return Err(error);
    }

    slots
        .into_iter()
        .collect::<Option<Vec<T>>>()
        .ok_or(ExporterError::Cancelled)
}
