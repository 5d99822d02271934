//! Fan-out/join primitives shared by the providers.
//!
//! Two join policies are provided:
//!
//! - [`collect_all_successes`]: every success is kept; the call fails only
//!   when nothing succeeded, with the first recorded error.
//! - [`best_effort`] / [`best_effort_merge`]: optional sub-results degrade
//!   to their default value and never fail the call.

use std::fmt::Display;
use std::future::Future;

use futures::StreamExt;
use futures::stream;

/// Runs `ops` concurrently (at most `width` in flight) and waits for all.
///
/// Successful values are returned in completion order. If at least one
/// operation succeeds the call succeeds, even when others failed.
///
/// # Errors
///
/// Returns the first recorded error when no operation succeeded.
pub async fn collect_all_successes<I, F, T, E>(ops: I, width: usize) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut pending = stream::iter(ops).buffer_unordered(width.max(1));
    let mut values = Vec::new();
    let mut first_error: Option<E> = None;
    let mut failed = 0usize;

    while let Some(result) = pending.next().await {
        match result {
            Ok(value) => values.push(value),
            Err(e) => {
                failed = failed.saturating_add(1);
                tracing::debug!(error = %e, "fan-out operation failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    if values.is_empty() {
        if let Some(e) = first_error {
            return Err(e);
        }
        return Ok(values);
    }

    if failed > 0 {
        tracing::warn!(
            succeeded = values.len(),
            failed = failed,
            "partial fan-out failure, returning successful results"
        );
    }

    Ok(values)
}

/// Awaits an optional sub-operation, degrading a failure to `T::default()`.
pub async fn best_effort<F, T, E>(label: &'static str, op: F) -> T
where
    F: Future<Output = Result<T, E>>,
    T: Default,
    E: Display,
{
    match op.await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(part = label, error = %e, "optional fetch failed, using default");
            T::default()
        }
    }
}

/// Runs two optional sub-operations concurrently and waits for both.
///
/// Each failure degrades to that side's default; the merge never fails.
pub async fn best_effort_merge<FA, FB, A, B, EA, EB>(
    (label_a, op_a): (&'static str, FA),
    (label_b, op_b): (&'static str, FB),
) -> (A, B)
where
    FA: Future<Output = Result<A, EA>>,
    FB: Future<Output = Result<B, EB>>,
    A: Default,
    B: Default,
    EA: Display,
    EB: Display,
{
    tokio::join!(best_effort(label_a, op_a), best_effort(label_b, op_b))
}
