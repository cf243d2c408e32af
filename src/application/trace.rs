//! Span helpers for fallible async work.
//!
//! Spans passed to [`with_span`] must declare an `otel.status_code` field
//! (usually `tracing::field::Empty`) so the outcome can be recorded on it.

use std::future::Future;

use tracing::{Instrument, Span};

pub const STATUS_FIELD: &str = "otel.status_code";

/// Run `future` inside `span`, marking the span `OK` or `ERROR` from its result.
///
/// The span is closed when the future completes, whichever way it completes.
pub async fn with_span<T, E, F>(span: Span, future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let result = future.instrument(span.clone()).await;
    match &result {
        Ok(_) => {
            span.record(STATUS_FIELD, "OK");
        }
        Err(err) => {
            span.record(STATUS_FIELD, "ERROR");
            span.in_scope(|| tracing::debug!(error = %err, "span finished with error"));
        }
    }
    result
}
