//! Resource failure aggregation from a stack's event history

use crate::error::Result;
use crate::provider::StackApi;
use crate::stack::StackEvent;
use chrono::{DateTime, Utc};

/// List failures on a stack recorded after `since`, as `"STATUS: REASON"`
///
/// Keeps the order the client returned events in (oldest first). An empty
/// list means nothing failed in the window; a failed event lookup is
/// returned as is.
pub async fn list_failures<A>(api: &A, stack: &str, since: DateTime<Utc>) -> Result<Vec<String>>
where
    A: StackApi + ?Sized,
{
    let events = api.describe_stack_events(stack).await?;
    let failures = failures_since(&events, since);
    tracing::debug!(
        "Found {} failure(s) in {} event(s) of {} since {}",
        failures.len(),
        events.len(),
        stack,
        since
    );
    Ok(failures)
}

/// Failure diagnostics of the events strictly after `since`
pub fn failures_since(events: &[StackEvent], since: DateTime<Utc>) -> Vec<String> {
    events
        .iter()
        .filter(|e| e.timestamp > since && e.is_failure())
        .map(StackEvent::diagnostic)
        .collect()
}
