//! Stack lifecycle tracking
//!
//! Turns the control plane's asynchronous provisioning into one outcome by
//! polling the stack status at a fixed interval until it settles, the
//! deadline passes, or the wait is cancelled.
//!
//! ```text
//!            ┌──────────── in progress / not visible / transport error
//!            ▼            │
//!        ┌─────────┐──────┘
//!  ────▶ │ Polling │──── success status ─────────▶ SuccessTerminal
//!        └─────────┘──── other status ───────────▶ FailureTerminal
//!            │      ──── provider error ─────────▶ FailureTerminal
//!            │
//!            └── deadline passed ▶ TimedOut    cancelled ▶ Cancelled
//! ```

use crate::error::{FailuresError, Result, StackError};
use crate::failures::list_failures;
use crate::provider::StackApi;
use crate::stack::StackDescription;
use crate::status::StatusClass;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;

/// Fixed delay between two status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// How far before the wait started failure events are still collected
pub const DEFAULT_LOOKBACK: Duration = Duration::from_secs(2);

/// Polling configuration for [`LifecycleTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
    pub lookback: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            lookback: DEFAULT_LOOKBACK,
        }
    }
}

/// Where a wait ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Polling,
    SuccessTerminal,
    FailureTerminal,
    TimedOut,
    TransportError,
    Cancelled,
}

impl TrackerState {
    /// Terminal state a wait result corresponds to
    pub fn of(result: &Result<()>) -> Self {
        match result {
            Ok(()) => TrackerState::SuccessTerminal,
            Err(StackError::Timeout { .. }) => TrackerState::TimedOut,
            Err(StackError::Cancelled { .. }) => TrackerState::Cancelled,
            Err(StackError::Transport(_)) => TrackerState::TransportError,
            Err(_) => TrackerState::FailureTerminal,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TrackerState::Polling)
    }
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerState::Polling => write!(f, "polling"),
            TrackerState::SuccessTerminal => write!(f, "succeeded"),
            TrackerState::FailureTerminal => write!(f, "failed"),
            TrackerState::TimedOut => write!(f, "timed out"),
            TrackerState::TransportError => write!(f, "transport error"),
            TrackerState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Polls a stack until its current operation finishes
///
/// Trackers share nothing but the client; run one per stack to follow
/// several stacks at once.
pub struct LifecycleTracker<A: ?Sized> {
    api: Arc<A>,
    config: TrackerConfig,
    cancel: CancellationToken,
}

impl<A: StackApi + ?Sized> LifecycleTracker<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            config: TrackerConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_config(mut self, config: TrackerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Token that stops any wait running on this tracker
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for a create or update to finish.
    ///
    /// Polls while the stack is `CREATE_IN_PROGRESS` or `UPDATE_IN_PROGRESS`
    /// and succeeds once it reaches a successful `_COMPLETE` state. Any other
    /// status ends the wait with the resource failures recorded since the
    /// wait started, or with the raw status and reason when none are found.
    ///
    /// Transport errors are retried until the deadline; errors returned by
    /// the control plane end the wait at once. Returns
    /// [`StackError::Timeout`] once `timeout` has passed.
    pub async fn wait(&self, name: &str, timeout: Duration) -> Result<()> {
        let result = self.poll_until_terminal(name, timeout).await;
        self.report(name, &result);
        result
    }

    /// Wait until the stack reaches any `_COMPLETE` status.
    ///
    /// Rollbacks count as complete; no failure classification is done. Any
    /// query error is returned immediately.
    pub async fn wait_for_complete(&self, name: &str, timeout: Duration) -> Result<()> {
        let result = self.poll_until_settled(name, timeout).await;
        self.report(name, &result);
        result
    }

    async fn poll_until_terminal(&self, name: &str, timeout: Duration) -> Result<()> {
        let started_at = Utc::now();
        let deadline = deadline_after(timeout);
        let mut polls = 0u32;

        loop {
            polls += 1;
            match self.api.query_status(name).await {
                Ok(Some(stack)) => match stack.status.class() {
                    StatusClass::InProgress => {
                        tracing::debug!("Poll #{}: stack {} is {}", polls, name, stack.status);
                    }
                    StatusClass::Succeeded => {
                        tracing::debug!("Poll #{}: stack {} is {}", polls, name, stack.status);
                        return Ok(());
                    }
                    StatusClass::Other => {
                        return Err(self.failure_error(name, &stack, started_at).await);
                    }
                },
                Ok(None) => {
                    tracing::debug!("Poll #{}: stack {} is not visible yet", polls, name);
                }
                Err(e) if e.is_transport() => {
                    tracing::warn!("DescribeStacks {}: {}", name, e);
                }
                Err(e) => return Err(e),
            }

            self.pause(name, deadline).await?;
        }
    }

    async fn poll_until_settled(&self, name: &str, timeout: Duration) -> Result<()> {
        let deadline = deadline_after(timeout);

        loop {
            let stacks = self.api.describe_stacks(Some(name)).await?;
            let [stack] = stacks.as_slice() else {
                return Err(StackError::StackNotFound(name.to_string()));
            };

            if stack.status.is_settled() {
                tracing::debug!("Stack {} settled as {}", name, stack.status);
                return Ok(());
            }

            self.pause(name, deadline).await?;
        }
    }

    /// Error for a stack that stopped in a non-successful status.
    ///
    /// Looks slightly before the wait started: a quick failure is more likely
    /// than an event left over from a previous operation.
    async fn failure_error(
        &self,
        name: &str,
        stack: &StackDescription,
        started_at: DateTime<Utc>,
    ) -> StackError {
        let since = chrono::Duration::from_std(self.config.lookback)
            .ok()
            .and_then(|lookback| started_at.checked_sub_signed(lookback))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        match list_failures(&*self.api, name, since).await {
            Ok(messages) => {
                if let Some(failures) = FailuresError::new(messages) {
                    return failures.into();
                }
            }
            Err(e) => {
                tracing::warn!("Could not list failures for {}: {}", name, e);
            }
        }

        StackError::Status {
            status: stack.status.to_string(),
            reason: stack.reason().to_string(),
        }
    }

    /// Sleep step between polls: timeout, then cancellation, then sleep
    async fn pause(&self, name: &str, deadline: Option<Instant>) -> Result<()> {
        if let Some(deadline) = deadline
            && Instant::now() > deadline
        {
            return Err(StackError::Timeout {
                stack: name.to_string(),
            });
        }
        if self.cancel.is_cancelled() {
            return Err(StackError::Cancelled {
                stack: name.to_string(),
            });
        }

        tokio::select! {
            _ = self.cancel.cancelled() => Err(StackError::Cancelled {
                stack: name.to_string(),
            }),
            _ = sleep(self.config.poll_interval) => Ok(()),
        }
    }

    fn report(&self, name: &str, result: &Result<()>) {
        let state = TrackerState::of(result);
        match result {
            Ok(()) => tracing::info!("Stack {} {}", name, state),
            Err(e) => tracing::info!("Stack {} {}: {}", name, state, e),
        }
    }
}

/// `None` when `timeout` reaches past what the clock can represent
fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
