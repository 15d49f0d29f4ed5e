//! Stack lifecycle error types

use std::fmt;
use thiserror::Error;

/// Errors surfaced by stack operations and the lifecycle tracker
#[derive(Error, Debug, Clone)]
pub enum StackError {
    /// The request never got a usable answer (network, timeout, decoding)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The control plane received the request and rejected it
    #[error("{code}: {message}")]
    Provider { code: String, message: String },

    /// The request could not be built on the client side
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The deadline passed while the stack was still settling
    #[error("timeout waiting for stack {stack}")]
    Timeout { stack: String },

    #[error("cancelled while waiting for stack {stack}")]
    Cancelled { stack: String },

    /// One or more resources failed while provisioning
    #[error(transparent)]
    Failures(#[from] FailuresError),

    /// A failure-class status with no failure events to explain it
    #[error("{status}: {reason}")]
    Status { status: String, reason: String },

    #[error("could not find stack: {0}")]
    StackNotFound(String),

    #[error("No VPC found in stack {0}")]
    NoVpc(String),
}

impl StackError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Transport failures are the only errors the tracker retries
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Failure messages gathered from stack events, if this is a composite failure
    pub fn failures(&self) -> Option<&[String]> {
        match self {
            Self::Failures(f) => Some(f.list()),
            _ => None,
        }
    }
}

/// Resource failures collected from a stack's event history
///
/// Messages are kept in retrieval order, oldest first. The list is never
/// empty: [`FailuresError::new`] refuses to build one from no messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailuresError {
    messages: Vec<String>,
}

impl FailuresError {
    pub fn new(messages: Vec<String>) -> Option<Self> {
        if messages.is_empty() {
            None
        } else {
            Some(Self { messages })
        }
    }

    pub fn list(&self) -> &[String] {
        &self.messages
    }

    pub fn oldest(&self) -> &str {
        self.messages.first().map(String::as_str).unwrap_or_default()
    }

    pub fn newest(&self) -> &str {
        self.messages.last().map(String::as_str).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

/// Displays the newest failure, the last one retrieved.
impl fmt::Display for FailuresError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.newest())
    }
}

impl std::error::Error for FailuresError {}

pub type Result<T> = std::result::Result<T, StackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_never_empty() {
        assert!(FailuresError::new(Vec::new()).is_none());
    }

    #[test]
    fn test_failures_display_newest() {
        let failures = FailuresError::new(vec![
            "CREATE_FAILED: first".to_string(),
            "CREATE_FAILED: second".to_string(),
        ])
        .unwrap();

        assert_eq!(failures.to_string(), "CREATE_FAILED: second");
        assert_eq!(failures.oldest(), "CREATE_FAILED: first");
        assert_eq!(failures.len(), 2);

        let err = StackError::from(failures);
        assert_eq!(err.to_string(), "CREATE_FAILED: second");
        assert_eq!(err.failures().map(<[String]>::len), Some(2));
    }

    #[test]
    fn test_status_fallback_message() {
        let err = StackError::Status {
            status: "ROLLBACK_COMPLETE".to_string(),
            reason: "The following resource(s) failed to create: [Queue].".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "ROLLBACK_COMPLETE: The following resource(s) failed to create: [Queue]."
        );
    }

    #[test]
    fn test_error_kinds() {
        assert!(StackError::transport("connection reset").is_transport());
        assert!(!StackError::provider("ValidationError", "bad").is_transport());
        assert!(
            StackError::Timeout {
                stack: "demo".to_string()
            }
            .is_timeout()
        );
        assert_eq!(
            StackError::provider("ValidationError", "Stack with id demo does not exist")
                .to_string(),
            "ValidationError: Stack with id demo does not exist"
        );
    }
}
