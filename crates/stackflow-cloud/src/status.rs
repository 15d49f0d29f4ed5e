//! Stack status vocabulary and its classification

use serde::{Deserialize, Serialize};
use std::fmt;

const COMPLETE_SUFFIX: &str = "_COMPLETE";
const FAILED_SUFFIX: &str = "_FAILED";

/// How the lifecycle tracker treats a stack status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Still provisioning, keep polling
    InProgress,
    /// Provisioning finished successfully
    Succeeded,
    /// Anything else: rollbacks, failures, deletes. Possibly terminal with failure.
    Other,
}

/// Status string reported by the control plane for a stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackStatus(String);

impl StackStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn class(&self) -> StatusClass {
        match self.0.as_str() {
            "CREATE_IN_PROGRESS" | "UPDATE_IN_PROGRESS" => StatusClass::InProgress,
            "CREATE_COMPLETE" | "UPDATE_COMPLETE" | "UPDATE_COMPLETE_CLEANUP_IN_PROGRESS" => {
                StatusClass::Succeeded
            }
            _ => StatusClass::Other,
        }
    }

    /// Any `_COMPLETE` status, including rollbacks and deletes.
    pub fn is_settled(&self) -> bool {
        self.0.ends_with(COMPLETE_SUFFIX)
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StackStatus {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StackStatus {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Resource-level status of an event, e.g. `CREATE_FAILED`
pub fn is_failed_status(status: &str) -> bool {
    status.ends_with(FAILED_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        assert_eq!(
            StackStatus::from("CREATE_IN_PROGRESS").class(),
            StatusClass::InProgress
        );
        assert_eq!(
            StackStatus::from("UPDATE_IN_PROGRESS").class(),
            StatusClass::InProgress
        );
        assert_eq!(
            StackStatus::from("CREATE_COMPLETE").class(),
            StatusClass::Succeeded
        );
        assert_eq!(
            StackStatus::from("UPDATE_COMPLETE").class(),
            StatusClass::Succeeded
        );
        assert_eq!(
            StackStatus::from("UPDATE_COMPLETE_CLEANUP_IN_PROGRESS").class(),
            StatusClass::Succeeded
        );

        for status in [
            "ROLLBACK_COMPLETE",
            "ROLLBACK_IN_PROGRESS",
            "CREATE_FAILED",
            "UPDATE_ROLLBACK_COMPLETE",
            "DELETE_COMPLETE",
            "DELETE_IN_PROGRESS",
        ] {
            assert_eq!(StackStatus::from(status).class(), StatusClass::Other);
        }
    }

    #[test]
    fn test_settled() {
        assert!(StackStatus::from("CREATE_COMPLETE").is_settled());
        assert!(StackStatus::from("ROLLBACK_COMPLETE").is_settled());
        assert!(StackStatus::from("UPDATE_ROLLBACK_COMPLETE").is_settled());
        assert!(!StackStatus::from("UPDATE_COMPLETE_CLEANUP_IN_PROGRESS").is_settled());
        assert!(!StackStatus::from("CREATE_FAILED").is_settled());
    }

    #[test]
    fn test_failed_status() {
        assert!(is_failed_status("CREATE_FAILED"));
        assert!(is_failed_status("UPDATE_ROLLBACK_FAILED"));
        assert!(!is_failed_status("CREATE_COMPLETE"));
        assert!(!is_failed_status("FAILED_SOMETHING"));
    }
}
