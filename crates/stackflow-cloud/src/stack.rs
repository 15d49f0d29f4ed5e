//! Stack records decoded from control plane responses

use crate::status::{StackStatus, is_failed_status};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identity of a stack: the caller's name and the id assigned at creation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StackIdentity {
    pub name: String,
    pub id: String,
}

impl StackIdentity {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// One stack in a DescribeStacks snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackDescription {
    pub id: String,
    pub name: String,
    pub status: StackStatus,
    pub status_reason: Option<String>,
    #[serde(default)]
    pub parameters: Vec<StackParameter>,
    #[serde(default)]
    pub tags: Vec<StackTag>,
}

impl StackDescription {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        status: impl Into<StackStatus>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: status.into(),
            status_reason: None,
            parameters: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.status_reason = Some(reason.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push(StackParameter {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn identity(&self) -> StackIdentity {
        StackIdentity::new(&self.name, &self.id)
    }

    pub fn reason(&self) -> &str {
        self.status_reason.as_deref().unwrap_or_default()
    }

    /// Parameters the stack currently runs with, keyed by name
    pub fn parameter_map(&self) -> BTreeMap<String, String> {
        self.parameters
            .iter()
            .map(|p| (p.key.clone(), p.value.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackParameter {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTag {
    pub key: String,
    pub value: String,
}

/// One entry of ListStacks, which also reports deleted stacks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackSummary {
    pub id: String,
    pub name: String,
    pub status: StackStatus,
    pub status_reason: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    pub last_updated_time: Option<DateTime<Utc>>,
    pub deletion_time: Option<DateTime<Utc>>,
    pub template_description: Option<String>,
}

/// A resource provisioned by a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackResource {
    pub logical_id: String,
    pub physical_id: Option<String>,
    pub resource_type: String,
    pub status: String,
}

/// One entry of a stack's event history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEvent {
    pub event_id: String,
    pub logical_resource_id: String,
    pub physical_resource_id: Option<String>,
    pub resource_type: String,
    pub resource_status: String,
    pub resource_status_reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl StackEvent {
    pub fn is_failure(&self) -> bool {
        is_failed_status(&self.resource_status)
    }

    /// `"STATUS: REASON"`, the form failures are reported in
    pub fn diagnostic(&self) -> String {
        format!(
            "{}: {}",
            self.resource_status,
            self.resource_status_reason.as_deref().unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_diagnostic() {
        let event = StackEvent {
            event_id: "e-1".to_string(),
            logical_resource_id: "Queue".to_string(),
            physical_resource_id: None,
            resource_type: "AWS::SQS::Queue".to_string(),
            resource_status: "CREATE_FAILED".to_string(),
            resource_status_reason: Some("Resource limit exceeded".to_string()),
            timestamp: Utc::now(),
        };

        assert!(event.is_failure());
        assert_eq!(event.diagnostic(), "CREATE_FAILED: Resource limit exceeded");
    }

    #[test]
    fn test_parameter_map() {
        let stack = StackDescription::new("base", "arn:base", "CREATE_COMPLETE")
            .with_parameter("KeyName", "deploy")
            .with_parameter("Env", "prod");

        let params = stack.parameter_map();
        assert_eq!(params.get("KeyName").map(String::as_str), Some("deploy"));
        assert_eq!(params.keys().next().map(String::as_str), Some("Env"));
        assert_eq!(stack.identity(), StackIdentity::new("base", "arn:base"));
        assert_eq!(stack.reason(), "");
    }
}
