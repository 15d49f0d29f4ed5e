//! Control plane client trait definition

use crate::error::Result;
use crate::params::WireRequest;
use crate::stack::{StackDescription, StackEvent, StackResource, StackSummary};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Client for the control plane that provisions stacks
///
/// Implementations own transport, request signing and response decoding.
/// Every method is a single remote call (or one paginated listing) and must
/// report failures as [`StackError::Transport`](crate::StackError::Transport)
/// when the request never got an answer, and as
/// [`StackError::Provider`](crate::StackError::Provider) when the control
/// plane rejected it.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Returns the provider name (e.g., "aws-cloudformation")
    fn name(&self) -> &str;

    /// Describe one stack by name, or every active stack when `name` is `None`
    async fn describe_stacks(&self, name: Option<&str>) -> Result<Vec<StackDescription>>;

    /// Full event history of a stack, oldest first
    async fn describe_stack_events(&self, stack: &str) -> Result<Vec<StackEvent>>;

    /// All stacks in every lifecycle state, deleted ones included
    async fn list_stacks(&self) -> Result<Vec<StackSummary>>;

    /// Template body the stack was last deployed with
    async fn get_template(&self, stack: &str) -> Result<String>;

    async fn list_stack_resources(&self, stack: &str) -> Result<Vec<StackResource>>;

    /// Execute a mutating action
    async fn submit(&self, request: &WireRequest) -> Result<SubmitResponse>;

    /// Current snapshot of a single stack, `None` if it is not visible
    async fn query_status(&self, name: &str) -> Result<Option<StackDescription>> {
        let stacks = self.describe_stacks(Some(name)).await?;
        Ok(stacks.into_iter().find(|s| s.name == name))
    }
}

/// Decoded response of a mutating action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub request_id: Option<String>,

    /// Set by CreateStack and UpdateStack
    pub stack_id: Option<String>,
}

impl SubmitResponse {
    pub fn new(request_id: Option<String>, stack_id: Option<String>) -> Self {
        Self {
            request_id,
            stack_id,
        }
    }
}
