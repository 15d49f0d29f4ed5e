//! Stack operations on top of a [`StackApi`] client

use crate::error::{Result, StackError};
use crate::failures;
use crate::inventory;
use crate::params::{self, ParameterSet};
use crate::provider::{StackApi, SubmitResponse};
use crate::stack::{StackDescription, StackIdentity, StackResource, StackSummary};
use crate::tracker::{LifecycleTracker, TrackerConfig};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const VPC_RESOURCE_TYPE: &str = "AWS::EC2::VPC";

/// Submits stack operations and tracks them to completion
pub struct StackManager<A: ?Sized> {
    api: Arc<A>,
    tracker: LifecycleTracker<A>,
}

impl<A: StackApi + ?Sized> StackManager<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            tracker: LifecycleTracker::new(Arc::clone(&api)),
            api,
        }
    }

    pub fn with_tracker_config(mut self, config: TrackerConfig) -> Self {
        self.tracker = self.tracker.with_config(config);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.tracker = self.tracker.with_cancellation(cancel);
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn tracker(&self) -> &LifecycleTracker<A> {
        &self.tracker
    }

    /// Create a stack.
    ///
    /// Options are taken as:
    ///   `StackPolicyDuringUpdateBody`: optional update policy
    ///   `tag.KEY`: tags applied to the stack at creation
    ///   anything else: template parameters
    pub async fn create(
        &self,
        name: &str,
        template: &str,
        options: &ParameterSet,
    ) -> Result<StackIdentity> {
        let request = params::create_request(name, template, options);
        tracing::info!(
            "Creating stack {} ({} template bytes, {} options)",
            name,
            template.len(),
            options.len()
        );
        let response = self.api.submit(&request).await?;
        Ok(identity(name, response))
    }

    /// Update an existing stack. Tag options are ignored: tags cannot change.
    pub async fn update(
        &self,
        name: &str,
        template: &str,
        options: &ParameterSet,
    ) -> Result<StackIdentity> {
        let request = params::update_request(name, template, options);
        tracing::info!("Updating stack {}", name);
        let response = self.api.submit(&request).await?;
        Ok(identity(name, response))
    }

    /// Delete an entire stack by name
    pub async fn delete(&self, name: &str) -> Result<SubmitResponse> {
        tracing::info!("Deleting stack {}", name);
        self.api.submit(&params::delete_request(name)).await
    }

    pub async fn set_policy(&self, name: &str, policy: &str) -> Result<()> {
        tracing::info!("Setting stack policy on {}", name);
        self.api
            .submit(&params::set_policy_request(name, policy))
            .await?;
        Ok(())
    }

    pub async fn describe(&self, name: &str) -> Result<Option<StackDescription>> {
        self.api.query_status(name).await
    }

    pub async fn get_template(&self, name: &str) -> Result<String> {
        self.api.get_template(name).await
    }

    pub async fn list_resources(&self, name: &str) -> Result<Vec<StackResource>> {
        self.api.list_stack_resources(name).await
    }

    /// Physical id of the VPC provisioned by a stack
    pub async fn stack_vpc(&self, name: &str) -> Result<String> {
        self.list_resources(name)
            .await?
            .into_iter()
            .find(|r| r.resource_type == VPC_RESOURCE_TYPE)
            .and_then(|r| r.physical_id)
            .ok_or_else(|| StackError::NoVpc(name.to_string()))
    }

    /// Parameters a stack was deployed with
    pub async fn stack_parameters(&self, name: &str) -> Result<BTreeMap<String, String>> {
        let stack = self
            .describe(name)
            .await?
            .ok_or_else(|| StackError::StackNotFound(name.to_string()))?;
        Ok(stack.parameter_map())
    }

    pub async fn wait(&self, name: &str, timeout: Duration) -> Result<()> {
        self.tracker.wait(name, timeout).await
    }

    pub async fn wait_for_complete(&self, name: &str, timeout: Duration) -> Result<()> {
        self.tracker.wait_for_complete(name, timeout).await
    }

    pub async fn list_failures(&self, name: &str, since: DateTime<Utc>) -> Result<Vec<String>> {
        failures::list_failures(&*self.api, name, since).await
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        inventory::exists(&*self.api, name).await
    }

    pub async fn list_active(&self) -> Result<Vec<String>> {
        inventory::list_active(&*self.api).await
    }

    pub async fn list_all(&self) -> Result<Vec<StackSummary>> {
        inventory::list_all(&*self.api).await
    }
}

fn identity(name: &str, response: SubmitResponse) -> StackIdentity {
    StackIdentity::new(name, response.stack_id.unwrap_or_default())
}
