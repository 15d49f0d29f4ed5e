//! CloudFormation implementation of [`StackApi`]

use crate::convert::{self, map_sdk_error};
use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation as cfn;
use aws_sdk_cloudformation::operation::RequestId;
use stackflow_cloud::params::POLICY_DURING_UPDATE_KEY;
use stackflow_cloud::{
    StackAction, StackApi, StackDescription, StackError, StackEvent, StackResource, StackSummary,
    SubmitResponse, WireRequest,
};

/// Where and as whom to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    pub region: String,
    pub profile: Option<String>,
}

impl AwsConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

/// AWS CloudFormation client
pub struct CloudFormationApi {
    client: cfn::Client,
    region: String,
}

impl CloudFormationApi {
    /// Load credentials for `config` and build a client bound to its region
    pub async fn connect(config: &AwsConfig) -> Result<Self> {
        if config.region.trim().is_empty() {
            return Err(AwsError::MissingRegion);
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(profile) = &config.profile {
            if profile.trim().is_empty() {
                return Err(AwsError::InvalidProfile(profile.clone()));
            }
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;

        tracing::debug!(
            "CloudFormation client for region {} (profile: {})",
            config.region,
            config.profile.as_deref().unwrap_or("default")
        );
        Ok(Self::from_client(cfn::Client::new(&sdk_config), &config.region))
    }

    pub fn from_client(client: cfn::Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    async fn create(
        &self,
        request: &WireRequest,
        name: &str,
    ) -> stackflow_cloud::Result<SubmitResponse> {
        let output = self
            .client
            .create_stack()
            .stack_name(name)
            .set_template_body(request.get("TemplateBody").map(str::to_string))
            .set_parameters(convert::sdk_parameters(request.parameters()))
            .set_tags(convert::sdk_tags(request.tags()))
            // CreateStack has no during-update policy; it becomes the stack policy
            .set_stack_policy_body(request.get(POLICY_DURING_UPDATE_KEY).map(str::to_string))
            .send()
            .await
            .map_err(|e| map_sdk_error("CreateStack", e))?;

        Ok(SubmitResponse::new(
            output.request_id().map(str::to_string),
            output.stack_id().map(str::to_string),
        ))
    }

    async fn update(
        &self,
        request: &WireRequest,
        name: &str,
    ) -> stackflow_cloud::Result<SubmitResponse> {
        let output = self
            .client
            .update_stack()
            .stack_name(name)
            .set_template_body(request.get("TemplateBody").map(str::to_string))
            .set_parameters(convert::sdk_parameters(request.parameters()))
            .set_stack_policy_during_update_body(
                request.get(POLICY_DURING_UPDATE_KEY).map(str::to_string),
            )
            .send()
            .await
            .map_err(|e| map_sdk_error("UpdateStack", e))?;

        Ok(SubmitResponse::new(
            output.request_id().map(str::to_string),
            output.stack_id().map(str::to_string),
        ))
    }

    async fn delete(&self, name: &str) -> stackflow_cloud::Result<SubmitResponse> {
        let output = self
            .client
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .map_err(|e| map_sdk_error("DeleteStack", e))?;

        Ok(SubmitResponse::new(output.request_id().map(str::to_string), None))
    }

    async fn set_policy(
        &self,
        request: &WireRequest,
        name: &str,
    ) -> stackflow_cloud::Result<SubmitResponse> {
        let output = self
            .client
            .set_stack_policy()
            .stack_name(name)
            .set_stack_policy_body(request.get("StackPolicyBody").map(str::to_string))
            .send()
            .await
            .map_err(|e| map_sdk_error("SetStackPolicy", e))?;

        Ok(SubmitResponse::new(output.request_id().map(str::to_string), None))
    }
}

#[async_trait]
impl StackApi for CloudFormationApi {
    fn name(&self) -> &str {
        "aws-cloudformation"
    }

    /// A named stack that does not exist comes back as a `ValidationError`
    async fn describe_stacks(
        &self,
        name: Option<&str>,
    ) -> stackflow_cloud::Result<Vec<StackDescription>> {
        let mut pages = self
            .client
            .describe_stacks()
            .set_stack_name(name.map(str::to_string))
            .into_paginator()
            .send();

        let mut stacks = Vec::new();
        while let Some(page) = pages
            .try_next()
            .await
            .map_err(|e| map_sdk_error("DescribeStacks", e))?
        {
            stacks.extend(page.stacks().iter().map(convert::stack_description));
        }
        Ok(stacks)
    }

    async fn describe_stack_events(&self, stack: &str) -> stackflow_cloud::Result<Vec<StackEvent>> {
        let mut pages = self
            .client
            .describe_stack_events()
            .stack_name(stack)
            .into_paginator()
            .send();

        let mut events = Vec::new();
        while let Some(page) = pages
            .try_next()
            .await
            .map_err(|e| map_sdk_error("DescribeStackEvents", e))?
        {
            events.extend(page.stack_events().iter().map(convert::stack_event));
        }

        // The service returns newest first
        events.reverse();
        Ok(events)
    }

    async fn list_stacks(&self) -> stackflow_cloud::Result<Vec<StackSummary>> {
        let mut pages = self.client.list_stacks().into_paginator().send();

        let mut summaries = Vec::new();
        while let Some(page) = pages
            .try_next()
            .await
            .map_err(|e| map_sdk_error("ListStacks", e))?
        {
            summaries.extend(page.stack_summaries().iter().map(convert::stack_summary));
        }
        Ok(summaries)
    }

    async fn get_template(&self, stack: &str) -> stackflow_cloud::Result<String> {
        let output = self
            .client
            .get_template()
            .stack_name(stack)
            .send()
            .await
            .map_err(|e| map_sdk_error("GetTemplate", e))?;

        Ok(output.template_body().unwrap_or_default().to_string())
    }

    async fn list_stack_resources(
        &self,
        stack: &str,
    ) -> stackflow_cloud::Result<Vec<StackResource>> {
        let mut pages = self
            .client
            .list_stack_resources()
            .stack_name(stack)
            .into_paginator()
            .send();

        let mut resources = Vec::new();
        while let Some(page) = pages
            .try_next()
            .await
            .map_err(|e| map_sdk_error("ListStackResources", e))?
        {
            resources.extend(
                page.stack_resource_summaries()
                    .iter()
                    .map(convert::stack_resource),
            );
        }
        Ok(resources)
    }

    async fn submit(&self, request: &WireRequest) -> stackflow_cloud::Result<SubmitResponse> {
        let name = request.stack_name().ok_or_else(|| {
            StackError::InvalidRequest(format!("{} without StackName", request.action()))
        })?;
        tracing::debug!("{} {} ({} fields)", request.action(), name, request.len());

        match request.action() {
            StackAction::CreateStack => self.create(request, name).await,
            StackAction::UpdateStack => self.update(request, name).await,
            StackAction::DeleteStack => self.delete(name).await,
            StackAction::SetStackPolicy => self.set_policy(request, name).await,
        }
    }
}
