//! Conversions between AWS SDK shapes and StackFlow types

use aws_sdk_cloudformation as cfn;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use chrono::{DateTime, Utc};
use stackflow_cloud::{
    StackDescription, StackError, StackEvent, StackParameter, StackResource, StackStatus,
    StackSummary, StackTag,
};
use std::fmt::Debug;

/// Classify an SDK failure.
///
/// A service error means the control plane answered and rejected the call.
/// A construction failure means the request was never valid. Everything else
/// (dispatch, timeout, unreadable response) is a transport problem.
pub fn map_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> StackError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(ctx) => {
            let service_err = ctx.err();
            StackError::provider(
                service_err.code().unwrap_or("Unknown"),
                service_err
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{} failed", operation)),
            )
        }
        SdkError::ConstructionFailure(_) => StackError::InvalidRequest(format!(
            "{}: {}",
            operation,
            DisplayErrorContext(&err)
        )),
        _ => StackError::transport(format!("{}: {}", operation, DisplayErrorContext(&err))),
    }
}

fn timestamp(t: Option<&cfn::primitives::DateTime>) -> Option<DateTime<Utc>> {
    t.and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
}

fn status_str(status: Option<&str>) -> String {
    status.unwrap_or_default().to_string()
}

pub fn stack_description(stack: &cfn::types::Stack) -> StackDescription {
    StackDescription {
        id: stack.stack_id().unwrap_or_default().to_string(),
        name: stack.stack_name().unwrap_or_default().to_string(),
        status: StackStatus::new(status_str(stack.stack_status().map(|s| s.as_str()))),
        status_reason: stack.stack_status_reason().map(str::to_string),
        parameters: stack
            .parameters()
            .iter()
            .filter_map(|p| {
                Some(StackParameter {
                    key: p.parameter_key()?.to_string(),
                    value: p.parameter_value().unwrap_or_default().to_string(),
                })
            })
            .collect(),
        tags: stack
            .tags()
            .iter()
            .filter_map(|t| {
                Some(StackTag {
                    key: t.key()?.to_string(),
                    value: t.value().unwrap_or_default().to_string(),
                })
            })
            .collect(),
    }
}

pub fn stack_summary(summary: &cfn::types::StackSummary) -> StackSummary {
    StackSummary {
        id: summary.stack_id().unwrap_or_default().to_string(),
        name: summary.stack_name().unwrap_or_default().to_string(),
        status: StackStatus::new(status_str(summary.stack_status().map(|s| s.as_str()))),
        status_reason: summary.stack_status_reason().map(str::to_string),
        creation_time: timestamp(summary.creation_time()),
        last_updated_time: timestamp(summary.last_updated_time()),
        deletion_time: timestamp(summary.deletion_time()),
        template_description: summary.template_description().map(str::to_string),
    }
}

pub fn stack_event(event: &cfn::types::StackEvent) -> StackEvent {
    StackEvent {
        event_id: event.event_id().unwrap_or_default().to_string(),
        logical_resource_id: event.logical_resource_id().unwrap_or_default().to_string(),
        physical_resource_id: event
            .physical_resource_id()
            .filter(|id| !id.is_empty())
            .map(str::to_string),
        resource_type: event.resource_type().unwrap_or_default().to_string(),
        resource_status: status_str(event.resource_status().map(|s| s.as_str())),
        resource_status_reason: event.resource_status_reason().map(str::to_string),
        // Events without a timestamp sort before everything else
        timestamp: timestamp(event.timestamp()).unwrap_or(DateTime::UNIX_EPOCH),
    }
}

pub fn stack_resource(resource: &cfn::types::StackResourceSummary) -> StackResource {
    StackResource {
        logical_id: resource.logical_resource_id().unwrap_or_default().to_string(),
        physical_id: resource.physical_resource_id().map(str::to_string),
        resource_type: resource.resource_type().unwrap_or_default().to_string(),
        status: status_str(resource.resource_status().map(|s| s.as_str())),
    }
}

pub fn sdk_parameters(pairs: Vec<(String, String)>) -> Option<Vec<cfn::types::Parameter>> {
    if pairs.is_empty() {
        return None;
    }
    Some(
        pairs
            .into_iter()
            .map(|(key, value)| {
                cfn::types::Parameter::builder()
                    .parameter_key(key)
                    .parameter_value(value)
                    .build()
            })
            .collect(),
    )
}

pub fn sdk_tags(pairs: Vec<(String, String)>) -> Option<Vec<cfn::types::Tag>> {
    if pairs.is_empty() {
        return None;
    }
    Some(
        pairs
            .into_iter()
            .map(|(key, value)| cfn::types::Tag::builder().key(key).value(value).build())
            .collect(),
    )
}
