//! In-memory [`StackApi`] for tests
//!
//! Polls are scripted: each `describe_stacks` call consumes the next scripted
//! response, and the last one keeps repeating once the script runs out. With
//! nothing scripted, the fake answers from its registered stacks.

use crate::error::{Result, StackError};
use crate::params::WireRequest;
use crate::provider::{StackApi, SubmitResponse};
use crate::stack::{StackDescription, StackEvent, StackResource, StackSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
struct FakeState {
    script: VecDeque<Result<Vec<StackDescription>>>,
    last: Option<Result<Vec<StackDescription>>>,
    stacks: Vec<StackDescription>,
    summaries: Vec<StackSummary>,
    events: HashMap<String, Vec<StackEvent>>,
    events_error: Option<StackError>,
    templates: HashMap<String, String>,
    resources: HashMap<String, Vec<StackResource>>,
    submitted: Vec<WireRequest>,
    submit_error: Option<StackError>,
    describe_calls: usize,
    event_calls: usize,
}

#[derive(Default)]
pub struct FakeStackApi {
    state: Mutex<FakeState>,
}

impl FakeStackApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Script one poll per status for a single stack
    pub fn script_statuses(&self, name: &str, statuses: &[&str]) {
        for status in statuses {
            self.push_poll(Ok(vec![stack(name, status)]));
        }
    }

    pub fn push_poll(&self, response: Result<Vec<StackDescription>>) {
        self.state().script.push_back(response);
    }

    pub fn add_stack(&self, description: StackDescription) {
        self.state().stacks.push(description);
    }

    pub fn add_summary(&self, summary: StackSummary) {
        self.state().summaries.push(summary);
    }

    pub fn push_event(&self, stack: &str, event: StackEvent) {
        self.state()
            .events
            .entry(stack.to_string())
            .or_default()
            .push(event);
    }

    pub fn fail_events(&self, error: StackError) {
        self.state().events_error = Some(error);
    }

    pub fn set_template(&self, stack: &str, body: &str) {
        self.state()
            .templates
            .insert(stack.to_string(), body.to_string());
    }

    pub fn add_resource(&self, stack: &str, resource: StackResource) {
        self.state()
            .resources
            .entry(stack.to_string())
            .or_default()
            .push(resource);
    }

    pub fn fail_submit(&self, error: StackError) {
        self.state().submit_error = Some(error);
    }

    pub fn submitted(&self) -> Vec<WireRequest> {
        self.state().submitted.clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.state().describe_calls
    }

    pub fn event_calls(&self) -> usize {
        self.state().event_calls
    }
}

#[async_trait]
impl StackApi for FakeStackApi {
    fn name(&self) -> &str {
        "fake"
    }

    async fn describe_stacks(&self, name: Option<&str>) -> Result<Vec<StackDescription>> {
        let mut state = self.state();
        state.describe_calls += 1;

        if let Some(next) = state.script.pop_front() {
            state.last = Some(next.clone());
            return next;
        }
        if let Some(last) = &state.last {
            return last.clone();
        }

        Ok(state
            .stacks
            .iter()
            .filter(|s| name.is_none_or(|n| s.name == n))
            .cloned()
            .collect())
    }

    async fn describe_stack_events(&self, stack: &str) -> Result<Vec<StackEvent>> {
        let mut state = self.state();
        state.event_calls += 1;

        if let Some(err) = &state.events_error {
            return Err(err.clone());
        }
        Ok(state.events.get(stack).cloned().unwrap_or_default())
    }

    async fn list_stacks(&self) -> Result<Vec<StackSummary>> {
        Ok(self.state().summaries.clone())
    }

    async fn get_template(&self, stack: &str) -> Result<String> {
        self.state()
            .templates
            .get(stack)
            .cloned()
            .ok_or_else(|| {
                StackError::provider(
                    "ValidationError",
                    format!("Stack with id {} does not exist", stack),
                )
            })
    }

    async fn list_stack_resources(&self, stack: &str) -> Result<Vec<StackResource>> {
        Ok(self
            .state()
            .resources
            .get(stack)
            .cloned()
            .unwrap_or_default())
    }

    async fn submit(&self, request: &WireRequest) -> Result<SubmitResponse> {
        let mut state = self.state();
        if let Some(err) = &state.submit_error {
            return Err(err.clone());
        }
        state.submitted.push(request.clone());

        let stack_id = request
            .stack_name()
            .map(|name| format!("arn:fake:cloudformation:stack/{}", name));
        Ok(SubmitResponse::new(
            Some(format!("req-{}", state.submitted.len())),
            stack_id,
        ))
    }
}

/// A described stack with the given status
pub fn stack(name: &str, status: &str) -> StackDescription {
    StackDescription::new(
        name,
        format!("arn:fake:cloudformation:stack/{}", name),
        status,
    )
}

/// A resource event at a fixed time
pub fn event_at(
    logical_id: &str,
    status: &str,
    reason: &str,
    timestamp: DateTime<Utc>,
) -> StackEvent {
    StackEvent {
        event_id: format!("{}-{}-{}", logical_id, status, timestamp.timestamp_millis()),
        logical_resource_id: logical_id.to_string(),
        physical_resource_id: None,
        resource_type: "AWS::CloudFormation::Stack".to_string(),
        resource_status: status.to_string(),
        resource_status_reason: (!reason.is_empty()).then(|| reason.to_string()),
        timestamp,
    }
}
