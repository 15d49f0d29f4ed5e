//! Request encoding into the control plane's flattened wire format
//!
//! Structured options become indexed list members:
//!
//! ```text
//! Parameters.member.1.ParameterKey = InstanceType
//! Parameters.member.1.ParameterValue = t3.micro
//! Tags.member.1.Key = Name
//! Tags.member.1.Value = web
//! ```
//!
//! Options are kept sorted by key, so the same input always yields the same
//! indices and the same encoded body.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Option routed to the dedicated update-policy field
pub const POLICY_DURING_UPDATE_KEY: &str = "StackPolicyDuringUpdateBody";

/// Options whose key starts with this (any case) become stack tags
pub const TAG_PREFIX: &str = "tag.";

/// Remote actions that carry an encoded request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackAction {
    CreateStack,
    UpdateStack,
    DeleteStack,
    SetStackPolicy,
}

impl StackAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            StackAction::CreateStack => "CreateStack",
            StackAction::UpdateStack => "UpdateStack",
            StackAction::DeleteStack => "DeleteStack",
            StackAction::SetStackPolicy => "SetStackPolicy",
        }
    }
}

impl fmt::Display for StackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller options for create and update, sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSet {
    entries: BTreeMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<HashMap<String, String>> for ParameterSet {
    fn from(map: HashMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

/// Where an option ends up on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
enum OptionRoute<'a> {
    Policy,
    Tag(&'a str),
    Parameter,
}

fn route(key: &str) -> OptionRoute<'_> {
    if key == POLICY_DURING_UPDATE_KEY {
        return OptionRoute::Policy;
    }
    match key.get(..TAG_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(TAG_PREFIX) => {
            OptionRoute::Tag(&key[TAG_PREFIX.len()..])
        }
        _ => OptionRoute::Parameter,
    }
}

/// A flattened request: an action plus its wire key/value pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRequest {
    action: StackAction,
    params: BTreeMap<String, String>,
}

impl WireRequest {
    pub fn new(action: StackAction) -> Self {
        Self {
            action,
            params: BTreeMap::new(),
        }
    }

    pub fn action(&self) -> StackAction {
        self.action
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn stack_name(&self) -> Option<&str> {
        self.get("StackName")
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Form-encoded body with `Action` first, then every field in key order
    pub fn encode(&self) -> String {
        let mut body = url::form_urlencoded::Serializer::new(String::new());
        body.append_pair("Action", self.action.as_str());
        for (key, value) in &self.params {
            body.append_pair(key, value);
        }
        body.finish()
    }

    /// Reassemble an indexed list (`<list>.member.N.<field>`) ordered by N
    pub fn members(&self, list: &str, key_field: &str, value_field: &str) -> Vec<(String, String)> {
        let prefix = format!("{}.member.", list);
        let mut found: BTreeMap<usize, (Option<&str>, Option<&str>)> = BTreeMap::new();

        for (key, value) in &self.params {
            let Some((index, field)) = key
                .strip_prefix(&prefix)
                .and_then(|rest| rest.split_once('.'))
            else {
                continue;
            };
            let Ok(index) = index.parse::<usize>() else {
                continue;
            };
            let entry = found.entry(index).or_default();
            if field == key_field {
                entry.0 = Some(value);
            } else if field == value_field {
                entry.1 = Some(value);
            }
        }

        found
            .into_values()
            .filter_map(|(k, v)| Some((k?.to_string(), v.unwrap_or_default().to_string())))
            .collect()
    }

    pub fn parameters(&self) -> Vec<(String, String)> {
        self.members("Parameters", "ParameterKey", "ParameterValue")
    }

    pub fn tags(&self) -> Vec<(String, String)> {
        self.members("Tags", "Key", "Value")
    }
}

/// CreateStack request. The stack name is always tag 1 (`Name`).
pub fn create_request(name: &str, template_body: &str, options: &ParameterSet) -> WireRequest {
    let mut request = template_request(StackAction::CreateStack, name, template_body);
    request.insert("Tags.member.1.Key", "Name");
    request.insert("Tags.member.1.Value", name);
    encode_options(&mut request, options, Some(2));
    request
}

/// UpdateStack request. Tags cannot change on update; tag options are dropped.
pub fn update_request(name: &str, template_body: &str, options: &ParameterSet) -> WireRequest {
    let mut request = template_request(StackAction::UpdateStack, name, template_body);
    encode_options(&mut request, options, None);
    request
}

pub fn delete_request(name: &str) -> WireRequest {
    let mut request = WireRequest::new(StackAction::DeleteStack);
    request.insert("StackName", name);
    request
}

pub fn set_policy_request(name: &str, policy: &str) -> WireRequest {
    let mut request = WireRequest::new(StackAction::SetStackPolicy);
    request.insert("StackName", name);
    request.insert("StackPolicyBody", policy);
    request
}

fn template_request(action: StackAction, name: &str, template_body: &str) -> WireRequest {
    let mut request = WireRequest::new(action);
    request.insert("StackName", name);
    request.insert("TemplateBody", template_body);
    request
}

/// `first_tag` is the index of the first caller tag, or `None` to drop tags
fn encode_options(request: &mut WireRequest, options: &ParameterSet, first_tag: Option<usize>) {
    let mut param_num = 1;
    let mut tag_num = first_tag;

    for (key, value) in options.iter() {
        match route(key) {
            OptionRoute::Policy => {
                request.insert(POLICY_DURING_UPDATE_KEY, value);
            }
            OptionRoute::Tag(tag) => match tag_num.as_mut() {
                Some(n) => {
                    request.insert(format!("Tags.member.{}.Key", n), tag);
                    request.insert(format!("Tags.member.{}.Value", n), value);
                    *n += 1;
                }
                None => {
                    tracing::debug!("Dropping tag option {} on {}", key, request.action());
                }
            },
            OptionRoute::Parameter => {
                request.insert(format!("Parameters.member.{}.ParameterKey", param_num), key);
                request.insert(format!("Parameters.member.{}.ParameterValue", param_num), value);
                param_num += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_options() -> ParameterSet {
        ParameterSet::new()
            .with("tag.env", "prod")
            .with("region", "us-east-1")
    }

    #[test]
    fn test_create_routes_tags_and_parameters() {
        let request = create_request("web", "{}", &sample_options());

        assert_eq!(request.action(), StackAction::CreateStack);
        assert_eq!(request.stack_name(), Some("web"));
        assert_eq!(request.get("TemplateBody"), Some("{}"));
        assert_eq!(request.get("Tags.member.1.Key"), Some("Name"));
        assert_eq!(request.get("Tags.member.1.Value"), Some("web"));
        assert_eq!(request.get("Tags.member.2.Key"), Some("env"));
        assert_eq!(request.get("Tags.member.2.Value"), Some("prod"));
        assert_eq!(
            request.get("Parameters.member.1.ParameterKey"),
            Some("region")
        );
        assert_eq!(
            request.get("Parameters.member.1.ParameterValue"),
            Some("us-east-1")
        );
        assert_eq!(
            request.tags(),
            vec![
                ("Name".to_string(), "web".to_string()),
                ("env".to_string(), "prod".to_string()),
            ]
        );
    }

    #[test]
    fn test_update_drops_tags() {
        let request = update_request("web", "{}", &sample_options());

        assert_eq!(request.action(), StackAction::UpdateStack);
        assert!(request.tags().is_empty());
        assert!(request.params().all(|(k, _)| !k.starts_with("Tags.")));
        assert_eq!(
            request.parameters(),
            vec![("region".to_string(), "us-east-1".to_string())]
        );
    }

    #[test]
    fn test_tag_prefix_case_insensitive() {
        let options = ParameterSet::new().with("TAG.Owner", "ops").with("Tag.team", "infra");
        let request = create_request("web", "{}", &options);

        // "TAG.Owner" sorts before "Tag.team"
        assert_eq!(request.get("Tags.member.2.Key"), Some("Owner"));
        assert_eq!(request.get("Tags.member.3.Key"), Some("team"));
        assert!(request.parameters().is_empty());
    }

    #[test]
    fn test_policy_not_counted_as_parameter() {
        let options = ParameterSet::new()
            .with(POLICY_DURING_UPDATE_KEY, r#"{"Statement":[]}"#)
            .with("A", "1")
            .with("B", "2");
        let request = update_request("web", "{}", &options);

        assert_eq!(
            request.get(POLICY_DURING_UPDATE_KEY),
            Some(r#"{"Statement":[]}"#)
        );
        assert_eq!(request.get("Parameters.member.1.ParameterKey"), Some("A"));
        assert_eq!(request.get("Parameters.member.2.ParameterKey"), Some("B"));
        assert_eq!(request.get("Parameters.member.3.ParameterKey"), None);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let mut a = HashMap::new();
        let mut b = HashMap::new();
        for i in 0..12 {
            a.insert(format!("Param{}", i), format!("v{}", i));
            a.insert(format!("tag.t{}", i), format!("x{}", i));
        }
        for i in (0..12).rev() {
            b.insert(format!("tag.t{}", i), format!("x{}", i));
            b.insert(format!("Param{}", i), format!("v{}", i));
        }

        let first = create_request("web", "{}", &ParameterSet::from(a)).encode();
        let second = create_request("web", "{}", &ParameterSet::from(b)).encode();
        assert_eq!(first, second);

        let options = sample_options();
        assert_eq!(
            create_request("web", "{}", &options).encode(),
            create_request("web", "{}", &options).encode()
        );
    }

    #[test]
    fn test_encode_body() {
        let request = delete_request("my stack");
        assert_eq!(request.encode(), "Action=DeleteStack&StackName=my+stack");

        let request = set_policy_request("web", r#"{"a":1}"#);
        assert_eq!(
            request.encode(),
            "Action=SetStackPolicy&StackName=web&StackPolicyBody=%7B%22a%22%3A1%7D"
        );
    }

    #[test]
    fn test_members_ordered_numerically() {
        let options: ParameterSet = (0..11).map(|i| (format!("P{:02}", i), i.to_string())).collect();
        let request = update_request("web", "{}", &options);

        let params = request.parameters();
        assert_eq!(params.len(), 11);
        assert_eq!(params[0], ("P00".to_string(), "0".to_string()));
        assert_eq!(params[10], ("P10".to_string(), "10".to_string()));
    }
}
