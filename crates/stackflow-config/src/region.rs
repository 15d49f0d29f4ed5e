//! AWS region resolution
//!
//! There is no process-wide region. Callers resolve one explicitly and hand
//! it to the client they construct.

use crate::error::{ConfigError, Result};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Regions a CloudFormation endpoint exists for
pub const KNOWN_REGIONS: &[&str] = &[
    "af-south-1",
    "ap-east-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ca-central-1",
    "ca-west-1",
    "cn-north-1",
    "cn-northwest-1",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "il-central-1",
    "me-central-1",
    "me-south-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-gov-east-1",
    "us-gov-west-1",
    "us-west-1",
    "us-west-2",
];

pub fn is_known_region(region: &str) -> bool {
    KNOWN_REGIONS.contains(&region)
}

/// Resolve the region to use.
///
/// Order: explicit flag, settings file, `AWS_DEFAULT_REGION`, `AWS_REGION`,
/// then [`DEFAULT_REGION`]. Empty values are skipped. The result must be a
/// known region.
pub fn resolve_region(flag: Option<&str>, configured: Option<&str>) -> Result<String> {
    resolve_region_with(flag, configured, |key| std::env::var(key).ok())
}

/// [`resolve_region`] with an injectable environment lookup
pub fn resolve_region_with<F>(
    flag: Option<&str>,
    configured: Option<&str>,
    env: F,
) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

    let region = non_empty(flag.map(str::to_string))
        .or_else(|| non_empty(configured.map(str::to_string)))
        .or_else(|| {
            let value = non_empty(env("AWS_DEFAULT_REGION"));
            if let Some(v) = &value {
                tracing::debug!("Using AWS_DEFAULT_REGION={}", v);
            }
            value
        })
        .or_else(|| {
            let value = non_empty(env("AWS_REGION"));
            if let Some(v) = &value {
                tracing::debug!("Using AWS_REGION={}", v);
            }
            value
        })
        .unwrap_or_else(|| DEFAULT_REGION.to_string());

    if !is_known_region(&region) {
        return Err(ConfigError::UnknownRegion(region));
    }
    Ok(region)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_flag_wins() {
        let env = env_of(&[("AWS_DEFAULT_REGION", "eu-west-1")]);
        let region =
            resolve_region_with(Some("us-west-2"), Some("ap-northeast-1"), env).unwrap();
        assert_eq!(region, "us-west-2");
    }

    #[test]
    fn test_settings_before_env() {
        let env = env_of(&[("AWS_DEFAULT_REGION", "eu-west-1")]);
        let region = resolve_region_with(None, Some("ap-northeast-1"), env).unwrap();
        assert_eq!(region, "ap-northeast-1");
    }

    #[test]
    fn test_default_region_env_before_aws_region() {
        let env = env_of(&[
            ("AWS_DEFAULT_REGION", "eu-west-1"),
            ("AWS_REGION", "us-east-2"),
        ]);
        assert_eq!(resolve_region_with(None, None, env).unwrap(), "eu-west-1");

        let env = env_of(&[("AWS_REGION", "us-east-2")]);
        assert_eq!(resolve_region_with(None, None, env).unwrap(), "us-east-2");
    }

    #[test]
    fn test_fallback_and_empty_values() {
        let env = env_of(&[("AWS_DEFAULT_REGION", "")]);
        assert_eq!(
            resolve_region_with(Some(""), None, env).unwrap(),
            DEFAULT_REGION
        );
    }

    #[test]
    fn test_unknown_region() {
        let err = resolve_region_with(Some("mars-north-1"), None, env_of(&[])).unwrap_err();
        assert_eq!(err.to_string(), "region mars-north-1 not found");
    }
}
