use anyhow::Context as _;
use chrono::{DateTime, TimeDelta, Utc};
use colored::{ColoredString, Colorize};
use stackflow_cloud::params::{POLICY_DURING_UPDATE_KEY, TAG_PREFIX};
use stackflow_cloud::{ParameterSet, StackStatus, StatusClass};
use std::path::Path;

/// Split `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_key_value(raw: &str) -> anyhow::Result<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(anyhow::anyhow!("expected KEY=VALUE, got {:?}", raw)),
    }
}

pub fn read_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Merge `-p`, `--tag` and `--policy-during-update` into one option set
pub fn build_options(
    params: &[String],
    tags: &[String],
    policy: Option<&Path>,
) -> anyhow::Result<ParameterSet> {
    let mut options = ParameterSet::new();
    for raw in params {
        let (key, value) = parse_key_value(raw)?;
        options.insert(key, value);
    }
    for raw in tags {
        let (key, value) = parse_key_value(raw)?;
        options.insert(format!("{}{}", TAG_PREFIX, key), value);
    }
    if let Some(path) = policy {
        options.insert(POLICY_DURING_UPDATE_KEY, read_file(path)?);
    }
    Ok(options)
}

pub fn colored_status(status: &StackStatus) -> ColoredString {
    match status.class() {
        StatusClass::InProgress => status.as_str().yellow(),
        StatusClass::Succeeded => status.as_str().green(),
        StatusClass::Other if status.is_settled() && !status.as_str().contains("ROLLBACK") => {
            status.as_str().dimmed()
        }
        StatusClass::Other => status.as_str().red(),
    }
}

pub fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// `secs` before `now`, or the earliest representable time when that
/// lies out of range
pub fn since_cutoff(now: DateTime<Utc>, secs: u64) -> DateTime<Utc> {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
